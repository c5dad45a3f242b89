// src/pipeline/aggregate.rs

//! Ordered multi-provider acquisition with retry and stale-cache fallback.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{AcquisitionError, FailureReason, FetchError, ProviderFailure};
use crate::models::{DrawRecord, FetchConfig, GameConfig, GameType, Provider, dedupe_by_date};
use crate::services::SourceFetcher;
use crate::storage::{CachedHistory, HistoryCache};

/// Per-provider attempt policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after a `NetworkFailure`. Parse failures are never retried.
    pub network_retries: u32,
    pub retry_delay: Duration,
    /// Upper bound for a single `fetch` call.
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            network_retries: config.network_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Where a record set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOrigin {
    Live(Provider),
    Cache {
        saved_at: DateTime<Utc>,
        provider: Provider,
    },
}

impl HistoryOrigin {
    pub fn provider(&self) -> Provider {
        match self {
            Self::Live(provider) | Self::Cache { provider, .. } => *provider,
        }
    }
}

/// Non-empty record set returned by [`FallbackAggregator::get_history`].
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub game: GameType,
    /// Validated records, ascending by date, one per date
    pub records: Vec<DrawRecord>,
    pub origin: HistoryOrigin,
    /// Set when every provider failed and the records came from the cache
    pub stale: bool,
    /// Providers that failed before the result was obtained
    pub failures: Vec<ProviderFailure>,
}

/// Tries each fetcher in priority order and returns the first non-empty set.
pub struct FallbackAggregator {
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    policy: RetryPolicy,
    cache: Option<Arc<dyn HistoryCache>>,
}

impl FallbackAggregator {
    pub fn new(fetchers: Vec<Arc<dyn SourceFetcher>>, policy: RetryPolicy) -> Self {
        Self {
            fetchers,
            policy,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn HistoryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.fetchers.iter().map(|f| f.provider()).collect()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch `game` from the first provider that delivers valid draws.
    ///
    /// Later providers are not contacted once one succeeds. When all fail,
    /// the cached set is returned flagged stale; without a cache the
    /// per-provider reasons are reported in `AllSourcesExhausted`.
    pub async fn get_history(&self, game: GameType) -> Result<History, AcquisitionError> {
        let config = GameConfig::for_game(game);
        let mut failures = Vec::with_capacity(self.fetchers.len());

        for fetcher in &self.fetchers {
            let provider = fetcher.provider();
            log::info!("[{}] Fetching {} history", provider, game);

            let reason = match self.fetch_with_retry(fetcher.as_ref(), game).await {
                Ok(records) => {
                    let records = validated(records, &config);
                    if !records.is_empty() {
                        log::info!("[{}] Using {} {} draws", provider, records.len(), game);
                        self.store_cache(game, provider, &records).await;
                        return Ok(History {
                            game,
                            records,
                            origin: HistoryOrigin::Live(provider),
                            stale: false,
                            failures,
                        });
                    }
                    FailureReason::Empty
                }
                Err(error) => FailureReason::Failed(error),
            };

            log::warn!("[{}] {} unavailable: {}", provider, game, reason);
            failures.push(ProviderFailure { provider, reason });
        }

        if let Some(cached) = self.load_cache(game, &config).await {
            log::warn!(
                "All sources failed for {}; using {} cached draws from {} ({})",
                game,
                cached.records.len(),
                cached.provider,
                cached.saved_at.format("%Y-%m-%d %H:%M UTC")
            );
            return Ok(History {
                game,
                records: cached.records,
                origin: HistoryOrigin::Cache {
                    saved_at: cached.saved_at,
                    provider: cached.provider,
                },
                stale: true,
                failures,
            });
        }

        log::error!("All sources exhausted for {}", game);
        Err(AcquisitionError::AllSourcesExhausted { game, failures })
    }

    async fn fetch_with_retry(
        &self,
        fetcher: &dyn SourceFetcher,
        game: GameType,
    ) -> Result<Vec<DrawRecord>, FetchError> {
        let mut attempt = 0u32;
        loop {
            let result = tokio::time::timeout(self.policy.attempt_timeout, fetcher.fetch(game))
                .await
                .unwrap_or_else(|_| {
                    Err(FetchError::network(format!(
                        "no response within {}s",
                        self.policy.attempt_timeout.as_secs_f32()
                    )))
                });

            match result {
                Err(error) if error.is_transient() && attempt < self.policy.network_retries => {
                    attempt += 1;
                    log::warn!(
                        "[{}] {} (retry {}/{})",
                        fetcher.provider(),
                        error,
                        attempt,
                        self.policy.network_retries
                    );
                    if !self.policy.retry_delay.is_zero() {
                        tokio::time::sleep(self.policy.retry_delay).await;
                    }
                }
                other => return other,
            }
        }
    }

    async fn store_cache(&self, game: GameType, provider: Provider, records: &[DrawRecord]) {
        let Some(cache) = &self.cache else {
            return;
        };
        let entry = CachedHistory::new(game, provider, records.to_vec());
        if let Err(e) = cache.store(&entry).await {
            log::warn!("Failed to cache {} history: {}", game, e);
        }
    }

    async fn load_cache(&self, game: GameType, config: &GameConfig) -> Option<CachedHistory> {
        let cache = self.cache.as_ref()?;
        let mut cached = match cache.load(game).await {
            Ok(cached) => cached?,
            Err(e) => {
                log::warn!("Ignoring unreadable {} cache: {}", game, e);
                return None;
            }
        };

        let before = cached.records.len();
        cached.records = validated(cached.records, config);
        if cached.records.len() < before {
            log::warn!(
                "Dropped {} invalid cached {} draws",
                before - cached.records.len(),
                game
            );
        }
        (!cached.records.is_empty()).then_some(cached)
    }
}

fn validated(records: Vec<DrawRecord>, config: &GameConfig) -> Vec<DrawRecord> {
    dedupe_by_date(records.into_iter().filter(|r| r.is_valid_for(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{HangingFetcher, MemoryCache, ScriptedFetcher, sample_draws};

    fn policy() -> RetryPolicy {
        RetryPolicy {
            network_retries: 1,
            retry_delay: Duration::ZERO,
            attempt_timeout: Duration::from_secs(5),
        }
    }

    fn aggregator(fetchers: &[Arc<ScriptedFetcher>]) -> FallbackAggregator {
        let fetchers = fetchers
            .iter()
            .map(|f| Arc::clone(f) as Arc<dyn SourceFetcher>)
            .collect();
        FallbackAggregator::new(fetchers, policy())
    }

    #[tokio::test]
    async fn test_first_provider_wins() {
        let a = ScriptedFetcher::always(Provider::Wclc, Ok(sample_draws(GameType::Lotto649, 5)));
        let b = ScriptedFetcher::always(Provider::Olg, Ok(sample_draws(GameType::Lotto649, 3)));
        let c = ScriptedFetcher::always(Provider::Alc, Ok(sample_draws(GameType::Lotto649, 3)));

        let history = aggregator(&[a.clone(), b.clone(), c.clone()])
            .get_history(GameType::Lotto649)
            .await
            .unwrap();

        assert_eq!(history.origin, HistoryOrigin::Live(Provider::Wclc));
        assert_eq!(history.records.len(), 5);
        assert!(!history.stale);
        assert!(history.failures.is_empty());
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_falls_through_failures_and_empty_sets() {
        let a = ScriptedFetcher::always(Provider::Wclc, Err(FetchError::parse("layout changed")));
        let b = ScriptedFetcher::always(Provider::Olg, Ok(Vec::new()));
        let c = ScriptedFetcher::always(Provider::Alc, Ok(sample_draws(GameType::LottoMax, 4)));

        let history = aggregator(&[a.clone(), b.clone(), c.clone()])
            .get_history(GameType::LottoMax)
            .await
            .unwrap();

        assert_eq!(history.origin.provider(), Provider::Alc);
        assert_eq!(history.failures.len(), 2);
        assert_eq!(history.failures[1].reason, FailureReason::Empty);
        // Parse failures are not retried.
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_network_failure_retried_once() {
        let a = ScriptedFetcher::new(
            Provider::Wclc,
            vec![Err(FetchError::network("HTTP 503"))],
            Ok(sample_draws(GameType::Lotto649, 2)),
        );
        let history = aggregator(&[a.clone()])
            .get_history(GameType::Lotto649)
            .await
            .unwrap();
        assert_eq!(history.origin, HistoryOrigin::Live(Provider::Wclc));
        assert_eq!(a.calls(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_without_cache() {
        let a = ScriptedFetcher::always(Provider::Wclc, Err(FetchError::network("refused")));
        let b = ScriptedFetcher::always(Provider::Olg, Err(FetchError::parse("no rows")));
        let c = ScriptedFetcher::always(Provider::Alc, Ok(Vec::new()));

        let error = aggregator(&[a.clone(), b.clone(), c.clone()])
            .get_history(GameType::Lotto649)
            .await
            .unwrap_err();

        let failures = error.failures();
        assert_eq!(failures.len(), 3);
        assert_eq!(
            failures.iter().map(|f| f.provider).collect::<Vec<_>>(),
            vec![Provider::Wclc, Provider::Olg, Provider::Alc]
        );
        assert_eq!(a.calls(), 2);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_fail_returns_stale_cache() {
        let cache = Arc::new(MemoryCache::default());
        cache.insert(CachedHistory::new(
            GameType::Lotto649,
            Provider::Olg,
            sample_draws(GameType::Lotto649, 6),
        ));

        let fetchers: Vec<_> = [Provider::Wclc, Provider::Olg, Provider::Alc]
            .into_iter()
            .map(|p| ScriptedFetcher::always(p, Err(FetchError::network("offline"))))
            .collect();
        let history = aggregator(&fetchers)
            .with_cache(cache)
            .get_history(GameType::Lotto649)
            .await
            .unwrap();

        assert!(history.stale);
        assert_eq!(history.records.len(), 6);
        assert!(matches!(
            history.origin,
            HistoryOrigin::Cache { provider: Provider::Olg, .. }
        ));
        assert_eq!(history.failures.len(), 3);
    }

    #[tokio::test]
    async fn test_live_result_is_cached() {
        let cache = Arc::new(MemoryCache::default());
        let a = ScriptedFetcher::always(Provider::Wclc, Ok(sample_draws(GameType::LottoMax, 3)));

        aggregator(&[a])
            .with_cache(cache.clone())
            .get_history(GameType::LottoMax)
            .await
            .unwrap();

        let stored = cache.get(GameType::LottoMax).unwrap();
        assert_eq!(stored.provider, Provider::Wclc);
        assert_eq!(stored.records.len(), 3);
    }

    #[tokio::test]
    async fn test_cache_store_failure_is_not_fatal() {
        let cache = Arc::new(MemoryCache::failing());
        let a = ScriptedFetcher::always(Provider::Wclc, Ok(sample_draws(GameType::Lotto649, 3)));
        let history = aggregator(&[a])
            .with_cache(cache)
            .get_history(GameType::Lotto649)
            .await
            .unwrap();
        assert_eq!(history.records.len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_records_do_not_count() {
        // Max-sized records are invalid for 6/49, so the provider is empty.
        let a = ScriptedFetcher::always(Provider::Wclc, Ok(sample_draws(GameType::LottoMax, 3)));
        let error = aggregator(&[a])
            .get_history(GameType::Lotto649)
            .await
            .unwrap_err();
        assert_eq!(error.failures()[0].reason, FailureReason::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout_is_network_failure() {
        let hanging: Arc<dyn SourceFetcher> = Arc::new(HangingFetcher::new(Provider::Wclc));
        let fallback: Arc<dyn SourceFetcher> =
            ScriptedFetcher::always(Provider::Olg, Ok(sample_draws(GameType::Lotto649, 2)));
        let aggregator = FallbackAggregator::new(vec![hanging, fallback], policy());

        let history = aggregator.get_history(GameType::Lotto649).await.unwrap();
        assert_eq!(history.origin.provider(), Provider::Olg);
        assert!(matches!(
            history.failures[0].reason,
            FailureReason::Failed(FetchError::NetworkFailure(_))
        ));
    }
}
