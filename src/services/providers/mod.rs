// src/services/providers/mod.rs

//! Result providers.
//!
//! Each provider owns its page-structure assumptions behind the
//! [`SourceFetcher`] capability:
//!
//! - [`WclcFetcher`]: print-mode text pages split by month name
//! - [`OlgFetcher`]: past-results tables
//! - [`AlcFetcher`]: winning-number blocks matched by a CSS selector

mod alc;
mod olg;
pub mod parse;
mod wclc;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{FetchError, Result};
use crate::models::{Config, DrawRecord, GameConfig, GameType, Provider, dedupe_by_date};
use crate::utils::{get_domain, http};

pub use alc::{AlcFetcher, AlcParser};
pub use olg::{OlgFetcher, OlgParser};
pub use parse::ParseOutcome;
pub use wclc::{WclcFetcher, WclcParser};

/// One provider's way of turning a game into draw records.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    fn provider(&self) -> Provider;

    /// Fetch and parse the provider's history for `game`.
    async fn fetch(&self, game: GameType) -> std::result::Result<Vec<DrawRecord>, FetchError>;
}

/// Converts one fetched page into records.
pub trait PageParser: Send + Sync {
    fn parse(&self, html: &str, game: &GameConfig) -> ParseOutcome;
}

/// Fetches every configured page of a provider and merges the parsed draws.
#[derive(Debug, Clone)]
pub struct PageCollector {
    client: Client,
    request_delay: Duration,
}

impl PageCollector {
    pub fn new(client: Client, request_delay: Duration) -> Self {
        Self {
            client,
            request_delay,
        }
    }

    /// Try each URL in order and merge the records by draw date.
    ///
    /// Fails with `NetworkFailure` when no page could be fetched and with
    /// `ParseFailure` when pages were fetched but held no valid draw.
    pub async fn collect<P: PageParser>(
        &self,
        provider: Provider,
        urls: &[String],
        game: &GameConfig,
        parser: &P,
    ) -> std::result::Result<Vec<DrawRecord>, FetchError> {
        if urls.is_empty() {
            return Err(FetchError::parse(format!(
                "no result pages configured for {}",
                game.game_type
            )));
        }

        let mut records = Vec::new();
        let mut fetched_pages = 0usize;
        let mut dropped = 0usize;
        let mut last_error = None;

        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            match http::fetch_html(&self.client, url).await {
                Ok(html) => {
                    fetched_pages += 1;
                    let outcome = parser.parse(&html, game);
                    log::info!(
                        "[{}] Parsed {} draws from {}",
                        provider,
                        outcome.records.len(),
                        get_domain(url).unwrap_or_else(|| url.clone())
                    );
                    if outcome.dropped > 0 {
                        log::debug!(
                            "[{}] Dropped {} malformed entries from {}",
                            provider,
                            outcome.dropped,
                            url
                        );
                    }
                    dropped += outcome.dropped;
                    records.extend(outcome.records);
                }
                Err(error) => {
                    log::warn!("[{}] Skip {}: {}", provider, url, error);
                    last_error = Some(error);
                }
            }
        }

        let records = dedupe_by_date(records);
        if !records.is_empty() {
            return Ok(records);
        }
        if fetched_pages == 0 {
            return Err(last_error.unwrap_or_else(|| FetchError::network("no page reachable")));
        }
        Err(FetchError::parse(format!(
            "{fetched_pages} page(s) fetched but no valid {} draws ({dropped} malformed)",
            game.game_type
        )))
    }
}

/// Build the configured fetchers in priority order.
pub fn build_fetchers(config: &Config, client: &Client) -> Result<Vec<Arc<dyn SourceFetcher>>> {
    let pages = PageCollector::new(
        client.clone(),
        Duration::from_millis(config.fetch.request_delay_ms),
    );

    config
        .sources
        .iter()
        .map(|source| -> Result<Arc<dyn SourceFetcher>> {
            Ok(match source.provider {
                Provider::Wclc => Arc::new(WclcFetcher::new(pages.clone(), source.clone())?),
                Provider::Olg => Arc::new(OlgFetcher::new(pages.clone(), source.clone())?),
                Provider::Alc => Arc::new(AlcFetcher::new(pages.clone(), source.clone())?),
            })
        })
        .collect()
}
