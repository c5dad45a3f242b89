//! Application configuration structures.

use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{CompositeWeights, Flavor, GameType, Provider};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and retry behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Frequency analysis settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Smart pick weighting
    #[serde(default)]
    pub weighting: WeightingConfig,

    /// Line generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Local history cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Result providers in priority order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.attempt_timeout_secs == 0 {
            return Err(AppError::validation(
                "fetch.attempt_timeout_secs must be > 0",
            ));
        }
        if self.analysis.lookback == Some(0) {
            return Err(AppError::validation("analysis.lookback must be > 0 when set"));
        }
        if self.analysis.top_k == 0 {
            return Err(AppError::validation("analysis.top_k must be > 0"));
        }
        if let Some(custom) = &self.weighting.custom {
            if !custom.is_valid() {
                return Err(AppError::validation(
                    "weighting.custom weights must be finite and >= 0",
                ));
            }
        }
        if self.generation.lines == 0 {
            return Err(AppError::validation("generation.lines must be > 0"));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }
        for source in &self.sources {
            source.validate()?;
        }
        Ok(())
    }

    /// Weights for the given flavor, or the configured one.
    ///
    /// Custom weights override presets only when no flavor is requested.
    pub fn weights(&self, flavor: Option<Flavor>) -> CompositeWeights {
        match (flavor, self.weighting.custom) {
            (Some(flavor), _) => flavor.weights(),
            (None, Some(custom)) => custom,
            (None, None) => self.weighting.flavor.weights(),
        }
    }

    /// Name of the weighting `weights(flavor)` resolves to.
    pub fn weighting_label(&self, flavor: Option<Flavor>) -> &'static str {
        match (flavor, self.weighting.custom) {
            (Some(flavor), _) => flavor.as_str(),
            (None, Some(_)) => "custom",
            (None, None) => self.weighting.flavor.as_str(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            analysis: AnalysisConfig::default(),
            weighting: WeightingConfig::default(),
            generation: GenerationConfig::default(),
            cache: CacheConfig::default(),
            sources: defaults::sources(),
        }
    }
}

/// HTTP client and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Upper bound for one provider attempt (all of its URLs)
    #[serde(default = "defaults::attempt_timeout")]
    pub attempt_timeout_secs: u64,

    /// Delay between requests to the same provider in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Extra attempts after a network failure
    #[serde(default = "defaults::network_retries")]
    pub network_retries: u32,

    /// Delay before a retry in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            attempt_timeout_secs: defaults::attempt_timeout(),
            request_delay_ms: defaults::request_delay(),
            network_retries: defaults::network_retries(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

/// Frequency analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Analyze only the most recent N draws (all when unset)
    #[serde(default)]
    pub lookback: Option<usize>,

    /// Length of the hot/cold/overdue lists in reports
    #[serde(default = "defaults::top_k")]
    pub top_k: usize,
}

impl AnalysisConfig {
    /// Lookback after a command-line override; `Some(0)` means all draws.
    pub fn lookback_or(&self, requested: Option<usize>) -> Option<usize> {
        match requested {
            Some(0) => None,
            Some(n) => Some(n),
            None => self.lookback,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            lookback: None,
            top_k: defaults::top_k(),
        }
    }
}

/// Smart pick weighting settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightingConfig {
    /// Preset used when no custom weights are given
    #[serde(default)]
    pub flavor: Flavor,

    /// Explicit weights overriding the preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CompositeWeights>,
}

/// Line generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Main lines per set
    #[serde(default = "defaults::lines")]
    pub lines: usize,

    /// Append every generated line to the CSV journal
    #[serde(default)]
    pub save_history: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            lines: defaults::lines(),
            save_history: false,
        }
    }
}

/// Local history cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Read and write the cache
    #[serde(default = "defaults::cache_enabled")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::cache_enabled(),
        }
    }
}

/// One result provider and its pages per game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub provider: Provider,

    /// Lotto 6/49 result pages, tried in order
    #[serde(default)]
    pub lotto_649: Vec<String>,

    /// Lotto Max result pages, tried in order
    #[serde(default)]
    pub lotto_max: Vec<String>,

    /// CSS selector for result blocks (providers that parse by block)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_selector: Option<String>,
}

impl SourceConfig {
    pub fn urls_for(&self, game: GameType) -> &[String] {
        match game {
            GameType::Lotto649 => &self.lotto_649,
            GameType::LottoMax => &self.lotto_max,
        }
    }

    fn validate(&self) -> Result<()> {
        for url in self.lotto_649.iter().chain(&self.lotto_max) {
            let parsed = url::Url::parse(url)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::validation(format!(
                    "source {} has non-HTTP URL {url}",
                    self.provider
                )));
            }
        }
        if let Some(selector) = &self.block_selector {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        Ok(())
    }
}

mod defaults {
    use super::SourceConfig;
    use crate::models::Provider;

    // Fetch defaults
    pub fn user_agent() -> String {
        concat!("LottoGen/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn attempt_timeout() -> u64 {
        45
    }
    pub fn request_delay() -> u64 {
        200
    }
    pub fn network_retries() -> u32 {
        1
    }
    pub fn retry_delay() -> u64 {
        500
    }

    // Analysis defaults
    pub fn top_k() -> usize {
        10
    }

    // Generation defaults
    pub fn lines() -> usize {
        3
    }

    // Cache defaults
    pub fn cache_enabled() -> bool {
        true
    }

    // Source defaults
    pub fn sources() -> Vec<SourceConfig> {
        vec![
            SourceConfig {
                provider: Provider::Wclc,
                lotto_649: vec![
                    "https://www.wclc.com/winning-numbers/lotto-649-extra.htm?channel=print"
                        .to_string(),
                    "https://www.wclc.com/winning-numbers/lotto-649-extra.htm?channel=print&printMode=true"
                        .to_string(),
                ],
                lotto_max: vec![
                    "https://www.wclc.com/winning-numbers/lotto-max-extra.htm?channel=print"
                        .to_string(),
                    "https://www.wclc.com/winning-numbers/lotto-max-extra.htm?channel=print&printMode=true"
                        .to_string(),
                ],
                block_selector: None,
            },
            SourceConfig {
                provider: Provider::Olg,
                lotto_649: vec![
                    "https://www.olg.ca/en/lottery/play-lotto-649-encore/past-results.html"
                        .to_string(),
                    "https://lottery.olg.ca/en-ca/winning-numbers/lotto-6-49".to_string(),
                ],
                lotto_max: vec![
                    "https://www.olg.ca/en/lottery/play-lotto-max-encore/past-results.html"
                        .to_string(),
                    "https://lottery.olg.ca/en-ca/winning-numbers/lotto-max".to_string(),
                ],
                block_selector: None,
            },
            SourceConfig {
                provider: Provider::Alc,
                lotto_649: vec!["https://www.alc.ca/content/alc/en/winning-numbers.html".to_string()],
                lotto_max: vec!["https://www.alc.ca/content/alc/en/winning-numbers.html".to_string()],
                block_selector: Some("table tr, li, .winning-numbers, .game-result".to_string()),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.fetch.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_lookback() {
        let mut config = Config::default();
        config.analysis.lookback = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_custom_weights() {
        let mut config = Config::default();
        config.weighting.custom = Some(CompositeWeights::new(1.0, -0.5, 1.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_source() {
        let mut config = Config::default();
        config.sources[0].lotto_649 = vec!["ftp://example.com/results".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_sources_follow_priority_order() {
        let providers: Vec<Provider> = Config::default()
            .sources
            .iter()
            .map(|s| s.provider)
            .collect();
        assert_eq!(providers, vec![Provider::Wclc, Provider::Olg, Provider::Alc]);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [fetch]
            timeout_secs = 5

            [weighting]
            flavor = "hot"
            "#,
        )
        .unwrap();
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.network_retries, 1);
        assert_eq!(config.weighting.flavor, Flavor::Hot);
        assert_eq!(config.sources.len(), 3);
        assert_eq!(config.weights(None), Flavor::Hot.weights());
    }

    #[test]
    fn explicit_flavor_overrides_custom_weights() {
        let mut config = Config::default();
        config.weighting.custom = Some(CompositeWeights::new(0.0, 3.0, 0.0));
        assert_eq!(config.weights(None), CompositeWeights::new(0.0, 3.0, 0.0));
        assert_eq!(config.weights(Some(Flavor::Overdue)), Flavor::Overdue.weights());
    }

    #[test]
    fn weighting_label_follows_resolved_weights() {
        let mut config = Config::default();
        config.weighting.flavor = Flavor::Hot;
        assert_eq!(config.weighting_label(None), "hot");

        config.weighting.custom = Some(CompositeWeights::new(0.0, 3.0, 0.0));
        assert_eq!(config.weighting_label(None), "custom");
        assert_eq!(config.weighting_label(Some(Flavor::Overdue)), "overdue");
    }

    #[test]
    fn lookback_override_wins_over_config() {
        let mut analysis = AnalysisConfig::default();
        assert_eq!(analysis.lookback_or(None), None);
        assert_eq!(analysis.lookback_or(Some(25)), Some(25));

        analysis.lookback = Some(100);
        assert_eq!(analysis.lookback_or(None), Some(100));
        assert_eq!(analysis.lookback_or(Some(10)), Some(10));
        assert_eq!(analysis.lookback_or(Some(0)), None);
    }
}
