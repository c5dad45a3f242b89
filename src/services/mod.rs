//! Service layer for the generator application.
//!
//! This module contains the business logic for:
//! - Result page scraping per provider (`providers`)
//! - Frequency analysis (`FrequencyAnalyzer`)
//! - Line generation (`LineGenerator`)

mod analyzer;
mod generator;
pub mod providers;

pub use analyzer::FrequencyAnalyzer;
pub use generator::{LineGenerator, composite_scores};
pub use providers::{
    AlcFetcher, AlcParser, OlgFetcher, OlgParser, PageCollector, PageParser, SourceFetcher,
    WclcFetcher, WclcParser, build_fetchers,
};
