// src/models/mod.rs

//! Domain models for the generator application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod draw;
mod frequency;
mod game;
mod line;
mod weights;

// Re-export all public types
pub use config::{
    AnalysisConfig, CacheConfig, Config, FetchConfig, GenerationConfig, SourceConfig,
    WeightingConfig,
};
pub use draw::{DrawRecord, dedupe_by_date};
pub use frequency::{FrequencyTable, NumberStat};
pub use game::{GameConfig, GameType, Provider};
pub use line::{GeneratedLine, PickMode, Strategy};
pub use weights::{CompositeWeights, Flavor};
