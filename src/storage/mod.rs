//! Local persistence for the generator application.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Optional configuration
//! ├── history-649.json      # Last good Lotto 6/49 record set
//! ├── history-max.json      # Last good Lotto Max record set
//! └── generations.csv       # Opt-in journal of generated lines
//! ```

pub mod journal;
pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{DrawRecord, GameType, Provider};

// Re-export for convenience
pub use journal::{GenerationJournal, JournalEntry, export_lines};
pub use local::LocalCache;

/// Last successful record set for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedHistory {
    pub game: GameType,
    /// When the records were fetched
    pub saved_at: DateTime<Utc>,
    /// Provider that delivered the records
    pub provider: Provider,
    pub records: Vec<DrawRecord>,
}

impl CachedHistory {
    pub fn new(game: GameType, provider: Provider, records: Vec<DrawRecord>) -> Self {
        Self {
            game,
            saved_at: Utc::now(),
            provider,
            records,
        }
    }
}

/// Trait for history cache backends.
#[async_trait]
pub trait HistoryCache: Send + Sync {
    /// Load the cached set for `game`, `None` when nothing was stored yet.
    async fn load(&self, game: GameType) -> Result<Option<CachedHistory>>;

    /// Replace the cached set for `history.game`.
    async fn store(&self, history: &CachedHistory) -> Result<()>;
}
