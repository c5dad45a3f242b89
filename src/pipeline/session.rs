// src/pipeline/session.rs

//! Session-scoped state shared with the presentation layer.
//!
//! The session owns the aggregator, one frequency snapshot per game and the
//! in-flight refresh tasks. Snapshots are immutable `Arc`s swapped under a
//! write lock, so readers keep a consistent table while a refresh runs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::task::{AbortHandle, JoinHandle};

use super::aggregate::{FallbackAggregator, History, HistoryOrigin};
use crate::error::{AcquisitionError, GenerationError};
use crate::models::{
    CompositeWeights, DrawRecord, FrequencyTable, GameConfig, GameType, GeneratedLine, PickMode,
    Strategy,
};
use crate::services::{FrequencyAnalyzer, LineGenerator};

/// Analysis result installed by a refresh.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub game: GameType,
    pub table: FrequencyTable,
    pub origin: HistoryOrigin,
    /// Number of draws in the fetched history, before lookback
    pub draws: usize,
    pub stale: bool,
    /// Set when a later refresh failed and this snapshot was kept
    pub refresh_failed: bool,
    pub refreshed_at: DateTime<Utc>,
}

impl Snapshot {
    fn stale_copy(&self) -> Self {
        Self {
            stale: true,
            refresh_failed: true,
            ..self.clone()
        }
    }

    /// Short description of where the draws came from.
    pub fn source_label(&self) -> String {
        match self.origin {
            HistoryOrigin::Live(provider) if self.refresh_failed => {
                format!("{provider} (last live fetch, refresh failed)")
            }
            HistoryOrigin::Live(provider) => format!("{provider} (live)"),
            HistoryOrigin::Cache { saved_at, provider } => format!(
                "{provider} (cached {})",
                saved_at.format("%Y-%m-%d %H:%M UTC")
            ),
        }
    }
}

pub struct Session {
    aggregator: FallbackAggregator,
    lookback: Option<usize>,
    snapshots: RwLock<HashMap<GameType, Arc<Snapshot>>>,
    tasks: Mutex<HashMap<GameType, AbortHandle>>,
    generator: Mutex<LineGenerator>,
}

impl Session {
    pub fn new(aggregator: FallbackAggregator, generator: LineGenerator) -> Self {
        Self {
            aggregator,
            lookback: None,
            snapshots: RwLock::new(HashMap::new()),
            tasks: Mutex::new(HashMap::new()),
            generator: Mutex::new(generator),
        }
    }

    /// Analyze only the most recent `lookback` draws.
    pub fn with_lookback(mut self, lookback: Option<usize>) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn aggregator(&self) -> &FallbackAggregator {
        &self.aggregator
    }

    pub async fn get_history(&self, game: GameType) -> Result<History, AcquisitionError> {
        self.aggregator.get_history(game).await
    }

    pub fn analyze(&self, game: GameType, records: &[DrawRecord]) -> FrequencyTable {
        FrequencyAnalyzer::new(GameConfig::for_game(game))
            .with_lookback(self.lookback)
            .analyze(records)
    }

    /// Fetch, analyze and install a new snapshot for `game`.
    ///
    /// On failure an existing snapshot stays in place, now flagged stale.
    pub async fn refresh(&self, game: GameType) -> Result<Arc<Snapshot>, AcquisitionError> {
        match self.get_history(game).await {
            Ok(history) => {
                let snapshot = Arc::new(Snapshot {
                    game,
                    table: self.analyze(game, &history.records),
                    origin: history.origin,
                    draws: history.records.len(),
                    stale: history.stale,
                    refresh_failed: false,
                    refreshed_at: Utc::now(),
                });
                self.snapshots.write().insert(game, Arc::clone(&snapshot));
                log::info!(
                    "{} snapshot ready: {} draws from {}{}",
                    game,
                    snapshot.table.sample_size(),
                    snapshot.origin.provider(),
                    if snapshot.stale { " (stale)" } else { "" }
                );
                Ok(snapshot)
            }
            Err(error) => {
                let mut snapshots = self.snapshots.write();
                if let Some(previous) = snapshots.get_mut(&game) {
                    if !previous.refresh_failed {
                        *previous = Arc::new(previous.stale_copy());
                    }
                    log::warn!("Keeping previous {} snapshot as stale", game);
                }
                Err(error)
            }
        }
    }

    /// Run [`Session::refresh`] on a background task.
    ///
    /// A refresh already running for the same game is aborted first.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        game: GameType,
    ) -> JoinHandle<Result<Arc<Snapshot>, AcquisitionError>> {
        let session = Arc::clone(self);
        let handle = tokio::spawn(async move { session.refresh(game).await });

        let mut tasks = self.tasks.lock();
        tasks.retain(|_, task| !task.is_finished());
        if let Some(previous) = tasks.insert(game, handle.abort_handle()) {
            previous.abort();
        }
        handle
    }

    /// Abort the in-flight refresh for `game`. Returns whether one was still running.
    pub fn cancel(&self, game: GameType) -> bool {
        match self.tasks.lock().remove(&game) {
            Some(task) => {
                let running = !task.is_finished();
                task.abort();
                running
            }
            None => false,
        }
    }

    pub fn shutdown(&self) {
        for (game, task) in self.tasks.lock().drain() {
            if !task.is_finished() {
                log::debug!("Aborting {} refresh", game);
            }
            task.abort();
        }
    }

    pub fn snapshot(&self, game: GameType) -> Option<Arc<Snapshot>> {
        self.snapshots.read().get(&game).cloned()
    }

    /// Whether the current snapshot is served from stale data.
    pub fn is_stale(&self, game: GameType) -> bool {
        self.snapshot(game).is_some_and(|s| s.stale)
    }

    pub fn set_weights(&self, weights: CompositeWeights) {
        self.generator.lock().set_weights(weights);
    }

    pub fn generate(
        &self,
        game: GameType,
        strategy: Strategy,
    ) -> Result<GeneratedLine, GenerationError> {
        let config = GameConfig::for_game(game);
        let table = self.table_or_empty(game, &config);
        self.generator.lock().generate(strategy, &table, &config)
    }

    /// `lines` lines of `mode`, plus the top-probability line when the
    /// game has statistics.
    pub fn generate_set(
        &self,
        game: GameType,
        mode: PickMode,
        lines: usize,
    ) -> Result<Vec<GeneratedLine>, GenerationError> {
        let config = GameConfig::for_game(game);
        let table = self.table_or_empty(game, &config);

        let mut generator = self.generator.lock();
        let mut set = (0..lines)
            .map(|_| generator.generate(mode.strategy(), &table, &config))
            .collect::<Result<Vec<_>, _>>()?;
        if !table.is_empty() {
            set.push(generator.generate(Strategy::BonusTopProbability, &table, &config)?);
        }
        Ok(set)
    }

    fn table_or_empty(&self, game: GameType, config: &GameConfig) -> FrequencyTable {
        self.snapshot(game)
            .map(|s| s.table.clone())
            .unwrap_or_else(|| FrequencyTable::empty(config))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
