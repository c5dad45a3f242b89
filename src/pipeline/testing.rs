//! Scripted fetchers and an in-memory cache for pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use parking_lot::Mutex;

use crate::error::{AppError, FetchError, Result};
use crate::models::{DrawRecord, GameConfig, GameType, Provider};
use crate::services::SourceFetcher;
use crate::storage::{CachedHistory, HistoryCache};

type FetchResult = std::result::Result<Vec<DrawRecord>, FetchError>;

/// Replays queued results, then repeats `fallback`.
pub struct ScriptedFetcher {
    provider: Provider,
    script: Mutex<VecDeque<FetchResult>>,
    fallback: FetchResult,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(provider: Provider, script: Vec<FetchResult>, fallback: FetchResult) -> Arc<Self> {
        Arc::new(Self {
            provider,
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn always(provider: Provider, result: FetchResult) -> Arc<Self> {
        Self::new(provider, Vec::new(), result)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for ScriptedFetcher {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch(&self, _game: GameType) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Never answers within any reasonable timeout.
pub struct HangingFetcher {
    provider: Provider,
}

impl HangingFetcher {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SourceFetcher for HangingFetcher {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch(&self, _game: GameType) -> FetchResult {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<GameType, CachedHistory>>,
    fail_store: bool,
}

impl MemoryCache {
    pub fn failing() -> Self {
        Self {
            fail_store: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, history: CachedHistory) {
        self.entries.lock().insert(history.game, history);
    }

    pub fn get(&self, game: GameType) -> Option<CachedHistory> {
        self.entries.lock().get(&game).cloned()
    }
}

#[async_trait]
impl HistoryCache for MemoryCache {
    async fn load(&self, game: GameType) -> Result<Option<CachedHistory>> {
        Ok(self.get(game))
    }

    async fn store(&self, history: &CachedHistory) -> Result<()> {
        if self.fail_store {
            return Err(AppError::config("read-only cache"));
        }
        self.insert(history.clone());
        Ok(())
    }
}

/// `count` valid draws on consecutive days from 2024-01-01.
pub fn sample_draws(game: GameType, count: usize) -> Vec<DrawRecord> {
    let config = GameConfig::for_game(game);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    (0..count)
        .filter_map(|i| {
            let date = start.checked_add_days(Days::new(i as u64))?;
            let first = (i % 40) as u8 + 1;
            let numbers: Vec<u8> = (first..first + config.picks_per_line as u8).collect();
            DrawRecord::new(date, &numbers, None, &config)
        })
        .collect()
}
