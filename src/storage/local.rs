//! Local filesystem history cache.
//!
//! One JSON file per game, replaced atomically on every successful fetch.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::GameType;
use crate::storage::{CachedHistory, HistoryCache};

/// Local filesystem cache backend.
#[derive(Debug, Clone)]
pub struct LocalCache {
    root_dir: PathBuf,
}

impl LocalCache {
    /// Create a new LocalCache rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of the cache file for `game`.
    pub fn history_path(&self, game: GameType) -> PathBuf {
        self.path(&Self::history_key(game))
    }

    fn history_key(game: GameType) -> String {
        format!("history-{}.json", game.slug())
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl HistoryCache for LocalCache {
    async fn load(&self, game: GameType) -> Result<Option<CachedHistory>> {
        let key = Self::history_key(game);
        let Some(cached) = self.read_json::<CachedHistory>(&key).await? else {
            log::debug!("No cached history at {}", key);
            return Ok(None);
        };
        if cached.game != game {
            return Err(AppError::validation(format!(
                "{key} holds {} records, expected {game}",
                cached.game
            )));
        }
        Ok(Some(cached))
    }

    async fn store(&self, history: &CachedHistory) -> Result<()> {
        let key = Self::history_key(history.game);
        self.write_json(&key, history).await?;
        log::info!("Cached {} {} draws to {}", history.records.len(), history.game, key);
        Ok(())
    }
}
