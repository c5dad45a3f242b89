// src/models/frequency.rs

//! Per-number draw statistics.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{GameConfig, GameType};

/// Statistics for a single number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NumberStat {
    /// Appearances as a main number
    pub count: u32,
    /// Appearances as the bonus number
    pub bonus_count: u32,
    /// Date of the most recent main-number appearance
    pub last_seen: Option<NaiveDate>,
    /// Draws since the most recent appearance (0 = latest draw)
    pub gap: Option<u32>,
}

impl NumberStat {
    fn recency_key(&self) -> u32 {
        self.gap.unwrap_or(u32::MAX)
    }
}

/// Frequency table for one game, built by [`crate::services::FrequencyAnalyzer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    game: GameType,
    sample_size: usize,
    latest_draw: Option<NaiveDate>,
    stats: BTreeMap<u8, NumberStat>,
}

impl FrequencyTable {
    /// Table with every number of the range at zero.
    pub fn empty(game: &GameConfig) -> Self {
        Self {
            game: game.game_type,
            sample_size: 0,
            latest_draw: None,
            stats: game
                .number_range()
                .map(|n| (n, NumberStat::default()))
                .collect(),
        }
    }

    pub(crate) fn from_parts(
        game: GameType,
        sample_size: usize,
        latest_draw: Option<NaiveDate>,
        stats: BTreeMap<u8, NumberStat>,
    ) -> Self {
        Self {
            game,
            sample_size,
            latest_draw,
            stats,
        }
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    /// Number of draws the table was built from.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn latest_draw(&self) -> Option<NaiveDate> {
        self.latest_draw
    }

    /// True when no draw contributed to the table.
    pub fn is_empty(&self) -> bool {
        self.sample_size == 0
    }

    pub fn stat(&self, number: u8) -> Option<&NumberStat> {
        self.stats.get(&number)
    }

    pub fn count(&self, number: u8) -> u32 {
        self.stats.get(&number).map_or(0, |s| s.count)
    }

    /// All numbers with their stats, ascending by number.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &NumberStat)> {
        self.stats.iter().map(|(n, s)| (*n, s))
    }

    pub fn max_count(&self) -> u32 {
        self.stats.values().map(|s| s.count).max().unwrap_or(0)
    }

    /// Most frequent numbers; ties go to the most recent, then the lowest number.
    pub fn hot(&self, k: usize) -> Vec<(u8, NumberStat)> {
        let mut ranked = self.ranked();
        ranked.sort_by_key(|(n, s)| (Reverse(s.count), s.recency_key(), *n));
        ranked.truncate(k);
        ranked
    }

    /// Least frequent numbers with the same tie-break as [`Self::hot`].
    pub fn cold(&self, k: usize) -> Vec<(u8, NumberStat)> {
        let mut ranked = self.ranked();
        ranked.sort_by_key(|(n, s)| (s.count, s.recency_key(), *n));
        ranked.truncate(k);
        ranked
    }

    /// Longest gap first. Never-seen numbers lead, lowest number first.
    pub fn overdue(&self, k: usize) -> Vec<(u8, NumberStat)> {
        let mut ranked = self.ranked();
        ranked.sort_by_key(|(n, s)| (Reverse(s.recency_key()), *n));
        ranked.truncate(k);
        ranked
    }

    fn ranked(&self) -> Vec<(u8, NumberStat)> {
        self.stats.iter().map(|(n, s)| (*n, *s)).collect()
    }
}
