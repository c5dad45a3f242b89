// src/services/analyzer.rs

//! Frequency analysis over normalized draw records.

use std::collections::BTreeMap;

use crate::models::{
    DrawRecord, FrequencyTable, GameConfig, NumberStat, dedupe_by_date,
};

/// Builds [`FrequencyTable`]s for one game.
///
/// `analyze` is a pure function of its input: records are ordered and
/// deduplicated by date first, so two calls on the same record set yield
/// equal tables whatever the input order.
#[derive(Debug, Clone)]
pub struct FrequencyAnalyzer {
    game: GameConfig,
    lookback: Option<usize>,
}

impl FrequencyAnalyzer {
    pub fn new(game: GameConfig) -> Self {
        Self {
            game,
            lookback: None,
        }
    }

    /// Restrict analysis to the most recent `lookback` draws.
    pub fn with_lookback(mut self, lookback: Option<usize>) -> Self {
        self.lookback = lookback.filter(|&n| n > 0);
        self
    }

    pub fn game(&self) -> &GameConfig {
        &self.game
    }

    pub fn analyze(&self, records: &[DrawRecord]) -> FrequencyTable {
        let mut draws = dedupe_by_date(records.iter().cloned());
        if let Some(lookback) = self.lookback {
            let skip = draws.len().saturating_sub(lookback);
            draws.drain(..skip);
        }

        if draws.is_empty() {
            return FrequencyTable::empty(&self.game);
        }

        let mut stats: BTreeMap<u8, NumberStat> = self
            .game
            .number_range()
            .map(|n| (n, NumberStat::default()))
            .collect();

        let latest_index = draws.len() - 1;
        for (index, draw) in draws.iter().enumerate() {
            for number in draw.numbers() {
                if let Some(stat) = stats.get_mut(number) {
                    stat.count += 1;
                    stat.last_seen = Some(draw.draw_date());
                    stat.gap = Some(u32::try_from(latest_index - index).unwrap_or(u32::MAX));
                }
            }
            if let Some(stat) = draw.bonus_number().and_then(|b| stats.get_mut(&b)) {
                stat.bonus_count += 1;
            }
        }

        log::debug!(
            "Analyzed {} {} draws ({} to {})",
            draws.len(),
            self.game.game_type,
            draws[0].draw_date(),
            draws[latest_index].draw_date()
        );

        FrequencyTable::from_parts(
            self.game.game_type,
            draws.len(),
            Some(draws[latest_index].draw_date()),
            stats,
        )
    }
}
