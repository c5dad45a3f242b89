// src/models/draw.rs

//! Normalized draw result.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::GameConfig;

/// One historical draw, validated against its game.
///
/// Fields are private so a record can only be built through [`DrawRecord::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    draw_date: NaiveDate,
    numbers: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bonus_number: Option<u8>,
}

impl DrawRecord {
    /// Build a record, returning `None` unless the main numbers are exactly
    /// `picks_per_line` distinct in-range values.
    ///
    /// An invalid bonus (out of range or repeating a main number) is dropped
    /// rather than rejecting the draw. It is also dropped when the game has
    /// bonus handling disabled.
    pub fn new(
        draw_date: NaiveDate,
        numbers: &[u8],
        bonus_number: Option<u8>,
        game: &GameConfig,
    ) -> Option<Self> {
        if numbers.len() != game.picks_per_line {
            return None;
        }
        let unique: BTreeSet<u8> = numbers.iter().copied().collect();
        if unique.len() != numbers.len() || !unique.iter().all(|&n| game.contains(n)) {
            return None;
        }

        let bonus_number = bonus_number
            .filter(|_| game.bonus_enabled)
            .filter(|b| game.contains(*b) && !unique.contains(b));

        Some(Self {
            draw_date,
            numbers: unique.into_iter().collect(),
            bonus_number,
        })
    }

    pub fn draw_date(&self) -> NaiveDate {
        self.draw_date
    }

    /// Main numbers, ascending.
    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    pub fn bonus_number(&self) -> Option<u8> {
        self.bonus_number
    }

    /// Re-check a record that was deserialized from outside the process.
    pub fn is_valid_for(&self, game: &GameConfig) -> bool {
        Self::new(self.draw_date, &self.numbers, self.bonus_number, game).as_ref() == Some(self)
    }
}

/// Sort by date and keep one record per date; later entries win.
pub fn dedupe_by_date(records: impl IntoIterator<Item = DrawRecord>) -> Vec<DrawRecord> {
    let mut by_date = std::collections::BTreeMap::new();
    for record in records {
        by_date.insert(record.draw_date, record);
    }
    by_date.into_values().collect()
}
