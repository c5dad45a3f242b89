// src/models/game.rs

//! Game definitions and result providers.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Supported lottery games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameType {
    #[serde(rename = "649")]
    Lotto649,
    #[serde(rename = "max")]
    LottoMax,
}

impl GameType {
    pub const ALL: [GameType; 2] = [GameType::Lotto649, GameType::LottoMax];

    /// Display name used on result pages and in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            GameType::Lotto649 => "Lotto 6/49",
            GameType::LottoMax => "Lotto Max",
        }
    }

    /// Short identifier used in file names and on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            GameType::Lotto649 => "649",
            GameType::LottoMax => "max",
        }
    }

    /// Jackpot odds summary shown by the `odds` command.
    pub fn odds_summary(&self) -> &'static str {
        match self {
            GameType::Lotto649 => {
                "selects 6 numbers from 1-49. Jackpot odds: 1 in 13,983,816; overall odds ~1 in 6.6."
            }
            GameType::LottoMax => {
                "selects 7 numbers from 1-50 (+bonus for secondary prizes). Jackpot odds per line: about 1 in 33,294,800."
            }
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "649" | "6/49" | "lotto649" | "lotto-649" => Ok(GameType::Lotto649),
            "max" | "lottomax" | "lotto-max" => Ok(GameType::LottoMax),
            other => Err(format!("unknown game '{other}' (expected '649' or 'max')")),
        }
    }
}

/// Result websites, in their default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Western Canada Lottery Corporation
    Wclc,
    /// Ontario Lottery and Gaming
    Olg,
    /// Atlantic Lottery Corporation
    Alc,
}

impl Provider {
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Wclc => "WCLC",
            Provider::Olg => "OLG",
            Provider::Alc => "ALC",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shape of one game: number range, picks per line and bonus handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub game_type: GameType,
    pub min_number: u8,
    pub max_number: u8,
    pub picks_per_line: usize,
    /// Whether draws carry a bonus number that parsers should keep.
    pub bonus_enabled: bool,
}

impl GameConfig {
    /// Standard configuration for a game.
    pub fn for_game(game_type: GameType) -> Self {
        match game_type {
            GameType::Lotto649 => Self {
                game_type,
                min_number: 1,
                max_number: 49,
                picks_per_line: 6,
                bonus_enabled: true,
            },
            GameType::LottoMax => Self {
                game_type,
                min_number: 1,
                max_number: 50,
                picks_per_line: 7,
                bonus_enabled: true,
            },
        }
    }

    pub fn number_range(&self) -> RangeInclusive<u8> {
        self.min_number..=self.max_number
    }

    /// Count of numbers in the range (0 for an inverted range).
    pub fn range_size(&self) -> usize {
        if self.max_number < self.min_number {
            0
        } else {
            usize::from(self.max_number - self.min_number) + 1
        }
    }

    pub fn contains(&self, number: u8) -> bool {
        self.number_range().contains(&number)
    }

    /// Check the line invariants can be satisfied.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.max_number < self.min_number {
            return Err(GenerationError::invalid_config(format!(
                "number range {}-{} is inverted",
                self.min_number, self.max_number
            )));
        }
        if self.picks_per_line == 0 {
            return Err(GenerationError::invalid_config("picks_per_line must be > 0"));
        }
        if self.picks_per_line > self.range_size() {
            return Err(GenerationError::invalid_config(format!(
                "picks_per_line {} exceeds range size {}",
                self.picks_per_line,
                self.range_size()
            )));
        }
        Ok(())
    }
}
