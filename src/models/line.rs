// src/models/line.rs

//! Generated lines and the strategies that produce them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Line generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Unweighted sample without replacement
    Uniform,
    /// Sample weighted by composite hot/cold/overdue score
    SmartPick,
    /// Deterministic line from the highest composite scores
    BonusTopProbability,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Uniform => "Random",
            Strategy::SmartPick => "Smart Pick",
            Strategy::BonusTopProbability => "Bonus (Top Prob)",
        }
    }
}

/// How the main lines of a set are drawn. Every set may end with a
/// [`Strategy::BonusTopProbability`] line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickMode {
    Quick,
    Smart,
}

impl PickMode {
    pub fn strategy(&self) -> Strategy {
        match self {
            PickMode::Quick => Strategy::Uniform,
            PickMode::Smart => Strategy::SmartPick,
        }
    }

    /// Method recorded in the journal, e.g. `Quick Pick` or `Smart:hot`.
    pub fn journal_method(&self, weighting: &str) -> String {
        match self {
            PickMode::Quick => "Quick Pick".to_string(),
            PickMode::Smart => format!("Smart:{weighting}"),
        }
    }
}

impl FromStr for PickMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick" => Ok(PickMode::Quick),
            "smart" => Ok(PickMode::Smart),
            other => Err(format!("unknown pick mode '{other}' (expected 'quick' or 'smart')")),
        }
    }
}

/// A generated line. Numbers are unique, in range and ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedLine {
    strategy: Strategy,
    numbers: Vec<u8>,
    bonus_pick: Option<u8>,
}

impl GeneratedLine {
    pub(crate) fn new(strategy: Strategy, mut numbers: Vec<u8>, bonus_pick: Option<u8>) -> Self {
        numbers.sort_unstable();
        Self {
            strategy,
            numbers,
            bonus_pick,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn label(&self) -> &'static str {
        self.strategy.label()
    }

    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    /// Highest-scoring number of a top-probability line.
    pub fn bonus_pick(&self) -> Option<u8> {
        self.bonus_pick
    }

    /// Copy/export form: `03 07 12 19 33 41`.
    pub fn to_plain_text(&self) -> String {
        self.numbers
            .iter()
            .map(|n| format!("{n:02}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for GeneratedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_plain_text())?;
        if let Some(bonus) = self.bonus_pick {
            write!(f, "  [Bonus {bonus:02}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_zero_padded_and_sorted() {
        let line = GeneratedLine::new(Strategy::Uniform, vec![41, 3, 19, 7, 33, 12], None);
        assert_eq!(line.to_plain_text(), "03 07 12 19 33 41");
        assert_eq!(line.label(), "Random");
    }

    #[test]
    fn test_journal_method_names_mode_and_weighting() {
        assert_eq!(PickMode::Quick.journal_method("hot"), "Quick Pick");
        assert_eq!(PickMode::Smart.journal_method("balanced"), "Smart:balanced");
        assert_eq!(PickMode::Smart.journal_method("custom"), "Smart:custom");
    }

    #[test]
    fn test_display_shows_bonus_pick() {
        let line = GeneratedLine::new(
            Strategy::BonusTopProbability,
            vec![7, 1, 2, 3, 4, 5],
            Some(7),
        );
        assert_eq!(line.to_string(), "01 02 03 04 05 07  [Bonus 07]");
    }
}
