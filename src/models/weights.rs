// src/models/weights.rs

//! Composite score weights used by smart picks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Blend of the normalized hot, cold and overdue scores.
///
/// `score(n) = 1 + hot * hot(n) + cold * cold(n) + overdue * overdue(n)`,
/// each component in `[0, 1]`. The constant term keeps every weight positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    #[serde(default)]
    pub hot: f64,
    #[serde(default)]
    pub cold: f64,
    #[serde(default)]
    pub overdue: f64,
}

impl CompositeWeights {
    pub fn new(hot: f64, cold: f64, overdue: f64) -> Self {
        Self { hot, cold, overdue }
    }

    /// Weights must be finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.hot, self.cold, self.overdue]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
    }
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Flavor::Balanced.weights()
    }
}

/// Named weight presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Hot and overdue equally
    #[default]
    Balanced,
    /// Favors frequent numbers
    Hot,
    /// Favors long gaps
    Overdue,
}

impl Flavor {
    pub fn weights(&self) -> CompositeWeights {
        match self {
            Flavor::Balanced => CompositeWeights::new(1.0, 0.0, 1.0),
            Flavor::Hot => CompositeWeights::new(2.0, 0.0, 0.5),
            Flavor::Overdue => CompositeWeights::new(0.5, 0.0, 2.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Balanced => "balanced",
            Flavor::Hot => "hot",
            Flavor::Overdue => "overdue",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "balanced" => Ok(Flavor::Balanced),
            "hot" => Ok(Flavor::Hot),
            "overdue" => Ok(Flavor::Overdue),
            other => Err(format!(
                "unknown flavor '{other}' (expected balanced, hot or overdue)"
            )),
        }
    }
}
