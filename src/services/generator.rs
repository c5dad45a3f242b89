// src/services/generator.rs

//! Line generation strategies.
//!
//! Each [`Strategy`] maps to a picker working on the same input: the eligible
//! numbers of the game paired with their composite score.

use std::collections::{BTreeMap, BTreeSet};

use rand::SeedableRng;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;

use crate::error::GenerationError;
use crate::models::{CompositeWeights, FrequencyTable, GameConfig, GeneratedLine, Strategy};

/// Composite score of every number in the table.
///
/// Components are normalized to `[0, 1]`: `hot = count / max_count`,
/// `cold = 1 - hot`, `overdue = gap / sample_size` with never-seen numbers at
/// 1. The constant 1 keeps every score strictly positive. An empty table
/// scores every number at 1.
pub fn composite_scores(table: &FrequencyTable, weights: &CompositeWeights) -> BTreeMap<u8, f64> {
    if table.is_empty() {
        return table.iter().map(|(n, _)| (n, 1.0)).collect();
    }

    let max_count = f64::from(table.max_count().max(1));
    let sample_size = table.sample_size() as f64;

    table
        .iter()
        .map(|(n, stat)| {
            let hot = f64::from(stat.count) / max_count;
            let cold = 1.0 - hot;
            let overdue = stat
                .gap
                .map_or(1.0, |gap| (f64::from(gap) / sample_size).min(1.0));
            let score = 1.0 + weights.hot * hot + weights.cold * cold + weights.overdue * overdue;
            (n, score)
        })
        .collect()
}

/// Numbers chosen by a picker.
struct Picks {
    numbers: Vec<u8>,
    bonus_pick: Option<u8>,
}

/// Shared contract of the strategies. `pool` is never smaller than `count`.
trait LinePicker {
    fn pick(&self, pool: &[(u8, f64)], count: usize, rng: &mut StdRng)
    -> Result<Picks, GenerationError>;
}

struct UniformPicker;

impl LinePicker for UniformPicker {
    fn pick(
        &self,
        pool: &[(u8, f64)],
        count: usize,
        rng: &mut StdRng,
    ) -> Result<Picks, GenerationError> {
        let numbers = rand::seq::index::sample(rng, pool.len(), count)
            .into_iter()
            .map(|i| pool[i].0)
            .collect();
        Ok(Picks {
            numbers,
            bonus_pick: None,
        })
    }
}

struct WeightedPicker;

impl LinePicker for WeightedPicker {
    fn pick(
        &self,
        pool: &[(u8, f64)],
        count: usize,
        rng: &mut StdRng,
    ) -> Result<Picks, GenerationError> {
        let mut available = pool.to_vec();
        let mut numbers = Vec::with_capacity(count);

        for _ in 0..count {
            let weights: Vec<f64> = available.iter().map(|(_, w)| *w).collect();
            let dist = WeightedIndex::new(&weights)
                .map_err(|e| GenerationError::Sampling(e.to_string()))?;
            let (number, _) = available.remove(dist.sample(rng));
            numbers.push(number);
        }

        Ok(Picks {
            numbers,
            bonus_pick: None,
        })
    }
}

struct TopScorePicker;

impl LinePicker for TopScorePicker {
    fn pick(
        &self,
        pool: &[(u8, f64)],
        count: usize,
        _rng: &mut StdRng,
    ) -> Result<Picks, GenerationError> {
        let mut ranked = pool.to_vec();
        // Highest score first; equal scores go to the lowest number.
        ranked.sort_by(|(a_n, a_s), (b_n, b_s)| b_s.total_cmp(a_s).then(a_n.cmp(b_n)));

        let numbers: Vec<u8> = ranked.iter().take(count).map(|(n, _)| *n).collect();
        Ok(Picks {
            bonus_pick: numbers.first().copied(),
            numbers,
        })
    }
}

fn picker(strategy: Strategy) -> &'static dyn LinePicker {
    match strategy {
        Strategy::Uniform => &UniformPicker,
        Strategy::SmartPick => &WeightedPicker,
        Strategy::BonusTopProbability => &TopScorePicker,
    }
}

/// Produces lines for any game from a frequency table snapshot.
#[derive(Debug)]
pub struct LineGenerator {
    weights: CompositeWeights,
    rng: StdRng,
}

impl LineGenerator {
    /// Generator seeded from the thread RNG.
    pub fn new(weights: CompositeWeights) -> Self {
        Self {
            weights,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Reproducible generator.
    pub fn with_seed(weights: CompositeWeights, seed: u64) -> Self {
        Self {
            weights,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn weights(&self) -> CompositeWeights {
        self.weights
    }

    pub fn set_weights(&mut self, weights: CompositeWeights) {
        self.weights = weights;
    }

    pub fn generate(
        &mut self,
        strategy: Strategy,
        table: &FrequencyTable,
        game: &GameConfig,
    ) -> Result<GeneratedLine, GenerationError> {
        self.generate_excluding(strategy, table, game, &BTreeSet::new())
    }

    /// Generate a line that contains none of `excluded`.
    pub fn generate_excluding(
        &mut self,
        strategy: Strategy,
        table: &FrequencyTable,
        game: &GameConfig,
        excluded: &BTreeSet<u8>,
    ) -> Result<GeneratedLine, GenerationError> {
        game.validate()?;
        if !self.weights.is_valid() {
            return Err(GenerationError::invalid_config(
                "composite weights must be finite and >= 0",
            ));
        }
        if table.game() != game.game_type {
            return Err(GenerationError::invalid_config(format!(
                "frequency table for {} used with {}",
                table.game(),
                game.game_type
            )));
        }

        let scores = composite_scores(table, &self.weights);
        let pool: Vec<(u8, f64)> = game
            .number_range()
            .filter(|n| !excluded.contains(n))
            .map(|n| (n, scores.get(&n).copied().unwrap_or(1.0)))
            .collect();

        if pool.len() < game.picks_per_line {
            return Err(GenerationError::invalid_config(format!(
                "only {} eligible numbers for {} picks",
                pool.len(),
                game.picks_per_line
            )));
        }

        let effective = match strategy {
            Strategy::SmartPick if table.is_empty() => {
                log::debug!("No draw statistics for {}; smart pick uses uniform weights", game.game_type);
                Strategy::Uniform
            }
            other => other,
        };

        let picks = picker(effective).pick(&pool, game.picks_per_line, &mut self.rng)?;
        Ok(GeneratedLine::new(strategy, picks.numbers, picks.bonus_pick))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::{DrawRecord, Flavor, GameType};
    use crate::services::FrequencyAnalyzer;

    const ALL_STRATEGIES: [Strategy; 3] = [
        Strategy::Uniform,
        Strategy::SmartPick,
        Strategy::BonusTopProbability,
    ];

    fn assert_valid_line(line: &GeneratedLine, game: &GameConfig) {
        assert_eq!(line.numbers().len(), game.picks_per_line);
        let unique: HashSet<u8> = line.numbers().iter().copied().collect();
        assert_eq!(unique.len(), game.picks_per_line, "duplicates in {line}");
        assert!(line.numbers().iter().all(|&n| game.contains(n)), "out of range in {line}");
        assert!(line.numbers().windows(2).all(|w| w[0] < w[1]));
    }

    /// Ten draws with 7 in every one; the other numbers rotate.
    fn seven_heavy_history(game: &GameConfig) -> Vec<DrawRecord> {
        (0..10u8)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024, 5, u32::from(i) + 1).unwrap();
                let base = 10 + i * 3;
                let numbers = [7, base, base + 1, base + 2, (i % 6) + 1, 49 - i];
                DrawRecord::new(date, &numbers, None, game).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_every_strategy_yields_valid_lines() {
        for game_type in GameType::ALL {
            let game = GameConfig::for_game(game_type);
            let table = FrequencyAnalyzer::new(game.clone()).analyze(&[]);
            let mut generator = LineGenerator::with_seed(Flavor::Balanced.weights(), 42);
            for strategy in ALL_STRATEGIES {
                for _ in 0..50 {
                    let line = generator.generate(strategy, &table, &game).unwrap();
                    assert_valid_line(&line, &game);
                    assert_eq!(line.strategy(), strategy);
                }
            }
        }
    }

    #[test]
    fn test_weighted_lines_valid_with_history() {
        let game = GameConfig::for_game(GameType::Lotto649);
        let table = FrequencyAnalyzer::new(game.clone()).analyze(&seven_heavy_history(&game));
        for flavor in [Flavor::Balanced, Flavor::Hot, Flavor::Overdue] {
            let mut generator = LineGenerator::with_seed(flavor.weights(), 7);
            for _ in 0..200 {
                let line = generator.generate(Strategy::SmartPick, &table, &game).unwrap();
                assert_valid_line(&line, &game);
            }
        }
    }

    #[test]
    fn test_smart_pick_favors_hot_numbers_and_reaches_all() {
        const LINES: usize = 2000;
        let game = GameConfig::for_game(GameType::Lotto649);
        let table = FrequencyAnalyzer::new(game.clone()).analyze(&seven_heavy_history(&game));
        let mut generator = LineGenerator::with_seed(Flavor::Hot.weights(), 2024);

        let mut seen = BTreeMap::<u8, usize>::new();
        for _ in 0..LINES {
            let line = generator.generate(Strategy::SmartPick, &table, &game).unwrap();
            for &n in line.numbers() {
                *seen.entry(n).or_default() += 1;
            }
        }

        let uniform = (LINES * game.picks_per_line) as f64 / game.range_size() as f64;
        let sevens = seen.get(&7).copied().unwrap_or(0) as f64;
        assert!(sevens > 1.3 * uniform, "7 drawn {sevens} times, uniform rate {uniform:.0}");
        assert!(game.number_range().all(|n| seen.contains_key(&n)));
    }

    #[test]
    fn test_scores_are_strictly_positive() {
        let game = GameConfig::for_game(GameType::Lotto649);
        let table = FrequencyAnalyzer::new(game.clone()).analyze(&seven_heavy_history(&game));
        let zero = CompositeWeights::new(0.0, 0.0, 0.0);
        for weights in [zero, Flavor::Hot.weights(), CompositeWeights::new(0.0, 5.0, 0.0)] {
            let scores = composite_scores(&table, &weights);
            assert_eq!(scores.len(), 49);
            assert!(scores.values().all(|&s| s >= 1.0));
        }
    }

    #[test]
    fn test_bonus_pick_is_highest_composite_score() {
        let game = GameConfig::for_game(GameType::Lotto649);
        let table = FrequencyAnalyzer::new(game.clone()).analyze(&seven_heavy_history(&game));
        let weights = Flavor::Hot.weights();

        let scores = composite_scores(&table, &weights);
        let top = scores[&7];
        assert!(scores.iter().all(|(n, s)| *n == 7 || *s < top));

        let mut generator = LineGenerator::with_seed(weights, 1);
        let line = generator
            .generate(Strategy::BonusTopProbability, &table, &game)
            .unwrap();
        assert_eq!(line.bonus_pick(), Some(7));
        assert!(line.numbers().contains(&7));
        assert_eq!(line.label(), "Bonus (Top Prob)");
        assert_valid_line(&line, &game);
    }

    #[test]
    fn test_top_probability_is_deterministic() {
        let game = GameConfig::for_game(GameType::LottoMax);
        let records: Vec<DrawRecord> = (1..=5u8)
            .map(|d| {
                let date = NaiveDate::from_ymd_opt(2024, 6, u32::from(d)).unwrap();
                let numbers: Vec<u8> = (0..7).map(|k| d * 7 + k).collect();
                DrawRecord::new(date, &numbers, None, &game).unwrap()
            })
            .collect();
        let table = FrequencyAnalyzer::new(game.clone()).analyze(&records);

        let first = LineGenerator::with_seed(Flavor::Balanced.weights(), 1)
            .generate(Strategy::BonusTopProbability, &table, &game)
            .unwrap();
        let second = LineGenerator::with_seed(Flavor::Balanced.weights(), 99)
            .generate(Strategy::BonusTopProbability, &table, &game)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_top_probability_on_empty_table_uses_lowest_numbers() {
        let game = GameConfig::for_game(GameType::Lotto649);
        let table = FrequencyTable::empty(&game);
        let line = LineGenerator::with_seed(Flavor::Balanced.weights(), 3)
            .generate(Strategy::BonusTopProbability, &table, &game)
            .unwrap();
        assert_eq!(line.numbers(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(line.bonus_pick(), Some(1));
    }

    #[test]
    fn test_excluded_numbers_are_never_picked() {
        let game = GameConfig::for_game(GameType::Lotto649);
        let table = FrequencyAnalyzer::new(game.clone()).analyze(&seven_heavy_history(&game));
        let excluded: BTreeSet<u8> = [7, 1, 2].into_iter().collect();
        let mut generator = LineGenerator::with_seed(Flavor::Hot.weights(), 11);

        for strategy in ALL_STRATEGIES {
            for _ in 0..50 {
                let line = generator
                    .generate_excluding(strategy, &table, &game, &excluded)
                    .unwrap();
                assert!(line.numbers().iter().all(|n| !excluded.contains(n)));
                assert_valid_line(&line, &game);
            }
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut game = GameConfig::for_game(GameType::Lotto649);
        game.picks_per_line = 50;
        let table = FrequencyTable::empty(&GameConfig::for_game(GameType::Lotto649));
        let mut generator = LineGenerator::with_seed(Flavor::Balanced.weights(), 0);

        for strategy in ALL_STRATEGIES {
            assert!(matches!(
                generator.generate(strategy, &table, &game),
                Err(GenerationError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_exclusions_that_empty_the_pool_are_rejected() {
        let game = GameConfig::for_game(GameType::Lotto649);
        let table = FrequencyTable::empty(&game);
        let excluded: BTreeSet<u8> = (1..=45).collect();
        let result = LineGenerator::with_seed(Flavor::Balanced.weights(), 0).generate_excluding(
            Strategy::Uniform,
            &table,
            &game,
            &excluded,
        );
        assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
    }

    #[test]
    fn test_mismatched_table_is_rejected() {
        let table = FrequencyTable::empty(&GameConfig::for_game(GameType::LottoMax));
        let game = GameConfig::for_game(GameType::Lotto649);
        let result = LineGenerator::with_seed(Flavor::Balanced.weights(), 0).generate(
            Strategy::Uniform,
            &table,
            &game,
        );
        assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
    }

    #[test]
    fn test_full_range_line_is_possible() {
        let game = GameConfig {
            game_type: GameType::Lotto649,
            min_number: 1,
            max_number: 6,
            picks_per_line: 6,
            bonus_enabled: false,
        };
        let table = FrequencyTable::empty(&game);
        let mut generator = LineGenerator::with_seed(Flavor::Balanced.weights(), 5);
        for strategy in ALL_STRATEGIES {
            let line = generator.generate(strategy, &table, &game).unwrap();
            assert_eq!(line.numbers(), &[1, 2, 3, 4, 5, 6]);
        }
    }
}
