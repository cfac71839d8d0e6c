//! Individuals and how their game results turn into fitness.
//!
//! An [`Individual`] pairs a [`WeightSet`] with running totals over the games it
//! has played. Fitness is recomputed from those totals after every result, as
//! a weighted sum of:
//!
//! | term | value |
//! |---|---|
//! | survival time | average simulated seconds × [`TIME_WEIGHT`] |
//! | survival bonus | [`SURVIVAL_BONUS`] × fraction of games that did not top out |
//! | lines | average lines cleared × [`LINES_WEIGHT`] |
//! | score | average game score × [`SCORE_WEIGHT`] |
//! | versus record | [`WIN_BONUS`] × (wins − losses) / games |
//! | early game over | −[`EARLY_GAME_OVER_PENALTY`] × fraction of games scoring zero |
//! | long survival | [`LONG_SURVIVAL_BONUS`] once average time exceeds [`LONG_SURVIVAL_SECS`] |
//!
//! The constants are fixed design parameters and are never evolved.

use serde::{Deserialize, Serialize};
use tetrevo_evaluator::weights::WeightSet;

pub const TIME_WEIGHT: f64 = 1.0;
pub const SURVIVAL_BONUS: f64 = 50.0;
pub const LINES_WEIGHT: f64 = 10.0;
pub const SCORE_WEIGHT: f64 = 0.1;
pub const WIN_BONUS: f64 = 500.0;
pub const EARLY_GAME_OVER_PENALTY: f64 = 200.0;
pub const LONG_SURVIVAL_SECS: f64 = 120.0;
pub const LONG_SURVIVAL_BONUS: f64 = 200.0;

/// How a single game ended for the evaluated player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::IsVariant,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    /// A solo game, with nobody to win against.
    #[display("solo")]
    Solo,
    #[display("win")]
    Win,
    #[display("loss")]
    Loss,
    #[display("draw")]
    Draw,
}

/// Summary of one simulated game from the evaluated player's side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub lines_cleared: u32,
    pub score: f64,
    pub outcome: GameOutcome,
    pub game_time_ms: u64,
    pub topped_out: bool,
}

/// Running totals over an individual's games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndividualStats {
    pub games: u32,
    pub total_lines: u64,
    pub total_score: f64,
    pub total_time_ms: u64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub survived_games: u32,
    pub zero_score_games: u32,
}

impl IndividualStats {
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average_time_secs(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_time_ms as f64 / 1000.0 / f64::from(self.games)
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average_lines(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_lines as f64 / f64::from(self.games)
    }

    #[must_use]
    pub fn average_score(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_score / f64::from(self.games)
    }

    fn fraction(&self, count: u32) -> f64 {
        f64::from(count) / f64::from(self.games)
    }

    fn fitness(&self) -> f64 {
        if self.games == 0 {
            return f64::MIN;
        }
        let average_time = self.average_time_secs();
        let mut fitness = average_time * TIME_WEIGHT
            + SURVIVAL_BONUS * self.fraction(self.survived_games)
            + self.average_lines() * LINES_WEIGHT
            + self.average_score() * SCORE_WEIGHT
            + WIN_BONUS * (self.fraction(self.wins) - self.fraction(self.losses))
            - EARLY_GAME_OVER_PENALTY * self.fraction(self.zero_score_games);
        if average_time > LONG_SURVIVAL_SECS {
            fitness += LONG_SURVIVAL_BONUS;
        }
        fitness
    }
}

/// A candidate weight set and its accumulated fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    weights: WeightSet,
    stats: IndividualStats,
    fitness: f64,
}

impl Individual {
    /// Creates an individual that has not played yet. Weights are clamped.
    #[must_use]
    pub fn new(weights: WeightSet) -> Self {
        Self {
            weights: weights.clamped(),
            stats: IndividualStats::default(),
            fitness: f64::MIN,
        }
    }

    #[must_use]
    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    #[must_use]
    pub fn stats(&self) -> &IndividualStats {
        &self.stats
    }

    /// Current fitness; `f64::MIN` before the first game.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Folds one game into the totals and recomputes fitness.
    pub fn add_game_result(&mut self, result: &GameResult) {
        let stats = &mut self.stats;
        stats.games += 1;
        stats.total_lines += u64::from(result.lines_cleared);
        stats.total_score += result.score;
        stats.total_time_ms += result.game_time_ms;
        match result.outcome {
            GameOutcome::Win => stats.wins += 1,
            GameOutcome::Loss => stats.losses += 1,
            GameOutcome::Draw => stats.draws += 1,
            GameOutcome::Solo => {}
        }
        if !result.topped_out {
            stats.survived_games += 1;
        }
        if result.score <= 0.0 {
            stats.zero_score_games += 1;
        }
        self.fitness = self.stats.fitness();
    }

    /// Forgets every game played, keeping the weights.
    pub fn reset_stats(&mut self) {
        self.stats = IndividualStats::default();
        self.fitness = f64::MIN;
    }
}
