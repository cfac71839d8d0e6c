//! Scoring weight sets by playing simulated games.
//!
//! A [`FitnessEvaluator`] plays one game per [`PieceSeed`] it is given and folds
//! the results into an [`Individual`]. In [`FitnessMode::Solo`] the weights play
//! alone and are rewarded for surviving on a low, clean board. In
//! [`FitnessMode::Versus`] they play in lockstep against a fixed opponent and
//! exchange garbage rows (see [`versus`](crate::versus)).
//!
//! Games are bounded by [`FitnessParams::max_moves`] and
//! [`FitnessParams::max_time_ms`] of simulated time. Reaching either ends the
//! game normally with whatever was collected so far.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use serde::{Deserialize, Serialize};
use tetrevo_engine::PieceSeed;
use tetrevo_evaluator::weights::WeightSet;
use tracing::debug;

use crate::{
    TrainingError,
    individual::{GameResult, Individual},
    simulation, versus,
};

/// Limits and pacing of simulated games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessParams {
    pub games_per_individual: usize,
    /// Pieces locked before a game is stopped.
    pub max_moves: usize,
    /// Simulated milliseconds before a game is stopped.
    pub max_time_ms: u64,
    /// Simulated milliseconds per tick.
    pub tick_ms: u64,
    /// Ticks between two gravity steps.
    pub gravity_interval: u64,
    /// Ticks the agent idles after each plan or action.
    pub think_delay: u32,
    pub beam_width: usize,
}

impl Default for FitnessParams {
    fn default() -> Self {
        Self {
            games_per_individual: 5,
            max_moves: 500,
            max_time_ms: 300_000,
            tick_ms: 50,
            gravity_interval: 10,
            think_delay: 0,
            beam_width: 3,
        }
    }
}

impl FitnessParams {
    /// Whether a game at `tick` with `moves` locked pieces has hit a limit.
    #[must_use]
    pub fn limits_reached(&self, tick: u64, moves: usize) -> bool {
        moves >= self.max_moves || tick.saturating_mul(self.tick_ms) >= self.max_time_ms
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.games_per_individual == 0 {
            return Err(invalid("games_per_individual must be at least 1"));
        }
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> TrainingError {
    TrainingError::InvalidParams(message.to_owned())
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::IsVariant,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMode {
    /// One player, scored on survival.
    #[default]
    #[display("solo")]
    Solo,
    /// Two players in lockstep with garbage exchange.
    #[display("versus")]
    Versus,
}

/// Cooperative cancellation shared between a training run and its caller.
///
/// Simulated games poll the token once per tick.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), TrainingError> {
        if self.is_cancelled() {
            return Err(TrainingError::Cancelled);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    params: FitnessParams,
    mode: FitnessMode,
    opponent: WeightSet,
    cancel: CancelToken,
}

impl FitnessEvaluator {
    /// Creates an evaluator. The versus opponent starts as the default weights.
    #[must_use]
    pub fn new(params: FitnessParams, mode: FitnessMode) -> Self {
        Self {
            params,
            mode,
            opponent: WeightSet::default(),
            cancel: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn with_opponent(mut self, opponent: WeightSet) -> Self {
        self.set_opponent(opponent);
        self
    }

    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn params(&self) -> &FitnessParams {
        &self.params
    }

    #[must_use]
    pub fn mode(&self) -> FitnessMode {
        self.mode
    }

    #[must_use]
    pub fn opponent(&self) -> &WeightSet {
        &self.opponent
    }

    pub fn set_opponent(&mut self, opponent: WeightSet) {
        self.opponent = opponent.clamped();
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Plays a single game with `weights` on the piece sequence of `seed`.
    pub fn play_game(
        &self,
        weights: &WeightSet,
        seed: PieceSeed,
    ) -> Result<GameResult, TrainingError> {
        let result = match self.mode {
            FitnessMode::Solo => simulation::run_solo(weights, seed, &self.params, &self.cancel)?,
            FitnessMode::Versus => {
                versus::run_versus(weights, &self.opponent, seed, &self.params, &self.cancel)?
                    .result_for(0)
            }
        };
        debug!(
            mode = %self.mode,
            outcome = %result.outcome,
            lines = result.lines_cleared,
            score = result.score,
            time_ms = result.game_time_ms,
            "game finished"
        );
        Ok(result)
    }

    /// Plays one game per seed. Stops at the first error.
    pub fn evaluate(
        &self,
        weights: &WeightSet,
        seeds: &[PieceSeed],
    ) -> Result<Vec<GameResult>, TrainingError> {
        seeds
            .iter()
            .map(|&seed| self.play_game(weights, seed))
            .collect()
    }

    /// Plays one game per seed and adds the results to `individual`.
    ///
    /// Nothing is added unless every game completes.
    pub fn evaluate_individual(
        &self,
        individual: &mut Individual,
        seeds: &[PieceSeed],
    ) -> Result<(), TrainingError> {
        let results = self.evaluate(individual.weights(), seeds)?;
        for result in &results {
            individual.add_game_result(result);
        }
        Ok(())
    }
}
