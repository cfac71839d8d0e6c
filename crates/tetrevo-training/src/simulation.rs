//! Tick-driven simulated games.
//!
//! A [`SimulatedPlayer`] owns a [`GameField`] and the [`AiAgent`] playing it.
//! Each call to [`SimulatedPlayer::tick`] advances gravity on every
//! `gravity_interval`-th tick and then lets the agent think or act once. There
//! is no real-time waiting: a game is a tight loop of ticks, and simulated time
//! is `ticks × tick_ms`.
//!
//! Solo games are scored with a survival composite built from per-tick board
//! samples:
//!
//! ```text
//! score = points + 10 × lines + 1 × seconds
//!       + 2 × (20 − mean max height) − 1 × mean average height − 2 × mean holes
//! ```
//!
//! clamped at zero.

use tetrevo_engine::{BOARD_HEIGHT, Board, GameControl, GameField, PieceSeed};
use tetrevo_evaluator::{
    agent::AiAgent,
    beam_search::BeamSearchPlanner,
    board_analysis::BoardAnalysis,
    weights::WeightSet,
};
use tracing::trace;

use crate::{
    TrainingError,
    fitness::{CancelToken, FitnessParams},
    individual::{GameOutcome, GameResult},
};

pub const LINE_REWARD: f64 = 10.0;
pub const TIME_REWARD: f64 = 1.0;
pub const LOW_STACK_REWARD: f64 = 2.0;
pub const AVERAGE_HEIGHT_PENALTY: f64 = 1.0;
pub const HOLE_PENALTY: f64 = 2.0;

/// Running sums of board shape, sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoardSamples {
    pub count: u64,
    pub max_height: u64,
    pub average_height: f64,
    pub holes: u64,
}

impl BoardSamples {
    pub fn record(&mut self, board: &Board) {
        let analysis = BoardAnalysis::new(board);
        self.count += 1;
        self.max_height += u64::from(analysis.max_height());
        self.average_height += analysis.average_height();
        self.holes += u64::from(analysis.num_holes());
    }

    #[must_use]
    pub fn mean_max_height(&self) -> f64 {
        self.mean(self.max_height)
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn mean_average_height(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.average_height / self.count as f64
    }

    #[must_use]
    pub fn mean_holes(&self) -> f64 {
        self.mean(self.holes)
    }

    #[expect(clippy::cast_precision_loss)]
    fn mean(&self, total: u64) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        total as f64 / self.count as f64
    }
}

/// A live game and the agent playing it.
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    field: GameField,
    agent: AiAgent,
    samples: BoardSamples,
}

impl SimulatedPlayer {
    #[must_use]
    pub fn new(weights: &WeightSet, seed: PieceSeed, params: &FitnessParams) -> Self {
        let planner = BeamSearchPlanner::with_weights(*weights).with_beam_width(params.beam_width);
        Self {
            field: GameField::with_seed(seed),
            agent: AiAgent::new(planner).with_think_delay(params.think_delay),
            samples: BoardSamples::default(),
        }
    }

    #[must_use]
    pub fn field(&self) -> &GameField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut GameField {
        &mut self.field
    }

    #[must_use]
    pub fn samples(&self) -> &BoardSamples {
        &self.samples
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.field.is_game_over()
    }

    /// Pieces locked so far.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.field.stats().completed_pieces()
    }

    /// Advances the game by one tick: gravity if due, then one agent step.
    pub fn tick(&mut self, tick: u64, gravity_interval: u64) {
        if self.field.is_game_over() {
            return;
        }
        if gravity_interval > 0
            && (tick + 1) % gravity_interval == 0
            && let Err(err) = self.field.step_gravity()
        {
            trace!(%err, "gravity step rejected");
        }
        if !self.field.is_game_over() && self.agent.tick(&mut self.field).is_no_move() {
            trace!(tick, "no placement left, ending game");
            self.field.declare_game_over();
        }
        self.samples.record(self.field.board());
    }

    /// Survival composite of a finished solo game.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn survival_score(&self, game_time_ms: u64) -> f64 {
        let stats = self.field.stats();
        let seconds = game_time_ms as f64 / 1000.0;
        let mut score = stats.score() as f64
            + LINE_REWARD * stats.total_cleared_lines() as f64
            + TIME_REWARD * seconds;
        if self.samples.count > 0 {
            score += LOW_STACK_REWARD * (BOARD_HEIGHT as f64 - self.samples.mean_max_height())
                - AVERAGE_HEIGHT_PENALTY * self.samples.mean_average_height()
                - HOLE_PENALTY * self.samples.mean_holes();
        }
        score.max(0.0)
    }

    pub(crate) fn lines_cleared(&self) -> u32 {
        u32::try_from(self.field.stats().total_cleared_lines()).unwrap_or(u32::MAX)
    }
}

/// Plays a solo game until top-out or a limit is reached.
pub fn run_solo(
    weights: &WeightSet,
    seed: PieceSeed,
    params: &FitnessParams,
    cancel: &CancelToken,
) -> Result<GameResult, TrainingError> {
    let mut player = SimulatedPlayer::new(weights, seed, params);
    let mut tick = 0;
    while !player.is_game_over() && !params.limits_reached(tick, player.moves()) {
        cancel.check()?;
        player.tick(tick, params.gravity_interval);
        tick += 1;
    }
    let game_time_ms = tick * params.tick_ms;
    Ok(GameResult {
        lines_cleared: player.lines_cleared(),
        score: player.survival_score(game_time_ms),
        outcome: GameOutcome::Solo,
        game_time_ms,
        topped_out: player.is_game_over(),
    })
}
