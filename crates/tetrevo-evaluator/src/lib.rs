//! Move search for the Tetris agent: enumerating, simulating and scoring placements.
//!
//! The crate is layered, each level built on the one below:
//!
//! ```text
//! AiAgent (turns a plan into rotate/shift/drop actions on a live game)
//!     ↓ uses
//! BeamSearchPlanner (current piece + one piece of lookahead)
//!     ↓ uses
//! PlacementEvaluator (linear score over nine board features)
//!     ↓ uses
//! simulate_move / generate_moves (legal placements on a board copy)
//! ```
//!
//! # Modules
//!
//! - [`move_generator`] - Every `(x, rotation)` at which a piece can be hard-dropped
//! - [`board_simulator`] - Locks a piece on a copy of the board, measures the
//!   placement and clears full rows
//! - [`board_analysis`] - Lazily evaluated board metrics (heights, holes,
//!   transitions, wells)
//! - [`weights`] - The nine weights, their valid ranges and the survival/attack split
//! - [`placement_evaluator`] - Feature extraction and the linear evaluator
//! - [`beam_search`] - Two-piece lookahead with a bounded beam and greedy fallback
//! - [`agent`] - Action queue and think delay for driving a [`GameControl`] game
//!
//! # Example
//!
//! ```
//! use tetrevo_engine::{Board, PieceKind};
//! use tetrevo_evaluator::{beam_search::BeamSearchPlanner, weights::WeightSet};
//!
//! let planner = BeamSearchPlanner::with_weights(WeightSet::default());
//! let plan = planner
//!     .plan(&Board::EMPTY, PieceKind::T, Some(PieceKind::I))
//!     .expect("an empty board always has a placement");
//! assert_eq!(plan.result.lines_cleared, 0);
//! ```
//!
//! [`GameControl`]: tetrevo_engine::GameControl

pub mod agent;
pub mod beam_search;
pub mod board_analysis;
pub mod board_simulator;
pub mod move_generator;
pub mod placement_evaluator;
pub mod weights;

#[cfg(test)]
mod test_util;
