//! Tetris rules engine: board, pieces, seeded piece generation and a live game field.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Why a game action was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ActionError {
    #[display("piece colliding when moving falling piece")]
    Collision,
    #[display("game is already over")]
    GameOver,
}
