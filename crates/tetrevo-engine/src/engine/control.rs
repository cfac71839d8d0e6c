use crate::{
    ActionError,
    core::{Board, Piece, PieceKind},
};

use super::PieceLocked;

/// The surface an automated player drives a game through.
///
/// Implementors own the live board. Callers only observe it and issue the
/// primitive actions below, one per call.
pub trait GameControl {
    fn board(&self) -> &Board;

    /// The falling piece (the last one, once the game is over).
    fn current_piece(&self) -> Piece;

    /// Kind of the piece that spawns after the current one locks.
    fn next_piece(&self) -> PieceKind;

    fn is_game_over(&self) -> bool;

    /// Number of pieces locked so far.
    fn completed_pieces(&self) -> usize;

    /// Rotates the falling piece 90° clockwise, trying small kicks on collision.
    fn rotate(&mut self) -> Result<(), ActionError>;

    fn move_left(&mut self) -> Result<(), ActionError>;

    fn move_right(&mut self) -> Result<(), ActionError>;

    /// Drops the falling piece to its landing row and locks it.
    fn hard_drop(&mut self) -> Result<PieceLocked, ActionError>;
}
