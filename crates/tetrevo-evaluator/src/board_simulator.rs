//! Applying a placement to a private copy of the board.
//!
//! [`simulate_move`] drops a piece, locks it, measures the placement and clears
//! full rows, all on a clone. The input board is never touched, so many
//! candidate placements can branch from the same parent board.

use tetrevo_engine::{BOARD_HEIGHT, Board, Piece, PieceKind};

use crate::move_generator::{Move, landing_piece};

/// Board after a simulated placement, plus the placement metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// Board after the piece locked and full rows were cleared.
    pub board: Board,
    /// The piece at its resting position.
    pub placement: Piece,
    pub lines_cleared: u32,
    /// Board height minus the row index of the piece's lowest cell.
    pub landing_height: u32,
    /// Piece cells that were part of a cleared row.
    pub useful_blocks: u32,
}

impl SimulationResult {
    /// Eroded piece cells metric: `lines_cleared × useful_blocks`.
    #[must_use]
    pub fn eroded_cells(&self) -> u32 {
        self.lines_cleared * self.useful_blocks
    }
}

/// Simulates placing `kind` with `mv` on a copy of `board`.
///
/// Returns `None` if the piece cannot be placed there, or if the placement
/// leaves any cell above the board or in row 0, both of which mean top-out.
#[must_use]
pub fn simulate_move(board: &Board, kind: PieceKind, mv: Move) -> Option<SimulationResult> {
    let placement = landing_piece(board, kind, mv)?;

    let mut next = board.clone();
    if !next.fill_piece(placement) || !next.row(0).is_empty() {
        return None;
    }

    let lowest = u32::try_from(placement.bottom_row()).ok()?;
    let landing_height = u32::try_from(BOARD_HEIGHT).ok()? - lowest;

    let mut lines_cleared = 0;
    let mut useful_blocks = 0;
    for y in next.full_rows() {
        lines_cleared += 1;
        useful_blocks += placement.row_bits(y).count_ones();
    }
    next.clear_lines();

    Some(SimulationResult {
        board: next,
        placement,
        lines_cleared,
        landing_height,
        useful_blocks,
    })
}
