//! Board and piece primitives.
//!
//! - [`Board`] - 10×20 grid of fixed blocks with bitmask rows for fast collision checks
//! - [`BoardRow`] - one row of the board (occupancy bits plus block colours)
//! - [`Piece`] / [`PieceKind`] / [`PieceRotation`] - tetromino shapes and placement
//!
//! Row 0 is the top visible row and `y` grows downward. Rows above the board
//! (negative `y`) are legal for a falling piece but can never hold fixed blocks.

pub use self::{board::*, piece::*};

pub(crate) mod board;
pub(crate) mod piece;

/// Number of columns of the playfield.
pub const BOARD_WIDTH: usize = 10;
/// Number of visible rows of the playfield.
pub const BOARD_HEIGHT: usize = 20;

/// Column of the spawn bounding box.
pub const PIECE_SPAWN_X: i8 = 3;
/// Row of the spawn bounding box (one row above the visible area).
pub const PIECE_SPAWN_Y: i8 = -1;
