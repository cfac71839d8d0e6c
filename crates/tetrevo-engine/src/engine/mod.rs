//! Live game state.
//!
//! - [`GameField`] - board, falling piece, piece queue and statistics of one game
//! - [`GameControl`] - the action surface an automated player uses
//! - [`GameStats`] - score, line clear histogram and garbage counters
//! - [`PieceBuffer`] / [`PieceSeed`] - seeded 7-bag piece generation
//!
//! # Game Flow
//!
//! 1. Create a [`GameField`], usually with a [`PieceSeed`] so games are reproducible
//! 2. Move or rotate the falling piece, and let gravity pull it down
//! 3. The piece locks when it cannot fall further (or on hard drop)
//! 4. Full rows are cleared and recorded as a [`PieceLocked`] event
//! 5. The next piece spawns; the game ends when it cannot, or when a piece
//!    locks partly above the visible area
//!
//! # Example
//!
//! ```
//! use tetrevo_engine::{GameControl as _, GameField, PieceSeed};
//!
//! let mut field = GameField::with_seed(PieceSeed::from_u64(3));
//! field.move_left().ok();
//! field.rotate().ok();
//! let locked = field.hard_drop().unwrap();
//! assert_eq!(locked.lines_cleared(), 0);
//! assert_eq!(field.stats().completed_pieces(), 1);
//! ```

pub use self::{control::*, game_field::*, game_stats::*, piece_buffer::*, piece_seed::*};

mod control;
mod game_field;
mod game_stats;
mod piece_buffer;
mod piece_seed;
