use std::mem;

use arrayvec::ArrayVec;

use crate::{
    ActionError,
    core::{BOARD_HEIGHT, BOARD_WIDTH, Board, BoardRow, Cell, Piece, PieceKind},
};

use super::{GameControl, GameStats, PieceBuffer, PieceSeed};

/// Rotation kick offsets tried in order: in place, up, right, down, left.
const ROTATION_KICKS: [(i8, i8); 5] = [(0, 0), (0, -1), (1, 0), (0, 1), (-1, 0)];

/// A row removed by a line clear, kept for building attack rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearedRow {
    /// Board row index before the clear.
    pub y: usize,
    /// Full contents of the row before the clear.
    pub row: BoardRow,
    /// Columns of this row filled by the piece that completed it.
    pub piece_bits: u16,
}

impl ClearedRow {
    /// The row an opponent receives for this clear.
    #[must_use]
    pub fn to_garbage(&self) -> BoardRow {
        self.row.to_garbage(self.piece_bits)
    }
}

/// Outcome of locking one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceLocked {
    pub piece: Piece,
    pub cleared_rows: ArrayVec<ClearedRow, 4>,
    /// The lock ended the game (piece above the visible area or blocked spawn).
    pub topped_out: bool,
}

impl PieceLocked {
    #[must_use]
    pub fn lines_cleared(&self) -> usize {
        self.cleared_rows.len()
    }
}

/// Result of a gravity tick.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum GravityStep {
    Fell,
    Locked(PieceLocked),
}

/// Live single-player game state: board, falling piece, piece queue and stats.
///
/// The field owns its board exclusively; planners read it through
/// [`GameControl::board`] and work on clones.
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    falling_piece: Piece,
    piece_buffer: PieceBuffer,
    stats: GameStats,
    game_over: bool,
    lock_events: Vec<PieceLocked>,
}

impl Default for GameField {
    fn default() -> Self {
        Self::new()
    }
}

impl GameField {
    #[must_use]
    pub fn new() -> Self {
        Self::from_buffer(PieceBuffer::new())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::from_buffer(PieceBuffer::with_seed(seed))
    }

    fn from_buffer(mut piece_buffer: PieceBuffer) -> Self {
        let falling_piece = Piece::new(piece_buffer.pop_next());
        Self {
            board: Board::EMPTY,
            falling_piece,
            piece_buffer,
            stats: GameStats::new(),
            game_over: false,
            lock_events: Vec::new(),
        }
    }

    /// Replaces the board, e.g. to start from a prepared position.
    #[must_use]
    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self.game_over = self.board.is_colliding(self.falling_piece);
        self
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling_piece
    }

    /// Where the falling piece would land on a hard drop.
    #[must_use]
    pub fn drop_position(&self) -> Piece {
        let mut piece = self.falling_piece;
        while !self.board.is_colliding(piece.down()) {
            piece = piece.down();
        }
        piece
    }

    /// Board cells with the falling piece overlaid.
    #[must_use]
    pub fn cells(&self) -> [[Cell; BOARD_WIDTH]; BOARD_HEIGHT] {
        let mut cells = [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT];
        for (y, row) in self.board.rows().enumerate() {
            for (x, block) in row.blocks().enumerate() {
                if let Some(block) = block {
                    cells[y][x] = Cell::Fixed(block);
                }
            }
        }
        if !self.game_over {
            for (x, y) in self.falling_piece.occupied_positions() {
                let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                    continue;
                };
                if x < BOARD_WIDTH && y < BOARD_HEIGHT {
                    cells[y][x] = Cell::Falling(self.falling_piece.kind());
                }
            }
        }
        cells
    }

    /// Ends the game immediately. Further actions fail with [`ActionError::GameOver`].
    pub fn declare_game_over(&mut self) {
        self.game_over = true;
    }

    /// Advances the falling piece one row, locking it if it cannot fall.
    pub fn step_gravity(&mut self) -> Result<GravityStep, ActionError> {
        self.ensure_playing()?;
        let down = self.falling_piece.down();
        if self.board.is_colliding(down) {
            return Ok(GravityStep::Locked(self.lock_piece()));
        }
        self.falling_piece = down;
        Ok(GravityStep::Fell)
    }

    /// Drains the lock events recorded since the previous call.
    pub fn consume_lock_events(&mut self) -> Vec<PieceLocked> {
        mem::take(&mut self.lock_events)
    }

    /// Inserts attack rows at the bottom, lifting the stack and the falling piece.
    ///
    /// Returns `false` without modifying the board when the stack would be
    /// pushed out of the top.
    pub fn add_attack_blocks_to_bottom(&mut self, rows: &[BoardRow]) -> bool {
        if self.game_over {
            return false;
        }
        if !self.board.push_rows_from_bottom(rows) {
            return false;
        }
        let lift = i8::try_from(rows.len()).unwrap_or(i8::MAX);
        self.falling_piece = self.falling_piece.shifted(0, -lift);
        self.stats.record_garbage_received(rows.len());
        true
    }

    /// Records attack rows sent to an opponent.
    pub fn record_garbage_sent(&mut self, rows: usize) {
        self.stats.record_garbage_sent(rows);
    }

    fn ensure_playing(&self) -> Result<(), ActionError> {
        if self.game_over {
            return Err(ActionError::GameOver);
        }
        Ok(())
    }

    fn try_set_falling_piece(&mut self, piece: Piece) -> Result<(), ActionError> {
        self.ensure_playing()?;
        if self.board.is_colliding(piece) {
            return Err(ActionError::Collision);
        }
        self.falling_piece = piece;
        Ok(())
    }

    fn lock_piece(&mut self) -> PieceLocked {
        let piece = self.falling_piece;
        let fully_visible = self.board.fill_piece(piece);

        let cleared_rows: ArrayVec<ClearedRow, 4> = self
            .board
            .full_rows()
            .take(4)
            .map(|y| ClearedRow {
                y,
                row: *self.board.row(y),
                piece_bits: piece.row_bits(y),
            })
            .collect();
        let cleared = self.board.clear_lines();
        self.stats.record_lock(cleared);

        let mut topped_out = !fully_visible;
        if !topped_out {
            self.falling_piece = Piece::new(self.piece_buffer.pop_next());
            topped_out = self.board.is_colliding(self.falling_piece);
        }
        self.game_over = topped_out;

        let event = PieceLocked {
            piece,
            cleared_rows,
            topped_out,
        };
        self.lock_events.push(event.clone());
        event
    }
}

impl GameControl for GameField {
    fn board(&self) -> &Board {
        &self.board
    }

    fn current_piece(&self) -> Piece {
        self.falling_piece
    }

    fn next_piece(&self) -> PieceKind {
        self.piece_buffer.peek_next()
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn completed_pieces(&self) -> usize {
        self.stats.completed_pieces()
    }

    fn rotate(&mut self) -> Result<(), ActionError> {
        self.ensure_playing()?;
        let rotated = self.falling_piece.rotated_right();
        let kicked = ROTATION_KICKS
            .iter()
            .map(|&(dx, dy)| rotated.shifted(dx, dy))
            .find(|piece| !self.board.is_colliding(*piece))
            .ok_or(ActionError::Collision)?;
        self.falling_piece = kicked;
        Ok(())
    }

    fn move_left(&mut self) -> Result<(), ActionError> {
        self.try_set_falling_piece(self.falling_piece.left())
    }

    fn move_right(&mut self) -> Result<(), ActionError> {
        self.try_set_falling_piece(self.falling_piece.right())
    }

    fn hard_drop(&mut self) -> Result<PieceLocked, ActionError> {
        self.ensure_playing()?;
        self.falling_piece = self.drop_position();
        Ok(self.lock_piece())
    }
}
