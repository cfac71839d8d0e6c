use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    BOARD_HEIGHT, BOARD_WIDTH,
    piece::{Piece, PieceKind, shift_row_mask},
};

const FULL_ROW_MASK: u16 = (1 << BOARD_WIDTH) - 1;

/// Colour of a fixed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Block {
    /// Locked cell of a placed piece.
    Piece(PieceKind),
    /// Cell inserted by an opponent's attack.
    Garbage,
}

impl Block {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Block::Piece(kind) => kind.as_char(),
            Block::Garbage => '#',
        }
    }
}

/// Observable content of a board cell, including the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Cell {
    Empty,
    Falling(PieceKind),
    Fixed(Block),
}

/// One row of the board.
///
/// Occupancy is kept as a bitmask (bit `x` set when column `x` is filled) next
/// to the colour of every filled cell. The two are always updated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardRow {
    bits: u16,
    blocks: [Option<Block>; BOARD_WIDTH],
}

impl Default for BoardRow {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoardRow {
    pub const EMPTY: Self = Self {
        bits: 0,
        blocks: [None; BOARD_WIDTH],
    };

    #[inline]
    #[must_use]
    pub fn bits(&self) -> u16 {
        self.bits
    }

    #[inline]
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.bits == FULL_ROW_MASK
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    #[inline]
    #[must_use]
    pub fn is_occupied(&self, x: usize) -> bool {
        x < BOARD_WIDTH && self.bits & (1 << x) != 0
    }

    #[must_use]
    pub fn block(&self, x: usize) -> Option<Block> {
        self.blocks.get(x).copied().flatten()
    }

    /// Number of filled cells in the row.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }

    /// Iterates the cells of the row from left to right.
    pub fn blocks(&self) -> impl Iterator<Item = Option<Block>> + '_ {
        self.blocks.iter().copied()
    }

    pub fn set(&mut self, x: usize, block: Block) {
        if x < BOARD_WIDTH {
            self.bits |= 1 << x;
            self.blocks[x] = Some(block);
        }
    }

    pub fn clear(&mut self, x: usize) {
        if x < BOARD_WIDTH {
            self.bits &= !(1 << x);
            self.blocks[x] = None;
        }
    }

    /// Builds an attack row from a cleared row.
    ///
    /// Cells contributed by the attacker's locked piece (`piece_bits`) become
    /// holes, every other filled cell becomes [`Block::Garbage`]. The result is
    /// never a full row.
    #[must_use]
    pub fn to_garbage(&self, piece_bits: u16) -> Self {
        let mut garbage = Self::EMPTY;
        for x in 0..BOARD_WIDTH {
            if self.is_occupied(x) && piece_bits & (1 << x) == 0 {
                garbage.set(x, Block::Garbage);
            }
        }
        if garbage.is_filled() {
            garbage.clear(0);
        }
        garbage
    }
}

/// Playfield of fixed blocks.
///
/// `Board` is a plain value: cloning it yields an independent snapshot, which is
/// how simulations explore placements without touching the live game.
///
/// # Example
///
/// ```
/// use tetrevo_engine::{Board, Piece, PieceKind, PieceRotation};
///
/// let mut board = Board::EMPTY;
/// let piece = Piece::with_placement(PieceKind::O, PieceRotation::default(), 0, 18);
/// assert!(!board.is_colliding(piece));
/// board.fill_piece(piece);
/// assert!(board.is_colliding(piece));
/// assert_eq!(board.fixed_cell_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [BoardRow; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [BoardRow::EMPTY; BOARD_HEIGHT],
    };

    #[must_use]
    pub fn row(&self, y: usize) -> &BoardRow {
        &self.rows[y]
    }

    pub fn rows(&self) -> impl Iterator<Item = &BoardRow> + '_ {
        self.rows.iter()
    }

    /// Returns the fixed block at `(x, y)`, if any.
    ///
    /// Out-of-range coordinates read as empty.
    #[must_use]
    pub fn block(&self, x: usize, y: usize) -> Option<Block> {
        self.rows.get(y).and_then(|row| row.block(x))
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.rows.get(y).is_some_and(|row| row.is_occupied(x))
    }

    /// Total number of fixed cells on the board.
    #[must_use]
    pub fn fixed_cell_count(&self) -> u32 {
        self.rows.iter().map(BoardRow::count).sum()
    }

    /// Checks if the piece overlaps fixed cells or leaves the playfield.
    ///
    /// Cells above row 0 only collide when they stick out sideways.
    #[must_use]
    pub fn is_colliding(&self, piece: Piece) -> bool {
        let x0 = piece.position().x();
        let y0 = i32::from(piece.position().y());
        for (dy, mask) in (0..).zip(piece.mask()) {
            if mask == 0 {
                continue;
            }
            let Some(bits) = shift_row_mask(mask, x0) else {
                return true;
            };
            let y = y0 + dy;
            if y < 0 {
                continue;
            }
            match usize::try_from(y).ok().and_then(|y| self.rows.get(y)) {
                Some(row) if row.bits & bits == 0 => {}
                _ => return true,
            }
        }
        false
    }

    /// Locks a piece onto the board.
    ///
    /// Cells above row 0 are discarded. Returns `false` when that happened,
    /// i.e. the piece did not fit entirely inside the visible area.
    pub fn fill_piece(&mut self, piece: Piece) -> bool {
        let mut fully_visible = true;
        for (x, y) in piece.occupied_positions() {
            match (usize::try_from(x), usize::try_from(y)) {
                (Ok(x), Ok(y)) if x < BOARD_WIDTH && y < BOARD_HEIGHT => {
                    self.rows[y].set(x, Block::Piece(piece.kind()));
                }
                _ => fully_visible = false,
            }
        }
        fully_visible
    }

    /// Indices of completely filled rows, top to bottom.
    pub fn full_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(y, row)| row.is_filled().then_some(y))
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// Remaining rows keep their relative order and settle at the bottom;
    /// empty rows are inserted at the top.
    pub fn clear_lines(&mut self) -> usize {
        let mut count = 0;
        for y in (0..BOARD_HEIGHT).rev() {
            if self.rows[y].is_filled() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }
        self.rows[..count].fill(BoardRow::EMPTY);
        count
    }

    /// Pushes `rows` in at the bottom, shifting the existing stack up.
    ///
    /// `rows[0]` ends up lowest. Returns `false` without modifying the board if
    /// any filled cell would be pushed above row 0.
    pub fn push_rows_from_bottom(&mut self, rows: &[BoardRow]) -> bool {
        let n = rows.len();
        if n == 0 {
            return true;
        }
        if n > BOARD_HEIGHT || self.rows[..n].iter().any(|row| !row.is_empty()) {
            return false;
        }
        self.rows.copy_within(n.., 0);
        for (i, row) in rows.iter().enumerate() {
            self.rows[BOARD_HEIGHT - 1 - i] = *row;
        }
        true
    }

    /// Creates a `Board` from ASCII art.
    ///
    /// `.` is empty, `#` is garbage and the piece letters `IOSZJLT` are locked
    /// piece cells. Rows are given top to bottom and aligned to the bottom of
    /// the board, so fewer than 20 rows may be supplied.
    ///
    /// # Panics
    ///
    /// Panics if a row is not exactly 10 cells wide or more than 20 rows are given.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(
            lines.len() <= BOARD_HEIGHT,
            "at most {BOARD_HEIGHT} rows allowed, got {}",
            lines.len()
        );
        let offset = BOARD_HEIGHT - lines.len();
        let mut board = Self::EMPTY;
        for (i, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(
                chars.len(),
                BOARD_WIDTH,
                "each row must have exactly {BOARD_WIDTH} cells, got {} at row {i}",
                chars.len(),
            );
            for (x, &ch) in chars.iter().enumerate() {
                let block = match ch {
                    '.' => continue,
                    '#' => Block::Garbage,
                    c => Block::Piece(
                        PieceKind::from_char(c)
                            .unwrap_or_else(|| panic!("unknown cell character {c:?}")),
                    ),
                };
                board.rows[offset + i].set(x, block);
            }
        }
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for block in row.blocks() {
                let ch = block.map_or('.', Block::as_char);
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
