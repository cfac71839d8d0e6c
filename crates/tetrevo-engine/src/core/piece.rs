use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::{BOARD_WIDTH, PIECE_SPAWN_X, PIECE_SPAWN_Y};

/// A tetromino at a specific position and rotation.
///
/// Pieces are small value types: moving or rotating returns a new `Piece`, and a
/// simulated copy never shares state with the piece owned by a live game.
///
/// # Coordinate System
///
/// - `(x, y)` is the top-left corner of the piece's 4×4 bounding box
/// - `x` increases rightward, `y` increases downward, row 0 is the top visible row
/// - Both coordinates may be negative: a piece can stick out of the left edge of
///   its bounding box, and rows above the board are valid while falling
///
/// # Example
///
/// ```
/// use tetrevo_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::T);
/// let moved = piece.right().rotated_right();
/// assert_eq!(moved.position().x(), piece.position().x() + 1);
/// assert_eq!(moved.rotation().index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Piece {
    /// Creates a piece at the spawn position in its spawn orientation.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            position: PiecePosition::SPAWN_POSITION,
            rotation: PieceRotation::default(),
            kind,
        }
    }

    /// Creates a piece with an explicit rotation and bounding-box position.
    #[must_use]
    pub fn with_placement(kind: PieceKind, rotation: PieceRotation, x: i8, y: i8) -> Self {
        Self {
            position: PiecePosition::new(x, y),
            rotation,
            kind,
        }
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn mask(&self) -> PieceMask {
        self.kind.mask(self.rotation)
    }

    /// Absolute `(x, y)` board coordinates of the piece's filled cells.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let x0 = i32::from(self.position.x);
        let y0 = i32::from(self.position.y);
        self.kind
            .occupied_positions(self.rotation)
            .map(move |(dx, dy)| (x0 + dx, y0 + dy))
    }

    /// Bits this piece occupies in board row `y`, aligned with the board's row
    /// bitmask. Cells outside the playable columns are dropped.
    #[must_use]
    pub fn row_bits(&self, y: usize) -> u16 {
        let Ok(y) = i32::try_from(y) else {
            return 0;
        };
        let dy = y - i32::from(self.position.y);
        let Ok(dy) = usize::try_from(dy) else {
            return 0;
        };
        let Some(&mask) = self.mask().get(dy) else {
            return 0;
        };
        shift_row_mask(mask, self.position.x).unwrap_or(0)
    }

    /// Lowest (largest) row index touched by this piece.
    #[must_use]
    pub fn bottom_row(&self) -> i32 {
        self.occupied_positions()
            .map(|(_, y)| y)
            .max()
            .unwrap_or(i32::from(self.position.y))
    }

    #[must_use]
    pub fn left(&self) -> Self {
        self.shifted(-1, 0)
    }

    #[must_use]
    pub fn right(&self) -> Self {
        self.shifted(1, 0)
    }

    #[must_use]
    pub fn up(&self) -> Self {
        self.shifted(0, -1)
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.shifted(0, 1)
    }

    #[must_use]
    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            position: PiecePosition::new(self.position.x + dx, self.position.y + dy),
            rotation: self.rotation,
            kind: self.kind,
        }
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self {
            position: self.position,
            rotation: self.rotation.rotated_right(),
            kind: self.kind,
        }
    }

    #[must_use]
    pub fn rotated_left(&self) -> Self {
        Self {
            position: self.position,
            rotation: self.rotation.rotated_left(),
            kind: self.kind,
        }
    }
}

/// Shifts a 4-bit bounding-box row mask to board column `x`.
///
/// Returns `None` if any filled cell would leave the playable columns.
pub(crate) fn shift_row_mask(mask: u16, x: i8) -> Option<u16> {
    let mask = u32::from(mask);
    let shifted = if x >= 0 {
        mask << x.unsigned_abs()
    } else {
        let cut = x.unsigned_abs();
        if mask & ((1 << cut) - 1) != 0 {
            return None;
        }
        mask >> cut
    };
    let full = (1u32 << BOARD_WIDTH) - 1;
    if shifted & !full != 0 {
        return None;
    }
    u16::try_from(shifted).ok()
}

/// Position of a piece's bounding box on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i8,
    y: i8,
}

impl PiecePosition {
    pub const SPAWN_POSITION: Self = Self::new(PIECE_SPAWN_X, PIECE_SPAWN_Y);

    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn x(self) -> i8 {
        self.x
    }

    #[must_use]
    pub fn y(self) -> i8 {
        self.y
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Rotation wraps around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % 4)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn rotated_left(self) -> Self {
        PieceRotation((self.0 + 3) % 4)
    }

    /// Number of clockwise rotations needed to reach `target`.
    #[must_use]
    pub fn steps_to(self, target: Self) -> u8 {
        (target.0 + 4 - self.0) % 4
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// The seven standard tetromino kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Number of distinct orientations worth enumerating.
    ///
    /// `O` looks identical in every rotation, so only its spawn orientation counts.
    #[must_use]
    pub const fn rotation_count(self) -> u8 {
        match self {
            PieceKind::O => 1,
            _ => 4,
        }
    }

    /// Number of filled cells in the piece.
    #[must_use]
    pub const fn cell_count(self) -> u32 {
        4
    }

    pub(crate) fn mask(self, rotation: PieceRotation) -> PieceMask {
        PIECE_MASKS[self as usize][rotation.as_usize()]
    }

    /// Returns an iterator of filled `(dx, dy)` offsets inside the bounding box.
    pub fn occupied_positions(self, rotation: PieceRotation) -> impl Iterator<Item = (i32, i32)> {
        let mask = self.mask(rotation);
        (0..4).flat_map(move |dy| {
            (0..4).filter_map(move |dx| {
                (mask[dy as usize] & (1 << dx) != 0).then_some((dx, dy))
            })
        })
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrevo_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Piece cells within its 4×4 bounding box, one 4-bit row mask per box row.
///
/// Bit `dx` of row `dy` is set when the cell at `(dx, dy)` is filled.
pub type PieceMask = [u16; 4];

/// Generates all 4 rotation states of a piece mask by rotating 90° clockwise.
///
/// `size` is the effective box size: 4 for I, 2 for O, 3 for the rest.
const fn mask_rotations(size: usize, mask: PieceMask) -> [PieceMask; 4] {
    let mut rotates = [mask; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_mask = [0; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                if (rotates[i - 1][size - 1 - x] & (1 << y)) != 0 {
                    new_mask[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_mask;
        i += 1;
    }
    rotates
}

const PIECE_MASKS: [[PieceMask; 4]; PieceKind::LEN] = {
    const fn m(bits: [bool; 4]) -> u16 {
        let mut mask = 0;
        let mut i = 0;
        while i < 4 {
            if bits[i] {
                mask |= 1 << i;
            }
            i += 1;
        }
        mask
    }

    const C: bool = true;
    const E: bool = false;
    const EEEE: u16 = m([E; 4]);

    [
        // I-piece
        mask_rotations(4, [EEEE, m([C, C, C, C]), EEEE, EEEE]),
        // O-piece
        mask_rotations(2, [m([C, C, E, E]), m([C, C, E, E]), EEEE, EEEE]),
        // S-piece
        mask_rotations(3, [m([E, C, C, E]), m([C, C, E, E]), EEEE, EEEE]),
        // Z-piece
        mask_rotations(3, [m([C, C, E, E]), m([E, C, C, E]), EEEE, EEEE]),
        // J-piece
        mask_rotations(3, [m([C, E, E, E]), m([C, C, C, E]), EEEE, EEEE]),
        // L-piece
        mask_rotations(3, [m([E, E, C, E]), m([C, C, C, E]), EEEE, EEEE]),
        // T-piece
        mask_rotations(3, [m([E, C, E, E]), m([C, C, C, E]), EEEE, EEEE]),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_rotation_has_four_cells() {
        for kind in PieceKind::ALL {
            for r in 0..4 {
                let count = kind.occupied_positions(PieceRotation::new(r)).count();
                assert_eq!(count, 4, "{kind:?} rotation {r}");
            }
        }
    }

    #[test]
    fn test_vertical_i_piece_occupies_box_column_two() {
        let cells: Vec<_> = PieceKind::I
            .occupied_positions(PieceRotation::new(1))
            .collect();
        assert_eq!(cells, vec![(2, 0), (2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn test_o_piece_is_rotation_symmetric() {
        let spawn = PieceKind::O.mask(PieceRotation::new(0));
        for r in 1..4 {
            assert_eq!(PieceKind::O.mask(PieceRotation::new(r)), spawn);
        }
        assert_eq!(PieceKind::O.rotation_count(), 1);
        assert_eq!(PieceKind::T.rotation_count(), 4);
    }

    #[test]
    fn test_rotation_steps() {
        let r0 = PieceRotation::new(0);
        assert_eq!(r0.steps_to(PieceRotation::new(3)), 3);
        assert_eq!(PieceRotation::new(3).steps_to(r0), 1);
        assert_eq!(r0.rotated_left(), PieceRotation::new(3));
        assert_eq!(PieceRotation::new(5), PieceRotation::new(1));
    }

    #[test]
    fn test_shift_row_mask_bounds() {
        // vertical I row: only box column 2 filled
        assert_eq!(shift_row_mask(0b0100, -2), Some(0b1));
        assert_eq!(shift_row_mask(0b0100, -3), None);
        assert_eq!(shift_row_mask(0b0100, 7), Some(1 << 9));
        assert_eq!(shift_row_mask(0b0100, 8), None);
    }

    #[test]
    fn test_row_bits_follow_position() {
        let piece = Piece::with_placement(PieceKind::I, PieceRotation::new(1), 3, 16);
        for y in 16..20 {
            assert_eq!(piece.row_bits(y), 1 << 5);
        }
        assert_eq!(piece.row_bits(15), 0);
        assert_eq!(piece.bottom_row(), 19);
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('X'), None);
    }
}
