//! Enumeration of legal placements.
//!
//! A placement ([`Move`]) is a rotation plus the column of the piece's bounding
//! box. It is legal when the piece, dropped straight down from above the board
//! in that orientation, comes to rest somewhere without colliding on the way.

use tetrevo_engine::{BOARD_WIDTH, Board, Piece, PieceKind, PieceRotation};

/// Row the drop starts from: the whole 4×4 box sits above row 0.
const DROP_START_Y: i8 = -4;
/// Leftmost bounding-box column tried.
const MIN_X: i8 = -2;
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const MAX_X: i8 = BOARD_WIDTH as i8 - 2;

/// Target placement for a piece: bounding-box column and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub x: i8,
    pub rotation: PieceRotation,
}

impl Move {
    #[must_use]
    pub const fn new(x: i8, rotation: PieceRotation) -> Self {
        Self { x, rotation }
    }
}

/// Returns every legal move for `kind` on `board`.
///
/// Moves are produced in rotation-major order, then by increasing `x`.
#[must_use]
pub fn generate_moves(board: &Board, kind: PieceKind) -> Vec<Move> {
    let mut moves = Vec::with_capacity(usize::from(kind.rotation_count()) * BOARD_WIDTH);
    for r in 0..kind.rotation_count() {
        let rotation = PieceRotation::new(r);
        for x in MIN_X..=MAX_X {
            let mv = Move::new(x, rotation);
            if landing_piece(board, kind, mv).is_some() {
                moves.push(mv);
            }
        }
    }
    moves
}

/// Drops `kind` in the orientation and column of `mv` and returns it at its
/// resting row, or `None` if it cannot enter the board there.
#[must_use]
pub fn landing_piece(board: &Board, kind: PieceKind, mv: Move) -> Option<Piece> {
    let mut piece = Piece::with_placement(kind, mv.rotation, mv.x, DROP_START_Y);
    if board.is_colliding(piece) {
        return None;
    }
    loop {
        let down = piece.down();
        if board.is_colliding(down) {
            return Some(piece);
        }
        piece = down;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::test_util::{arb_board, arb_kind};

    #[test]
    fn test_move_counts_on_empty_board() {
        let board = Board::EMPTY;
        // 7 columns horizontally + 10 vertically, twice each
        assert_eq!(generate_moves(&board, PieceKind::I).len(), 34);
        assert_eq!(generate_moves(&board, PieceKind::O).len(), 9);
        for kind in [PieceKind::S, PieceKind::Z, PieceKind::J, PieceKind::L, PieceKind::T] {
            // 8 columns when 3 wide, 9 when 2 wide
            assert_eq!(generate_moves(&board, kind).len(), 34, "{kind:?}");
        }
    }

    #[test]
    fn test_vertical_i_lands_on_floor() {
        let piece = landing_piece(
            &Board::EMPTY,
            PieceKind::I,
            Move::new(3, PieceRotation::new(1)),
        )
        .unwrap();
        assert_eq!(piece.position().y(), 16);
        assert_eq!(piece.bottom_row(), 19);
    }

    #[test]
    fn test_piece_rests_on_stack() {
        let board = Board::from_ascii(
            "
            ..........
            ...###....
            ##########
            ",
        );
        let piece = landing_piece(&board, PieceKind::O, Move::new(3, PieceRotation::default()))
            .unwrap();
        assert_eq!(piece.bottom_row(), 17);
    }

    #[test]
    fn test_full_column_still_admits_moves_resting_above_board() {
        let board = Board::from_ascii(&"....#.....\n".repeat(20));
        let moves = generate_moves(&board, PieceKind::I);
        let horizontal: Vec<_> = moves
            .iter()
            .filter(|mv| mv.rotation == PieceRotation::default())
            .collect();
        // horizontal I spanning column 4 rests above the board but is still a move
        assert_eq!(horizontal.len(), 7);
    }

    proptest! {
        #[test]
        fn prop_moves_are_collision_free_along_drop(board in arb_board(), kind in arb_kind()) {
            for mv in generate_moves(&board, kind) {
                let rest = landing_piece(&board, kind, mv).unwrap();
                prop_assert!(!board.is_colliding(rest));
                prop_assert!(board.is_colliding(rest.down()));
                let mut y = DROP_START_Y;
                while y <= rest.position().y() {
                    let piece = Piece::with_placement(kind, mv.rotation, mv.x, y);
                    prop_assert!(!board.is_colliding(piece));
                    y += 1;
                }
            }
        }
    }
}
