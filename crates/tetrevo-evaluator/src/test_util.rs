use proptest::prelude::*;
use tetrevo_engine::{BOARD_WIDTH, Board, PieceKind};

/// Boards with up to 14 random rows stacked at the bottom.
pub(crate) fn arb_board() -> impl Strategy<Value = Board> {
    proptest::collection::vec(proptest::collection::vec(any::<bool>(), BOARD_WIDTH), 0..=14)
        .prop_map(|rows| {
            let art: String = rows
                .iter()
                .map(|row| {
                    let mut line: String = row.iter().map(|&c| if c { '#' } else { '.' }).collect();
                    line.push('\n');
                    line
                })
                .collect();
            Board::from_ascii(&art)
        })
}

pub(crate) fn arb_kind() -> impl Strategy<Value = PieceKind> {
    proptest::sample::select(PieceKind::ALL.to_vec())
}
