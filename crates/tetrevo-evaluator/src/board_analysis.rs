//! Lazily evaluated board metrics.
//!
//! Each metric is a full-board scan computed on first access and cached, so a
//! caller that only needs holes never pays for well sums.

use std::{cell::OnceCell, iter};

use tetrevo_engine::{BOARD_HEIGHT, BOARD_WIDTH, Board};

#[derive(Debug)]
pub struct BoardAnalysis<'a> {
    board: &'a Board,
    column_heights: OnceCell<[u8; BOARD_WIDTH]>,
    num_holes: OnceCell<u32>,
    row_transitions: OnceCell<u32>,
    column_transitions: OnceCell<u32>,
    well_sums: OnceCell<u32>,
}

impl<'a> BoardAnalysis<'a> {
    #[must_use]
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            column_heights: OnceCell::new(),
            num_holes: OnceCell::new(),
            row_transitions: OnceCell::new(),
            column_transitions: OnceCell::new(),
            well_sums: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.board
    }

    /// Height of each column: rows from the floor up to its topmost filled cell.
    #[must_use]
    pub fn column_heights(&self) -> &[u8; BOARD_WIDTH] {
        self.column_heights.get_or_init(|| {
            let mut column_heights = [0; BOARD_WIDTH];
            for (x, h) in column_heights.iter_mut().enumerate() {
                let top = (0..BOARD_HEIGHT).find(|&y| self.board.is_occupied(x, y));
                if let Some(top) = top {
                    *h = u8::try_from(BOARD_HEIGHT - top).unwrap_or(u8::MAX);
                }
            }
            column_heights
        })
    }

    #[must_use]
    pub fn max_height(&self) -> u8 {
        self.column_heights().iter().copied().max().unwrap_or(0)
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average_height(&self) -> f64 {
        let total: u32 = self.column_heights().iter().copied().map(u32::from).sum();
        f64::from(total) / BOARD_WIDTH as f64
    }

    /// Empty cells with at least one filled cell above them in the same column.
    #[must_use]
    pub fn num_holes(&self) -> u32 {
        *self.num_holes.get_or_init(|| {
            let mut holes = 0;
            for x in 0..BOARD_WIDTH {
                let mut covered = false;
                for y in 0..BOARD_HEIGHT {
                    if self.board.is_occupied(x, y) {
                        covered = true;
                    } else if covered {
                        holes += 1;
                    }
                }
            }
            holes
        })
    }

    /// Horizontal filled/empty changes on every row from the topmost occupied
    /// row down, with both walls counted as filled.
    #[must_use]
    pub fn row_transitions(&self) -> u32 {
        *self.row_transitions.get_or_init(|| {
            let Some(top) = self.board.rows().position(|row| !row.is_empty()) else {
                return 0;
            };
            let mut transitions = 0;
            for row in self.board.rows().skip(top) {
                let cells = (0..BOARD_WIDTH).map(|x| row.is_occupied(x));
                let walled = iter::once(true).chain(cells).chain(iter::once(true));
                transitions += count_changes(walled);
            }
            transitions
        })
    }

    /// Vertical filled/empty changes per column, with the ceiling and the floor
    /// both counted as filled.
    #[must_use]
    pub fn column_transitions(&self) -> u32 {
        *self.column_transitions.get_or_init(|| {
            (0..BOARD_WIDTH)
                .map(|x| {
                    let cells = (0..BOARD_HEIGHT).map(|y| self.board.is_occupied(x, y));
                    count_changes(iter::once(true).chain(cells).chain(iter::once(true)))
                })
                .sum()
        })
    }

    /// Sum of `d·(d+1)/2` over every maximal vertical run of well cells, where a
    /// well cell is empty with both horizontal neighbours filled (walls count).
    #[must_use]
    pub fn well_sums(&self) -> u32 {
        *self.well_sums.get_or_init(|| {
            let filled = |x: Option<usize>, y: usize| match x {
                Some(x) if x < BOARD_WIDTH => self.board.is_occupied(x, y),
                _ => true,
            };
            let mut sum = 0;
            for x in 0..BOARD_WIDTH {
                let mut depth = 0;
                for y in 0..BOARD_HEIGHT {
                    let is_well = !self.board.is_occupied(x, y)
                        && filled(x.checked_sub(1), y)
                        && filled(Some(x + 1), y);
                    if is_well {
                        depth += 1;
                        sum += depth;
                    } else {
                        depth = 0;
                    }
                }
            }
            sum
        })
    }
}

fn count_changes(cells: impl Iterator<Item = bool>) -> u32 {
    let mut changes = 0;
    let mut prev = None;
    for cell in cells {
        if prev.is_some_and(|p| p != cell) {
            changes += 1;
        }
        prev = Some(cell);
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let board = Board::EMPTY;
        let analysis = BoardAnalysis::new(&board);
        assert_eq!(analysis.column_heights(), &[0; BOARD_WIDTH]);
        assert_eq!(analysis.max_height(), 0);
        assert_eq!(analysis.num_holes(), 0);
        assert_eq!(analysis.row_transitions(), 0);
        // ceiling -> empty and empty -> floor for every column
        assert_eq!(analysis.column_transitions(), 2 * 10);
        assert_eq!(analysis.well_sums(), 0);
    }

    #[test]
    fn test_column_heights_and_holes() {
        let board = Board::from_ascii(
            "
            .#........
            ..........
            .#...#....
            ##..##....
            ",
        );
        let analysis = BoardAnalysis::new(&board);
        assert_eq!(analysis.column_heights(), &[1, 4, 0, 0, 1, 2, 0, 0, 0, 0]);
        assert_eq!(analysis.max_height(), 4);
        assert_eq!(analysis.num_holes(), 1);
        assert!((analysis.average_height() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_row_transitions_count_walls() {
        let board = Board::from_ascii(
            "
            #........#
            ",
        );
        let analysis = BoardAnalysis::new(&board);
        // wall|# . . #|wall -> only the two inner edges
        assert_eq!(analysis.row_transitions(), 2);

        let board = Board::from_ascii(
            "
            ....#.....
            ",
        );
        let analysis = BoardAnalysis::new(&board);
        assert_eq!(analysis.row_transitions(), 4);
    }

    #[test]
    fn test_column_transitions_with_hole() {
        let board = Board::from_ascii(
            "
            #.........
            ..........
            #.........
            ",
        );
        let analysis = BoardAnalysis::new(&board);
        // column 0: ceiling, 17 empty, #, ., # , floor -> 4 changes
        // other columns: 2 each
        assert_eq!(analysis.column_transitions(), 4 + 9 * 2);
    }

    #[test]
    fn test_well_sums() {
        let board = Board::from_ascii(
            "
            #.########
            #.########
            #.########
            ",
        );
        let analysis = BoardAnalysis::new(&board);
        // depth-3 well in column 1
        assert_eq!(analysis.well_sums(), 6);

        let board = Board::from_ascii(
            "
            .#########
            .#########
            ",
        );
        let analysis = BoardAnalysis::new(&board);
        // the wall counts as a filled neighbour
        assert_eq!(analysis.well_sums(), 3);
    }

    #[test]
    fn test_separate_well_runs() {
        let board = Board::from_ascii(
            "
            #.#.......
            ###.......
            #.#.......
            #.#.......
            ",
        );
        let analysis = BoardAnalysis::new(&board);
        // column 1: runs of depth 1 and 2 -> 1 + 3
        assert_eq!(analysis.well_sums(), 4);
    }
}
