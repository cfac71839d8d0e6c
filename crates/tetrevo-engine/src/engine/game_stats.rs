/// Points awarded for a lock that clears `lines` rows at once.
///
/// Only the classic single/double/triple/tetris table is used; there are no
/// combo, back-to-back or T-spin bonuses.
#[must_use]
pub const fn line_clear_score(lines: usize) -> usize {
    match lines {
        1 => 100,
        2 => 300,
        3 => 500,
        4 => 800,
        _ => 0,
    }
}

/// Running totals of one game: score, pieces, line clears and garbage traffic.
///
/// # Example
///
/// ```
/// use tetrevo_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_lock(4);
/// stats.record_lock(0);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.completed_pieces(), 2);
/// assert_eq!(stats.clears_by_size(), &[1, 0, 0, 0, 1]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameStats {
    score: usize,
    pieces: usize,
    lines: usize,
    /// Locks grouped by number of rows cleared, 0 through 4.
    clears: [usize; 5],
    garbage_sent: usize,
    garbage_received: usize,
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            pieces: 0,
            lines: 0,
            clears: [0; 5],
            garbage_sent: 0,
            garbage_received: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Pieces locked so far.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.lines
    }

    #[must_use]
    pub const fn clears_by_size(&self) -> &[usize; 5] {
        &self.clears
    }

    #[must_use]
    pub const fn garbage_sent(&self) -> usize {
        self.garbage_sent
    }

    #[must_use]
    pub const fn garbage_received(&self) -> usize {
        self.garbage_received
    }

    /// Counts a locked piece that cleared `cleared_lines` rows.
    pub const fn record_lock(&mut self, cleared_lines: usize) {
        self.pieces += 1;
        self.lines += cleared_lines;
        self.score += line_clear_score(cleared_lines);
        if cleared_lines < self.clears.len() {
            self.clears[cleared_lines] += 1;
        }
    }

    pub const fn record_garbage_sent(&mut self, rows: usize) {
        self.garbage_sent += rows;
    }

    pub const fn record_garbage_received(&mut self, rows: usize) {
        self.garbage_received += rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_lock_of_each_size() {
        let mut stats = GameStats::new();
        for lines in 0..=4 {
            stats.record_lock(lines);
        }
        assert_eq!(stats.score(), 100 + 300 + 500 + 800);
        assert_eq!(stats.completed_pieces(), 5);
        assert_eq!(stats.total_cleared_lines(), 10);
        assert_eq!(stats.clears_by_size(), &[1; 5]);
    }

    #[test]
    fn test_garbage_counters() {
        let mut stats = GameStats::new();
        stats.record_garbage_sent(2);
        stats.record_garbage_sent(3);
        stats.record_garbage_received(1);
        assert_eq!((stats.garbage_sent(), stats.garbage_received()), (5, 1));
    }
}
