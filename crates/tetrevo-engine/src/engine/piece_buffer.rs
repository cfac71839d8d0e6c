use std::collections::VecDeque;

use rand::{Rng as _, SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;

use crate::PieceKind;

use super::PieceSeed;

/// Upcoming pieces, dealt from shuffled bags of all seven kinds.
///
/// At least one full bag beyond the current piece is always queued, so the
/// preview never runs dry.
///
/// # Example
///
/// ```
/// use tetrevo_engine::{PieceBuffer, PieceSeed};
///
/// let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u64(1));
/// let upcoming = buffer.peek_next();
/// assert_eq!(buffer.pop_next(), upcoming);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    queue: VecDeque<PieceKind>,
}

impl Default for PieceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceBuffer {
    /// Buffer with a seed drawn from the thread RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut buffer = Self {
            rng: Pcg32::from_seed(seed.to_rng_seed()),
            queue: VecDeque::with_capacity(2 * PieceKind::LEN),
        };
        buffer.deal_bags();
        buffer
    }

    fn deal_bags(&mut self) {
        while self.queue.len() <= PieceKind::LEN {
            let mut bag = PieceKind::ALL;
            bag.shuffle(&mut self.rng);
            self.queue.extend(bag);
        }
    }

    /// Removes and returns the next piece.
    ///
    /// # Panics
    ///
    /// Does not panic; more than a bag is queued after every draw.
    pub fn pop_next(&mut self) -> PieceKind {
        let kind = self.queue.pop_front().expect("piece queue is refilled after every draw");
        self.deal_bags();
        kind
    }

    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.queue[0]
    }

    /// Upcoming pieces in draw order.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_each_bag_deals_every_kind_once() {
        let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u64(42));
        for _ in 0..10 {
            let kinds: HashSet<_> = (0..PieceKind::LEN).map(|_| buffer.pop_next()).collect();
            assert_eq!(kinds.len(), PieceKind::LEN);
        }
    }

    #[test]
    fn test_preview_covers_a_full_bag() {
        let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u64(7));
        for _ in 0..30 {
            assert!(buffer.next_pieces().count() > PieceKind::LEN);
            let peeked = buffer.peek_next();
            assert_eq!(buffer.pop_next(), peeked);
        }
    }

    #[test]
    fn test_equal_seeds_deal_equal_sequences() {
        let seed = PieceSeed::from_u128(0x1234_5678_9abc_def0_1122_3344_5566_7788);
        let mut a = PieceBuffer::with_seed(seed);
        let mut b = PieceBuffer::with_seed(seed);
        let a: Vec<_> = (0..20).map(|_| a.pop_next()).collect();
        let b: Vec<_> = (0..20).map(|_| b.pop_next()).collect();
        assert_eq!(a, b);
        let mut c = PieceBuffer::with_seed(PieceSeed::from_u64(1));
        let c: Vec<_> = (0..20).map(|_| c.pop_next()).collect();
        assert_ne!(a, c);
    }
}
