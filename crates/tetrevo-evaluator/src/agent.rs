//! Driving a live game with the planner.
//!
//! An [`AiAgent`] is advanced one tick at a time. On each tick it either waits
//! out its think delay, executes the next queued action, or, when nothing is
//! queued, plans a placement for the falling piece and queues the actions that
//! reach it: rotations first, then horizontal shifts, then a hard drop.
//!
//! Actions go through [`GameControl`], so the agent never touches the board
//! directly. A failed action discards the plan, and a new plan is made on a
//! later tick from whatever state the game is in by then.

use std::{collections::VecDeque, iter};

use serde::{Deserialize, Serialize};
use tetrevo_engine::{ActionError, GameControl, Piece, PieceLocked};
use tracing::trace;

use crate::{
    beam_search::BeamSearchPlanner,
    move_generator::Move,
    placement_evaluator::{LinearEvaluator, PlacementEvaluator},
    weights::WeightSet,
};

/// A primitive request issued to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Action {
    #[display("rotate")]
    Rotate,
    #[display("move left")]
    MoveLeft,
    #[display("move right")]
    MoveRight,
    #[display("hard drop")]
    HardDrop,
}

/// Presets for how many ticks the agent idles between actions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[display("easy")]
    Easy,
    #[default]
    #[display("normal")]
    Normal,
    #[display("hard")]
    Hard,
    /// Acts on every tick.
    #[display("instant")]
    Instant,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Instant,
    ];

    #[must_use]
    pub const fn think_delay(self) -> u32 {
        match self {
            Difficulty::Easy => 6,
            Difficulty::Normal => 3,
            Difficulty::Hard => 1,
            Difficulty::Instant => 0,
        }
    }
}

/// What the agent did during one tick.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum AgentTick {
    /// The think delay has not elapsed yet.
    Waiting,
    /// A placement was chosen and its actions queued.
    Planned(Move),
    /// A rotation or shift was executed.
    Acted(Action),
    /// The hard drop locked the piece.
    Locked(PieceLocked),
    /// The game rejected an action; the plan was discarded.
    Failed(Action, ActionError),
    /// The falling piece has no legal placement. The caller should end the game.
    NoMove,
    /// The game is already over.
    Idle,
}

#[derive(Debug, Clone)]
pub struct AiAgent<E = LinearEvaluator> {
    planner: BeamSearchPlanner<E>,
    think_delay: u32,
    cooldown: u32,
    queue: VecDeque<Action>,
    target: Option<Move>,
    /// `completed_pieces` of the game when the current plan was made.
    planned_at: Option<usize>,
}

impl AiAgent {
    /// Creates an agent planning with the default beam over `weights`.
    #[must_use]
    pub fn with_weights(weights: WeightSet) -> Self {
        Self::new(BeamSearchPlanner::with_weights(weights))
    }
}

impl<E> AiAgent<E>
where
    E: PlacementEvaluator,
{
    #[must_use]
    pub fn new(planner: BeamSearchPlanner<E>) -> Self {
        Self {
            planner,
            think_delay: 0,
            cooldown: 0,
            queue: VecDeque::new(),
            target: None,
            planned_at: None,
        }
    }

    /// Sets the number of idle ticks after each plan or action.
    #[must_use]
    pub fn with_think_delay(mut self, ticks: u32) -> Self {
        self.think_delay = ticks;
        self
    }

    #[must_use]
    pub fn with_difficulty(self, difficulty: Difficulty) -> Self {
        self.with_think_delay(difficulty.think_delay())
    }

    #[must_use]
    pub fn planner(&self) -> &BeamSearchPlanner<E> {
        &self.planner
    }

    #[must_use]
    pub fn think_delay(&self) -> u32 {
        self.think_delay
    }

    /// The placement currently being executed, if any.
    #[must_use]
    pub fn target(&self) -> Option<Move> {
        self.target
    }

    pub fn queued_actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.queue.iter().copied()
    }

    /// Discards the current plan. The cooldown is kept.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.target = None;
        self.planned_at = None;
    }

    /// Advances the agent by one tick.
    pub fn tick<G>(&mut self, game: &mut G) -> AgentTick
    where
        G: GameControl + ?Sized,
    {
        if game.is_game_over() {
            self.reset();
            return AgentTick::Idle;
        }
        // gravity may have locked the planned piece behind our back
        if self.planned_at.is_some_and(|n| n != game.completed_pieces()) {
            self.reset();
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return AgentTick::Waiting;
        }
        self.cooldown = self.think_delay;

        match self.queue.pop_front() {
            Some(action) => self.execute(game, action),
            None => self.plan(game),
        }
    }

    fn plan<G>(&mut self, game: &G) -> AgentTick
    where
        G: GameControl + ?Sized,
    {
        let piece = game.current_piece();
        let next = game.next_piece();
        let Some(plan) = self.planner.plan(game.board(), piece.kind(), Some(next)) else {
            trace!(kind = ?piece.kind(), "no placement available");
            return AgentTick::NoMove;
        };
        trace!(
            kind = ?piece.kind(),
            x = plan.mv.x,
            rotation = plan.mv.rotation.index(),
            total = plan.total,
            greedy = plan.greedy,
            "planned placement"
        );
        self.queue = action_sequence(piece, plan.mv);
        self.target = Some(plan.mv);
        self.planned_at = Some(game.completed_pieces());
        AgentTick::Planned(plan.mv)
    }

    fn execute<G>(&mut self, game: &mut G, action: Action) -> AgentTick
    where
        G: GameControl + ?Sized,
    {
        let result = match action {
            Action::Rotate => game.rotate(),
            Action::MoveLeft => game.move_left(),
            Action::MoveRight => game.move_right(),
            Action::HardDrop => {
                self.reset();
                return match game.hard_drop() {
                    Ok(locked) => AgentTick::Locked(locked),
                    Err(err) => AgentTick::Failed(action, err),
                };
            }
        };
        match result {
            Ok(()) => {
                if action == Action::Rotate {
                    self.realign(game.current_piece());
                }
                AgentTick::Acted(action)
            }
            Err(err) => {
                trace!(%action, %err, "action rejected, discarding plan");
                self.reset();
                AgentTick::Failed(action, err)
            }
        }
    }

    /// Rebuilds the shift part of the queue after a rotation, which may have
    /// kicked the piece sideways.
    fn realign(&mut self, piece: Piece) {
        let Some(target) = self.target else {
            return;
        };
        let rotations = self
            .queue
            .iter()
            .take_while(|action| **action == Action::Rotate)
            .count();
        self.queue = iter::repeat_n(Action::Rotate, rotations)
            .chain(shift_actions(piece.position().x(), target.x))
            .chain(iter::once(Action::HardDrop))
            .collect();
    }
}

/// Actions moving `piece` to `target` and dropping it.
#[must_use]
pub fn action_sequence(piece: Piece, target: Move) -> VecDeque<Action> {
    let rotations = piece.rotation().steps_to(target.rotation);
    iter::repeat_n(Action::Rotate, usize::from(rotations))
        .chain(shift_actions(piece.position().x(), target.x))
        .chain(iter::once(Action::HardDrop))
        .collect()
}

fn shift_actions(from_x: i8, to_x: i8) -> impl Iterator<Item = Action> {
    let shift = i16::from(to_x) - i16::from(from_x);
    let action = if shift < 0 {
        Action::MoveLeft
    } else {
        Action::MoveRight
    };
    iter::repeat_n(action, usize::from(shift.unsigned_abs()))
}

#[cfg(test)]
mod tests {
    use tetrevo_engine::{Board, GameField, PieceKind, PieceRotation, PieceSeed};

    use super::*;
    use crate::board_simulator::simulate_move;

    /// Minimal game that never spawns a new piece.
    #[derive(Debug)]
    struct FakeGame {
        board: Board,
        piece: Piece,
        next: PieceKind,
        walls_closed: bool,
        drops: usize,
    }

    impl FakeGame {
        fn new(board: Board, kind: PieceKind) -> Self {
            Self {
                board,
                piece: Piece::new(kind),
                next: kind,
                walls_closed: false,
                drops: 0,
            }
        }

        fn shift(&mut self, piece: Piece) -> Result<(), ActionError> {
            if self.walls_closed {
                return Err(ActionError::Collision);
            }
            self.piece = piece;
            Ok(())
        }
    }

    impl GameControl for FakeGame {
        fn board(&self) -> &Board {
            &self.board
        }

        fn current_piece(&self) -> Piece {
            self.piece
        }

        fn next_piece(&self) -> PieceKind {
            self.next
        }

        fn is_game_over(&self) -> bool {
            false
        }

        fn completed_pieces(&self) -> usize {
            self.drops
        }

        fn rotate(&mut self) -> Result<(), ActionError> {
            self.piece = self.piece.rotated_right();
            Ok(())
        }

        fn move_left(&mut self) -> Result<(), ActionError> {
            self.shift(self.piece.left())
        }

        fn move_right(&mut self) -> Result<(), ActionError> {
            self.shift(self.piece.right())
        }

        fn hard_drop(&mut self) -> Result<PieceLocked, ActionError> {
            Err(ActionError::GameOver)
        }
    }

    fn run_until_locked<G: GameControl>(agent: &mut AiAgent, game: &mut G) -> PieceLocked {
        for _ in 0..100 {
            if let AgentTick::Locked(locked) = agent.tick(game) {
                return locked;
            }
        }
        panic!("agent never dropped the piece");
    }

    #[test]
    fn test_action_sequence_order() {
        let piece = Piece::new(PieceKind::T);
        let actions: Vec<_> = action_sequence(piece, Move::new(0, PieceRotation::new(2))).into();
        assert_eq!(
            actions,
            vec![
                Action::Rotate,
                Action::Rotate,
                Action::MoveLeft,
                Action::MoveLeft,
                Action::MoveLeft,
                Action::HardDrop,
            ]
        );

        let actions: Vec<_> = action_sequence(piece, Move::new(5, PieceRotation::new(3))).into();
        assert_eq!(
            actions,
            vec![
                Action::Rotate,
                Action::Rotate,
                Action::Rotate,
                Action::MoveRight,
                Action::MoveRight,
                Action::HardDrop,
            ]
        );
    }

    #[test]
    fn test_locked_piece_matches_plan() {
        let mut field = GameField::with_seed(PieceSeed::from_u64(7));
        let mut agent = AiAgent::with_weights(WeightSet::default());
        let board = field.board().clone();
        let kind = field.current_piece().kind();

        let AgentTick::Planned(mv) = agent.tick(&mut field) else {
            panic!("first tick should plan");
        };
        let locked = run_until_locked(&mut agent, &mut field);
        assert_eq!(locked.piece.position().x(), mv.x);
        assert_eq!(locked.piece.rotation(), mv.rotation);

        let simulated = simulate_move(&board, kind, mv).unwrap();
        assert_eq!(field.board(), &simulated.board);
        assert!(agent.target().is_none());
    }

    #[test]
    fn test_think_delay_throttles_actions() {
        let mut field = GameField::with_seed(PieceSeed::from_u64(3));
        let mut agent = AiAgent::with_weights(WeightSet::default()).with_think_delay(2);
        assert!(agent.tick(&mut field).is_planned());
        assert!(agent.tick(&mut field).is_waiting());
        assert!(agent.tick(&mut field).is_waiting());
        let acted = agent.tick(&mut field);
        assert!(acted.is_acted() || acted.is_locked());
        assert!(agent.tick(&mut field).is_waiting());
    }

    #[test]
    fn test_difficulty_presets() {
        let delays: Vec<_> = Difficulty::ALL.iter().map(|d| d.think_delay()).collect();
        assert_eq!(delays, vec![6, 3, 1, 0]);
        let agent = AiAgent::with_weights(WeightSet::default()).with_difficulty(Difficulty::Hard);
        assert_eq!(agent.think_delay(), 1);
    }

    #[test]
    fn test_stale_plan_is_discarded_after_lock() {
        let mut field = GameField::with_seed(PieceSeed::from_u64(11));
        let mut agent = AiAgent::with_weights(WeightSet::default());
        assert!(agent.tick(&mut field).is_planned());
        // the piece locks without the agent's help
        field.hard_drop().unwrap();
        assert!(agent.tick(&mut field).is_planned());
    }

    #[test]
    fn test_no_move_on_blocked_board() {
        let board = Board::from_ascii(&"#########.\n".repeat(19));
        let mut game = FakeGame::new(board, PieceKind::O);
        let mut agent = AiAgent::with_weights(WeightSet::default());
        assert_eq!(agent.tick(&mut game), AgentTick::NoMove);
        assert!(agent.target().is_none());
    }

    #[test]
    fn test_rejected_action_discards_plan() {
        let mut game = FakeGame::new(Board::EMPTY, PieceKind::O);
        game.walls_closed = true;
        let mut agent = AiAgent::with_weights(WeightSet::default());
        // equal-scoring placements favour the left wall, away from the spawn column
        let AgentTick::Planned(mv) = agent.tick(&mut game) else {
            panic!("first tick should plan");
        };
        assert_eq!(mv.x, 0);
        assert_eq!(
            agent.tick(&mut game),
            AgentTick::Failed(Action::MoveLeft, ActionError::Collision)
        );
        assert!(agent.target().is_none());
        assert_eq!(agent.queued_actions().count(), 0);
        assert!(agent.tick(&mut game).is_planned());
    }
}
