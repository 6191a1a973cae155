//! Key handling: turns key names into moves and runs one full turn per press.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::engine::{Board, Direction, MergeMode};
use crate::render::render_board;

/// Key names that trigger a move. The page suppresses the browser default
/// (scrolling) for exactly these.
pub const KEY_NAMES: [&str; 8] = [
    "Left",
    "ArrowLeft",
    "Right",
    "ArrowRight",
    "Up",
    "ArrowUp",
    "Down",
    "ArrowDown",
];

impl Direction {
    /// Map a `KeyboardEvent.key` name to a direction. Legacy names ("Left")
    /// and current ones ("ArrowLeft") are equivalent.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Left" | "ArrowLeft" => Some(Direction::Left),
            "Right" | "ArrowRight" => Some(Direction::Right),
            "Up" | "ArrowUp" => Some(Direction::Up),
            "Down" | "ArrowDown" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Outcome of one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub direction: Direction,
    /// Cell that received the new tile; `None` if the board was full.
    pub spawned: Option<(usize, usize)>,
    /// Board rendered after the turn.
    pub table: String,
}

/// A single play session: the board and the randomness feeding it.
#[derive(Debug)]
pub struct Game<R = StdRng> {
    board: Board,
    rng: R,
    mode: MergeMode,
}

impl Game<StdRng> {
    /// Fresh game; reproducible when `seed` is given.
    pub fn from_seed(seed: Option<u64>, mode: MergeMode) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Game::new(rng, mode)
    }
}

impl<R: Rng> Game<R> {
    /// Start a game on an empty board seeded with two tiles.
    pub fn new(rng: R, mode: MergeMode) -> Self {
        let mut game = Game::with_board(Board::EMPTY, rng, mode);
        game.board.insert2(&mut game.rng);
        game.board.insert2(&mut game.rng);
        game
    }

    /// Resume from an existing board; no tiles are added.
    pub fn with_board(board: Board, rng: R, mode: MergeMode) -> Self {
        Self { board, rng, mode }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    pub fn render(&self) -> String {
        render_board(&self.board)
    }

    /// Run a turn for `key`. Keys outside `KEY_NAMES` leave the game untouched
    /// and return `None`.
    pub fn handle_key(&mut self, key: &str) -> Option<Turn> {
        let Some(direction) = Direction::from_key(key) else {
            debug!(key, "ignoring key");
            return None;
        };
        Some(self.apply(direction))
    }

    /// Slide, merge along the move's axis, slide again, spawn, render.
    pub fn apply(&mut self, direction: Direction) -> Turn {
        self.board.shift(direction);
        self.board.combine(direction.axis(), self.mode);
        self.board.shift(direction);
        let spawned = self.board.insert2(&mut self.rng);
        if spawned.is_none() {
            warn!(?direction, "board is full, no tile spawned");
        }
        debug!(?direction, ?spawned, empty = self.board.count_empty(), "turn applied");
        Turn {
            direction,
            spawned,
            table: self.render(),
        }
    }
}
