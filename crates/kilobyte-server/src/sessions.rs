//! One game per page load, keyed by an id the page sends back with every key.

use std::fmt::{self, Display, Formatter};
use std::num::NonZeroUsize;
use std::str::FromStr;

use kilobyte_engine::Game;
use lru::LruCache;
use tracing::{debug, info};
use ulid::Ulid;

use crate::config::GameSettings;

/// Identifier handed to a page when it is served.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct SessionId(pub Ulid);

impl SessionId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(SessionId)
    }
}

/// Live games, least recently played evicted first once `capacity` is reached.
pub struct Sessions {
    games: LruCache<SessionId, Game>,
    settings: GameSettings,
}

impl Sessions {
    pub fn new(capacity: NonZeroUsize, settings: GameSettings) -> Self {
        Self {
            games: LruCache::new(capacity),
            settings,
        }
    }

    /// Start a game for a freshly served page. Returns its id and rendered board.
    pub fn start(&mut self) -> (SessionId, String) {
        let id = SessionId::new();
        let game = Game::from_seed(self.settings.seed, self.settings.merge_mode);
        let table = game.render();
        debug!("session" = %id, "initial board\n{}", game.board());
        if let Some((evicted, _)) = self.games.push(id, game) {
            debug!("evicted" = %evicted, "session limit reached");
        }
        info!("session" = %id, "live" = self.games.len(), "new game started");
        (id, table)
    }

    /// The game behind `id`, marked as most recently used.
    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Game> {
        self.games.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }
}
