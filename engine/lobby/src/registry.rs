//! Lobby registry: game id to the live session generation.
//!
//! Every lookup-then-insert and lookup-then-delete happens under a single
//! acquisition of one mutex, so a game id never maps to two generations and a
//! finished generation can only remove itself, never its successor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use engine_config::LobbyConfig;
use tracing::{debug, info};

use crate::error::JoinError;
use crate::game_id::GameIdGenerator;
use crate::metrics;
use crate::session::{self, LobbySettings, Player, SessionHandle};

struct RegistryState {
    sessions: HashMap<String, SessionHandle>,
    ids: GameIdGenerator,
}

struct Inner {
    state: Mutex<RegistryState>,
    settings: LobbySettings,
    generations: AtomicU64,
}

/// Shared map of live lobbies. Clones refer to the same map.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Registry {
    pub fn new(settings: LobbySettings) -> Self {
        let ids = GameIdGenerator::new(settings.game_id_length);
        Self::with_id_generator(settings, ids)
    }

    pub fn from_config(config: &LobbyConfig) -> Self {
        Self::new(LobbySettings::from(config))
    }

    pub fn with_id_generator(settings: LobbySettings, ids: GameIdGenerator) -> Self {
        metrics::init_metrics();
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RegistryState {
                    sessions: HashMap::new(),
                    ids,
                }),
                settings,
                generations: AtomicU64::new(0),
            }),
        }
    }

    pub fn settings(&self) -> &LobbySettings {
        &self.inner.settings
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // A panicked holder cannot leave the map half-updated
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn a generation. Callers hold the lock.
    fn spawn_generation(&self, game_id: &str, required: usize) -> SessionHandle {
        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let required = self.inner.settings.clamp_players(required);
        metrics::LOBBIES_CREATED.inc();
        session::spawn(game_id.to_string(), generation, required, self.clone())
    }

    /// Open a lobby under a fresh, unused game id.
    pub fn create(&self, required: usize) -> SessionHandle {
        let mut state = self.lock();
        let game_id = loop {
            let candidate = state.ids.next_id();
            if !state.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        let handle = self.spawn_generation(&game_id, required);
        state.sessions.insert(game_id.clone(), handle.clone());
        info!(game_id = %game_id, required, "Lobby created");
        handle
    }

    pub fn get(&self, game_id: &str) -> Option<SessionHandle> {
        self.lock().sessions.get(game_id).cloned()
    }

    /// Current generation for `game_id`, opening a lobby if there is none.
    pub fn get_or_create(&self, game_id: &str, required: usize) -> SessionHandle {
        let mut state = self.lock();
        if let Some(handle) = state.sessions.get(game_id) {
            return handle.clone();
        }
        let handle = self.spawn_generation(game_id, required);
        state.sessions.insert(game_id.to_string(), handle.clone());
        info!(game_id, required, "Lobby created on join");
        handle
    }

    /// Replace `generation` with a fresh one under the same id. Returns `None`
    /// if the slot no longer holds `generation`.
    pub fn recycle(&self, game_id: &str, generation: u64, required: usize) -> Option<SessionHandle> {
        let mut state = self.lock();
        match state.sessions.get(game_id) {
            Some(current) if current.generation() == generation => {}
            _ => return None,
        }
        let handle = self.spawn_generation(game_id, required);
        state.sessions.insert(game_id.to_string(), handle.clone());
        debug!(game_id, from = generation, to = handle.generation(), "Lobby recycled");
        Some(handle)
    }

    /// Remove whatever generation `game_id` holds. Removing twice is a no-op.
    pub fn remove(&self, game_id: &str) -> bool {
        self.lock().sessions.remove(game_id).is_some()
    }

    /// Remove `game_id` only while it still holds `generation`.
    pub fn remove_generation(&self, game_id: &str, generation: u64) -> bool {
        let mut state = self.lock();
        match state.sessions.get(game_id) {
            Some(current) if current.generation() == generation => {
                state.sessions.remove(game_id);
                debug!(game_id, generation, "Lobby removed");
                true
            }
            _ => false,
        }
    }

    /// Seat `player` in an existing lobby. Unknown ids are answered with the
    /// rejection envelope and leave the registry untouched.
    pub async fn join(&self, game_id: &str, player: Player) -> Result<(), JoinError> {
        match self.get(game_id) {
            Some(handle) => handle.join(player).await,
            None => {
                let error = JoinError::NotFound(game_id.to_string());
                player.reject(&error);
                Err(error)
            }
        }
    }

    /// Seat `player`, opening the lobby first if it does not exist.
    pub async fn join_or_create(
        &self,
        game_id: &str,
        required: usize,
        player: Player,
    ) -> Result<(), JoinError> {
        self.get_or_create(game_id, required).join(player).await
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.lock().sessions.contains_key(game_id)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(LobbySettings::default())
    }
}
