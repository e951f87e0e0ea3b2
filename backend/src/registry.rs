use std::sync::{Arc, Mutex};

use chrono::Utc;
use hashbrown::HashMap;
use uuid::Uuid;
use varredor_core::GameConfig;
use varredor_protocol::{GameReport, GameStateView, MoveRequest, NewGameResponse};

use crate::{lock_unpoisoned, RegistryError, Session};

/// Uuid-keyed registry of live sessions.
///
/// The outer lock only guards the map itself; every session sits behind its
/// own mutex, so moves within one session are serialized while independent
/// sessions proceed in parallel.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, config: GameConfig) -> NewGameResponse {
        let game_id = Uuid::new_v4();
        let session = Session::new(config, rand::random());
        let state = session.state_view();

        lock_unpoisoned(&self.sessions).insert(game_id, Arc::new(Mutex::new(session)));
        log::info!("created {} session {}", config.difficulty, game_id);

        NewGameResponse { game_id, state }
    }

    /// Applies a move and returns the resulting state. Moves the engine
    /// rejects still return the unchanged state; only an unknown session id
    /// is an error.
    pub fn apply(
        &self,
        game_id: Uuid,
        request: MoveRequest,
    ) -> Result<GameStateView, RegistryError> {
        let session = self.session(game_id)?;
        let mut session = lock_unpoisoned(&session);

        match request.to_move() {
            Some(mv) => {
                session.apply(mv, Utc::now());
            }
            None => log::debug!("move {:?} cannot address any board, ignored", request),
        }

        Ok(session.state_view())
    }

    pub fn state(&self, game_id: Uuid) -> Result<GameStateView, RegistryError> {
        let session = self.session(game_id)?;
        let session = lock_unpoisoned(&session);
        Ok(session.state_view())
    }

    /// Replaces the session's game with a fresh one over the same config,
    /// keeping the id.
    pub fn restart(&self, game_id: Uuid) -> Result<GameStateView, RegistryError> {
        let session = self.session(game_id)?;
        let mut session = lock_unpoisoned(&session);

        *session = Session::new(session.game().config(), rand::random());
        log::info!("restarted session {}", game_id);

        Ok(session.state_view())
    }

    /// Completion signal: `Some` once the game has ended, ready to be
    /// forwarded to the stats store.
    pub fn report(
        &self,
        game_id: Uuid,
        user_name: &str,
    ) -> Result<Option<GameReport>, RegistryError> {
        let session = self.session(game_id)?;
        let session = lock_unpoisoned(&session);
        Ok(session.report(user_name, Utc::now()))
    }

    pub fn remove(&self, game_id: Uuid) -> Result<(), RegistryError> {
        lock_unpoisoned(&self.sessions)
            .remove(&game_id)
            .map(drop)
            .ok_or(RegistryError::SessionNotFound)
    }

    fn session(&self, game_id: Uuid) -> Result<Arc<Mutex<Session>>, RegistryError> {
        lock_unpoisoned(&self.sessions)
            .get(&game_id)
            .cloned()
            .ok_or(RegistryError::SessionNotFound)
    }
}
