use chrono::{DateTime, Utc};
use varredor_core::{Game, GameConfig, GameError, GameMove, MoveOutcome};
use varredor_protocol::{GameReport, GameStateView};

/// Adapts engine results to a plain "did anything change": engine-side
/// rejections (out of bounds, game already over) are absorbed as no-ops here
/// rather than surfaced to the caller.
pub trait HasUpdate {
    fn has_update(self) -> bool;
}

impl HasUpdate for Result<MoveOutcome, GameError> {
    fn has_update(self) -> bool {
        self.map_or(false, MoveOutcome::has_update)
    }
}

/// One independent game plus the bookkeeping the engine leaves to its
/// callers: wall-clock timestamps and the move tally. Timestamps are
/// injected so the session itself never reads a clock.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    game: Game,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    move_count: u32,
}

impl Session {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::from_game(Game::new(config, seed))
    }

    /// Wraps an existing game, typically one built over a fixed layout.
    pub fn from_game(game: Game) -> Self {
        Self {
            game,
            started_at: None,
            ended_at: None,
            move_count: 0,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn state_view(&self) -> GameStateView {
        GameStateView::from_game(&self.game)
    }

    /// Applies one move; returns whether the state changed. Rejected and
    /// ineffective moves leave everything untouched, including the tally.
    pub fn apply(&mut self, mv: GameMove, now: DateTime<Utc>) -> bool {
        let updated = self.game.apply(mv).has_update();
        if updated {
            self.on_effective_move(now);
        }
        updated
    }

    fn on_effective_move(&mut self, now: DateTime<Utc>) {
        self.move_count = self.move_count.saturating_add(1);

        if self.started_at.is_none() {
            self.started_at = Some(now);
        }

        if self.game.is_finished() && self.ended_at.is_none() {
            self.ended_at = Some(now);
            log::info!(
                "game finished after {} moves, won: {}",
                self.move_count,
                self.game.is_won()
            );
        }
    }

    /// Seconds since the first effective move, frozen once the game ends.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or(now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    /// Completion record for the stats store; `None` while the game is live.
    pub fn report(&self, user_name: &str, now: DateTime<Utc>) -> Option<GameReport> {
        if !self.game.is_finished() {
            return None;
        }

        let config = self.game.config();
        Some(GameReport {
            user_name: user_name.to_owned(),
            difficulty: config.difficulty,
            duration: self.elapsed_secs(now),
            won: self.game.is_won(),
            moves: self.move_count,
            board_width: config.width(),
            board_height: config.height(),
            mines_count: self.game.total_mines(),
        })
    }
}
