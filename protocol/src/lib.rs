//! Wire types shared between the engine and whatever API layer wraps it:
//! board snapshots in the client-facing boolean shape, move requests, and the
//! persisted record shapes for finished games and per-user aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use varredor_core::{CellCount, Coord, Coord2, Difficulty, Game, GameMove, MoveAction};

/// One board cell as serialized to clients.
///
/// The engine keeps a single enum per cell; clients get the flat boolean
/// shape instead. Note that `is_mine` is reported truthfully for every cell,
/// revealed or not, which is the contract the original web client relies on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub is_revealed: bool,
    pub is_mine: bool,
    pub is_flagged: bool,
    pub adjacent_mines: u8,
}

impl CellView {
    pub fn from_game_at(game: &Game, coords: Coord2) -> Self {
        let cell = game.cell_at(coords);
        let is_mine = game.has_mine_at(coords);
        // adjacency is only meaningful for non-mine cells
        let adjacent_mines = if is_mine { 0 } else { game.adjacent_mines_at(coords) };

        Self {
            is_revealed: cell.is_revealed(),
            is_mine,
            is_flagged: cell.is_flagged(),
            adjacent_mines,
        }
    }
}

/// Full game snapshot returned after every move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameStateView {
    pub board: Vec<Vec<CellView>>,
    pub game_over: bool,
    pub won: bool,
    pub mines_remaining: isize,
}

impl GameStateView {
    pub fn from_game(game: &Game) -> Self {
        let (height, width) = game.size();
        let board = (0..height)
            .map(|x| {
                (0..width)
                    .map(|y| CellView::from_game_at(game, (x, y)))
                    .collect()
            })
            .collect();

        Self {
            board,
            game_over: game.is_finished(),
            won: game.is_won(),
            mines_remaining: game.mines_left(),
        }
    }
}

/// A move as it arrives off the wire, before coordinate narrowing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub x: u16,
    pub y: u16,
    pub action: MoveAction,
}

impl MoveRequest {
    /// `None` when the coordinates cannot address any board; the engine
    /// re-checks the actual bounds. Nothing mutates on a rejected request.
    pub fn to_move(self) -> Option<GameMove> {
        let x = Coord::try_from(self.x).ok()?;
        let y = Coord::try_from(self.y).ok()?;
        Some(GameMove {
            x,
            y,
            action: self.action,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewGameResponse {
    pub game_id: Uuid,
    pub state: GameStateView,
}

/// Completion signal extracted by the session layer once a game ends.
/// Duration and move count are tracked outside the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    pub user_name: String,
    pub difficulty: Difficulty,
    pub duration: u32,
    pub won: bool,
    pub moves: u32,
    pub board_width: Coord,
    pub board_height: Coord,
    pub mines_count: CellCount,
}

/// Immutable persisted record of one finished game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_name: String,
    pub difficulty: Difficulty,
    pub duration: u32,
    pub result: bool,
    pub moves: u32,
    pub board_width: Coord,
    pub board_height: Coord,
    pub mines_count: CellCount,
    pub played_at: DateTime<Utc>,
}

/// Per-difficulty slice of a user's aggregate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyStats {
    pub games: u32,
    pub wins: u32,
    pub best_time: Option<u32>,
}

/// Per-user aggregate, upserted on every recorded game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: Option<Uuid>,
    pub user_name: String,
    pub beginner: DifficultyStats,
    pub intermediate: DifficultyStats,
    pub expert: DifficultyStats,
    pub last_played_at: Option<DateTime<Utc>>,
}

impl UserStats {
    /// Zeroed aggregate for a user with no recorded games yet.
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_id: None,
            user_name: user_name.into(),
            beginner: DifficultyStats::default(),
            intermediate: DifficultyStats::default(),
            expert: DifficultyStats::default(),
            last_played_at: None,
        }
    }

    pub fn for_difficulty(&self, difficulty: Difficulty) -> &DifficultyStats {
        match difficulty {
            Difficulty::Beginner => &self.beginner,
            Difficulty::Intermediate => &self.intermediate,
            Difficulty::Expert => &self.expert,
        }
    }

    pub fn for_difficulty_mut(&mut self, difficulty: Difficulty) -> &mut DifficultyStats {
        match difficulty {
            Difficulty::Beginner => &mut self.beginner,
            Difficulty::Intermediate => &mut self.intermediate,
            Difficulty::Expert => &mut self.expert,
        }
    }
}

/// One row of the per-difficulty top-10.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_name: String,
    pub best_time: u32,
    pub played_at: DateTime<Utc>,
}
