use std::sync::Mutex;

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use uuid::Uuid;
use varredor_core::Difficulty;
use varredor_protocol::{GameRecord, GameReport, LeaderboardEntry, UserStats};

use crate::lock_unpoisoned;

const LEADERBOARD_SIZE: usize = 10;

/// In-memory results store: an append-only list of finished games plus the
/// per-user-per-difficulty aggregates derived from it.
#[derive(Debug, Default)]
pub struct StatsStore {
    inner: Mutex<StatsInner>,
}

#[derive(Debug, Default)]
struct StatsInner {
    records: Vec<GameRecord>,
    users: HashMap<String, UserStats>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the immutable game record and upserts the user aggregate:
    /// games played always counts up, wins and best time only on a win.
    pub fn record(&self, report: &GameReport, now: DateTime<Utc>) -> GameRecord {
        let mut inner = lock_unpoisoned(&self.inner);

        let user = inner
            .users
            .entry(report.user_name.clone())
            .or_insert_with(|| UserStats::new(report.user_name.clone()));
        let user_id = *user.user_id.get_or_insert_with(Uuid::new_v4);

        let stats = user.for_difficulty_mut(report.difficulty);
        stats.games += 1;
        if report.won {
            stats.wins += 1;
            stats.best_time =
                Some(stats.best_time.map_or(report.duration, |best| best.min(report.duration)));
        }
        user.last_played_at = Some(now);

        let record = GameRecord {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            user_name: report.user_name.clone(),
            difficulty: report.difficulty,
            duration: report.duration,
            result: report.won,
            moves: report.moves,
            board_width: report.board_width,
            board_height: report.board_height,
            mines_count: report.mines_count,
            played_at: now,
        };
        inner.records.push(record.clone());
        log::info!(
            "recorded {} game for {}, won: {}",
            report.difficulty,
            report.user_name,
            report.won
        );

        record
    }

    /// Top-10 winning games for a difficulty, fastest first. The stable sort
    /// keeps insertion order between equal durations.
    pub fn leaderboard(&self, difficulty: Difficulty) -> Vec<LeaderboardEntry> {
        let inner = lock_unpoisoned(&self.inner);

        let mut wins: Vec<&GameRecord> = inner
            .records
            .iter()
            .filter(|record| record.difficulty == difficulty && record.result)
            .collect();
        wins.sort_by_key(|record| record.duration);

        wins.iter()
            .take(LEADERBOARD_SIZE)
            .enumerate()
            .map(|(index, record)| LeaderboardEntry {
                rank: index as u32 + 1,
                user_name: record.user_name.clone(),
                best_time: record.duration,
                played_at: record.played_at,
            })
            .collect()
    }

    /// Aggregate stats for a user, `None` when no game of theirs was ever
    /// recorded. Callers wanting the zeroed-aggregate response shape can
    /// fall back to [`UserStats::new`].
    pub fn user_stats(&self, user_name: &str) -> Option<UserStats> {
        let inner = lock_unpoisoned(&self.inner);
        inner.users.get(user_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(0).unwrap()
    }

    fn report(user_name: &str, difficulty: Difficulty, duration: u32, won: bool) -> GameReport {
        let config = difficulty.preset();
        GameReport {
            user_name: user_name.to_owned(),
            difficulty,
            duration,
            won,
            moves: 17,
            board_width: config.width(),
            board_height: config.height(),
            mines_count: config.mines,
        }
    }

    #[test]
    fn wins_update_the_aggregate_and_best_time() {
        let store = StatsStore::new();

        store.record(&report("ana", Difficulty::Beginner, 42, true), t0());
        store.record(&report("ana", Difficulty::Beginner, 30, true), t0());
        store.record(&report("ana", Difficulty::Beginner, 5, false), t0());

        let stats = store.user_stats("ana").unwrap();
        let beginner = stats.for_difficulty(Difficulty::Beginner);
        assert_eq!(beginner.games, 3);
        assert_eq!(beginner.wins, 2);
        // the faster win sticks, the fast loss does not
        assert_eq!(beginner.best_time, Some(30));
        assert!(stats.user_id.is_some());
        assert_eq!(stats.last_played_at, Some(t0()));
    }

    #[test]
    fn a_slower_win_never_regresses_best_time() {
        let store = StatsStore::new();

        store.record(&report("ana", Difficulty::Expert, 100, true), t0());
        store.record(&report("ana", Difficulty::Expert, 200, true), t0());

        let stats = store.user_stats("ana").unwrap();
        assert_eq!(stats.for_difficulty(Difficulty::Expert).best_time, Some(100));
    }

    #[test]
    fn difficulties_aggregate_independently() {
        let store = StatsStore::new();

        store.record(&report("ana", Difficulty::Beginner, 20, true), t0());
        store.record(&report("ana", Difficulty::Expert, 300, true), t0());

        let stats = store.user_stats("ana").unwrap();
        assert_eq!(stats.for_difficulty(Difficulty::Beginner).best_time, Some(20));
        assert_eq!(stats.for_difficulty(Difficulty::Expert).best_time, Some(300));
        assert_eq!(stats.for_difficulty(Difficulty::Intermediate).games, 0);
    }

    #[test]
    fn user_ids_are_stable_across_records() {
        let store = StatsStore::new();

        let first = store.record(&report("ana", Difficulty::Beginner, 10, true), t0());
        let second = store.record(&report("ana", Difficulty::Beginner, 12, false), t0());

        assert_eq!(first.user_id, second.user_id);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn unknown_users_are_not_found() {
        let store = StatsStore::new();
        assert_eq!(store.user_stats("nobody"), None);

        store.record(&report("ana", Difficulty::Beginner, 10, true), t0());
        assert_eq!(store.user_stats("nobody"), None);
        assert!(store.user_stats("ana").is_some());
    }

    #[test]
    fn leaderboard_ranks_wins_by_ascending_duration() {
        let store = StatsStore::new();

        store.record(&report("slow", Difficulty::Beginner, 90, true), t0());
        store.record(&report("fast", Difficulty::Beginner, 15, true), t0());
        store.record(&report("loser", Difficulty::Beginner, 1, false), t0());
        store.record(&report("mid", Difficulty::Beginner, 40, true), t0());

        let board = store.leaderboard(Difficulty::Beginner);
        let names: Vec<&str> = board.iter().map(|entry| entry.user_name.as_str()).collect();
        assert_eq!(names, ["fast", "mid", "slow"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[2].rank, 3);
        assert_eq!(board[0].best_time, 15);
    }

    #[test]
    fn leaderboard_breaks_ties_by_insertion_order() {
        let store = StatsStore::new();

        store.record(&report("first", Difficulty::Beginner, 25, true), t0());
        store.record(&report("second", Difficulty::Beginner, 25, true), t0());

        let board = store.leaderboard(Difficulty::Beginner);
        assert_eq!(board[0].user_name, "first");
        assert_eq!(board[1].user_name, "second");
    }

    #[test]
    fn leaderboard_caps_at_ten_entries() {
        let store = StatsStore::new();

        for duration in (1..=12).rev() {
            store.record(&report("ana", Difficulty::Beginner, duration, true), t0());
        }

        let board = store.leaderboard(Difficulty::Beginner);
        assert_eq!(board.len(), 10);
        assert_eq!(board[0].best_time, 1);
        assert_eq!(board[9].best_time, 10);
    }

    #[test]
    fn leaderboard_is_per_difficulty() {
        let store = StatsStore::new();

        store.record(&report("ana", Difficulty::Beginner, 10, true), t0());
        store.record(&report("ana", Difficulty::Expert, 10, true), t0());

        assert_eq!(store.leaderboard(Difficulty::Beginner).len(), 1);
        assert_eq!(store.leaderboard(Difficulty::Expert).len(), 1);
        assert_eq!(store.leaderboard(Difficulty::Intermediate).len(), 0);
    }
}
