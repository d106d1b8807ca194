//! Local top-N leaderboard

use crate::config::{DEFAULT_PLAYER_NAME, MAX_LEADERBOARD, MAX_NAME_LEN};
use crate::storage::{Persistence, LEADERBOARD_KEY};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const EMPTY_PLACEHOLDER: &str = "No scores yet — be the first!";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub ts: u64,
}

pub struct LeaderboardStore {
    persistence: Persistence,
    entries: Vec<LeaderboardEntry>,
}

impl LeaderboardStore {
    pub fn load(persistence: Persistence) -> Self {
        let mut entries: Vec<LeaderboardEntry> = persistence
            .read_json(LEADERBOARD_KEY)
            .unwrap_or_default();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_LEADERBOARD);

        Self {
            persistence,
            entries,
        }
    }

    /// Adds a score under `name` and persists the re-ranked board.
    ///
    /// Zero scores are ignored. An empty name falls back to the default
    /// player name; longer names are cut to the display limit.
    pub fn record(&mut self, score: u32, name: Option<&str>) -> bool {
        if score == 0 {
            return false;
        }

        let name = sanitize_name(name);
        info!("Recording leaderboard score {} for {}", score, name);

        self.entries.push(LeaderboardEntry {
            name,
            score,
            ts: get_timestamp(),
        });
        // Stable: equal scores keep the earlier entry ahead
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_LEADERBOARD);

        self.persist();
        true
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranked lines for display, or the placeholder when nothing is recorded.
    pub fn display_lines(&self) -> Vec<String> {
        if self.entries.is_empty() {
            return vec![EMPTY_PLACEHOLDER.to_string()];
        }

        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. {} — {}", i + 1, entry.name, entry.score))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        self.persistence.write_json(LEADERBOARD_KEY, &self.entries);
    }
}

/// Interactive questions asked on behalf of the leaderboard.
pub trait Prompter {
    /// Asks for a display name; `None` means the player declined.
    fn ask_name(&mut self, default: &str) -> Option<String>;
    fn confirm(&mut self, question: &str) -> bool;
}

/// Answers every prompt from configuration, without blocking.
#[derive(Debug, Clone)]
pub struct ConfiguredPrompter {
    name: String,
}

impl ConfiguredPrompter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Prompter for ConfiguredPrompter {
    fn ask_name(&mut self, default: &str) -> Option<String> {
        if self.name.trim().is_empty() {
            Some(default.to_string())
        } else {
            Some(self.name.clone())
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        info!("{} (confirmed by configuration)", question);
        true
    }
}

fn sanitize_name(name: Option<&str>) -> String {
    let trimmed = name.map(str::trim).unwrap_or_default();
    let name = if trimmed.is_empty() {
        DEFAULT_PLAYER_NAME
    } else {
        trimmed
    };
    name.chars().take(MAX_NAME_LEN).collect()
}

fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn scores(store: &LeaderboardStore) -> Vec<u32> {
        store.entries().iter().map(|e| e.score).collect()
    }

    #[test]
    fn test_ranking_descending() {
        let persistence = Persistence::in_memory();
        let mut store = LeaderboardStore::load(persistence.clone());

        for score in [10, 40, 25] {
            assert!(store.record(score, Some("ann")));
        }

        assert_eq!(scores(&store), vec![40, 25, 10]);

        let reloaded = LeaderboardStore::load(persistence);
        assert_eq!(scores(&reloaded), vec![40, 25, 10]);
    }

    #[test]
    fn test_full_board_drops_lowest() {
        let mut store = LeaderboardStore::load(Persistence::in_memory());
        for score in 1..=10 {
            store.record(score * 10, None);
        }
        assert_eq!(store.entries().len(), MAX_LEADERBOARD);

        store.record(55, None);

        assert_eq!(store.entries().len(), MAX_LEADERBOARD);
        assert!(!scores(&store).contains(&10));
        assert!(scores(&store).contains(&55));
        assert_eq!(scores(&store)[0], 100);
    }

    #[test]
    fn test_zero_score_is_ignored() {
        let mut store = LeaderboardStore::load(Persistence::in_memory());
        assert!(!store.record(0, Some("zero")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_name_defaults_and_truncation() {
        let mut store = LeaderboardStore::load(Persistence::in_memory());
        store.record(3, None);
        store.record(2, Some("   "));
        store.record(1, Some("abcdefghijklmnopq"));

        let names: Vec<&str> = store.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["You", "You", "abcdefghijkl"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut store = LeaderboardStore::load(Persistence::in_memory());
        store.record(7, Some("first"));
        store.record(7, Some("second"));

        assert_eq!(store.entries()[0].name, "first");
        assert_eq!(store.entries()[1].name, "second");
    }

    #[test]
    fn test_display_lines() {
        let mut store = LeaderboardStore::load(Persistence::in_memory());
        assert_eq!(store.display_lines(), vec![EMPTY_PLACEHOLDER.to_string()]);

        store.record(12, Some("kim"));
        store.record(30, Some("lee"));
        assert_eq!(
            store.display_lines(),
            vec!["1. lee — 30".to_string(), "2. kim — 12".to_string()]
        );
    }

    #[test]
    fn test_clear_persists_empty_board() {
        let persistence = Persistence::in_memory();
        let mut store = LeaderboardStore::load(persistence.clone());
        store.record(5, None);
        store.clear();

        assert!(store.is_empty());
        assert!(LeaderboardStore::load(persistence).is_empty());
    }

    #[test]
    fn test_record_survives_storage_failure() {
        let mut store = LeaderboardStore::load(Persistence::new(MemoryStore::unavailable()));
        assert!(store.record(8, Some("offline")));
        assert_eq!(scores(&store), vec![8]);
    }

    #[test]
    fn test_malformed_stored_board_loads_empty() {
        let persistence = Persistence::in_memory();
        persistence.write(LEADERBOARD_KEY, "[{\"oops\":1}]".to_string());
        assert!(LeaderboardStore::load(persistence).is_empty());
    }

    #[test]
    fn test_unordered_stored_board_is_ranked_on_load() {
        let persistence = Persistence::in_memory();
        let stored: Vec<LeaderboardEntry> = (1..=12u32)
            .map(|score| LeaderboardEntry {
                name: format!("p{}", score),
                score,
                ts: score as u64,
            })
            .collect();
        persistence.write_json(LEADERBOARD_KEY, &stored);

        let store = LeaderboardStore::load(persistence);
        assert_eq!(scores(&store), (3..=12).rev().collect::<Vec<u32>>());
        assert_eq!(store.entries()[0].name, "p12");
    }

    #[test]
    fn test_configured_prompter() {
        let mut prompter = ConfiguredPrompter::new("ada");
        assert_eq!(prompter.ask_name("You"), Some("ada".to_string()));
        assert!(prompter.confirm("Clear?"));

        let mut blank = ConfiguredPrompter::new("  ");
        assert_eq!(blank.ask_name("You"), Some("You".to_string()));
    }
}
