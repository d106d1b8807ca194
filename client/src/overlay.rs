//! Menu / playing / game-over / leaderboard overlay state machine

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Menu,
    /// Bare board, no panel visible
    Playing,
    Dead,
    LeaderboardOpen,
}

/// Exactly one overlay is visible at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayMachine {
    current: Overlay,
}

impl OverlayMachine {
    pub fn new() -> Self {
        Self {
            current: Overlay::Menu,
        }
    }

    pub fn current(&self) -> Overlay {
        self.current
    }

    /// An alive snapshot arrived. The leaderboard stays open if it is.
    pub fn on_alive(&mut self) {
        if self.current != Overlay::LeaderboardOpen {
            self.set(Overlay::Playing);
        }
    }

    /// First dead snapshot of an episode. Closes the leaderboard if open.
    pub fn on_death(&mut self) {
        self.set(Overlay::Dead);
    }

    /// Hides the game-over panel without waiting for the server.
    pub fn restart(&mut self) {
        if self.current == Overlay::Dead {
            self.set(Overlay::Playing);
        }
    }

    pub fn show_menu(&mut self) {
        self.set(Overlay::Menu);
    }

    pub fn open_leaderboard(&mut self) {
        self.set(Overlay::LeaderboardOpen);
    }

    /// Closes the leaderboard, falling back to the menu unless the game is running.
    pub fn close_leaderboard(&mut self, last_alive: Option<bool>) -> bool {
        if self.current != Overlay::LeaderboardOpen {
            return false;
        }

        let next = if last_alive == Some(true) {
            Overlay::Playing
        } else {
            Overlay::Menu
        };
        self.set(next);
        true
    }

    fn set(&mut self, next: Overlay) {
        if self.current != next {
            debug!("Overlay {:?} -> {:?}", self.current, next);
            self.current = next;
        }
    }
}

impl Default for OverlayMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_menu() {
        assert_eq!(OverlayMachine::new().current(), Overlay::Menu);
    }

    #[test]
    fn test_alive_then_death_cycle() {
        let mut overlay = OverlayMachine::new();
        overlay.on_alive();
        assert_eq!(overlay.current(), Overlay::Playing);
        overlay.on_death();
        assert_eq!(overlay.current(), Overlay::Dead);
        overlay.on_alive();
        assert_eq!(overlay.current(), Overlay::Playing);
    }

    #[test]
    fn test_restart_hides_game_over_only() {
        let mut overlay = OverlayMachine::new();
        overlay.restart();
        assert_eq!(overlay.current(), Overlay::Menu);

        overlay.on_death();
        overlay.restart();
        assert_eq!(overlay.current(), Overlay::Playing);
    }

    #[test]
    fn test_menu_from_dead() {
        let mut overlay = OverlayMachine::new();
        overlay.on_death();
        overlay.show_menu();
        assert_eq!(overlay.current(), Overlay::Menu);
    }

    #[test]
    fn test_leaderboard_over_dead_closes_to_menu() {
        let mut overlay = OverlayMachine::new();
        overlay.on_death();
        overlay.open_leaderboard();
        assert_eq!(overlay.current(), Overlay::LeaderboardOpen);

        assert!(overlay.close_leaderboard(Some(false)));
        assert_eq!(overlay.current(), Overlay::Menu);
    }

    #[test]
    fn test_leaderboard_closed_while_alive_shows_nothing() {
        let mut overlay = OverlayMachine::new();
        overlay.open_leaderboard();
        overlay.on_alive();
        assert_eq!(overlay.current(), Overlay::LeaderboardOpen);

        assert!(overlay.close_leaderboard(Some(true)));
        assert_eq!(overlay.current(), Overlay::Playing);
    }

    #[test]
    fn test_close_without_snapshot_shows_menu() {
        let mut overlay = OverlayMachine::new();
        overlay.open_leaderboard();
        assert!(overlay.close_leaderboard(None));
        assert_eq!(overlay.current(), Overlay::Menu);
    }

    #[test]
    fn test_close_when_not_open_is_noop() {
        let mut overlay = OverlayMachine::new();
        overlay.on_alive();
        assert!(!overlay.close_leaderboard(Some(false)));
        assert_eq!(overlay.current(), Overlay::Playing);
    }

    #[test]
    fn test_death_closes_leaderboard() {
        let mut overlay = OverlayMachine::new();
        overlay.on_alive();
        overlay.open_leaderboard();
        overlay.on_death();
        assert_eq!(overlay.current(), Overlay::Dead);
    }

    #[test]
    fn test_opening_twice_then_close_once() {
        let mut overlay = OverlayMachine::new();
        overlay.on_death();
        overlay.open_leaderboard();
        overlay.open_leaderboard();
        assert!(overlay.close_leaderboard(Some(false)));
        assert!(!overlay.close_leaderboard(Some(false)));
        assert_eq!(overlay.current(), Overlay::Menu);
    }
}
