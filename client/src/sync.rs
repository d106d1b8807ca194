//! State sync controller: the single consumer of inbound snapshots
//!
//! Every snapshot is normalized, rendered, and then drives the overlay
//! machine. Side effects of a death (final score, game-over tone, one
//! leaderboard save) are guarded by the session's [`DeathEpisode`] so that
//! repeated `alive: false` snapshots never fire them twice. The name prompt
//! for the save is deferred and runs from [`SyncController::tick`], off the
//! snapshot path.
//!
//! [`DeathEpisode`]: crate::game::DeathEpisode

use crate::audio::{Tone, ToneSink};
use crate::config::{DEFAULT_PLAYER_NAME, NAME_PROMPT_DELAY};
use crate::game::{ScorePopup, SessionView};
use crate::input::Intent;
use crate::leaderboard::{LeaderboardStore, Prompter};
use crate::network::ConnectionState;
use crate::overlay::Overlay;
use crate::rendering::{Hud, Renderer, Surface, Viewport};
use crate::storage::{HighScore, Persistence};
use log::{debug, info};
use shared::{RawSnapshot, Snapshot};
use std::time::Instant;

const CLEAR_QUESTION: &str = "Clear local leaderboard?";

/// Observable effects of one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotOutcome {
    pub ate: bool,
    pub died: bool,
    pub resized: bool,
    pub new_high_score: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSave {
    score: u32,
    due: Instant,
}

pub struct SyncController {
    view: SessionView,
    renderer: Renderer,
    hud: Hud,
    high_score: HighScore,
    leaderboard: LeaderboardStore,
    tones: Box<dyn ToneSink>,
    prompter: Box<dyn Prompter>,
    pending_saves: Vec<PendingSave>,
    popup: Option<ScorePopup>,
    connection: ConnectionState,
}

impl SyncController {
    pub fn new(
        persistence: Persistence,
        viewport: Viewport,
        tones: Box<dyn ToneSink>,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        let high_score = HighScore::load(persistence.clone());
        let hud = Hud {
            score: "0".to_string(),
            high_score: high_score.best().to_string(),
            state: "waiting".to_string(),
            grid: "-".to_string(),
            final_score: "0".to_string(),
        };

        Self {
            view: SessionView::new(viewport),
            renderer: Renderer::new(),
            hud,
            high_score,
            leaderboard: LeaderboardStore::load(persistence),
            tones,
            prompter,
            pending_saves: Vec::new(),
            popup: None,
            connection: ConnectionState::Connecting,
        }
    }

    /// Processes one inbound snapshot, in delivery order.
    pub fn on_snapshot(
        &mut self,
        raw: RawSnapshot,
        now: Instant,
        surface: &mut dyn Surface,
    ) -> SnapshotOutcome {
        let snapshot = Snapshot::from(raw);
        let frame = self
            .renderer
            .render(&mut self.view, &snapshot, surface, &mut self.hud);

        let mut outcome = SnapshotOutcome {
            ate: frame.ate,
            resized: frame.resized,
            ..Default::default()
        };

        if frame.ate {
            self.popup = Some(ScorePopup::new("+1", now));
            self.tones.play(Tone::Eat);
        }

        outcome.new_high_score = self.high_score.observe(snapshot.score);
        self.hud.high_score = self.high_score.best().to_string();

        if snapshot.alive {
            self.view.overlay.on_alive();
            self.view.episode.begin_life();
        } else if !self.view.episode.death_shown() {
            outcome.died = true;
            self.on_death(snapshot.score, now);
        }

        self.view.last_snapshot = Some(snapshot);
        outcome
    }

    fn on_death(&mut self, score: u32, now: Instant) {
        info!("Snake died with score {}", score);
        self.view.overlay.on_death();
        self.hud.final_score = score.to_string();
        self.tones.play(Tone::GameOver);

        if score > 0 && self.view.episode.claim_save() {
            debug!("Leaderboard save for {} scheduled", score);
            self.pending_saves.push(PendingSave {
                score,
                due: now + NAME_PROMPT_DELAY,
            });
        }
        self.view.episode.mark_death_shown();
    }

    /// Runs deferred work that has come due: leaderboard saves and popup expiry.
    pub fn tick(&mut self, now: Instant) {
        let (due, waiting): (Vec<PendingSave>, Vec<PendingSave>) = self
            .pending_saves
            .drain(..)
            .partition(|save| save.due <= now);
        self.pending_saves = waiting;

        for save in due {
            let name = self.prompter.ask_name(DEFAULT_PLAYER_NAME);
            self.leaderboard.record(save.score, name.as_deref());
        }

        if matches!(&self.popup, Some(popup) if !popup.is_visible(now)) {
            self.popup = None;
        }
    }

    /// Applies a debounced viewport change and redraws the last snapshot if needed.
    pub fn relayout(&mut self, viewport: Viewport, surface: &mut dyn Surface) -> bool {
        self.view.viewport = viewport;
        self.renderer.relayout(&mut self.view, surface)
    }

    pub fn on_connection(&mut self, state: ConnectionState) {
        if self.connection != state {
            info!("Connection {}", state.label());
            self.connection = state;
        }
    }

    /// Hides the game-over panel right away and asks the server for a new game.
    pub fn restart(&mut self) -> Intent {
        self.click();
        self.view.overlay.restart();
        Intent::Restart
    }

    /// Shows the menu and asks the server for a new game.
    pub fn menu(&mut self) -> Intent {
        self.click();
        self.view.overlay.show_menu();
        Intent::Restart
    }

    pub fn open_leaderboard(&mut self) {
        self.click();
        self.view.overlay.open_leaderboard();
    }

    pub fn close_leaderboard(&mut self) -> bool {
        let last_alive = self.view.last_alive();
        self.view.overlay.close_leaderboard(last_alive)
    }

    /// Empties the leaderboard after the player confirms.
    pub fn clear_leaderboard(&mut self) -> bool {
        self.click();
        if !self.prompter.confirm(CLEAR_QUESTION) {
            return false;
        }
        self.leaderboard.clear();
        true
    }

    pub fn click(&mut self) {
        self.tones.play(Tone::Click);
    }

    pub fn view(&self) -> &SessionView {
        &self.view
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn overlay(&self) -> Overlay {
        self.view.overlay.current()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.best()
    }

    pub fn leaderboard(&self) -> &LeaderboardStore {
        &self.leaderboard
    }

    pub fn leaderboard_lines(&self) -> Vec<String> {
        self.leaderboard.display_lines()
    }

    pub fn pending_saves(&self) -> usize {
        self.pending_saves.len()
    }

    pub fn popup_text(&self, now: Instant) -> Option<&str> {
        self.popup
            .as_ref()
            .filter(|popup| popup.is_visible(now))
            .map(|popup| popup.text.as_str())
    }
}
