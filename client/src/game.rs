//! Per-session view state shared by the sync controller and the renderer

use crate::config::{DEFAULT_CELL, SCORE_POPUP_TIME};
use crate::overlay::OverlayMachine;
use crate::rendering::Viewport;
use log::debug;
use shared::Snapshot;
use std::time::{Duration, Instant};

/// Everything the client derives from the snapshot stream.
///
/// Created when the client starts, mutated only by the sync controller (and
/// the renderer it drives), and reset piecewise at alive/dead boundaries.
#[derive(Debug)]
pub struct SessionView {
    pub last_snapshot: Option<Snapshot>,
    pub cell_size: u32,
    /// Snake length at the previous render, for eat detection. Never reset.
    pub last_snake_len: Option<usize>,
    pub rendered_grid: Option<(u32, u32)>,
    /// Viewport of the last completed layout pass
    pub viewport: Viewport,
    pub overlay: OverlayMachine,
    pub episode: DeathEpisode,
}

impl SessionView {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            last_snapshot: None,
            cell_size: DEFAULT_CELL,
            last_snake_len: None,
            rendered_grid: None,
            viewport,
            overlay: OverlayMachine::new(),
            episode: DeathEpisode::default(),
        }
    }

    /// Whether the last snapshot was alive; `None` before the first one.
    pub fn last_alive(&self) -> Option<bool> {
        self.last_snapshot.as_ref().map(|s| s.alive)
    }
}

/// At-most-once guards for the side effects of a single death.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeathEpisode {
    saved_this_death: bool,
    death_shown: bool,
}

impl DeathEpisode {
    /// Starts a new life. Returns true only when it closed a death episode.
    pub fn begin_life(&mut self) -> bool {
        let was_dead = self.saved_this_death || self.death_shown;
        self.saved_this_death = false;
        self.death_shown = false;
        if was_dead {
            debug!("Death episode closed");
        }
        was_dead
    }

    pub fn death_shown(&self) -> bool {
        self.death_shown
    }

    pub fn mark_death_shown(&mut self) {
        self.death_shown = true;
    }

    /// Claims the one leaderboard save of this episode.
    pub fn claim_save(&mut self) -> bool {
        if self.saved_this_death {
            return false;
        }
        self.saved_this_death = true;
        true
    }
}

/// Transient "+1" shown after the snake grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePopup {
    pub text: String,
    shown_at: Instant,
}

impl ScorePopup {
    pub fn new(text: impl Into<String>, now: Instant) -> Self {
        Self {
            text: text.into(),
            shown_at: now,
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < SCORE_POPUP_TIME
    }
}

/// Coalesces bursts of values into the last one, delivered after a quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((due, _)) if now >= *due => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }
}
