//! The frame loop: the one consumer of every event queue
//!
//! Each frame drains, in order: the debounced resize, inbound transport
//! events, window input. It then sends the resulting intents, runs deferred
//! controller work, advances the particle field and draws.

use crate::audio::MacroquadTones;
use crate::config::{ClientConfig, RESIZE_DEBOUNCE};
use crate::game::Debouncer;
use crate::input::{Command, InputDispatcher, InputEvent, Intent};
use crate::leaderboard::ConfiguredPrompter;
use crate::network::{spawn_transport, ConnectionState, TransportEvent, TransportHandle};
use crate::particles::ParticleField;
use crate::rendering::{MacroquadSurface, Surface, Viewport};
use crate::storage::{FileStore, Persistence, ThemeStore};
use crate::sync::SyncController;
use crate::ui::{self, Palette, UiButton, UiLayout};
use log::{info, warn};
use macroquad::prelude::*;
use std::time::Instant;

pub fn window_conf(config: &ClientConfig) -> Conf {
    Conf {
        window_title: "Snake".to_string(),
        window_width: config.width as i32,
        window_height: config.height as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Applies a click on an on-screen control. Returns the intent to send, if any.
pub fn apply_button(
    button: UiButton,
    controller: &mut SyncController,
    theme: &mut ThemeStore,
) -> Option<Intent> {
    match button {
        UiButton::Restart => Some(controller.restart()),
        UiButton::Menu => Some(controller.menu()),
        UiButton::OpenLeaderboard => {
            controller.open_leaderboard();
            None
        }
        UiButton::CloseLeaderboard => {
            controller.click();
            controller.close_leaderboard();
            None
        }
        UiButton::ClearLeaderboard => {
            controller.clear_leaderboard();
            None
        }
        UiButton::ToggleTheme => {
            controller.click();
            theme.toggle();
            None
        }
        UiButton::Arrow(direction, _) => {
            controller.click();
            Some(Intent::ChangeDirection(direction))
        }
    }
}

/// Applies a keyboard or swipe command. Returns the intent to send, if any.
pub fn apply_command(
    command: Command,
    controller: &mut SyncController,
    theme: &mut ThemeStore,
) -> Option<Intent> {
    match command {
        Command::Send(intent) => Some(intent),
        Command::ToggleTheme => {
            theme.toggle();
            None
        }
        Command::CloseLeaderboard => {
            controller.close_leaderboard();
            None
        }
    }
}

fn emit(transport: Option<&TransportHandle>, intent: Intent) {
    match transport {
        Some(handle) => {
            if let Err(e) = handle.send(intent) {
                warn!("Dropping {:?}: {}", intent, e);
            }
        }
        None => warn!("Dropping {:?}: no transport", intent),
    }
}

pub async fn run(config: ClientConfig) {
    let persistence = Persistence::new(FileStore::open(config.store_path()));
    let mut theme = ThemeStore::load(persistence.clone());
    let tones = MacroquadTones::load().await;

    let mut screen = (screen_width(), screen_height());
    let mut controller = SyncController::new(
        persistence,
        Viewport::new(screen.0, screen.1),
        Box::new(tones),
        Box::new(ConfiguredPrompter::new(config.player_name.clone())),
    );

    let mut transport = match config.server_addr() {
        Some(addr) => match spawn_transport(addr, config.reconnect) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Transport unavailable: {}", e);
                None
            }
        },
        None => {
            warn!("Invalid server address: {}", config.server);
            None
        }
    };
    if transport.is_none() {
        controller.on_connection(ConnectionState::Disconnected);
    }

    let mut board = MacroquadSurface::new();
    let mut backdrop = MacroquadSurface::new();
    let mut particles = ParticleField::new();
    let mut dispatcher = InputDispatcher::new();
    let mut resize = Debouncer::new(RESIZE_DEBOUNCE);

    info!("Client running, theme {}", theme.current().as_str());

    loop {
        let now = Instant::now();

        let current = (screen_width(), screen_height());
        if current != screen {
            screen = current;
            resize.schedule(Viewport::new(current.0, current.1), now);
        }
        if let Some(viewport) = resize.poll(now) {
            controller.relayout(viewport, &mut board);
        }

        if let Some(handle) = transport.as_mut() {
            while let Some(event) = handle.try_next_event() {
                match event {
                    TransportEvent::Connection(state) => controller.on_connection(state),
                    TransportEvent::State(raw) => {
                        controller.on_snapshot(raw, now, &mut board);
                    }
                }
            }
        }
        board.end();

        let (board_w, board_h) = board.size();
        let layout = UiLayout::compute(
            screen.0,
            screen.1,
            board_w as f32,
            board_h as f32,
            controller.overlay(),
        );

        let mut intents = Vec::new();
        for event in dispatcher.poll_window() {
            let intent = match event {
                InputEvent::Key(key) => dispatcher
                    .key(key, controller.view().last_alive())
                    .and_then(|command| apply_command(command, &mut controller, &mut theme)),
                InputEvent::TouchStart { x, y } => {
                    dispatcher.touch_start(x, y);
                    None
                }
                InputEvent::TouchEnd { x, y } => dispatcher
                    .touch_end(x, y)
                    .and_then(|command| apply_command(command, &mut controller, &mut theme)),
                InputEvent::Click { x, y } => layout
                    .hit_test(x, y)
                    .and_then(|button| apply_button(button, &mut controller, &mut theme)),
            };
            intents.extend(intent);
        }
        for intent in intents {
            emit(transport.as_ref(), intent);
        }

        controller.tick(now);

        particles.sync_size(board_w, board_h);
        particles.step();
        if backdrop.size() != (board_w, board_h) {
            backdrop.resize(board_w, board_h);
        }
        particles.draw(&mut backdrop);
        backdrop.end();

        let palette = Palette::for_theme(theme.current());
        clear_background(palette.page);
        board.present(layout.board.x, layout.board.y);
        backdrop.present(layout.board.x, layout.board.y);
        ui::draw(&layout, &palette, &controller, now);

        next_frame().await;
    }
}
