//! HUD, overlay panels and on-screen controls drawn around the board
//!
//! Layout is computed from plain numbers so hit testing works without a
//! window; drawing goes straight to macroquad's default camera.

use crate::network::ConnectionState;
use crate::overlay::Overlay;
use crate::storage::Theme;
use crate::sync::SyncController;
use macroquad::prelude::*;
use shared::Direction;
use std::time::Instant;

const SIDE_PANEL_WIDTH: f32 = 320.0;
const SIDE_PANEL_BREAKPOINT: f32 = 920.0;
const MARGIN: f32 = 18.0;
const TOP_BAR: f32 = 96.0;
const BUTTON_HEIGHT: f32 = 40.0;
const BUTTON_WIDTH: f32 = 132.0;
const DESKTOP_PAD_KEY: f32 = 56.0;
const MOBILE_PAD_KEY: f32 = 64.0;
const PAD_GAP: f32 = 8.0;
const OVERLAY_WIDTH: f32 = 340.0;
const OVERLAY_HEIGHT: f32 = 300.0;

const CONNECTED: Color = Color::new(34.0 / 255.0, 197.0 / 255.0, 94.0 / 255.0, 1.0);
const CONNECTING: Color = Color::new(245.0 / 255.0, 158.0 / 255.0, 11.0 / 255.0, 1.0);
const DISCONNECTED: Color = Color::new(239.0 / 255.0, 68.0 / 255.0, 68.0 / 255.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub page: Color,
    pub panel: Color,
    pub text: Color,
    pub muted: Color,
    pub button: Color,
    pub accent: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                page: Color::from_rgba(11, 15, 26, 255),
                panel: Color::from_rgba(17, 24, 39, 235),
                text: Color::from_rgba(229, 231, 235, 255),
                muted: Color::from_rgba(148, 163, 184, 255),
                button: Color::from_rgba(30, 41, 59, 255),
                accent: Color::from_rgba(2, 132, 199, 255),
            },
            Theme::Light => Self {
                page: Color::from_rgba(241, 245, 249, 255),
                panel: Color::from_rgba(255, 255, 255, 240),
                text: Color::from_rgba(15, 23, 42, 255),
                muted: Color::from_rgba(100, 116, 139, 255),
                button: Color::from_rgba(226, 232, 240, 255),
                accent: Color::from_rgba(2, 132, 199, 255),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadVariant {
    Desktop,
    Mobile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiButton {
    Restart,
    Menu,
    OpenLeaderboard,
    CloseLeaderboard,
    ClearLeaderboard,
    ToggleTheme,
    Arrow(Direction, PadVariant),
}

impl UiButton {
    pub fn label(self) -> &'static str {
        match self {
            UiButton::Restart => "Restart",
            UiButton::Menu => "Menu",
            UiButton::OpenLeaderboard => "Leaderboard",
            UiButton::CloseLeaderboard => "Close",
            UiButton::ClearLeaderboard => "Clear",
            UiButton::ToggleTheme => "Theme",
            UiButton::Arrow(Direction::Up, _) => "^",
            UiButton::Arrow(Direction::Down, _) => "v",
            UiButton::Arrow(Direction::Left, _) => "<",
            UiButton::Arrow(Direction::Right, _) => ">",
        }
    }
}

/// Screen positions of the board, panels and every clickable control.
#[derive(Debug, Clone, PartialEq)]
pub struct UiLayout {
    pub board: Rect,
    pub side_panel: Option<Rect>,
    pub overlay: Option<Rect>,
    buttons: Vec<(UiButton, Rect)>,
}

impl UiLayout {
    pub fn compute(
        screen_w: f32,
        screen_h: f32,
        board_w: f32,
        board_h: f32,
        overlay: Overlay,
    ) -> Self {
        let wide = screen_w > SIDE_PANEL_BREAKPOINT;
        let main_w = if wide {
            screen_w - SIDE_PANEL_WIDTH
        } else {
            screen_w
        };

        let board = Rect::new(
            ((main_w - board_w) / 2.0).max(MARGIN),
            TOP_BAR,
            board_w,
            board_h,
        );
        let mut buttons = Vec::new();

        let side_panel = if wide {
            let panel = Rect::new(
                screen_w - SIDE_PANEL_WIDTH + MARGIN / 2.0,
                MARGIN,
                SIDE_PANEL_WIDTH - MARGIN * 1.5,
                (screen_h - MARGIN * 2.0).max(0.0),
            );
            let x = panel.x + MARGIN;
            let y = panel.y + 200.0;
            buttons.push((UiButton::ToggleTheme, Rect::new(x, y, BUTTON_WIDTH, BUTTON_HEIGHT)));
            if overlay != Overlay::LeaderboardOpen {
                buttons.push((
                    UiButton::OpenLeaderboard,
                    Rect::new(x, y + BUTTON_HEIGHT + PAD_GAP, BUTTON_WIDTH, BUTTON_HEIGHT),
                ));
            }
            let pad_center = panel.x + panel.w / 2.0;
            push_pad(&mut buttons, pad_center, y + 120.0, DESKTOP_PAD_KEY, PadVariant::Desktop);
            Some(panel)
        } else {
            let x = screen_w - MARGIN - BUTTON_WIDTH;
            buttons.push((UiButton::ToggleTheme, Rect::new(x, MARGIN, BUTTON_WIDTH, BUTTON_HEIGHT)));
            if overlay != Overlay::LeaderboardOpen {
                buttons.push((
                    UiButton::OpenLeaderboard,
                    Rect::new(x - BUTTON_WIDTH - PAD_GAP, MARGIN, BUTTON_WIDTH, BUTTON_HEIGHT),
                ));
            }
            push_pad(
                &mut buttons,
                screen_w / 2.0,
                board.bottom() + MARGIN,
                MOBILE_PAD_KEY,
                PadVariant::Mobile,
            );
            None
        };

        let overlay_rect = (overlay != Overlay::Playing).then(|| {
            let w = OVERLAY_WIDTH.min(screen_w - MARGIN * 2.0).max(0.0);
            Rect::new(
                board.x + (board.w - w) / 2.0,
                board.y + ((board.h - OVERLAY_HEIGHT) / 2.0).max(0.0),
                w,
                OVERLAY_HEIGHT,
            )
        });

        if let Some(panel) = overlay_rect {
            let row = panel.bottom() - MARGIN - BUTTON_HEIGHT;
            let left = Rect::new(panel.x + MARGIN, row, BUTTON_WIDTH, BUTTON_HEIGHT);
            let right = Rect::new(
                panel.right() - MARGIN - BUTTON_WIDTH,
                row,
                BUTTON_WIDTH,
                BUTTON_HEIGHT,
            );
            match overlay {
                Overlay::Dead => {
                    buttons.push((UiButton::Restart, left));
                    buttons.push((UiButton::Menu, right));
                }
                Overlay::LeaderboardOpen => {
                    buttons.push((UiButton::CloseLeaderboard, left));
                    buttons.push((UiButton::ClearLeaderboard, right));
                }
                Overlay::Menu | Overlay::Playing => {}
            }
        }

        Self {
            board,
            side_panel,
            overlay: overlay_rect,
            buttons,
        }
    }

    pub fn buttons(&self) -> &[(UiButton, Rect)] {
        &self.buttons
    }

    /// Topmost control under the point, if any.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<UiButton> {
        self.buttons
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(vec2(x, y)))
            .map(|(button, _)| *button)
    }
}

fn push_pad(
    buttons: &mut Vec<(UiButton, Rect)>,
    center_x: f32,
    top: f32,
    key: f32,
    variant: PadVariant,
) {
    let left = center_x - key * 1.5 - PAD_GAP;
    let row = top + key + PAD_GAP;
    let keys = [
        (Direction::Up, center_x - key / 2.0, top),
        (Direction::Left, left, row),
        (Direction::Down, center_x - key / 2.0, row),
        (Direction::Right, center_x + key / 2.0 + PAD_GAP, row),
    ];
    for (direction, x, y) in keys {
        buttons.push((UiButton::Arrow(direction, variant), Rect::new(x, y, key, key)));
    }
}

pub fn connection_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Connected => CONNECTED,
        ConnectionState::Connecting => CONNECTING,
        ConnectionState::Disconnected => DISCONNECTED,
    }
}

/// Draws everything except the board and the particle layer.
pub fn draw(layout: &UiLayout, palette: &Palette, controller: &SyncController, now: Instant) {
    let hud = controller.hud();
    let connection = controller.connection();

    let lines = [
        format!("Score: {}", hud.score),
        format!("High: {}", hud.high_score),
        format!("State: {}", hud.state),
        format!("Grid: {}", hud.grid),
    ];

    match layout.side_panel {
        Some(panel) => {
            draw_rectangle(panel.x, panel.y, panel.w, panel.h, palette.panel);
            let x = panel.x + MARGIN;
            let mut y = panel.y + 36.0;
            for line in &lines {
                draw_text(line, x, y, 24.0, palette.text);
                y += 30.0;
            }
            draw_connection(x, y, connection, palette);
        }
        None => {
            draw_text(&lines[0], MARGIN, 36.0, 24.0, palette.text);
            draw_text(&lines[1], MARGIN + 150.0, 36.0, 24.0, palette.text);
            draw_text(&lines[2], MARGIN, 64.0, 18.0, palette.muted);
            draw_connection(MARGIN + 150.0, 64.0, connection, palette);
        }
    }

    if let Some(text) = controller.popup_text(now) {
        let size = measure_text(text, None, 32, 1.0);
        draw_text(
            text,
            layout.board.right() - size.width - 8.0,
            layout.board.y - 8.0,
            32.0,
            palette.accent,
        );
    }

    if let Some(rect) = layout.overlay {
        draw_overlay(rect, palette, controller);
    }

    for (button, rect) in layout.buttons() {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, palette.button);
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.0, palette.muted);
        let label = button.label();
        let size = measure_text(label, None, 20, 1.0);
        draw_text(
            label,
            rect.x + (rect.w - size.width) / 2.0,
            rect.y + (rect.h + size.height) / 2.0,
            20.0,
            palette.text,
        );
    }
}

fn draw_connection(x: f32, y: f32, state: ConnectionState, palette: &Palette) {
    draw_circle(x + 6.0, y - 6.0, 6.0, connection_color(state));
    draw_text(state.label(), x + 18.0, y, 18.0, palette.muted);
}

fn draw_overlay(rect: Rect, palette: &Palette, controller: &SyncController) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, palette.panel);
    draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, palette.accent);

    let x = rect.x + MARGIN;
    let mut y = rect.y + 44.0;
    let mut line = |text: &str, size: f32, color: Color| {
        draw_text(text, x, y, size, color);
        y += size + 8.0;
    };

    match controller.overlay() {
        Overlay::Menu => {
            line("Snake", 40.0, palette.accent);
            line("Arrows / WASD or swipe to steer", 18.0, palette.text);
            line("Space restarts after a crash", 18.0, palette.muted);
            line("T toggles the theme", 18.0, palette.muted);
        }
        Overlay::Dead => {
            line("Game over", 40.0, palette.accent);
            line(
                &format!("Final score: {}", controller.hud().final_score),
                24.0,
                palette.text,
            );
            line(
                &format!("Best: {}", controller.high_score()),
                18.0,
                palette.muted,
            );
        }
        Overlay::LeaderboardOpen => {
            line("Leaderboard", 32.0, palette.accent);
            for entry in controller.leaderboard_lines() {
                line(&entry, 16.0, palette.text);
            }
        }
        Overlay::Playing => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrows(layout: &UiLayout) -> Vec<UiButton> {
        layout
            .buttons()
            .iter()
            .map(|(button, _)| *button)
            .filter(|button| matches!(button, UiButton::Arrow(..)))
            .collect()
    }

    #[test]
    fn test_wide_layout_uses_desktop_pad() {
        let layout = UiLayout::compute(1280.0, 900.0, 560.0, 560.0, Overlay::Playing);
        assert!(layout.side_panel.is_some());
        assert!(layout.overlay.is_none());

        let pad = arrows(&layout);
        assert_eq!(pad.len(), 4);
        assert!(pad
            .iter()
            .all(|b| matches!(b, UiButton::Arrow(_, PadVariant::Desktop))));
    }

    #[test]
    fn test_narrow_layout_uses_mobile_pad() {
        let layout = UiLayout::compute(480.0, 900.0, 360.0, 360.0, Overlay::Playing);
        assert!(layout.side_panel.is_none());
        assert!(arrows(&layout)
            .iter()
            .all(|b| matches!(b, UiButton::Arrow(_, PadVariant::Mobile))));
    }

    #[test]
    fn test_hit_test_finds_arrow() {
        let layout = UiLayout::compute(480.0, 900.0, 360.0, 360.0, Overlay::Playing);
        let (button, rect) = layout
            .buttons()
            .iter()
            .find(|(b, _)| *b == UiButton::Arrow(Direction::Left, PadVariant::Mobile))
            .copied()
            .unwrap();

        let center = rect.center();
        assert_eq!(layout.hit_test(center.x, center.y), Some(button));
        assert_eq!(layout.hit_test(-5.0, -5.0), None);
    }

    #[test]
    fn test_dead_overlay_has_restart_and_menu() {
        let layout = UiLayout::compute(1280.0, 900.0, 560.0, 560.0, Overlay::Dead);
        let overlay = layout.overlay.unwrap();
        let buttons: Vec<UiButton> = layout.buttons().iter().map(|(b, _)| *b).collect();

        assert!(buttons.contains(&UiButton::Restart));
        assert!(buttons.contains(&UiButton::Menu));
        for (button, rect) in layout.buttons() {
            if matches!(button, UiButton::Restart | UiButton::Menu) {
                assert!(overlay.contains(rect.center()));
            }
        }
    }

    #[test]
    fn test_leaderboard_overlay_controls() {
        let layout = UiLayout::compute(1280.0, 900.0, 560.0, 560.0, Overlay::LeaderboardOpen);
        let buttons: Vec<UiButton> = layout.buttons().iter().map(|(b, _)| *b).collect();

        assert!(buttons.contains(&UiButton::CloseLeaderboard));
        assert!(buttons.contains(&UiButton::ClearLeaderboard));
        assert!(!buttons.contains(&UiButton::OpenLeaderboard));
    }

    #[test]
    fn test_board_is_below_top_bar() {
        let layout = UiLayout::compute(1280.0, 900.0, 560.0, 420.0, Overlay::Menu);
        assert_eq!(layout.board.y, TOP_BAR);
        assert_eq!(layout.board.w, 560.0);
        assert!(layout.board.right() <= 1280.0 - SIDE_PANEL_WIDTH);
    }

    #[test]
    fn test_palettes_differ_by_theme() {
        let dark = Palette::for_theme(Theme::Dark);
        let light = Palette::for_theme(Theme::Light);
        assert_ne!(dark.page, light.page);
        assert_eq!(dark.accent, light.accent);
    }

    #[test]
    fn test_connection_colors() {
        assert_eq!(connection_color(ConnectionState::Connected), CONNECTED);
        assert_ne!(
            connection_color(ConnectionState::Connecting),
            connection_color(ConnectionState::Disconnected)
        );
    }
}
