//! Keyboard, pointer and touch input translated into outbound intents
//!
//! Every recognized directional input is forwarded immediately. The server
//! decides whether a direction change is legal, so nothing is filtered here.

use crate::config::SWIPE_THRESHOLD;
use macroquad::prelude::*;
use shared::{Direction, Packet};

/// Message the client asks the server to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ChangeDirection(Direction),
    Restart,
}

impl Intent {
    pub fn to_packet(self) -> Packet {
        match self {
            Intent::ChangeDirection(direction) => direction.to_packet(),
            Intent::Restart => Packet::Restart,
        }
    }
}

/// Key press, decoupled from the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Send(Intent),
    ToggleTheme,
    CloseLeaderboard,
}

/// Raw input sampled from the window for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(Key),
    TouchStart { x: f32, y: f32 },
    TouchEnd { x: f32, y: f32 },
    Click { x: f32, y: f32 },
}

/// Direction of a swipe from its total displacement, if it is decisive.
pub fn classify_swipe(dx: f32, dy: f32) -> Option<Direction> {
    if dx.abs() > dy.abs() {
        if dx > SWIPE_THRESHOLD {
            Some(Direction::Right)
        } else if dx < -SWIPE_THRESHOLD {
            Some(Direction::Left)
        } else {
            None
        }
    } else if dy.abs() > dx.abs() {
        if dy > SWIPE_THRESHOLD {
            Some(Direction::Down)
        } else if dy < -SWIPE_THRESHOLD {
            Some(Direction::Up)
        } else {
            None
        }
    } else {
        None
    }
}

#[derive(Debug, Default)]
pub struct InputDispatcher {
    touch_start: Option<(f32, f32)>,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a key press. Space restarts only when the last snapshot was dead.
    pub fn key(&self, key: Key, last_alive: Option<bool>) -> Option<Command> {
        let direction = match key {
            Key::ArrowUp => Some(Direction::Up),
            Key::ArrowDown => Some(Direction::Down),
            Key::ArrowLeft => Some(Direction::Left),
            Key::ArrowRight => Some(Direction::Right),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'w' => Some(Direction::Up),
                's' => Some(Direction::Down),
                'a' => Some(Direction::Left),
                'd' => Some(Direction::Right),
                _ => None,
            },
            _ => None,
        };
        if let Some(direction) = direction {
            return Some(Command::Send(Intent::ChangeDirection(direction)));
        }

        match key {
            Key::Space if last_alive == Some(false) => Some(Command::Send(Intent::Restart)),
            Key::Escape => Some(Command::CloseLeaderboard),
            Key::Char('t') | Key::Char('T') => Some(Command::ToggleTheme),
            _ => None,
        }
    }

    pub fn touch_start(&mut self, x: f32, y: f32) {
        self.touch_start = Some((x, y));
    }

    /// Completes a swipe. A touch end without a matching start is ignored.
    pub fn touch_end(&mut self, x: f32, y: f32) -> Option<Command> {
        let (start_x, start_y) = self.touch_start.take()?;
        classify_swipe(x - start_x, y - start_y)
            .map(|direction| Command::Send(Intent::ChangeDirection(direction)))
    }

    /// Samples this frame's input from macroquad.
    pub fn poll_window(&self) -> Vec<InputEvent> {
        const KEYS: [(KeyCode, Key); 11] = [
            (KeyCode::Up, Key::ArrowUp),
            (KeyCode::Down, Key::ArrowDown),
            (KeyCode::Left, Key::ArrowLeft),
            (KeyCode::Right, Key::ArrowRight),
            (KeyCode::W, Key::Char('w')),
            (KeyCode::A, Key::Char('a')),
            (KeyCode::S, Key::Char('s')),
            (KeyCode::D, Key::Char('d')),
            (KeyCode::T, Key::Char('t')),
            (KeyCode::Space, Key::Space),
            (KeyCode::Escape, Key::Escape),
        ];

        let mut events: Vec<InputEvent> = KEYS
            .iter()
            .filter(|(code, _)| is_key_pressed(*code))
            .map(|(_, key)| InputEvent::Key(*key))
            .collect();

        for touch in touches() {
            let (x, y) = (touch.position.x, touch.position.y);
            match touch.phase {
                TouchPhase::Started => events.push(InputEvent::TouchStart { x, y }),
                TouchPhase::Ended => events.push(InputEvent::TouchEnd { x, y }),
                _ => {}
            }
        }

        if is_mouse_button_pressed(MouseButton::Left) {
            let (x, y) = mouse_position();
            events.push(InputEvent::Click { x, y });
        }

        events
    }
}
