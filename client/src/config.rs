//! Client tuning constants and runtime configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const MIN_CELL: u32 = 12;
pub const MAX_CELL: u32 = 28;
pub const DEFAULT_CELL: u32 = 20;

pub const MAX_LEADERBOARD: usize = 10;
pub const MAX_NAME_LEN: usize = 12;
pub const DEFAULT_PLAYER_NAME: &str = "You";

pub const PARTICLE_COUNT: usize = 40;
pub const PARTICLE_MARGIN: f32 = 20.0;

pub const SWIPE_THRESHOLD: f32 = 12.0;

pub const SCORE_POPUP_TIME: Duration = Duration::from_millis(700);
pub const NAME_PROMPT_DELAY: Duration = Duration::from_millis(120);
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(140);

/// Wall-clock divisor for the food pulse, in milliseconds.
pub const FOOD_PULSE_PERIOD_MS: f64 = 300.0;

pub const STORE_FILE_NAME: &str = "snake_client.json";

/// Reconnection behaviour handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Connection attempts before giving up
    pub attempts: u32,
    /// How long to wait for a handshake reply, and how long a silent link is tolerated
    pub timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            attempts: 6,
            timeout: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: String,
    pub reconnect: ReconnectPolicy,
    pub data_dir: PathBuf,
    pub player_name: String,
    pub width: u32,
    pub height: u32,
}

impl ClientConfig {
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    pub fn server_addr(&self) -> Option<SocketAddr> {
        self.server.parse().ok()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1:5000".to_string(),
            reconnect: ReconnectPolicy::default(),
            data_dir: PathBuf::from("."),
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            width: 1280,
            height: 900,
        }
    }
}
