use clap::Parser;
use client::app;
use client::config::{ClientConfig, ReconnectPolicy};
use log::info;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:5000")]
    server: String,

    /// Connection attempts before giving up
    #[arg(long, default_value = "6")]
    reconnect_attempts: u32,

    /// Handshake and silence timeout in milliseconds
    #[arg(long, default_value = "3000")]
    timeout_ms: u64,

    /// Directory holding the high score, theme and leaderboard
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Name recorded on the leaderboard
    #[arg(short = 'n', long, default_value = "You")]
    name: String,

    /// Window width
    #[arg(short = 'w', long, default_value = "1280")]
    width: u32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "900")]
    height: u32,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        ClientConfig {
            server: args.server,
            reconnect: ReconnectPolicy {
                attempts: args.reconnect_attempts,
                timeout: Duration::from_millis(args.timeout_ms),
            },
            data_dir: args.data_dir,
            player_name: args.name,
            width: args.width,
            height: args.height,
        }
    }
}

fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ClientConfig::from(Args::parse());

    info!("Starting client...");
    info!("Connecting to: {}", config.server);
    info!("Storing data in: {}", config.store_path().display());
    info!("Controls: arrows/WASD to steer, Space to restart, T for theme, Esc closes leaderboard");

    macroquad::Window::from_config(app::window_conf(&config), app::run(config));
}
