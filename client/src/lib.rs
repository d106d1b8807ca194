//! # Snake Client Library
//!
//! This library is the client-side presentation and synchronization layer for a
//! server-authoritative snake game. The server owns every game rule and pushes
//! state snapshots; the client turns them into frames, plays feedback, drives a
//! small overlay state machine and forwards player input as intents.
//!
//! ## Architecture Overview
//!
//! Several independently timed sources feed one frame loop: snapshots pushed by
//! the server, window input, a debounced resize and the particle animation.
//! Each source is a queue, and the loop in [`app`] is its single consumer, so
//! all state is mutated on one thread in a fixed, auditable order.
//!
//! ### Snapshot Path
//! The transport thread decodes datagrams and queues raw snapshots. The
//! [`sync::SyncController`] normalizes each one, hands it to the renderer and
//! then updates the overlay. Side effects of a death fire at most once per
//! episode, however many dead snapshots arrive.
//!
//! ### Intent Path
//! Keys, swipes and on-screen buttons become [`input::Intent`]s that are sent
//! immediately. Nothing is validated locally; the server decides.
//!
//! ## Module Organization
//!
//! ### Sync Module (`sync`)
//! - Snapshot normalization and render dispatch
//! - Per-death deduplication of game-over effects
//! - Deferred leaderboard save with name prompt
//!
//! ### Rendering Module (`rendering`)
//! - Cell size fitting and surface resizing
//! - Grid, food and snake drawing behind the `Surface` trait
//! - HUD text and eat detection
//!
//! ### Network Module (`network`)
//! - UDP socket and bincode packets
//! - Bounded reconnection and connection state signals
//!
//! ### Storage and Leaderboard (`storage`, `leaderboard`)
//! - Persistent high score, theme and top-10 leaderboard
//! - Failures are logged and the in-memory value is kept
//!
//! ## Usage Example
//!
//! ```no_run
//! use client::audio::SilentTones;
//! use client::leaderboard::ConfiguredPrompter;
//! use client::rendering::{HeadlessSurface, Viewport};
//! use client::storage::Persistence;
//! use client::sync::SyncController;
//! use shared::RawSnapshot;
//! use std::time::Instant;
//!
//! let mut controller = SyncController::new(
//!     Persistence::in_memory(),
//!     Viewport::new(1280.0, 900.0),
//!     Box::new(SilentTones),
//!     Box::new(ConfiguredPrompter::new("You")),
//! );
//! let mut surface = HeadlessSurface::new();
//!
//! # let incoming: Vec<RawSnapshot> = Vec::new();
//! for raw in incoming {
//!     controller.on_snapshot(raw, Instant::now(), &mut surface);
//!     controller.tick(Instant::now());
//! }
//! ```

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod leaderboard;
pub mod network;
pub mod overlay;
pub mod particles;
pub mod rendering;
pub mod storage;
pub mod sync;
pub mod ui;
