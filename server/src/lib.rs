//! # Coin Arena Server Library
//!
//! This library provides the authoritative server for the coin-collecting
//! multiplayer game. It owns the canonical world state, applies client moves,
//! detects coin pickups and broadcasts full snapshots to every connection.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative State
//! The server holds the only copy of the world that matters: the player roster
//! and the fixed pool of coins generated at start-up. Clients mirror it and are
//! overwritten by every snapshot.
//!
//! ### Client Management
//! Handles the lifecycle of WebSocket connections:
//! - Connection acceptance, id assignment and capacity enforcement
//! - Player spawn and the `init` / `newPlayer` handshake
//! - Disconnection cleanup and `playerDisconnect` notification
//!
//! ### State Broadcasting
//! Every accepted move triggers an immediate `gameState` broadcast, and a fixed
//! rate timer (60Hz by default) broadcasts it again so idle clients still see
//! everyone else move.
//!
//! ## Architecture Design
//!
//! ### Single Owner Event Loop
//! One task owns the world state and processes connection events and timer
//! ticks sequentially. Connection tasks only decode frames and forward them
//! over a channel, so the world needs no locking.
//!
//! ### Trusted Positions
//! Clients report absolute positions and the server applies them verbatim.
//! There is no clamping, velocity check or anti-cheat; `network::Server`
//! marks the spot where such validation would be inserted.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Connection roster, id allocation and frame fan-out.
//!
//! ### Game Module (`game`)
//! Players, coins, spawn rules and the pickup scan.
//!
//! ### Network Module (`network`)
//! WebSocket acceptance, per-connection tasks and the main loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // 60 snapshots per second, at most 32 players
//!     let mut server = Server::new(
//!         "127.0.0.1:3000",
//!         Duration::from_secs_f64(1.0 / 60.0),
//!         32,
//!     ).await?;
//!
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod game;
pub mod network;
