//! # Coin Arena Client Library
//!
//! This library provides the client side of the coin-collecting multiplayer
//! game: a mirror of the server's world, arrow-key input, the WebSocket
//! connection and the 2D renderer.
//!
//! ## Architecture Overview
//!
//! The client does no prediction and no
//! interpolation; whatever snapshot arrived last is what gets drawn.
//!
//! ### State Mirror
//! `init` and `gameState` snapshots replace the local players and coins
//! wholesale, `newPlayer` and `playerDisconnect` patch the player map in
//! between. The only client-owned data is the local player's position, which
//! arrow keys move in 5 unit steps and which is sent to the server after every
//! step without waiting for confirmation.
//!
//! ### Frame Loop
//! Each frame drains received events, samples input, sends moves and redraws.
//! The loop runs at the display refresh rate, independent of server ticks.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The local mirror and the step logic.
//!
//! ### Input Module (`input`)
//! Arrow-key sampling with keyboard-style auto-repeat.
//!
//! ### Network Module (`network`)
//! WebSocket connection on a background runtime, JSON event codec.
//!
//! ### Rendering Module (`rendering`)
//! Players as rectangles, coins as circles, score labels and connection status.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::{game::ClientGameState, input::InputManager, network::NetworkClient};
//! use client::rendering::Renderer;
//! use macroquad::prelude::next_frame;
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut network = NetworkClient::connect("ws://127.0.0.1:3000")?;
//!     let mut game = ClientGameState::new();
//!     let mut input = InputManager::new();
//!     let renderer = Renderer::new(800.0, 600.0);
//!
//!     loop {
//!         for event in network.poll() {
//!             game.apply_server_event(event);
//!         }
//!
//!         for direction in input.update() {
//!             if let Some(event) = game.apply_step(direction) {
//!                 network.send(event);
//!             }
//!         }
//!
//!         renderer.render(&game, network.status());
//!         next_frame().await;
//!     }
//! }
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
