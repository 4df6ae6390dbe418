use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WORLD_WIDTH: f64 = 800.0;
pub const WORLD_HEIGHT: f64 = 600.0;
pub const SPAWN_MARGIN: f64 = 10.0;
pub const PLAYER_SIZE: f64 = 20.0;
pub const COIN_COUNT: usize = 10;
pub const COIN_HITBOX: f64 = 10.0;
pub const COIN_RADIUS: f64 = 10.0;
pub const MOVE_STEP: f64 = 5.0;
pub const DEFAULT_TICK_RATE: u32 = 60;
pub const DEFAULT_PORT: u16 = 3000;

/// Connection-scoped player identifier, unique for the lifetime of a server process.
pub type PlayerId = u32;

/// Players keyed by id. Serialized as a JSON object with stringified ids.
pub type PlayerMap = HashMap<PlayerId, Player>;

/// Messages pushed from the server to every client.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Init {
        id: PlayerId,
        players: PlayerMap,
        coins: Vec<Coin>,
    },
    NewPlayer {
        id: PlayerId,
        player: Player,
    },
    GameState {
        players: PlayerMap,
        coins: Vec<Coin>,
    },
    PlayerDisconnect {
        id: PlayerId,
    },
}

/// Messages sent by a client to the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    PlayerMove { x: f64, y: f64 },
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl ClientEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub score: u32,
    /// `#rrggbb`, display only.
    pub color: String,
}

impl Player {
    pub fn new(x: f64, y: f64, color: String) -> Self {
        Self {
            x,
            y,
            width: PLAYER_SIZE,
            height: PLAYER_SIZE,
            score: 0,
            color,
        }
    }

    pub fn get_bounds(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Coin {
    pub x: f64,
    pub y: f64,
    pub collected: bool,
}

impl Coin {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            collected: false,
        }
    }

    /// Pickup box. Anchored at the coin position, not centered on it like the drawn circle.
    pub fn get_bounds(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.x + COIN_HITBOX, self.y + COIN_HITBOX)
    }
}

/// Strict AABB overlap between a player and a coin's pickup box.
pub fn check_coin_collision(player: &Player, coin: &Coin) -> bool {
    let (px1, py1, px2, py2) = player.get_bounds();
    let (cx1, cy1, cx2, cy2) = coin.get_bounds();

    px1 < cx2 && px2 > cx1 && py1 < cy2 && py2 > cy1
}
