use crate::game::ClientGameState;
use crate::network::ConnectionStatus;
use macroquad::prelude::*;
use shared::{Player, PlayerId, COIN_RADIUS};

const LABEL_FONT_SIZE: f32 = 20.0;
const LABEL_OFFSET: f32 = 10.0;
const ID_PREFIX_LEN: usize = 5;

/// Draws the client's mirror of the world with macroquad.
///
/// World coordinates are `f64`; they are narrowed to `f32` only at the draw
/// calls, since that is all the screen needs.
pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    /// Creates a renderer for a surface of the given size in world units.
    ///
    /// The size is only used to centre the connection status message.
    pub fn new(width: f64, height: f64) -> Self {
        Renderer {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Draws the most recently received state: players, then coins, then score labels
    pub fn render(&self, state: &ClientGameState, status: &ConnectionStatus) {
        clear_background(WHITE);

        for player in state.players.values() {
            self.draw_player(player);
        }

        for coin in state.uncollected_coins() {
            draw_circle(coin.x as f32, coin.y as f32, COIN_RADIUS as f32, GOLD);
        }

        for (id, player) in &state.players {
            self.draw_score(*id, player);
        }

        self.draw_status(status);
    }

    /// Filled rectangle in the player's color; unparseable colors fall back to gray
    fn draw_player(&self, player: &Player) {
        let color = parse_hex_color(&player.color)
            .map(|(r, g, b)| Color::from_rgba(r, g, b, 255))
            .unwrap_or(GRAY);

        draw_rectangle(
            player.x as f32,
            player.y as f32,
            player.width as f32,
            player.height as f32,
            color,
        );
    }

    fn draw_score(&self, id: PlayerId, player: &Player) {
        let label = score_label(id, player);
        let dimensions = measure_text(&label, None, LABEL_FONT_SIZE as u16, 1.0);

        let center_x = (player.x + player.width / 2.0) as f32;
        draw_text(
            &label,
            center_x - dimensions.width / 2.0,
            player.y as f32 - LABEL_OFFSET,
            LABEL_FONT_SIZE,
            BLACK,
        );
    }

    fn draw_status(&self, status: &ConnectionStatus) {
        let message = match status {
            ConnectionStatus::Connected => return,
            ConnectionStatus::Connecting => "Connecting...".to_string(),
            ConnectionStatus::Closed(Some(reason)) if !reason.is_empty() => {
                format!("Disconnected: {}", reason)
            }
            ConnectionStatus::Closed(_) => "Disconnected".to_string(),
        };

        let dimensions = measure_text(&message, None, LABEL_FONT_SIZE as u16, 1.0);
        draw_text(
            &message,
            (self.width - dimensions.width) / 2.0,
            self.height / 2.0,
            LABEL_FONT_SIZE,
            RED,
        );
    }
}

/// `Player <first five characters of id>: <score>`
pub fn score_label(id: PlayerId, player: &Player) -> String {
    let short_id: String = id.to_string().chars().take(ID_PREFIX_LEN).collect();
    format!("Player {}: {}", short_id, player.score)
}

/// Parses `#rrggbb`; anything else is rejected
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
