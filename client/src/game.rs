use crate::input::Direction;
use shared::{ClientEvent, Coin, PlayerId, PlayerMap, ServerEvent, MOVE_STEP};

/// Local mirror of the server's world plus this client's own position.
///
/// Snapshots replace the mirror wholesale. The local position is only seeded
/// from `init` and then moved by key presses; it is never reconciled with the
/// server's echo.
#[derive(Debug, Clone, Default)]
pub struct ClientGameState {
    pub player_id: Option<PlayerId>,
    pub players: PlayerMap,
    pub coins: Vec<Coin>,
    local_position: Option<(f64, f64)>,
}

impl ClientGameState {
    /// Creates an empty mirror with no assigned player.
    ///
    /// Nothing is drawn and key presses are ignored until `init` arrives.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one server event into the mirror.
    ///
    /// `init` and `gameState` replace players and coins wholesale; `init` also
    /// records this client's id and seeds the local position from its own
    /// record. `newPlayer` and `playerDisconnect` patch the player map. Unknown
    /// ids in `playerDisconnect` are ignored.
    pub fn apply_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Init { id, players, coins } => {
                self.local_position = players.get(&id).map(|player| (player.x, player.y));
                self.player_id = Some(id);
                self.players = players;
                self.coins = coins;
            }
            ServerEvent::NewPlayer { id, player } => {
                self.players.insert(id, player);
            }
            ServerEvent::GameState { players, coins } => {
                self.players = players;
                self.coins = coins;
            }
            ServerEvent::PlayerDisconnect { id } => {
                self.players.remove(&id);
            }
        }
    }

    /// Moves the local player one step and returns the move to send.
    ///
    /// Steps start from the position the server issued in `init` rather than a
    /// fixed canvas centre, so the first move never teleports the player.
    /// Returns `None` until the server has assigned this client a player.
    pub fn apply_step(&mut self, direction: Direction) -> Option<ClientEvent> {
        let (x, y) = self.local_position.as_mut()?;
        let (dx, dy) = direction.delta();

        *x += dx * MOVE_STEP;
        *y += dy * MOVE_STEP;

        Some(ClientEvent::PlayerMove { x: *x, y: *y })
    }

    /// Position last sent to the server, if any
    pub fn local_position(&self) -> Option<(f64, f64)> {
        self.local_position
    }

    /// Coins still worth drawing
    pub fn uncollected_coins(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter().filter(|coin| !coin.collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::Player;

    fn player_at(x: f64, y: f64) -> Player {
        Player::new(x, y, "#abcdef".to_string())
    }

    fn init_state() -> ClientGameState {
        let mut players = PlayerMap::new();
        players.insert(1, player_at(100.0, 200.0));
        players.insert(2, player_at(300.0, 400.0));

        let mut state = ClientGameState::new();
        state.apply_server_event(ServerEvent::Init {
            id: 1,
            players,
            coins: vec![Coin::new(50.0, 50.0)],
        });
        state
    }

    #[test]
    fn test_init_replaces_mirror_and_seeds_position() {
        let state = init_state();

        assert_eq!(state.player_id, Some(1));
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.coins.len(), 1);
        assert_eq!(state.local_position(), Some((100.0, 200.0)));
    }

    #[test]
    fn test_steps_before_init_are_dropped() {
        let mut state = ClientGameState::new();
        assert_eq!(state.apply_step(Direction::Up), None);
    }

    #[test]
    fn test_step_moves_five_units() {
        let mut state = init_state();

        let cases = [
            (Direction::Right, 105.0, 200.0),
            (Direction::Down, 105.0, 205.0),
            (Direction::Left, 100.0, 205.0),
            (Direction::Up, 100.0, 200.0),
            (Direction::Up, 100.0, 195.0),
        ];

        for (direction, x, y) in cases {
            match state.apply_step(direction) {
                Some(ClientEvent::PlayerMove { x: sent_x, y: sent_y }) => {
                    assert_approx_eq!(sent_x, x);
                    assert_approx_eq!(sent_y, y);
                }
                None => panic!("Step was dropped"),
            }
        }
    }

    #[test]
    fn test_step_is_not_clamped() {
        let mut players = PlayerMap::new();
        players.insert(1, player_at(0.0, 0.0));

        let mut state = ClientGameState::new();
        state.apply_server_event(ServerEvent::Init {
            id: 1,
            players,
            coins: vec![],
        });

        assert_eq!(
            state.apply_step(Direction::Left),
            Some(ClientEvent::PlayerMove { x: -5.0, y: 0.0 })
        );
    }

    #[test]
    fn test_game_state_overwrites_but_keeps_local_position() {
        let mut state = init_state();
        state.apply_step(Direction::Right);

        let mut players = PlayerMap::new();
        players.insert(1, player_at(0.0, 0.0));
        state.apply_server_event(ServerEvent::GameState {
            players,
            coins: vec![],
        });

        assert_eq!(state.players.len(), 1);
        assert!(state.coins.is_empty());
        assert_eq!(state.local_position(), Some((105.0, 200.0)));
    }

    #[test]
    fn test_new_player_and_disconnect() {
        let mut state = init_state();

        state.apply_server_event(ServerEvent::NewPlayer {
            id: 3,
            player: player_at(1.0, 1.0),
        });
        assert!(state.players.contains_key(&3));

        state.apply_server_event(ServerEvent::PlayerDisconnect { id: 2 });
        assert!(!state.players.contains_key(&2));
        assert_eq!(state.players.len(), 2);

        // Unknown ids are harmless.
        state.apply_server_event(ServerEvent::PlayerDisconnect { id: 42 });
        assert_eq!(state.players.len(), 2);
    }

    #[test]
    fn test_uncollected_coins() {
        let mut state = ClientGameState::new();
        let mut taken = Coin::new(1.0, 1.0);
        taken.collected = true;

        state.apply_server_event(ServerEvent::GameState {
            players: PlayerMap::new(),
            coins: vec![taken, Coin::new(2.0, 2.0)],
        });

        let visible: Vec<&Coin> = state.uncollected_coins().collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].x, 2.0);
    }
}
