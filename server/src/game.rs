//! Authoritative world state: the player roster, the coin pool and pickup rules

use log::{debug, info};
use rand::Rng;
use shared::{
    check_coin_collision, Coin, Player, PlayerId, PlayerMap, ServerEvent, COIN_COUNT,
    SPAWN_MARGIN, WORLD_HEIGHT, WORLD_WIDTH,
};

/// The single authoritative copy of the world.
///
/// Owned by the server loop and mutated only from there. Positions are stored
/// exactly as received, so every snapshot reports what the client sent.
#[derive(Debug, Clone)]
pub struct GameState {
    pub tick: u32,
    pub players: PlayerMap,
    pub coins: Vec<Coin>,
}

impl GameState {
    /// Creates a world with a fresh pool of randomly placed coins
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let coins = (0..COIN_COUNT)
            .map(|_| {
                let (x, y) = random_coin_position(rng);
                Coin::new(x, y)
            })
            .collect();

        Self::with_coins(coins)
    }

    /// Creates an empty world around a given coin pool
    pub fn with_coins(coins: Vec<Coin>) -> Self {
        Self {
            tick: 0,
            players: PlayerMap::new(),
            coins,
        }
    }

    /// Spawns a player at a random position inside the playfield margin
    pub fn add_player<R: Rng>(&mut self, client_id: PlayerId, rng: &mut R) -> Player {
        let x = rng.gen_range(SPAWN_MARGIN..WORLD_WIDTH - SPAWN_MARGIN);
        let y = rng.gen_range(SPAWN_MARGIN..WORLD_HEIGHT - SPAWN_MARGIN);
        let color = random_color(rng);

        let player = Player::new(x, y, color);

        info!("Added player {} at ({:.1}, {:.1})", client_id, player.x, player.y);
        self.players.insert(client_id, player.clone());
        player
    }

    /// Removes a player from the roster.
    ///
    /// Returns the removed record, or `None` if the player was already gone;
    /// callers use that to make disconnect handling idempotent.
    pub fn remove_player(&mut self, client_id: &PlayerId) -> Option<Player> {
        let removed = self.players.remove(client_id);
        if removed.is_some() {
            info!("Removed player {}", client_id);
        }
        removed
    }

    /// Teleports a player to the reported position and collects any coins it now covers.
    ///
    /// The position is trusted as sent: no clamping and no check against the previous
    /// position. Returns `None` when the player is no longer in the world.
    pub fn apply_move(&mut self, client_id: PlayerId, x: f64, y: f64) -> Option<u32> {
        let player = self.players.get_mut(&client_id)?;
        player.x = x;
        player.y = y;

        Some(self.collect_coins(client_id))
    }

    /// Scans every uncollected coin against one player and returns how many were picked up
    pub fn collect_coins(&mut self, client_id: PlayerId) -> u32 {
        let Some(player) = self.players.get_mut(&client_id) else {
            return 0;
        };

        let mut collected = 0;
        for (index, coin) in self.coins.iter_mut().enumerate() {
            if coin.collected || !check_coin_collision(player, coin) {
                continue;
            }

            coin.collected = true;
            player.score += 1;
            collected += 1;

            debug!(
                "Player {} collected coin {}, score is now {}",
                client_id, index, player.score
            );
        }

        collected
    }

    /// Number of coins still waiting to be picked up.
    ///
    /// The pool is never replenished, so this only ever decreases.
    pub fn remaining_coins(&self) -> usize {
        self.coins.iter().filter(|coin| !coin.collected).count()
    }

    /// Welcome snapshot for a newly joined player
    pub fn init_event(&self, client_id: PlayerId) -> ServerEvent {
        ServerEvent::Init {
            id: client_id,
            players: self.players.clone(),
            coins: self.coins.clone(),
        }
    }

    /// Full world snapshot, never a delta
    pub fn snapshot(&self) -> ServerEvent {
        ServerEvent::GameState {
            players: self.players.clone(),
            coins: self.coins.clone(),
        }
    }
}

fn random_coin_position<R: Rng>(rng: &mut R) -> (f64, f64) {
    let span_x = (WORLD_WIDTH - 2.0 * SPAWN_MARGIN) as u32;
    let span_y = (WORLD_HEIGHT - 2.0 * SPAWN_MARGIN) as u32;

    (
        rng.gen_range(0..span_x) as f64 + SPAWN_MARGIN,
        rng.gen_range(0..span_y) as f64 + SPAWN_MARGIN,
    )
}

fn random_color<R: Rng>(rng: &mut R) -> String {
    format!("#{:06x}", rng.gen_range(0..=0xFF_FFFFu32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn place_player(state: &mut GameState, id: PlayerId, x: f64, y: f64) {
        state
            .players
            .insert(id, Player::new(x, y, "#123456".to_string()));
    }

    #[test]
    fn test_new_world_has_full_coin_pool() {
        let state = GameState::new(&mut test_rng());

        assert_eq!(state.coins.len(), COIN_COUNT);
        assert_eq!(state.remaining_coins(), COIN_COUNT);
        assert!(state.players.is_empty());

        for coin in &state.coins {
            assert!(coin.x >= SPAWN_MARGIN && coin.x < WORLD_WIDTH - SPAWN_MARGIN);
            assert!(coin.y >= SPAWN_MARGIN && coin.y < WORLD_HEIGHT - SPAWN_MARGIN);
            assert_eq!(coin.x.fract(), 0.0);
            assert_eq!(coin.y.fract(), 0.0);
        }
    }

    #[test]
    fn test_add_player_spawns_inside_margin() {
        let mut rng = test_rng();
        let mut state = GameState::with_coins(vec![]);

        for id in 1..=200 {
            let player = state.add_player(id, &mut rng);
            assert!(player.x >= SPAWN_MARGIN && player.x < WORLD_WIDTH - SPAWN_MARGIN);
            assert!(player.y >= SPAWN_MARGIN && player.y < WORLD_HEIGHT - SPAWN_MARGIN);
            assert_eq!(player.score, 0);
            assert_eq!(player.width, shared::PLAYER_SIZE);
            assert_eq!(player.height, shared::PLAYER_SIZE);
        }

        assert_eq!(state.players.len(), 200);
    }

    #[test]
    fn test_random_color_format() {
        let mut rng = test_rng();
        for _ in 0..100 {
            let color = random_color(&mut rng);
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_remove_player() {
        let mut state = GameState::with_coins(vec![]);
        place_player(&mut state, 1, 0.0, 0.0);

        assert!(state.remove_player(&1).is_some());
        assert!(state.players.is_empty());
        assert!(state.remove_player(&1).is_none());
    }

    #[test]
    fn test_move_sets_exact_position_without_clamping() {
        let mut state = GameState::with_coins(vec![]);
        place_player(&mut state, 1, 100.0, 100.0);

        let positions = [
            (250.5, 12.25),
            (-500.0, 9000.0),
            (100.123456789, 16777217.0),
            (0.0, 0.0),
        ];
        for (x, y) in positions {
            assert_eq!(state.apply_move(1, x, y), Some(0));
            assert_eq!(state.players[&1].x, x);
            assert_eq!(state.players[&1].y, y);
        }
    }

    #[test]
    fn test_move_for_unknown_player_is_ignored() {
        let mut state = GameState::with_coins(vec![Coin::new(0.0, 0.0)]);
        assert_eq!(state.apply_move(99, 0.0, 0.0), None);
        assert!(state.players.is_empty());
        assert!(!state.coins[0].collected);
    }

    #[test]
    fn test_stationary_move_still_collects() {
        let mut state = GameState::with_coins(vec![Coin::new(105.0, 105.0)]);
        place_player(&mut state, 1, 100.0, 100.0);

        assert_eq!(state.apply_move(1, 100.0, 100.0), Some(1));
        assert!(state.coins[0].collected);
        assert_eq!(state.players[&1].score, 1);
    }

    #[test]
    fn test_move_a_hair_past_touching_collects() {
        let mut state = GameState::with_coins(vec![Coin::new(100.0, 100.0)]);
        place_player(&mut state, 1, 0.0, 100.0);

        assert_eq!(state.apply_move(1, 80.0, 100.0), Some(0));
        assert_eq!(state.apply_move(1, 80.000001, 100.0), Some(1));
        assert_eq!(state.players[&1].x, 80.000001);
        assert_eq!(state.players[&1].score, 1);
    }

    #[test]
    fn test_collection_is_idempotent() {
        let mut state = GameState::with_coins(vec![Coin::new(105.0, 105.0)]);
        place_player(&mut state, 1, 100.0, 100.0);

        state.apply_move(1, 100.0, 100.0);
        for _ in 0..5 {
            assert_eq!(state.apply_move(1, 101.0, 101.0), Some(0));
        }

        assert_eq!(state.players[&1].score, 1);
        assert_eq!(state.remaining_coins(), 0);
    }

    #[test]
    fn test_one_move_can_collect_several_coins() {
        let mut state = GameState::with_coins(vec![
            Coin::new(100.0, 100.0),
            Coin::new(110.0, 110.0),
            Coin::new(500.0, 500.0),
        ]);
        place_player(&mut state, 1, 0.0, 0.0);

        assert_eq!(state.apply_move(1, 100.0, 100.0), Some(2));
        assert_eq!(state.players[&1].score, 2);
        assert!(!state.coins[2].collected);
    }

    #[test]
    fn test_score_counts_coins_touched() {
        let coins = (0..5).map(|i| Coin::new(100.0 * i as f64 + 50.0, 50.0)).collect();
        let mut state = GameState::with_coins(coins);
        place_player(&mut state, 1, 0.0, 300.0);

        for i in 0..5 {
            state.apply_move(1, 100.0 * i as f64 + 45.0, 45.0);
            state.apply_move(1, 100.0 * i as f64 + 45.0, 300.0);
            assert_eq!(state.players[&1].score, i + 1);
        }
    }

    #[test]
    fn test_first_mover_wins_shared_coin() {
        let mut state = GameState::with_coins(vec![Coin::new(105.0, 105.0)]);
        place_player(&mut state, 1, 0.0, 0.0);
        place_player(&mut state, 2, 300.0, 300.0);

        assert_eq!(state.apply_move(2, 98.0, 98.0), Some(1));
        assert_eq!(state.apply_move(1, 100.0, 100.0), Some(0));

        assert_eq!(state.players[&1].score, 0);
        assert_eq!(state.players[&2].score, 1);
    }

    #[test]
    fn test_init_event_contains_self_and_others() {
        let mut rng = test_rng();
        let mut state = GameState::new(&mut rng);
        state.add_player(1, &mut rng);
        state.add_player(2, &mut rng);

        match state.init_event(2) {
            ServerEvent::Init { id, players, coins } => {
                assert_eq!(id, 2);
                assert_eq!(players.len(), 2);
                assert!(players.contains_key(&1));
                assert!(players.contains_key(&2));
                assert_eq!(coins.len(), COIN_COUNT);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_reflects_current_state() {
        let mut state = GameState::with_coins(vec![Coin::new(105.0, 105.0)]);
        place_player(&mut state, 1, 100.0, 100.0);
        state.apply_move(1, 100.0, 100.0);

        match state.snapshot() {
            ServerEvent::GameState { players, coins } => {
                assert_eq!(players[&1].score, 1);
                assert!(coins[0].collected);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }
}
