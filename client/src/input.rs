//! Arrow-key input with keyboard-style auto-repeat

use macroquad::prelude::*;

/// Seconds a key must be held before it starts repeating
pub const REPEAT_DELAY: f64 = 0.25;
/// Seconds between repeated presses while held
pub const REPEAT_INTERVAL: f64 = 1.0 / 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset in screen coordinates (y grows downwards)
    pub fn delta(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    pub fn key_code(self) -> KeyCode {
        match self {
            Direction::Up => KeyCode::Up,
            Direction::Down => KeyCode::Down,
            Direction::Left => KeyCode::Left,
            Direction::Right => KeyCode::Right,
        }
    }
}

/// Turns a held key into discrete press events
#[derive(Debug, Default, Clone)]
struct KeyRepeat {
    held_since: Option<f64>,
    last_fired: f64,
}

impl KeyRepeat {
    /// `pressed` is a press edge seen this frame, which may already be released again.
    fn update(&mut self, down: bool, pressed: bool, now: f64) -> bool {
        if pressed {
            self.held_since = down.then_some(now);
            self.last_fired = now;
            return true;
        }

        if !down {
            self.held_since = None;
            return false;
        }

        match self.held_since {
            None => {
                self.held_since = Some(now);
                self.last_fired = now;
                true
            }
            Some(since) => {
                let repeating = now - since >= REPEAT_DELAY;
                if repeating && now - self.last_fired >= REPEAT_INTERVAL {
                    self.last_fired = now;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Collects arrow-key presses once per frame
pub struct InputManager {
    keys: [KeyRepeat; 4],
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            keys: Default::default(),
        }
    }

    /// Samples the keyboard and returns this frame's presses, in `Direction::ALL` order.
    ///
    /// A key tapped and released between two frames still yields one step.
    pub fn update(&mut self) -> Vec<Direction> {
        self.update_with(
            |direction| {
                let key = direction.key_code();
                (is_key_down(key), is_key_pressed(key))
            },
            get_time(),
        )
    }

    /// `sample` reports `(down, pressed this frame)` for each direction
    fn update_with(&mut self, sample: impl Fn(Direction) -> (bool, bool), now: f64) -> Vec<Direction> {
        Direction::ALL
            .iter()
            .zip(self.keys.iter_mut())
            .filter_map(|(&direction, key)| {
                let (down, pressed) = sample(direction);
                key.update(down, pressed, now).then_some(direction)
            })
            .collect()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
