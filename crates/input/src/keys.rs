use meadow_common::Vector3;

/// Distance the avatar moves per frame and per held direction.
pub const PLAYER_SPEED: f64 = 0.05;

/// The four movement directions, bound to W/S/A/D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    /// Map a typed character to a direction, ignoring case.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Direction::Forward),
            's' => Some(Direction::Back),
            'a' => Some(Direction::Left),
            'd' => Some(Direction::Right),
            _ => None,
        }
    }

    /// Unit step on the ground plane. The camera looks down the (-1, -1, -1)
    /// diagonal, so "forward" on screen is -x, -z in world space.
    fn step(self) -> (f64, f64) {
        match self {
            Direction::Forward => (-1.0, -1.0),
            Direction::Back => (1.0, 1.0),
            Direction::Left => (-1.0, 1.0),
            Direction::Right => (1.0, -1.0),
        }
    }

    fn bit(self) -> u8 {
        match self {
            Direction::Forward => 1,
            Direction::Back => 1 << 1,
            Direction::Left => 1 << 2,
            Direction::Right => 1 << 3,
        }
    }
}

/// Query capability the frame loop reads each tick.
pub trait KeyQuery {
    fn is_held(&self, direction: Direction) -> bool;
}

/// Held-direction set written by key events and read once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    bits: u8,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, direction: Direction) {
        self.bits |= direction.bit();
    }

    pub fn release(&mut self, direction: Direction) {
        self.bits &= !direction.bit();
    }

    /// Apply a key transition.
    pub fn set(&mut self, direction: Direction, pressed: bool) {
        if pressed {
            self.press(direction);
        } else {
            self.release(direction);
        }
        tracing::trace!(?direction, pressed, "key state");
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl KeyQuery for HeldKeys {
    fn is_held(&self, direction: Direction) -> bool {
        self.bits & direction.bit() != 0
    }
}

/// Sum of the steps of every held direction, scaled by `speed`.
pub fn movement_delta(keys: &impl KeyQuery, speed: f64) -> Vector3 {
    let (dx, dz) = Direction::ALL
        .into_iter()
        .filter(|d| keys.is_held(*d))
        .map(Direction::step)
        .fold((0.0, 0.0), |(x, z), (sx, sz)| (x + sx, z + sz));
    Vector3::new(dx * speed, 0.0, dz * speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(directions: &[Direction]) -> HeldKeys {
        let mut keys = HeldKeys::new();
        for d in directions {
            keys.press(*d);
        }
        keys
    }

    #[test]
    fn each_direction_maps_to_isometric_step() {
        let cases = [
            (Direction::Forward, Vector3::new(-0.05, 0.0, -0.05)),
            (Direction::Back, Vector3::new(0.05, 0.0, 0.05)),
            (Direction::Left, Vector3::new(-0.05, 0.0, 0.05)),
            (Direction::Right, Vector3::new(0.05, 0.0, -0.05)),
        ];
        for (direction, expected) in cases {
            assert_eq!(movement_delta(&held(&[direction]), PLAYER_SPEED), expected);
        }
    }

    #[test]
    fn diagonal_combines_steps() {
        let delta = movement_delta(&held(&[Direction::Forward, Direction::Right]), PLAYER_SPEED);
        assert_eq!(delta, Vector3::new(0.0, 0.0, -0.1));
    }

    #[test]
    fn release_clears_direction() {
        let mut keys = held(&[Direction::Left]);
        keys.set(Direction::Left, false);
        assert!(!keys.is_held(Direction::Left));
        assert!(keys.is_empty());
    }

    #[test]
    fn four_forward_ticks_from_spawn() {
        let keys = held(&[Direction::Forward]);
        let mut position = Vector3::new(0.0, 1.0, 0.0);
        for _ in 0..4 {
            position += movement_delta(&keys, PLAYER_SPEED);
        }
        assert!(position.abs_diff_eq(Vector3::new(-0.2, 1.0, -0.2), 1e-12));
    }

    #[test]
    fn chars_map_case_insensitively() {
        assert_eq!(Direction::from_char('W'), Some(Direction::Forward));
        assert_eq!(Direction::from_char('d'), Some(Direction::Right));
        assert_eq!(Direction::from_char('q'), None);
    }

    #[test]
    fn clear_releases_all() {
        let mut keys = held(&Direction::ALL);
        keys.clear();
        assert!(Direction::ALL.iter().all(|d| !keys.is_held(*d)));
    }
}
