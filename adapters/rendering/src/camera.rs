use glam::IVec2;
use voxel_tactics_core::{Direction, DirectionResolver, WorldDelta};

/// Camera orbit expressed in quarter turns around the board.
///
/// Screen directions are resolved against the current orbit so that "up"
/// always walks away from the viewer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CameraRotation {
    quarter_turns: u8,
}

impl CameraRotation {
    /// Creates a rotation after `quarter_turns` counter-clockwise turns.
    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self {
            quarter_turns: quarter_turns % 4,
        }
    }

    /// Number of counter-clockwise quarter turns applied, in `0..4`.
    #[must_use]
    pub const fn quarter_turns(&self) -> u8 {
        self.quarter_turns
    }

    /// Orbits the camera one quarter turn counter-clockwise.
    pub fn rotate_counter_clockwise(&mut self) {
        self.quarter_turns = (self.quarter_turns + 1) % 4;
    }

    /// Orbits the camera one quarter turn clockwise.
    pub fn rotate_clockwise(&mut self) {
        self.quarter_turns = (self.quarter_turns + 3) % 4;
    }
}

fn base_delta(direction: Direction) -> IVec2 {
    match direction {
        Direction::Up => IVec2::new(0, -1),
        Direction::Down => IVec2::new(0, 1),
        Direction::Left => IVec2::new(-1, 0),
        Direction::Right => IVec2::new(1, 0),
    }
}

impl DirectionResolver for CameraRotation {
    fn resolve(&self, direction: Direction) -> WorldDelta {
        let mut delta = base_delta(direction);
        for _ in 0..self.quarter_turns {
            delta = delta.perp();
        }
        WorldDelta::new(delta.x, delta.y)
    }
}
