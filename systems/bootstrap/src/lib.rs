#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Voxel Tactics session.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use voxel_tactics_core::{Command, HeightGrid, Role, Team, UnitView};
use voxel_tactics_world::{query, World};

const ROSTER_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Roster parameters for a fresh session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RosterTuning {
    /// Units placed for every team.
    pub units_per_team: u32,
}

impl Default for RosterTuning {
    fn default() -> Self {
        Self { units_per_team: 2 }
    }
}

/// Produces data required to greet the player and populate the board.
#[derive(Debug, Default)]
pub struct Bootstrap {
    tuning: RosterTuning,
}

impl Bootstrap {
    /// Creates a bootstrap system with explicit roster tuning.
    #[must_use]
    pub const fn new(tuning: RosterTuning) -> Self {
        Self { tuning }
    }

    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the installed terrain for presentation purposes.
    #[must_use]
    pub fn height_grid<'world>(&self, world: &'world World) -> Option<&'world HeightGrid> {
        query::height_grid(world)
    }

    /// Exposes the units currently on the board.
    #[must_use]
    pub fn units(&self, world: &World) -> UnitView {
        query::unit_view(world)
    }

    /// Plans the opening roster for the installed terrain.
    ///
    /// Units are spread over distinct columns chosen by a generator seeded
    /// from `seed`, so the same terrain and seed always yield the same
    /// commands. Teams take turns picking columns; roles cycle within a team.
    /// Planning stops early once every column with ground is taken.
    #[must_use]
    pub fn plan_roster(&self, world: &World, seed: u64) -> Vec<Command> {
        match query::height_grid(world) {
            Some(grid) => plan_roster(grid, seed, self.tuning),
            None => Vec::new(),
        }
    }
}

/// Builds `PlaceUnit` commands for the opening roster on `grid`.
#[must_use]
pub fn plan_roster(grid: &HeightGrid, seed: u64, tuning: RosterTuning) -> Vec<Command> {
    let mut free: Vec<_> = grid.columns().collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ ROSTER_SALT);
    let mut commands = Vec::new();

    'rounds: for round in 0..tuning.units_per_team {
        let role = Role::ALL[round as usize % Role::ALL.len()];
        for team in Team::ALL {
            if free.is_empty() {
                break 'rounds;
            }
            let (column, elevation) = free.swap_remove(rng.gen_range(0..free.len()));
            commands.push(Command::PlaceUnit {
                team,
                role,
                position: column.at_elevation(elevation),
            });
        }
    }

    debug!(
        seed,
        planned = commands.len(),
        available = grid.present_columns(),
        "roster planned"
    );
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barren_terrain_yields_no_roster() {
        let grid = HeightGrid::from_elevations(2, 0, vec![None; 4]).expect("valid grid");
        assert!(plan_roster(&grid, 7, RosterTuning::default()).is_empty());
    }

    #[test]
    fn roster_stops_when_columns_run_out() {
        let grid = HeightGrid::from_elevations(2, 0, vec![Some(0), None, Some(2), Some(1)])
            .expect("valid grid");
        let commands = plan_roster(&grid, 7, RosterTuning { units_per_team: 5 });
        assert_eq!(commands.len(), 3);
    }

    #[test]
    fn roles_cycle_per_round() {
        let grid = HeightGrid::from_elevations(4, 0, vec![Some(1); 16]).expect("valid grid");
        let commands = plan_roster(&grid, 11, RosterTuning { units_per_team: 2 });

        let roles: Vec<_> = commands
            .iter()
            .filter_map(|command| match command {
                Command::PlaceUnit { role, .. } => Some(*role),
                _ => None,
            })
            .collect();
        assert_eq!(roles.len(), 8);
        assert!(roles[..4].iter().all(|role| *role == Role::Striker));
        assert!(roles[4..].iter().all(|role| *role == Role::Guardian));
    }

    #[test]
    fn plan_without_terrain_is_empty() {
        let world = World::new();
        assert!(Bootstrap::default().plan_roster(&world, 3).is_empty());
    }
}
