#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Voxel Tactics.
//!
//! The world owns the installed terrain and the unit roster. It changes only
//! through [`apply`], and every change is reported back as [`Event`] values.

use tracing::debug;
use voxel_tactics_core::{
    Command, CommitError, Event, GridPosition, HeightGrid, PlacementError, RemovalError, Role,
    Team, TerrainInstallError, UnitId, WELCOME_BANNER,
};

/// Represents the authoritative Voxel Tactics world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    terrain: Option<HeightGrid>,
    units: Vec<Unit>,
    next_unit_id: u32,
}

impl World {
    /// Creates an empty world awaiting terrain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            terrain: None,
            units: Vec::new(),
            next_unit_id: 0,
        }
    }

    fn unit_mut(&mut self, unit: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|candidate| candidate.id == unit)
    }

    fn unit_index(&self, unit: UnitId) -> Option<usize> {
        self.units.iter().position(|candidate| candidate.id == unit)
    }

    fn allocate_unit_id(&mut self) -> UnitId {
        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id = self.next_unit_id.saturating_add(1);
        id
    }

    fn validate_placement(&self, position: GridPosition) -> Result<(), PlacementError> {
        let terrain = self.terrain.as_ref().ok_or(PlacementError::NoTerrain)?;
        let column = position.column();
        if !terrain.contains(column) {
            return Err(PlacementError::OutOfBounds);
        }

        let ground = terrain.elevation(column).ok_or(PlacementError::NoGround)?;
        if ground != position.y() {
            return Err(PlacementError::Floating);
        }

        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::InstallTerrain { terrain } => {
            if world.terrain.is_some() {
                debug!(size = terrain.size(), "terrain reinstall rejected");
                out_events.push(Event::TerrainInstallRejected {
                    reason: TerrainInstallError::AlreadyInstalled,
                });
                return;
            }
            let size = terrain.size();
            let present_columns = terrain.present_columns();
            world.terrain = Some(terrain);
            out_events.push(Event::TerrainInstalled {
                size,
                present_columns,
            });
        }
        Command::PlaceUnit {
            team,
            role,
            position,
        } => match world.validate_placement(position) {
            Ok(()) => {
                let unit = world.allocate_unit_id();
                world.units.push(Unit {
                    id: unit,
                    team,
                    role,
                    position,
                });
                out_events.push(Event::UnitPlaced {
                    unit,
                    team,
                    role,
                    position,
                });
            }
            Err(reason) => {
                debug!(?team, ?role, ?position, ?reason, "unit placement rejected");
                out_events.push(Event::UnitPlacementRejected {
                    team,
                    role,
                    position,
                    reason,
                });
            }
        },
        Command::CommitUnitPosition { unit, position } => {
            if let Some(target) = world.unit_mut(unit) {
                let from = target.position;
                target.position = position;
                out_events.push(Event::UnitMoved {
                    unit,
                    from,
                    to: position,
                });
            } else {
                debug!(unit = unit.get(), "commit for unknown unit rejected");
                out_events.push(Event::UnitCommitRejected {
                    unit,
                    reason: CommitError::MissingUnit,
                });
            }
        }
        Command::RemoveUnit { unit } => {
            if let Some(index) = world.unit_index(unit) {
                let _ = world.units.remove(index);
                out_events.push(Event::UnitRemoved { unit });
            } else {
                debug!(unit = unit.get(), "removal of unknown unit rejected");
                out_events.push(Event::UnitRemovalRejected {
                    unit,
                    reason: RemovalError::MissingUnit,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use voxel_tactics_core::{
        CollisionProbe, ColumnCoord, HeightGrid, UnitId, UnitSnapshot, UnitView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the installed terrain, if any.
    #[must_use]
    pub fn height_grid(world: &World) -> Option<&HeightGrid> {
        world.terrain.as_ref()
    }

    /// Exposes the installed terrain as a collision probe.
    #[must_use]
    pub fn terrain_view(world: &World) -> TerrainView<'_> {
        TerrainView {
            grid: world.terrain.as_ref(),
        }
    }

    /// Captures a read-only view of the units on the board.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.iter().map(|unit| unit.snapshot()).collect())
    }

    /// Captures a single unit, if it exists.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world
            .units
            .iter()
            .find(|candidate| candidate.id == unit)
            .map(|candidate| candidate.snapshot())
    }

    /// Read-only collision view over the installed terrain.
    ///
    /// Before terrain is installed every column reports no ground.
    #[derive(Clone, Copy, Debug)]
    pub struct TerrainView<'a> {
        grid: Option<&'a HeightGrid>,
    }

    impl<'a> TerrainView<'a> {
        /// Edge length of the installed grid, or zero without terrain.
        #[must_use]
        pub fn size(&self) -> u32 {
            self.grid.map_or(0, HeightGrid::size)
        }
    }

    impl CollisionProbe for TerrainView<'_> {
        fn solid_height_at(&self, column: ColumnCoord) -> Option<i32> {
            self.grid.and_then(|grid| grid.elevation(column))
        }
    }
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    team: Team,
    role: Role,
    position: GridPosition,
}

impl Unit {
    fn snapshot(&self) -> voxel_tactics_core::UnitSnapshot {
        voxel_tactics_core::UnitSnapshot {
            id: self.id,
            team: self.team,
            role: self.role,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxel_tactics_core::{CollisionProbe, ColumnCoord};

    fn install_sample_terrain(world: &mut World) -> Vec<Event> {
        let terrain = HeightGrid::from_elevations(
            3,
            0,
            vec![
                Some(1),
                Some(1),
                None,
                Some(0),
                Some(2),
                Some(1),
                Some(1),
                None,
                Some(3),
            ],
        )
        .expect("valid terrain");
        let mut events = Vec::new();
        apply(world, Command::InstallTerrain { terrain }, &mut events);
        events
    }

    fn place(world: &mut World, position: GridPosition) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::PlaceUnit {
                team: Team::Blue,
                role: Role::Striker,
                position,
            },
            &mut events,
        );
        events
    }

    #[test]
    fn install_terrain_reports_size_and_present_columns() {
        let mut world = World::new();
        let events = install_sample_terrain(&mut world);

        assert_eq!(
            events,
            vec![Event::TerrainInstalled {
                size: 3,
                present_columns: 7,
            }]
        );
        assert_eq!(query::terrain_view(&world).size(), 3);
    }

    #[test]
    fn terrain_is_installed_once() {
        let mut world = World::new();
        let terrain = HeightGrid::from_elevations(2, 0, vec![Some(1); 4]).expect("valid terrain");
        let mut events = Vec::new();
        apply(&mut world, Command::InstallTerrain { terrain }, &mut events);
        let placed = place(&mut world, GridPosition::new(0, 1, 0));
        assert!(matches!(placed.as_slice(), [Event::UnitPlaced { .. }]));

        let holes = HeightGrid::from_elevations(2, 0, vec![None; 4]).expect("valid terrain");
        let mut events = Vec::new();
        apply(&mut world, Command::InstallTerrain { terrain: holes }, &mut events);

        assert_eq!(
            events,
            vec![Event::TerrainInstallRejected {
                reason: TerrainInstallError::AlreadyInstalled,
            }]
        );
        assert_eq!(
            query::terrain_view(&world).solid_height_at(ColumnCoord::new(0, 0)),
            Some(1)
        );
        assert_eq!(
            query::unit(&world, UnitId::new(0)).map(|snapshot| snapshot.position),
            Some(GridPosition::new(0, 1, 0))
        );
    }

    #[test]
    fn terrain_view_reports_absent_without_terrain() {
        let world = World::new();
        let view = query::terrain_view(&world);
        assert_eq!(view.size(), 0);
        assert_eq!(view.solid_height_at(ColumnCoord::new(0, 0)), None);
    }

    #[test]
    fn terrain_view_mirrors_installed_grid() {
        let mut world = World::new();
        let _ = install_sample_terrain(&mut world);
        let view = query::terrain_view(&world);

        assert_eq!(view.solid_height_at(ColumnCoord::new(1, 1)), Some(2));
        assert_eq!(view.solid_height_at(ColumnCoord::new(0, 2)), None);
        assert_eq!(view.solid_height_at(ColumnCoord::new(3, 0)), None);
    }

    #[test]
    fn place_unit_allocates_sequential_identifiers() {
        let mut world = World::new();
        let _ = install_sample_terrain(&mut world);

        let first = place(&mut world, GridPosition::new(0, 1, 0));
        let second = place(&mut world, GridPosition::new(1, 2, 1));

        assert!(matches!(
            first.as_slice(),
            [Event::UnitPlaced { unit, .. }] if unit.get() == 0
        ));
        assert!(matches!(
            second.as_slice(),
            [Event::UnitPlaced { unit, .. }] if unit.get() == 1
        ));
        assert_eq!(query::unit_view(&world).into_vec().len(), 2);
    }

    #[test]
    fn place_unit_requires_terrain() {
        let mut world = World::new();
        let events = place(&mut world, GridPosition::new(0, 0, 0));
        assert!(matches!(
            events.as_slice(),
            [Event::UnitPlacementRejected {
                reason: PlacementError::NoTerrain,
                ..
            }]
        ));
    }

    #[test]
    fn place_unit_rejects_out_of_bounds_holes_and_floating_units() {
        let mut world = World::new();
        let _ = install_sample_terrain(&mut world);

        let cases = [
            (GridPosition::new(5, 0, 0), PlacementError::OutOfBounds),
            (GridPosition::new(0, 0, 2), PlacementError::NoGround),
            (GridPosition::new(0, 4, 0), PlacementError::Floating),
        ];

        for (position, expected) in cases {
            let events = place(&mut world, position);
            assert_eq!(
                events,
                vec![Event::UnitPlacementRejected {
                    team: Team::Blue,
                    role: Role::Striker,
                    position,
                    reason: expected,
                }]
            );
        }
        assert!(query::unit_view(&world).into_vec().is_empty());
    }

    #[test]
    fn commit_updates_authoritative_position() {
        let mut world = World::new();
        let _ = install_sample_terrain(&mut world);
        let _ = place(&mut world, GridPosition::new(0, 1, 0));
        let unit = UnitId::new(0);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CommitUnitPosition {
                unit,
                position: GridPosition::new(0, 1, 1),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::UnitMoved {
                unit,
                from: GridPosition::new(0, 1, 0),
                to: GridPosition::new(0, 1, 1),
            }]
        );
        assert_eq!(
            query::unit(&world, unit).map(|snapshot| snapshot.position),
            Some(GridPosition::new(0, 1, 1))
        );
    }

    #[test]
    fn commit_for_missing_unit_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CommitUnitPosition {
                unit: UnitId::new(9),
                position: GridPosition::new(0, 0, 0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::UnitCommitRejected {
                unit: UnitId::new(9),
                reason: CommitError::MissingUnit,
            }]
        );
    }

    #[test]
    fn remove_unit_drops_it_from_the_roster() {
        let mut world = World::new();
        let _ = install_sample_terrain(&mut world);
        let _ = place(&mut world, GridPosition::new(0, 1, 0));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RemoveUnit {
                unit: UnitId::new(0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::UnitRemoved {
                unit: UnitId::new(0),
            }]
        );
        assert!(query::unit(&world, UnitId::new(0)).is_none());
    }

    #[test]
    fn remove_for_missing_unit_is_rejected() {
        let mut world = World::new();
        let _ = install_sample_terrain(&mut world);
        let _ = place(&mut world, GridPosition::new(0, 1, 0));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RemoveUnit {
                unit: UnitId::new(7),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::UnitRemovalRejected {
                unit: UnitId::new(7),
                reason: RemovalError::MissingUnit,
            }]
        );
        assert!(query::unit(&world, UnitId::new(0)).is_some());
    }
}
