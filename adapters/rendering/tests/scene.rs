use std::time::Duration;

use voxel_tactics_core::{Command, GridPosition, HeightGrid, Role, Team, UnitId};
use voxel_tactics_rendering::{CameraRotation, SceneRecorder};
use voxel_tactics_system_movement::{InputOutcome, Movement};
use voxel_tactics_system_terrain::{generate, materialize};
use voxel_tactics_world::{self as world, query, World};

#[test]
fn materialized_terrain_fills_and_clears_the_scene() {
    let grid = generate(10, 3).expect("valid size");
    let mut scene = SceneRecorder::new();

    let terrain = materialize(&grid, &mut scene);
    let summary = scene.summary();
    assert_eq!(summary.solids, terrain.solids().len());
    assert_eq!(summary.surfaces, grid.present_columns());
    assert!(scene
        .solids()
        .all(|solid| grid.elevation(solid.position.column()).is_some()));

    terrain.teardown(&mut scene);
    assert_eq!(scene.summary().solids, 0);
}

#[test]
fn rotated_camera_steers_the_preview() {
    let terrain = HeightGrid::from_elevations(3, 0, vec![Some(1); 9]).expect("valid terrain");
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::InstallTerrain { terrain }, &mut events);
    world::apply(
        &mut world,
        Command::PlaceUnit {
            team: Team::Blue,
            role: Role::Support,
            position: GridPosition::new(1, 1, 1),
        },
        &mut events,
    );
    let unit = query::unit(&world, UnitId::new(0)).expect("unit placed");

    let mut scene = SceneRecorder::new();
    let mut movement = Movement::default();
    let session = movement
        .begin_control(&unit, &mut scene)
        .expect("fresh session");
    let camera = CameraRotation::new(1);

    let probe = query::terrain_view(&world);
    let outcome =
        movement.handle_directional_input(session, "w", Duration::ZERO, &probe, &camera, &mut scene);
    let InputOutcome::Accepted { ticket, destination } = outcome else {
        panic!("expected accepted step, got {outcome:?}");
    };
    assert_eq!(destination, GridPosition::new(2, 1, 1));
    assert_eq!(scene.selected_units().collect::<Vec<_>>(), vec![unit.id]);

    let animation = scene.finish_animation(ticket).expect("animation running");
    assert_eq!(animation.to, destination);
    assert_eq!(
        movement.complete_animation(session, ticket),
        InputOutcome::Settled {
            position: destination
        }
    );
    assert_eq!(
        scene.previews().map(|preview| preview.position).collect::<Vec<_>>(),
        vec![destination]
    );
    assert_eq!(scene.cues(), 1);
}
