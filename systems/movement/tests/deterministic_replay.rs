use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use voxel_tactics_core::{
    AnimationTicket, Command, Direction, DirectionResolver, Event, GridPosition, PreviewHandle,
    RenderingPort, Role, SelectorHandle, SolidId, SolidStyle, Team, UnitId, UnitSnapshot,
    WorldDelta,
};
use voxel_tactics_system_movement::{InputOutcome, Movement};
use voxel_tactics_system_terrain::{generate, materialize};
use voxel_tactics_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(42, &scripted_keys());
    let second = replay(42, &scripted_keys());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first
            .inputs
            .iter()
            .any(|record| matches!(record, InputRecord::Confirmed { .. })),
        "script should end with a commit"
    );
}

#[test]
fn replays_with_different_terrain_diverge() {
    let first = replay(42, &scripted_keys());
    let second = replay(43, &scripted_keys());

    assert_ne!(first.terrain_fingerprint, second.terrain_fingerprint);
}

fn replay(seed: u64, keys: &[(u64, &str)]) -> ReplayOutcome {
    let grid = generate(16, seed).expect("valid size");
    let mut renderer = CountingRenderer::default();
    let _terrain = materialize(&grid, &mut renderer);

    let mut hasher = DefaultHasher::new();
    grid.hash(&mut hasher);
    let terrain_fingerprint = hasher.finish();

    let (column, elevation) = grid.columns().next().expect("terrain has ground");
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::InstallTerrain { terrain: grid }, &mut events);
    world::apply(
        &mut world,
        Command::PlaceUnit {
            team: Team::Green,
            role: Role::Support,
            position: column.at_elevation(elevation),
        },
        &mut events,
    );
    let mut log: Vec<EventRecord> = events.iter().map(EventRecord::from).collect();

    let unit = query::unit(&world, UnitId::new(0)).expect("unit placed");
    let mut movement = Movement::default();
    let session = movement
        .begin_control(&unit, &mut renderer)
        .expect("fresh session");

    let mut inputs = Vec::new();
    for (millis, key) in keys {
        let mut commands = Vec::new();
        let outcome = {
            let probe = query::terrain_view(&world);
            movement.handle_key(
                session,
                key,
                Duration::from_millis(*millis),
                &probe,
                &FixedCamera,
                &mut renderer,
                &mut commands,
            )
        };
        inputs.push(InputRecord::from(outcome));

        for command in commands {
            let mut generated = Vec::new();
            world::apply(&mut world, command, &mut generated);
            log.extend(generated.iter().map(EventRecord::from));
        }
    }

    let final_position = query::unit(&world, unit.id).map(|snapshot| snapshot.position);
    ReplayOutcome {
        terrain_fingerprint,
        inputs,
        events: log,
        final_position,
        cues: renderer.cues,
    }
}

fn scripted_keys() -> Vec<(u64, &'static str)> {
    let mut keys = Vec::new();
    let pattern = ["s", "s", "d", "d", "w", "a", "s", "d", "q", "d", "s"];
    let mut now = 0;
    for key in pattern {
        keys.push((now, key));
        keys.push((now + 20, key));
        now += 160;
    }
    keys.push((now, " "));
    keys
}

struct FixedCamera;

impl DirectionResolver for FixedCamera {
    fn resolve(&self, direction: Direction) -> WorldDelta {
        match direction {
            Direction::Up => WorldDelta::new(0, -1),
            Direction::Down => WorldDelta::new(0, 1),
            Direction::Left => WorldDelta::new(-1, 0),
            Direction::Right => WorldDelta::new(1, 0),
        }
    }
}

#[derive(Debug, Default)]
struct CountingRenderer {
    next_handle: u64,
    cues: u32,
}

impl CountingRenderer {
    fn allocate(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl RenderingPort for CountingRenderer {
    fn add_solid(&mut self, _position: GridPosition, _style: SolidStyle) -> SolidId {
        SolidId::new(self.allocate())
    }

    fn remove_solid(&mut self, _solid: SolidId) {}

    fn add_selector(&mut self, _unit: &UnitSnapshot) -> SelectorHandle {
        SelectorHandle::new(self.allocate())
    }

    fn remove_selector(&mut self, _selector: SelectorHandle) {}

    fn add_preview(&mut self, _unit: &UnitSnapshot) -> PreviewHandle {
        PreviewHandle::new(self.allocate())
    }

    fn remove_preview(&mut self, _preview: PreviewHandle) {}

    fn animate_preview(
        &mut self,
        _preview: PreviewHandle,
        _from: GridPosition,
        _to: GridPosition,
        _duration: Duration,
    ) -> AnimationTicket {
        AnimationTicket::new(self.allocate())
    }

    fn cancel_animation(&mut self, _ticket: AnimationTicket) {}

    fn play_move_cue(&mut self) {
        self.cues += 1;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    terrain_fingerprint: u64,
    inputs: Vec<InputRecord>,
    events: Vec<EventRecord>,
    final_position: Option<GridPosition>,
    cues: u32,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum InputRecord {
    Ignored,
    Suppressed,
    Rejected,
    Accepted { destination: GridPosition },
    Settled { position: GridPosition },
    Confirmed { position: GridPosition },
    Cancelled,
    Stale,
}

impl From<InputOutcome> for InputRecord {
    fn from(outcome: InputOutcome) -> Self {
        match outcome {
            InputOutcome::Ignored => Self::Ignored,
            InputOutcome::Suppressed => Self::Suppressed,
            InputOutcome::Rejected(_) => Self::Rejected,
            InputOutcome::Accepted { destination, .. } => Self::Accepted { destination },
            InputOutcome::Settled { position } => Self::Settled { position },
            InputOutcome::Confirmed { position, .. } => Self::Confirmed { position },
            InputOutcome::Cancelled { .. } => Self::Cancelled,
            InputOutcome::Stale => Self::Stale,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    TerrainInstalled { size: u32, present_columns: usize },
    UnitPlaced { unit: UnitId, position: GridPosition },
    Rejected,
    UnitMoved { unit: UnitId, from: GridPosition, to: GridPosition },
    UnitRemoved { unit: UnitId },
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        match event {
            Event::TerrainInstalled {
                size,
                present_columns,
            } => Self::TerrainInstalled {
                size: *size,
                present_columns: *present_columns,
            },
            Event::UnitPlaced { unit, position, .. } => Self::UnitPlaced {
                unit: *unit,
                position: *position,
            },
            Event::TerrainInstallRejected { .. }
            | Event::UnitPlacementRejected { .. }
            | Event::UnitCommitRejected { .. }
            | Event::UnitRemovalRejected { .. } => Self::Rejected,
            Event::UnitMoved { unit, from, to } => Self::UnitMoved {
                unit: *unit,
                from: *from,
                to: *to,
            },
            Event::UnitRemoved { unit } => Self::UnitRemoved { unit: *unit },
        }
    }
}
