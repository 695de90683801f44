#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Voxel Tactics engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Systems never touch presentation directly: they reach the renderer
//! through [`RenderingPort`], the camera through [`DirectionResolver`] and the
//! terrain through [`CollisionProbe`].

use std::{ops::RangeInclusive, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Voxel Tactics.";

/// Lowest elevation that still counts as ground.
pub const DEFAULT_BASELINE: i32 = 0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Installs the terrain that backs collision queries for the session.
    InstallTerrain {
        /// Height grid produced by the terrain generator.
        terrain: HeightGrid,
    },
    /// Requests that a new unit be placed on the terrain.
    PlaceUnit {
        /// Team the unit fights for.
        team: Team,
        /// Cosmetic role of the unit.
        role: Role,
        /// Cell the unit rests on.
        position: GridPosition,
    },
    /// Commits the outcome of a confirmed move session to the unit.
    CommitUnitPosition {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Position confirmed by the player.
        position: GridPosition,
    },
    /// Removes a unit from the roster.
    RemoveUnit {
        /// Identifier of the unit to remove.
        unit: UnitId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a terrain was installed.
    TerrainInstalled {
        /// Edge length of the installed grid.
        size: u32,
        /// Number of columns that carry ground.
        present_columns: usize,
    },
    /// Reports that a terrain install was refused.
    TerrainInstallRejected {
        /// Specific reason the install failed.
        reason: TerrainInstallError,
    },
    /// Confirms that a unit joined the roster.
    UnitPlaced {
        /// Identifier assigned by the world.
        unit: UnitId,
        /// Team the unit fights for.
        team: Team,
        /// Cosmetic role of the unit.
        role: Role,
        /// Cell the unit rests on.
        position: GridPosition,
    },
    /// Reports that a placement request was rejected.
    UnitPlacementRejected {
        /// Team requested for the unit.
        team: Team,
        /// Role requested for the unit.
        role: Role,
        /// Position provided in the request.
        position: GridPosition,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a unit's authoritative position changed.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Position before the commit.
        from: GridPosition,
        /// Position after the commit.
        to: GridPosition,
    },
    /// Reports that a commit could not be applied.
    UnitCommitRejected {
        /// Identifier named in the commit.
        unit: UnitId,
        /// Specific reason the commit failed.
        reason: CommitError,
    },
    /// Confirms that a unit left the roster.
    UnitRemoved {
        /// Identifier of the removed unit.
        unit: UnitId,
    },
    /// Reports that a removal could not be applied.
    UnitRemovalRejected {
        /// Identifier named in the removal.
        unit: UnitId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
}

/// Teams a unit may belong to. The team doubles as the unit's body color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// Blue team.
    Blue,
    /// Red team.
    Red,
    /// Green team.
    Green,
    /// Yellow team.
    Yellow,
}

impl Team {
    /// Every team in roster order.
    pub const ALL: [Team; 4] = [Team::Blue, Team::Red, Team::Green, Team::Yellow];
}

/// Unit roles. Roles only change the accent drawn around a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Damage dealer.
    Striker,
    /// Front-line defender.
    Guardian,
    /// Healer and utility.
    Support,
}

impl Role {
    /// Every role in roster order.
    pub const ALL: [Role; 3] = [Role::Striker, Role::Guardian, Role::Support];
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Horizontal location of a terrain column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnCoord {
    x: i32,
    z: i32,
}

impl ColumnCoord {
    /// Creates a new column coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Zero-based index along the x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based index along the z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the column reached by applying `delta`.
    #[must_use]
    pub const fn offset(self, delta: WorldDelta) -> Self {
        Self {
            x: self.x.saturating_add(delta.dx()),
            z: self.z.saturating_add(delta.dz()),
        }
    }

    /// Lifts the column to a full position resting at `elevation`.
    #[must_use]
    pub const fn at_elevation(self, elevation: i32) -> GridPosition {
        GridPosition::new(self.x, elevation, self.z)
    }
}

/// Integer cell position. `y` is the elevation the occupant rests on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    x: i32,
    y: i32,
    z: i32,
}

impl GridPosition {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Index along the x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Elevation of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Index along the z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Column that contains the position.
    #[must_use]
    pub const fn column(&self) -> ColumnCoord {
        ColumnCoord::new(self.x, self.z)
    }
}

/// Screen-relative movement directions produced by the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Away from the viewer.
    Up,
    /// Toward the viewer.
    Down,
    /// Toward the viewer's left.
    Left,
    /// Toward the viewer's right.
    Right,
}

/// Single-cell displacement along the horizontal world axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldDelta {
    dx: i32,
    dz: i32,
}

impl WorldDelta {
    /// Creates a new displacement.
    #[must_use]
    pub const fn new(dx: i32, dz: i32) -> Self {
        Self { dx, dz }
    }

    /// Displacement along the x axis.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Displacement along the z axis.
    #[must_use]
    pub const fn dz(&self) -> i32 {
        self.dz
    }
}

/// Reasons a unit placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// No terrain has been installed yet.
    NoTerrain,
    /// The requested column lies outside the terrain grid.
    OutOfBounds,
    /// The requested column is a hole in the terrain.
    NoGround,
    /// The requested elevation does not match the top of the column.
    Floating,
}

/// Reasons a position commit may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitError {
    /// No unit with the provided identifier exists.
    MissingUnit,
}

/// Reasons a unit removal may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No unit with the provided identifier exists.
    MissingUnit,
}

/// Reasons a terrain install may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainInstallError {
    /// The session already has terrain; grids are installed once.
    AlreadyInstalled,
}

/// Errors raised while constructing a [`HeightGrid`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HeightGridError {
    /// Grids must contain at least one column.
    #[error("height grid size must be positive")]
    ZeroSize,
    /// The number of elevations does not match `size * size`.
    #[error("expected {expected} elevations, received {actual}")]
    LengthMismatch {
        /// Number of cells implied by the size.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },
    /// A present column sits below the baseline.
    #[error("column ({}, {}) has elevation {elevation} below baseline {baseline}", .column.x(), .column.z())]
    BelowBaseline {
        /// Offending column.
        column: ColumnCoord,
        /// Elevation supplied for the column.
        elevation: i32,
        /// Baseline of the grid.
        baseline: i32,
    },
}

/// Square grid of column heights. A `None` entry is a hole in the terrain.
///
/// Elevations are stored x-major: the cell for column `(x, z)` lives at
/// `x * size + z`. Present elevations are never below the baseline, and
/// deserialized grids are validated the same way as constructed ones.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawHeightGrid")]
pub struct HeightGrid {
    size: u32,
    baseline: i32,
    elevations: Vec<Option<i32>>,
}

/// Unvalidated wire layout of a [`HeightGrid`].
#[derive(Deserialize)]
struct RawHeightGrid {
    size: u32,
    baseline: i32,
    elevations: Vec<Option<i32>>,
}

impl TryFrom<RawHeightGrid> for HeightGrid {
    type Error = HeightGridError;

    fn try_from(raw: RawHeightGrid) -> Result<Self, Self::Error> {
        Self::from_elevations(raw.size, raw.baseline, raw.elevations)
    }
}

impl HeightGrid {
    /// Validates and wraps raw elevations laid out x-major.
    pub fn from_elevations(
        size: u32,
        baseline: i32,
        elevations: Vec<Option<i32>>,
    ) -> Result<Self, HeightGridError> {
        if size == 0 {
            return Err(HeightGridError::ZeroSize);
        }

        let edge = usize::try_from(size).unwrap_or(usize::MAX);
        let expected = edge.saturating_mul(edge);
        if elevations.len() != expected {
            return Err(HeightGridError::LengthMismatch {
                expected,
                actual: elevations.len(),
            });
        }

        for (index, elevation) in elevations.iter().enumerate() {
            if let Some(elevation) = *elevation {
                if elevation < baseline {
                    let x = i32::try_from(index / edge).unwrap_or(i32::MAX);
                    let z = i32::try_from(index % edge).unwrap_or(i32::MAX);
                    return Err(HeightGridError::BelowBaseline {
                        column: ColumnCoord::new(x, z),
                        elevation,
                        baseline,
                    });
                }
            }
        }

        Ok(Self {
            size,
            baseline,
            elevations,
        })
    }

    /// Edge length of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Lowest elevation counted as ground.
    #[must_use]
    pub const fn baseline(&self) -> i32 {
        self.baseline
    }

    /// Top solid elevation of a column, or `None` for holes and out-of-bounds columns.
    #[must_use]
    pub fn elevation(&self, column: ColumnCoord) -> Option<i32> {
        self.index(column)
            .and_then(|index| self.elevations.get(index).copied().flatten())
    }

    /// Reports whether the column lies inside the grid bounds.
    #[must_use]
    pub fn contains(&self, column: ColumnCoord) -> bool {
        self.index(column).is_some()
    }

    /// Every solid level of a column, from the baseline to the top inclusive.
    #[must_use]
    pub fn column_levels(&self, column: ColumnCoord) -> Option<RangeInclusive<i32>> {
        self.elevation(column)
            .map(|elevation| self.baseline..=elevation)
    }

    /// Iterates over present columns in x-major order.
    pub fn columns(&self) -> impl Iterator<Item = (ColumnCoord, i32)> + '_ {
        let edge = usize::try_from(self.size).unwrap_or(usize::MAX);
        self.elevations
            .iter()
            .enumerate()
            .filter_map(move |(index, elevation)| {
                let elevation = (*elevation)?;
                let x = i32::try_from(index / edge).ok()?;
                let z = i32::try_from(index % edge).ok()?;
                Some((ColumnCoord::new(x, z), elevation))
            })
    }

    /// Number of columns that carry ground.
    #[must_use]
    pub fn present_columns(&self) -> usize {
        self.elevations.iter().filter(|cell| cell.is_some()).count()
    }

    fn index(&self, column: ColumnCoord) -> Option<usize> {
        let x = u32::try_from(column.x()).ok()?;
        let z = u32::try_from(column.z()).ok()?;
        if x < self.size && z < self.size {
            let x = usize::try_from(x).ok()?;
            let z = usize::try_from(z).ok()?;
            let edge = usize::try_from(self.size).ok()?;
            Some(x * edge + z)
        } else {
            None
        }
    }
}

impl CollisionProbe for HeightGrid {
    fn solid_height_at(&self, column: ColumnCoord) -> Option<i32> {
        self.elevation(column)
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Team the unit fights for.
    pub team: Team,
    /// Cosmetic role of the unit.
    pub role: Role,
    /// Authoritative position of the unit.
    pub position: GridPosition,
}

/// Read-only snapshot describing every unit on the board.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for a unit.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&unit, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Answers whether solid ground exists beneath a column.
pub trait CollisionProbe {
    /// Elevation of the top solid cell in the column, or `None` when the
    /// column is a hole or lies outside the generated grid.
    fn solid_height_at(&self, column: ColumnCoord) -> Option<i32>;
}

/// Converts screen-relative directions into world displacements using the
/// current camera orientation.
pub trait DirectionResolver {
    /// Resolves `direction` for the camera's current orientation.
    fn resolve(&self, direction: Direction) -> WorldDelta;
}

/// Visual treatment requested for a terrain solid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolidStyle {
    /// Topmost solid of a column.
    Surface,
    /// Solid stacked beneath the surface to fill the column.
    Fill,
}

/// Opaque handle to a solid materialised by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolidId(u64);

impl SolidId {
    /// Wraps a renderer-allocated value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Opaque handle to a translucent move preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewHandle(u64);

impl PreviewHandle {
    /// Wraps a renderer-allocated value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Opaque handle to the selector overlay drawn around a controlled unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorHandle(u64);

impl SelectorHandle {
    /// Wraps a renderer-allocated value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Opaque handle to a running preview animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationTicket(u64);

impl AnimationTicket {
    /// Wraps a renderer-allocated value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the ticket.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Side-effecting presentation surface consumed by the simulation.
///
/// None of the return values carry simulation meaning; handles exist only so
/// the caller can tear down what it created.
pub trait RenderingPort {
    /// Materialises one solid cell.
    fn add_solid(&mut self, position: GridPosition, style: SolidStyle) -> SolidId;

    /// Removes a previously materialised solid.
    fn remove_solid(&mut self, solid: SolidId);

    /// Draws the selector overlay around a unit.
    fn add_selector(&mut self, unit: &UnitSnapshot) -> SelectorHandle;

    /// Removes a selector overlay.
    fn remove_selector(&mut self, selector: SelectorHandle);

    /// Spawns a translucent preview of a unit at its current position.
    fn add_preview(&mut self, unit: &UnitSnapshot) -> PreviewHandle;

    /// Removes a preview.
    fn remove_preview(&mut self, preview: PreviewHandle);

    /// Starts interpolating a preview between two cells over `duration`.
    fn animate_preview(
        &mut self,
        preview: PreviewHandle,
        from: GridPosition,
        to: GridPosition,
        duration: Duration,
    ) -> AnimationTicket;

    /// Stops a running animation. Unknown or finished tickets are ignored.
    fn cancel_animation(&mut self, ticket: AnimationTicket);

    /// Plays the audible cue that accompanies a move.
    fn play_move_cue(&mut self);
}
