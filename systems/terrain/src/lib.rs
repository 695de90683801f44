#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic terrain generation system.
//!
//! Elevations are derived from a coherent noise field sampled once per grid
//! column. The same `(size, seed)` pair always yields the same [`HeightGrid`].
//! Columns whose sampled elevation falls below the baseline become holes
//! rather than being clamped upward, so the terrain keeps its gaps.

use noise::{NoiseFn, Perlin};
use thiserror::Error;
use tracing::{debug, info};
use voxel_tactics_core::{
    HeightGrid, HeightGridError, RenderingPort, SolidId, SolidStyle, DEFAULT_BASELINE,
};

/// Coherent two-dimensional noise field.
pub trait NoiseSource {
    /// Samples the field. Values are expected in `[-1, 1]`; anything outside
    /// is clamped by the generator.
    fn sample(&self, x: f64, y: f64) -> f64;
}

impl<F> NoiseSource for F
where
    F: Fn(f64, f64) -> f64,
{
    fn sample(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// Perlin noise seeded once from a 64-bit terrain seed.
#[derive(Clone, Debug)]
pub struct PerlinNoise {
    seed: u64,
    perlin: Perlin,
}

impl PerlinNoise {
    /// Creates a noise field for the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            perlin: Perlin::new(fold_seed(seed)),
        }
    }

    /// Seed the field was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl NoiseSource for PerlinNoise {
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.perlin.get([x, y])
    }
}

fn fold_seed(seed: u64) -> u32 {
    ((seed >> 32) ^ (seed & 0xffff_ffff)) as u32
}

/// Shape parameters for the generated terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainTuning {
    /// Divisor applied to grid coordinates before sampling; larger values give smoother hills.
    pub smoothing: f64,
    /// Scale applied to the absolute noise value.
    pub amplitude: f64,
    /// Amount subtracted after scaling; anything that lands below zero becomes a hole.
    pub offset: f64,
    /// Lowest elevation counted as ground.
    pub baseline: i32,
}

impl Default for TerrainTuning {
    fn default() -> Self {
        Self {
            smoothing: 10.0,
            amplitude: 8.0,
            offset: 1.0,
            baseline: DEFAULT_BASELINE,
        }
    }
}

/// Errors reported before a terrain is generated.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TerrainError {
    /// Terrain must have at least one column per edge.
    #[error("terrain size must be positive")]
    ZeroSize,
    /// Terrain edges must be addressable with signed grid coordinates.
    #[error("terrain size {size} exceeds the addressable grid")]
    SizeTooLarge {
        /// Requested edge length.
        size: u32,
    },
    /// A tuning value is unusable.
    #[error("terrain tuning field `{field}` has invalid value {value}")]
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        value: f64,
    },
    /// The generated elevations failed grid validation.
    #[error(transparent)]
    Grid(#[from] HeightGridError),
}

/// Builds height grids from a noise source.
#[derive(Clone, Debug)]
pub struct TerrainGenerator<N> {
    noise: N,
    tuning: TerrainTuning,
}

impl<N> TerrainGenerator<N>
where
    N: NoiseSource,
{
    /// Creates a generator that samples `noise` with the provided tuning.
    #[must_use]
    pub const fn new(noise: N, tuning: TerrainTuning) -> Self {
        Self { noise, tuning }
    }

    /// Shape parameters used by the generator.
    #[must_use]
    pub const fn tuning(&self) -> &TerrainTuning {
        &self.tuning
    }

    /// Generates a `size × size` height grid.
    pub fn generate(&self, size: u32) -> Result<HeightGrid, TerrainError> {
        self.validate(size)?;

        let edge = usize::try_from(size).map_err(|_| TerrainError::SizeTooLarge { size })?;
        let mut elevations = Vec::with_capacity(edge.saturating_mul(edge));
        for i in 0..size {
            for j in 0..size {
                let raw = self.sample_raw_elevation(i, j);
                let elevation = self.tuning.baseline.saturating_add(raw);
                if elevation < self.tuning.baseline {
                    elevations.push(None);
                } else {
                    elevations.push(Some(elevation));
                }
            }
        }

        let grid = HeightGrid::from_elevations(size, self.tuning.baseline, elevations)?;
        debug!(
            size,
            present_columns = grid.present_columns(),
            "terrain elevations sampled"
        );
        Ok(grid)
    }

    /// Elevation of column `(i, j)` relative to the baseline, before holes are
    /// carved. Negative values mark holes.
    #[must_use]
    pub fn sample_raw_elevation(&self, i: u32, j: u32) -> i32 {
        let x = f64::from(i) / self.tuning.smoothing;
        let y = f64::from(j) / self.tuning.smoothing;
        let value = self.noise.sample(x, y).clamp(-1.0, 1.0);
        round_half_up(value.abs() * self.tuning.amplitude - self.tuning.offset)
    }

    fn validate(&self, size: u32) -> Result<(), TerrainError> {
        if size == 0 {
            return Err(TerrainError::ZeroSize);
        }
        if i32::try_from(size).is_err() {
            return Err(TerrainError::SizeTooLarge { size });
        }

        let TerrainTuning {
            smoothing,
            amplitude,
            offset,
            ..
        } = self.tuning;
        if !smoothing.is_finite() || smoothing <= 0.0 {
            return Err(TerrainError::InvalidTuning {
                field: "smoothing",
                value: smoothing,
            });
        }
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(TerrainError::InvalidTuning {
                field: "amplitude",
                value: amplitude,
            });
        }
        if !offset.is_finite() {
            return Err(TerrainError::InvalidTuning {
                field: "offset",
                value: offset,
            });
        }
        Ok(())
    }
}

// Halves round toward positive infinity, so -0.5 lands on 0 rather than -1.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Generates the default terrain for `(size, seed)` using Perlin noise.
pub fn generate(size: u32, seed: u64) -> Result<HeightGrid, TerrainError> {
    let generator = TerrainGenerator::new(PerlinNoise::new(seed), TerrainTuning::default());
    let grid = generator.generate(size)?;
    info!(
        size,
        seed,
        present_columns = grid.present_columns(),
        "terrain generated"
    );
    Ok(grid)
}

/// Solids created on the renderer for a terrain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterializedTerrain {
    solids: Vec<SolidId>,
}

impl MaterializedTerrain {
    /// Handles of every solid, in creation order.
    #[must_use]
    pub fn solids(&self) -> &[SolidId] {
        &self.solids
    }

    /// Removes every solid from the renderer.
    pub fn teardown<R>(self, renderer: &mut R)
    where
        R: RenderingPort,
    {
        for solid in self.solids {
            renderer.remove_solid(solid);
        }
    }
}

/// Asks the renderer to build a solid pillar for every present column.
///
/// Each pillar fills every level from the baseline up to one below the top
/// with [`SolidStyle::Fill`] and caps it with a [`SolidStyle::Surface`] solid,
/// so no column ever floats.
pub fn materialize<R>(grid: &HeightGrid, renderer: &mut R) -> MaterializedTerrain
where
    R: RenderingPort,
{
    let mut solids = Vec::new();
    for (column, top) in grid.columns() {
        for level in grid.column_levels(column).into_iter().flatten() {
            let style = if level == top {
                SolidStyle::Surface
            } else {
                SolidStyle::Fill
            };
            solids.push(renderer.add_solid(column.at_elevation(level), style));
        }
    }
    debug!(solids = solids.len(), "terrain materialized");
    MaterializedTerrain { solids }
}
