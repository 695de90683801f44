#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Voxel Tactics adapters.
//!
//! The simulation reaches presentation only through
//! [`RenderingPort`](voxel_tactics_core::RenderingPort). This crate provides a
//! headless implementation of that port ([`SceneRecorder`]), the camera that
//! resolves screen directions ([`CameraRotation`]), the team and role palette,
//! and the mapping from grid cells into world space.

mod camera;
mod recorder;

pub use camera::CameraRotation;
pub use recorder::{SceneAnimation, ScenePreview, SceneRecorder, SceneSolid, SceneSummary};

use glam::{IVec3, Vec3};
use std::{error::Error, fmt};
use voxel_tactics_core::{GridPosition, Role, SolidStyle, Team};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a different opacity.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

/// Opacity of the ghost box that previews a move.
pub const PREVIEW_ALPHA: f32 = 0.5;

/// Fill color of terrain solids.
pub const TERRAIN_COLOR: Color = Color::from_rgb_u8(255, 255, 255);

/// Edge color of terrain solids.
pub const TERRAIN_EDGE_COLOR: Color = Color::from_rgb_u8(0, 0, 0);

/// Body color for a team.
#[must_use]
pub const fn team_color(team: Team) -> Color {
    match team {
        Team::Blue => Color::from_rgb_u8(0, 0, 255),
        Team::Red => Color::from_rgb_u8(255, 0, 0),
        Team::Green => Color::from_rgb_u8(0, 128, 0),
        Team::Yellow => Color::from_rgb_u8(255, 255, 0),
    }
}

/// Edge accent for a role.
#[must_use]
pub const fn role_accent(role: Role) -> Color {
    match role {
        Role::Striker => Color::from_rgb_u8(255, 140, 0),
        Role::Guardian => Color::from_rgb_u8(112, 128, 144),
        Role::Support => Color::from_rgb_u8(255, 255, 255),
    }
}

/// Fill color used for a terrain solid of the given style.
#[must_use]
pub const fn solid_color(style: SolidStyle) -> Color {
    match style {
        SolidStyle::Surface => TERRAIN_COLOR,
        SolidStyle::Fill => Color::from_rgb_u8(230, 230, 230),
    }
}

/// Places grid cells in world space.
///
/// The grid is centred on `origin`: cell `(i, j)` lands at
/// `origin + size / 2 - i` on the x axis and `origin + size / 2 - j` on z.
/// Elevations are offset from the origin unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldMapping {
    origin: IVec3,
    half_size: i32,
    cell_length: f32,
}

impl WorldMapping {
    /// Creates a mapping for a `size × size` grid.
    ///
    /// Returns an error when `cell_length` is not a positive finite number.
    pub fn new(
        size: u32,
        origin: IVec3,
        cell_length: f32,
    ) -> std::result::Result<Self, RenderingError> {
        if !(cell_length.is_finite() && cell_length > 0.0) {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }
        let half_size =
            i32::try_from(size / 2).map_err(|_| RenderingError::GridTooLarge { size })?;

        Ok(Self {
            origin,
            half_size,
            cell_length,
        })
    }

    /// Cell-space coordinate of a grid position.
    #[must_use]
    pub fn to_cell(&self, position: GridPosition) -> IVec3 {
        IVec3::new(
            self.origin.x + self.half_size - position.x(),
            self.origin.y + position.y(),
            self.origin.z + self.half_size - position.z(),
        )
    }

    /// World-space centre of a grid position.
    #[must_use]
    pub fn to_world(&self, position: GridPosition) -> Vec3 {
        self.to_cell(position).as_vec3() * self.cell_length
    }

    /// Linear interpolation between two cells, as drawn while animating.
    #[must_use]
    pub fn interpolate(&self, from: GridPosition, to: GridPosition, progress: f32) -> Vec3 {
        self.to_world(from)
            .lerp(self.to_world(to), progress.clamp(0.0, 1.0))
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Cells must have a positive, finite edge length.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
    /// The grid cannot be centred within the integer cell space.
    GridTooLarge {
        /// Provided grid edge length.
        size: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellLength { cell_length } => {
                write!(
                    f,
                    "cell_length must be positive and finite (received {cell_length})"
                )
            }
            Self::GridTooLarge { size } => {
                write!(f, "grid of size {size} cannot be centred in cell space")
            }
        }
    }
}

impl Error for RenderingError {}
