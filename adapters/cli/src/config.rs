//! TOML configuration for the command-line adapter.
//!
//! Every table and key is optional; anything left out falls back to the
//! defaults of the system it configures.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use voxel_tactics_system_bootstrap::RosterTuning;
use voxel_tactics_system_movement::{KeyBindings, MovementTuning};
use voxel_tactics_system_terrain::TerrainTuning;

/// Parsed configuration file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) terrain: TerrainSection,
    pub(crate) movement: MovementSection,
    pub(crate) keys: KeysSection,
    pub(crate) roster: RosterSection,
}

/// `[terrain]` table.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TerrainSection {
    pub(crate) size: Option<u32>,
    pub(crate) seed: Option<u64>,
    smoothing: Option<f64>,
    amplitude: Option<f64>,
    offset: Option<f64>,
    baseline: Option<i32>,
}

/// `[movement]` table.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MovementSection {
    step_window_ms: Option<u64>,
}

/// `[keys]` table.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct KeysSection {
    up: Option<String>,
    down: Option<String>,
    left: Option<String>,
    right: Option<String>,
    confirm: Option<String>,
}

/// `[roster]` table.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RosterSection {
    units_per_team: Option<u32>,
}

impl Config {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Parses configuration from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration toml contents")
    }

    pub(crate) fn terrain_tuning(&self) -> TerrainTuning {
        let defaults = TerrainTuning::default();
        let section = &self.terrain;
        TerrainTuning {
            smoothing: section.smoothing.unwrap_or(defaults.smoothing),
            amplitude: section.amplitude.unwrap_or(defaults.amplitude),
            offset: section.offset.unwrap_or(defaults.offset),
            baseline: section.baseline.unwrap_or(defaults.baseline),
        }
    }

    pub(crate) fn movement_tuning(&self) -> MovementTuning {
        self.movement
            .step_window_ms
            .map_or_else(MovementTuning::default, |millis| MovementTuning {
                step_window: Duration::from_millis(millis),
            })
    }

    pub(crate) fn key_bindings(&self) -> Result<KeyBindings> {
        let defaults = KeyBindings::default();
        let keys = &self.keys;
        KeyBindings::new(
            keys.up.as_deref().unwrap_or(defaults.up()),
            keys.down.as_deref().unwrap_or(defaults.down()),
            keys.left.as_deref().unwrap_or(defaults.left()),
            keys.right.as_deref().unwrap_or(defaults.right()),
            keys.confirm.as_deref().unwrap_or(defaults.confirm()),
        )
        .context("invalid [keys] table")
    }

    pub(crate) fn roster_tuning(&self) -> RosterTuning {
        self.roster
            .units_per_team
            .map_or_else(RosterTuning::default, |units_per_team| RosterTuning {
                units_per_team,
            })
    }
}
