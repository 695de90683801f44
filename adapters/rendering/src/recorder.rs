use std::{collections::BTreeMap, fmt, time::Duration};

use glam::Vec3;
use tracing::debug;
use voxel_tactics_core::{
    AnimationTicket, GridPosition, PreviewHandle, RenderingPort, SelectorHandle, SolidId,
    SolidStyle, UnitId, UnitSnapshot,
};

use crate::{
    role_accent, solid_color, team_color, Color, WorldMapping, PREVIEW_ALPHA, TERRAIN_EDGE_COLOR,
};

/// Terrain cell recorded by the [`SceneRecorder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSolid {
    /// Cell occupied by the solid.
    pub position: GridPosition,
    /// Whether the solid caps its column.
    pub style: SolidStyle,
    /// Fill color derived from the style.
    pub color: Color,
    /// Outline color shared by every terrain solid.
    pub edge: Color,
}

/// Translucent ghost of a unit being moved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePreview {
    /// Unit the preview belongs to.
    pub unit: UnitId,
    /// Cell the preview is drawn at.
    pub position: GridPosition,
    /// Body color, the team color at preview opacity.
    pub body: Color,
    /// Edge color, the role accent.
    pub edge: Color,
}

/// Preview animation that has not finished yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneAnimation {
    /// Preview being moved.
    pub preview: PreviewHandle,
    /// Cell the animation starts from.
    pub from: GridPosition,
    /// Cell the animation ends at.
    pub to: GridPosition,
    /// Requested duration.
    pub duration: Duration,
}

impl SceneAnimation {
    /// World-space position of the preview `elapsed` after the animation
    /// started. Zero-length animations are drawn at their target.
    #[must_use]
    pub fn position_at(&self, mapping: &WorldMapping, elapsed: Duration) -> Vec3 {
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f32() / self.duration.as_secs_f32()
        };
        mapping.interpolate(self.from, self.to, progress)
    }
}

/// Headless [`RenderingPort`] that records what a renderer would draw.
#[derive(Debug, Default)]
pub struct SceneRecorder {
    next_handle: u64,
    solids: BTreeMap<SolidId, SceneSolid>,
    selectors: BTreeMap<SelectorHandle, UnitId>,
    previews: BTreeMap<PreviewHandle, ScenePreview>,
    animations: BTreeMap<AnimationTicket, SceneAnimation>,
    cues: u32,
}

impl SceneRecorder {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1);
        handle
    }

    /// Terrain solids currently in the scene.
    pub fn solids(&self) -> impl Iterator<Item = &SceneSolid> {
        self.solids.values()
    }

    /// Move previews currently in the scene.
    pub fn previews(&self) -> impl Iterator<Item = &ScenePreview> {
        self.previews.values()
    }

    /// Looks up a preview by handle.
    #[must_use]
    pub fn preview(&self, preview: PreviewHandle) -> Option<&ScenePreview> {
        self.previews.get(&preview)
    }

    /// Units currently carrying a selector overlay.
    pub fn selected_units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.selectors.values().copied()
    }

    /// Looks up a running animation by ticket.
    #[must_use]
    pub fn animation(&self, ticket: AnimationTicket) -> Option<&SceneAnimation> {
        self.animations.get(&ticket)
    }

    /// Number of move cues played so far.
    #[must_use]
    pub const fn cues(&self) -> u32 {
        self.cues
    }

    /// Finishes a running animation, snapping its preview onto the target
    /// cell. Returns `None` when the ticket is unknown or already finished.
    pub fn finish_animation(&mut self, ticket: AnimationTicket) -> Option<SceneAnimation> {
        let animation = self.animations.remove(&ticket)?;
        if let Some(preview) = self.previews.get_mut(&animation.preview) {
            preview.position = animation.to;
        }
        Some(animation)
    }

    /// Counts what the scene currently shows.
    #[must_use]
    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            solids: self.solids.len(),
            surfaces: self
                .solids
                .values()
                .filter(|solid| solid.style == SolidStyle::Surface)
                .count(),
            previews: self.previews.len(),
            selectors: self.selectors.len(),
            running_animations: self.animations.len(),
            cues: self.cues,
        }
    }
}

impl RenderingPort for SceneRecorder {
    fn add_solid(&mut self, position: GridPosition, style: SolidStyle) -> SolidId {
        let solid = SolidId::new(self.allocate());
        let _ = self.solids.insert(
            solid,
            SceneSolid {
                position,
                style,
                color: solid_color(style),
                edge: TERRAIN_EDGE_COLOR,
            },
        );
        solid
    }

    fn remove_solid(&mut self, solid: SolidId) {
        if self.solids.remove(&solid).is_none() {
            debug!(solid = solid.get(), "removing unknown solid");
        }
    }

    fn add_selector(&mut self, unit: &UnitSnapshot) -> SelectorHandle {
        let selector = SelectorHandle::new(self.allocate());
        let _ = self.selectors.insert(selector, unit.id);
        selector
    }

    fn remove_selector(&mut self, selector: SelectorHandle) {
        if self.selectors.remove(&selector).is_none() {
            debug!(selector = selector.get(), "removing unknown selector");
        }
    }

    fn add_preview(&mut self, unit: &UnitSnapshot) -> PreviewHandle {
        let preview = PreviewHandle::new(self.allocate());
        let _ = self.previews.insert(
            preview,
            ScenePreview {
                unit: unit.id,
                position: unit.position,
                body: team_color(unit.team).with_alpha(PREVIEW_ALPHA),
                edge: role_accent(unit.role),
            },
        );
        preview
    }

    fn remove_preview(&mut self, preview: PreviewHandle) {
        if self.previews.remove(&preview).is_none() {
            debug!(preview = preview.get(), "removing unknown preview");
        }
        self.animations
            .retain(|_, animation| animation.preview != preview);
    }

    fn animate_preview(
        &mut self,
        preview: PreviewHandle,
        from: GridPosition,
        to: GridPosition,
        duration: Duration,
    ) -> AnimationTicket {
        let ticket = AnimationTicket::new(self.allocate());
        let _ = self.animations.insert(
            ticket,
            SceneAnimation {
                preview,
                from,
                to,
                duration,
            },
        );
        ticket
    }

    fn cancel_animation(&mut self, ticket: AnimationTicket) {
        let _ = self.animations.remove(&ticket);
    }

    fn play_move_cue(&mut self) {
        self.cues = self.cues.saturating_add(1);
    }
}

/// Counts of everything a [`SceneRecorder`] currently shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SceneSummary {
    /// Terrain solids of either style.
    pub solids: usize,
    /// Solids capping a column.
    pub surfaces: usize,
    /// Move previews.
    pub previews: usize,
    /// Selector overlays.
    pub selectors: usize,
    /// Animations not yet finished or cancelled.
    pub running_animations: usize,
    /// Move cues played.
    pub cues: u32,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} solids ({} surfaces), {} previews, {} selectors, {} running animations, {} cues",
            self.solids,
            self.surfaces,
            self.previews,
            self.selectors,
            self.running_animations,
            self.cues
        )
    }
}
