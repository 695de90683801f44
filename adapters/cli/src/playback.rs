//! Scripted key playback against a single movement session.
//!
//! The host side of the animation loop lives here: the scene recorder is
//! stepped forward as scripted time passes, and finished animations are
//! reported back to the movement system through its completion callback.

use std::{fmt, time::Duration};

use anyhow::{Context, Result};
use tracing::{debug, info};
use voxel_tactics_core::{AnimationTicket, Command, Event, GridPosition, UnitSnapshot};
use voxel_tactics_rendering::{CameraRotation, SceneRecorder, WorldMapping};
use voxel_tactics_system_movement::{InputOutcome, Movement, SessionId};
use voxel_tactics_world::{self as world, query, World};

/// Token that stands for the space bar in key scripts.
const SPACE_TOKEN: &str = "space";

/// Splits a whitespace-separated key script into key identifiers.
pub(crate) fn parse_key_script(script: &str) -> Vec<String> {
    script
        .split_whitespace()
        .map(|token| {
            if token.eq_ignore_ascii_case(SPACE_TOKEN) {
                " ".to_owned()
            } else {
                token.to_owned()
            }
        })
        .collect()
}

/// Tally of what happened while replaying a key script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PlaybackReport {
    pub(crate) accepted: u32,
    pub(crate) rejected: u32,
    pub(crate) suppressed: u32,
    pub(crate) ignored: u32,
    pub(crate) committed: Option<GridPosition>,
    pub(crate) cancelled: bool,
}

impl fmt::Display for PlaybackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} accepted, {} rejected, {} suppressed, {} ignored",
            self.accepted, self.rejected, self.suppressed, self.ignored
        )?;
        match (self.committed, self.cancelled) {
            (Some(position), _) => write!(
                f,
                "; committed to ({}, {}, {})",
                position.x(),
                position.y(),
                position.z()
            ),
            (None, true) => write!(f, "; session cancelled"),
            (None, false) => Ok(()),
        }
    }
}

/// Animation started by an accepted step and not yet reported finished.
#[derive(Clone, Copy, Debug)]
struct RunningAnimation {
    ticket: AnimationTicket,
    started: Duration,
    due: Duration,
}

/// Drives one movement session for `unit` with scripted keys spaced
/// `interval` apart. Commits are applied to `world` as they happen; a
/// session still open when the script runs out is cancelled.
#[allow(clippy::too_many_arguments)]
pub(crate) fn play(
    world: &mut World,
    movement: &mut Movement,
    scene: &mut SceneRecorder,
    camera: &CameraRotation,
    mapping: &WorldMapping,
    unit: &UnitSnapshot,
    keys: &[String],
    interval: Duration,
) -> Result<PlaybackReport> {
    let session = movement
        .begin_control(unit, scene)
        .with_context(|| format!("failed to take control of unit {}", unit.id.get()))?;

    let mut report = PlaybackReport::default();
    let mut running: Vec<RunningAnimation> = Vec::new();
    let mut now = Duration::ZERO;

    for key in keys {
        step_animations(movement, scene, mapping, session, &mut running, now);

        let mut commands = Vec::new();
        let outcome = {
            let probe = query::terrain_view(world);
            movement.handle_key(session, key, now, &probe, camera, scene, &mut commands)
        };
        debug!(key = key.as_str(), now_ms = now.as_millis() as u64, ?outcome, "key delivered");

        match outcome {
            InputOutcome::Accepted { ticket, .. } => {
                report.accepted += 1;
                let duration = scene
                    .animation(ticket)
                    .map_or(Duration::ZERO, |animation| animation.duration);
                running.push(RunningAnimation {
                    ticket,
                    started: now,
                    due: now.saturating_add(duration),
                });
            }
            InputOutcome::Rejected(_) => report.rejected += 1,
            InputOutcome::Suppressed => report.suppressed += 1,
            InputOutcome::Ignored => report.ignored += 1,
            InputOutcome::Confirmed { position, .. } => report.committed = Some(position),
            InputOutcome::Settled { .. } | InputOutcome::Cancelled { .. } | InputOutcome::Stale => {}
        }

        apply_commands(world, commands);
        if report.committed.is_some() {
            break;
        }
        now = now.saturating_add(interval);
    }

    if movement.session(session).is_some() {
        report.cancelled = matches!(
            movement.cancel(session, scene),
            InputOutcome::Cancelled { .. }
        );
    }
    Ok(report)
}

/// Reports animations that ran out by `now` back to the movement system and
/// traces where the remaining previews are drawn.
fn step_animations(
    movement: &mut Movement,
    scene: &mut SceneRecorder,
    mapping: &WorldMapping,
    session: SessionId,
    running: &mut Vec<RunningAnimation>,
    now: Duration,
) {
    running.retain(|animation| {
        if animation.due > now {
            if let Some(scene_animation) = scene.animation(animation.ticket) {
                let drawn_at =
                    scene_animation.position_at(mapping, now.saturating_sub(animation.started));
                debug!(ticket = animation.ticket.get(), %drawn_at, "preview in flight");
            }
            return true;
        }
        if scene.finish_animation(animation.ticket).is_some() {
            let outcome = movement.complete_animation(session, animation.ticket);
            debug!(ticket = animation.ticket.get(), ?outcome, "animation finished");
        }
        false
    });
}

fn apply_commands(world: &mut World, commands: Vec<Command>) {
    for command in commands {
        let mut events = Vec::new();
        world::apply(world, command, &mut events);
        for event in events {
            match event {
                Event::UnitMoved { unit, from, to } => {
                    info!(unit = unit.get(), ?from, ?to, "unit moved");
                }
                other => debug!(event = ?other, "world event"),
            }
        }
    }
}
