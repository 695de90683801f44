#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Keyboard-driven movement sessions for player units.
//!
//! A session moves a translucent preview of a unit one cell at a time. Every
//! directional key passes through the session's [`Debouncer`], is turned into
//! a world displacement by the camera's [`DirectionResolver`] and is checked
//! against the terrain with a [`CollisionProbe`]. Confirming the session emits
//! a [`Command::CommitUnitPosition`] for the world and tears the preview down.
//!
//! Time is supplied by the caller as the elapsed [`Duration`] since an
//! arbitrary origin, which keeps sessions deterministic under replay.

mod debounce;

pub use debounce::Debouncer;

use std::{collections::BTreeMap, fmt, time::Duration};

use thiserror::Error;
use tracing::{debug, info, warn};
use voxel_tactics_core::{
    AnimationTicket, CollisionProbe, ColumnCoord, Command, Direction, DirectionResolver,
    GridPosition, PreviewHandle, RenderingPort, SelectorHandle, UnitId, UnitSnapshot,
};

/// Duration of a single preview step animation. Directional input is gated
/// for the same amount of time.
pub const STEP_DURATION: Duration = Duration::from_millis(150);

/// Timing parameters for movement sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovementTuning {
    /// Length of the step animation and of the input cooldown window.
    pub step_window: Duration,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            step_window: STEP_DURATION,
        }
    }
}

/// Key identifiers recognised by movement sessions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBindings {
    up: String,
    down: String,
    left: String,
    right: String,
    confirm: String,
}

impl KeyBindings {
    /// Creates bindings from explicit key identifiers. Every action needs a
    /// key of its own.
    pub fn new(
        up: impl Into<String>,
        down: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        confirm: impl Into<String>,
    ) -> Result<Self, MovementError> {
        let bindings = Self {
            up: up.into(),
            down: down.into(),
            left: left.into(),
            right: right.into(),
            confirm: confirm.into(),
        };
        let keys = bindings.keys();
        for (index, key) in keys.iter().enumerate() {
            if keys[..index].contains(key) {
                return Err(MovementError::DuplicateBinding((*key).to_owned()));
            }
        }
        Ok(bindings)
    }

    fn keys(&self) -> [&str; 5] {
        [
            self.up.as_str(),
            self.down.as_str(),
            self.left.as_str(),
            self.right.as_str(),
            self.confirm.as_str(),
        ]
    }

    /// Key that moves the preview up the screen.
    #[must_use]
    pub fn up(&self) -> &str {
        &self.up
    }

    /// Key that moves the preview down the screen.
    #[must_use]
    pub fn down(&self) -> &str {
        &self.down
    }

    /// Key that moves the preview left.
    #[must_use]
    pub fn left(&self) -> &str {
        &self.left
    }

    /// Key that moves the preview right.
    #[must_use]
    pub fn right(&self) -> &str {
        &self.right
    }

    /// Key that commits the preview.
    #[must_use]
    pub fn confirm(&self) -> &str {
        &self.confirm
    }

    /// Maps a key identifier onto a screen-relative direction.
    #[must_use]
    pub fn direction_for(&self, key: &str) -> Option<Direction> {
        if key == self.up {
            Some(Direction::Up)
        } else if key == self.down {
            Some(Direction::Down)
        } else if key == self.left {
            Some(Direction::Left)
        } else if key == self.right {
            Some(Direction::Right)
        } else {
            None
        }
    }

    /// Reports whether the key confirms the session.
    #[must_use]
    pub fn is_confirm(&self, key: &str) -> bool {
        key == self.confirm
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: "w".to_owned(),
            down: "s".to_owned(),
            left: "a".to_owned(),
            right: "d".to_owned(),
            confirm: " ".to_owned(),
        }
    }
}

/// Identifier of a movement session. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors reported to callers that misuse the movement system.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MovementError {
    /// The unit already has an active session.
    #[error("unit {} is already controlled by session {session}", .unit.get())]
    AlreadyControlled {
        /// Unit named in the request.
        unit: UnitId,
        /// Session that currently controls the unit.
        session: SessionId,
    },
    /// The same key was bound to more than one action.
    #[error("key {0:?} is bound to more than one action")]
    DuplicateBinding(String),
}

/// Why an admitted step was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveRejection {
    /// The destination column has no ground.
    NoGround {
        /// Column the step would have entered.
        destination: ColumnCoord,
    },
    /// The destination ground is not level with the preview.
    ElevationMismatch {
        /// Elevation of the preview.
        from: i32,
        /// Elevation of the destination ground.
        to: i32,
    },
}

/// Result of delivering an input or callback to a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    /// The key is not bound to this handler.
    Ignored,
    /// The input arrived while the cooldown window was open.
    Suppressed,
    /// The step was admitted but the destination is not walkable.
    Rejected(MoveRejection),
    /// The step was admitted and the preview animation started.
    Accepted {
        /// Ticket of the running animation.
        ticket: AnimationTicket,
        /// Cell the preview will occupy once the animation completes.
        destination: GridPosition,
    },
    /// A finished animation moved the preview.
    Settled {
        /// New preview position.
        position: GridPosition,
    },
    /// The session committed its preview and ended.
    Confirmed {
        /// Unit the session controlled.
        unit: UnitId,
        /// Committed position.
        position: GridPosition,
    },
    /// The session ended without committing.
    Cancelled {
        /// Unit the session controlled.
        unit: UnitId,
    },
    /// The session no longer exists; the input was dropped.
    Stale,
}

/// Read-only view of an active session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionView {
    /// Session identifier.
    pub id: SessionId,
    /// Unit being moved.
    pub unit: UnitId,
    /// Current preview position.
    pub preview: GridPosition,
    /// Destination of the animation in flight, if any.
    pub in_flight: Option<GridPosition>,
}

#[derive(Clone, Copy, Debug)]
struct InFlightStep {
    ticket: AnimationTicket,
    destination: GridPosition,
    completes_at: Duration,
}

#[derive(Debug)]
struct MoveSession {
    unit: UnitSnapshot,
    preview: GridPosition,
    preview_handle: PreviewHandle,
    selector: SelectorHandle,
    gate: Debouncer,
    in_flight: Option<InFlightStep>,
}

impl MoveSession {
    fn settle_due(&mut self, now: Duration) -> Option<GridPosition> {
        let step = self.in_flight?;
        if now < step.completes_at {
            return None;
        }
        self.in_flight = None;
        self.preview = step.destination;
        Some(step.destination)
    }

    fn teardown<R>(&mut self, renderer: &mut R)
    where
        R: RenderingPort,
    {
        if let Some(step) = self.in_flight.take() {
            renderer.cancel_animation(step.ticket);
        }
        renderer.remove_preview(self.preview_handle);
        renderer.remove_selector(self.selector);
    }

    fn view(&self, id: SessionId) -> SessionView {
        SessionView {
            id,
            unit: self.unit.id,
            preview: self.preview,
            in_flight: self.in_flight.map(|step| step.destination),
        }
    }
}

/// Movement controller owning every active session.
#[derive(Debug)]
pub struct Movement {
    tuning: MovementTuning,
    bindings: KeyBindings,
    sessions: BTreeMap<SessionId, MoveSession>,
    next_session: u64,
}

impl Movement {
    /// Creates a controller with explicit tuning and key bindings.
    #[must_use]
    pub fn new(tuning: MovementTuning, bindings: KeyBindings) -> Self {
        Self {
            tuning,
            bindings,
            sessions: BTreeMap::new(),
            next_session: 0,
        }
    }

    /// Key bindings used to interpret input.
    #[must_use]
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Starts controlling a unit, drawing its selector and preview.
    pub fn begin_control<R>(
        &mut self,
        unit: &UnitSnapshot,
        renderer: &mut R,
    ) -> Result<SessionId, MovementError>
    where
        R: RenderingPort,
    {
        if let Some(session) = self.active_session_for(unit.id) {
            warn!(unit = unit.id.get(), %session, "unit is already under control");
            return Err(MovementError::AlreadyControlled {
                unit: unit.id,
                session,
            });
        }

        let id = SessionId(self.next_session);
        self.next_session = self.next_session.saturating_add(1);

        let selector = renderer.add_selector(unit);
        let preview_handle = renderer.add_preview(unit);
        let _ = self.sessions.insert(
            id,
            MoveSession {
                unit: *unit,
                preview: unit.position,
                preview_handle,
                selector,
                gate: Debouncer::new(),
                in_flight: None,
            },
        );
        info!(unit = unit.id.get(), session = %id, "movement session started");
        Ok(id)
    }

    /// Routes one key-down event to directional or confirm handling.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_key<P, D, R>(
        &mut self,
        session: SessionId,
        key: &str,
        now: Duration,
        probe: &P,
        resolver: &D,
        renderer: &mut R,
        out: &mut Vec<Command>,
    ) -> InputOutcome
    where
        P: CollisionProbe + ?Sized,
        D: DirectionResolver + ?Sized,
        R: RenderingPort,
    {
        if self.bindings.is_confirm(key) {
            self.handle_confirm(session, key, now, renderer, out)
        } else {
            self.handle_directional_input(session, key, now, probe, resolver, renderer)
        }
    }

    /// Attempts to step the session's preview one cell in the keyed direction.
    pub fn handle_directional_input<P, D, R>(
        &mut self,
        session: SessionId,
        key: &str,
        now: Duration,
        probe: &P,
        resolver: &D,
        renderer: &mut R,
    ) -> InputOutcome
    where
        P: CollisionProbe + ?Sized,
        D: DirectionResolver + ?Sized,
        R: RenderingPort,
    {
        let window = self.tuning.step_window;
        let Some(active) = self.sessions.get_mut(&session) else {
            return InputOutcome::Stale;
        };
        let _ = active.settle_due(now);

        let Some(direction) = self.bindings.direction_for(key) else {
            return InputOutcome::Ignored;
        };
        let delta = resolver.resolve(direction);

        let MoveSession {
            unit,
            preview,
            preview_handle,
            gate,
            in_flight,
            ..
        } = active;

        let admitted = gate.debounce(now, window, || {
            if let Some(step) = in_flight.take() {
                renderer.cancel_animation(step.ticket);
                *preview = step.destination;
            }

            let destination = preview.column().offset(delta);
            let Some(ground) = probe.solid_height_at(destination) else {
                return InputOutcome::Rejected(MoveRejection::NoGround { destination });
            };
            if ground != preview.y() {
                return InputOutcome::Rejected(MoveRejection::ElevationMismatch {
                    from: preview.y(),
                    to: ground,
                });
            }

            let destination = destination.at_elevation(ground);
            let ticket = renderer.animate_preview(*preview_handle, *preview, destination, window);
            renderer.play_move_cue();
            *in_flight = Some(InFlightStep {
                ticket,
                destination,
                completes_at: now.saturating_add(window),
            });
            InputOutcome::Accepted {
                ticket,
                destination,
            }
        });

        match admitted {
            Some(outcome) => {
                debug!(unit = unit.id.get(), %session, ?direction, ?outcome, "step admitted");
                outcome
            }
            None => {
                debug!(unit = unit.id.get(), %session, ?direction, "step suppressed by cooldown");
                InputOutcome::Suppressed
            }
        }
    }

    /// Commits the preview position and ends the session.
    ///
    /// An animation still in flight is cancelled and its step discarded; the
    /// committed position is the last position the preview settled on.
    pub fn handle_confirm<R>(
        &mut self,
        session: SessionId,
        key: &str,
        now: Duration,
        renderer: &mut R,
        out: &mut Vec<Command>,
    ) -> InputOutcome
    where
        R: RenderingPort,
    {
        if !self.sessions.contains_key(&session) {
            return InputOutcome::Stale;
        }
        if !self.bindings.is_confirm(key) {
            return InputOutcome::Ignored;
        }
        let Some(mut active) = self.sessions.remove(&session) else {
            return InputOutcome::Stale;
        };

        let _ = active.settle_due(now);
        active.teardown(renderer);

        let unit = active.unit.id;
        let position = active.preview;
        out.push(Command::CommitUnitPosition { unit, position });
        info!(unit = unit.get(), %session, ?position, "movement confirmed");
        InputOutcome::Confirmed { unit, position }
    }

    /// Ends a session without committing, removing its visuals.
    pub fn cancel<R>(&mut self, session: SessionId, renderer: &mut R) -> InputOutcome
    where
        R: RenderingPort,
    {
        let Some(mut active) = self.sessions.remove(&session) else {
            return InputOutcome::Stale;
        };
        active.teardown(renderer);

        let unit = active.unit.id;
        info!(unit = unit.get(), %session, "movement cancelled");
        InputOutcome::Cancelled { unit }
    }

    /// Animation-completion callback. Moves the preview onto the step's
    /// destination unless the session or the animation is gone.
    pub fn complete_animation(
        &mut self,
        session: SessionId,
        ticket: AnimationTicket,
    ) -> InputOutcome {
        let Some(active) = self.sessions.get_mut(&session) else {
            debug!(%session, ticket = ticket.get(), "animation finished after teardown");
            return InputOutcome::Stale;
        };
        match active.in_flight {
            Some(step) if step.ticket == ticket => {
                active.in_flight = None;
                active.preview = step.destination;
                InputOutcome::Settled {
                    position: step.destination,
                }
            }
            _ => InputOutcome::Stale,
        }
    }

    /// Settles every animation due at `now`.
    pub fn advance(&mut self, now: Duration) {
        for active in self.sessions.values_mut() {
            let _ = active.settle_due(now);
        }
    }

    /// Captures the state of an active session.
    #[must_use]
    pub fn session(&self, session: SessionId) -> Option<SessionView> {
        self.sessions
            .get(&session)
            .map(|active| active.view(session))
    }

    /// Finds the active session controlling `unit`, if any.
    #[must_use]
    pub fn active_session_for(&self, unit: UnitId) -> Option<SessionId> {
        self.sessions
            .iter()
            .find(|(_, active)| active.unit.id == unit)
            .map(|(id, _)| *id)
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(MovementTuning::default(), KeyBindings::default())
    }
}
