use std::time::Duration;

/// Leading-edge input gate.
///
/// The first trigger opens a cooldown window and runs immediately. Triggers
/// that arrive before the window elapses are dropped, never queued, so at most
/// one trigger is admitted per window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Debouncer {
    cooldown_until: Option<Duration>,
}

impl Debouncer {
    /// Creates an open gate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cooldown_until: None,
        }
    }

    /// Runs `action` if the gate is open at `now`, then keeps the gate closed
    /// for `window`. Returns `None` when the trigger was suppressed.
    pub fn debounce<F, R>(&mut self, now: Duration, window: Duration, action: F) -> Option<R>
    where
        F: FnOnce() -> R,
    {
        if self.is_cooling_down(now) {
            return None;
        }

        self.cooldown_until = Some(now.saturating_add(window));
        Some(action())
    }

    /// Reports whether a trigger at `now` would be suppressed.
    #[must_use]
    pub fn is_cooling_down(&self, now: Duration) -> bool {
        self.cooldown_until.map_or(false, |deadline| now < deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(150);

    #[test]
    fn first_trigger_runs_immediately() {
        let mut gate = Debouncer::new();
        assert_eq!(gate.debounce(Duration::ZERO, WINDOW, || 7), Some(7));
    }

    #[test]
    fn triggers_inside_the_window_are_dropped() {
        let mut gate = Debouncer::new();
        let mut admitted = 0;
        for millis in [0, 1, 50, 100, 149] {
            if gate
                .debounce(Duration::from_millis(millis), WINDOW, || ())
                .is_some()
            {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[test]
    fn suppressed_triggers_do_not_extend_the_window() {
        let mut gate = Debouncer::new();
        assert!(gate.debounce(Duration::ZERO, WINDOW, || ()).is_some());
        assert!(gate
            .debounce(Duration::from_millis(140), WINDOW, || ())
            .is_none());
        assert!(gate
            .debounce(Duration::from_millis(150), WINDOW, || ())
            .is_some());
    }

    #[test]
    fn suppressed_actions_never_run_later() {
        let mut gate = Debouncer::new();
        let mut runs = Vec::new();
        let _ = gate.debounce(Duration::ZERO, WINDOW, || runs.push("first"));
        let _ = gate.debounce(Duration::from_millis(10), WINDOW, || runs.push("second"));
        let _ = gate.debounce(Duration::from_millis(400), WINDOW, || runs.push("third"));

        assert_eq!(runs, vec!["first", "third"]);
    }

    #[test]
    fn cooling_down_tracks_the_deadline() {
        let mut gate = Debouncer::new();
        assert!(!gate.is_cooling_down(Duration::ZERO));
        let _ = gate.debounce(Duration::from_millis(20), WINDOW, || ());
        assert!(gate.is_cooling_down(Duration::from_millis(169)));
        assert!(!gate.is_cooling_down(Duration::from_millis(170)));
    }
}
