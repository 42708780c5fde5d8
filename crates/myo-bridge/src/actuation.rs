//! Debounced actuation state machines
//!
//! Two variants, deliberately kept separate: the gripper maps the
//! activation level onto a target state behind a time debounce, the
//! inference gate fires once per rising edge. Neither rolls back on a
//! failed downstream call; local state reflects intent, not confirmed
//! physical state, since the actuator has no feedback channel.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Gripper position held by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuatorState {
    Closed,
    Open,
}

/// Command emitted on a committed gripper transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GripperCommand {
    Open,
    Close,
}

/// Inference trigger lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    Idle,
    Triggered,
}

/// Time-debounced open/close state machine.
///
/// Commits a transition only when the decider's target differs from the
/// held state and the debounce interval has elapsed since the previous
/// commit, so a filtered value hovering around the threshold cannot
/// chatter the hardware. At most one command per debounce window, and
/// never two identical commands in a row.
#[derive(Debug, Clone)]
pub struct GripperController {
    state: ActuatorState,
    debounce: Duration,
    last_changed: Option<Instant>,
}

impl GripperController {
    /// Start closed, with the given minimum interval between commits
    pub fn new(debounce: Duration) -> Self {
        GripperController {
            state: ActuatorState::Closed,
            debounce,
            last_changed: None,
        }
    }

    /// Feed one decider output.
    ///
    /// Returns the command to send downstream when a transition commits,
    /// `None` when the state is unchanged or the debounce suppresses it.
    pub fn update(&mut self, active: bool, now: Instant) -> Option<GripperCommand> {
        let target = if active {
            ActuatorState::Open
        } else {
            ActuatorState::Closed
        };

        if target == self.state {
            return None;
        }
        if let Some(changed) = self.last_changed {
            if now.duration_since(changed) < self.debounce {
                return None;
            }
        }

        self.state = target;
        self.last_changed = Some(now);
        let command = match target {
            ActuatorState::Open => GripperCommand::Open,
            ActuatorState::Closed => GripperCommand::Close,
        };
        debug!(?command, "gripper transition committed");
        Some(command)
    }

    /// Currently committed state
    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Time of the last committed transition
    pub fn last_changed(&self) -> Option<Instant> {
        self.last_changed
    }
}

/// One-shot rising-edge gate for inference runs.
///
/// Fires exactly once when the signal goes active and re-arms only
/// after it drops back below threshold; holding a flex does not queue
/// repeated runs. No time gate, unlike the gripper variant.
#[derive(Debug, Clone, Default)]
pub struct TriggerGate {
    state: TriggerState,
    last_changed: Option<Instant>,
}

impl Default for TriggerState {
    fn default() -> Self {
        TriggerState::Idle
    }
}

impl TriggerGate {
    /// Start idle, armed for the first rising edge
    pub fn new() -> Self {
        TriggerGate {
            state: TriggerState::Idle,
            last_changed: None,
        }
    }

    /// Feed one decider output; `true` exactly once per rising edge
    pub fn update(&mut self, active: bool, now: Instant) -> bool {
        match (self.state, active) {
            (TriggerState::Idle, true) => {
                self.state = TriggerState::Triggered;
                self.last_changed = Some(now);
                debug!("inference trigger fired");
                true
            }
            (TriggerState::Triggered, false) => {
                self.state = TriggerState::Idle;
                self.last_changed = Some(now);
                false
            }
            _ => false,
        }
    }

    /// Currently committed state
    pub fn state(&self) -> TriggerState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flex_sequence_commits_once_within_debounce() {
        let mut controller = GripperController::new(Duration::from_secs(1));
        let base = Instant::now();

        // 200, 700, 200 at threshold 600, delivered well under 1s apart
        let commands: Vec<_> = [false, true, false]
            .iter()
            .enumerate()
            .map(|(i, &active)| {
                controller.update(active, base + Duration::from_millis(i as u64 * 100))
            })
            .collect();

        assert_eq!(commands, vec![None, Some(GripperCommand::Open), None]);
        assert_eq!(controller.state(), ActuatorState::Open);
    }

    #[test]
    fn test_transition_allowed_after_debounce() {
        let mut controller = GripperController::new(Duration::from_secs(1));
        let base = Instant::now();

        assert_eq!(controller.update(true, base), Some(GripperCommand::Open));
        // Still inside the debounce window
        assert_eq!(
            controller.update(false, base + Duration::from_millis(500)),
            None
        );
        // Window elapsed, the transition commits
        assert_eq!(
            controller.update(false, base + Duration::from_millis(1500)),
            Some(GripperCommand::Close)
        );
    }

    #[test]
    fn test_no_consecutive_identical_commands() {
        let mut controller = GripperController::new(Duration::from_millis(10));
        let base = Instant::now();
        let mut last = None;

        for i in 0..50 {
            let active = i % 3 != 0;
            let now = base + Duration::from_millis(i * 20);
            if let Some(command) = controller.update(active, now) {
                assert_ne!(Some(command), last, "identical command emitted twice");
                last = Some(command);
            }
        }
    }

    #[test]
    fn test_idle_input_emits_nothing() {
        let mut controller = GripperController::new(Duration::from_secs(1));
        let base = Instant::now();

        for i in 0..10 {
            assert_eq!(
                controller.update(false, base + Duration::from_millis(i * 50)),
                None
            );
        }
        assert_eq!(controller.state(), ActuatorState::Closed);
        assert_eq!(controller.last_changed(), None);
    }

    #[test]
    fn test_trigger_fires_once_per_rising_edge() {
        let mut gate = TriggerGate::new();
        let base = Instant::now();

        let fired: Vec<bool> = [false, true, true, false, true]
            .iter()
            .enumerate()
            .map(|(i, &active)| gate.update(active, base + Duration::from_millis(i as u64)))
            .collect();

        assert_eq!(fired, vec![false, true, false, false, true]);
    }

    #[test]
    fn test_trigger_rearms_only_on_falling_edge() {
        let mut gate = TriggerGate::new();
        let base = Instant::now();

        assert!(gate.update(true, base));
        assert_eq!(gate.state(), TriggerState::Triggered);

        // Held flex does not re-fire, however long it lasts
        for i in 1..20 {
            assert!(!gate.update(true, base + Duration::from_secs(i)));
        }

        assert!(!gate.update(false, base + Duration::from_secs(30)));
        assert_eq!(gate.state(), TriggerState::Idle);
    }
}
