//! The `AgentController` trait and the maneuver state machine.

use ts_engine::SimEngine;

use ts_core::AgentId;

use crate::{AgentResult, CommandKind, ControlCommand, Observation};

// ── ControllerState ───────────────────────────────────────────────────────────

/// Maneuver occupancy of a controller.
///
/// Mutated only by the owning controller: committing a multi-tick maneuver
/// enters `Busy`, and [`begin_tick`][Self::begin_tick] counts the hold down
/// once per tick until the controller is `Idle` again.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControllerState {
    #[default]
    Idle,
    Busy {
        remaining_ticks: u32,
    },
}

impl ControllerState {
    #[inline]
    pub fn is_busy(self) -> bool {
        matches!(self, ControllerState::Busy { .. })
    }

    /// Commit to a maneuver holding for `ticks` ticks.
    #[inline]
    pub fn commit(&mut self, ticks: u32) {
        *self = ControllerState::Busy { remaining_ticks: ticks };
    }

    /// Advance the hold by one tick: decrement (floored at zero) and return
    /// to `Idle` when the count runs out.
    pub fn begin_tick(&mut self) {
        if let ControllerState::Busy { remaining_ticks } = *self {
            let remaining = remaining_ticks.saturating_sub(1);
            *self = if remaining == 0 {
                ControllerState::Idle
            } else {
                ControllerState::Busy { remaining_ticks: remaining }
            };
        }
    }
}

// ── AgentController ───────────────────────────────────────────────────────────

/// Validates and executes control commands against the authoritative engine.
///
/// A controller declares its command schema via [`schema`][Self::schema];
/// the owning [`Agent`][crate::Agent] rejects commands of any other shape
/// before asking [`is_command_legal`][Self::is_command_legal], which checks
/// the controller-specific preconditions and must be pure — all state
/// transitions happen in [`begin_tick`][Self::begin_tick] and
/// [`execute_control_command`][Self::execute_control_command].
pub trait AgentController: 'static {
    /// Bind the controller to its agent and let it read engine constants
    /// (step length, …).  Called once per registry insertion.
    fn install(&mut self, _agent: &AgentId, _engine: &dyn SimEngine) {}

    /// The command shape this controller accepts.
    fn schema(&self) -> CommandKind;

    /// Advance per-tick controller state (maneuver hold countdown).  Called
    /// once per tick before any command of that tick is checked.
    fn begin_tick(&mut self) {}

    /// Side-effect-free legality check of `command` beyond schema
    /// conformance (maneuver occupancy, lane existence, …).
    fn is_command_legal(
        &self,
        agent: &AgentId,
        command: &ControlCommand,
        engine: &dyn SimEngine,
    ) -> bool;

    /// Execute a legal command against the engine.  May transition the
    /// controller's maneuver state.
    fn execute_control_command(
        &mut self,
        agent: &AgentId,
        command: &ControlCommand,
        observation: &Observation,
        engine: &mut dyn SimEngine,
    ) -> AgentResult<()>;
}
