//! The `DecisionModel` trait — an agent's policy seam.

use ts_core::AgentId;

use crate::{AgentResult, ControlCommand, Observation};

/// Free-form diagnostic tag attached to a decision, forwarded to the
/// telemetry sink (`"car_following"`, `"lane_change_left"`, …).
pub type DecisionInfo = Option<String>;

/// Turns an observation into a control command.
///
/// Models may hold per-agent state (maneuver memories, RNG streams), which
/// is why [`derive_control_command`][Self::derive_control_command] takes
/// `&mut self`.  A model must be installed (bound to its agent) before use;
/// the owning [`Agent`][crate::Agent] enforces this.
pub trait DecisionModel: 'static {
    /// Bind the model to its agent.  Called once per registry insertion.
    fn install(&mut self, _agent: &AgentId) {}

    /// Derive `(command, diagnostic-info)` from the observation.
    ///
    /// Returning `Ok((None, _))` means "no command this tick" — the agent
    /// stays under the authoritative engine's own models.
    fn derive_control_command(
        &mut self,
        observation: &Observation,
    ) -> AgentResult<(Option<ControlCommand>, DecisionInfo)>;
}

/// A model that always defers to the authoritative engine.
///
/// Useful as a placeholder for passive populations that should follow the
/// engine's built-in behavior while still being tracked in a registry.
pub struct EngineModel;

impl DecisionModel for EngineModel {
    fn derive_control_command(
        &mut self,
        _observation: &Observation,
    ) -> AgentResult<(Option<ControlCommand>, DecisionInfo)> {
        Ok((None, None))
    }
}
