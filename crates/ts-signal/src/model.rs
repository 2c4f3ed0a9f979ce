//! Fixed-state signal decision model.

use ts_agent::{AgentResult, ControlCommand, DecisionInfo, DecisionModel, Observation};

/// Commands the same state string every tick.
///
/// A placeholder for scenarios that want signals pinned (the default is
/// all-green for a nine-link junction); real controllers implement phase
/// schedules on top of the same sensor/controller pair.
pub struct FixedStateModel {
    state: String,
}

impl FixedStateModel {
    pub fn new(state: impl Into<String>) -> Self {
        Self { state: state.into() }
    }
}

impl Default for FixedStateModel {
    fn default() -> Self {
        Self::new("ggggggggg")
    }
}

impl DecisionModel for FixedStateModel {
    fn derive_control_command(
        &mut self,
        _observation: &Observation,
    ) -> AgentResult<(Option<ControlCommand>, DecisionInfo)> {
        Ok((Some(ControlCommand::SignalState(self.state.clone())), None))
    }
}
