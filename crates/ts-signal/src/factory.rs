//! Default signal factory.

use ts_core::AgentId;
use ts_engine::SimEngine;

use ts_agent::{Agent, AgentFactory, AgentParams, AgentResult};

use crate::{FixedStateModel, SignalStateController, SignalStateSensor};

/// Builds signal controllers that hold a fixed state string.
#[derive(Clone, Debug)]
pub struct FixedStateSignalFactory {
    /// The state every signal is pinned to.
    pub state: String,
}

impl Default for FixedStateSignalFactory {
    fn default() -> Self {
        Self { state: "ggggggggg".to_owned() }
    }
}

impl AgentFactory for FixedStateSignalFactory {
    fn create(&self, id: &AgentId, _engine: &dyn SimEngine) -> AgentResult<Agent> {
        Agent::new(
            id.clone(),
            vec![Box::new(SignalStateSensor::new())],
            Box::new(FixedStateModel::new(self.state.clone())),
            Box::new(SignalStateController::new()),
            AgentParams::traffic_signal(),
        )
    }
}
