//! Default VRU factory.

use ts_core::AgentId;
use ts_engine::SimEngine;

use ts_agent::{Agent, AgentFactory, AgentParams, AgentResult, EngineModel};

use crate::{VruMoveController, VruStateSensor};

/// Builds passive VRUs: state sensor, engine-deferring decision model, and
/// a transform controller available for scripted motion.
#[derive(Clone, Debug, Default)]
pub struct PassiveVruFactory;

impl AgentFactory for PassiveVruFactory {
    fn create(&self, id: &AgentId, _engine: &dyn SimEngine) -> AgentResult<Agent> {
        Agent::new(
            id.clone(),
            vec![Box::new(VruStateSensor::new())],
            Box::new(EngineModel),
            Box::new(VruMoveController::new()),
            AgentParams::vulnerable_road_user(),
        )
    }
}
