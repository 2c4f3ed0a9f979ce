//! VRU state sensor.

use ts_core::AgentId;
use ts_engine::SimEngine;

use ts_agent::{AgentResult, AgentSensor, SensorReading, VruState};

/// Reports a vulnerable road user's speed, position, and heading.
#[derive(Default)]
pub struct VruStateSensor;

impl VruStateSensor {
    pub const NAME: &'static str = "ego";

    pub fn new() -> Self {
        Self
    }
}

impl AgentSensor for VruStateSensor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fetch(&self, agent: &AgentId, engine: &dyn SimEngine) -> AgentResult<SensorReading> {
        Ok(SensorReading::Vru(VruState {
            id: agent.clone(),
            velocity: engine.vru_speed(agent)?,
            position: engine.vru_position(agent)?,
            heading: engine.vru_heading(agent)?,
        }))
    }
}
