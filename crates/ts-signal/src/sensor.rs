//! Signal state sensor.

use ts_core::AgentId;
use ts_engine::SimEngine;

use ts_agent::{AgentResult, AgentSensor, SensorReading, SignalStateReading};

/// Reports a signal controller's current red-yellow-green state string.
#[derive(Default)]
pub struct SignalStateSensor;

impl SignalStateSensor {
    pub const NAME: &'static str = "ego";

    pub fn new() -> Self {
        Self
    }
}

impl AgentSensor for SignalStateSensor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fetch(&self, agent: &AgentId, engine: &dyn SimEngine) -> AgentResult<SensorReading> {
        Ok(SensorReading::SignalState(SignalStateReading {
            state: engine.signal_state(agent)?,
        }))
    }
}
