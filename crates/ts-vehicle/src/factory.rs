//! Default vehicle factory: IDM+MOBIL vehicles with the standard sensor set.

use ts_core::AgentId;
use ts_engine::SimEngine;

use ts_agent::{Agent, AgentFactory, AgentParams, AgentResult};

use crate::{
    EgoStateSensor, IdmConfig, IdmModel, LonLatConfig, LonLatController, MobilConfig,
    NeighborhoodSensor,
};

/// Builds vehicles carrying an ego + neighborhood sensor pair, an
/// [`IdmModel`], and a [`LonLatController`].
///
/// All fields are public so scenarios can tune the fleet with
/// struct-update syntax.
#[derive(Clone, Debug)]
pub struct IdmVehicleFactory {
    pub idm: IdmConfig,
    pub mobil: MobilConfig,
    pub controller: LonLatConfig,
    /// Enable the MOBIL lateral policy; disabled vehicles defer lane
    /// changes to the engine.
    pub mobil_enabled: bool,
    /// Seed for the stochastic longitudinal variant; `None` = deterministic.
    pub stochastic_seed: Option<u64>,
    /// Sensor observation range, m.
    pub obs_range: f64,
}

impl Default for IdmVehicleFactory {
    fn default() -> Self {
        Self {
            idm: IdmConfig::default(),
            mobil: MobilConfig::default(),
            controller: LonLatConfig::default(),
            mobil_enabled: true,
            stochastic_seed: None,
            obs_range: AgentParams::vehicle().obs_range,
        }
    }
}

impl AgentFactory for IdmVehicleFactory {
    fn create(&self, id: &AgentId, _engine: &dyn SimEngine) -> AgentResult<Agent> {
        let mut model = IdmModel::with_configs(self.idm.clone(), self.mobil.clone())
            .mobil(self.mobil_enabled);
        if let Some(seed) = self.stochastic_seed {
            model = model.stochastic(seed);
        }

        Agent::new(
            id.clone(),
            vec![
                Box::new(EgoStateSensor::new()),
                Box::new(NeighborhoodSensor::new(self.obs_range)),
            ],
            Box::new(model),
            Box::new(LonLatController::new(self.controller.clone())),
            AgentParams { obs_range: self.obs_range, ..AgentParams::vehicle() },
        )
    }
}
