//! A ready-made environment logic for plain scenarios.

use ts_core::Population;
use ts_engine::SimEngine;

use crate::{EnvLogic, SimResult, StepDecision, WorldView};

/// Decide → act → snapshot for the vehicle population, stopping once the
/// engine expects no more vehicles.
///
/// Scenario crates usually start from this and override what they need:
/// decisions for a subset of agents, cooperative decision making, custom
/// termination conditions.
pub struct TemplateLogic;

impl EnvLogic for TemplateLogic {
    fn on_step(&mut self, world: &mut WorldView<'_>) -> SimResult<StepDecision> {
        let control = world.make_decisions(Population::Vehicle)?;
        world.execute_control(Population::Vehicle, &control)?;
        world.snapshot(&control);

        if world.engine.expected_vehicle_count() == 0 {
            return Ok(StepDecision::Stop);
        }
        Ok(StepDecision::Continue)
    }
}
