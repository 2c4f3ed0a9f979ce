//! `LonLatController` — executes coupled longitudinal/lateral commands with
//! a multi-tick lateral maneuver hold.

use ts_core::AgentId;
use ts_engine::{SimEngine, DEFAULT_LANE_CHANGE_MODE};

use ts_agent::{
    AgentController, AgentError, AgentResult, CommandKind, ControlCommand, ControllerState,
    LateralMode, Observation,
};

use crate::sensors::EgoStateSensor;

/// Controller parameters with their documented defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct LonLatConfig {
    /// Upper bound of the speed envelope, m/s.  Default 40.0.
    pub v_high: f64,
    /// Lower bound of the speed envelope, m/s.  Default 20.0.
    pub v_low: f64,
    /// Duration of a longitudinal acceleration request, s.  Default 0.1.
    pub acc_duration: f64,
    /// Duration of a lateral maneuver, s.  Default 1.0.
    pub lane_change_duration: f64,
}

impl Default for LonLatConfig {
    fn default() -> Self {
        Self {
            v_high: 40.0,
            v_low: 20.0,
            acc_duration: 0.1,
            lane_change_duration: 1.0,
        }
    }
}

/// Executes [`LonLat`][ControlCommand::LonLat] commands.
///
/// # Legality state machine
///
/// `Idle` → a `left`/`right` command is legal only when the adjacent lane
/// exists and is drivable; accepting one commits the controller to
/// `Busy(round(lane_change_duration / step_length))` ticks.  While `Busy`,
/// further lane-change requests are rejected; `central` and `engine`
/// lateral modes stay legal and execute every tick.  The hold counts down
/// once per tick and the controller returns to `Idle` at zero.
///
/// # Longitudinal clamping
///
/// The commanded acceleration is always clamped so the resulting speed
/// stays inside `[v_low, v_high]`, then sent as a bounded
/// acceleration-over-duration request.
pub struct LonLatController {
    config: LonLatConfig,
    state: ControllerState,
    /// Maneuver hold in ticks, fixed at install from the engine step length.
    hold_ticks: u32,
}

impl LonLatController {
    pub fn new(config: LonLatConfig) -> Self {
        Self {
            config,
            state: ControllerState::Idle,
            hold_ticks: 0,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }
}

impl Default for LonLatController {
    fn default() -> Self {
        Self::new(LonLatConfig::default())
    }
}

impl AgentController for LonLatController {
    fn install(&mut self, _agent: &AgentId, engine: &dyn SimEngine) {
        self.hold_ticks =
            (self.config.lane_change_duration / engine.step_length()).round() as u32;
    }

    fn schema(&self) -> CommandKind {
        CommandKind::LonLat
    }

    fn begin_tick(&mut self) {
        self.state.begin_tick();
    }

    fn is_command_legal(
        &self,
        agent: &AgentId,
        command: &ControlCommand,
        engine: &dyn SimEngine,
    ) -> bool {
        let ControlCommand::LonLat(cmd) = command else {
            return false;
        };
        match cmd.lateral.side() {
            Some(side) => {
                !self.state.is_busy()
                    && engine.adjacent_lane_drivable(agent, side).unwrap_or(false)
            }
            // Central / engine-deferred lateral modes never occupy the
            // controller; the longitudinal part is clamped at execution.
            None => true,
        }
    }

    fn execute_control_command(
        &mut self,
        agent: &AgentId,
        command: &ControlCommand,
        observation: &Observation,
        engine: &mut dyn SimEngine,
    ) -> AgentResult<()> {
        let ControlCommand::LonLat(cmd) = command else {
            return Ok(());
        };
        let velocity = observation
            .get(EgoStateSensor::NAME)
            .and_then(|r| r.as_vehicle_state())
            .ok_or(AgentError::MissingObservation(EgoStateSensor::NAME))?
            .velocity;

        // Remove the engine's own speed limits while we command directly.
        engine.set_speed_mode(agent, 0)?;

        // Clamp the acceleration to the [v_low, v_high] speed envelope.
        let mut acceleration = cmd.longitudinal;
        if velocity + acceleration > self.config.v_high {
            acceleration = self.config.v_high - velocity;
        } else if velocity + acceleration < self.config.v_low {
            acceleration = self.config.v_low - velocity;
        }

        match cmd.lateral.side() {
            None => {
                let mode = if cmd.lateral == LateralMode::Engine {
                    DEFAULT_LANE_CHANGE_MODE
                } else {
                    0
                };
                engine.set_lane_change_mode(agent, mode)?;
                engine.accelerate(agent, acceleration, self.config.acc_duration)?;
            }
            Some(side) => {
                engine.set_lane_change_mode(agent, 0)?;
                engine.change_lane(agent, side, self.config.lane_change_duration)?;
                engine.accelerate(agent, acceleration, self.config.lane_change_duration)?;
                self.state.commit(self.hold_ticks);
            }
        }
        Ok(())
    }
}
