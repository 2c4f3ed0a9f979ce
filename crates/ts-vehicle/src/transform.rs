//! `TransformController` — absolute teleport-style commands.

use ts_core::AgentId;
use ts_engine::SimEngine;

use ts_agent::{
    AgentController, AgentResult, CommandKind, ControlCommand, Observation,
};

/// Executes [`Transform`][ControlCommand::Transform] commands: moves the
/// vehicle to an absolute position/angle and optionally fixes its speed.
///
/// Legality is schema-only — any well-formed transform executes, every
/// tick.  The controller never enters a maneuver hold.
#[derive(Default)]
pub struct TransformController;

impl TransformController {
    pub fn new() -> Self {
        Self
    }
}

impl AgentController for TransformController {
    fn schema(&self) -> CommandKind {
        CommandKind::Transform
    }

    fn is_command_legal(
        &self,
        _agent: &AgentId,
        command: &ControlCommand,
        _engine: &dyn SimEngine,
    ) -> bool {
        matches!(command, ControlCommand::Transform(_))
    }

    fn execute_control_command(
        &mut self,
        agent: &AgentId,
        command: &ControlCommand,
        _observation: &Observation,
        engine: &mut dyn SimEngine,
    ) -> AgentResult<()> {
        let ControlCommand::Transform(cmd) = command else {
            return Ok(());
        };
        engine.set_speed_mode(agent, cmd.speed_mode)?;
        engine.move_to(agent, cmd.position, cmd.angle, cmd.keep_route)?;
        if let Some(velocity) = cmd.velocity {
            engine.set_speed(agent, velocity)?;
        }
        Ok(())
    }
}
