//! Transform controller for vulnerable road users.

use ts_core::AgentId;
use ts_engine::SimEngine;

use ts_agent::{AgentController, AgentResult, CommandKind, ControlCommand, Observation};

/// Executes [`Transform`][ControlCommand::Transform] commands against the
/// engine's person API.  Legality is schema-only; the controller never
/// holds a maneuver.
#[derive(Default)]
pub struct VruMoveController;

impl VruMoveController {
    pub fn new() -> Self {
        Self
    }
}

impl AgentController for VruMoveController {
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
        engine.vru_move_to(agent, cmd.position, cmd.angle, cmd.keep_route)?;
        if let Some(velocity) = cmd.velocity {
            engine.vru_set_speed(agent, velocity)?;
        }
        Ok(())
    }
}
