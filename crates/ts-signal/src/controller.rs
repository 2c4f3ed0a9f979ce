//! Signal state controller.

use ts_core::AgentId;
use ts_engine::SimEngine;

use ts_agent::{AgentController, AgentResult, CommandKind, ControlCommand, Observation};

/// Executes [`SignalState`][ControlCommand::SignalState] commands by
/// replacing the signal's full state string.  Legality is schema-only.
#[derive(Default)]
pub struct SignalStateController;

impl SignalStateController {
    pub fn new() -> Self {
        Self
    }
}

impl AgentController for SignalStateController {
    fn schema(&self) -> CommandKind {
        CommandKind::SignalState
    }

    fn is_command_legal(
        &self,
        _agent: &AgentId,
        command: &ControlCommand,
        _engine: &dyn SimEngine,
    ) -> bool {
        matches!(command, ControlCommand::SignalState(_))
    }

    fn execute_control_command(
        &mut self,
        agent: &AgentId,
        command: &ControlCommand,
        _observation: &Observation,
        engine: &mut dyn SimEngine,
    ) -> AgentResult<()> {
        if let ControlCommand::SignalState(state) = command {
            engine.set_signal_state(agent, state)?;
        }
        Ok(())
    }
}
