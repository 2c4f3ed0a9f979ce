use thiserror::Error;

use ts_agent::AgentError;
use ts_engine::EngineError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("scheduler is {actual}, cannot {operation}")]
    InvalidState {
        operation: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type SimResult<T> = Result<T, SimError>;
