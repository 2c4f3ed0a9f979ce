use thiserror::Error;

use ts_core::AgentId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("agent {0} is not live in the engine")]
    UnknownAgent(AgentId),

    #[error("lane {0} is not known to the engine")]
    UnknownLane(String),

    #[error("operation not supported by this engine binding: {0}")]
    Unsupported(&'static str),

    #[error("engine binding error: {0}")]
    Binding(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
