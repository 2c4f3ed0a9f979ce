use thiserror::Error;

use ts_core::AgentId;
use ts_engine::EngineError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent {agent}: duplicate sensor name {name:?}")]
    DuplicateSensor { agent: AgentId, name: String },

    #[error("agent {0} already registered")]
    DuplicateAgent(AgentId),

    #[error("observation is missing required sensor {0:?}")]
    MissingObservation(&'static str),

    #[error("decision model error: {0}")]
    Model(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type AgentResult<T> = Result<T, AgentError>;
