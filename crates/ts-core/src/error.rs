//! Framework error type.
//!
//! Sub-crates define their own error enums and either convert into `TsError`
//! via `From` impls or wrap it as one variant.  Both patterns are acceptable;
//! prefer whichever keeps error sites clean.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `ts-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum TsError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("agent {0} already registered")]
    DuplicateAgent(AgentId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("engine error: {0}")]
    Engine(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `ts-*` crates.
pub type TsResult<T> = Result<T, TsError>;
