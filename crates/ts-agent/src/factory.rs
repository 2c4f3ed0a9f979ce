//! The `AgentFactory` trait — per-population agent construction.

use ts_core::AgentId;
use ts_engine::SimEngine;

use crate::{Agent, AgentResult};

/// Builds one population's agents.
///
/// Reconciliation calls [`create`][Self::create] for every ID the
/// authoritative engine reports that has no registry entry yet.  The
/// factory decides which sensors, decision model, and controller the new
/// agent carries; the caller inserts and installs it.
pub trait AgentFactory: 'static {
    /// Construct the software representation of agent `id`.
    ///
    /// The engine is available read-only for type lookups; the agent is
    /// already live in it.
    fn create(&self, id: &AgentId, engine: &dyn SimEngine) -> AgentResult<Agent>;
}
