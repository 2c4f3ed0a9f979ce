//! `AgentRegistry` — the per-population agent map.
//!
//! A dedicated container instead of a bare map: unique keys enforced at
//! insert, iteration in insertion order, and only the operations
//! reconciliation needs (insert-unique, remove, lookup, iterate).  Raw map
//! mutation is never exposed.

use rustc_hash::{FxHashMap, FxHashSet};

use ts_core::AgentId;

use crate::{Agent, AgentError, AgentResult};

/// Mapping `AgentId → Agent` with insertion-ordered iteration.
///
/// Insertion order is maintained for deterministic tick processing but is
/// not semantically significant.
#[derive(Default)]
pub struct AgentRegistry {
    order: Vec<AgentId>,
    agents: FxHashMap<AgentId, Agent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new agent.  Fails with [`AgentError::DuplicateAgent`] if the
    /// ID is already registered.
    pub fn insert(&mut self, agent: Agent) -> AgentResult<()> {
        let id = agent.id().clone();
        if self.agents.contains_key(&id) {
            return Err(AgentError::DuplicateAgent(id));
        }
        self.order.push(id.clone());
        self.agents.insert(id, agent);
        Ok(())
    }

    /// Remove and return an agent.  `None` if the ID is not registered.
    pub fn remove(&mut self, id: &AgentId) -> Option<Agent> {
        let agent = self.agents.remove(id)?;
        self.order.retain(|a| a != id);
        Some(agent)
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.contains_key(id)
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered IDs in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &AgentId> {
        self.order.iter()
    }

    /// Snapshot of the registered IDs, for diffing against a live-ID set
    /// while the registry is mutated.
    pub fn id_set(&self) -> FxHashSet<AgentId> {
        self.order.iter().cloned().collect()
    }

    /// Agents in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.order.iter().filter_map(|id| self.agents.get(id))
    }
}
