//! The shared per-run context.
//!
//! One `Context` flows by reference through every hook invocation of all
//! three pipelines for the lifetime of a run.  It carries the explicit,
//! typed channels the environment and hooks communicate over: per-population
//! controlled-ID restrictions and the termination request.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use ts_core::{AgentId, Population};

/// A termination request raised by the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopRequest {
    pub reason: String,
    pub info: BTreeMap<String, String>,
}

/// Typed hook-to-hook state for one run.
#[derive(Default)]
pub struct Context {
    /// `Some(set)` restricts a population to those IDs (intersected with
    /// the engine's live report); `None` tracks everything the engine has.
    controlled: [Option<FxHashSet<AgentId>>; 3],
    stop_request: Option<StopRequest>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Controlled-ID restriction ─────────────────────────────────────────

    /// Restrict `population` to an explicit ID set for subsequent ticks.
    pub fn restrict(
        &mut self,
        population: Population,
        ids: impl IntoIterator<Item = AgentId>,
    ) {
        self.controlled[population.index()] = Some(ids.into_iter().collect());
    }

    /// Remove the restriction: track everything the engine reports again.
    pub fn clear_restriction(&mut self, population: Population) {
        self.controlled[population.index()] = None;
    }

    pub fn controlled(&self, population: Population) -> Option<&FxHashSet<AgentId>> {
        self.controlled[population.index()].as_ref()
    }

    /// Whether `id` falls under this population's restriction (everything
    /// does when no restriction is set).
    pub fn is_controlled(&self, population: Population, id: &AgentId) -> bool {
        match &self.controlled[population.index()] {
            Some(ids) => ids.contains(id),
            None => true,
        }
    }

    // ── Termination ───────────────────────────────────────────────────────

    /// Request the run to stop at this tick boundary.  Only the
    /// environment's termination path calls this.
    pub fn request_stop(&mut self, reason: impl Into<String>, info: BTreeMap<String, String>) {
        self.stop_request = Some(StopRequest { reason: reason.into(), info });
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_request.is_some()
    }

    pub(crate) fn take_stop_request(&mut self) -> Option<StopRequest> {
        self.stop_request.take()
    }
}
