//! Telemetry sink — the information-extraction boundary.
//!
//! The scheduler invokes the sink at run start, per-tick snapshot, and
//! termination.  Writing the data anywhere (files, sockets, dashboards) is
//! the sink implementation's business, not this crate's.

use std::collections::BTreeMap;

use ts_agent::{ControlCommand, DecisionInfo};
use ts_core::AgentId;

/// One agent's decision for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionRecord {
    /// The commanded control, `None` when the model deferred to the engine.
    pub command: Option<ControlCommand>,
    pub info: DecisionInfo,
}

/// All decisions of one tick, keyed by agent.
pub type ControlInfo = BTreeMap<AgentId, DecisionRecord>;

/// Callbacks the scheduler invokes on the information/telemetry collector.
///
/// All methods default to no-ops so implementors only override what they
/// record.
pub trait TelemetrySink: 'static {
    /// Called once when the run starts.
    fn on_initialize(&mut self) {}

    /// Called after each tick's decisions, with the full control info.
    fn on_step_snapshot(&mut self, _control_info: &ControlInfo) {}

    /// Called when the run terminates.  `stopped` is `true` for an
    /// environment-requested termination.
    fn on_terminate(&mut self, _stopped: bool, _reason: &str, _info: &BTreeMap<String, String>) {}
}

/// A [`TelemetrySink`] that records nothing.
pub struct NoopSink;

impl TelemetrySink for NoopSink {}
