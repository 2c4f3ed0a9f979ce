//! `ts-sim` — the scheduler that drives agents against the authoritative
//! engine.
//!
//! # Tick anatomy
//!
//! ```text
//! step():
//!   ① record_step_start_time   (priority −10 000, built-in)
//!   ② environment_step         (priority       0, built-in)
//!        reconcile every population against the engine's live IDs,
//!        then run the environment logic (observe → decide → act)
//!   ③ engine_advance           (priority      10, built-in)
//!   ④ pace_step_end            (priority +10 000, built-in, optional)
//! ```
//!
//! Steps are pipeline invocations: environment-supplied hooks slot in at
//! priority 0 and therefore always run strictly after the timing hook and
//! strictly before the pacing hook.  A hook returning
//! [`HookOutcome::Halt`] stops the remainder of that invocation — and only
//! that exact outcome does; there is no "falsy" generalization.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`pipeline`]  | `Pipeline`, `PipelineElement`, `HookOutcome`, `HookArgs`|
//! | [`context`]   | `Context` — the shared hook-to-hook channel             |
//! | [`env`]       | `PopulationSync` reconciliation, `EnvLogic`,            |
//! |               | `WorldView`, `AgentEnvironment`, `StepDecision`         |
//! | [`template`]  | `TemplateLogic` — decide/act/stop-when-drained default  |
//! | [`telemetry`] | `TelemetrySink`, `NoopSink`, `ControlInfo`              |
//! | [`pacing`]    | `Pacer` — optional real-time step pacing                |
//! | [`sim`]       | `Simulator<E>`, `RunState`, priority constants          |
//! | [`error`]     | `SimError`, `SimResult<T>`                              |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ts_engine::ScriptedEngine;
//! use ts_sim::{AgentEnvironment, PopulationSync, Simulator, TemplateLogic};
//! use ts_vehicle::IdmVehicleFactory;
//! use ts_core::Population;
//!
//! let env = AgentEnvironment::new(TemplateLogic)
//!     .with_population(PopulationSync::new(Population::Vehicle, IdmVehicleFactory::default()));
//! let mut sim = Simulator::new(ScriptedEngine::new(0.1), env);
//! sim.run()?;
//! ```

pub mod context;
pub mod env;
pub mod error;
pub mod pacing;
pub mod pipeline;
pub mod sim;
pub mod telemetry;
pub mod template;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use context::{Context, StopRequest};
pub use env::{AgentEnvironment, EnvLogic, PopulationSync, StepDecision, WorldView};
pub use error::{SimError, SimResult};
pub use pacing::Pacer;
pub use pipeline::{HookArgs, HookOutcome, Pipeline, PipelineElement};
pub use sim::{priority, RunState, Simulator};
pub use telemetry::{ControlInfo, DecisionRecord, NoopSink, TelemetrySink};
pub use template::TemplateLogic;
