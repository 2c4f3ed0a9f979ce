//! `ts-agent` — agent composition and the sensor → decision → controller
//! contract.
//!
//! An [`Agent`] is one engine entity's software representation: a set of
//! named sensors, exactly one decision model, and exactly one controller,
//! under a stable [`AgentId`][ts_core::AgentId].  Agents are constructed by
//! an [`AgentFactory`] when reconciliation finds a new live ID, `install`ed
//! to wire their components to the engine, and `uninstall`ed before removal.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`command`]     | `ControlCommand` variants, `LateralMode`, `CommandKind` |
//! | [`observation`] | `Observation`, `SensorReading`, state records           |
//! | [`sensor`]      | `AgentSensor` trait + clock-scoped caching              |
//! | [`decision`]    | `DecisionModel` trait, `EngineModel` placeholder        |
//! | [`controller`]  | `AgentController` trait, `ControllerState` machine      |
//! | [`agent`]       | `Agent`, `AgentParams`                                  |
//! | [`registry`]    | `AgentRegistry` — insertion-ordered, unique keys        |
//! | [`factory`]     | `AgentFactory` trait                                    |
//! | [`error`]       | `AgentError`, `AgentResult<T>`                          |
//!
//! # Tick discipline
//!
//! Within one tick every consumer sees the same world: sensor values are
//! memoized against the engine's clock, so a sensor is fetched at most once
//! per tick no matter how many readers ask.  Decisions for a tick are made
//! from observations captured before any controller side effect of that
//! tick executes — the environment in `ts-sim` enforces the two-phase
//! ordering; this crate guarantees the caching.

pub mod agent;
pub mod command;
pub mod controller;
pub mod decision;
pub mod error;
pub mod factory;
pub mod observation;
pub mod registry;
pub mod sensor;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use agent::{Agent, AgentParams};
pub use command::{CommandKind, ControlCommand, LateralMode, LonLatCommand, TransformCommand};
pub use controller::{AgentController, ControllerState};
pub use decision::{DecisionInfo, DecisionModel, EngineModel};
pub use error::{AgentError, AgentResult};
pub use factory::AgentFactory;
pub use registry::AgentRegistry;
pub use observation::{
    NeighborRecord, NeighborhoodObservation, Observation, SensorReading, SignalStateReading,
    VehicleState, VruState,
};
pub use sensor::AgentSensor;
