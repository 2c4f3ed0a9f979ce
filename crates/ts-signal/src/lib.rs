//! `ts-signal` — traffic-signal population defaults.
//!
//! Signal controllers are agents too: they observe their own light state
//! and command a replacement state string each tick.  The default model
//! simply holds a fixed state; real signal policies implement
//! [`DecisionModel`][ts_agent::DecisionModel] against the same sensor.

pub mod controller;
pub mod factory;
pub mod model;
pub mod sensor;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use controller::SignalStateController;
pub use factory::FixedStateSignalFactory;
pub use model::FixedStateModel;
pub use sensor::SignalStateSensor;
