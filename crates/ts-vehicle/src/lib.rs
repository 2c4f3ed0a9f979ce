//! `ts-vehicle` — default sensors, decision model, and controllers for the
//! vehicle population.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`sensors`]   | `EgoStateSensor`, `NeighborhoodSensor`                    |
//! | [`idm`]       | `IdmModel` — IDM car-following + MOBIL lane changes,      |
//! |               | deterministic or stochastic longitudinal output           |
//! | [`lon_lat`]   | `LonLatController` — speed-envelope clamping and the      |
//! |               | multi-tick lateral maneuver state machine                 |
//! | [`transform`] | `TransformController` — absolute teleport commands        |
//! | [`factory`]   | `IdmVehicleFactory` — wires the defaults together         |
//!
//! The decision model consumes only the observation (all engine access goes
//! through the sensors), the controllers consume the engine (all policy
//! stays in the model).  That split is the contract every vehicle variant
//! follows.

pub mod factory;
pub mod idm;
pub mod lon_lat;
pub mod sensors;
pub mod transform;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use factory::IdmVehicleFactory;
pub use idm::{IdmConfig, IdmModel, MobilConfig};
pub use lon_lat::{LonLatConfig, LonLatController};
pub use sensors::{EgoStateSensor, NeighborhoodSensor, MIN_GAP_FALLBACK};
pub use transform::TransformController;
