//! `ts-core` — foundational types for the `rust_ts` traffic-agent framework.
//!
//! This crate is a dependency of every other `ts-*` crate.  It intentionally
//! has no `ts-*` dependencies and minimal external ones (only `rand`,
//! `rustc-hash`, and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module         | Contents                                             |
//! |----------------|------------------------------------------------------|
//! | [`ids`]        | `AgentId` — engine-assigned agent identity           |
//! | [`population`] | `Population` — the tracked agent categories          |
//! | [`spawn`]      | `InitialSpawnInfo`, `DepartureInfo`, `ArrivalInfo`   |
//! | [`rng`]        | `AgentRng` (per-agent), `SimRng` (global)            |
//! | [`error`]      | `TsError`, `TsResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod ids;
pub mod population;
pub mod rng;
pub mod spawn;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{TsError, TsResult};
pub use ids::AgentId;
pub use population::Population;
pub use rng::{AgentRng, SimRng};
pub use spawn::{ArrivalInfo, DepartureInfo, InitialSpawnInfo};
