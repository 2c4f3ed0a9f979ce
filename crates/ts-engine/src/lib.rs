//! `ts-engine` — the seam between the agent kernel and the authoritative
//! simulation engine.
//!
//! The authoritative engine owns ground truth: which entities exist, their
//! kinematic state, and the execution of low-level motion commands.  This
//! crate defines the narrow, object-safe [`SimEngine`] trait that the rest
//! of `rust_ts` consumes, so that a native binding can be injected at
//! scheduler construction and swapped without touching agent code.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`engine`]   | `SimEngine` trait, `LaneSide`, `LaneLink`                 |
//! | [`topology`] | bounded-hop relative-lane resolution (`RelativeLane`)     |
//! | [`scripted`] | `ScriptedEngine` — in-memory binding that journals        |
//! |              | commands and replays configured state (tests, examples)   |
//! | [`error`]    | `EngineError`, `EngineResult<T>`                          |

pub mod engine;
pub mod error;
pub mod scripted;
pub mod topology;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use engine::{LaneLink, LaneSide, SimEngine, DEFAULT_LANE_CHANGE_MODE, DEFAULT_SPEED_MODE};
pub use error::{EngineError, EngineResult};
pub use scripted::{IssuedCommand, ScriptedEngine, ScriptedVehicle, ScriptedVru};
pub use topology::{relative_lane_index, RelativeLane, MAX_LANE_WALK_HOPS};
