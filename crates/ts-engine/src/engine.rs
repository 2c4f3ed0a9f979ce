//! The `SimEngine` trait — everything the agent kernel asks of the
//! authoritative engine, and nothing more.

use ts_core::{AgentId, InitialSpawnInfo, Population};

use crate::EngineResult;

/// Speed mode restoring the engine's full safety envelope (safe speed,
/// acceleration/deceleration bounds, right-of-way, red lights).
pub const DEFAULT_SPEED_MODE: u32 = 31;

/// Lane-change mode letting the engine's own model execute all changes
/// unless they conflict with an external request.
pub const DEFAULT_LANE_CHANGE_MODE: u32 = 1621;

/// Direction of a lateral query or maneuver, relative to travel direction.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LaneSide {
    Left,
    Right,
}

/// One outgoing connection of a lane at a junction.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneLink {
    /// The successor lane this link leads into.
    pub lane_id: String,
}

/// Binding to the authoritative simulation engine.
///
/// The engine is a black box that owns entity existence, kinematics, and
/// command execution.  Bindings are injected at scheduler construction
/// (`Simulator::new` in `ts-sim`), so the same agent code runs against a
/// native engine binding or the in-memory [`ScriptedEngine`][crate::ScriptedEngine].
///
/// # Conventions
///
/// - Getters take `&self` and are queried freely within a tick; sensor
///   caching in `ts-agent` guarantees at most one fetch per sensor per tick
///   regardless of consumer count.
/// - Setters take `&mut self` and are executed at most once per agent per
///   tick, after all decisions for the tick are made.
/// - All getters on a despawned agent return [`EngineError::UnknownAgent`]
///   rather than panicking — reconciliation runs before agents act, but a
///   binding must stay robust against mid-tick engine-side removal.
pub trait SimEngine {
    // ── Lifecycle & clock ─────────────────────────────────────────────────

    /// Launch or connect the engine.  Called once by the scheduler's
    /// `start()` before the start pipeline runs.
    fn launch(&mut self) -> EngineResult<()>;

    /// Close the engine.  Called once by the scheduler's `stop()` after the
    /// stop pipeline ran.
    fn shutdown(&mut self);

    /// Advance the simulation by exactly one tick.
    fn advance_one_tick(&mut self);

    /// The engine's own clock reading, in simulated seconds.
    ///
    /// Strictly increases across `advance_one_tick` calls; sensor caches key
    /// on this value, never on wall-clock time.
    fn current_clock(&self) -> f64;

    /// Simulated seconds per tick.
    fn step_length(&self) -> f64;

    /// IDs of all live entities of `population`, queried once per
    /// population per tick by reconciliation.
    fn live_agent_ids(&self, population: Population) -> Vec<AgentId>;

    /// Live vehicles plus vehicles still waiting to be inserted.  Zero means
    /// the scenario has drained.
    fn expected_vehicle_count(&self) -> usize;

    /// Insert a new agent into the engine.  `info` is consumed once.
    fn spawn(&mut self, id: &AgentId, population: Population, info: &InitialSpawnInfo)
        -> EngineResult<()>;

    /// Remove an agent from the engine.
    fn despawn(&mut self, id: &AgentId, population: Population) -> EngineResult<()>;

    // ── Vehicle kinematic getters ─────────────────────────────────────────

    /// Longitudinal speed in m/s.
    fn speed(&self, id: &AgentId) -> EngineResult<f64>;

    /// Position in network coordinates (x, y), in m.
    fn position(&self, id: &AgentId) -> EngineResult<(f64, f64)>;

    /// Heading angle in degrees.
    fn heading(&self, id: &AgentId) -> EngineResult<f64>;

    /// Acceleration over the last tick, in m/s².
    fn acceleration(&self, id: &AgentId) -> EngineResult<f64>;

    /// Lateral speed in m/s.
    fn lateral_speed(&self, id: &AgentId) -> EngineResult<f64>;

    /// Lateral offset from the lane center, in m.
    fn lateral_offset(&self, id: &AgentId) -> EngineResult<f64>;

    /// ID of the edge (road) the vehicle drives on.
    fn edge_id(&self, id: &AgentId) -> EngineResult<String>;

    /// ID of the lane the vehicle drives on.
    fn lane_id(&self, id: &AgentId) -> EngineResult<String>;

    /// Index of the vehicle's lane on its edge (0 = rightmost).
    fn lane_index(&self, id: &AgentId) -> EngineResult<u32>;

    /// Vehicle length in m.
    fn vehicle_length(&self, id: &AgentId) -> EngineResult<f64>;

    /// Minimum standstill gap the vehicle keeps to its leader, in m.
    fn min_gap(&self, id: &AgentId) -> EngineResult<f64>;

    /// `true` if the adjacent lane on `side` exists and is drivable by this
    /// vehicle's class.
    fn adjacent_lane_drivable(&self, id: &AgentId, side: LaneSide) -> EngineResult<bool>;

    /// Closest leader within `range` meters: `(leader_id, raw_gap)`.
    ///
    /// The raw gap excludes the ego vehicle's min-gap; callers that want the
    /// bumper-to-bumper distance compensate with [`min_gap`][Self::min_gap].
    fn leader(&self, id: &AgentId, range: f64) -> EngineResult<Option<(AgentId, f64)>>;

    /// Closest follower within `range` meters: `(follower_id, raw_gap)`.
    /// The raw gap excludes the follower's min-gap.
    fn follower(&self, id: &AgentId, range: f64) -> EngineResult<Option<(AgentId, f64)>>;

    /// Closest leader on the adjacent lane on `side`, raw gap as in
    /// [`leader`][Self::leader].  `None` if the lane is empty or absent.
    fn neighbor_leader(&self, id: &AgentId, side: LaneSide, range: f64)
        -> EngineResult<Option<(AgentId, f64)>>;

    /// Closest follower on the adjacent lane on `side`.
    fn neighbor_follower(&self, id: &AgentId, side: LaneSide, range: f64)
        -> EngineResult<Option<(AgentId, f64)>>;

    // ── Lane topology ─────────────────────────────────────────────────────

    /// Outgoing links of `lane_id` at its downstream junction.
    fn lane_links(&self, lane_id: &str) -> EngineResult<Vec<LaneLink>>;

    /// The edge a lane belongs to.
    fn lane_to_edge(&self, lane_id: &str) -> EngineResult<String>;

    // ── Vehicle command setters ───────────────────────────────────────────

    /// Set the engine-side speed safety envelope bitmask
    /// (see [`DEFAULT_SPEED_MODE`]; 0 removes all limits).
    fn set_speed_mode(&mut self, id: &AgentId, mode: u32) -> EngineResult<()>;

    /// Set the engine-side lane-change behavior bitmask
    /// (see [`DEFAULT_LANE_CHANGE_MODE`]; 0 disables the engine's own model).
    fn set_lane_change_mode(&mut self, id: &AgentId, mode: u32) -> EngineResult<()>;

    /// Hold `acceleration` for `duration` seconds: the engine ramps the
    /// vehicle towards `max(0, v + acceleration * (step_length + duration))`
    /// over `duration`.
    fn accelerate(&mut self, id: &AgentId, acceleration: f64, duration: f64) -> EngineResult<()>;

    /// Complete a one-lane lateral maneuver towards `side` within
    /// `duration` seconds.
    fn change_lane(&mut self, id: &AgentId, side: LaneSide, duration: f64) -> EngineResult<()>;

    /// Teleport the vehicle to an absolute transform.  `keep_route` follows
    /// the engine's convention: 1 = snap to route, 0 = snap to closest edge,
    /// 2 = free placement.
    fn move_to(&mut self, id: &AgentId, position: (f64, f64), angle: f64, keep_route: u8)
        -> EngineResult<()>;

    /// Fix the vehicle's speed (overriding car-following) until reset.
    fn set_speed(&mut self, id: &AgentId, speed: f64) -> EngineResult<()>;

    /// Register engine-side state subscriptions for a vehicle, covering
    /// ego state and surroundings within `range` meters.
    fn subscribe_vehicle(&mut self, id: &AgentId, range: f64) -> EngineResult<()>;

    /// Release all subscriptions held for a vehicle.
    fn unsubscribe_vehicle(&mut self, id: &AgentId) -> EngineResult<()>;

    // ── Vulnerable road users ─────────────────────────────────────────────

    fn vru_speed(&self, id: &AgentId) -> EngineResult<f64>;

    fn vru_position(&self, id: &AgentId) -> EngineResult<(f64, f64)>;

    fn vru_heading(&self, id: &AgentId) -> EngineResult<f64>;

    /// Teleport a vulnerable road user to an absolute transform.
    fn vru_move_to(&mut self, id: &AgentId, position: (f64, f64), angle: f64, keep_route: u8)
        -> EngineResult<()>;

    fn vru_set_speed(&mut self, id: &AgentId, speed: f64) -> EngineResult<()>;

    // ── Traffic signals ───────────────────────────────────────────────────

    /// The signal's state string, one light definition per controlled link
    /// (`rugGyYoO` alphabet).
    fn signal_state(&self, id: &AgentId) -> EngineResult<String>;

    /// Replace the signal's full state string.
    fn set_signal_state(&mut self, id: &AgentId, state: &str) -> EngineResult<()>;
}
