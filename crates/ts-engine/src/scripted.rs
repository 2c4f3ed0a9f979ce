//! `ScriptedEngine` — an in-memory [`SimEngine`] binding.
//!
//! The scripted binding replays whatever state its owner configures and
//! journals every command it receives.  It is **not** a traffic model: it
//! performs no car-following, no lane-change dynamics, no collision checks.
//! Its two jobs are
//!
//! 1. letting tests and examples drive the full kernel without a native
//!    engine process, and
//! 2. documenting, in executable form, what each `SimEngine` method is
//!    expected to do.
//!
//! The only state it evolves on its own is the clock (advances by one step
//! length per tick) and vehicle speed under a pending `accelerate` command
//! (`v ← max(0, v + a·Δt)` at the next tick).

use rustc_hash::{FxHashMap, FxHashSet};

use ts_core::{AgentId, InitialSpawnInfo, Population};

use crate::{EngineError, EngineResult, LaneLink, LaneSide, SimEngine};
use crate::engine::{DEFAULT_LANE_CHANGE_MODE, DEFAULT_SPEED_MODE};

// ── Scripted state records ────────────────────────────────────────────────────

/// Configurable state of one scripted vehicle.  All fields are public so
/// tests can arrange exactly the situation they need.
#[derive(Clone, Debug)]
pub struct ScriptedVehicle {
    pub speed: f64,
    pub position: (f64, f64),
    pub heading: f64,
    pub acceleration: f64,
    pub lateral_speed: f64,
    pub lateral_offset: f64,
    pub edge_id: String,
    pub lane_index: u32,
    /// Number of lanes on `edge_id`; bounds adjacency checks.
    pub lane_count: u32,
    pub length: f64,
    pub min_gap: f64,
    /// Whether the vehicle's class may use the adjacent left/right lane
    /// (on top of the lane existing at all).
    pub left_drivable: bool,
    pub right_drivable: bool,
    /// Neighbor slots as `(id, raw_gap)`; `None` = slot empty.
    pub leader: Option<(AgentId, f64)>,
    pub follower: Option<(AgentId, f64)>,
    pub left_leader: Option<(AgentId, f64)>,
    pub left_follower: Option<(AgentId, f64)>,
    pub right_leader: Option<(AgentId, f64)>,
    pub right_follower: Option<(AgentId, f64)>,
    pub speed_mode: u32,
    pub lane_change_mode: u32,
    /// `(acceleration, duration)` set by `accelerate`, applied at the next
    /// `advance_one_tick`.
    pub pending_accel: Option<(f64, f64)>,
}

impl Default for ScriptedVehicle {
    fn default() -> Self {
        Self {
            speed: 0.0,
            position: (0.0, 0.0),
            heading: 0.0,
            acceleration: 0.0,
            lateral_speed: 0.0,
            lateral_offset: 0.0,
            edge_id: "edge0".to_owned(),
            lane_index: 0,
            lane_count: 1,
            length: 5.0,
            min_gap: 2.5,
            left_drivable: true,
            right_drivable: true,
            leader: None,
            follower: None,
            left_leader: None,
            left_follower: None,
            right_leader: None,
            right_follower: None,
            speed_mode: DEFAULT_SPEED_MODE,
            lane_change_mode: DEFAULT_LANE_CHANGE_MODE,
            pending_accel: None,
        }
    }
}

impl ScriptedVehicle {
    /// A vehicle cruising at `speed` m/s on a lane of a multi-lane edge.
    pub fn cruising(speed: f64, lane_index: u32, lane_count: u32) -> Self {
        Self { speed, lane_index, lane_count, ..Self::default() }
    }

    fn lane_id(&self) -> String {
        format!("{}_{}", self.edge_id, self.lane_index)
    }
}

/// Configurable state of one scripted vulnerable road user.
#[derive(Clone, Debug, Default)]
pub struct ScriptedVru {
    pub speed: f64,
    pub position: (f64, f64),
    pub heading: f64,
}

/// Every side effect a `ScriptedEngine` has been asked to perform, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum IssuedCommand {
    Spawn { id: AgentId, population: Population },
    Despawn { id: AgentId, population: Population },
    SetSpeedMode { id: AgentId, mode: u32 },
    SetLaneChangeMode { id: AgentId, mode: u32 },
    Accelerate { id: AgentId, acceleration: f64, duration: f64 },
    ChangeLane { id: AgentId, side: LaneSide, duration: f64 },
    MoveTo { id: AgentId, position: (f64, f64), angle: f64, keep_route: u8 },
    SetSpeed { id: AgentId, speed: f64 },
    VruMoveTo { id: AgentId, position: (f64, f64), angle: f64, keep_route: u8 },
    VruSetSpeed { id: AgentId, speed: f64 },
    SetSignalState { id: AgentId, state: String },
}

// ── ScriptedEngine ────────────────────────────────────────────────────────────

/// In-memory engine binding.  See the module docs for scope.
pub struct ScriptedEngine {
    clock: f64,
    step_length: f64,
    vehicles: FxHashMap<AgentId, ScriptedVehicle>,
    vehicle_order: Vec<AgentId>,
    vrus: FxHashMap<AgentId, ScriptedVru>,
    vru_order: Vec<AgentId>,
    signals: FxHashMap<AgentId, String>,
    signal_order: Vec<AgentId>,
    /// Outgoing links per lane ID, for topology walks.
    lane_links: FxHashMap<String, Vec<LaneLink>>,
    /// Lane ID → owning edge ID.
    lane_edges: FxHashMap<String, String>,
    /// Vehicles not yet inserted, counted into `expected_vehicle_count`.
    pub waiting_to_insert: usize,
    subscriptions: FxHashSet<AgentId>,
    commands: Vec<IssuedCommand>,
    launched: bool,
}

impl ScriptedEngine {
    pub fn new(step_length: f64) -> Self {
        Self {
            clock: 0.0,
            step_length,
            vehicles: FxHashMap::default(),
            vehicle_order: Vec::new(),
            vrus: FxHashMap::default(),
            vru_order: Vec::new(),
            signals: FxHashMap::default(),
            signal_order: Vec::new(),
            lane_links: FxHashMap::default(),
            lane_edges: FxHashMap::default(),
            waiting_to_insert: 0,
            subscriptions: FxHashSet::default(),
            commands: Vec::new(),
            launched: false,
        }
    }

    // ── Scenario setup ────────────────────────────────────────────────────

    pub fn add_vehicle(&mut self, id: impl Into<AgentId>, vehicle: ScriptedVehicle) {
        let id = id.into();
        if self.vehicles.insert(id.clone(), vehicle).is_none() {
            self.vehicle_order.push(id);
        }
    }

    pub fn remove_vehicle(&mut self, id: &AgentId) {
        if self.vehicles.remove(id).is_some() {
            self.vehicle_order.retain(|v| v != id);
        }
    }

    pub fn add_vru(&mut self, id: impl Into<AgentId>, vru: ScriptedVru) {
        let id = id.into();
        if self.vrus.insert(id.clone(), vru).is_none() {
            self.vru_order.push(id);
        }
    }

    pub fn add_signal(&mut self, id: impl Into<AgentId>, state: impl Into<String>) {
        let id = id.into();
        if self.signals.insert(id.clone(), state.into()).is_none() {
            self.signal_order.push(id);
        }
    }

    /// Declare a lane with its owning edge and outgoing links.
    pub fn add_lane(&mut self, lane_id: &str, edge_id: &str, links: Vec<LaneLink>) {
        self.lane_edges.insert(lane_id.to_owned(), edge_id.to_owned());
        self.lane_links.insert(lane_id.to_owned(), links);
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// The command journal, in issue order.
    pub fn commands(&self) -> &[IssuedCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn vehicle(&self, id: &AgentId) -> Option<&ScriptedVehicle> {
        self.vehicles.get(id)
    }

    pub fn vehicle_mut(&mut self, id: &AgentId) -> Option<&mut ScriptedVehicle> {
        self.vehicles.get_mut(id)
    }

    pub fn is_subscribed(&self, id: &AgentId) -> bool {
        self.subscriptions.contains(id)
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    fn veh(&self, id: &AgentId) -> EngineResult<&ScriptedVehicle> {
        self.vehicles.get(id).ok_or_else(|| EngineError::UnknownAgent(id.clone()))
    }

    fn veh_mut(&mut self, id: &AgentId) -> EngineResult<&mut ScriptedVehicle> {
        self.vehicles.get_mut(id).ok_or_else(|| EngineError::UnknownAgent(id.clone()))
    }

    fn vru(&self, id: &AgentId) -> EngineResult<&ScriptedVru> {
        self.vrus.get(id).ok_or_else(|| EngineError::UnknownAgent(id.clone()))
    }
}

impl SimEngine for ScriptedEngine {
    // ── Lifecycle & clock ─────────────────────────────────────────────────

    fn launch(&mut self) -> EngineResult<()> {
        self.launched = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.launched = false;
    }

    fn advance_one_tick(&mut self) {
        self.clock += self.step_length;
        let dt = self.step_length;
        for vehicle in self.vehicles.values_mut() {
            if let Some((acc, _duration)) = vehicle.pending_accel.take() {
                vehicle.speed = (vehicle.speed + acc * dt).max(0.0);
                vehicle.acceleration = acc;
            }
        }
    }

    fn current_clock(&self) -> f64 {
        self.clock
    }

    fn step_length(&self) -> f64 {
        self.step_length
    }

    fn live_agent_ids(&self, population: Population) -> Vec<AgentId> {
        match population {
            Population::Vehicle => self.vehicle_order.clone(),
            Population::VulnerableRoadUser => self.vru_order.clone(),
            Population::TrafficSignal => self.signal_order.clone(),
        }
    }

    fn expected_vehicle_count(&self) -> usize {
        self.vehicles.len() + self.waiting_to_insert
    }

    fn spawn(
        &mut self,
        id: &AgentId,
        population: Population,
        info: &InitialSpawnInfo,
    ) -> EngineResult<()> {
        self.commands.push(IssuedCommand::Spawn { id: id.clone(), population });
        match population {
            Population::Vehicle => {
                let vehicle = ScriptedVehicle {
                    speed: info.depart.speed.max(0.0),
                    lane_index: info.depart.lane.unwrap_or(0),
                    ..ScriptedVehicle::default()
                };
                self.add_vehicle(id.clone(), vehicle);
            }
            Population::VulnerableRoadUser => self.add_vru(id.clone(), ScriptedVru::default()),
            Population::TrafficSignal => self.add_signal(id.clone(), String::new()),
        }
        Ok(())
    }

    fn despawn(&mut self, id: &AgentId, population: Population) -> EngineResult<()> {
        self.commands.push(IssuedCommand::Despawn { id: id.clone(), population });
        match population {
            Population::Vehicle => {
                self.remove_vehicle(id);
                self.subscriptions.remove(id);
            }
            Population::VulnerableRoadUser => {
                if self.vrus.remove(id).is_some() {
                    self.vru_order.retain(|v| v != id);
                }
            }
            Population::TrafficSignal => {
                if self.signals.remove(id).is_some() {
                    self.signal_order.retain(|v| v != id);
                }
            }
        }
        Ok(())
    }

    // ── Vehicle getters ───────────────────────────────────────────────────

    fn speed(&self, id: &AgentId) -> EngineResult<f64> {
        Ok(self.veh(id)?.speed)
    }

    fn position(&self, id: &AgentId) -> EngineResult<(f64, f64)> {
        Ok(self.veh(id)?.position)
    }

    fn heading(&self, id: &AgentId) -> EngineResult<f64> {
        Ok(self.veh(id)?.heading)
    }

    fn acceleration(&self, id: &AgentId) -> EngineResult<f64> {
        Ok(self.veh(id)?.acceleration)
    }

    fn lateral_speed(&self, id: &AgentId) -> EngineResult<f64> {
        Ok(self.veh(id)?.lateral_speed)
    }

    fn lateral_offset(&self, id: &AgentId) -> EngineResult<f64> {
        Ok(self.veh(id)?.lateral_offset)
    }

    fn edge_id(&self, id: &AgentId) -> EngineResult<String> {
        Ok(self.veh(id)?.edge_id.clone())
    }

    fn lane_id(&self, id: &AgentId) -> EngineResult<String> {
        Ok(self.veh(id)?.lane_id())
    }

    fn lane_index(&self, id: &AgentId) -> EngineResult<u32> {
        Ok(self.veh(id)?.lane_index)
    }

    fn vehicle_length(&self, id: &AgentId) -> EngineResult<f64> {
        Ok(self.veh(id)?.length)
    }

    fn min_gap(&self, id: &AgentId) -> EngineResult<f64> {
        Ok(self.veh(id)?.min_gap)
    }

    fn adjacent_lane_drivable(&self, id: &AgentId, side: LaneSide) -> EngineResult<bool> {
        let v = self.veh(id)?;
        Ok(match side {
            LaneSide::Left => v.lane_index + 1 < v.lane_count && v.left_drivable,
            LaneSide::Right => v.lane_index > 0 && v.right_drivable,
        })
    }

    fn leader(&self, id: &AgentId, range: f64) -> EngineResult<Option<(AgentId, f64)>> {
        Ok(self.veh(id)?.leader.clone().filter(|(_, gap)| *gap <= range))
    }

    fn follower(&self, id: &AgentId, range: f64) -> EngineResult<Option<(AgentId, f64)>> {
        Ok(self.veh(id)?.follower.clone().filter(|(_, gap)| *gap <= range))
    }

    fn neighbor_leader(
        &self,
        id: &AgentId,
        side: LaneSide,
        range: f64,
    ) -> EngineResult<Option<(AgentId, f64)>> {
        let v = self.veh(id)?;
        let slot = match side {
            LaneSide::Left => &v.left_leader,
            LaneSide::Right => &v.right_leader,
        };
        Ok(slot.clone().filter(|(_, gap)| *gap <= range))
    }

    fn neighbor_follower(
        &self,
        id: &AgentId,
        side: LaneSide,
        range: f64,
    ) -> EngineResult<Option<(AgentId, f64)>> {
        let v = self.veh(id)?;
        let slot = match side {
            LaneSide::Left => &v.left_follower,
            LaneSide::Right => &v.right_follower,
        };
        Ok(slot.clone().filter(|(_, gap)| *gap <= range))
    }

    // ── Lane topology ─────────────────────────────────────────────────────

    fn lane_links(&self, lane_id: &str) -> EngineResult<Vec<LaneLink>> {
        self.lane_links
            .get(lane_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownLane(lane_id.to_owned()))
    }

    fn lane_to_edge(&self, lane_id: &str) -> EngineResult<String> {
        self.lane_edges
            .get(lane_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownLane(lane_id.to_owned()))
    }

    // ── Vehicle setters ───────────────────────────────────────────────────

    fn set_speed_mode(&mut self, id: &AgentId, mode: u32) -> EngineResult<()> {
        self.veh_mut(id)?.speed_mode = mode;
        self.commands.push(IssuedCommand::SetSpeedMode { id: id.clone(), mode });
        Ok(())
    }

    fn set_lane_change_mode(&mut self, id: &AgentId, mode: u32) -> EngineResult<()> {
        self.veh_mut(id)?.lane_change_mode = mode;
        self.commands.push(IssuedCommand::SetLaneChangeMode { id: id.clone(), mode });
        Ok(())
    }

    fn accelerate(&mut self, id: &AgentId, acceleration: f64, duration: f64) -> EngineResult<()> {
        self.veh_mut(id)?.pending_accel = Some((acceleration, duration));
        self.commands.push(IssuedCommand::Accelerate {
            id: id.clone(),
            acceleration,
            duration,
        });
        Ok(())
    }

    fn change_lane(&mut self, id: &AgentId, side: LaneSide, duration: f64) -> EngineResult<()> {
        let v = self.veh_mut(id)?;
        match side {
            LaneSide::Left if v.lane_index + 1 < v.lane_count => v.lane_index += 1,
            LaneSide::Right if v.lane_index > 0 => v.lane_index -= 1,
            _ => {}
        }
        self.commands.push(IssuedCommand::ChangeLane { id: id.clone(), side, duration });
        Ok(())
    }

    fn move_to(
        &mut self,
        id: &AgentId,
        position: (f64, f64),
        angle: f64,
        keep_route: u8,
    ) -> EngineResult<()> {
        let v = self.veh_mut(id)?;
        v.position = position;
        v.heading = angle;
        self.commands.push(IssuedCommand::MoveTo {
            id: id.clone(),
            position,
            angle,
            keep_route,
        });
        Ok(())
    }

    fn set_speed(&mut self, id: &AgentId, speed: f64) -> EngineResult<()> {
        self.veh_mut(id)?.speed = speed;
        self.commands.push(IssuedCommand::SetSpeed { id: id.clone(), speed });
        Ok(())
    }

    fn subscribe_vehicle(&mut self, id: &AgentId, _range: f64) -> EngineResult<()> {
        self.subscriptions.insert(id.clone());
        Ok(())
    }

    fn unsubscribe_vehicle(&mut self, id: &AgentId) -> EngineResult<()> {
        self.subscriptions.remove(id);
        Ok(())
    }

    // ── Vulnerable road users ─────────────────────────────────────────────

    fn vru_speed(&self, id: &AgentId) -> EngineResult<f64> {
        Ok(self.vru(id)?.speed)
    }

    fn vru_position(&self, id: &AgentId) -> EngineResult<(f64, f64)> {
        Ok(self.vru(id)?.position)
    }

    fn vru_heading(&self, id: &AgentId) -> EngineResult<f64> {
        Ok(self.vru(id)?.heading)
    }

    fn vru_move_to(
        &mut self,
        id: &AgentId,
        position: (f64, f64),
        angle: f64,
        keep_route: u8,
    ) -> EngineResult<()> {
        let vru = self.vrus.get_mut(id).ok_or_else(|| EngineError::UnknownAgent(id.clone()))?;
        vru.position = position;
        vru.heading = angle;
        self.commands.push(IssuedCommand::VruMoveTo {
            id: id.clone(),
            position,
            angle,
            keep_route,
        });
        Ok(())
    }

    fn vru_set_speed(&mut self, id: &AgentId, speed: f64) -> EngineResult<()> {
        let vru = self.vrus.get_mut(id).ok_or_else(|| EngineError::UnknownAgent(id.clone()))?;
        vru.speed = speed;
        self.commands.push(IssuedCommand::VruSetSpeed { id: id.clone(), speed });
        Ok(())
    }

    // ── Traffic signals ───────────────────────────────────────────────────

    fn signal_state(&self, id: &AgentId) -> EngineResult<String> {
        self.signals
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownAgent(id.clone()))
    }

    fn set_signal_state(&mut self, id: &AgentId, state: &str) -> EngineResult<()> {
        let slot = self.signals.get_mut(id).ok_or_else(|| EngineError::UnknownAgent(id.clone()))?;
        *slot = state.to_owned();
        self.commands.push(IssuedCommand::SetSignalState {
            id: id.clone(),
            state: state.to_owned(),
        });
        Ok(())
    }
}
