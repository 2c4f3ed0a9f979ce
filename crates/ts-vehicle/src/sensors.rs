//! Vehicle sensors: basic ego state and the six-slot neighborhood.

use ts_core::AgentId;
use ts_engine::{LaneSide, SimEngine};

use ts_agent::{
    AgentResult, AgentSensor, NeighborRecord, NeighborhoodObservation, SensorReading, VehicleState,
};

/// Min-gap assumed when the engine cannot report one.
pub const MIN_GAP_FALLBACK: f64 = 3.28;

fn vehicle_state(agent: &AgentId, engine: &dyn SimEngine) -> AgentResult<VehicleState> {
    Ok(VehicleState {
        id: agent.clone(),
        velocity: engine.speed(agent)?,
        position: engine.position(agent)?,
        heading: engine.heading(agent)?,
        edge_id: engine.edge_id(agent)?,
        lane_id: engine.lane_id(agent)?,
        lane_index: engine.lane_index(agent)?,
        acceleration: engine.acceleration(agent)?,
        length: engine.vehicle_length(agent)?,
    })
}

// ── EgoStateSensor ────────────────────────────────────────────────────────────

/// Reports the ego vehicle's basic kinematic state.
#[derive(Default)]
pub struct EgoStateSensor;

impl EgoStateSensor {
    pub const NAME: &'static str = "ego";

    pub fn new() -> Self {
        Self
    }
}

impl AgentSensor for EgoStateSensor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fetch(&self, agent: &AgentId, engine: &dyn SimEngine) -> AgentResult<SensorReading> {
        Ok(SensorReading::VehicleState(vehicle_state(agent, engine)?))
    }
}

// ── NeighborhoodSensor ────────────────────────────────────────────────────────

/// Reports the ego state plus the lead/follow vehicles on the current and
/// both adjacent lanes, within the configured observation range.
///
/// Gap convention: the engine reports raw gaps excluding min-gaps; this
/// sensor compensates so that `NeighborRecord::gap` is the planning gap the
/// decision models expect — leaders get the ego's min-gap added, followers
/// get their own.  Records whose compensated gap exceeds the observation
/// range are dropped, same as an empty lane.
pub struct NeighborhoodSensor {
    obs_range: f64,
}

impl NeighborhoodSensor {
    pub const NAME: &'static str = "neighborhood";

    pub fn new(obs_range: f64) -> Self {
        Self { obs_range }
    }
}

impl AgentSensor for NeighborhoodSensor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn install(&mut self, agent: &AgentId, engine: &mut dyn SimEngine) -> AgentResult<()> {
        engine.subscribe_vehicle(agent, self.obs_range)?;
        Ok(())
    }

    fn uninstall(&mut self, agent: &AgentId, engine: &mut dyn SimEngine) {
        // The agent may already be gone engine-side; releasing twice is fine.
        let _ = engine.unsubscribe_vehicle(agent);
    }

    fn fetch(&self, agent: &AgentId, engine: &dyn SimEngine) -> AgentResult<SensorReading> {
        let ego = vehicle_state(agent, engine)?;
        let min_gap = engine.min_gap(agent).unwrap_or(MIN_GAP_FALLBACK);

        let lead = self.record(engine, engine.leader(agent, self.obs_range)?, min_gap)?;
        let follow = self.follower_record(engine, engine.follower(agent, self.obs_range)?)?;
        let left_lead = self.record(
            engine,
            engine.neighbor_leader(agent, LaneSide::Left, self.obs_range)?,
            min_gap,
        )?;
        let right_lead = self.record(
            engine,
            engine.neighbor_leader(agent, LaneSide::Right, self.obs_range)?,
            min_gap,
        )?;
        let left_follow = self.follower_record(
            engine,
            engine.neighbor_follower(agent, LaneSide::Left, self.obs_range)?,
        )?;
        let right_follow = self.follower_record(
            engine,
            engine.neighbor_follower(agent, LaneSide::Right, self.obs_range)?,
        )?;

        Ok(SensorReading::Neighborhood(Box::new(NeighborhoodObservation {
            min_gap,
            can_change_left: engine.adjacent_lane_drivable(agent, LaneSide::Left)?,
            can_change_right: engine.adjacent_lane_drivable(agent, LaneSide::Right)?,
            lateral_speed: engine.lateral_speed(agent)?,
            lateral_offset: engine.lateral_offset(agent)?,
            ego,
            lead,
            follow,
            left_lead,
            left_follow,
            right_lead,
            right_follow,
        })))
    }
}

impl NeighborhoodSensor {
    /// Leader-side record: compensate the raw gap with the ego's min-gap.
    fn record(
        &self,
        engine: &dyn SimEngine,
        slot: Option<(AgentId, f64)>,
        ego_min_gap: f64,
    ) -> AgentResult<Option<NeighborRecord>> {
        match slot {
            Some((id, raw_gap)) => self.build(engine, id, raw_gap + ego_min_gap),
            None => Ok(None),
        }
    }

    /// Follower-side record: compensate with the follower's own min-gap.
    fn follower_record(
        &self,
        engine: &dyn SimEngine,
        slot: Option<(AgentId, f64)>,
    ) -> AgentResult<Option<NeighborRecord>> {
        match slot {
            Some((id, raw_gap)) => {
                let their_min_gap = engine.min_gap(&id).unwrap_or(MIN_GAP_FALLBACK);
                self.build(engine, id, raw_gap + their_min_gap)
            }
            None => Ok(None),
        }
    }

    fn build(
        &self,
        engine: &dyn SimEngine,
        id: AgentId,
        gap: f64,
    ) -> AgentResult<Option<NeighborRecord>> {
        if gap > self.obs_range {
            return Ok(None);
        }
        Ok(Some(NeighborRecord {
            velocity: engine.speed(&id)?,
            position: engine.position(&id)?,
            heading: engine.heading(&id)?,
            lane_index: engine.lane_index(&id)?,
            acceleration: engine.acceleration(&id)?,
            gap,
            id,
        }))
    }
}
