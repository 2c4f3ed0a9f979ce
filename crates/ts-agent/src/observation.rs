//! Observation value types.
//!
//! An [`Observation`] maps each installed sensor's name to that sensor's
//! latest [`SensorReading`].  Readings are typed per sensor family; decision
//! models pull the reading they need by name and downcast with the `as_*`
//! accessors.

use rustc_hash::FxHashMap;

use ts_core::AgentId;

// ── State records ─────────────────────────────────────────────────────────────

/// Basic kinematic state of one vehicle, as reported by the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleState {
    pub id: AgentId,
    /// Longitudinal speed in m/s.
    pub velocity: f64,
    /// Position in network coordinates (x, y), in m.
    pub position: (f64, f64),
    /// Heading angle in degrees.
    pub heading: f64,
    pub edge_id: String,
    pub lane_id: String,
    pub lane_index: u32,
    /// Acceleration over the last tick, in m/s².
    pub acceleration: f64,
    /// Vehicle length in m.
    pub length: f64,
}

/// One neighbor slot of the neighborhood observation.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborRecord {
    pub id: AgentId,
    /// Longitudinal speed in m/s.
    pub velocity: f64,
    /// Bumper-to-bumper gap to the ego vehicle, min-gap compensated, in m.
    pub gap: f64,
    pub position: (f64, f64),
    pub heading: f64,
    pub lane_index: u32,
    pub acceleration: f64,
}

/// Ego state plus the six neighbor slots around it.
///
/// Absent neighbors (nothing within observation range, or no such lane) are
/// `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborhoodObservation {
    pub ego: VehicleState,
    /// Ego's configured min-gap, used by gap arithmetic downstream.
    pub min_gap: f64,
    /// Whether the adjacent left/right lane exists and is drivable by the
    /// ego vehicle's class.
    pub can_change_left: bool,
    pub can_change_right: bool,
    /// Lateral speed and offset of the ego vehicle.
    pub lateral_speed: f64,
    pub lateral_offset: f64,
    pub lead: Option<NeighborRecord>,
    pub follow: Option<NeighborRecord>,
    pub left_lead: Option<NeighborRecord>,
    pub left_follow: Option<NeighborRecord>,
    pub right_lead: Option<NeighborRecord>,
    pub right_follow: Option<NeighborRecord>,
}

/// State of one vulnerable road user.
#[derive(Clone, Debug, PartialEq)]
pub struct VruState {
    pub id: AgentId,
    pub velocity: f64,
    pub position: (f64, f64),
    pub heading: f64,
}

/// Current state string of a signal controller.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalStateReading {
    /// One light definition per controlled link (`rugGyYoO` alphabet).
    pub state: String,
}

// ── SensorReading ─────────────────────────────────────────────────────────────

/// The value one sensor produced, tagged by sensor family.
#[derive(Clone, Debug, PartialEq)]
pub enum SensorReading {
    VehicleState(VehicleState),
    Neighborhood(Box<NeighborhoodObservation>),
    Vru(VruState),
    SignalState(SignalStateReading),
}

impl SensorReading {
    pub fn as_vehicle_state(&self) -> Option<&VehicleState> {
        match self {
            SensorReading::VehicleState(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_neighborhood(&self) -> Option<&NeighborhoodObservation> {
        match self {
            SensorReading::Neighborhood(n) => Some(n.as_ref()),
            _ => None,
        }
    }

    pub fn as_vru(&self) -> Option<&VruState> {
        match self {
            SensorReading::Vru(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_signal_state(&self) -> Option<&SignalStateReading> {
        match self {
            SensorReading::SignalState(s) => Some(s),
            _ => None,
        }
    }
}

// ── Observation ───────────────────────────────────────────────────────────────

/// Sensor name → latest reading, assembled fresh each time an agent
/// observes by reading every installed sensor's cached value.
#[derive(Clone, Debug, Default)]
pub struct Observation {
    readings: FxHashMap<String, SensorReading>,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, reading: SensorReading) {
        self.readings.insert(name.into(), reading);
    }

    pub fn get(&self, name: &str) -> Option<&SensorReading> {
        self.readings.get(name)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SensorReading)> {
        self.readings.iter().map(|(k, v)| (k.as_str(), v))
    }
}
