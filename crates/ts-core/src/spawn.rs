//! Spawn-time value records.
//!
//! `InitialSpawnInfo` is handed to the authoritative engine exactly once,
//! when an agent is inserted into the network, and discarded afterwards.
//! The nested departure/arrival records mirror the engine's insertion
//! parameters; `None` fields mean "let the engine pick its default".

/// Where and how an agent enters the network.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DepartureInfo {
    /// Simulation time at which the agent should enter.  `None` = now.
    pub time: Option<f64>,
    /// Lane index to insert on.  `None` = engine's first free lane.
    pub lane: Option<u32>,
    /// Specific lane ID to move the agent onto right after insertion.
    pub lane_id: Option<String>,
    /// Longitudinal position on the departure lane, in m.
    pub position: f64,
    /// Speed at insertion, in m/s.  Negative values mean "engine default".
    pub speed: f64,
}

impl Default for DepartureInfo {
    fn default() -> Self {
        Self {
            time: None,
            lane: None,
            lane_id: None,
            position: 0.0,
            speed: 0.0,
        }
    }
}

/// Where and how an agent leaves the network.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrivalInfo {
    /// Lane index to arrive on.  `None` = current lane.
    pub lane: Option<u32>,
    /// Longitudinal position on the arrival lane.  `None` = lane end.
    pub position: Option<f64>,
    /// Speed at arrival.  `None` = current speed.
    pub speed: Option<f64>,
}

/// Everything the authoritative engine needs to insert a new agent.
///
/// Consumed once at spawn time.  Agents discovered through reconciliation
/// (already live in the engine) never carry one of these.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialSpawnInfo {
    /// Route ID the agent follows.
    pub route: String,
    /// Engine-side type ID (vehicle type, person type, …).
    pub type_id: String,
    pub depart: DepartureInfo,
    pub arrive: ArrivalInfo,
}

impl InitialSpawnInfo {
    /// Spawn info with default departure/arrival and the engine's default type.
    pub fn on_route(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            type_id: "DEFAULT_VEHTYPE".to_owned(),
            depart: DepartureInfo::default(),
            arrive: ArrivalInfo::default(),
        }
    }
}
