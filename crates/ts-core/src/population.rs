//! The agent categories tracked against the authoritative engine.

use std::fmt;

/// One tracked agent population.
///
/// Each population has its own registry, factory, and live-ID report from
/// the authoritative engine; reconciliation runs per population every tick.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Population {
    /// Motorized vehicles.
    Vehicle,
    /// Pedestrians, cyclists, and other vulnerable road users.
    VulnerableRoadUser,
    /// Signal controllers (traffic lights).
    TrafficSignal,
}

impl Population {
    /// All populations, in reconciliation order.
    pub const ALL: [Population; 3] = [
        Population::Vehicle,
        Population::VulnerableRoadUser,
        Population::TrafficSignal,
    ];

    /// Dense index for per-population lookup tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Population::Vehicle => 0,
            Population::VulnerableRoadUser => 1,
            Population::TrafficSignal => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Population::Vehicle => "vehicle",
            Population::VulnerableRoadUser => "vulnerable_road_user",
            Population::TrafficSignal => "traffic_signal",
        }
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
