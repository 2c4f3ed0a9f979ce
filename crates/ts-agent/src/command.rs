//! Control-command value types.
//!
//! A decision model's output is a `ControlCommand`; a controller declares
//! which [`CommandKind`] it accepts and validates the rest.  One variant
//! exists per controller family, plus [`Sequence`][ControlCommand::Sequence]
//! for composite outputs whose elements are applied independently.

use ts_engine::LaneSide;

/// Lateral component of a [`LonLatCommand`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LateralMode {
    /// Begin a one-lane maneuver to the left.
    Left,
    /// Begin a one-lane maneuver to the right.
    Right,
    /// Hold (recenter within) the current lane.
    Central,
    /// Defer lateral behavior to the authoritative engine's own
    /// lane-changing model.
    Engine,
}

impl LateralMode {
    /// `true` for the modes that request an actual lane change.
    #[inline]
    pub fn is_lane_change(self) -> bool {
        matches!(self, LateralMode::Left | LateralMode::Right)
    }

    /// The maneuver direction, for the lane-change modes.
    #[inline]
    pub fn side(self) -> Option<LaneSide> {
        match self {
            LateralMode::Left => Some(LaneSide::Left),
            LateralMode::Right => Some(LaneSide::Right),
            _ => None,
        }
    }
}

/// Coupled longitudinal/lateral command for maneuver controllers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LonLatCommand {
    /// Requested acceleration in m/s² (clamped to the controller's speed
    /// envelope at execution time).
    pub longitudinal: f64,
    pub lateral: LateralMode,
}

impl LonLatCommand {
    /// A pure car-following command: hold the lane, apply `acceleration`.
    pub fn central(acceleration: f64) -> Self {
        Self { longitudinal: acceleration, lateral: LateralMode::Central }
    }
}

/// Absolute transform command for teleport-style controllers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformCommand {
    /// Target position in network coordinates (x, y), in m.
    pub position: (f64, f64),
    /// Speed to fix after the move; `None` leaves speed untouched.
    pub velocity: Option<f64>,
    /// Heading angle in degrees.
    pub angle: f64,
    /// Engine route-snapping convention (2 = free placement).
    pub keep_route: u8,
    /// Speed-mode bitmask applied before the move.
    pub speed_mode: u32,
}

impl TransformCommand {
    pub fn new(position: (f64, f64), angle: f64) -> Self {
        Self { position, velocity: None, angle, keep_route: 2, speed_mode: 32 }
    }
}

/// Shape tag of a command, matched against the controller's declared schema.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandKind {
    LonLat,
    Transform,
    SignalState,
}

/// A control command, tagged by controller family.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlCommand {
    LonLat(LonLatCommand),
    Transform(TransformCommand),
    /// Full red-yellow-green state string for a signal controller.
    SignalState(String),
    /// Composite command; each element is checked and applied independently,
    /// in order.
    Sequence(Vec<ControlCommand>),
}

impl ControlCommand {
    /// The command's shape tag; `None` for a sequence (sequences are
    /// flattened before schema checks apply).
    pub fn kind(&self) -> Option<CommandKind> {
        match self {
            ControlCommand::LonLat(_) => Some(CommandKind::LonLat),
            ControlCommand::Transform(_) => Some(CommandKind::Transform),
            ControlCommand::SignalState(_) => Some(CommandKind::SignalState),
            ControlCommand::Sequence(_) => None,
        }
    }
}
