//! Relative-lane resolution across junctions.
//!
//! Answers "how many lanes to the left/right of me is that vehicle?" when
//! the two vehicles may sit on different edges.  The walk follows each
//! lane's single outgoing link downstream until both vehicles are on the
//! same edge.  Junctions with multiple outgoing links are ambiguous — the
//! walk cannot know which branch the other vehicle took — and malformed
//! networks could loop, so the walk is bounded and degrades to a sentinel
//! instead of erroring.

use tracing::warn;

use ts_core::AgentId;

use crate::{LaneLink, SimEngine};

/// Upper bound on downstream hops before the walk gives up.
pub const MAX_LANE_WALK_HOPS: usize = 10;

/// Result of a relative-lane lookup.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RelativeLane {
    /// `other` is `n` lanes to the left of `ego` (negative = right).
    Offset(i32),
    /// The network junction was ambiguous or the walk exhausted its hop
    /// budget; the relationship cannot be determined.
    Unknown,
}

/// Lane offset of `other` relative to `ego`, walking downstream from
/// `ego`'s lane until both are on the same edge.
///
/// Never fails: unresolvable topology yields [`RelativeLane::Unknown`] and
/// a warning, matching the non-fatal contract of neighbor queries.
pub fn relative_lane_index(
    engine: &dyn SimEngine,
    ego: &AgentId,
    other: &AgentId,
) -> RelativeLane {
    let (Ok(mut lane_id), Ok(ego_edge)) = (engine.lane_id(ego), engine.edge_id(ego)) else {
        return RelativeLane::Unknown;
    };
    let mut edge = ego_edge;

    let (Ok(mut other_lane), Ok(mut other_edge)) = (engine.lane_id(other), engine.edge_id(other))
    else {
        return RelativeLane::Unknown;
    };

    // A vehicle on an internal junction lane has no stable lane index; hop
    // it forward onto the junction's single exit lane first.
    if other_edge.starts_with(':') {
        match single_link(engine, &other_lane) {
            Some(link) => {
                other_lane = link.lane_id;
                match engine.lane_to_edge(&other_lane) {
                    Ok(e) => other_edge = e,
                    Err(_) => return RelativeLane::Unknown,
                }
            }
            None => {
                warn!(ego = %ego, other = %other, "ambiguous junction, cannot locate vehicles");
                return RelativeLane::Unknown;
            }
        }
    }

    let Some(other_index) = lane_suffix_index(&other_lane) else {
        return RelativeLane::Unknown;
    };

    for _ in 0..MAX_LANE_WALK_HOPS {
        if other_edge == edge {
            let Some(ego_index) = lane_suffix_index(&lane_id) else {
                return RelativeLane::Unknown;
            };
            return RelativeLane::Offset(other_index - ego_index);
        }
        match single_link(engine, &lane_id) {
            Some(link) => {
                lane_id = link.lane_id;
                match engine.lane_to_edge(&lane_id) {
                    Ok(e) => edge = e,
                    Err(_) => return RelativeLane::Unknown,
                }
            }
            None => {
                warn!(ego = %ego, other = %other, "ambiguous junction, cannot locate vehicles");
                return RelativeLane::Unknown;
            }
        }
    }

    warn!(ego = %ego, other = %other, "no relative lane found within {MAX_LANE_WALK_HOPS} hops");
    RelativeLane::Unknown
}

/// The lane's single outgoing link, or `None` when the junction branches.
fn single_link(engine: &dyn SimEngine, lane_id: &str) -> Option<LaneLink> {
    match engine.lane_links(lane_id) {
        Ok(mut links) if links.len() == 1 => Some(links.remove(0)),
        _ => None,
    }
}

/// Lane index encoded as the `_<n>` suffix of a lane ID (`"edge1_2"` → 2).
fn lane_suffix_index(lane_id: &str) -> Option<i32> {
    lane_id.rsplit('_').next()?.parse().ok()
}
