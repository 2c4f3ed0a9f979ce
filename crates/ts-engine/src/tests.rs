//! Unit tests for the scripted binding and topology walk.

use ts_core::{AgentId, InitialSpawnInfo, Population};

use crate::{
    relative_lane_index, IssuedCommand, LaneLink, LaneSide, RelativeLane, ScriptedEngine,
    ScriptedVehicle, SimEngine,
};

fn id(s: &str) -> AgentId {
    AgentId::new(s)
}

#[cfg(test)]
mod scripted {
    use super::*;

    #[test]
    fn clock_advances_by_step_length() {
        let mut engine = ScriptedEngine::new(0.1);
        assert_eq!(engine.current_clock(), 0.0);
        engine.advance_one_tick();
        engine.advance_one_tick();
        assert!((engine.current_clock() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn live_ids_in_setup_order() {
        let mut engine = ScriptedEngine::new(1.0);
        engine.add_vehicle("b", ScriptedVehicle::default());
        engine.add_vehicle("a", ScriptedVehicle::default());
        engine.add_vehicle("c", ScriptedVehicle::default());
        let ids = engine.live_agent_ids(Population::Vehicle);
        assert_eq!(ids, vec![id("b"), id("a"), id("c")]);
    }

    #[test]
    fn accelerate_applies_at_next_tick() {
        let mut engine = ScriptedEngine::new(1.0);
        engine.add_vehicle("v", ScriptedVehicle::cruising(10.0, 0, 1));
        engine.accelerate(&id("v"), 2.0, 1.0).unwrap();
        assert_eq!(engine.speed(&id("v")).unwrap(), 10.0, "speed changes only on advance");
        engine.advance_one_tick();
        assert!((engine.speed(&id("v")).unwrap() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn accelerate_floors_speed_at_zero() {
        let mut engine = ScriptedEngine::new(1.0);
        engine.add_vehicle("v", ScriptedVehicle::cruising(1.0, 0, 1));
        engine.accelerate(&id("v"), -4.0, 1.0).unwrap();
        engine.advance_one_tick();
        assert_eq!(engine.speed(&id("v")).unwrap(), 0.0);
    }

    #[test]
    fn adjacency_respects_lane_bounds() {
        let mut engine = ScriptedEngine::new(1.0);
        // Middle lane of three: both sides exist.
        engine.add_vehicle("m", ScriptedVehicle::cruising(0.0, 1, 3));
        // Rightmost lane: no right neighbor.
        engine.add_vehicle("r", ScriptedVehicle::cruising(0.0, 0, 3));
        // Leftmost lane: no left neighbor.
        engine.add_vehicle("l", ScriptedVehicle::cruising(0.0, 2, 3));
        assert!(engine.adjacent_lane_drivable(&id("m"), LaneSide::Left).unwrap());
        assert!(engine.adjacent_lane_drivable(&id("m"), LaneSide::Right).unwrap());
        assert!(!engine.adjacent_lane_drivable(&id("r"), LaneSide::Right).unwrap());
        assert!(!engine.adjacent_lane_drivable(&id("l"), LaneSide::Left).unwrap());
    }

    #[test]
    fn adjacency_respects_vehicle_class() {
        let mut engine = ScriptedEngine::new(1.0);
        let vehicle = ScriptedVehicle {
            left_drivable: false,
            ..ScriptedVehicle::cruising(0.0, 1, 3)
        };
        engine.add_vehicle("v", vehicle);
        assert!(!engine.adjacent_lane_drivable(&id("v"), LaneSide::Left).unwrap());
        assert!(engine.adjacent_lane_drivable(&id("v"), LaneSide::Right).unwrap());
    }

    #[test]
    fn neighbor_slots_filtered_by_range() {
        let mut engine = ScriptedEngine::new(1.0);
        let vehicle = ScriptedVehicle {
            leader: Some((id("lead"), 50.0)),
            left_leader: Some((id("far"), 500.0)),
            ..ScriptedVehicle::default()
        };
        engine.add_vehicle("v", vehicle);
        assert!(engine.leader(&id("v"), 120.0).unwrap().is_some());
        assert!(engine.leader(&id("v"), 10.0).unwrap().is_none());
        assert!(engine.neighbor_leader(&id("v"), LaneSide::Left, 120.0).unwrap().is_none());
    }

    #[test]
    fn spawn_despawn_roundtrip() {
        let mut engine = ScriptedEngine::new(1.0);
        let info = InitialSpawnInfo::on_route("r0");
        engine.spawn(&id("BV_0"), Population::Vehicle, &info).unwrap();
        assert_eq!(engine.live_agent_ids(Population::Vehicle), vec![id("BV_0")]);
        engine.despawn(&id("BV_0"), Population::Vehicle).unwrap();
        assert!(engine.live_agent_ids(Population::Vehicle).is_empty());
        assert!(matches!(engine.commands()[0], IssuedCommand::Spawn { .. }));
        assert!(matches!(engine.commands()[1], IssuedCommand::Despawn { .. }));
    }

    #[test]
    fn unknown_agent_errors_do_not_panic() {
        let engine = ScriptedEngine::new(1.0);
        assert!(engine.speed(&id("ghost")).is_err());
        assert!(engine.signal_state(&id("ghost")).is_err());
    }

    #[test]
    fn signal_state_roundtrip() {
        let mut engine = ScriptedEngine::new(1.0);
        engine.add_signal("tls", "rrrr");
        engine.set_signal_state(&id("tls"), "gggg").unwrap();
        assert_eq!(engine.signal_state(&id("tls")).unwrap(), "gggg");
    }
}

#[cfg(test)]
mod topology {
    use super::*;

    /// Two edges in a line, two lanes each: edgeA_* links into edgeB_*.
    fn two_edge_engine() -> ScriptedEngine {
        let mut engine = ScriptedEngine::new(1.0);
        engine.add_lane("edgeA_0", "edgeA", vec![LaneLink { lane_id: "edgeB_0".into() }]);
        engine.add_lane("edgeA_1", "edgeA", vec![LaneLink { lane_id: "edgeB_1".into() }]);
        engine.add_lane("edgeB_0", "edgeB", vec![]);
        engine.add_lane("edgeB_1", "edgeB", vec![]);
        engine
    }

    fn place(engine: &mut ScriptedEngine, veh: &str, edge: &str, lane_index: u32) {
        let vehicle = ScriptedVehicle {
            edge_id: edge.to_owned(),
            lane_index,
            lane_count: 2,
            ..ScriptedVehicle::default()
        };
        engine.add_vehicle(veh, vehicle);
    }

    #[test]
    fn same_edge_is_plain_difference() {
        let mut engine = two_edge_engine();
        place(&mut engine, "ego", "edgeA", 0);
        place(&mut engine, "other", "edgeA", 1);
        assert_eq!(
            relative_lane_index(&engine, &id("ego"), &id("other")),
            RelativeLane::Offset(1)
        );
    }

    #[test]
    fn downstream_edge_resolves_through_links() {
        let mut engine = two_edge_engine();
        place(&mut engine, "ego", "edgeA", 0);
        place(&mut engine, "other", "edgeB", 1);
        assert_eq!(
            relative_lane_index(&engine, &id("ego"), &id("other")),
            RelativeLane::Offset(1)
        );
    }

    #[test]
    fn ambiguous_junction_is_unknown() {
        let mut engine = two_edge_engine();
        // edgeA_0 now branches into two lanes — the walk must give up.
        engine.add_lane(
            "edgeA_0",
            "edgeA",
            vec![
                LaneLink { lane_id: "edgeB_0".into() },
                LaneLink { lane_id: "edgeC_0".into() },
            ],
        );
        place(&mut engine, "ego", "edgeA", 0);
        place(&mut engine, "other", "edgeB", 0);
        assert_eq!(
            relative_lane_index(&engine, &id("ego"), &id("other")),
            RelativeLane::Unknown
        );
    }

    #[test]
    fn hop_budget_exhaustion_is_unknown_not_hang() {
        let mut engine = ScriptedEngine::new(1.0);
        // A lane that links back to itself — malformed, would loop forever.
        engine.add_lane("loop_0", "loop", vec![LaneLink { lane_id: "loop_0".into() }]);
        place(&mut engine, "ego", "loop", 0);
        place(&mut engine, "other", "elsewhere", 0);
        assert_eq!(
            relative_lane_index(&engine, &id("ego"), &id("other")),
            RelativeLane::Unknown
        );
    }

    #[test]
    fn other_on_internal_lane_hops_to_exit() {
        let mut engine = two_edge_engine();
        // Internal junction lane ":j_0" exits into edgeB_1.
        engine.add_lane(":j_0", ":j", vec![LaneLink { lane_id: "edgeB_1".into() }]);
        place(&mut engine, "ego", "edgeA", 0);
        place(&mut engine, "other", ":j", 0);
        assert_eq!(
            relative_lane_index(&engine, &id("ego"), &id("other")),
            RelativeLane::Offset(1)
        );
    }
}
