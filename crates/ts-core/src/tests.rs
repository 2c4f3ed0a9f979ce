//! Unit tests for ts-core primitives.

#[cfg(test)]
mod ids {
    use crate::AgentId;

    #[test]
    fn content_equality() {
        let a = AgentId::new("CAV");
        let b: AgentId = "CAV".into();
        let c: AgentId = String::from("BV_1").into();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn clone_is_same_content() {
        let a = AgentId::new("BV_0");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.as_str(), "BV_0");
    }

    #[test]
    fn display_is_raw_string() {
        assert_eq!(AgentId::new("tls_7").to_string(), "tls_7");
    }

    #[test]
    fn usable_as_map_key() {
        use std::collections::HashMap;
        let mut m = HashMap::new();
        m.insert(AgentId::new("a"), 1);
        m.insert(AgentId::new("b"), 2);
        assert_eq!(m[&AgentId::new("a")], 1);
    }
}

#[cfg(test)]
mod population {
    use crate::Population;

    #[test]
    fn indices_are_dense() {
        for (i, p) in Population::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn labels() {
        assert_eq!(Population::Vehicle.to_string(), "vehicle");
        assert_eq!(Population::TrafficSignal.to_string(), "traffic_signal");
    }
}

#[cfg(test)]
mod spawn {
    use crate::{DepartureInfo, InitialSpawnInfo};

    #[test]
    fn departure_defaults() {
        let d = DepartureInfo::default();
        assert_eq!(d.position, 0.0);
        assert_eq!(d.speed, 0.0);
        assert!(d.lane.is_none());
        assert!(d.lane_id.is_none());
    }

    #[test]
    fn on_route_uses_engine_default_type() {
        let info = InitialSpawnInfo::on_route("route_0");
        assert_eq!(info.route, "route_0");
        assert_eq!(info.type_id, "DEFAULT_VEHTYPE");
        assert!(info.arrive.position.is_none());
    }
}

#[cfg(test)]
mod error {
    use crate::{AgentId, TsError, TsResult};

    #[test]
    fn messages_name_the_agent() {
        let err = TsError::AgentNotFound(AgentId::new("BV_3"));
        assert_eq!(err.to_string(), "agent BV_3 not found");
    }

    #[test]
    fn io_errors_convert() {
        fn read() -> TsResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(read(), Err(TsError::Io(_))));
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng, SimRng};

    #[test]
    fn same_seed_same_agent_same_stream() {
        let mut a = AgentRng::new(42, &AgentId::new("BV_1"));
        let mut b = AgentRng::new(42, &AgentId::new("BV_1"));
        for _ in 0..16 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn different_agents_different_streams() {
        let mut a = AgentRng::new(42, &AgentId::new("BV_1"));
        let mut b = AgentRng::new(42, &AgentId::new("BV_2"));
        let same = (0..16).filter(|_| a.random::<u64>() == b.random::<u64>()).count();
        assert!(same < 16, "streams should diverge");
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = AgentRng::new(7, &AgentId::new("x"));
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
        // Out-of-range p is clamped, not a panic.
        assert!(rng.gen_bool(2.0));
    }

    #[test]
    fn sim_rng_children_are_independent() {
        let mut root = SimRng::new(123);
        let mut c1 = root.child(1);
        let mut c2 = root.child(2);
        let same = (0..16).filter(|_| c1.random::<u64>() == c2.random::<u64>()).count();
        assert!(same < 16);
    }
}
