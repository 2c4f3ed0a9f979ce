//! Unit tests for the VRU population defaults.

use ts_core::AgentId;
use ts_engine::{IssuedCommand, ScriptedEngine, ScriptedVru};

use ts_agent::{
    AgentController, AgentFactory, AgentSensor, ControlCommand, LonLatCommand, Observation,
    SensorReading, TransformCommand,
};

use crate::{PassiveVruFactory, VruMoveController, VruStateSensor};

fn id(s: &str) -> AgentId {
    AgentId::new(s)
}

fn engine_with_vru() -> ScriptedEngine {
    let mut engine = ScriptedEngine::new(1.0);
    engine.add_vru("ped_0", ScriptedVru { speed: 1.4, position: (3.0, 4.0), heading: 90.0 });
    engine
}

#[test]
fn sensor_reports_vru_state() {
    let engine = engine_with_vru();
    let sensor = VruStateSensor::new();
    let reading = sensor.fetch(&id("ped_0"), &engine).unwrap();
    let state = reading.as_vru().unwrap();
    assert_eq!(state.velocity, 1.4);
    assert_eq!(state.position, (3.0, 4.0));
}

#[test]
fn controller_moves_vru() {
    let mut engine = engine_with_vru();
    let mut controller = VruMoveController::new();
    let cmd = ControlCommand::Transform(TransformCommand {
        velocity: Some(1.0),
        ..TransformCommand::new((10.0, 20.0), 45.0)
    });
    assert!(controller.is_command_legal(&id("ped_0"), &cmd, &engine));
    controller
        .execute_control_command(&id("ped_0"), &cmd, &Observation::new(), &mut engine)
        .unwrap();
    assert!(engine.commands().iter().any(|c| matches!(
        c,
        IssuedCommand::VruMoveTo { position, .. } if *position == (10.0, 20.0)
    )));
    assert!(engine
        .commands()
        .contains(&IssuedCommand::VruSetSpeed { id: id("ped_0"), speed: 1.0 }));
}

#[test]
fn controller_rejects_foreign_shape() {
    let engine = engine_with_vru();
    let controller = VruMoveController::new();
    let cmd = ControlCommand::LonLat(LonLatCommand::central(1.0));
    assert!(!controller.is_command_legal(&id("ped_0"), &cmd, &engine));
}

#[test]
fn factory_builds_passive_agent() {
    let mut engine = engine_with_vru();
    let mut agent = PassiveVruFactory.create(&id("ped_0"), &engine).unwrap();
    agent.install(&mut engine).unwrap();

    let obs = agent.observe(&engine).unwrap();
    assert!(matches!(obs.get(VruStateSensor::NAME), Some(SensorReading::Vru(_))));

    let (cmd, info) = agent.make_decision(&engine).unwrap();
    assert!(cmd.is_none(), "passive VRUs defer to the engine");
    assert!(info.is_none());
}
