//! The `Agent` — one engine entity's software representation.

use tracing::debug;

use ts_core::AgentId;
use ts_engine::SimEngine;

use crate::sensor::SensorSlot;
use crate::{
    AgentController, AgentError, AgentResult, AgentSensor, ControlCommand, DecisionInfo,
    DecisionModel, Observation,
};

// ── AgentParams ───────────────────────────────────────────────────────────────

/// Per-agent parameters with population-specific defaults.
///
/// Construct via the population constructors and override fields with
/// struct-update syntax:
///
/// ```rust
/// use ts_agent::AgentParams;
///
/// let params = AgentParams { obs_range: 80.0, ..AgentParams::vehicle() };
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AgentParams {
    /// Human-readable category tag, used in diagnostics.
    pub agent_type: &'static str,
    /// How far (m) this agent's sensors observe surroundings.
    pub obs_range: f64,
}

impl AgentParams {
    pub fn vehicle() -> Self {
        Self { agent_type: "vehicle", obs_range: 120.0 }
    }

    pub fn vulnerable_road_user() -> Self {
        Self { agent_type: "vulnerable_road_user", obs_range: 50.0 }
    }

    pub fn traffic_signal() -> Self {
        Self { agent_type: "traffic_signal", obs_range: 0.0 }
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// One sensor set + one decision model + one controller under a stable ID.
///
/// # Lifecycle
///
/// 1. Constructed by the population's [`AgentFactory`][crate::AgentFactory]
///    when the authoritative engine reports the ID as live.
/// 2. [`install`][Self::install] wires sensors, decision model, and
///    controller to this agent instance.
/// 3. Observes/decides/acts each tick while registered.
/// 4. [`uninstall`][Self::uninstall] releases sensor subscriptions; the
///    registry then drops the agent.  An `Agent` never outlives its
///    registry entry.
///
/// # Panics
///
/// [`observe`][Self::observe], [`make_decision`][Self::make_decision], and
/// [`apply_control`][Self::apply_control] panic when called before
/// `install` — a lifecycle programming error, not a runtime condition.
pub struct Agent {
    id: AgentId,
    params: AgentParams,
    sensors: Vec<SensorSlot>,
    decision_model: Box<dyn DecisionModel>,
    controller: Box<dyn AgentController>,
    installed: bool,
}

impl Agent {
    /// Compose an agent from its parts.
    ///
    /// Fails with [`AgentError::DuplicateSensor`] when two sensors share a
    /// name — a programming error in the factory, surfaced at construction.
    pub fn new(
        id: AgentId,
        sensors: Vec<Box<dyn AgentSensor>>,
        decision_model: Box<dyn DecisionModel>,
        controller: Box<dyn AgentController>,
        params: AgentParams,
    ) -> AgentResult<Self> {
        let mut slots: Vec<SensorSlot> = Vec::with_capacity(sensors.len());
        for sensor in sensors {
            if slots.iter().any(|s| s.sensor.name() == sensor.name()) {
                return Err(AgentError::DuplicateSensor {
                    agent: id,
                    name: sensor.name().to_owned(),
                });
            }
            slots.push(SensorSlot::new(sensor));
        }
        Ok(Self {
            id,
            params,
            sensors: slots,
            decision_model,
            controller,
            installed: false,
        })
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Bind sensors, decision model, and controller to this agent.
    ///
    /// Must be called after the agent exists in the engine (sensors may
    /// register subscriptions) and before the first `observe`.
    pub fn install(&mut self, engine: &mut dyn SimEngine) -> AgentResult<()> {
        for slot in &mut self.sensors {
            slot.sensor.install(&self.id, engine)?;
        }
        self.decision_model.install(&self.id);
        self.controller.install(&self.id, engine);
        self.installed = true;
        Ok(())
    }

    /// Release sensor subscriptions.  Called before registry removal; the
    /// agent may be re-installed later (tests do), so caches are dropped.
    pub fn uninstall(&mut self, engine: &mut dyn SimEngine) {
        for slot in &mut self.sensors {
            slot.sensor.uninstall(&self.id, engine);
            slot.invalidate();
        }
        self.installed = false;
    }

    // ── Per-tick contract ─────────────────────────────────────────────────

    /// Assemble the observation by reading every sensor's current cached
    /// value (at most one engine fetch per sensor per tick).
    pub fn observe(&mut self, engine: &dyn SimEngine) -> AgentResult<Observation> {
        assert!(self.installed, "agent {}: observe before install", self.id);
        let mut observation = Observation::new();
        for slot in &mut self.sensors {
            let reading = slot.observation(&self.id, engine)?;
            observation.insert(slot.sensor.name().to_owned(), reading);
        }
        Ok(observation)
    }

    /// Observe, then ask the decision model for `(command, info)`.
    pub fn make_decision(
        &mut self,
        engine: &dyn SimEngine,
    ) -> AgentResult<(Option<ControlCommand>, DecisionInfo)> {
        assert!(self.installed, "agent {}: make_decision before install", self.id);
        let observation = self.observe(engine)?;
        self.decision_model.derive_control_command(&observation)
    }

    /// Check and execute a control command.
    ///
    /// Sequences are flattened: each element is checked and applied
    /// independently, in order.  Illegal commands (schema mismatch or
    /// controller veto) are dropped for this tick — non-fatal, reported via
    /// the diagnostic log only.
    pub fn apply_control(
        &mut self,
        command: &ControlCommand,
        engine: &mut dyn SimEngine,
    ) -> AgentResult<()> {
        assert!(self.installed, "agent {}: apply_control before install", self.id);
        // One state-machine advance per tick, not per sequence element.
        self.controller.begin_tick();
        let observation = self.observe(engine)?;
        self.apply_inner(command, &observation, engine)
    }

    fn apply_inner(
        &mut self,
        command: &ControlCommand,
        observation: &Observation,
        engine: &mut dyn SimEngine,
    ) -> AgentResult<()> {
        if let ControlCommand::Sequence(elements) = command {
            for element in elements {
                self.apply_inner(element, observation, engine)?;
            }
            return Ok(());
        }

        let conforms = command.kind() == Some(self.controller.schema());
        if conforms && self.controller.is_command_legal(&self.id, command, engine) {
            self.controller
                .execute_control_command(&self.id, command, observation, engine)
        } else {
            debug!(agent = %self.id, ?command, "dropping illegal control command");
            Ok(())
        }
    }
}
