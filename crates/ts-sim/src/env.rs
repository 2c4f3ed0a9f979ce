//! Environment layer: registry reconciliation and user logic.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use tracing::trace;

use ts_agent::{AgentFactory, AgentRegistry};
use ts_core::{AgentId, Population};
use ts_engine::SimEngine;

use crate::pipeline::HookOutcome;
use crate::telemetry::{ControlInfo, DecisionRecord, NoopSink, TelemetrySink};
use crate::{Context, SimError, SimResult};

// ── PopulationSync ────────────────────────────────────────────────────────────

/// One tracked population: its registry plus the factory that builds its
/// agents.
pub struct PopulationSync {
    kind: Population,
    registry: AgentRegistry,
    factory: Box<dyn AgentFactory>,
}

impl PopulationSync {
    pub fn new(kind: Population, factory: impl AgentFactory) -> Self {
        Self {
            kind,
            registry: AgentRegistry::new(),
            factory: Box::new(factory),
        }
    }

    pub fn kind(&self) -> Population {
        self.kind
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AgentRegistry {
        &mut self.registry
    }

    /// Align the registry with the engine's live-ID report.
    ///
    /// 1. Authoritative set = live report, intersected with the context's
    ///    controlled-ID restriction if one is set.
    /// 2. Arrivals (authoritative − local): construct via the factory,
    ///    insert, then install.
    /// 3. Departures (local − authoritative): uninstall, then remove.
    ///
    /// Idempotent: an unchanged authoritative set yields zero installs and
    /// zero uninstalls.
    pub(crate) fn reconcile(
        &mut self,
        engine: &mut dyn SimEngine,
        ctx: &Context,
    ) -> SimResult<()> {
        let live: Vec<AgentId> = engine
            .live_agent_ids(self.kind)
            .into_iter()
            .filter(|id| ctx.is_controlled(self.kind, id))
            .collect();
        let live_set: FxHashSet<AgentId> = live.iter().cloned().collect();

        // Equal sets — nothing to do.
        if live_set.len() == self.registry.len()
            && self.registry.ids().all(|id| live_set.contains(id))
        {
            return Ok(());
        }
        trace!(
            population = %self.kind,
            live = live_set.len(),
            local = self.registry.len(),
            "reconciling registry"
        );

        for id in &live {
            if !self.registry.contains(id) {
                self.admit(id, engine)?;
            }
        }

        let departed: Vec<AgentId> = self
            .registry
            .ids()
            .filter(|id| !live_set.contains(*id))
            .cloned()
            .collect();
        for id in &departed {
            self.evict(id, engine);
        }
        Ok(())
    }

    /// Construct, register, and install one agent.
    pub(crate) fn admit(&mut self, id: &AgentId, engine: &mut dyn SimEngine) -> SimResult<()> {
        let agent = self.factory.create(id, engine)?;
        self.registry.insert(agent)?;
        if let Some(agent) = self.registry.get_mut(id) {
            agent.install(engine)?;
        }
        Ok(())
    }

    /// Uninstall and drop one agent.  A no-op for unknown IDs.
    pub(crate) fn evict(&mut self, id: &AgentId, engine: &mut dyn SimEngine) {
        if let Some(agent) = self.registry.get_mut(id) {
            agent.uninstall(engine);
        }
        self.registry.remove(id);
    }
}

// ── EnvLogic ──────────────────────────────────────────────────────────────────

/// What the environment decided about continuing the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepDecision {
    Continue,
    /// Stop normally.
    Stop,
    /// Stop with a structured reason for the telemetry sink.
    StopWithInfo {
        reason: String,
        info: BTreeMap<String, String>,
    },
}

/// User-defined environment behavior.
///
/// [`on_step`][Self::on_step] runs every tick after reconciliation, with
/// the populations already aligned to the engine.  Returning a stop
/// decision terminates the run at this tick boundary.
pub trait EnvLogic: 'static {
    fn on_start(&mut self, _world: &mut WorldView<'_>) -> SimResult<()> {
        Ok(())
    }

    fn on_step(&mut self, world: &mut WorldView<'_>) -> SimResult<StepDecision>;

    fn on_stop(&mut self, _world: &mut WorldView<'_>) -> SimResult<()> {
        Ok(())
    }
}

// ── WorldView ─────────────────────────────────────────────────────────────────

/// Everything [`EnvLogic`] may touch during one callback.
pub struct WorldView<'a> {
    pub engine: &'a mut dyn SimEngine,
    pub ctx: &'a mut Context,
    populations: &'a mut [PopulationSync],
    telemetry: &'a mut dyn TelemetrySink,
}

impl WorldView<'_> {
    pub fn population(&self, kind: Population) -> Option<&PopulationSync> {
        self.populations.iter().find(|p| p.kind == kind)
    }

    pub fn population_mut(&mut self, kind: Population) -> Option<&mut PopulationSync> {
        self.populations.iter_mut().find(|p| p.kind == kind)
    }

    /// Ask every registered agent of `kind` for its decision, in registry
    /// order.  All observations are captured before any command executes.
    pub fn make_decisions(&mut self, kind: Population) -> SimResult<ControlInfo> {
        let mut control = ControlInfo::new();
        let Some(population) = self.populations.iter_mut().find(|p| p.kind == kind) else {
            return Ok(control);
        };
        let ids: Vec<AgentId> = population.registry.ids().cloned().collect();
        for id in ids {
            if let Some(agent) = population.registry.get_mut(&id) {
                let (command, info) = agent.make_decision(&*self.engine)?;
                control.insert(id, DecisionRecord { command, info });
            }
        }
        Ok(control)
    }

    /// Apply the commands collected by
    /// [`make_decisions`][Self::make_decisions].  Agents whose record holds
    /// no command are left to the engine.
    pub fn execute_control(&mut self, kind: Population, control: &ControlInfo) -> SimResult<()> {
        let Some(population) = self.populations.iter_mut().find(|p| p.kind == kind) else {
            return Ok(());
        };
        for (id, record) in control {
            let Some(command) = &record.command else {
                continue;
            };
            if let Some(agent) = population.registry.get_mut(id) {
                agent.apply_control(command, &mut *self.engine)?;
            }
        }
        Ok(())
    }

    /// Forward this tick's control info to the telemetry sink.
    pub fn snapshot(&mut self, control: &ControlInfo) {
        self.telemetry.on_step_snapshot(control);
    }
}

// ── AgentEnvironment ──────────────────────────────────────────────────────────

/// Wall-clock bookkeeping of one run (engine-clock values).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeInfo {
    pub start_clock: Option<f64>,
    pub end_clock: Option<f64>,
}

/// The environment: tracked populations, user logic, and the telemetry
/// sink, wired into the scheduler's pipelines.
pub struct AgentEnvironment {
    logic: Box<dyn EnvLogic>,
    telemetry: Box<dyn TelemetrySink>,
    populations: Vec<PopulationSync>,
    episode: EpisodeInfo,
}

impl AgentEnvironment {
    pub fn new(logic: impl EnvLogic) -> Self {
        Self {
            logic: Box::new(logic),
            telemetry: Box::new(NoopSink),
            populations: Vec::new(),
            episode: EpisodeInfo::default(),
        }
    }

    pub fn with_telemetry(mut self, sink: impl TelemetrySink) -> Self {
        self.telemetry = Box::new(sink);
        self
    }

    /// Track a population.  Re-adding a kind replaces its previous entry.
    pub fn with_population(mut self, population: PopulationSync) -> Self {
        self.populations.retain(|p| p.kind != population.kind);
        self.populations.push(population);
        self
    }

    pub fn population(&self, kind: Population) -> Option<&PopulationSync> {
        self.populations.iter().find(|p| p.kind == kind)
    }

    pub fn population_mut(&mut self, kind: Population) -> Option<&mut PopulationSync> {
        self.populations.iter_mut().find(|p| p.kind == kind)
    }

    pub fn episode(&self) -> &EpisodeInfo {
        &self.episode
    }

    // ── Pipeline-facing hooks ─────────────────────────────────────────────

    pub(crate) fn start(
        &mut self,
        engine: &mut dyn SimEngine,
        ctx: &mut Context,
    ) -> SimResult<HookOutcome> {
        self.episode = EpisodeInfo {
            start_clock: Some(engine.current_clock()),
            end_clock: None,
        };
        self.telemetry.on_initialize();
        let mut world = WorldView {
            engine: &mut *engine,
            ctx: &mut *ctx,
            populations: &mut self.populations,
            telemetry: &mut *self.telemetry,
        };
        self.logic.on_start(&mut world)?;
        Ok(HookOutcome::Proceed)
    }

    pub(crate) fn step(
        &mut self,
        engine: &mut dyn SimEngine,
        ctx: &mut Context,
    ) -> SimResult<HookOutcome> {
        // Reconciliation always completes before any agent observes or
        // decides this tick.
        for population in &mut self.populations {
            population.reconcile(engine, ctx)?;
        }

        let decision = {
            let mut world = WorldView {
                engine: &mut *engine,
                ctx: &mut *ctx,
                populations: &mut self.populations,
                telemetry: &mut *self.telemetry,
            };
            self.logic.on_step(&mut world)?
        };

        match decision {
            StepDecision::Continue => Ok(HookOutcome::Proceed),
            StepDecision::Stop => {
                self.request_termination(engine, ctx, "simulation ended normally", BTreeMap::new());
                Ok(HookOutcome::Halt)
            }
            StepDecision::StopWithInfo { reason, info } => {
                self.request_termination(engine, ctx, &reason, info);
                Ok(HookOutcome::Halt)
            }
        }
    }

    pub(crate) fn stop(
        &mut self,
        engine: &mut dyn SimEngine,
        ctx: &mut Context,
    ) -> SimResult<HookOutcome> {
        let mut world = WorldView {
            engine: &mut *engine,
            ctx: &mut *ctx,
            populations: &mut self.populations,
            telemetry: &mut *self.telemetry,
        };
        self.logic.on_stop(&mut world)?;
        Ok(HookOutcome::Proceed)
    }

    pub(crate) fn admit(
        &mut self,
        kind: Population,
        id: &AgentId,
        engine: &mut dyn SimEngine,
    ) -> SimResult<()> {
        let population = self
            .population_mut(kind)
            .ok_or_else(|| SimError::Config(format!("no {kind} population registered")))?;
        population.admit(id, engine)
    }

    pub(crate) fn evict(&mut self, kind: Population, id: &AgentId, engine: &mut dyn SimEngine) {
        if let Some(population) = self.population_mut(kind) {
            population.evict(id, engine);
        }
    }

    fn request_termination(
        &mut self,
        engine: &dyn SimEngine,
        ctx: &mut Context,
        reason: &str,
        info: BTreeMap<String, String>,
    ) {
        // The run effectively ended at the previous tick boundary.
        self.episode.end_clock = Some(engine.current_clock() - engine.step_length());
        self.telemetry.on_terminate(true, reason, &info);
        ctx.request_stop(reason, info);
    }
}
