//! The `Simulator` — scheduler state machine and tick loop.

use ts_core::{AgentId, InitialSpawnInfo, Population};
use ts_engine::SimEngine;

use crate::pipeline::{HookArgs, HookOutcome, Pipeline};
use crate::{AgentEnvironment, Context, Pacer, SimError, SimResult};

/// Pre-wired priority classes of the built-in pipelines.
///
/// Environment-supplied hooks default to [`ENVIRONMENT`][priority::ENVIRONMENT]
/// and therefore always run strictly after the built-in timing hook and
/// strictly before the built-in pacing hook.
pub mod priority {
    /// Pre-tick bookkeeping (step start timestamp).
    pub const PRE_TICK: i32 = -10_000;
    /// User/environment logic.
    pub const ENVIRONMENT: i32 = 0;
    /// The authoritative engine's single-tick advance.
    pub const ENGINE_ADVANCE: i32 = 10;
    /// Post-tick bookkeeping (real-time pacing).
    pub const POST_TICK: i32 = 10_000;
}

/// Scheduler lifecycle: `NotStarted → Running → Stopped` (terminal).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RunState {
    NotStarted,
    Running,
    Stopped,
}

impl RunState {
    fn name(self) -> &'static str {
        match self {
            RunState::NotStarted => "not started",
            RunState::Running => "running",
            RunState::Stopped => "stopped",
        }
    }
}

/// Drives `start → {step}* → stop` against an injected engine binding.
///
/// The engine binding is chosen at construction (generic parameter `E`), so
/// the same scheduler runs against a native engine or the in-memory
/// [`ScriptedEngine`][ts_engine::ScriptedEngine].
pub struct Simulator<E: SimEngine + 'static> {
    engine: E,
    env: AgentEnvironment,
    ctx: Context,
    start_pipeline: Pipeline,
    step_pipeline: Pipeline,
    stop_pipeline: Pipeline,
    pacing: Pacer,
    state: RunState,
    /// Mutated only by the environment's termination request, observed at
    /// tick boundaries by [`run`][Self::run].
    running: bool,
}

impl<E: SimEngine + 'static> Simulator<E> {
    /// Wire a scheduler around `engine` and `env` with the built-in hooks
    /// installed.
    pub fn new(engine: E, env: AgentEnvironment) -> Self {
        let mut start_pipeline = Pipeline::new("start_pipeline");
        let mut step_pipeline = Pipeline::new("step_pipeline");
        let mut stop_pipeline = Pipeline::new("stop_pipeline");

        start_pipeline.hook(
            "environment_start",
            |args: &mut HookArgs<'_>| args.env.start(args.engine, args.ctx),
            priority::ENVIRONMENT,
        );
        step_pipeline.hook(
            "record_step_start_time",
            |args: &mut HookArgs<'_>| {
                args.pacing.record_step_start();
                Ok(HookOutcome::Proceed)
            },
            priority::PRE_TICK,
        );
        step_pipeline.hook(
            "environment_step",
            |args: &mut HookArgs<'_>| args.env.step(args.engine, args.ctx),
            priority::ENVIRONMENT,
        );
        step_pipeline.hook(
            "engine_advance",
            |args: &mut HookArgs<'_>| {
                args.engine.advance_one_tick();
                Ok(HookOutcome::Proceed)
            },
            priority::ENGINE_ADVANCE,
        );
        step_pipeline.hook(
            "pace_step_end",
            |args: &mut HookArgs<'_>| {
                let step_length = args.engine.step_length();
                args.pacing.pace_step_end(step_length);
                Ok(HookOutcome::Proceed)
            },
            priority::POST_TICK,
        );
        stop_pipeline.hook(
            "environment_stop",
            |args: &mut HookArgs<'_>| args.env.stop(args.engine, args.ctx),
            priority::ENVIRONMENT,
        );

        Self {
            engine,
            env,
            ctx: Context::new(),
            start_pipeline,
            step_pipeline,
            stop_pipeline,
            pacing: Pacer::new(false),
            state: RunState::NotStarted,
            running: false,
        }
    }

    /// Enable real-time pacing: each tick blocks until the engine's step
    /// length of wall time has passed.
    pub fn with_realtime(mut self) -> Self {
        self.pacing.set_realtime(true);
        self
    }

    // ── Hook registration ─────────────────────────────────────────────────

    pub fn hook_start(
        &mut self,
        name: impl Into<String>,
        exec: impl FnMut(&mut HookArgs<'_>) -> SimResult<HookOutcome> + 'static,
        priority: i32,
    ) {
        self.start_pipeline.hook(name, exec, priority);
    }

    pub fn hook_step(
        &mut self,
        name: impl Into<String>,
        exec: impl FnMut(&mut HookArgs<'_>) -> SimResult<HookOutcome> + 'static,
        priority: i32,
    ) {
        self.step_pipeline.hook(name, exec, priority);
    }

    pub fn hook_stop(
        &mut self,
        name: impl Into<String>,
        exec: impl FnMut(&mut HookArgs<'_>) -> SimResult<HookOutcome> + 'static,
        priority: i32,
    ) {
        self.stop_pipeline.hook(name, exec, priority);
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Launch the authoritative engine, then run the start pipeline once.
    pub fn start(&mut self) -> SimResult<()> {
        if self.state != RunState::NotStarted {
            return Err(SimError::InvalidState {
                operation: "start",
                actual: self.state.name(),
            });
        }
        self.engine.launch()?;
        let mut args = HookArgs {
            engine: &mut self.engine,
            env: &mut self.env,
            ctx: &mut self.ctx,
            pacing: &mut self.pacing,
        };
        self.start_pipeline.invoke(&mut args)?;
        self.state = RunState::Running;
        self.running = true;
        Ok(())
    }

    /// Run the step pipeline once (one tick).
    pub fn step(&mut self) -> SimResult<()> {
        if self.state != RunState::Running {
            return Err(SimError::InvalidState {
                operation: "step",
                actual: self.state.name(),
            });
        }
        let mut args = HookArgs {
            engine: &mut self.engine,
            env: &mut self.env,
            ctx: &mut self.ctx,
            pacing: &mut self.pacing,
        };
        self.step_pipeline.invoke(&mut args)?;
        if self.ctx.take_stop_request().is_some() {
            self.running = false;
        }
        Ok(())
    }

    /// `start`, step until the environment requests termination, `stop`.
    pub fn run(&mut self) -> SimResult<()> {
        self.start()?;
        while self.running {
            self.step()?;
        }
        self.stop()
    }

    /// Run the stop pipeline once and shut the engine down.  Terminal.
    pub fn stop(&mut self) -> SimResult<()> {
        if self.state != RunState::Running {
            return Err(SimError::InvalidState {
                operation: "stop",
                actual: self.state.name(),
            });
        }
        let mut args = HookArgs {
            engine: &mut self.engine,
            env: &mut self.env,
            ctx: &mut self.ctx,
            pacing: &mut self.pacing,
        };
        self.stop_pipeline.invoke(&mut args)?;
        self.engine.shutdown();
        self.state = RunState::Stopped;
        self.running = false;
        Ok(())
    }

    // ── Spawn/despawn plumbing ────────────────────────────────────────────

    /// Insert a new agent into the engine and its population registry, then
    /// install it.  `info` is consumed once.
    pub fn spawn_agent(
        &mut self,
        population: Population,
        id: &AgentId,
        info: &InitialSpawnInfo,
    ) -> SimResult<()> {
        self.engine.spawn(id, population, info)?;
        self.env.admit(population, id, &mut self.engine)
    }

    /// Uninstall an agent, drop its registry entry, and remove it from the
    /// engine.
    pub fn despawn_agent(&mut self, population: Population, id: &AgentId) -> SimResult<()> {
        self.env.evict(population, id, &mut self.engine);
        self.engine.despawn(id, population)?;
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn env(&self) -> &AgentEnvironment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut AgentEnvironment {
        &mut self.env
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
