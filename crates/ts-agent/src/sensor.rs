//! The `AgentSensor` trait and its clock-scoped cache.

use ts_engine::SimEngine;

use ts_core::AgentId;

use crate::{AgentResult, SensorReading};

/// A named per-agent data source.
///
/// Sensors fetch their value from the authoritative engine; the owning
/// [`Agent`][crate::Agent] memoizes each fetch against the engine's clock so
/// that no matter how many consumers read a sensor within one tick, the
/// engine is queried at most once.
///
/// Implementations should be cheap to construct — they are built by the
/// population factory every time an agent enters the registry.
pub trait AgentSensor: 'static {
    /// The sensor's name, unique within one agent.  Decision models address
    /// readings by this name.
    fn name(&self) -> &str;

    /// Whether fetches are memoized per engine-clock value.  Defaults to
    /// `true`; disable only for sensors whose value changes within a tick.
    fn cache_enabled(&self) -> bool {
        true
    }

    /// Wire the sensor to the engine (e.g. register subscriptions).
    /// Called once, after the agent is live in the engine.
    fn install(&mut self, _agent: &AgentId, _engine: &mut dyn SimEngine) -> AgentResult<()> {
        Ok(())
    }

    /// Release engine-side resources (e.g. subscriptions).  Called once,
    /// before the agent is removed from the registry.
    fn uninstall(&mut self, _agent: &AgentId, _engine: &mut dyn SimEngine) {}

    /// Query the engine and produce the current reading.
    ///
    /// Not called directly by consumers — go through the agent's
    /// `observe`, which applies caching.
    fn fetch(&self, agent: &AgentId, engine: &dyn SimEngine) -> AgentResult<SensorReading>;
}

// ── SensorSlot ────────────────────────────────────────────────────────────────

/// A sensor plus its memoized reading.
///
/// The cache key is the engine's clock: a reading is recomputed only when
/// the clock has advanced past the value it was fetched at.  Multiple reads
/// within one tick — including a long-running tick — reuse the memo.
pub(crate) struct SensorSlot {
    pub(crate) sensor: Box<dyn AgentSensor>,
    cached: Option<(f64, SensorReading)>,
}

impl SensorSlot {
    pub(crate) fn new(sensor: Box<dyn AgentSensor>) -> Self {
        Self { sensor, cached: None }
    }

    /// The current reading, fetching only if the engine clock advanced.
    pub(crate) fn observation(
        &mut self,
        agent: &AgentId,
        engine: &dyn SimEngine,
    ) -> AgentResult<SensorReading> {
        if !self.sensor.cache_enabled() {
            return self.sensor.fetch(agent, engine);
        }
        let now = engine.current_clock();
        let stale = match &self.cached {
            Some((at, _)) => *at < now,
            None => true,
        };
        if stale {
            let reading = self.sensor.fetch(agent, engine)?;
            self.cached = Some((now, reading));
        }
        // The unwrap-free read: `cached` was just filled if it was stale.
        match &self.cached {
            Some((_, reading)) => Ok(reading.clone()),
            None => self.sensor.fetch(agent, engine),
        }
    }

    /// Drop the memo (on uninstall, so a re-installed agent starts fresh).
    pub(crate) fn invalidate(&mut self) {
        self.cached = None;
    }
}
