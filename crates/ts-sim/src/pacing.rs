//! Optional real-time pacing of the tick loop.

use std::time::{Duration, Instant};

use tracing::warn;

/// Records wall-clock time at tick start and, when real-time pacing is on,
/// blocks at tick end until the step budget has elapsed.
///
/// Overruns are surfaced as a warning and otherwise left alone — no tick
/// skipping, no catch-up.
pub struct Pacer {
    realtime: bool,
    step_start: Option<Instant>,
}

impl Pacer {
    pub fn new(realtime: bool) -> Self {
        Self { realtime, step_start: None }
    }

    pub fn is_realtime(&self) -> bool {
        self.realtime
    }

    pub fn set_realtime(&mut self, on: bool) {
        self.realtime = on;
    }

    /// Stamp the start of a tick.
    pub fn record_step_start(&mut self) {
        self.step_start = Some(Instant::now());
    }

    /// Block until `step_length` seconds of wall time have passed since
    /// [`record_step_start`][Self::record_step_start]; warn on overrun.
    pub fn pace_step_end(&mut self, step_length: f64) {
        if !self.realtime {
            self.step_start = None;
            return;
        }
        let Some(start) = self.step_start.take() else {
            return;
        };
        let budget = Duration::from_secs_f64(step_length.max(0.0));
        let elapsed = start.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        } else {
            warn!(?elapsed, ?budget, "tick overran its real-time budget");
        }
    }
}
