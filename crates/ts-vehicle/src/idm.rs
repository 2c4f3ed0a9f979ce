//! The reference decision model: IDM car-following plus MOBIL lane changes.
//!
//! - Longitudinal: the Intelligent Driver Model computes an acceleration
//!   from the ego speed and the gap/speed of the leading vehicle, optionally
//!   replaced by a sample from a Gaussian-weighted discretization of the
//!   acceleration envelope.
//! - Lateral: the MOBIL criterion commits a lane change when the
//!   acceleration gained by the ego (plus a politeness-weighted share of the
//!   neighbors' gains) exceeds a threshold, subject to safety vetoes.

use std::f64::consts::TAU;

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;

use ts_core::{AgentId, AgentRng};
use ts_engine::LaneSide;

use ts_agent::{
    AgentError, AgentResult, ControlCommand, DecisionInfo, DecisionModel, LateralMode,
    LonLatCommand, NeighborRecord, NeighborhoodObservation, Observation,
};

use crate::sensors::NeighborhoodSensor;

/// Gap assumed towards an absent neighbor — far enough to never interact.
const ABSENT_GAP: f64 = 99_999.0;

/// Floor applied to gaps before dividing, so a zero gap yields a huge
/// braking term instead of infinity.
const GAP_EPSILON: f64 = 1e-5;

// ── Configuration ─────────────────────────────────────────────────────────────

/// IDM car-following parameters.
///
/// Override individual fields with struct-update syntax:
///
/// ```rust
/// use ts_vehicle::IdmConfig;
///
/// let cfg = IdmConfig { desired_velocity: 28.0, ..IdmConfig::default() };
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct IdmConfig {
    /// Maximum comfortable acceleration, m/s².  Default 2.0.
    pub comfort_acc_max: f64,
    /// Maximum comfortable deceleration (negative), m/s².  Default −4.0.
    pub comfort_acc_min: f64,
    /// Standstill distance wanted to the leader, m.  Default 5.0.
    pub distance_wanted: f64,
    /// Desired time headway, s.  Default 1.5.
    pub time_wanted: f64,
    /// Free-flow desired velocity, m/s.  Default 35.0.
    pub desired_velocity: f64,
    /// Velocity exponent of the free-flow term.  Default 4.0.
    pub delta: f64,
    /// Lower bound of the commanded-acceleration envelope, m/s².  Default −4.0.
    pub acc_low: f64,
    /// Upper bound of the commanded-acceleration envelope, m/s².  Default 2.0.
    pub acc_high: f64,
    /// Grid resolution of the stochastic variant, m/s².  Default 0.2.
    pub stochastic_resolution: f64,
    /// Candidates whose Gaussian weight falls below this are pruned.
    /// Default 1e-10.
    pub stochastic_prob_threshold: f64,
    /// Assumed vehicle length in gap arithmetic, m.  Default 5.0.
    pub vehicle_length: f64,
}

impl Default for IdmConfig {
    fn default() -> Self {
        Self {
            comfort_acc_max: 2.0,
            comfort_acc_min: -4.0,
            distance_wanted: 5.0,
            time_wanted: 1.5,
            desired_velocity: 35.0,
            delta: 4.0,
            acc_low: -4.0,
            acc_high: 2.0,
            stochastic_resolution: 0.2,
            stochastic_prob_threshold: 1e-10,
            vehicle_length: 5.0,
        }
    }
}

impl IdmConfig {
    /// IDM acceleration for a vehicle at `ego_velocity` following `lead`
    /// (`(lead_velocity, gap)`), unclamped.
    ///
    /// The free-flow term pushes towards the desired velocity; the
    /// interaction term brakes quadratically as the gap closes on the
    /// desired gap.
    pub fn acceleration(&self, ego_velocity: f64, lead: Option<(f64, f64)>) -> f64 {
        let mut acceleration = self.comfort_acc_max
            * (1.0 - (ego_velocity / self.desired_velocity).powf(self.delta));
        if let Some((lead_velocity, gap)) = lead {
            let d = gap.max(GAP_EPSILON);
            let desired = self.desired_gap(ego_velocity, lead_velocity);
            acceleration -= self.comfort_acc_max * (desired / d).powi(2);
        }
        acceleration
    }

    /// Desired gap towards a leader:
    /// `d0 + max(0, v·τ + v·Δv / (2·√(a_max·|a_min|)))`.
    pub fn desired_gap(&self, ego_velocity: f64, lead_velocity: f64) -> f64 {
        let ab = (-self.comfort_acc_max * self.comfort_acc_min).sqrt();
        let dv = ego_velocity - lead_velocity;
        self.distance_wanted
            + (ego_velocity * self.time_wanted + ego_velocity * dv / (2.0 * ab)).max(0.0)
    }
}

/// MOBIL lane-change parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct MobilConfig {
    /// Weight of the neighbors' acceleration gains in [0, 1].  Default 0.0
    /// (purely egoistic).
    pub politeness: f64,
    /// Minimum total gain required to commit a maneuver, m/s².  Default 0.1.
    pub min_acc_gain: f64,
    /// Maximum braking the maneuver may impose on the new follower, m/s².
    /// Default 4.0.
    pub max_braking_imposed: f64,
}

impl Default for MobilConfig {
    fn default() -> Self {
        Self {
            politeness: 0.0,
            min_acc_gain: 0.1,
            max_braking_imposed: 4.0,
        }
    }
}

// ── IdmModel ──────────────────────────────────────────────────────────────────

/// The IDM+MOBIL decision model.
///
/// Requires the [`NeighborhoodSensor`] reading; emits
/// [`LonLat`][ControlCommand::LonLat] commands.
///
/// # Panics
///
/// The stochastic variant panics if used before `install` (no RNG stream
/// has been bound to the agent yet).
pub struct IdmModel {
    idm: IdmConfig,
    mobil: MobilConfig,
    /// When `false`, lateral behavior defers to the engine's own model and
    /// only the longitudinal policy runs.
    mobil_enabled: bool,
    stochastic_seed: Option<u64>,
    rng: Option<AgentRng>,
}

impl Default for IdmModel {
    fn default() -> Self {
        Self::new()
    }
}

impl IdmModel {
    pub fn new() -> Self {
        Self::with_configs(IdmConfig::default(), MobilConfig::default())
    }

    pub fn with_configs(idm: IdmConfig, mobil: MobilConfig) -> Self {
        Self {
            idm,
            mobil,
            mobil_enabled: true,
            stochastic_seed: None,
            rng: None,
        }
    }

    /// Enable or disable the MOBIL lateral policy.  Disabled, the model
    /// emits [`LateralMode::Engine`] so the engine's lane-change model runs.
    pub fn mobil(mut self, enabled: bool) -> Self {
        self.mobil_enabled = enabled;
        self
    }

    /// Sample the longitudinal acceleration stochastically, seeding the
    /// per-agent stream from `seed` at install time.
    pub fn stochastic(mut self, seed: u64) -> Self {
        self.stochastic_seed = Some(seed);
        self
    }

    pub fn idm_config(&self) -> &IdmConfig {
        &self.idm
    }

    // ── Lateral policy ────────────────────────────────────────────────────

    /// MOBIL gain for changing towards `side`, or `None` when the maneuver
    /// is infeasible (immediate collision, excessive imposed braking, or
    /// gain below the threshold).
    pub fn lane_change_gain(
        &self,
        side: LaneSide,
        observation: &NeighborhoodObservation,
    ) -> Option<f64> {
        let min_gap = observation.min_gap;
        let length = self.idm.vehicle_length;
        let ego_velocity = observation.ego.velocity;

        let (new_lead, new_follow) = match side {
            LaneSide::Left => (&observation.left_lead, &observation.left_follow),
            LaneSide::Right => (&observation.right_lead, &observation.right_follow),
        };

        // Immediate-collision veto: a non-positive gap on the target lane
        // means the slot is already occupied next to the ego.
        if gap_of(new_lead) <= 0.0 || gap_of(new_follow) <= 0.0 {
            return None;
        }

        // New follower, before the maneuver: following the new leader across
        // the slot the ego would take.
        let span = |follow: &Option<NeighborRecord>, lead: &Option<NeighborRecord>| match (
            follow, lead,
        ) {
            (Some(f), Some(l)) => f.gap + l.gap + 2.0 * min_gap + length,
            _ => ABSENT_GAP,
        };
        let new_follow_acc = self.follower_acceleration(new_follow, new_lead, span(new_follow, new_lead));
        // New follower, after the maneuver: the ego becomes its leader.
        let new_follow_pred_acc =
            self.follower_towards(new_follow, ego_velocity, gap_of(new_follow));

        // The maneuver must not force the new follower to brake too hard.
        if new_follow_pred_acc < -self.mobil.max_braking_imposed {
            return None;
        }

        let old_lead = &observation.lead;
        let old_follow = &observation.follow;

        // Ego: predicted (behind the new leader) vs current (behind the old).
        let ego_pred_acc =
            self.idm.acceleration(ego_velocity, new_lead.as_ref().map(|l| (l.velocity, l.gap)));
        let ego_acc =
            self.idm.acceleration(ego_velocity, old_lead.as_ref().map(|l| (l.velocity, l.gap)));

        // Old follower: before (following the ego) vs after (gap opens up to
        // the old leader).
        let old_follow_acc = self.follower_towards(old_follow, ego_velocity, gap_of(old_follow));
        let old_follow_pred_acc =
            self.follower_acceleration(old_follow, old_lead, span(old_follow, old_lead));

        let gain = ego_pred_acc - ego_acc
            + self.mobil.politeness
                * (new_follow_pred_acc - new_follow_acc + old_follow_pred_acc - old_follow_acc);

        (gain > self.mobil.min_acc_gain).then_some(gain)
    }

    /// IDM acceleration of `follower` following `lead` at an explicit gap.
    /// An absent follower contributes zero.
    fn follower_acceleration(
        &self,
        follower: &Option<NeighborRecord>,
        lead: &Option<NeighborRecord>,
        gap: f64,
    ) -> f64 {
        match follower {
            Some(f) => self
                .idm
                .acceleration(f.velocity, lead.as_ref().map(|l| (l.velocity, gap))),
            None => 0.0,
        }
    }

    /// IDM acceleration of `follower` towards a leader at `lead_velocity`
    /// and `gap`.  An absent follower contributes zero.
    fn follower_towards(
        &self,
        follower: &Option<NeighborRecord>,
        lead_velocity: f64,
        gap: f64,
    ) -> f64 {
        match follower {
            Some(f) => self.idm.acceleration(f.velocity, Some((lead_velocity, gap))),
            None => 0.0,
        }
    }

    // ── Stochastic longitudinal variant ───────────────────────────────────

    /// Discretize the acceleration envelope and weight each candidate by a
    /// unit-variance Gaussian centered on `deterministic_acc`.
    ///
    /// Returns `(candidates, probabilities)` with the probabilities
    /// renormalized to sum to 1 after pruning.  Fails when pruning removes
    /// every candidate — the parameter envelope is inconsistent with the
    /// resolution/threshold.
    pub fn stochastic_distribution(
        &self,
        deterministic_acc: f64,
    ) -> AgentResult<(Vec<f64>, Vec<f64>)> {
        let cfg = &self.idm;
        let steps =
            ((cfg.acc_high - cfg.acc_low) / cfg.stochastic_resolution) as usize + 1;
        let candidates: Vec<f64> = if steps == 1 {
            vec![cfg.acc_low]
        } else {
            (0..steps)
                .map(|i| {
                    cfg.acc_low + (cfg.acc_high - cfg.acc_low) * i as f64 / (steps - 1) as f64
                })
                .collect()
        };

        let mut weights: Vec<f64> = candidates
            .iter()
            .map(|&a| {
                let z = a - deterministic_acc;
                (-0.5 * z * z).exp() / TAU.sqrt()
            })
            .map(|w| if w > cfg.stochastic_prob_threshold { w } else { 0.0 })
            .collect();

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(AgentError::Model(
                "stochastic acceleration candidates fully pruned; \
                 envelope/resolution/threshold are inconsistent"
                    .to_owned(),
            ));
        }
        for w in &mut weights {
            *w /= total;
        }
        Ok((candidates, weights))
    }

    fn sample_acceleration(&mut self, deterministic_acc: f64) -> AgentResult<f64> {
        let (candidates, probabilities) = self.stochastic_distribution(deterministic_acc)?;
        let rng = self
            .rng
            .as_mut()
            .expect("stochastic decision model used before install");
        let dist = WeightedIndex::new(&probabilities)
            .map_err(|e| AgentError::Model(format!("degenerate sampling weights: {e}")))?;
        Ok(candidates[dist.sample(rng.inner())])
    }
}

fn gap_of(slot: &Option<NeighborRecord>) -> f64 {
    slot.as_ref().map_or(ABSENT_GAP, |r| r.gap)
}

impl DecisionModel for IdmModel {
    fn install(&mut self, agent: &AgentId) {
        if let Some(seed) = self.stochastic_seed {
            self.rng = Some(AgentRng::new(seed, agent));
        }
    }

    fn derive_control_command(
        &mut self,
        observation: &Observation,
    ) -> AgentResult<(Option<ControlCommand>, DecisionInfo)> {
        let neighborhood = observation
            .get(NeighborhoodSensor::NAME)
            .and_then(|r| r.as_neighborhood())
            .ok_or(AgentError::MissingObservation(NeighborhoodSensor::NAME))?;

        // Lateral first: a committed lane change preempts car-following.
        if self.mobil_enabled {
            let left = neighborhood
                .can_change_left
                .then(|| self.lane_change_gain(LaneSide::Left, neighborhood))
                .flatten()
                .map(|g| g.max(0.0));
            let right = neighborhood
                .can_change_right
                .then(|| self.lane_change_gain(LaneSide::Right, neighborhood))
                .flatten()
                .map(|g| g.max(0.0));

            // Strictly larger gain wins; an exact tie commits nothing.
            let side = match (left, right) {
                (Some(l), Some(r)) if l > r => Some(LateralMode::Left),
                (Some(l), Some(r)) if r > l => Some(LateralMode::Right),
                (Some(_), Some(_)) => None,
                (Some(_), None) => Some(LateralMode::Left),
                (None, Some(_)) => Some(LateralMode::Right),
                (None, None) => None,
            };
            if let Some(lateral) = side {
                let info = match lateral {
                    LateralMode::Left => "lane_change_left",
                    _ => "lane_change_right",
                };
                let command = ControlCommand::LonLat(LonLatCommand {
                    longitudinal: 0.0,
                    lateral,
                });
                return Ok((Some(command), Some(info.to_owned())));
            }
        }

        // Longitudinal: car-following against the current leader.
        let lead = neighborhood.lead.as_ref().map(|l| (l.velocity, l.gap));
        let deterministic = self
            .idm
            .acceleration(neighborhood.ego.velocity, lead)
            .clamp(self.idm.acc_low, self.idm.acc_high);
        let acceleration = if self.stochastic_seed.is_some() {
            self.sample_acceleration(deterministic)?
        } else {
            deterministic
        };

        let lateral = if self.mobil_enabled {
            LateralMode::Central
        } else {
            LateralMode::Engine
        };
        let command = ControlCommand::LonLat(LonLatCommand {
            longitudinal: acceleration,
            lateral,
        });
        Ok((Some(command), Some("car_following".to_owned())))
    }
}
