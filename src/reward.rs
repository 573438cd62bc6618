// src/reward.rs
//
// Reward shaping for the autoscaling environment.
//
// The reward has two weighted components, each on a 0..100 scale:
// - pod utilization: linear in replica count, rewarding small footprints;
// - latency: a Gaussian bump centered on a reference fraction of the SLA,
//   with a gentle slope below the reference band and a much sharper one
//   between the reference and the SLA boundary.
// An SLA violation short-circuits both components into a flat penalty.
//
// Pure functions of the observation and configuration; components are
// serializable so telemetry can reconstruct the scalar reward offline.

use serde::{Deserialize, Serialize};

use crate::observation::Observation;

/// Flat penalty for an SLA violation or an invalid action.
const PENALTY: f64 = -100.0;

/// Reward shaping parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Latency SLA threshold (seconds).
    pub sla_latency: f64,
    /// Target latency as a fraction of the SLA (the reward sweet spot).
    pub latency_ref_value: f64,
    /// Sharpness hyperparameter `d` controlling the drop of the latency
    /// reward away from the reference ratio.
    pub sharpness: f64,
    /// Weight of the pod-utilization component.
    pub pod_weight: f64,
    /// Weight of the latency component.
    pub latency_weight: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            sla_latency: 0.5,
            latency_ref_value: 0.8,
            sharpness: 10.0,
            pod_weight: 0.5,
            latency_weight: 0.5,
        }
    }
}

impl RewardConfig {
    /// Validate shaping parameters. Returns a message describing the first
    /// violated constraint, if any.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.sla_latency > 0.0) {
            return Err("sla_latency must be > 0".to_string());
        }
        if !(self.latency_ref_value > 0.0 && self.latency_ref_value < 1.0) {
            return Err("latency_ref_value must lie in (0, 1)".to_string());
        }
        if !(self.sharpness > 0.0) {
            return Err("sharpness must be > 0".to_string());
        }
        if self.pod_weight < 0.0 || self.latency_weight < 0.0 {
            return Err("component weights must be >= 0".to_string());
        }
        Ok(())
    }
}

/// Per-step reward components, kept for telemetry and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardComponents {
    /// Average per-service pod-utilization reward (100 at min_pods, 0 at
    /// max_pods). Discarded from the total when the SLA is violated.
    pub pod_reward: f64,
    /// Latency reward; None when the SLA is violated.
    pub latency_reward: Option<f64>,
    /// Latency as a fraction of the SLA threshold.
    pub latency_ratio: f64,
    /// Whether latency_ratio >= 1 this step.
    pub sla_violated: bool,
    /// Reserved invalid-action flag. The base-3 decoder is total, so the
    /// environment never sets this; it exists for contract parity with
    /// hosts that inject their own action validation.
    pub invalid_action: bool,
}

impl RewardComponents {
    /// Compute reward components from an observation.
    ///
    /// `max_pods` is the configured upper replica bound; the pod component
    /// is 100 at one replica and 0 at `max_pods` replicas.
    pub fn from_observation(obs: &Observation, max_pods: u32, cfg: &RewardConfig) -> Self {
        let span = (max_pods - 1).max(1) as f64;

        let pod_total: f64 = obs
            .replicas
            .iter()
            .map(|&r| -100.0 / span * r as f64 + 100.0 * max_pods as f64 / span)
            .sum();
        let pod_reward = pod_total / obs.replicas.len().max(1) as f64;

        let latency_ratio = obs.latency / cfg.sla_latency;
        let reference = cfg.latency_ref_value;

        let (latency_reward, sla_violated) = if latency_ratio >= 1.0 {
            (None, true)
        } else if latency_ratio < reference {
            // Under-utilized margin below the target: gentle slope.
            let deviation = reference - latency_ratio;
            (
                Some(100.0 * (-0.06 * cfg.sharpness * deviation * deviation).exp()),
                false,
            )
        } else {
            // Desirable operating band approaching the SLA: sharp slope.
            let deviation = reference - latency_ratio;
            (
                Some(100.0 * (-10.0 * cfg.sharpness * deviation * deviation).exp()),
                false,
            )
        };

        Self {
            pod_reward,
            latency_reward,
            latency_ratio,
            sla_violated,
            invalid_action: false,
        }
    }

    /// Combine components into the scalar reward and termination flag.
    ///
    /// SLA violations return the flat penalty without terminating; the
    /// reserved invalid-action path returns the penalty and terminates.
    pub fn total(&self, cfg: &RewardConfig) -> (f64, bool) {
        if self.invalid_action {
            return (PENALTY, true);
        }
        if self.sla_violated {
            return (PENALTY, false);
        }
        let latency_reward = self.latency_reward.unwrap_or(0.0);
        (
            cfg.pod_weight * self.pod_reward + cfg.latency_weight * latency_reward,
            false,
        )
    }
}

/// Compute `(reward, done)` for an observation in one call.
pub fn compute_reward(
    obs: &Observation,
    max_pods: u32,
    cfg: &RewardConfig,
) -> (f64, bool, RewardComponents) {
    let components = RewardComponents::from_observation(obs, max_pods, cfg);
    let (reward, done) = components.total(cfg);
    (reward, done, components)
}
