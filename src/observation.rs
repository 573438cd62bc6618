// src/observation.rs
//
// Versioned Observation schema for policy input.
//
// The observation is a fixed-shape snapshot of the environment after a
// step: current workload intensity, per-service replica counts, and the
// measured latency for that configuration under that workload.
//
// Design requirements:
// - Versioned (obs_version field) for schema evolution
// - Serializable (serde) for logging and replay
// - Deterministic ordering (replicas indexed by service order)

use serde::{Deserialize, Serialize};

use crate::config::EnvConfig;

/// Current observation schema version.
/// Increment when adding/removing/changing fields.
pub const OBS_VERSION: u32 = 1;

/// Environment observation returned by reset() and step().
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Schema version for forwards/backwards compatibility.
    pub obs_version: u32,
    /// Current workload intensity (requests per window), >= 0.
    pub workload_rate: f64,
    /// Replica count per service, each within [min_pods, max_pods].
    pub replicas: Vec<u32>,
    /// Measured latency for (replicas, workload_rate), >= 0.
    pub latency: f64,
}

impl Observation {
    /// Build an observation from its parts.
    pub fn new(workload_rate: f64, replicas: Vec<u32>, latency: f64) -> Self {
        Self {
            obs_version: OBS_VERSION,
            workload_rate,
            replicas,
            latency,
        }
    }

    /// The fixed initial observation returned by reset(): zero workload,
    /// every service at min_pods, zero latency.
    pub fn initial(cfg: &EnvConfig) -> Self {
        Self::new(0.0, cfg.initial_replicas(), 0.0)
    }

    /// Flatten to the canonical vector form:
    /// `[workload_rate, replicas[0], .., replicas[n-1], latency]`.
    ///
    /// Length is `num_services + 2` (5 for the default 3 services).
    pub fn as_vector(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.replicas.len() + 2);
        v.push(self.workload_rate);
        v.extend(self.replicas.iter().map(|&r| r as f64));
        v.push(self.latency);
        v
    }
}

/// Bounds of the observation space, for hosting RL frameworks.
///
/// Workload and latency are unbounded above; replica counts are bounded
/// by the configured pod limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationSpace {
    pub num_services: usize,
    pub min_pods: u32,
    pub max_pods: u32,
}

impl ObservationSpace {
    pub fn from_config(cfg: &EnvConfig) -> Self {
        Self {
            num_services: cfg.num_services(),
            min_pods: cfg.min_pods,
            max_pods: cfg.max_pods,
        }
    }

    /// Dimension of the flattened observation vector.
    pub fn dim(&self) -> usize {
        self.num_services + 2
    }

    /// Per-dimension lower bounds.
    pub fn low(&self) -> Vec<f64> {
        let mut v = vec![0.0];
        v.extend(std::iter::repeat(self.min_pods as f64).take(self.num_services));
        v.push(0.0);
        v
    }

    /// Per-dimension upper bounds.
    pub fn high(&self) -> Vec<f64> {
        let mut v = vec![f64::INFINITY];
        v.extend(std::iter::repeat(self.max_pods as f64).take(self.num_services));
        v.push(f64::INFINITY);
        v
    }

    /// Whether an observation lies within the space bounds.
    pub fn contains(&self, obs: &Observation) -> bool {
        obs.replicas.len() == self.num_services
            && obs.workload_rate >= 0.0
            && obs.latency >= 0.0
            && obs
                .replicas
                .iter()
                .all(|&r| r >= self.min_pods && r <= self.max_pods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_observation_shape() {
        let cfg = EnvConfig::default();
        let obs = Observation::initial(&cfg);

        assert_eq!(obs.obs_version, OBS_VERSION);
        assert_eq!(obs.workload_rate, 0.0);
        assert_eq!(obs.replicas, vec![1, 1, 1]);
        assert_eq!(obs.latency, 0.0);
        assert_eq!(obs.as_vector(), vec![0.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn vector_layout_matches_space_dim() {
        let cfg = EnvConfig::default();
        let space = ObservationSpace::from_config(&cfg);
        let obs = Observation::new(10.0, vec![1, 2, 4], 0.3);

        assert_eq!(obs.as_vector().len(), space.dim());
        assert_eq!(obs.as_vector(), vec![10.0, 1.0, 2.0, 4.0, 0.3]);
        assert_eq!(space.low(), vec![0.0, 1.0, 1.0, 1.0, 0.0]);
        assert_eq!(
            space.high(),
            vec![f64::INFINITY, 4.0, 4.0, 4.0, f64::INFINITY]
        );
    }

    #[test]
    fn contains_checks_bounds() {
        let cfg = EnvConfig::default();
        let space = ObservationSpace::from_config(&cfg);

        assert!(space.contains(&Observation::new(10.0, vec![1, 2, 4], 0.3)));
        assert!(!space.contains(&Observation::new(10.0, vec![0, 2, 4], 0.3)));
        assert!(!space.contains(&Observation::new(10.0, vec![1, 2, 5], 0.3)));
        assert!(!space.contains(&Observation::new(-1.0, vec![1, 2, 4], 0.3)));
        assert!(!space.contains(&Observation::new(10.0, vec![1, 2], 0.3)));
    }

    #[test]
    fn observation_roundtrip_json() {
        let obs = Observation::new(12.5, vec![2, 3, 1], 0.42);
        let json = serde_json::to_string(&obs).unwrap();
        let parsed: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, parsed);
    }
}
