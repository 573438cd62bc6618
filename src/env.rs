// src/env.rs
//
// Gym-style autoscaling environment (reset, step).
//
// Holds the episode-local mutable state (step counter, replica counts)
// and composes the pure pieces: base-3 action decoding, bounded replica
// adjustment, latency table lookup, and reward shaping. The workload
// schedule and latency table are shared, immutable inputs; parallel
// episodes each hold their own environment instance over the same
// Arc'ed tables.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::ActionSpace;
use crate::config::EnvConfig;
use crate::latency::{workload_key, LatencyTable};
use crate::observation::{Observation, ObservationSpace};
use crate::reward::{compute_reward, RewardComponents};
use crate::schedule::WorkloadSchedule;
use crate::types::{Directive, ReplicaConfig, StepIndex};

/// Result of a single environment step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// The observation after taking the action.
    pub observation: Observation,
    /// The reward for this step.
    pub reward: f64,
    /// Whether the episode has terminated.
    pub done: bool,
    /// Diagnostics side channel.
    pub info: StepInfo,
}

/// Diagnostics returned alongside each step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInfo {
    /// Step index this transition was computed for.
    pub step: StepIndex,
    /// Pre-action baseline replica counts from the schedule.
    pub baseline: Vec<u32>,
    /// Decoded per-service directives applied to the baseline.
    pub directives: Vec<Directive>,
    /// Reward components breakdown.
    pub reward_components: Option<RewardComponents>,
}

/// Errors raised while constructing an environment.
#[derive(Debug, Clone)]
pub enum BuildError {
    /// The configured service list is empty.
    NoServices,
    /// Schedule entries cover a different number of services than the
    /// configuration declares.
    ReplicaWidthMismatch { expected: usize, found: usize },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::NoServices => {
                write!(f, "environment requires at least one configured service")
            }
            BuildError::ReplicaWidthMismatch { expected, found } => write!(
                f,
                "schedule replica width {} does not match configured service count {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for BuildError {}

/// Errors raised during a step. All are fatal to the current episode and
/// propagate to the caller; the environment never substitutes defaults.
#[derive(Debug, Clone)]
pub enum StepError {
    /// The caller supplied an action outside [0, 3^num_services).
    ActionOutOfRange { action: u32, num_actions: u32 },
    /// The schedule defines no entry for the current step counter.
    MissingScheduleStep { step: StepIndex },
    /// The latency table has no measurement for the resolved replica
    /// configuration under the current workload.
    MissingLatency { replicas: String, workload: String },
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepError::ActionOutOfRange {
                action,
                num_actions,
            } => write!(
                f,
                "action {} outside the action space [0, {})",
                action, num_actions
            ),
            StepError::MissingScheduleStep { step } => {
                write!(f, "schedule has no entry for step {}", step)
            }
            StepError::MissingLatency { replicas, workload } => write!(
                f,
                "latency table has no measurement for replicas '{}' at workload '{}'",
                replicas, workload
            ),
        }
    }
}

impl std::error::Error for StepError {}

/// Gym-style autoscaling environment.
///
/// Provides the standard RL interface over the measured traces:
/// - reset() -> observation
/// - step(action) -> (observation, reward, done, info)
///
/// All transitions are deterministic given the schedule and table.
#[derive(Debug)]
pub struct AutoscaleEnv {
    config: EnvConfig,
    schedule: Arc<WorkloadSchedule>,
    table: Arc<LatencyTable>,
    action_space: ActionSpace,
    /// Current replica count per service.
    replicas: Vec<u32>,
    /// 0-based step counter; wraps at max_episode_steps.
    step_counter: StepIndex,
}

impl AutoscaleEnv {
    /// Create a new environment over shared, read-only tables.
    pub fn new(
        config: EnvConfig,
        schedule: Arc<WorkloadSchedule>,
        table: Arc<LatencyTable>,
    ) -> Result<Self, BuildError> {
        if config.services.is_empty() {
            return Err(BuildError::NoServices);
        }
        if let Some(width) = schedule.replica_width() {
            if width != config.num_services() {
                return Err(BuildError::ReplicaWidthMismatch {
                    expected: config.num_services(),
                    found: width,
                });
            }
        }

        let action_space = ActionSpace::new(config.num_services());
        let replicas = config.initial_replicas();
        Ok(Self {
            config,
            schedule,
            table,
            action_space,
            replicas,
            step_counter: 0,
        })
    }

    /// Reset the environment for a new episode.
    ///
    /// Returns the fixed initial observation (zero workload, all services
    /// at min_pods, zero latency) and zeroes the step counter so the next
    /// step() reads the trace from the beginning.
    pub fn reset(&mut self) -> Observation {
        self.step_counter = 0;
        self.replicas = self.config.initial_replicas();
        Observation::initial(&self.config)
    }

    /// Take one step in the environment.
    pub fn step(&mut self, action: u32) -> Result<StepResult, StepError> {
        if !self.action_space.contains(action) {
            return Err(StepError::ActionOutOfRange {
                action,
                num_actions: self.action_space.num_actions(),
            });
        }

        let step = self.step_counter;
        let entry = self
            .schedule
            .get(step)
            .ok_or(StepError::MissingScheduleStep { step })?;
        let workload_rate = entry.workload;
        let baseline = entry.baseline.counts().to_vec();

        let directives = self.action_space.decode(action);

        // Bounded adjustment: the decoded directive moves each service off
        // the schedule's baseline, clamped into [min_pods, max_pods].
        let new_replicas: Vec<u32> = baseline
            .iter()
            .zip(directives.iter())
            .map(|(&base, &directive)| {
                (base as i64 + directive as i64)
                    .clamp(self.config.min_pods as i64, self.config.max_pods as i64)
                    as u32
            })
            .collect();

        let replica_config = ReplicaConfig::from_counts(new_replicas.clone());
        let latency = self
            .table
            .lookup(&replica_config, workload_rate)
            .ok_or_else(|| StepError::MissingLatency {
                replicas: replica_config.label(),
                workload: workload_key(workload_rate),
            })?;

        self.replicas = new_replicas.clone();

        let observation = Observation::new(workload_rate, new_replicas, latency);
        let (reward, done, components) =
            compute_reward(&observation, self.config.max_pods, &self.config.reward);

        self.step_counter += 1;
        if self.step_counter == self.config.max_episode_steps {
            self.step_counter = 0;
        }

        Ok(StepResult {
            observation,
            reward,
            done,
            info: StepInfo {
                step,
                baseline,
                directives,
                reward_components: Some(components),
            },
        })
    }

    /// No-op; part of the hosting framework's contract.
    pub fn close(&mut self) {}

    /// Write a one-line state summary to stderr.
    pub fn render(&self) {
        eprintln!(
            "step={} replicas={}",
            self.step_counter,
            ReplicaConfig::from_counts(self.replicas.clone())
        );
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn action_space(&self) -> ActionSpace {
        self.action_space
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::from_config(&self.config)
    }

    /// Current step counter (0-based, wraps at max_episode_steps).
    pub fn step_counter(&self) -> StepIndex {
        self.step_counter
    }

    /// Current replica counts.
    pub fn replicas(&self) -> &[u32] {
        &self.replicas
    }
}

/// Vectorised wrapper: N independent environments over shared tables.
///
/// There is no locking; the schedule and table are immutable after load
/// and each inner environment has exactly one stepping caller.
pub struct VecEnv {
    envs: Vec<AutoscaleEnv>,
}

impl VecEnv {
    /// Create `n` environments sharing one schedule and latency table.
    pub fn new(
        n: usize,
        config: EnvConfig,
        schedule: Arc<WorkloadSchedule>,
        table: Arc<LatencyTable>,
    ) -> Result<Self, BuildError> {
        let envs = (0..n)
            .map(|_| AutoscaleEnv::new(config.clone(), Arc::clone(&schedule), Arc::clone(&table)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { envs })
    }

    pub fn num_envs(&self) -> usize {
        self.envs.len()
    }

    /// Reset all environments.
    pub fn reset_all(&mut self) -> Vec<Observation> {
        self.envs.iter_mut().map(|env| env.reset()).collect()
    }

    /// Step all environments with the given actions.
    ///
    /// Actions must have the same length as envs. The first failing
    /// environment aborts the batch.
    pub fn step(&mut self, actions: &[u32]) -> Result<Vec<StepResult>, StepError> {
        assert_eq!(
            actions.len(),
            self.envs.len(),
            "Actions length must match number of environments"
        );
        self.envs
            .iter_mut()
            .zip(actions.iter())
            .map(|(env, &action)| env.step(action))
            .collect()
    }

    /// Access the inner environments (for inspection).
    pub fn envs(&self) -> &[AutoscaleEnv] {
        &self.envs
    }
}
