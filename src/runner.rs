// src/runner.rs
//
// Episode runner: drives a policy through one episode of the environment
// and accumulates summary statistics. Step failures (missing schedule or
// latency entries) abort the episode and propagate to the caller.

use serde::{Deserialize, Serialize};

use crate::env::{AutoscaleEnv, StepError};
use crate::policy::Policy;
use crate::stats::{OnlineStats, StatsSummary};
use crate::telemetry::EpisodeTelemetry;

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Ran the full max_episode_steps.
    EndOfEpisode,
    /// The reward function signalled termination.
    RewardDone,
}

/// Summary of one completed episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode_id: u64,
    pub policy_version: String,
    pub steps: u64,
    pub total_reward: f64,
    pub reward: StatsSummary,
    pub latency: StatsSummary,
    /// Number of steps that breached the latency SLA.
    pub sla_violations: u64,
    pub final_replicas: Vec<u32>,
    pub termination: TerminationReason,
}

/// Drives a policy through episodes of one environment instance.
pub struct EpisodeRunner {
    env: AutoscaleEnv,
    telemetry: EpisodeTelemetry,
}

impl EpisodeRunner {
    pub fn new(env: AutoscaleEnv) -> Self {
        Self {
            env,
            telemetry: EpisodeTelemetry::from_env(),
        }
    }

    pub fn with_telemetry(env: AutoscaleEnv, telemetry: EpisodeTelemetry) -> Self {
        Self { env, telemetry }
    }

    pub fn env(&self) -> &AutoscaleEnv {
        &self.env
    }

    /// Run one full episode with the given policy.
    pub fn run(
        &mut self,
        policy: &mut dyn Policy,
        episode_id: u64,
    ) -> Result<EpisodeSummary, StepError> {
        let max_steps = self.env.config().max_episode_steps;

        let mut obs = self.env.reset();
        self.telemetry.log_episode_start(episode_id);

        let mut total_reward = 0.0;
        let mut reward_stats = OnlineStats::default();
        let mut latency_stats = OnlineStats::default();
        let mut sla_violations = 0u64;
        let mut steps = 0u64;
        let mut termination = TerminationReason::EndOfEpisode;

        for _ in 0..max_steps {
            let action = policy.act(&obs);
            let result = self.env.step(action)?;

            self.telemetry
                .log_step(&result, action, policy.version(), episode_id);

            total_reward += result.reward;
            reward_stats.add(result.reward);
            latency_stats.add(result.observation.latency);
            if result
                .info
                .reward_components
                .as_ref()
                .map(|c| c.sla_violated)
                .unwrap_or(false)
            {
                sla_violations += 1;
            }

            steps += 1;
            obs = result.observation;

            if result.done {
                termination = TerminationReason::RewardDone;
                break;
            }
        }

        self.telemetry
            .log_episode_end(episode_id, steps, total_reward);
        self.telemetry.flush();

        Ok(EpisodeSummary {
            episode_id,
            policy_version: policy.version().to_string(),
            steps,
            total_reward,
            reward: reward_stats.summary(),
            latency: latency_stats.summary(),
            sla_violations,
            final_replicas: self.env.replicas().to_vec(),
            termination,
        })
    }
}
