//! Autoscale-sim core library.
//!
//! A discrete-time simulation environment for studying autoscaling
//! decisions over a set of interdependent services. An external agent
//! picks one integer action per step; the environment decodes it into
//! per-service scaling directives, applies bounded replica adjustments
//! against a pre-generated workload trace, resolves the resulting
//! latency from a measured table, and returns a reward trading off pod
//! cost against latency-SLA compliance.
//!
//! # Architecture
//!
//! Two read-only data leaves feed one stateful core:
//!
//! - **Schedule** (`schedule`): step-indexed workload trace, the
//!   "what happened" record for one episode. Immutable after load.
//! - **Latency table** (`latency`): (replica configuration, workload) ->
//!   measured latency, a deterministic oracle standing in for a live
//!   metrics pipeline. Immutable after load.
//! - **Environment** (`env`): episode-local mutable state plus the
//!   Gym-style reset/step contract, composing the pure action decoder
//!   (`action`) and reward shaping (`reward`).
//!
//! Around the core: versioned observations (`observation`), baseline
//! policies (`policy`), an episode runner with summary stats (`runner`,
//! `stats`), and optional JSONL telemetry (`telemetry`). Parallel
//! episodes use independent `AutoscaleEnv` instances sharing the
//! `Arc`'ed leaves; there is no locking because the leaves never mutate
//! after load.

pub mod action;
pub mod config;
pub mod env;
pub mod latency;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod runner;
pub mod schedule;
pub mod stats;
pub mod telemetry;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use action::{ActionSpace, ACTION_VERSION};
pub use config::{
    resolve_effective_profile, ConfigError, EffectiveProfile, EnvConfig, ProfileSource,
    RewardProfile,
};
pub use env::{AutoscaleEnv, BuildError, StepError, StepInfo, StepResult, VecEnv};
pub use latency::{workload_key, LatencyTable, TableError};
pub use observation::{Observation, ObservationSpace, OBS_VERSION};
pub use policy::{HoldPolicy, Policy, RandomPolicy, HOLD_POLICY_VERSION, RANDOM_POLICY_VERSION};
pub use reward::{compute_reward, RewardComponents, RewardConfig};
pub use runner::{EpisodeRunner, EpisodeSummary, TerminationReason};
pub use schedule::{ScheduleEntry, ScheduleError, WorkloadSchedule};
pub use stats::{OnlineStats, StatsSummary};
pub use telemetry::{EpisodeMarker, EpisodeMarkerType, EpisodeTelemetry, TickRecord};
pub use types::{Directive, ReplicaConfig, StepIndex};
