// src/main.rs
//
// Research-harness CLI entrypoint for autoscale-sim.
//
// Constructs the environment from the two data files (workload schedule
// + latency table), resolves the reward sharpness profile with CLI >
// AUTOSCALE_SIM_REWARD_PROFILE > default precedence, and runs scripted
// episodes with a baseline policy, printing one JSON summary per episode.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};

use autoscale_sim::config::{
    resolve_effective_profile, EnvConfig, ProfileSource, RewardProfile,
};
use autoscale_sim::env::AutoscaleEnv;
use autoscale_sim::latency::LatencyTable;
use autoscale_sim::policy::{HoldPolicy, Policy, RandomPolicy};
use autoscale_sim::runner::EpisodeRunner;
use autoscale_sim::schedule::WorkloadSchedule;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ProfileArg {
    Gentle,
    Moderate,
    Steep,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PolicyArg {
    /// Never scale: the all-hold action every step.
    Hold,
    /// Uniform-random actions, deterministic given --seed.
    Random,
}

#[derive(Debug, Parser)]
#[command(
    name = "autoscale-sim",
    about = "Autoscaling environment over measured traces (research harness)",
    version
)]
struct Args {
    /// Workload schedule JSON file.
    #[arg(long)]
    schedule: PathBuf,

    /// Latency table JSON file.
    #[arg(long)]
    metrics: PathBuf,

    /// Optional environment config YAML (defaults used if omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of episodes to run.
    #[arg(long, default_value_t = 1)]
    episodes: u64,

    /// Baseline policy driving the episodes.
    #[arg(long, value_enum, default_value = "hold")]
    policy: PolicyArg,

    /// Seed for the random policy (episode i uses seed + i).
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Reward sharpness profile (optional).
    /// If omitted, uses AUTOSCALE_SIM_REWARD_PROFILE (default gentle).
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,

    /// Verbosity: -v, -vv
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cli_profile = args.profile.map(|p| match p {
        ProfileArg::Gentle => RewardProfile::Gentle,
        ProfileArg::Moderate => RewardProfile::Moderate,
        ProfileArg::Steep => RewardProfile::Steep,
    });
    let effective = resolve_effective_profile(cli_profile);
    effective.log_startup();

    let mut config = match &args.config {
        Some(path) => EnvConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EnvConfig::default(),
    };
    // An explicit profile (CLI or env var) overrides the config file's
    // sharpness; the default profile leaves a loaded config untouched.
    if effective.source != ProfileSource::Default {
        config.reward.sharpness = effective.profile.sharpness();
    }
    config
        .validate()
        .context("validating environment config")?;

    let schedule = WorkloadSchedule::load(&args.schedule)
        .with_context(|| format!("loading schedule {}", args.schedule.display()))?;
    let table = LatencyTable::load(&args.metrics)
        .with_context(|| format!("loading latency table {}", args.metrics.display()))?;

    if args.verbose > 0 {
        eprintln!(
            "schedule_steps={} table_cells={} episode_steps={} actions={}",
            schedule.len(),
            table.len(),
            config.max_episode_steps,
            config.num_actions()
        );
    }

    let env = AutoscaleEnv::new(config, Arc::new(schedule), Arc::new(table))
        .context("constructing environment")?;
    let action_space = env.action_space();
    let mut runner = EpisodeRunner::new(env);

    for episode_id in 0..args.episodes {
        let mut policy: Box<dyn Policy> = match args.policy {
            PolicyArg::Hold => Box::new(HoldPolicy::new(action_space)),
            PolicyArg::Random => {
                Box::new(RandomPolicy::new(action_space, args.seed + episode_id))
            }
        };

        let summary = runner
            .run(policy.as_mut(), episode_id)
            .with_context(|| format!("running episode {}", episode_id))?;

        println!("{}", serde_json::to_string(&summary)?);
        if args.verbose > 1 {
            eprintln!(
                "episode={} steps={} total_reward={:.2} sla_violations={}",
                summary.episode_id, summary.steps, summary.total_reward, summary.sla_violations
            );
        }
    }

    Ok(())
}
