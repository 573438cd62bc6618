// tests/runner_telemetry_tests.rs
//
// Episode-runner and telemetry integration:
// - full-episode summaries under baseline policies
// - JSONL telemetry shape (one tick line per step, bracketed by markers)
// - random-policy determinism given the same seed

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use autoscale_sim::{
    AutoscaleEnv, EnvConfig, EpisodeRunner, EpisodeTelemetry, HoldPolicy, LatencyTable,
    RandomPolicy, ReplicaConfig, ScheduleEntry, TerminationReason, TickRecord, WorkloadSchedule,
};

fn fixture_env(max_steps: u64) -> AutoscaleEnv {
    let schedule = WorkloadSchedule::from_entries((0..max_steps).map(|step| {
        (
            step,
            ScheduleEntry {
                workload: 10.0,
                baseline: ReplicaConfig::from_counts(vec![2, 2, 2]),
            },
        )
    }))
    .unwrap();

    let mut measurements = Vec::new();
    for a in 1..=4u32 {
        for b in 1..=4u32 {
            for c in 1..=4u32 {
                let latency = 0.1 + 0.01 * (a + b + c) as f64;
                measurements.push((ReplicaConfig::from_counts(vec![a, b, c]), 10.0, latency));
            }
        }
    }
    let table = LatencyTable::from_measurements(measurements);

    let config = EnvConfig {
        max_episode_steps: max_steps,
        ..EnvConfig::default()
    };
    AutoscaleEnv::new(config, Arc::new(schedule), Arc::new(table)).unwrap()
}

#[test]
fn hold_policy_summary_over_constant_trace() {
    let mut runner = EpisodeRunner::with_telemetry(fixture_env(12), EpisodeTelemetry::disabled());
    let mut policy = HoldPolicy::new(runner.env().action_space());

    let summary = runner.run(&mut policy, 7).expect("episode should finish");
    assert_eq!(summary.episode_id, 7);
    assert_eq!(summary.policy_version, "hold-v1");
    assert_eq!(summary.steps, 12);
    assert_eq!(summary.termination, TerminationReason::EndOfEpisode);
    assert_eq!(summary.final_replicas, vec![2, 2, 2]);
    // Constant trace under a constant policy: zero reward variance.
    assert_eq!(summary.reward.min, summary.reward.max);
}

#[test]
fn telemetry_writes_markers_and_one_line_per_step() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("episodes.jsonl");
    let steps = 6;

    let mut runner = EpisodeRunner::with_telemetry(
        fixture_env(steps),
        EpisodeTelemetry::enable(path.clone()),
    );
    let mut policy = HoldPolicy::new(runner.env().action_space());
    runner.run(&mut policy, 0).expect("episode should finish");

    let contents = fs::read_to_string(&path).expect("telemetry file written");
    let lines: Vec<&str> = contents.lines().collect();
    // Start marker + one tick per step + end marker.
    assert_eq!(lines.len(), steps as usize + 2);

    // Interior lines parse back as tick records in step order.
    for (idx, line) in lines[1..lines.len() - 1].iter().enumerate() {
        let record: TickRecord = serde_json::from_str(line).expect("tick record parses");
        assert_eq!(record.step, idx as u64);
        assert_eq!(record.action, 13);
        assert_eq!(record.directives, vec![0, 0, 0]);
        assert_eq!(record.policy_version, "hold-v1");
    }
}

#[test]
fn random_policy_same_seed_same_summary() {
    let run_with_seed = |seed: u64| {
        let mut runner =
            EpisodeRunner::with_telemetry(fixture_env(16), EpisodeTelemetry::disabled());
        let mut policy = RandomPolicy::new(runner.env().action_space(), seed);
        runner.run(&mut policy, 0).expect("episode should finish")
    };

    let a = run_with_seed(42);
    let b = run_with_seed(42);
    assert_eq!(a.total_reward, b.total_reward);
    assert_eq!(a.final_replicas, b.final_replicas);
    assert_eq!(a.sla_violations, b.sla_violations);

    let c = run_with_seed(43);
    // A different seed is allowed to coincide, but over 16 steps of 27
    // actions it practically never does; guard the fixture stays useful.
    assert!(
        a.total_reward != c.total_reward || a.final_replicas != c.final_replicas,
        "different seeds should explore different trajectories"
    );
}
