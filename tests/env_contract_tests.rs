// tests/env_contract_tests.rs
//
// Environment-contract tests:
// - end-to-end step over the minimal schedule/table fixture
// - clamp saturation at both pod bounds
// - step-counter wrap at the episode boundary
// - reset() zeroing the step counter
// - typed lookup failures instead of silent defaults
// - determinism given the same tables and action sequence

use std::sync::Arc;

use autoscale_sim::{
    AutoscaleEnv, EnvConfig, LatencyTable, ReplicaConfig, ScheduleEntry, StepError, VecEnv,
    WorkloadSchedule,
};

fn entry(workload: f64, counts: Vec<u32>) -> ScheduleEntry {
    ScheduleEntry {
        workload,
        baseline: ReplicaConfig::from_counts(counts),
    }
}

/// Schedule with one identical entry per step and a table covering every
/// replica configuration reachable from that baseline.
fn covering_fixture(
    steps: u64,
    workload: f64,
    baseline: Vec<u32>,
) -> (Arc<WorkloadSchedule>, Arc<LatencyTable>) {
    let schedule = WorkloadSchedule::from_entries(
        (0..steps).map(|s| (s, entry(workload, baseline.clone()))),
    )
    .unwrap();

    // Measure every configuration in the [1,4]^3 cube so any action resolves.
    let mut measurements = Vec::new();
    for a in 1..=4u32 {
        for b in 1..=4u32 {
            for c in 1..=4u32 {
                let latency = 0.1 + 0.01 * (a + b + c) as f64;
                measurements.push((ReplicaConfig::from_counts(vec![a, b, c]), workload, latency));
            }
        }
    }
    (
        Arc::new(schedule),
        Arc::new(LatencyTable::from_measurements(measurements)),
    )
}

#[test]
fn end_to_end_hold_step_matches_reward_shape() {
    let schedule =
        WorkloadSchedule::from_entries(vec![(0, entry(10.0, vec![1, 1, 1]))]).unwrap();
    let table = LatencyTable::from_measurements(vec![(
        ReplicaConfig::from_counts(vec![1, 1, 1]),
        10.0,
        0.3,
    )]);
    let mut env = AutoscaleEnv::new(
        EnvConfig::default(),
        Arc::new(schedule),
        Arc::new(table),
    )
    .unwrap();
    env.reset();

    let result = env.step(13).expect("hold step should succeed");
    assert_eq!(
        result.observation.as_vector(),
        vec![10.0, 1.0, 1.0, 1.0, 0.3]
    );
    assert!(!result.done);

    // latency_ratio = 0.3 / 0.5 = 0.6, below the 0.8 reference: the
    // gentle Gaussian branch with full pod reward.
    let latency_reward = 100.0 * (-0.06_f64 * 10.0 * (0.8_f64 - 0.6).powi(2)).exp();
    let expected = 0.5 * 100.0 + 0.5 * latency_reward;
    assert!(
        (result.reward - expected).abs() < 1e-9,
        "reward {} != expected {}",
        result.reward,
        expected
    );

    let components = result.info.reward_components.expect("components recorded");
    assert!((components.latency_ratio - 0.6).abs() < 1e-12);
    assert!(!components.sla_violated);
}

#[test]
fn scale_up_saturates_at_max_pods() {
    let (schedule, table) = covering_fixture(4, 10.0, vec![4, 4, 4]);
    let mut env = AutoscaleEnv::new(EnvConfig::default(), schedule, table).unwrap();
    env.reset();

    // 26 decodes to (+1, +1, +1); baseline is already at the upper bound.
    let result = env.step(26).unwrap();
    assert_eq!(result.observation.replicas, vec![4, 4, 4]);
    assert_eq!(result.info.directives, vec![1, 1, 1]);
}

#[test]
fn scale_down_saturates_at_min_pods() {
    let (schedule, table) = covering_fixture(4, 10.0, vec![1, 1, 1]);
    let mut env = AutoscaleEnv::new(EnvConfig::default(), schedule, table).unwrap();
    env.reset();

    // 0 decodes to (-1, -1, -1); baseline is already at the lower bound.
    let result = env.step(0).unwrap();
    assert_eq!(result.observation.replicas, vec![1, 1, 1]);
}

#[test]
fn step_counter_wraps_at_episode_boundary() {
    let steps = 4;
    let (schedule, table) = covering_fixture(steps, 10.0, vec![2, 2, 2]);
    let config = EnvConfig {
        max_episode_steps: steps,
        ..EnvConfig::default()
    };
    let mut env = AutoscaleEnv::new(config, schedule, table).unwrap();
    env.reset();

    for expected in 1..steps {
        env.step(13).unwrap();
        assert_eq!(env.step_counter(), expected);
    }

    // One more step reaches max_episode_steps and wraps back to 0.
    env.step(13).unwrap();
    assert_eq!(env.step_counter(), 0);

    // The wrapped environment keeps stepping from the start of the trace.
    let result = env.step(13).unwrap();
    assert_eq!(result.info.step, 0);
}

#[test]
fn reset_zeroes_the_step_counter() {
    let (schedule, table) = covering_fixture(8, 10.0, vec![2, 2, 2]);
    let mut env = AutoscaleEnv::new(EnvConfig::default(), schedule, table).unwrap();
    env.reset();

    env.step(13).unwrap();
    env.step(13).unwrap();
    assert_eq!(env.step_counter(), 2);

    let obs = env.reset();
    assert_eq!(env.step_counter(), 0);
    assert_eq!(obs.as_vector(), vec![0.0, 1.0, 1.0, 1.0, 0.0]);

    // And the next step reads the trace from step 0 again.
    let result = env.step(13).unwrap();
    assert_eq!(result.info.step, 0);
}

#[test]
fn missing_latency_entry_is_a_typed_error() {
    // Schedule reaches a configuration the table does not measure.
    let schedule =
        WorkloadSchedule::from_entries(vec![(0, entry(10.0, vec![2, 2, 2]))]).unwrap();
    let table = LatencyTable::from_measurements(vec![(
        ReplicaConfig::from_counts(vec![1, 1, 1]),
        10.0,
        0.3,
    )]);
    let mut env = AutoscaleEnv::new(
        EnvConfig::default(),
        Arc::new(schedule),
        Arc::new(table),
    )
    .unwrap();
    env.reset();

    let err = env.step(13).unwrap_err();
    match err {
        StepError::MissingLatency { replicas, workload } => {
            assert_eq!(replicas, "2-2-2");
            assert_eq!(workload, "10.0");
        }
        other => panic!("expected MissingLatency, got {:?}", other),
    }
}

#[test]
fn sla_violation_is_flat_penalty_without_termination() {
    let schedule =
        WorkloadSchedule::from_entries(vec![(0, entry(10.0, vec![1, 1, 1]))]).unwrap();
    // Latency 0.6 >= SLA 0.5: ratio 1.2.
    let table = LatencyTable::from_measurements(vec![(
        ReplicaConfig::from_counts(vec![1, 1, 1]),
        10.0,
        0.6,
    )]);
    let mut env = AutoscaleEnv::new(
        EnvConfig::default(),
        Arc::new(schedule),
        Arc::new(table),
    )
    .unwrap();
    env.reset();

    let result = env.step(13).unwrap();
    assert_eq!(result.reward, -100.0);
    assert!(!result.done, "SLA violation must not terminate by default");
    assert!(result.info.reward_components.unwrap().sla_violated);
}

#[test]
fn every_observation_stays_in_the_observation_space() {
    let (schedule, table) = covering_fixture(16, 10.0, vec![2, 3, 1]);
    let config = EnvConfig {
        max_episode_steps: 16,
        ..EnvConfig::default()
    };
    let mut env = AutoscaleEnv::new(config, schedule, table).unwrap();
    let space = env.observation_space();
    env.reset();

    for action in 0..27 {
        let result = env.step(action % 27).unwrap();
        assert!(
            space.contains(&result.observation),
            "observation {:?} escaped the space",
            result.observation
        );
        if env.step_counter() == 0 {
            env.reset();
        }
    }
}

#[test]
fn same_tables_and_actions_give_identical_results() {
    let (schedule, table) = covering_fixture(16, 10.0, vec![2, 2, 2]);
    let config = EnvConfig {
        max_episode_steps: 16,
        ..EnvConfig::default()
    };

    let actions: Vec<u32> = (0..16).map(|i| (i * 7 + 3) % 27).collect();

    let mut env1 = AutoscaleEnv::new(
        config.clone(),
        Arc::clone(&schedule),
        Arc::clone(&table),
    )
    .unwrap();
    let mut env2 = AutoscaleEnv::new(config, schedule, table).unwrap();

    env1.reset();
    env2.reset();

    for &action in &actions {
        let r1 = env1.step(action).unwrap();
        let r2 = env2.step(action).unwrap();
        assert_eq!(
            serde_json::to_string(&r1.observation).unwrap(),
            serde_json::to_string(&r2.observation).unwrap()
        );
        assert_eq!(r1.reward, r2.reward);
        assert_eq!(r1.done, r2.done);
    }
}

#[test]
fn vec_env_shares_tables_across_independent_instances() {
    let (schedule, table) = covering_fixture(8, 10.0, vec![2, 2, 2]);
    let config = EnvConfig {
        max_episode_steps: 8,
        ..EnvConfig::default()
    };

    let mut vec_env = VecEnv::new(3, config, schedule, table).unwrap();
    assert_eq!(vec_env.num_envs(), 3);

    let observations = vec_env.reset_all();
    assert_eq!(observations.len(), 3);

    // Different actions per instance: counters advance independently.
    let results = vec_env.step(&[13, 26, 0]).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].observation.replicas, vec![2, 2, 2]);
    assert_eq!(results[1].observation.replicas, vec![3, 3, 3]);
    assert_eq!(results[2].observation.replicas, vec![1, 1, 1]);
    for env in vec_env.envs() {
        assert_eq!(env.step_counter(), 1);
    }
}
