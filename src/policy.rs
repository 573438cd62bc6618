// src/policy.rs
//
// Policy trait and baseline implementations.
//
// The environment contract is exercised by trivial baselines: a hold
// policy that never scales, and a seeded uniform-random policy for
// coverage runs. Learned policies live outside this crate; anything
// that maps observations to action indices can implement the trait.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::action::ActionSpace;
use crate::observation::Observation;

pub const HOLD_POLICY_VERSION: &str = "hold-v1";
pub const RANDOM_POLICY_VERSION: &str = "random-v1";

/// Policy interface: maps observations to discrete action indices.
pub trait Policy: Send {
    /// Unique version string for this policy implementation.
    fn version(&self) -> &str;

    /// Choose an action for the given observation.
    fn act(&mut self, obs: &Observation) -> u32;
}

/// Baseline that always emits the all-hold action (no scaling).
#[derive(Debug, Clone, Copy)]
pub struct HoldPolicy {
    action_space: ActionSpace,
}

impl HoldPolicy {
    pub fn new(action_space: ActionSpace) -> Self {
        Self { action_space }
    }
}

impl Policy for HoldPolicy {
    fn version(&self) -> &str {
        HOLD_POLICY_VERSION
    }

    fn act(&mut self, _obs: &Observation) -> u32 {
        self.action_space.hold_action()
    }
}

/// Uniform-random policy, deterministic given its seed.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    action_space: ActionSpace,
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    pub fn new(action_space: ActionSpace, seed: u64) -> Self {
        Self {
            action_space,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn version(&self) -> &str {
        RANDOM_POLICY_VERSION
    }

    fn act(&mut self, _obs: &Observation) -> u32 {
        self.rng.gen_range(0..self.action_space.num_actions())
    }
}
