// src/action.rs
//
// Discrete action space and base-3 action decoding.
//
// An action is a single integer in [0, 3^num_services). Written in base 3
// with exactly num_services digits (most-significant digit = first
// service), each digit d maps to the scaling directive d - 1:
//   0 -> -1 (scale down), 1 -> 0 (hold), 2 -> +1 (scale up).
//
// The encoding is total: every in-range integer is a valid action. Range
// enforcement lives at the environment's step() entry point, not here.

use serde::{Deserialize, Serialize};

use crate::types::Directive;

/// Current action encoding version.
/// Increment when changing the encoding schema.
pub const ACTION_VERSION: u32 = 1;

/// Discrete per-service scaling action space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpace {
    /// Number of services (base-3 digits per action).
    pub num_services: usize,
}

impl ActionSpace {
    pub fn new(num_services: usize) -> Self {
        Self { num_services }
    }

    /// Size of the action space: 3^num_services.
    pub fn num_actions(&self) -> u32 {
        3u32.pow(self.num_services as u32)
    }

    /// Whether `action` lies within [0, num_actions).
    pub fn contains(&self, action: u32) -> bool {
        action < self.num_actions()
    }

    /// The all-hold action (every digit 1, i.e. directive 0 everywhere).
    pub fn hold_action(&self) -> u32 {
        (self.num_actions() - 1) / 2
    }

    /// Decode an action into per-service directives.
    ///
    /// Repeated division by 3 yields the base-3 digits least-significant
    /// first; reversing gives service order, left-padded with zero digits
    /// (directive -1) for actions with fewer significant digits.
    pub fn decode(&self, action: u32) -> Vec<Directive> {
        let mut remaining = action;
        let mut directives = Vec::with_capacity(self.num_services);
        for _ in 0..self.num_services {
            let digit = (remaining % 3) as i8;
            directives.push(digit - 1);
            remaining /= 3;
        }
        directives.reverse();
        directives
    }

    /// Encode per-service directives back into an action index.
    ///
    /// Inverse of `decode`; used by tests and baseline policies. Directive
    /// values outside {-1, 0, +1} are a programming error.
    pub fn encode(&self, directives: &[Directive]) -> u32 {
        assert_eq!(
            directives.len(),
            self.num_services,
            "directive count must match number of services"
        );
        directives.iter().fold(0u32, |acc, &d| {
            assert!((-1..=1).contains(&d), "directive out of range: {}", d);
            acc * 3 + (d + 1) as u32
        })
    }
}
