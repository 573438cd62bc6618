// src/types.rs
//
// Shared primitive types for the autoscaling environment.
// - StepIndex / Directive aliases
// - ReplicaConfig: typed replica-count vector with the hyphen-joined
//   label form used by the on-disk schedule and latency table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 0-based step index within an episode.
pub type StepIndex = u64;

/// Per-service scaling directive: -1 = scale down, 0 = hold, +1 = scale up.
pub type Directive = i8;

/// A replica configuration: one replica count per service, in service order.
///
/// The canonical textual form is the hyphen-joined count list ("1-2-4"),
/// which is also the outer key of the latency table and the `permutation`
/// field of schedule entries. Parsing happens once at load time so that
/// lookups run against typed keys rather than raw strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReplicaConfig(Vec<u32>);

impl ReplicaConfig {
    /// Build from per-service replica counts.
    pub fn from_counts(counts: Vec<u32>) -> Self {
        Self(counts)
    }

    /// Replica counts in service order.
    pub fn counts(&self) -> &[u32] {
        &self.0
    }

    /// Number of services covered by this configuration.
    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// The hyphen-joined label form ("1-2-4").
    pub fn label(&self) -> String {
        self.0
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for ReplicaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Error produced when a replica-configuration label fails to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReplicaConfigError {
    pub label: String,
}

impl fmt::Display for ParseReplicaConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid replica configuration label {:?} (expected hyphen-joined counts, e.g. \"1-2-4\")",
            self.label
        )
    }
}

impl std::error::Error for ParseReplicaConfigError {}

impl FromStr for ReplicaConfig {
    type Err = ParseReplicaConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseReplicaConfigError {
                label: s.to_string(),
            });
        }
        let counts = s
            .split('-')
            .map(|part| part.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseReplicaConfigError {
                label: s.to_string(),
            })?;
        Ok(Self(counts))
    }
}

impl TryFrom<String> for ReplicaConfig {
    type Error = ParseReplicaConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ReplicaConfig> for String {
    fn from(cfg: ReplicaConfig) -> String {
        cfg.label()
    }
}
