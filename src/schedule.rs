// src/schedule.rs
//
// Workload schedule: the pre-generated trace of what happened at each
// step of an episode. Keyed by step index; each entry carries the
// observed workload intensity and the baseline replica configuration
// recorded for that window.
//
// The on-disk form is JSON with stringified step indices and hyphen-
// joined permutation labels; loading converts both into typed keys so
// step-time lookups never touch raw strings.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::types::{ReplicaConfig, StepIndex};

/// One step of the workload trace.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    /// Observed workload intensity for this window, >= 0.
    pub workload: f64,
    /// Replica configuration recorded for this window, used as the
    /// pre-action baseline when the environment steps.
    pub baseline: ReplicaConfig,
}

/// Raw on-disk shape of a schedule entry.
#[derive(Debug, Deserialize)]
struct RawScheduleEntry {
    workload: f64,
    permutation: String,
}

/// Ordered, read-only workload schedule for one episode trace.
#[derive(Debug, Clone, Default)]
pub struct WorkloadSchedule {
    entries: BTreeMap<StepIndex, ScheduleEntry>,
    width: Option<usize>,
}

impl WorkloadSchedule {
    /// Load a schedule from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ScheduleError> {
        let contents = fs::read_to_string(path).map_err(|e| ScheduleError::IoError {
            path: path.display().to_string(),
            source: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse a schedule from a JSON string and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ScheduleError> {
        let raw: BTreeMap<String, RawScheduleEntry> =
            serde_json::from_str(json).map_err(|e| ScheduleError::ParseError {
                source: e.to_string(),
            })?;

        let mut entries = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let step: StepIndex = key.parse().map_err(|_| ScheduleError::ValidationError {
                entry: key.clone(),
                message: "step index is not a non-negative integer".to_string(),
            })?;
            let baseline: ReplicaConfig =
                value
                    .permutation
                    .parse()
                    .map_err(|e| ScheduleError::ValidationError {
                        entry: key.clone(),
                        message: format!("{}", e),
                    })?;
            if !value.workload.is_finite() || value.workload < 0.0 {
                return Err(ScheduleError::ValidationError {
                    entry: key,
                    message: format!("workload {} is not a finite non-negative number", value.workload),
                });
            }
            entries.push((
                step,
                ScheduleEntry {
                    workload: value.workload,
                    baseline,
                },
            ));
        }

        Self::from_entries(entries)
    }

    /// Build a schedule from already-parsed entries, enforcing a uniform
    /// replica width across all steps.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (StepIndex, ScheduleEntry)>,
    ) -> Result<Self, ScheduleError> {
        let mut map = BTreeMap::new();
        let mut width: Option<usize> = None;

        for (step, entry) in entries {
            match width {
                None => width = Some(entry.baseline.width()),
                Some(w) if w != entry.baseline.width() => {
                    return Err(ScheduleError::ValidationError {
                        entry: step.to_string(),
                        message: format!(
                            "replica width {} differs from previous entries ({})",
                            entry.baseline.width(),
                            w
                        ),
                    });
                }
                Some(_) => {}
            }
            if map.insert(step, entry).is_some() {
                return Err(ScheduleError::ValidationError {
                    entry: step.to_string(),
                    message: "duplicate step index".to_string(),
                });
            }
        }

        Ok(Self { entries: map, width })
    }

    /// Entry for a given step, if the trace defines one.
    pub fn get(&self, step: StepIndex) -> Option<&ScheduleEntry> {
        self.entries.get(&step)
    }

    /// Number of steps defined by the trace.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replica width shared by all entries (None for an empty schedule).
    pub fn replica_width(&self) -> Option<usize> {
        self.width
    }

    /// Iterate entries in step order.
    pub fn iter(&self) -> impl Iterator<Item = (&StepIndex, &ScheduleEntry)> {
        self.entries.iter()
    }
}

/// Errors that can occur when loading a workload schedule.
#[derive(Debug, Clone)]
pub enum ScheduleError {
    IoError { path: String, source: String },
    ParseError { source: String },
    ValidationError { entry: String, message: String },
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::IoError { path, source } => {
                write!(f, "Failed to read schedule file '{}': {}", path, source)
            }
            ScheduleError::ParseError { source } => {
                write!(f, "Failed to parse schedule JSON: {}", source)
            }
            ScheduleError::ValidationError { entry, message } => {
                write!(f, "Schedule validation error at entry '{}': {}", entry, message)
            }
        }
    }
}

impl std::error::Error for ScheduleError {}
