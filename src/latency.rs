// src/latency.rs
//
// Latency table: the precomputed (replica configuration, workload) ->
// measured latency mapping that stands in for a live metrics pipeline.
// Read-only after load; lookups are exact-match, no interpolation.
//
// On disk the table is nested JSON keyed by the hyphen-joined replica
// label, then by the decimal rendering of the workload. Loading converts
// the outer keys into typed ReplicaConfig values; inner keys stay in
// their canonical decimal text form, and f64 lookups are canonicalized
// through `workload_key` so the two sides always agree.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::types::ReplicaConfig;

/// Canonical decimal text form of a workload value.
///
/// The schedule generator writes workload keys the way a decimal printer
/// renders floats: integral values keep one fractional digit ("10.0"),
/// everything else uses the shortest round-trip form ("12.25", "0.5").
pub fn workload_key(workload: f64) -> String {
    if workload.is_finite() && workload.fract() == 0.0 {
        format!("{:.1}", workload)
    } else {
        format!("{}", workload)
    }
}

/// Raw on-disk shape of a single measurement cell.
#[derive(Debug, Deserialize)]
struct RawMeasurement {
    latency: f64,
}

/// Read-only latency measurement table.
#[derive(Debug, Clone, Default)]
pub struct LatencyTable {
    cells: BTreeMap<ReplicaConfig, BTreeMap<String, f64>>,
}

impl LatencyTable {
    /// Load a latency table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let contents = fs::read_to_string(path).map_err(|e| TableError::IoError {
            path: path.display().to_string(),
            source: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse a latency table from a JSON string and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        let raw: BTreeMap<String, BTreeMap<String, RawMeasurement>> = serde_json::from_str(json)
            .map_err(|e| TableError::ParseError {
                source: e.to_string(),
            })?;

        let mut cells: BTreeMap<ReplicaConfig, BTreeMap<String, f64>> = BTreeMap::new();
        for (label, by_workload) in raw {
            let replicas: ReplicaConfig =
                label.parse().map_err(|e| TableError::ValidationError {
                    entry: label.clone(),
                    message: format!("{}", e),
                })?;

            let mut inner = BTreeMap::new();
            for (workload, cell) in by_workload {
                if !cell.latency.is_finite() || cell.latency < 0.0 {
                    return Err(TableError::ValidationError {
                        entry: format!("{}/{}", label, workload),
                        message: format!(
                            "latency {} is not a finite non-negative number",
                            cell.latency
                        ),
                    });
                }
                inner.insert(workload, cell.latency);
            }
            cells.insert(replicas, inner);
        }

        Ok(Self { cells })
    }

    /// Build a table from in-memory measurements (tests, embedding callers).
    pub fn from_measurements(
        measurements: impl IntoIterator<Item = (ReplicaConfig, f64, f64)>,
    ) -> Self {
        let mut cells: BTreeMap<ReplicaConfig, BTreeMap<String, f64>> = BTreeMap::new();
        for (replicas, workload, latency) in measurements {
            cells
                .entry(replicas)
                .or_default()
                .insert(workload_key(workload), latency);
        }
        Self { cells }
    }

    /// Measured latency for a replica configuration under a workload.
    ///
    /// Exact-match lookup; absent keys return None and the environment
    /// turns that into a step failure rather than a default value.
    pub fn lookup(&self, replicas: &ReplicaConfig, workload: f64) -> Option<f64> {
        self.cells
            .get(replicas)?
            .get(&workload_key(workload))
            .copied()
    }

    /// Number of replica configurations covered.
    pub fn num_configs(&self) -> usize {
        self.cells.len()
    }

    /// Total number of measurement cells.
    pub fn len(&self) -> usize {
        self.cells.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate measurements in deterministic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ReplicaConfig, &str, f64)> {
        self.cells.iter().flat_map(|(replicas, by_workload)| {
            by_workload
                .iter()
                .map(move |(workload, &latency)| (replicas, workload.as_str(), latency))
        })
    }
}

/// Errors that can occur when loading a latency table.
#[derive(Debug, Clone)]
pub enum TableError {
    IoError { path: String, source: String },
    ParseError { source: String },
    ValidationError { entry: String, message: String },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::IoError { path, source } => {
                write!(f, "Failed to read latency table '{}': {}", path, source)
            }
            TableError::ParseError { source } => {
                write!(f, "Failed to parse latency table JSON: {}", source)
            }
            TableError::ValidationError { entry, message } => {
                write!(f, "Latency table validation error at '{}': {}", entry, message)
            }
        }
    }
}

impl std::error::Error for TableError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_key_canonical_forms() {
        assert_eq!(workload_key(10.0), "10.0");
        assert_eq!(workload_key(0.0), "0.0");
        assert_eq!(workload_key(0.5), "0.5");
        assert_eq!(workload_key(12.25), "12.25");
        assert_eq!(workload_key(100.0), "100.0");
    }

    #[test]
    fn parse_and_lookup() {
        let json = r#"{
            "1-1-1": {"10.0": {"latency": 0.3}, "20.0": {"latency": 0.55}},
            "2-1-1": {"10.0": {"latency": 0.2}}
        }"#;

        let table = LatencyTable::from_json_str(json).expect("should parse");
        assert_eq!(table.num_configs(), 2);
        assert_eq!(table.len(), 3);

        let cfg = ReplicaConfig::from_counts(vec![1, 1, 1]);
        assert_eq!(table.lookup(&cfg, 10.0), Some(0.3));
        assert_eq!(table.lookup(&cfg, 20.0), Some(0.55));
        assert_eq!(table.lookup(&cfg, 30.0), None);

        let missing = ReplicaConfig::from_counts(vec![4, 4, 4]);
        assert_eq!(table.lookup(&missing, 10.0), None);
    }

    #[test]
    fn from_measurements_matches_parsed_form() {
        let cfg = ReplicaConfig::from_counts(vec![1, 2]);
        let table = LatencyTable::from_measurements(vec![(cfg.clone(), 10.0, 0.3)]);
        assert_eq!(table.lookup(&cfg, 10.0), Some(0.3));
    }

    #[test]
    fn bad_outer_key_is_validation_error() {
        let json = r#"{"one-two": {"10.0": {"latency": 0.3}}}"#;
        let err = LatencyTable::from_json_str(json).unwrap_err();
        assert!(matches!(err, TableError::ValidationError { .. }));
    }

    #[test]
    fn negative_latency_is_validation_error() {
        let json = r#"{"1-1-1": {"10.0": {"latency": -0.1}}}"#;
        assert!(LatencyTable::from_json_str(json).is_err());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = LatencyTable::from_json_str("[]").unwrap_err();
        assert!(matches!(err, TableError::ParseError { .. }));
    }
}
