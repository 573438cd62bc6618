// src/bin/flatten_metrics.rs
//
// Offline data preparation: flatten a latency-measurement table into the
// step-indexed workload schedule the environment consumes.
//
// The latency table enumerates (replica configuration, workload) cells;
// this tool writes one schedule entry per cell, numbering them in
// deterministic key order. Build-time tooling, not runtime behavior.
//
// Run example:
//   cargo run --bin flatten-metrics -- --metrics json_data.json --out timesteps.json

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use autoscale_sim::latency::LatencyTable;

#[derive(Debug, Parser)]
#[command(
    name = "flatten-metrics",
    about = "Flatten a latency table into a step-indexed schedule file",
    version
)]
struct Args {
    /// Latency table JSON file to flatten.
    #[arg(long)]
    metrics: PathBuf,

    /// Output schedule JSON file.
    #[arg(long)]
    out: PathBuf,

    /// Pretty-print the output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct FlatEntry {
    permutation: String,
    workload: f64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let table = LatencyTable::load(&args.metrics)
        .with_context(|| format!("loading latency table {}", args.metrics.display()))?;

    let mut flattened: BTreeMap<u64, FlatEntry> = BTreeMap::new();
    for (count, (replicas, workload, _latency)) in table.iter().enumerate() {
        let workload: f64 = workload
            .parse()
            .with_context(|| format!("workload key '{}' is not a number", workload))?;
        flattened.insert(
            count as u64,
            FlatEntry {
                permutation: replicas.label(),
                workload,
            },
        );
    }

    // serde_json renders the integer step keys as the stringified form
    // the schedule loader expects.
    let json = if args.pretty {
        serde_json::to_string_pretty(&flattened)?
    } else {
        serde_json::to_string(&flattened)?
    };
    fs::write(&args.out, json)
        .with_context(|| format!("writing schedule {}", args.out.display()))?;

    eprintln!(
        "flattened {} cells from {} into {}",
        table.len(),
        args.metrics.display(),
        args.out.display()
    );
    Ok(())
}
