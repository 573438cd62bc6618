// src/telemetry.rs
//
// Optional JSONL telemetry for episode runs.
//
// Disabled by default. Controlled by environment variables:
// - AUTOSCALE_SIM_TELEMETRY_MODE: "off" (default) or "jsonl"
// - AUTOSCALE_SIM_TELEMETRY_PATH: path to the JSONL file
//
// Each step writes one TickRecord line; episode boundaries write
// start/end markers. A write failure disables the sink rather than
// failing the episode.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::action::ACTION_VERSION;
use crate::env::StepResult;
use crate::observation::OBS_VERSION;
use crate::reward::RewardComponents;
use crate::types::{Directive, StepIndex};

/// Per-step record for telemetry logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickRecord {
    /// Observation schema version.
    pub obs_version: u32,
    /// Action encoding schema version.
    pub action_version: u32,
    /// Policy version string.
    pub policy_version: String,
    /// Episode ID.
    pub episode_id: u64,
    /// Step index within the episode.
    pub step: StepIndex,
    /// Raw action index.
    pub action: u32,
    /// Decoded per-service directives.
    pub directives: Vec<Directive>,
    /// Workload intensity observed this step.
    pub workload_rate: f64,
    /// Post-action replica counts.
    pub replicas: Vec<u32>,
    /// Measured latency.
    pub latency: f64,
    /// Scalar reward.
    pub reward: f64,
    /// Termination flag.
    pub done: bool,
    /// Reward components breakdown.
    pub reward_components: Option<RewardComponents>,
}

impl TickRecord {
    pub fn from_step(
        result: &StepResult,
        action: u32,
        policy_version: &str,
        episode_id: u64,
    ) -> Self {
        Self {
            obs_version: OBS_VERSION,
            action_version: ACTION_VERSION,
            policy_version: policy_version.to_string(),
            episode_id,
            step: result.info.step,
            action,
            directives: result.info.directives.clone(),
            workload_rate: result.observation.workload_rate,
            replicas: result.observation.replicas.clone(),
            latency: result.observation.latency,
            reward: result.reward,
            done: result.done,
            reward_components: result.info.reward_components.clone(),
        }
    }
}

/// Episode boundary marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeMarker {
    pub episode_id: u64,
    pub marker_type: EpisodeMarkerType,
    /// Total steps in the episode (end markers only).
    pub total_steps: Option<u64>,
    /// Total reward accumulated (end markers only).
    pub total_reward: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EpisodeMarkerType {
    Start,
    End,
}

/// JSONL telemetry sink for episode runs.
pub struct EpisodeTelemetry {
    enabled: bool,
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
}

impl Default for EpisodeTelemetry {
    fn default() -> Self {
        Self::disabled()
    }
}

impl EpisodeTelemetry {
    /// Create a disabled sink.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            path: None,
            writer: None,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let enabled = env::var("AUTOSCALE_SIM_TELEMETRY_MODE")
            .map(|s| s.to_lowercase() == "jsonl")
            .unwrap_or(false);
        let path = env::var("AUTOSCALE_SIM_TELEMETRY_PATH")
            .ok()
            .map(PathBuf::from);

        Self {
            enabled,
            path,
            writer: None,
        }
    }

    /// Enable telemetry writing to a specific path.
    pub fn enable(path: PathBuf) -> Self {
        Self {
            enabled: true,
            path: Some(path),
            writer: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn ensure_writer(&mut self) -> Option<&mut BufWriter<File>> {
        if !self.enabled {
            return None;
        }
        if self.writer.is_none() {
            let path = self.path.as_ref()?;
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()?;
            self.writer = Some(BufWriter::new(file));
        }
        self.writer.as_mut()
    }

    fn write_json(&mut self, value: &JsonValue) {
        let Some(writer) = self.ensure_writer() else {
            return;
        };
        let line = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(_) => return,
        };
        if writeln!(writer, "{}", line).is_err() {
            self.enabled = false;
            self.writer = None;
        }
    }

    /// Log an episode start marker.
    pub fn log_episode_start(&mut self, episode_id: u64) {
        let marker = EpisodeMarker {
            episode_id,
            marker_type: EpisodeMarkerType::Start,
            total_steps: None,
            total_reward: None,
        };
        let value = serde_json::to_value(&marker).unwrap_or_default();
        self.write_json(&value);
    }

    /// Log an episode end marker.
    pub fn log_episode_end(&mut self, episode_id: u64, total_steps: u64, total_reward: f64) {
        let marker = EpisodeMarker {
            episode_id,
            marker_type: EpisodeMarkerType::End,
            total_steps: Some(total_steps),
            total_reward: Some(total_reward),
        };
        let value = serde_json::to_value(&marker).unwrap_or_default();
        self.write_json(&value);
    }

    /// Log one step.
    pub fn log_step(
        &mut self,
        result: &StepResult,
        action: u32,
        policy_version: &str,
        episode_id: u64,
    ) {
        if !self.enabled {
            return;
        }
        let record = TickRecord::from_step(result, action, policy_version, episode_id);
        let value = serde_json::to_value(&record).unwrap_or_default();
        self.write_json(&value);
    }

    /// Flush the writer.
    pub fn flush(&mut self) {
        if let Some(writer) = &mut self.writer {
            let _ = writer.flush();
        }
    }
}

impl Drop for EpisodeTelemetry {
    fn drop(&mut self) {
        self.flush();
    }
}
