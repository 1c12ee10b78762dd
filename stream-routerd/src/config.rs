//! Daemon configuration, parsed from a json5 file.

use serde::Deserialize;

fn default_recompute_interval_ms() -> u64 {
    500
}

fn default_max_frame_size() -> usize {
    1024 * 1024
}

fn default_reconnect_backoff_ms() -> u64 {
    1000
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub router: RouterSection,
    /// Inputs in priority order; the first entry is preferred.
    pub inputs: Vec<InputSection>,
    pub outputs: Vec<OutputSection>,
    pub control: ControlSection,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouterSection {
    pub egress_queue_size: usize,
    #[serde(default = "default_recompute_interval_ms")]
    pub recompute_interval_ms: u64,
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct InputSection {
    pub id: String,
    pub listen: String,
    pub failover_window_ms: u64,
    /// Enables signal-quality tracking when set: frames only count as
    /// signal-ok while their probed level meets this threshold (0.0..=1.0).
    #[serde(default)]
    pub signal_threshold: Option<f32>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub connect: String,
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ControlSection {
    pub listen: String,
}
