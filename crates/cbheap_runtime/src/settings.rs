//! Runtime settings

use anyhow::{Context, Result};
use cbheap_core::HeapConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Simulation settings, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub heap: HeapConfig,
    /// Host frames to record.
    pub frames: u64,
    /// Volatile constant buffers uploaded per frame.
    pub objects_per_frame: usize,
    /// How many frames the device timeline lags behind the host.
    pub frames_in_flight: u64,
    /// Every n-th frame uploads an oversized bone palette (0 disables).
    pub large_upload_every: u64,
    /// Frames between heap reports.
    pub report_every: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            heap: HeapConfig::default(),
            frames: 240,
            objects_per_frame: 2048,
            frames_in_flight: 2,
            large_upload_every: 3,
            report_every: 60,
        }
    }
}

impl RuntimeSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.heap.validate()?;
        anyhow::ensure!(settings.frames_in_flight >= 1, "frames_in_flight must be at least 1");
        Ok(settings)
    }
}
