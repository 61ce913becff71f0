//! Heap configuration
//!
//! Loaded from JSON the same way engine settings are; every field has a
//! default so partial files are accepted.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Standard page capacity (64 KiB).
pub const DEFAULT_PAGE_SIZE: usize = 64 * 1024;
/// Constant buffer placement alignment.
pub const DEFAULT_ALIGNMENT: usize = 256;
/// Large pages kept alive across frames before eviction kicks in.
pub const DEFAULT_MAX_PERMANENT_LARGE_PAGES: usize = 4;

/// How device completion notifications advance the finished-frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameCounterMode {
    /// Each notification retires exactly one frame, regardless of its id.
    #[default]
    Sequential,
    /// The notified frame id is trusted; skipped frames retire together.
    Authoritative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    pub page_size: usize,
    pub alignment: usize,
    pub max_permanent_large_pages: usize,
    pub frame_counter_mode: FrameCounterMode,
    /// Standard ring length above which frame begin logs a warning.
    pub page_growth_warning: Option<usize>,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            alignment: DEFAULT_ALIGNMENT,
            max_permanent_large_pages: DEFAULT_MAX_PERMANENT_LARGE_PAGES,
            frame_counter_mode: FrameCounterMode::Sequential,
            page_growth_warning: Some(16),
        }
    }
}

impl HeapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.alignment.is_power_of_two() {
            return Err(ConfigError::AlignmentNotPowerOfTwo(self.alignment));
        }
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.page_size % self.alignment != 0 {
            return Err(ConfigError::UnalignedPageSize {
                page_size: self.page_size,
                alignment: self.alignment,
            });
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
