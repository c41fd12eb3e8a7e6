//! Driver configuration
//!
//! ```toml
//! frame_interval_ms = 16.666666666666668
//! max_catch_up_frames = 10
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};

/// Timing shared by every driver
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Nominal interval the physics is stepped at, in milliseconds
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: f64,
    /// Accumulated time beyond this many nominal frames restarts the clock
    #[serde(default = "default_max_catch_up_frames")]
    pub max_catch_up_frames: u32,
}

fn default_frame_interval_ms() -> f64 {
    1000.0 / 60.0
}

fn default_max_catch_up_frames() -> u32 {
    10
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            max_catch_up_frames: default_max_catch_up_frames(),
        }
    }
}

impl MotionConfig {
    /// Step the physics at a given rate instead of 60 fps
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.frame_interval_ms = 1000.0 / fps;
        self
    }

    pub fn with_max_catch_up_frames(mut self, frames: u32) -> Self {
        self.max_catch_up_frames = frames;
        self
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: MotionConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.frame_interval_ms.is_finite() || self.frame_interval_ms <= 0.0 {
            return Err(AnimationError::InvalidConfig(format!(
                "frame_interval_ms must be finite and positive, got {}",
                self.frame_interval_ms
            )));
        }
        if self.max_catch_up_frames == 0 {
            return Err(AnimationError::InvalidConfig(
                "max_catch_up_frames must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Nominal step in seconds
    pub fn step_seconds(&self) -> f64 {
        self.frame_interval_ms / 1000.0
    }

    /// Longest accumulated time that is caught up rather than dropped
    pub fn stall_threshold_ms(&self) -> f64 {
        self.frame_interval_ms * f64::from(self.max_catch_up_frames)
    }
}
