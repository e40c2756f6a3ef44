//! Motion configuration system
//!
//! This crate provides centralized configuration for animators and the demo
//! stage, loading settings from `motion.toml` with environment variable
//! overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MotionConfig {
    /// Option values every new chain starts with
    pub defaults: AnimationDefaults,
    /// Headless stage settings
    pub stage: StageConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

/// Default chain options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationDefaults {
    /// Duration in seconds
    pub duration: f64,
    /// Delay in seconds
    pub delay: f64,
    /// CSS timing function text (linear, ease-in, cubic-bezier(...), steps(...))
    pub easing: String,
    /// Number of forward+backward cycles; 0 plays once and keeps the end state
    pub loop_count: u32,
    /// Loop until the target is detached; overrides `loop_count`
    pub loop_forever: bool,
}

/// Headless stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Simulated frame length in milliseconds
    pub frame_ms: f32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (e.g. "motion_chain=debug"); `RUST_LOG` is used when unset
    pub filter: Option<String>,
}

impl Default for AnimationDefaults {
    fn default() -> Self {
        Self {
            duration: 0.3,
            delay: 0.0,
            easing: "linear".to_string(),
            loop_count: 0,
            loop_forever: false,
        }
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self { frame_ms: 16.0 }
    }
}

impl MotionConfig {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(MotionConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load `motion.toml` from the current directory, or defaults if it
    /// doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("motion.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Unparsable values are ignored.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("MOTION_DURATION") {
            if let Ok(duration) = val.parse::<f64>() {
                self.defaults.duration = duration;
            }
        }
        if let Ok(val) = std::env::var("MOTION_DELAY") {
            if let Ok(delay) = val.parse::<f64>() {
                self.defaults.delay = delay;
            }
        }
        if let Ok(easing) = std::env::var("MOTION_EASING") {
            self.defaults.easing = easing;
        }
        if let Ok(val) = std::env::var("MOTION_LOOP") {
            if val.eq_ignore_ascii_case("infinite") {
                self.defaults.loop_forever = true;
            } else if let Ok(count) = val.parse::<u32>() {
                self.defaults.loop_count = count;
                self.defaults.loop_forever = false;
            }
        }

        if let Ok(val) = std::env::var("MOTION_FRAME_MS") {
            if let Ok(frame_ms) = val.parse::<f32>() {
                self.stage.frame_ms = frame_ms;
            }
        }

        if let Ok(filter) = std::env::var("MOTION_LOG") {
            self.logging.filter = Some(filter);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from motion.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
