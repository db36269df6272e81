use serde::{Deserialize, Serialize};

use crate::config;
use crate::transform::TransformLimits;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    // Monitor selection
    /// Device id of the display the user picked for projection ("" = automatic)
    #[serde(default)]
    pub preferred_monitor_device_id: String,

    // Zoom policy
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,

    // Logging
    #[serde(default = "default_log_level")]
    pub log_level: String, // "Off", "Error", "Warn", "Info", "Debug", "Trace"
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,
}

// Default functions for serde
fn default_min_scale() -> f64 {
    config::transform::MIN_SCALE
}

fn default_max_scale() -> f64 {
    config::transform::MAX_SCALE
}

fn default_zoom_step() -> f64 {
    config::transform::ZOOM_STEP
}

fn default_log_level() -> String {
    config::logging::DEFAULT_LOG_LEVEL.to_string()
}

fn default_log_to_file() -> bool {
    true
}

fn default_log_retention_days() -> u32 {
    config::logging::LOG_RETENTION_DAYS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preferred_monitor_device_id: String::new(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            zoom_step: default_zoom_step(),
            log_level: default_log_level(),
            log_to_file: default_log_to_file(),
            log_retention_days: default_log_retention_days(),
        }
    }
}

impl Settings {
    /// Zoom limits from the stored policy, or the built-in policy if the
    /// stored values are unusable.
    pub fn transform_limits(&self) -> TransformLimits {
        match TransformLimits::new(self.min_scale, self.max_scale, self.zoom_step) {
            Ok(limits) => limits,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring stored zoom policy");
                TransformLimits::default()
            }
        }
    }

    pub fn has_preferred_monitor(&self) -> bool {
        !self.preferred_monitor_device_id.trim().is_empty()
    }
}
