//! Application Configuration Constants
//!
//! Centralized configuration for placement fallbacks, zoom policy, timings, and defaults.

/// Projection window configuration
pub mod window {
    /// Region used when no monitor could be resolved (x, y, width, height).
    /// The projection surface is windowed (not borderless/topmost) in this case.
    pub const FALLBACK_REGION: (i32, i32, u32, u32) = (0, 0, 800, 600);

    /// Projection background color (BGR format: 0xBBGGRR)
    pub const BACKGROUND_COLOR: u32 = 0x000000;

    /// Timeout for window creation (iterations)
    pub const CREATION_TIMEOUT_ITERATIONS: u32 = 50;

    /// Poll interval during window creation wait (milliseconds)
    pub const CREATION_POLL_INTERVAL_MS: u64 = 10;
}

/// Zoom/pan transform policy
pub mod transform {
    /// Smallest allowed uniform scale
    pub const MIN_SCALE: f64 = 0.2;

    /// Largest allowed uniform scale
    pub const MAX_SCALE: f64 = 5.0;

    /// Scale increment for one zoom step (button click or wheel notch)
    pub const ZOOM_STEP: f64 = 0.1;

    /// Scale values are snapped to multiples of this after every step
    pub const SCALE_PRECISION: f64 = 0.001;
}

/// Logging configuration
pub mod logging {
    /// Log retention period in days
    pub const LOG_RETENTION_DAYS: u32 = 30;

    /// Default log level name
    pub const DEFAULT_LOG_LEVEL: &str = "Error";

    /// Base name of the daily log file; rotation appends `.YYYY-MM-DD`
    pub const LOG_FILE_NAME: &str = "projector.log";

    /// Crate targets the level filter applies to (bin and lib)
    pub const LOG_TARGETS: [&str; 2] = ["projector", "projector_core"];
}

/// Environment overrides
pub mod env {
    /// Environment variable overriding the stored log level
    /// - Windows: `set PROJECTOR_LOG=debug`
    /// - macOS/Linux: `export PROJECTOR_LOG=debug`
    pub const LOG_LEVEL_ENV: &str = "PROJECTOR_LOG";
}
