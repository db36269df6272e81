//! Monitor enumeration
//!
//! Produces a fresh snapshot of the connected displays on every call. The
//! order is whatever the operating system reports; callers must not assume
//! the primary display comes first.
//!
//! Two entry points are provided:
//! - [`try_enumerate_monitors`] reports failures as [`MonitorError`]
//! - [`enumerate_monitors`] never fails; errors degrade to an empty list

use serde::{Deserialize, Serialize};

#[cfg(target_os = "windows")]
mod windows;

/// Integer rectangle in virtual-desktop pixels.
///
/// `x`/`y` may be negative for displays left of or above the primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as i64, y as i64);
        x >= self.x as i64 && x < self.right() && y >= self.y as i64 && y < self.bottom()
    }

    pub fn center(&self) -> (i32, i32) {
        (
            (self.x as i64 + self.width as i64 / 2) as i32,
            (self.y as i64 + self.height as i64 / 2) as i32,
        )
    }

    /// A `width` x `height` rectangle centered on `outer`.
    pub fn centered_on(outer: &Rect, width: u32, height: u32) -> Rect {
        let (cx, cy) = outer.center();
        Rect {
            x: (cx as i64 - width as i64 / 2) as i32,
            y: (cy as i64 - height as i64 / 2) as i32,
            width,
            height,
        }
    }
}

impl From<(i32, i32, u32, u32)> for Rect {
    fn from((x, y, width, height): (i32, i32, u32, u32)) -> Self {
        Rect::new(x, y, width, height)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} @ ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// One connected display, as reported by the OS at enumeration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorDescriptor {
    /// Stable identifier used to remember the user's monitor preference
    pub device_id: String,
    /// Human-readable name (display only)
    pub name: String,
    pub is_primary: bool,
    pub bounds: Rect,
    /// Effective DPI / 96 (informational; geometry is always physical pixels)
    pub scale_factor: f64,
}

impl MonitorDescriptor {
    pub fn new(device_id: impl Into<String>, is_primary: bool, bounds: Rect) -> Self {
        let device_id = device_id.into();
        Self {
            name: device_id.clone(),
            device_id,
            is_primary,
            bounds,
            scale_factor: 1.0,
        }
    }

    /// Case-insensitive device identifier comparison
    pub fn matches_device_id(&self, device_id: &str) -> bool {
        self.device_id.to_lowercase() == device_id.to_lowercase()
    }

    /// Label suitable for a monitor picker
    pub fn label(&self) -> String {
        let primary = if self.is_primary { " [primary]" } else { "" };
        format!(
            "{} ({}x{} @ {:.0}%){}",
            self.name,
            self.bounds.width,
            self.bounds.height,
            self.scale_factor * 100.0,
            primary
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Monitor enumeration failed: {0}")]
    EnumerationFailed(String),
    #[error("Monitor enumeration is not supported on {0}")]
    Unsupported(&'static str),
}

/// Enumerate monitors, reporting OS failures.
pub fn try_enumerate_monitors() -> Result<Vec<MonitorDescriptor>, MonitorError> {
    #[cfg(target_os = "windows")]
    {
        self::windows::enumerate()
    }

    #[cfg(not(target_os = "windows"))]
    {
        Err(MonitorError::Unsupported(std::env::consts::OS))
    }
}

/// Enumerate monitors. Failures yield an empty list so callers fall back to
/// a default windowed placement instead of aborting.
pub fn enumerate_monitors() -> Vec<MonitorDescriptor> {
    match try_enumerate_monitors() {
        Ok(monitors) => {
            tracing::debug!(count = monitors.len(), "Enumerated monitors");
            monitors
        }
        Err(e) => {
            tracing::warn!(error = %e, "Monitor enumeration failed, continuing without monitors");
            Vec::new()
        }
    }
}
