//! Projector - multi-monitor projection core
//!
//! Picks the display that receives projection, places a borderless topmost
//! output surface exactly over it, and mirrors the operator's zoom/pan from
//! the preview onto that surface.

// Configuration constants
pub mod config;

// Display snapshot and target selection
pub mod monitors;
pub mod placement;

// Zoom/pan state and synchronization
pub mod transform;

// Output surface seams, implementations and their owner
pub mod traits;
pub mod projection_window;
pub mod projection;

// Settings, persistence and logging
pub mod settings;
pub mod settings_io;
pub mod logging;

// Re-export commonly used types
pub use monitors::{enumerate_monitors, MonitorDescriptor, MonitorError, Rect};
pub use placement::{compute_geometry, resolve_placement, select_target, Placement, SelectionReason};
pub use projection::{ProjectionController, ProjectionError};
pub use traits::{OutputSurface, SurfaceError, SurfaceFactory, TransformSink};
pub use transform::{TransformLimits, TransformSync, ViewTransform};

#[cfg(target_os = "windows")]
pub use projection_window::WindowsProjectionFactory as NativeProjectionFactory;

#[cfg(not(target_os = "windows"))]
pub use projection_window::HeadlessFactory as NativeProjectionFactory;
