//! Seams between the placement/transform core and the windowing layer
//!
//! The core never creates windows itself. It talks to an [`OutputSurface`]
//! produced by a [`SurfaceFactory`], so the same controller drives the
//! native Win32 projection window and the headless surface used in tests.

use crate::monitors::Rect;
use crate::transform::ViewTransform;

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Projection surface has no valid window handle")]
    InvalidHandle,
    #[error("Failed to create projection surface: {0}")]
    CreationFailed(String),
    #[error("OS rejected projection surface update: {0}")]
    Os(String),
}

/// Projection output window
pub trait OutputSurface {
    /// Move and resize to exactly `rect` (physical pixels, no adjustment)
    fn set_geometry(&mut self, rect: Rect) -> Result<(), SurfaceError>;

    /// Borderless + always-on-top + hidden from task/window switchers when
    /// `true`, an ordinary movable window otherwise
    fn set_borderless_topmost(&mut self, enabled: bool) -> Result<(), SurfaceError>;

    /// Idempotent, last-write-wins
    fn set_transform(&mut self, transform: &ViewTransform) -> Result<(), SurfaceError>;

    fn show(&mut self) -> Result<(), SurfaceError>;

    fn hide(&mut self) -> Result<(), SurfaceError>;
}

/// Creates projection surfaces
pub trait SurfaceFactory {
    type Surface: OutputSurface;

    fn create(&mut self, rect: Rect, borderless_topmost: bool) -> Result<Self::Surface, SurfaceError>;
}

/// Receiver of view transform updates.
///
/// No error channel: a failed push is logged by the implementor and the
/// previous projection state stays on screen.
pub trait TransformSink {
    fn set_transform(&mut self, transform: &ViewTransform);
}

impl<T: TransformSink + ?Sized> TransformSink for &mut T {
    fn set_transform(&mut self, transform: &ViewTransform) {
        (**self).set_transform(transform)
    }
}
