use crate::monitors::Rect;
use crate::traits::{OutputSurface, SurfaceError, SurfaceFactory};
use crate::transform::ViewTransform;

/// In-memory projection surface.
///
/// Records everything the controller asks of it so hosts without a native
/// window (and tests) can observe placement and transform state.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    pub geometry: Rect,
    pub borderless_topmost: bool,
    pub visible: bool,
    pub transform: ViewTransform,
    pub transform_pushes: usize,
    /// When set, `set_geometry` fails like an OS refusing to move the window
    pub reject_geometry: bool,
    /// When set, `set_borderless_topmost` fails
    pub reject_style: bool,
}

impl OutputSurface for HeadlessSurface {
    fn set_geometry(&mut self, rect: Rect) -> Result<(), SurfaceError> {
        if self.reject_geometry {
            return Err(SurfaceError::Os("geometry rejected".to_string()));
        }
        tracing::debug!(rect = %rect, "Headless surface geometry");
        self.geometry = rect;
        Ok(())
    }

    fn set_borderless_topmost(&mut self, enabled: bool) -> Result<(), SurfaceError> {
        if self.reject_style {
            return Err(SurfaceError::Os("style rejected".to_string()));
        }
        self.borderless_topmost = enabled;
        Ok(())
    }

    fn set_transform(&mut self, transform: &ViewTransform) -> Result<(), SurfaceError> {
        self.transform = *transform;
        self.transform_pushes += 1;
        Ok(())
    }

    fn show(&mut self) -> Result<(), SurfaceError> {
        self.visible = true;
        Ok(())
    }

    fn hide(&mut self) -> Result<(), SurfaceError> {
        self.visible = false;
        Ok(())
    }
}

/// Factory for [`HeadlessSurface`]
#[derive(Debug, Default)]
pub struct HeadlessFactory {
    pub created: usize,
    /// When set, `create` fails
    pub fail_creation: bool,
}

impl SurfaceFactory for HeadlessFactory {
    type Surface = HeadlessSurface;

    fn create(&mut self, rect: Rect, borderless_topmost: bool) -> Result<HeadlessSurface, SurfaceError> {
        if self.fail_creation {
            return Err(SurfaceError::CreationFailed("headless creation disabled".to_string()));
        }
        self.created += 1;
        Ok(HeadlessSurface {
            geometry: rect,
            borderless_topmost,
            ..HeadlessSurface::default()
        })
    }
}
