//! Projection controller
//!
//! Single owner of the projection surface. Replaces a shared nullable
//! "current projection window" with explicit create/replace/close
//! operations; event handlers talk to the controller instead of poking at
//! the window directly.

use crate::monitors::MonitorDescriptor;
use crate::placement::{self, Placement};
use crate::traits::{OutputSurface, SurfaceError, SurfaceFactory, TransformSink};
use crate::transform::ViewTransform;

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

pub struct ProjectionController<F: SurfaceFactory> {
    factory: F,
    surface: Option<F::Surface>,
    placement: Option<Placement>,
    last_transform: ViewTransform,
}

impl<F: SurfaceFactory> ProjectionController<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            surface: None,
            placement: None,
            last_transform: ViewTransform::IDENTITY,
        }
    }

    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    /// Placement currently applied to the open surface
    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    pub fn surface(&self) -> Option<&F::Surface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut F::Surface> {
        self.surface.as_mut()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn last_transform(&self) -> ViewTransform {
        self.last_transform
    }

    /// Show projection on the resolved target.
    ///
    /// Creates the surface if needed, otherwise repositions the existing one.
    /// A rejected move keeps the surface (and the recorded placement) where
    /// it was. Once the move succeeds the new placement is recorded even if
    /// restyling fails.
    pub fn open(
        &mut self,
        monitors: &[MonitorDescriptor],
        preferred_device_id: &str,
    ) -> Result<&Placement, ProjectionError> {
        let target = placement::resolve_placement(monitors, preferred_device_id);

        match self.surface.as_mut() {
            Some(surface) => match surface.set_geometry(target.rect()) {
                Ok(()) => {
                    // The window has moved; record it even if restyling fails below
                    finish_placement(surface, &target);
                    self.placement = Some(target);
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        rect = %target.rect(),
                        "Failed to reposition projection window, keeping previous geometry"
                    );
                }
            },
            None => {
                let surface = self.create_surface(&target)?;
                self.surface = Some(surface);
                self.placement = Some(target);
            }
        }

        // An open surface always has a placement recorded
        self.placement
            .as_ref()
            .ok_or(ProjectionError::Surface(SurfaceError::InvalidHandle))
    }

    /// Drop any existing surface and create a fresh one on the resolved target.
    pub fn replace(
        &mut self,
        monitors: &[MonitorDescriptor],
        preferred_device_id: &str,
    ) -> Result<&Placement, ProjectionError> {
        self.close();
        self.open(monitors, preferred_device_id)
    }

    /// Hide and release the surface. No-op when nothing is open.
    pub fn close(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            if let Err(e) = surface.hide() {
                tracing::debug!(error = %e, "Failed to hide projection window before close");
            }
            tracing::info!("Projection closed");
        }
        self.placement = None;
    }

    fn create_surface(&mut self, target: &Placement) -> Result<F::Surface, SurfaceError> {
        let rect = target.rect();
        let borderless = target.borderless_topmost();
        let mut surface = self.factory.create(rect, borderless)?;

        // Style, geometry and transform are best-effort; the window is usable without them
        if let Err(e) = surface.set_borderless_topmost(borderless) {
            tracing::warn!(error = %e, "Failed to apply projection window style");
        }
        if let Err(e) = surface.set_geometry(rect) {
            tracing::warn!(error = %e, rect = %rect, "Failed to apply projection geometry");
        }
        if let Err(e) = surface.set_transform(&self.last_transform) {
            tracing::warn!(error = %e, "Failed to apply initial projection transform");
        }
        surface.show()?;

        tracing::info!(rect = %rect, borderless, "Projection opened");
        Ok(surface)
    }
}

/// Style and visibility after a successful move. Failures leave the window
/// at its new position and are only logged.
fn finish_placement<S: OutputSurface>(surface: &mut S, target: &Placement) {
    if let Err(e) = surface.set_borderless_topmost(target.borderless_topmost()) {
        tracing::warn!(
            error = %e,
            rect = %target.rect(),
            "Projection window moved but its style could not be updated"
        );
    }
    if let Err(e) = surface.show() {
        tracing::warn!(error = %e, "Projection window moved but could not be shown");
    }
}

impl<F: SurfaceFactory> TransformSink for ProjectionController<F> {
    fn set_transform(&mut self, transform: &ViewTransform) {
        self.last_transform = *transform;
        if let Some(surface) = self.surface.as_mut() {
            if let Err(e) = surface.set_transform(transform) {
                tracing::warn!(error = %e, "Failed to push transform to projection window");
            }
        }
    }
}

impl<F: SurfaceFactory> Drop for ProjectionController<F> {
    fn drop(&mut self) {
        self.close();
    }
}
