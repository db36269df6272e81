//! Zoom/pan view transform and its preview → projection synchronizer
//!
//! The transform maps a content point `p` to the screen point
//! `scale * p + offset`. The preview owns the authoritative copy; every
//! change is pushed (copied) to the sink, which is normally the projection
//! controller. Pushes are last-write-wins with no queuing or animation.

use serde::{Deserialize, Serialize};

use crate::config;
use crate::traits::TransformSink;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TransformError {
    #[error("Invalid transform limits: min={min_scale}, max={max_scale}, step={step}")]
    InvalidLimits {
        min_scale: f64,
        max_scale: f64,
        step: f64,
    },
}

/// Scale bounds and zoom increment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformLimits {
    min_scale: f64,
    max_scale: f64,
    step: f64,
}

impl TransformLimits {
    pub fn new(min_scale: f64, max_scale: f64, step: f64) -> Result<Self, TransformError> {
        let finite = min_scale.is_finite() && max_scale.is_finite() && step.is_finite();
        // Steps finer than the scale precision would be snapped away
        if !finite
            || min_scale <= 0.0
            || min_scale >= max_scale
            || step < config::transform::SCALE_PRECISION
        {
            return Err(TransformError::InvalidLimits {
                min_scale,
                max_scale,
                step,
            });
        }
        Ok(Self {
            min_scale,
            max_scale,
            step,
        })
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self {
            min_scale: config::transform::MIN_SCALE,
            max_scale: config::transform::MAX_SCALE,
            step: config::transform::ZOOM_STEP,
        }
    }
}

/// Uniform scale + translation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Content point → screen point
    pub fn to_screen(&self, point: (f64, f64)) -> (f64, f64) {
        (
            self.scale * point.0 + self.offset_x,
            self.scale * point.1 + self.offset_y,
        )
    }

    /// Screen point → content point
    pub fn to_content(&self, point: (f64, f64)) -> (f64, f64) {
        (
            (point.0 - self.offset_x) / self.scale,
            (point.1 - self.offset_y) / self.scale,
        )
    }

    pub fn is_zoomed_in(&self) -> bool {
        self.scale > 1.0
    }
}

fn snap_scale(scale: f64) -> f64 {
    let factor = (1.0 / config::transform::SCALE_PRECISION).round();
    (scale * factor).round() / factor
}

/// Owns the preview's view transform and mirrors every change to `S`.
pub struct TransformSync<S: TransformSink> {
    transform: ViewTransform,
    limits: TransformLimits,
    pan_anchor: Option<(f64, f64)>,
    sink: S,
}

impl<S: TransformSink> TransformSync<S> {
    pub fn new(limits: TransformLimits, sink: S) -> Self {
        let mut transform = ViewTransform::IDENTITY;
        transform.scale = limits.clamp(transform.scale);
        Self {
            transform,
            limits,
            pan_anchor: None,
            sink,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn limits(&self) -> TransformLimits {
        self.limits
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Push the current state even if nothing changed (e.g. after the sink
    /// gained a new surface).
    pub fn resync(&mut self) {
        self.sink.set_transform(&self.transform);
    }

    pub fn zoom_in(&mut self) -> bool {
        let scale = self.transform.scale + self.limits.step;
        self.set_scale(scale)
    }

    pub fn zoom_out(&mut self) -> bool {
        let scale = self.transform.scale - self.limits.step;
        self.set_scale(scale)
    }

    /// Move the view. Ignored while the content fits (`scale <= 1`).
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        if !self.transform.is_zoomed_in() || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        let next = ViewTransform {
            offset_x: self.transform.offset_x + dx,
            offset_y: self.transform.offset_y + dy,
            ..self.transform
        };
        self.commit(next)
    }

    /// Wheel zoom anchored at the cursor: the content under `cursor_pos`
    /// stays under it, wherever the cursor is. `control_size` is only
    /// checked for sanity.
    pub fn zoom_at_point(
        &mut self,
        delta: f64,
        cursor_pos: (f64, f64),
        control_size: (f64, f64),
    ) -> bool {
        if delta == 0.0 || !delta.is_finite() {
            return false;
        }
        if !(cursor_pos.0.is_finite() && cursor_pos.1.is_finite()) {
            tracing::debug!(?cursor_pos, ?control_size, "Ignoring zoom at non-finite cursor");
            return false;
        }

        let old_scale = self.transform.scale;
        let step = if delta > 0.0 {
            self.limits.step
        } else {
            -self.limits.step
        };
        let new_scale = self.limits.clamp(snap_scale(old_scale + step));

        let (cx, cy) = cursor_pos;
        let ratio = new_scale / old_scale;

        let next = ViewTransform {
            scale: new_scale,
            offset_x: (1.0 - ratio) * cx + ratio * self.transform.offset_x,
            offset_y: (1.0 - ratio) * cy + ratio * self.transform.offset_y,
        };
        self.commit(next)
    }

    pub fn reset(&mut self) -> bool {
        self.pan_anchor = None;
        let next = ViewTransform {
            scale: self.limits.clamp(1.0),
            offset_x: 0.0,
            offset_y: 0.0,
        };
        self.commit(next)
    }

    pub fn on_zoom(&mut self, delta: f64, cursor_pos: (f64, f64), control_size: (f64, f64)) -> bool {
        self.zoom_at_point(delta, cursor_pos, control_size)
    }

    pub fn on_pan_start(&mut self, pos: (f64, f64)) {
        self.pan_anchor = Some(pos);
    }

    pub fn on_pan_move(&mut self, pos: (f64, f64)) -> bool {
        let Some(last) = self.pan_anchor else {
            return false;
        };
        self.pan_anchor = Some(pos);
        self.pan(pos.0 - last.0, pos.1 - last.1)
    }

    pub fn on_pan_end(&mut self, pos: (f64, f64)) -> bool {
        let changed = self.on_pan_move(pos);
        self.pan_anchor = None;
        changed
    }

    pub fn on_reset(&mut self) -> bool {
        self.reset()
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    fn set_scale(&mut self, scale: f64) -> bool {
        let next = ViewTransform {
            scale: self.limits.clamp(snap_scale(scale)),
            ..self.transform
        };
        self.commit(next)
    }

    /// Enforce the invariants, store, and push if anything changed.
    fn commit(&mut self, mut next: ViewTransform) -> bool {
        next.scale = self.limits.clamp(next.scale);
        if !next.is_zoomed_in() {
            next.offset_x = 0.0;
            next.offset_y = 0.0;
        }
        if next == self.transform {
            return false;
        }
        self.transform = next;
        tracing::trace!(
            scale = next.scale,
            offset_x = next.offset_x,
            offset_y = next.offset_y,
            "View transform changed"
        );
        self.sink.set_transform(&next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<ViewTransform>);

    impl TransformSink for Recorder {
        fn set_transform(&mut self, transform: &ViewTransform) {
            self.0.push(*transform);
        }
    }

    #[test]
    fn test_limits_validation() {
        assert!(TransformLimits::new(0.2, 5.0, 0.1).is_ok());
        assert!(TransformLimits::new(0.0, 5.0, 0.1).is_err());
        assert!(TransformLimits::new(5.0, 0.2, 0.1).is_err());
        assert!(TransformLimits::new(0.2, 5.0, 0.0).is_err());
        assert!(TransformLimits::new(f64::NAN, 5.0, 0.1).is_err());
    }

    #[test]
    fn test_step_below_precision_is_rejected() {
        assert!(TransformLimits::new(0.2, 5.0, 0.0004).is_err());
        assert!(TransformLimits::new(0.2, 5.0, config::transform::SCALE_PRECISION).is_ok());

        let limits = TransformLimits::new(0.2, 5.0, 0.001).unwrap();
        let mut sync = TransformSync::new(limits, Recorder::default());
        assert!(sync.zoom_in());
        assert_eq!(sync.transform().scale, 1.001);
    }

    #[test]
    fn test_snap_scale_removes_drift() {
        assert_eq!(snap_scale(1.0 + 0.1 + 0.1 + 0.1), 1.3);
    }

    #[test]
    fn test_unchanged_state_is_not_pushed() {
        let mut sync = TransformSync::new(TransformLimits::default(), Recorder::default());
        assert!(!sync.reset());
        assert!(!sync.pan(10.0, 10.0));
        assert!(!sync.zoom_at_point(0.0, (5.0, 5.0), (10.0, 10.0)));
        assert!(sync.sink().0.is_empty());
    }

    #[test]
    fn test_reset_clamps_into_limits() {
        let limits = TransformLimits::new(1.5, 3.0, 0.5).unwrap();
        let mut sync = TransformSync::new(limits, Recorder::default());
        assert_eq!(sync.transform().scale, 1.5);
        sync.zoom_in();
        assert!(sync.reset());
        assert_eq!(sync.transform().scale, 1.5);
    }

    #[test]
    fn test_content_screen_roundtrip() {
        let t = ViewTransform {
            scale: 2.0,
            offset_x: -30.0,
            offset_y: 12.0,
        };
        let (sx, sy) = t.to_screen((10.0, 20.0));
        assert_eq!((sx, sy), (-10.0, 52.0));
        assert_eq!(t.to_content((sx, sy)), (10.0, 20.0));
    }
}
