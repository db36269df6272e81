use projector_core::traits::TransformSink;
use projector_core::transform::{TransformLimits, TransformSync, ViewTransform};

#[derive(Default)]
struct Recorder {
    pushes: Vec<ViewTransform>,
}

impl TransformSink for Recorder {
    fn set_transform(&mut self, transform: &ViewTransform) {
        self.pushes.push(*transform);
    }
}

fn sync() -> TransformSync<Recorder> {
    TransformSync::new(TransformLimits::default(), Recorder::default())
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
}

#[test]
fn five_zoom_ins_then_six_zoom_outs() {
    let mut sync = sync();
    for _ in 0..5 {
        assert!(sync.zoom_in());
    }
    assert_eq!(sync.transform().scale, 1.5);

    sync.pan(40.0, -25.0);
    for _ in 0..6 {
        sync.zoom_out();
    }
    let t = sync.transform();
    assert_close(t.scale, 0.9);
    assert_eq!((t.offset_x, t.offset_y), (0.0, 0.0));

    for _ in 0..20 {
        sync.zoom_out();
    }
    let t = sync.transform();
    assert_eq!(t.scale, 0.2);
    assert_eq!((t.offset_x, t.offset_y), (0.0, 0.0));
}

#[test]
fn scale_stays_within_bounds_for_any_sequence() {
    let mut sync = sync();
    // Deterministic pseudo-random walk
    let mut seed: u32 = 0x2545_f491;
    for _ in 0..2000 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        if seed % 3 == 0 {
            sync.zoom_out();
        } else {
            sync.zoom_in();
        }
        let t = sync.transform();
        assert!(t.scale >= 0.2 && t.scale <= 5.0, "scale out of bounds: {}", t.scale);
        if t.scale <= 1.0 {
            assert_eq!((t.offset_x, t.offset_y), (0.0, 0.0));
        }
    }
}

#[test]
fn zoom_in_at_max_does_not_push() {
    let mut sync = sync();
    while sync.zoom_in() {}
    assert_eq!(sync.transform().scale, 5.0);
    let pushes = sync.sink().pushes.len();
    assert!(!sync.zoom_in());
    assert_eq!(sync.sink().pushes.len(), pushes);
}

#[test]
fn pan_is_ignored_until_zoomed_in() {
    let mut sync = sync();
    assert!(!sync.pan(10.0, 10.0));
    assert_eq!(sync.transform(), ViewTransform::IDENTITY);

    sync.zoom_in();
    assert!(sync.pan(10.0, -4.0));
    let t = sync.transform();
    assert_eq!((t.offset_x, t.offset_y), (10.0, -4.0));
}

#[test]
fn zoom_at_point_keeps_cursor_anchored() {
    let mut sync = sync();
    for _ in 0..5 {
        sync.zoom_in();
    }
    sync.pan(-30.0, 12.0);

    let cursor = (320.0, 180.0);
    let before = sync.transform();
    let content = before.to_content(cursor);

    assert!(sync.zoom_at_point(120.0, cursor, (640.0, 360.0)));
    let after = sync.transform();
    assert_close(after.scale, 1.6);

    let (sx, sy) = after.to_screen(content);
    assert_close(sx, cursor.0);
    assert_close(sy, cursor.1);

    assert!(sync.zoom_at_point(-120.0, cursor, (640.0, 360.0)));
    let (sx, sy) = sync.transform().to_screen(content);
    assert_close(sync.transform().scale, 1.5);
    assert_close(sx, cursor.0);
    assert_close(sy, cursor.1);
}

#[test]
fn zoom_at_point_matches_offset_formula() {
    let mut sync = sync();
    sync.zoom_in();
    sync.zoom_in();
    sync.pan(5.0, 5.0);
    let old = sync.transform();

    sync.zoom_at_point(1.0, (100.0, 50.0), (200.0, 100.0));
    let new = sync.transform();
    let r = new.scale / old.scale;
    assert_close(new.offset_x, (1.0 - r) * 100.0 + r * old.offset_x);
    assert_close(new.offset_y, (1.0 - r) * 50.0 + r * old.offset_y);
}

#[test]
fn zoom_at_point_anchors_cursor_outside_control() {
    for control_size in [(200.0, 100.0), (0.0, 0.0)] {
        let mut sync = sync();
        for _ in 0..5 {
            sync.zoom_in();
        }
        let cursor = (300.0, 200.0);
        let content = sync.transform().to_content(cursor);

        assert!(sync.zoom_at_point(1.0, cursor, control_size));
        let (x, y) = sync.transform().to_screen(content);
        assert_close(x, cursor.0);
        assert_close(y, cursor.1);
    }
}

#[test]
fn zoom_at_point_ignores_non_finite_cursor() {
    let mut sync = sync();
    assert!(!sync.zoom_at_point(1.0, (f64::NAN, 10.0), (100.0, 100.0)));
    assert!(sync.sink().pushes.is_empty());
}

#[test]
fn wheel_zoom_out_below_one_recenters() {
    let mut sync = sync();
    sync.zoom_at_point(1.0, (10.0, 10.0), (100.0, 100.0));
    assert!(sync.transform().offset_x != 0.0);

    sync.zoom_at_point(-1.0, (90.0, 90.0), (100.0, 100.0));
    let t = sync.transform();
    assert_eq!(t.scale, 1.0);
    assert_eq!((t.offset_x, t.offset_y), (0.0, 0.0));
}

#[test]
fn every_change_pushes_exactly_once() {
    let mut sync = sync();
    sync.zoom_in();
    sync.pan(3.0, 4.0);
    sync.zoom_at_point(1.0, (50.0, 50.0), (100.0, 100.0));
    sync.reset();

    let pushes = &sync.sink().pushes;
    assert_eq!(pushes.len(), 4);
    assert_eq!(*pushes.last().unwrap(), ViewTransform::IDENTITY);
    assert_eq!(pushes[0].scale, 1.1);
}

#[test]
fn drag_gesture_pans_by_pointer_delta() {
    let mut sync = sync();
    sync.zoom_in();
    sync.zoom_in();

    sync.on_pan_start((100.0, 100.0));
    assert!(sync.is_panning());
    assert!(sync.on_pan_move((110.0, 95.0)));
    assert!(sync.on_pan_move((130.0, 95.0)));
    assert!(!sync.on_pan_end((130.0, 95.0)));
    assert!(!sync.is_panning());

    let t = sync.transform();
    assert_eq!((t.offset_x, t.offset_y), (30.0, -5.0));

    // Moves without a drag in progress are ignored
    assert!(!sync.on_pan_move((500.0, 500.0)));
}

#[test]
fn reset_event_returns_to_identity() {
    let mut sync = sync();
    sync.on_zoom(1.0, (10.0, 20.0), (100.0, 100.0));
    sync.on_pan_start((0.0, 0.0));
    assert!(sync.on_reset());
    assert_eq!(sync.transform(), ViewTransform::IDENTITY);
    assert!(!sync.is_panning());
}
