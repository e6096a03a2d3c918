#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point ---

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

#[test]
fn point_serde_shape() {
    let json = serde_json::to_value(Point::new(1.5, -2.0)).unwrap();
    assert_eq!(json, serde_json::json!({ "x": 1.5, "y": -2.0 }));
}

// --- Camera defaults ---

#[test]
fn camera_default_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 0.0);
    assert_eq!(cam.pan_y, 0.0);
    assert_eq!(cam.zoom, 1.0);
}

// --- conversions ---

#[test]
fn screen_to_world_identity() {
    let cam = Camera::default();
    let world = cam.screen_to_world(Point::new(50.0, 75.0));
    assert!(point_approx_eq(world, Point::new(50.0, 75.0)));
}

#[test]
fn screen_to_world_with_zoom_and_pan() {
    let cam = Camera { pan_x: 100.0, pan_y: -40.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(140.0, 0.0));
    assert!(point_approx_eq(world, Point::new(20.0, 20.0)));
}

#[test]
fn world_to_screen_with_zoom_and_pan() {
    let cam = Camera { pan_x: 100.0, pan_y: -40.0, zoom: 2.0 };
    let screen = cam.world_to_screen(Point::new(20.0, 20.0));
    assert!(point_approx_eq(screen, Point::new(140.0, 0.0)));
}

#[test]
fn roundtrip_holds_across_zoom_range() {
    let pans = [(0.0, 0.0), (123.4, -56.7), (-900.0, 2500.5)];
    let points = [Point::new(0.0, 0.0), Point::new(17.25, 903.0), Point::new(-300.0, 42.42)];
    for step in 0..=15 {
        let zoom = 0.5 + f64::from(step) * 0.1;
        for &(pan_x, pan_y) in &pans {
            let cam = Camera { pan_x, pan_y, zoom };
            for &p in &points {
                let back = cam.world_to_screen(cam.screen_to_world(p));
                assert!(point_approx_eq(back, p), "zoom={zoom} pan=({pan_x},{pan_y}) p={p:?} back={back:?}");
            }
        }
    }
}

#[test]
fn screen_dist_scales_inverse_to_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    assert!(approx_eq(cam.screen_dist_to_world(6.0), 3.0));
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 0.5 };
    assert!(approx_eq(cam.screen_dist_to_world(6.0), 12.0));
}

// --- zoom controls ---

#[test]
fn three_zoom_ins_reach_one_point_three() {
    let mut cam = Camera::default();
    cam.zoom_in();
    cam.zoom_in();
    cam.zoom_in();
    assert!(approx_eq(cam.zoom, 1.3));
}

#[test]
fn zoom_in_caps_at_max() {
    let mut cam = Camera::default();
    for _ in 0..3 {
        cam.zoom_in();
    }
    for _ in 0..7 {
        cam.zoom_in();
    }
    assert_eq!(cam.zoom, ZOOM_MAX);
    cam.zoom_in();
    assert_eq!(cam.zoom, ZOOM_MAX);
}

#[test]
fn zoom_in_far_past_max_stays_at_max() {
    let mut cam = Camera::default();
    for _ in 0..25 {
        cam.zoom_in();
    }
    assert_eq!(cam.zoom, ZOOM_MAX);
}

#[test]
fn zoom_out_floors_at_min() {
    let mut cam = Camera::default();
    for _ in 0..20 {
        cam.zoom_out();
    }
    assert_eq!(cam.zoom, ZOOM_MIN);
}

#[test]
fn zoom_does_not_touch_pan() {
    let mut cam = Camera { pan_x: 12.0, pan_y: 34.0, zoom: 1.0 };
    cam.zoom_in();
    cam.zoom_out();
    cam.zoom_out();
    assert_eq!(cam.pan_x, 12.0);
    assert_eq!(cam.pan_y, 34.0);
}

#[test]
fn reset_zoom_keeps_pan() {
    let mut cam = Camera { pan_x: -5.0, pan_y: 9.0, zoom: 1.8 };
    cam.reset_zoom();
    assert_eq!(cam.zoom, 1.0);
    assert_eq!(cam.pan_x, -5.0);
    assert_eq!(cam.pan_y, 9.0);
}

#[test]
fn pan_by_is_additive_and_unscaled() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    cam.pan_by(10.0, -4.0);
    cam.pan_by(5.0, 4.0);
    assert_eq!(cam.pan_x, 15.0);
    assert_eq!(cam.pan_y, 0.0);
}
