use super::*;

fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 20) as u8, (y * 20) as u8, 77, 255]))
}

#[test]
fn own_corners_is_identity() {
    let img = gradient(12, 9);
    let quad = [[0.0, 0.0], [12.0, 0.0], [12.0, 9.0], [0.0, 9.0]];
    let (out, offset) = warp_to_quad(&img, &quad).unwrap();

    assert_eq!(offset, (0, 0));
    assert_eq!(out.dimensions(), img.dimensions());
    for (a, b) in out.pixels().zip(img.pixels()) {
        for c in 0..4 {
            assert!((i32::from(a.0[c]) - i32::from(b.0[c])).abs() <= 1, "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn solve_recovers_scale() {
    let from = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
    let to = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]];
    let hmg = Homography::solve(&from, &to).unwrap();
    let (x, y) = hmg.apply(1.0, 0.5);
    assert!((x - 2.0).abs() < 1e-6 && (y - 1.0).abs() < 1e-6);
}

#[test]
fn output_spans_quad_bbox() {
    let img = RgbaImage::from_pixel(10, 10, Rgba([0, 200, 0, 255]));
    // Diamond: top, right, bottom, left.
    let quad = [[0.0, 0.0], [10.0, 20.0], [0.0, 40.0], [-10.0, 20.0]];
    let (out, offset) = warp_to_quad(&img, &quad).unwrap();
    assert_eq!(out.dimensions(), (20, 40));
    assert_eq!(offset, (-10, 0));
    assert_eq!(out.get_pixel(0, 0).0[3], 0);
    assert!(out.get_pixel(10, 20).0[3] >= 250);
}

#[test]
fn degenerate_quad_is_rejected() {
    let img = gradient(4, 4);
    let flat = [[0.0, 0.0], [10.0, 0.0], [20.0, 0.0], [30.0, 0.0]];
    assert!(warp_to_quad(&img, &flat).is_err());
}
