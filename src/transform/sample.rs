use image::RgbaImage;

/// Premultiplied RGBA in `0..=255` float space.
pub(crate) type PremulF = [f32; 4];

fn texel(img: &RgbaImage, x: i64, y: i64) -> PremulF {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return [0.0; 4];
    }
    let p = img.get_pixel(x as u32, y as u32).0;
    let a = f32::from(p[3]) / 255.0;
    [
        f32::from(p[0]) * a,
        f32::from(p[1]) * a,
        f32::from(p[2]) * a,
        f32::from(p[3]),
    ]
}

/// Bilinear sample at continuous coordinates (pixel centers at `n + 0.5`).
/// Outside the image counts as transparent.
pub(crate) fn bilinear(img: &RgbaImage, x: f64, y: f64) -> PremulF {
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = (fx - x0) as f32;
    let ty = (fy - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let a = texel(img, x0, y0);
    let b = texel(img, x0 + 1, y0);
    let c = texel(img, x0, y0 + 1);
    let d = texel(img, x0 + 1, y0 + 1);
    let mut out = [0.0; 4];
    for i in 0..4 {
        let top = a[i] + (b[i] - a[i]) * tx;
        let bot = c[i] + (d[i] - c[i]) * tx;
        out[i] = top + (bot - top) * ty;
    }
    out
}

fn catmull_rom(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        0.5 * (-t3 + 2.0 * t2 - t),
        0.5 * (3.0 * t3 - 5.0 * t2 + 2.0),
        0.5 * (-3.0 * t3 + 4.0 * t2 + t),
        0.5 * (t3 - t2),
    ]
}

/// Bicubic (Catmull-Rom) sample at continuous coordinates.
pub(crate) fn bicubic(img: &RgbaImage, x: f64, y: f64) -> PremulF {
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let wx = catmull_rom((fx - x0) as f32);
    let wy = catmull_rom((fy - y0) as f32);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut out = [0.0f32; 4];
    for (j, wyj) in wy.iter().enumerate() {
        for (i, wxi) in wx.iter().enumerate() {
            let w = wxi * wyj;
            if w == 0.0 {
                continue;
            }
            let t = texel(img, x0 - 1 + i as i64, y0 - 1 + j as i64);
            for c in 0..4 {
                out[c] += t[c] * w;
            }
        }
    }
    out
}

/// Back to straight RGBA8, clamping filter overshoot.
pub(crate) fn to_straight(p: PremulF) -> [u8; 4] {
    let a = p[3].clamp(0.0, 255.0);
    if a < 0.5 {
        return [0, 0, 0, 0];
    }
    let k = 255.0 / a;
    let ch = |v: f32| (v * k).round().clamp(0.0, 255.0) as u8;
    [ch(p[0]), ch(p[1]), ch(p[2]), a.round() as u8]
}
