use image::{Rgba, RgbaImage};

use crate::foundation::error::{MemeError, MemeResult};
use crate::transform::sample::{bicubic, to_straight};

/// Projective map `(x, y) -> ((a x + b y + c) / (g x + h y + 1), (d x + e y + f) / (g x + h y + 1))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography(pub [f64; 8]);

impl Homography {
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f, g, h] = self.0;
        let den = g * x + h * y + 1.0;
        ((a * x + b * y + c) / den, (d * x + e * y + f) / den)
    }

    /// Least-squares fit mapping each `from[i]` onto `to[i]`.
    pub fn solve(from: &[[f64; 2]; 4], to: &[[f64; 2]; 4]) -> MemeResult<Self> {
        let mut rows = Vec::with_capacity(8);
        let mut rhs = Vec::with_capacity(8);
        for (p, q) in from.iter().zip(to) {
            rows.push([p[0], p[1], 1.0, 0.0, 0.0, 0.0, -q[0] * p[0], -q[0] * p[1]]);
            rhs.push(q[0]);
            rows.push([0.0, 0.0, 0.0, p[0], p[1], 1.0, -q[1] * p[0], -q[1] * p[1]]);
            rhs.push(q[1]);
        }

        // Normal equations: (A^T A) x = A^T b.
        let mut m = [[0.0f64; 9]; 8];
        for i in 0..8 {
            for j in 0..8 {
                m[i][j] = rows.iter().map(|r| r[i] * r[j]).sum();
            }
            m[i][8] = rows.iter().zip(&rhs).map(|(r, b)| r[i] * b).sum();
        }
        solve_augmented(m)
            .map(Self)
            .ok_or_else(|| MemeError::validation("perspective quad is degenerate"))
    }
}

fn solve_augmented(mut m: [[f64; 9]; 8]) -> Option<[f64; 8]> {
    for col in 0..8 {
        let pivot = (col..8).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot);
        for row in 0..8 {
            if row == col {
                continue;
            }
            let k = m[row][col] / m[col][col];
            if k == 0.0 {
                continue;
            }
            for c in col..9 {
                m[row][c] -= k * m[col][c];
            }
        }
    }
    let mut out = [0.0; 8];
    for (i, v) in out.iter_mut().enumerate() {
        *v = m[i][8] / m[i][i];
    }
    Some(out)
}

/// Warp `img` so its corners land on `quad` (top-left, top-right, bottom-right, bottom-left).
///
/// The output canvas is the quad's bounding box; the quad is taken relative to the box's
/// top-left. Returns the raster and that top-left offset.
pub fn warp_to_quad(img: &RgbaImage, quad: &[[f64; 2]; 4]) -> MemeResult<(RgbaImage, (i32, i32))> {
    let min_x = quad.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
    let min_y = quad.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
    let max_x = quad.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
    let max_y = quad.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max);
    let out_w = (max_x - min_x) as u32;
    let out_h = (max_y - min_y) as u32;
    if out_w == 0 || out_h == 0 {
        return Err(MemeError::validation("perspective quad has an empty bounding box"));
    }

    let local = quad.map(|p| [p[0] - min_x, p[1] - min_y]);
    let (w, h) = (f64::from(img.width()), f64::from(img.height()));
    let corners = [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]];
    // Inverse mapping: output pixel -> source pixel.
    let hmg = Homography::solve(&local, &corners)?;

    let out = RgbaImage::from_fn(out_w, out_h, |x, y| {
        let (sx, sy) = hmg.apply(f64::from(x) + 0.5, f64::from(y) + 0.5);
        Rgba(to_straight(bicubic(img, sx, sy)))
    });
    Ok((out, (min_x as i32, min_y as i32)))
}

#[cfg(test)]
#[path = "../../tests/unit/transform/perspective.rs"]
mod tests;
