//! Arc-length resampling.
//!
//! Resampling to a fixed point count makes streamlines of heterogeneous
//! length pointwise comparable. Position k of every resampled streamline
//! sits at the same fractional arc length.

use crate::geom::Streamline;

/// Resample a polyline to `n_points` equidistant positions along its arc.
///
/// A single-point or zero-length streamline resamples to `n_points` copies
/// of its first point.
pub fn resample(sl: &[[f32; 3]], n_points: usize) -> Streamline {
    if sl.is_empty() || n_points == 0 {
        return Vec::new();
    }
    if sl.len() == 1 || n_points == 1 {
        return vec![sl[0]; n_points];
    }

    // Cumulative arc length at each vertex.
    let mut cum = Vec::with_capacity(sl.len());
    cum.push(0.0f64);
    for w in sl.windows(2) {
        let seg = crate::geom::point_distance(&w[0], &w[1]);
        cum.push(cum.last().copied().unwrap_or(0.0) + seg);
    }
    let total = *cum.last().unwrap_or(&0.0);
    if total <= 0.0 {
        return vec![sl[0]; n_points];
    }

    let mut out = Vec::with_capacity(n_points);
    let mut seg = 0usize;
    for k in 0..n_points {
        let target = total * k as f64 / (n_points - 1) as f64;
        while seg + 2 < sl.len() && cum[seg + 1] < target {
            seg += 1;
        }
        let seg_len = cum[seg + 1] - cum[seg];
        let t = if seg_len > 0.0 {
            ((target - cum[seg]) / seg_len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let a = sl[seg];
        let b = sl[seg + 1];
        out.push([
            a[0] + (b[0] - a[0]) * t as f32,
            a[1] + (b[1] - a[1]) * t as f32,
            a[2] + (b[2] - a[2]) * t as f32,
        ]);
    }
    out
}
