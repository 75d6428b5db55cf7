//! Single-cluster centroid of an atlas model bundle.
//!
//! All model streamlines are resampled to a fixed point count and folded
//! into one running mean, flipping each streamline to whichever direction
//! is closer to the current mean. The result is the reference orientation
//! every subject bundle is compared against.

use anyhow::{Result, bail};

use crate::geom::resample::resample;
use crate::geom::{Bundle, Streamline, mean_pointwise_distance};

/// Centroids whose node order must be reversed after computation so left
/// and right hemisphere profiles proceed comparably. Manual override table
/// from visual inspection of the atlas profiles; not a derivable rule.
pub const FLIPPED_CENTROIDS: &[&str] = &["C_FPH_L"];

pub fn needs_flip(tract_label: &str) -> bool {
    FLIPPED_CENTROIDS.contains(&tract_label)
}

/// Compute the centroid streamline of a model bundle at `n_points`.
pub fn bundle_centroid(bundle: &Bundle, n_points: usize) -> Result<Streamline> {
    if bundle.is_empty() {
        bail!("cannot compute a centroid from an empty bundle");
    }
    if n_points == 0 {
        bail!("centroid point count must be positive");
    }

    let first = resample(&bundle.streamlines[0], n_points);
    let mut acc: Vec<[f64; 3]> = first.iter().map(|p| [p[0] as f64, p[1] as f64, p[2] as f64]).collect();
    let mut count = 1usize;

    for sl in &bundle.streamlines[1..] {
        let rs = resample(sl, n_points);
        let mean = current_mean(&acc, count);
        let mut reversed = rs.clone();
        reversed.reverse();
        let aligned = if mean_pointwise_distance(&reversed, &mean)
            < mean_pointwise_distance(&rs, &mean)
        {
            reversed
        } else {
            rs
        };
        for (a, p) in acc.iter_mut().zip(aligned.iter()) {
            a[0] += p[0] as f64;
            a[1] += p[1] as f64;
            a[2] += p[2] as f64;
        }
        count += 1;
    }

    Ok(current_mean(&acc, count))
}

fn current_mean(acc: &[[f64; 3]], count: usize) -> Streamline {
    let n = count as f64;
    acc.iter()
        .map(|a| [(a[0] / n) as f32, (a[1] / n) as f32, (a[2] / n) as f32])
        .collect()
}
