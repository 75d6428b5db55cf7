//! Gaussian position weights against the centroid.
//!
//! At each along-tract position, a streamline's weight falls off with its
//! distance from the centroid under a Gaussian kernel whose bandwidth is
//! the distance spread of the bundle at that position. Weights are
//! normalized to sum to 1 across streamlines per position, so the profile
//! step can use them directly as a weighted average; the per-streamline
//! mean weight is the outlier/confidence score written to disk.

use anyhow::{Result, bail};

use crate::geom::resample::resample;
use crate::geom::{Bundle, point_distance};

const MIN_SIGMA: f64 = 1e-6;

/// Per-streamline, per-position normalized weights (`n_streamlines` rows of
/// `centroid.len()` values each).
pub fn gaussian_weights(bundle: &Bundle, centroid: &[[f32; 3]]) -> Result<Vec<Vec<f64>>> {
    if bundle.is_empty() {
        bail!("cannot compute weights for an empty bundle");
    }
    let n_points = centroid.len();
    let n = bundle.len();

    let resampled: Vec<_> = bundle
        .streamlines
        .iter()
        .map(|sl| resample(sl, n_points))
        .collect();

    let mut weights = vec![vec![0.0f64; n_points]; n];
    let mut dists = vec![0.0f64; n];
    for k in 0..n_points {
        for (i, rs) in resampled.iter().enumerate() {
            dists[i] = point_distance(&rs[k], &centroid[k]);
        }
        let mean = dists.iter().sum::<f64>() / n as f64;
        let var = dists.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n as f64;
        let sigma = var.sqrt();

        let mut sum = 0.0;
        for (i, d) in dists.iter().enumerate() {
            let w = if sigma < MIN_SIGMA {
                1.0
            } else {
                (-d * d / (2.0 * sigma * sigma)).exp()
            };
            weights[i][k] = w;
            sum += w;
        }
        // A position where every kernel underflows degrades to uniform.
        if sum <= 0.0 {
            for row in weights.iter_mut() {
                row[k] = 1.0 / n as f64;
            }
        } else {
            for row in weights.iter_mut() {
                row[k] /= sum;
            }
        }
    }
    Ok(weights)
}

/// Reduce the weight matrix to one mean weight per streamline.
pub fn mean_streamline_weights(weights: &[Vec<f64>]) -> Vec<f64> {
    weights
        .iter()
        .map(|row| {
            if row.is_empty() {
                0.0
            } else {
                row.iter().sum::<f64>() / row.len() as f64
            }
        })
        .collect()
}
