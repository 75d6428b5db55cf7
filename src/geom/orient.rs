//! Direction-consistent bundle orientation.
//!
//! Every streamline is compared against the same fixed centroid, so each
//! flip decision is independent; no global consistency pass is needed.
//! Orientation must run before any cross-streamline averaging (weights,
//! profiles) is meaningful.

use crate::geom::resample::resample;
use crate::geom::{Bundle, Streamline, mean_pointwise_distance};

/// Return a copy of the bundle with each streamline flipped to whichever
/// direction is pointwise closer to the centroid.
pub fn orient_by_centroid(bundle: &Bundle, centroid: &[[f32; 3]]) -> Bundle {
    let streamlines = bundle
        .streamlines
        .iter()
        .map(|sl| orient_streamline(sl, centroid))
        .collect();
    Bundle::new(streamlines)
}

fn orient_streamline(sl: &[[f32; 3]], centroid: &[[f32; 3]]) -> Streamline {
    let mut oriented = sl.to_vec();
    if !is_closer_than_reversed(sl, centroid) {
        oriented.reverse();
    }
    oriented
}

/// True when the streamline's current direction is at least as close to the
/// centroid as its reversal, under the mean pointwise Euclidean metric on
/// the resampled polylines.
pub fn is_closer_than_reversed(sl: &[[f32; 3]], centroid: &[[f32; 3]]) -> bool {
    let rs = resample(sl, centroid.len());
    let mut reversed = rs.clone();
    reversed.reverse();
    mean_pointwise_distance(&rs, centroid) <= mean_pointwise_distance(&reversed, centroid)
}
