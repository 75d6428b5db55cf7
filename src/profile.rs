//! Weighted along-tract profile of a scalar volume.

use anyhow::{Context, Result, bail};
use nalgebra::{Matrix4, Vector4};
use ndarray::Array3;

use crate::geom::Bundle;
use crate::geom::resample::resample;

/// Sample a co-registered scalar volume along an oriented bundle.
///
/// Each streamline is resampled to `n_points` positions, mapped through the
/// scalar's affine into voxel coordinates and trilinearly interpolated; the
/// profile at position k is the weight-averaged sample across streamlines.
/// Weights are expected normalized per position (see
/// [`crate::geom::weights::gaussian_weights`]).
pub fn tract_profile(
    scalar: &Array3<f32>,
    affine: &Matrix4<f64>,
    bundle: &Bundle,
    weights: &[Vec<f64>],
    n_points: usize,
) -> Result<Vec<f64>> {
    if bundle.is_empty() {
        bail!("cannot profile an empty bundle");
    }
    let (nx, ny, nz) = scalar.dim();
    if nx == 0 || ny == 0 || nz == 0 {
        bail!("scalar volume has a zero-extent dimension {:?}", scalar.dim());
    }
    if weights.len() != bundle.len() {
        bail!(
            "weight rows ({}) do not match streamline count ({})",
            weights.len(),
            bundle.len()
        );
    }
    let inv = affine
        .try_inverse()
        .context("scalar affine is not invertible")?;

    let mut profile = vec![0.0f64; n_points];
    for (sl, row) in bundle.streamlines.iter().zip(weights.iter()) {
        if row.len() != n_points {
            bail!(
                "weight row length ({}) does not match point count ({})",
                row.len(),
                n_points
            );
        }
        let rs = resample(sl, n_points);
        for (k, p) in rs.iter().enumerate() {
            let v = inv * Vector4::new(p[0] as f64, p[1] as f64, p[2] as f64, 1.0);
            profile[k] += row[k] * trilinear(scalar, v[0], v[1], v[2]);
        }
    }
    Ok(profile)
}

/// Trilinear interpolation at continuous voxel-center coordinates,
/// clamped to the volume bounds.
fn trilinear(vol: &Array3<f32>, x: f64, y: f64, z: f64) -> f64 {
    let (nx, ny, nz) = vol.dim();
    let x = x.clamp(0.0, (nx - 1) as f64);
    let y = y.clamp(0.0, (ny - 1) as f64);
    let z = z.clamp(0.0, (nz - 1) as f64);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let z0 = z.floor() as usize;
    let x1 = (x0 + 1).min(nx - 1);
    let y1 = (y0 + 1).min(ny - 1);
    let z1 = (z0 + 1).min(nz - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;
    let fz = z - z0 as f64;

    let c000 = vol[[x0, y0, z0]] as f64;
    let c100 = vol[[x1, y0, z0]] as f64;
    let c010 = vol[[x0, y1, z0]] as f64;
    let c110 = vol[[x1, y1, z0]] as f64;
    let c001 = vol[[x0, y0, z1]] as f64;
    let c101 = vol[[x1, y0, z1]] as f64;
    let c011 = vol[[x0, y1, z1]] as f64;
    let c111 = vol[[x1, y1, z1]] as f64;

    let c00 = c000 * (1.0 - fx) + c100 * fx;
    let c10 = c010 * (1.0 - fx) + c110 * fx;
    let c01 = c001 * (1.0 - fx) + c101 * fx;
    let c11 = c011 * (1.0 - fx) + c111 * fx;
    let c0 = c00 * (1.0 - fy) + c10 * fy;
    let c1 = c01 * (1.0 - fy) + c11 * fy;
    c0 * (1.0 - fz) + c1 * fz
}
