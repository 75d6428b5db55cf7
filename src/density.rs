//! Streamline density rasterization.

use std::collections::HashSet;

use anyhow::{Context, Result};
use ndarray::Array3;

use crate::geom::Bundle;
use crate::io::volume::RefGrid;

/// Rasterize a bundle onto the reference voxel grid.
///
/// Each voxel counts how many streamlines traverse it: a streamline
/// contributes at most 1 to any voxel, regardless of how many of its points
/// fall inside. Points are mapped through the inverse affine and flipped to
/// the corner convention (index = floor(vox + 0.5)) so that a point at a
/// voxel's center lands in that voxel. Points outside the grid are ignored.
pub fn density_map(bundle: &Bundle, grid: &RefGrid) -> Result<Array3<f32>> {
    let (nx, ny, nz) = grid.dims;
    let inv = grid
        .affine
        .try_inverse()
        .context("reference affine is not invertible")?;

    let mut counts = Array3::<f32>::zeros((nx, ny, nz));
    let mut visited: HashSet<(usize, usize, usize)> = HashSet::new();
    for sl in &bundle.streamlines {
        visited.clear();
        for p in sl {
            let v = inv * nalgebra::Vector4::new(p[0] as f64, p[1] as f64, p[2] as f64, 1.0);
            let i = (v[0] + 0.5).floor();
            let j = (v[1] + 0.5).floor();
            let k = (v[2] + 0.5).floor();
            if i < 0.0 || j < 0.0 || k < 0.0 {
                continue;
            }
            let (i, j, k) = (i as usize, j as usize, k as usize);
            if i >= nx || j >= ny || k >= nz {
                continue;
            }
            visited.insert((i, j, k));
        }
        for &(i, j, k) in &visited {
            counts[[i, j, k]] += 1.0;
        }
    }
    Ok(counts)
}
