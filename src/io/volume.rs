//! NIfTI volume I/O.
//!
//! Volumes are read and written through the `nifti` crate; the affine is
//! taken from the sform rows when set, with a voxel-scaling fallback.

use std::path::Path;

use anyhow::{Context, Result, bail};
use nalgebra::Matrix4;
use ndarray::{Array3, Ix3};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

/// The subject's anatomical voxel grid: the space every density map is
/// rasterized on and every segment tractogram is written against.
#[derive(Debug, Clone)]
pub struct RefGrid {
    pub dims: (usize, usize, usize),
    pub voxel_size: (f32, f32, f32),
    pub affine: Matrix4<f64>,
    pub header: NiftiHeader,
}

impl RefGrid {
    pub fn from_header(header: NiftiHeader) -> Result<Self> {
        if header.dim[0] < 3 {
            bail!("reference image must be at least 3D, got {}D", header.dim[0]);
        }
        let dims = (
            header.dim[1] as usize,
            header.dim[2] as usize,
            header.dim[3] as usize,
        );
        let voxel_size = (header.pixdim[1], header.pixdim[2], header.pixdim[3]);
        let affine = header_affine(&header);
        Ok(Self {
            dims,
            voxel_size,
            affine,
            header,
        })
    }

    /// Build a grid from raw parts, synthesizing a matching NIfTI header.
    /// Used where no reference image exists on disk (tests, tooling).
    pub fn from_parts(
        dims: (usize, usize, usize),
        voxel_size: (f32, f32, f32),
        affine: Matrix4<f64>,
    ) -> Self {
        let mut header = NiftiHeader::default();
        header.dim = [3, dims.0 as u16, dims.1 as u16, dims.2 as u16, 1, 1, 1, 1];
        header.pixdim = [1.0, voxel_size.0, voxel_size.1, voxel_size.2, 1.0, 1.0, 1.0, 1.0];
        header.sform_code = 1;
        for c in 0..4 {
            header.srow_x[c] = affine[(0, c)] as f32;
            header.srow_y[c] = affine[(1, c)] as f32;
            header.srow_z[c] = affine[(2, c)] as f32;
        }
        Self {
            dims,
            voxel_size,
            affine,
            header,
        }
    }
}

/// Read only the grid definition of a reference image.
pub fn read_ref_grid(path: &Path) -> Result<RefGrid> {
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("failed to read reference image {}", path.display()))?;
    RefGrid::from_header(obj.header().clone())
}

/// Read a 3D scalar map and its affine.
pub fn read_scalar_volume(path: &Path) -> Result<(Array3<f32>, Matrix4<f64>)> {
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("failed to read scalar map {}", path.display()))?;
    let affine = header_affine(obj.header());
    let data = obj
        .into_volume()
        .into_ndarray::<f32>()
        .with_context(|| format!("failed to convert {} to an array", path.display()))?;
    let data = data
        .into_dimensionality::<Ix3>()
        .map_err(|_| anyhow::anyhow!("scalar map {} is not 3D", path.display()))?;
    let (nx, ny, nz) = data.dim();
    if nx == 0 || ny == 0 || nz == 0 {
        bail!(
            "scalar map {} has a zero-extent dimension {:?}",
            path.display(),
            data.dim()
        );
    }
    Ok((data, affine))
}

/// Write a volume against the reference header; gzip is inferred from the
/// `.nii.gz` extension by the writer.
pub fn write_volume(path: &Path, data: &Array3<f32>, header: &NiftiHeader) -> Result<()> {
    WriterOptions::new(path)
        .reference_header(header)
        .write_nifti(data)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// sform affine when present, voxel scaling otherwise.
pub fn header_affine(header: &NiftiHeader) -> Matrix4<f64> {
    if header.sform_code > 0 {
        let x = &header.srow_x;
        let y = &header.srow_y;
        let z = &header.srow_z;
        Matrix4::new(
            x[0] as f64, x[1] as f64, x[2] as f64, x[3] as f64,
            y[0] as f64, y[1] as f64, y[2] as f64, y[3] as f64,
            z[0] as f64, z[1] as f64, z[2] as f64, z[3] as f64,
            0.0, 0.0, 0.0, 1.0,
        )
    } else {
        Matrix4::new(
            header.pixdim[1] as f64, 0.0, 0.0, 0.0,
            0.0, header.pixdim[2] as f64, 0.0, 0.0,
            0.0, 0.0, header.pixdim[3] as f64, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}
