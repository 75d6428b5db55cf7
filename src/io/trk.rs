//! TrackVis `.trk` codec.
//!
//! Fixed 1000-byte little-endian header (version 2, with the `vox_to_ras`
//! affine) followed by one record per streamline: an i32 point count, then
//! float32 triples. TrackVis stores coordinates corner-based in voxel-mm;
//! the loader converts to world RAS-mm through the header affine and the
//! writer applies the inverse.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use nalgebra::{Matrix4, Vector4};

use crate::geom::{Bundle, Streamline};
use crate::io::volume::RefGrid;

pub const HEADER_SIZE: usize = 1000;

const OFF_DIM: usize = 6;
const OFF_VOXEL_SIZE: usize = 12;
const OFF_N_SCALARS: usize = 36;
const OFF_N_PROPERTIES: usize = 238;
const OFF_VOX_TO_RAS: usize = 440;
const OFF_VOXEL_ORDER: usize = 948;
const OFF_N_COUNT: usize = 988;
const OFF_VERSION: usize = 992;
const OFF_HDR_SIZE: usize = 996;

#[derive(Debug, Clone)]
pub struct TrkHeader {
    pub dim: [i16; 3],
    pub voxel_size: [f32; 3],
    pub n_scalars: i16,
    pub n_properties: i16,
    pub vox_to_ras: Matrix4<f64>,
    pub n_count: i32,
}

/// Read a tractogram into world (RAS-mm) coordinates.
pub fn read_trk(path: &Path) -> Result<(Bundle, TrkHeader)> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let header = parse_header(&bytes)
        .with_context(|| format!("malformed TRK header in {}", path.display()))?;

    let to_ras = &header.vox_to_ras;
    let vs = header.voxel_size;
    let n_scalars = header.n_scalars as usize;
    let n_properties = header.n_properties as usize;

    let mut streamlines = Vec::new();
    let mut pos = HEADER_SIZE;
    while pos + 4 <= bytes.len() {
        let n_points = i32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap());
        pos += 4;
        if n_points < 0 {
            bail!("negative point count in {}", path.display());
        }
        let n_points = n_points as usize;
        let record_bytes = n_points * (3 + n_scalars) * 4 + n_properties * 4;
        if pos + record_bytes > bytes.len() {
            bail!("truncated streamline record in {}", path.display());
        }
        let mut sl: Streamline = Vec::with_capacity(n_points);
        for _ in 0..n_points {
            let x = f32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap());
            let y = f32::from_le_bytes(bytes[pos + 4..pos + 8].try_into().unwrap());
            let z = f32::from_le_bytes(bytes[pos + 8..pos + 12].try_into().unwrap());
            pos += (3 + n_scalars) * 4;
            // voxmm -> corner-based voxel -> center-based voxel -> world
            let v = Vector4::new(
                (x / vs[0]) as f64 - 0.5,
                (y / vs[1]) as f64 - 0.5,
                (z / vs[2]) as f64 - 0.5,
                1.0,
            );
            let w = to_ras * v;
            sl.push([w[0] as f32, w[1] as f32, w[2] as f32]);
        }
        pos += n_properties * 4;
        streamlines.push(sl);
    }

    if header.n_count > 0 && streamlines.len() != header.n_count as usize {
        bail!(
            "streamline count mismatch in {}: header says {}, body holds {}",
            path.display(),
            header.n_count,
            streamlines.len()
        );
    }

    Ok((Bundle::new(streamlines), header))
}

/// Streamline count from the header alone; the body is never read.
pub fn read_streamline_count(path: &Path) -> Result<usize> {
    let mut file =
        fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut bytes = [0u8; HEADER_SIZE];
    file.read_exact(&mut bytes)
        .with_context(|| format!("failed to read TRK header from {}", path.display()))?;
    let header = parse_header(&bytes)
        .with_context(|| format!("malformed TRK header in {}", path.display()))?;
    Ok(header.n_count.max(0) as usize)
}

/// Write a bundle against the reference grid.
pub fn write_trk(path: &Path, bundle: &Bundle, grid: &RefGrid) -> Result<()> {
    let inv = grid
        .affine
        .try_inverse()
        .context("reference affine is not invertible")?;
    let vs = [grid.voxel_size.0, grid.voxel_size.1, grid.voxel_size.2];

    let n_floats: usize = bundle.streamlines.iter().map(|sl| sl.len() * 3).sum();
    let mut bytes = Vec::with_capacity(HEADER_SIZE + bundle.len() * 4 + n_floats * 4);
    bytes.extend_from_slice(&build_header(bundle.len(), grid));

    for sl in &bundle.streamlines {
        bytes.extend_from_slice(&(sl.len() as i32).to_le_bytes());
        for p in sl {
            let v = inv * Vector4::new(p[0] as f64, p[1] as f64, p[2] as f64, 1.0);
            let x = ((v[0] + 0.5) as f32) * vs[0];
            let y = ((v[1] + 0.5) as f32) * vs[1];
            let z = ((v[2] + 0.5) as f32) * vs[2];
            bytes.extend_from_slice(&x.to_le_bytes());
            bytes.extend_from_slice(&y.to_le_bytes());
            bytes.extend_from_slice(&z.to_le_bytes());
        }
    }

    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

fn parse_header(bytes: &[u8]) -> Result<TrkHeader> {
    if bytes.len() < HEADER_SIZE {
        bail!("file too small for a TRK header ({} bytes)", bytes.len());
    }
    if &bytes[0..5] != b"TRACK" {
        bail!("missing TRACK magic");
    }
    let hdr_size = i32::from_le_bytes(bytes[OFF_HDR_SIZE..OFF_HDR_SIZE + 4].try_into().unwrap());
    if hdr_size != HEADER_SIZE as i32 {
        bail!("unsupported hdr_size {} (byte-swapped file?)", hdr_size);
    }
    let version = i32::from_le_bytes(bytes[OFF_VERSION..OFF_VERSION + 4].try_into().unwrap());
    if version != 2 {
        bail!("unsupported TRK version {} (need 2 for vox_to_ras)", version);
    }

    let mut dim = [0i16; 3];
    for (i, d) in dim.iter_mut().enumerate() {
        let s = OFF_DIM + i * 2;
        *d = i16::from_le_bytes(bytes[s..s + 2].try_into().unwrap());
    }
    let mut voxel_size = [0f32; 3];
    for (i, v) in voxel_size.iter_mut().enumerate() {
        let s = OFF_VOXEL_SIZE + i * 4;
        *v = f32::from_le_bytes(bytes[s..s + 4].try_into().unwrap());
    }
    if voxel_size.iter().any(|v| *v <= 0.0) {
        bail!("non-positive voxel size {:?}", voxel_size);
    }
    let n_scalars =
        i16::from_le_bytes(bytes[OFF_N_SCALARS..OFF_N_SCALARS + 2].try_into().unwrap());
    let n_properties = i16::from_le_bytes(
        bytes[OFF_N_PROPERTIES..OFF_N_PROPERTIES + 2]
            .try_into()
            .unwrap(),
    );
    if n_scalars < 0 || n_properties < 0 {
        bail!("negative scalar/property counts");
    }

    let mut m = [[0f64; 4]; 4];
    for (r, row) in m.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            let s = OFF_VOX_TO_RAS + (r * 4 + c) * 4;
            *cell = f32::from_le_bytes(bytes[s..s + 4].try_into().unwrap()) as f64;
        }
    }
    if m[3][3] == 0.0 {
        bail!("vox_to_ras affine is unset");
    }
    let vox_to_ras = Matrix4::new(
        m[0][0], m[0][1], m[0][2], m[0][3],
        m[1][0], m[1][1], m[1][2], m[1][3],
        m[2][0], m[2][1], m[2][2], m[2][3],
        m[3][0], m[3][1], m[3][2], m[3][3],
    );

    let n_count = i32::from_le_bytes(bytes[OFF_N_COUNT..OFF_N_COUNT + 4].try_into().unwrap());

    Ok(TrkHeader {
        dim,
        voxel_size,
        n_scalars,
        n_properties,
        vox_to_ras,
        n_count,
    })
}

fn build_header(n_count: usize, grid: &RefGrid) -> [u8; HEADER_SIZE] {
    let mut h = [0u8; HEADER_SIZE];
    h[0..6].copy_from_slice(b"TRACK\0");

    let dim = [grid.dims.0 as i16, grid.dims.1 as i16, grid.dims.2 as i16];
    for (i, d) in dim.iter().enumerate() {
        let s = OFF_DIM + i * 2;
        h[s..s + 2].copy_from_slice(&d.to_le_bytes());
    }
    let vs = [grid.voxel_size.0, grid.voxel_size.1, grid.voxel_size.2];
    for (i, v) in vs.iter().enumerate() {
        let s = OFF_VOXEL_SIZE + i * 4;
        h[s..s + 4].copy_from_slice(&v.to_le_bytes());
    }
    for r in 0..4 {
        for c in 0..4 {
            let s = OFF_VOX_TO_RAS + (r * 4 + c) * 4;
            h[s..s + 4].copy_from_slice(&(grid.affine[(r, c)] as f32).to_le_bytes());
        }
    }
    h[OFF_VOXEL_ORDER..OFF_VOXEL_ORDER + 4].copy_from_slice(&axis_codes(&grid.affine));
    h[OFF_N_COUNT..OFF_N_COUNT + 4].copy_from_slice(&(n_count as i32).to_le_bytes());
    h[OFF_VERSION..OFF_VERSION + 4].copy_from_slice(&2i32.to_le_bytes());
    h[OFF_HDR_SIZE..OFF_HDR_SIZE + 4].copy_from_slice(&(HEADER_SIZE as i32).to_le_bytes());
    h
}

/// Anatomical axis codes of the affine's voxel axes (e.g. `RAS\0`).
fn axis_codes(affine: &Matrix4<f64>) -> [u8; 4] {
    let pos = [b'R', b'A', b'S'];
    let neg = [b'L', b'P', b'I'];
    let mut codes = [0u8; 4];
    for (j, code) in codes.iter_mut().take(3).enumerate() {
        let mut best = 0usize;
        for i in 1..3 {
            if affine[(i, j)].abs() > affine[(best, j)].abs() {
                best = i;
            }
        }
        *code = if affine[(best, j)] >= 0.0 {
            pos[best]
        } else {
            neg[best]
        };
    }
    codes
}
