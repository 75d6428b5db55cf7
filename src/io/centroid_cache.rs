//! On-disk centroid cache.
//!
//! One small binary file per (atlas, tract label), computed once and read
//! thereafter. A CRC-64 trailer plus write-to-temp-then-rename keeps a torn
//! or concurrent write from being mistaken for a valid centroid.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use crc::{CRC_64_ECMA_182, Crc};

use crate::geom::Streamline;

const MAGIC: &[u8; 4] = b"TPCN";
const VERSION: u16 = 1;
const FIXED_BYTES: usize = 12; // magic + version + reserved + n_points

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_ECMA_182);

pub fn centroid_path(centroids_dir: &Path, tract: &str) -> PathBuf {
    centroids_dir.join(format!("{tract}_centroid.bin"))
}

pub fn read_centroid(path: &Path) -> Result<Streamline> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read centroid cache {}", path.display()))?;
    parse(&bytes).with_context(|| format!("corrupt centroid cache {}", path.display()))
}

fn parse(bytes: &[u8]) -> Result<Streamline> {
    if bytes.len() < FIXED_BYTES + 8 {
        bail!("file too small ({} bytes)", bytes.len());
    }
    if &bytes[0..4] != MAGIC {
        bail!("bad magic");
    }
    let version = u16::from_le_bytes(bytes[4..6].try_into().unwrap());
    if version != VERSION {
        bail!("unsupported version {}", version);
    }
    let n_points = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
    let payload_end = FIXED_BYTES + n_points * 12;
    if bytes.len() != payload_end + 8 {
        bail!(
            "length mismatch: expected {} bytes for {} points, got {}",
            payload_end + 8,
            n_points,
            bytes.len()
        );
    }
    let stored_crc = u64::from_le_bytes(bytes[payload_end..payload_end + 8].try_into().unwrap());
    let computed = CRC64.checksum(&bytes[..payload_end]);
    if stored_crc != computed {
        bail!("checksum mismatch");
    }

    let mut centroid = Vec::with_capacity(n_points);
    for i in 0..n_points {
        let s = FIXED_BYTES + i * 12;
        centroid.push([
            f32::from_le_bytes(bytes[s..s + 4].try_into().unwrap()),
            f32::from_le_bytes(bytes[s + 4..s + 8].try_into().unwrap()),
            f32::from_le_bytes(bytes[s + 8..s + 12].try_into().unwrap()),
        ]);
    }
    Ok(centroid)
}

/// Persist a centroid atomically (temp file in the same directory, then
/// rename over the destination).
pub fn write_centroid(path: &Path, centroid: &[[f32; 3]]) -> Result<()> {
    let mut bytes = Vec::with_capacity(FIXED_BYTES + centroid.len() * 12 + 8);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&(centroid.len() as u32).to_le_bytes());
    for p in centroid {
        bytes.extend_from_slice(&p[0].to_le_bytes());
        bytes.extend_from_slice(&p[1].to_le_bytes());
        bytes.extend_from_slice(&p[2].to_le_bytes());
    }
    let crc_val = CRC64.checksum(&bytes);
    bytes.extend_from_slice(&crc_val.to_le_bytes());

    let tmp = path.with_extension("bin.tmp");
    fs::write(&tmp, &bytes)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move centroid cache into place at {}", path.display()))
}
