use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::ctx::{Ctx, Layout};
use crate::geom::Streamline;
use crate::geom::centroid::{bundle_centroid, needs_flip};
use crate::io::{centroid_cache, trk};
use crate::pipeline::{Stage, StageStatus};

pub struct Stage2Centroid;

impl Stage2Centroid {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Centroid {
    fn name(&self) -> &'static str {
        "stage2_centroid"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageStatus> {
        let (centroid, computed) = ensure_centroid(&ctx.cfg.layout, &ctx.tract, ctx.cfg.n_points)?;
        if centroid.len() != ctx.cfg.n_points {
            bail!(
                "cached centroid for {} has {} points, run expects {}",
                ctx.tract,
                centroid.len(),
                ctx.cfg.n_points
            );
        }
        info!(tract = %ctx.tract, computed, "centroid_ready");
        ctx.centroid = Some(centroid);
        Ok(StageStatus::Continue)
    }
}

/// Load the tract centroid from the cache, or compute it from the atlas
/// model bundle and persist it. Returns whether it had to be computed.
///
/// Computation is idempotent; later invocations for the same tract label
/// short-circuit to a cache read. A missing model bundle is a hard error:
/// unlike subject data, the atlas is an install-time prerequisite.
pub fn ensure_centroid(layout: &Layout, tract: &str, n_points: usize) -> Result<(Streamline, bool)> {
    let cache_path = centroid_cache::centroid_path(&layout.centroids_dir(), tract);
    if cache_path.exists() {
        return Ok((centroid_cache::read_centroid(&cache_path)?, false));
    }

    let model_path = model_trk_path(layout, tract);
    let (model, _header) = trk::read_trk(&model_path).with_context(|| {
        format!(
            "failed to load model bundle for {} (is the atlas complete?)",
            tract
        )
    })?;
    let mut centroid = bundle_centroid(&model, n_points)
        .with_context(|| format!("failed to compute centroid for {}", tract))?;
    if needs_flip(tract) {
        centroid.reverse();
    }

    fs::create_dir_all(layout.centroids_dir())?;
    centroid_cache::write_centroid(&cache_path, &centroid)?;
    Ok((centroid, true))
}

fn model_trk_path(layout: &Layout, tract: &str) -> std::path::PathBuf {
    layout.model_dir().join(format!("{tract}.trk"))
}

/// True when a model bundle exists for the tract (used by `validate`).
pub fn model_available(layout: &Layout, tract: &str) -> bool {
    Path::exists(&model_trk_path(layout, tract))
}
