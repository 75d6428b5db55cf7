use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::trk;
use crate::pipeline::{Stage, StageStatus};

pub struct Stage1Bundle;

impl Stage1Bundle {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Bundle {
    fn name(&self) -> &'static str {
        "stage1_bundle"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageStatus> {
        if !ctx.cfg.tract_meta.contains_key(&ctx.tract) {
            return Ok(StageStatus::Skip(
                "no row in the tract metadata table".to_string(),
            ));
        }

        // Outputs are memoized by filesystem presence: if the segment
        // tractograms are already on disk the whole tract is done.
        if !ctx.cfg.force && ctx.output.segment_trks_exist() {
            return Ok(StageStatus::Skip(
                "segment tractograms already present".to_string(),
            ));
        }

        let trk_path = ctx
            .cfg
            .layout
            .bundleseg_dir(ctx.cfg.cohort)
            .join(&ctx.cfg.subject)
            .join(format!("{}.trk", ctx.tract));
        if !trk_path.exists() {
            return Ok(StageStatus::Skip(format!(
                "tractogram {} does not exist",
                trk_path.display()
            )));
        }

        let (bundle, header) = trk::read_trk(&trk_path)?;
        if bundle.is_empty() {
            return Ok(StageStatus::Skip(
                "tractogram contains no streamlines".to_string(),
            ));
        }

        info!(
            tract = %ctx.tract,
            streamlines = bundle.len(),
            header_count = header.n_count,
            "bundle_loaded"
        );
        ctx.bundle = Some(bundle);
        Ok(StageStatus::Continue)
    }
}
