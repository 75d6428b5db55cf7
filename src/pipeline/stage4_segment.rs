use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::geom::segment::split_bundle;
use crate::io::trk::write_trk;
use crate::pipeline::{Stage, StageStatus};

pub struct Stage4Segment;

impl Stage4Segment {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Segment {
    fn name(&self) -> &'static str {
        "stage4_segment"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageStatus> {
        let bundle = ctx.bundle.as_ref().context("bundle not oriented")?;

        let (end1, core, end2) = split_bundle(bundle, ctx.cfg.proportion);

        let grid = &ctx.cfg.ref_grid;
        write_trk(&ctx.output.end1_trk, &end1, grid)?;
        write_trk(&ctx.output.core_trk, &core, grid)?;
        write_trk(&ctx.output.end2_trk, &end2, grid)?;

        info!(
            tract = %ctx.tract,
            end1 = end1.len(),
            core = core.len(),
            end2 = end2.len(),
            "segments_written"
        );

        ctx.segments = Some((end1, core, end2));
        Ok(StageStatus::Continue)
    }
}
