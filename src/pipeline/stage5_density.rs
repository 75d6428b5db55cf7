use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::density::density_map;
use crate::io::volume::write_volume;
use crate::pipeline::{Stage, StageStatus};

pub struct Stage5Density;

impl Stage5Density {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Density {
    fn name(&self) -> &'static str {
        "stage5_density"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageStatus> {
        let (end1, core, end2) = ctx.segments.as_ref().context("segments not built")?;
        let grid = &ctx.cfg.ref_grid;

        let end1_map = density_map(end1, grid)?;
        let core_map = density_map(core, grid)?;
        let end2_map = density_map(end2, grid)?;

        write_volume(&ctx.output.end1_nii, &end1_map, &grid.header)?;
        write_volume(&ctx.output.core_nii, &core_map, &grid.header)?;
        write_volume(&ctx.output.end2_nii, &end2_map, &grid.header)?;

        info!(tract = %ctx.tract, "density_maps_written");
        Ok(StageStatus::Continue)
    }
}
