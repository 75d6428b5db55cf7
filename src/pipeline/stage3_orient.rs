use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::geom::orient::orient_by_centroid;
use crate::geom::weights::{gaussian_weights, mean_streamline_weights};
use crate::io::write_scalar_column;
use crate::pipeline::{Stage, StageStatus};

pub struct Stage3Orient;

impl Stage3Orient {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Orient {
    fn name(&self) -> &'static str {
        "stage3_orient"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageStatus> {
        let bundle = ctx.bundle.take().context("bundle not loaded")?;
        let centroid = ctx.centroid.as_ref().context("centroid not ready")?;

        let oriented = orient_by_centroid(&bundle, centroid);
        let weights = gaussian_weights(&oriented, centroid)?;

        if ctx.cfg.force || !ctx.output.weights_csv.exists() {
            let means = mean_streamline_weights(&weights);
            write_scalar_column(&ctx.output.weights_csv, &means)?;
            info!(
                tract = %ctx.tract,
                path = %ctx.output.weights_csv.display(),
                "weights_written"
            );
        } else {
            info!(tract = %ctx.tract, "weights already present");
        }

        ctx.bundle = Some(oriented);
        ctx.weights = Some(weights);
        Ok(StageStatus::Continue)
    }
}
