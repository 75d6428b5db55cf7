use anyhow::Result;
use std::fs;
use tracing::info;

use crate::ctx::{Ctx, EXCLUDED_TRACTS};
use crate::pipeline::{Stage, StageStatus};

pub struct Stage0Scaffold;

impl Stage0Scaffold {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage0Scaffold {
    fn name(&self) -> &'static str {
        "stage0_scaffold"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageStatus> {
        // Exclusion is unconditional and precedes any directory creation.
        if EXCLUDED_TRACTS.contains(&ctx.tract.as_str()) {
            return Ok(StageStatus::Skip(
                "tract is unsuitable for along-tract profiling".to_string(),
            ));
        }

        fs::create_dir_all(&ctx.output.profile_dir)?;
        fs::create_dir_all(&ctx.output.weights_dir)?;
        fs::create_dir_all(&ctx.output.segmentation_dir)?;
        info!(
            out_dir = %ctx.output.segmentation_dir.display(),
            "output_dirs_ready"
        );
        Ok(StageStatus::Continue)
    }
}
