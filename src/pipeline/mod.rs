use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage0_scaffold;
pub mod stage1_bundle;
pub mod stage2_centroid;
pub mod stage3_orient;
pub mod stage4_segment;
pub mod stage5_density;
pub mod stage6_profile;

/// Stage result: advance, or stop the tract without error.
///
/// Skips are policy, not failures: a missing input, an empty bundle, or an
/// excluded/already-done tract ends that tract's pipeline with a logged
/// reason and the run moves on to the next tract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Continue,
    Skip(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Skipped(String),
}

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<StageStatus>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// The full per-tract extraction pipeline.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(stage0_scaffold::Stage0Scaffold::new()),
            Box::new(stage1_bundle::Stage1Bundle::new()),
            Box::new(stage2_centroid::Stage2Centroid::new()),
            Box::new(stage3_orient::Stage3Orient::new()),
            Box::new(stage4_segment::Stage4Segment::new()),
            Box::new(stage5_density::Stage5Density::new()),
            Box::new(stage6_profile::Stage6Profile::new()),
        ])
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<RunStatus> {
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), tract = %ctx.tract, "stage started");
            match stage.run(ctx) {
                Ok(StageStatus::Continue) => {
                    let elapsed_ms = start.elapsed().as_millis();
                    info!(
                        stage = stage.name(),
                        tract = %ctx.tract,
                        elapsed_ms = elapsed_ms as u64,
                        "stage finished"
                    );
                }
                Ok(StageStatus::Skip(reason)) => {
                    info!(
                        stage = stage.name(),
                        tract = %ctx.tract,
                        reason = %reason,
                        "tract skipped"
                    );
                    return Ok(RunStatus::Skipped(reason));
                }
                Err(err) => {
                    let elapsed_ms = start.elapsed().as_millis();
                    warn!(
                        stage = stage.name(),
                        tract = %ctx.tract,
                        elapsed_ms = elapsed_ms as u64,
                        "stage failed"
                    );
                    return Err(err);
                }
            }
        }
        Ok(RunStatus::Completed)
    }
}
