use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::io::volume::read_scalar_volume;
use crate::io::write_scalar_column;
use crate::pipeline::{Stage, StageStatus};
use crate::profile::tract_profile;

pub struct Stage6Profile;

impl Stage6Profile {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6Profile {
    fn name(&self) -> &'static str {
        "stage6_profile"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageStatus> {
        let bundle = ctx.bundle.as_ref().context("bundle not oriented")?;
        let weights = ctx.weights.as_ref().context("weights not computed")?;
        let cfg = &ctx.cfg;

        for measure in &cfg.measures {
            let out = ctx.output.profile_csv(&measure.label);
            if !cfg.force && out.exists() {
                info!(tract = %ctx.tract, measure = %measure.label, "profile already present");
                continue;
            }

            let scalar_path = cfg.cohort.scalar_path(
                &cfg.layout,
                &cfg.subject,
                cfg.session.as_deref(),
                measure,
            );
            if !scalar_path.exists() {
                warn!(
                    tract = %ctx.tract,
                    measure = %measure.label,
                    path = %scalar_path.display(),
                    "scalar map missing"
                );
                ctx.measures_skipped.push(measure.label.clone());
                continue;
            }

            let (scalar, affine) = read_scalar_volume(&scalar_path)
                .with_context(|| format!("reading scalar map for {}", measure.label))?;
            let profile = tract_profile(&scalar, &affine, bundle, weights, cfg.n_points)?;
            write_scalar_column(&out, &profile)?;
            ctx.profiles_written.push(measure.label.clone());
            info!(tract = %ctx.tract, measure = %measure.label, "profile_written");
        }

        Ok(StageStatus::Continue)
    }
}
