use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tractprof::cli::{CentroidArgs, Cli, CohortArg, Commands, RunArgs, ValidateArgs};
use tractprof::cohort::{Cohort, discover_session};
use tractprof::ctx::{Ctx, EXCLUDED_TRACTS, Layout, RunConfig};
use tractprof::io::metadata::{read_scalar_measures, read_tract_labels, read_tract_metadata};
use tractprof::io::trk::read_streamline_count;
use tractprof::io::volume::read_ref_grid;
use tractprof::pipeline::{Pipeline, RunStatus};
use tractprof::report::{RunReport, TractOutcome, TractStatus, format_summary, write_report};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => handle_run(args),
        Commands::Centroids(args) => handle_centroids(args),
        Commands::Validate(args) => handle_validate(args),
    }
}

fn cohort_from_arg(arg: CohortArg) -> Cohort {
    match arg {
        CohortArg::Hcpya => Cohort::Hcpya,
        CohortArg::Hcpaging => Cohort::Hcpaging,
        CohortArg::PennControls => Cohort::PennControls,
        CohortArg::PennEpilepsy => Cohort::PennEpilepsy,
    }
}

/// Resolve the tract label list: all atlas labels, or the requested subset
/// validated against the atlas.
fn select_tracts(layout: &Layout, requested: &[String]) -> Result<Vec<String>> {
    let labels = read_tract_labels(&layout.bundleseg_config_path())?;
    if requested.is_empty() {
        return Ok(labels);
    }
    for tract in requested {
        if !labels.contains(tract) {
            anyhow::bail!("unknown tract label {tract} for atlas {}", layout.atlas);
        }
    }
    Ok(requested.to_vec())
}

fn handle_run(args: RunArgs) -> Result<()> {
    let cohort = cohort_from_arg(args.cohort);
    let layout = Layout::new(args.root, &args.atlas);

    let tracts = select_tracts(&layout, &args.tract)?;
    let tract_meta = read_tract_metadata(&layout.tract_metadata_path())?;
    let measures = read_scalar_measures(
        &layout.scalar_filenames_path(),
        &layout.scalar_directories_path(),
    )?;

    let session = if cohort.session_required() {
        let subject_dir = layout.qsiprep_dir(cohort).join(&args.subject);
        Some(discover_session(&subject_dir)?)
    } else {
        None
    };

    let anat = cohort.anat_path(&layout, &args.subject);
    let ref_grid = read_ref_grid(&anat)
        .with_context(|| format!("reading anatomical reference {}", anat.display()))?;

    let cfg = RunConfig {
        subject: args.subject.clone(),
        cohort,
        session,
        layout,
        n_points: args.points,
        proportion: args.proportion,
        force: args.force,
        measures,
        tract_meta,
        ref_grid,
    };

    let mut report = RunReport::new(&args.subject, cohort.as_str(), &args.atlas, args.points);
    let pipeline = Pipeline::standard();

    for tract in &tracts {
        let mut ctx = Ctx::new(cfg.clone(), tract);
        match pipeline.run(&mut ctx) {
            Ok(RunStatus::Completed) => report.tracts.push(TractOutcome {
                tract: tract.clone(),
                status: TractStatus::Completed,
                skip_reason: None,
                profiles_written: ctx.profiles_written,
                measures_skipped: ctx.measures_skipped,
            }),
            Ok(RunStatus::Skipped(reason)) => report.tracts.push(TractOutcome {
                tract: tract.clone(),
                status: TractStatus::Skipped,
                skip_reason: Some(reason),
                profiles_written: Vec::new(),
                measures_skipped: Vec::new(),
            }),
            // Anything past the skip conditions is fatal: stop here, do not
            // move on to the remaining tracts.
            Err(err) => {
                tracing::error!(tract = %tract, error = %format!("{err:#}"), "tract failed");
                report.tracts.push(TractOutcome {
                    tract: tract.clone(),
                    status: TractStatus::Failed,
                    skip_reason: None,
                    profiles_written: Vec::new(),
                    measures_skipped: Vec::new(),
                });
                print!("{}", format_summary(&report));
                return Err(err);
            }
        }
    }

    print!("{}", format_summary(&report));

    if args.json {
        let out_dir = cfg.layout.output_dir(cohort, &args.subject);
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating output dir {}", out_dir.display()))?;
        let path = out_dir.join("run_report.json");
        write_report(&path, &report)?;
        println!("report: {}", path.display());
    }

    Ok(())
}

fn handle_centroids(args: CentroidArgs) -> Result<()> {
    let layout = Layout::new(args.root, &args.atlas);
    let tracts = select_tracts(&layout, &args.tract)?;

    let mut computed = 0usize;
    let mut cached = 0usize;
    for tract in &tracts {
        if EXCLUDED_TRACTS.contains(&tract.as_str()) {
            continue;
        }
        let (_, was_computed) =
            tractprof::pipeline::stage2_centroid::ensure_centroid(&layout, tract, args.points)?;
        if was_computed {
            computed += 1;
        } else {
            cached += 1;
        }
    }

    println!("centroids: {} computed, {} cached", computed, cached);
    Ok(())
}

fn handle_validate(args: ValidateArgs) -> Result<()> {
    let cohort = cohort_from_arg(args.cohort);
    let layout = Layout::new(args.root, &args.atlas);

    let tracts = select_tracts(&layout, &[])?;
    let measures = read_scalar_measures(
        &layout.scalar_filenames_path(),
        &layout.scalar_directories_path(),
    )?;

    let session = if cohort.session_required() {
        let subject_dir = layout.qsiprep_dir(cohort).join(&args.subject);
        Some(discover_session(&subject_dir)?)
    } else {
        None
    };

    let mut missing = 0usize;
    println!("tractprof validate {} ({})", args.subject, cohort.as_str());

    let anat = cohort.anat_path(&layout, &args.subject);
    if anat.exists() {
        println!("anat: ok");
    } else {
        println!("anat: MISSING {}", anat.display());
        missing += 1;
    }

    let bundles_dir = layout.bundleseg_dir(cohort).join(&args.subject);
    let mut present = 0usize;
    for tract in &tracts {
        let trk = bundles_dir.join(format!("{tract}.trk"));
        if !trk.exists() {
            continue;
        }
        match read_streamline_count(&trk) {
            Ok(count) => {
                present += 1;
                if count == 0 {
                    println!("bundle {tract}: empty");
                }
            }
            Err(err) => {
                println!("bundle {tract}: unreadable ({err:#})");
                missing += 1;
            }
        }
    }
    println!("bundles: {}/{} present", present, tracts.len());

    for measure in &measures {
        let path = cohort.scalar_path(&layout, &args.subject, session.as_deref(), measure);
        if path.exists() {
            println!("scalar {}: ok", measure.label);
        } else {
            println!("scalar {}: MISSING {}", measure.label, path.display());
            missing += 1;
        }
    }

    for tract in &tracts {
        if EXCLUDED_TRACTS.contains(&tract.as_str()) {
            continue;
        }
        if !tractprof::pipeline::stage2_centroid::model_available(&layout, tract) {
            println!("model {tract}: MISSING");
            missing += 1;
        }
    }

    if missing > 0 {
        anyhow::bail!("{missing} required inputs missing");
    }
    println!("ok");
    Ok(())
}
