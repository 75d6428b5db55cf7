use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tractprof", version, about = "Along-tract profile extraction CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Centroids(CentroidArgs),
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Subject identifier (e.g. sub-1001)")]
    pub subject: String,

    #[arg(long, value_enum)]
    pub cohort: CohortArg,

    #[arg(long, help = "Data root holding atlases/, metadata/, derivatives/")]
    pub root: PathBuf,

    #[arg(long, default_value = "HCP1065")]
    pub atlas: String,

    #[arg(long, help = "Restrict to specific tract labels (repeatable)")]
    pub tract: Vec<String>,

    #[arg(long, default_value_t = 100, help = "Along-tract positions per profile")]
    pub points: usize,

    #[arg(
        long,
        default_value_t = 1.0 / 3.0,
        value_parser = parse_proportion,
        help = "Endpoint segment proportion, in (0, 0.5)"
    )]
    pub proportion: f64,

    #[arg(long, default_value_t = false, help = "Recompute outputs that already exist")]
    pub force: bool,

    #[arg(long, default_value_t = false, help = "Write a JSON run summary next to the outputs")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CentroidArgs {
    #[arg(long)]
    pub root: PathBuf,

    #[arg(long, default_value = "HCP1065")]
    pub atlas: String,

    #[arg(long, help = "Restrict to specific tract labels (repeatable)")]
    pub tract: Vec<String>,

    #[arg(long, default_value_t = 100)]
    pub points: usize,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long)]
    pub subject: String,

    #[arg(long, value_enum)]
    pub cohort: CohortArg,

    #[arg(long)]
    pub root: PathBuf,

    #[arg(long, default_value = "HCP1065")]
    pub atlas: String,
}

/// Both ends must fit without meeting in the middle, so the proportion is
/// restricted to (0, 0.5).
fn parse_proportion(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value > 0.0 && value < 0.5 {
        Ok(value)
    } else {
        Err(format!("{value} is outside (0, 0.5)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CohortArg {
    Hcpya,
    Hcpaging,
    PennControls,
    PennEpilepsy,
}
