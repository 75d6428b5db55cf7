use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Per-tract outcome recorded for the run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TractOutcome {
    pub tract: String,
    pub status: TractStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub profiles_written: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub measures_skipped: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TractStatus {
    Completed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub version: String,
    pub subject: String,
    pub cohort: String,
    pub atlas: String,
    pub n_points: usize,
    pub tracts: Vec<TractOutcome>,
}

impl RunReport {
    pub fn new(subject: &str, cohort: &str, atlas: &str, n_points: usize) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            subject: subject.to_string(),
            cohort: cohort.to_string(),
            atlas: atlas.to_string(),
            n_points,
            tracts: Vec::new(),
        }
    }

    pub fn completed(&self) -> usize {
        self.tracts
            .iter()
            .filter(|t| t.status == TractStatus::Completed)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.tracts
            .iter()
            .filter(|t| t.status == TractStatus::Skipped)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.tracts
            .iter()
            .filter(|t| t.status == TractStatus::Failed)
            .count()
    }
}

pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).context("serializing run report")?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn format_summary(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("tractprof v{}\n", report.version));
    out.push_str(&format!(
        "Subject: {} cohort={} atlas={}\n",
        report.subject, report.cohort, report.atlas
    ));
    out.push_str(&format!(
        "Tracts: {} completed, {} skipped, {} failed\n",
        report.completed(),
        report.skipped(),
        report.failed()
    ));
    for t in &report.tracts {
        match (&t.status, &t.skip_reason) {
            (TractStatus::Skipped, Some(reason)) => {
                out.push_str(&format!("  {}: skipped ({})\n", t.tract, reason));
            }
            (TractStatus::Failed, _) => {
                out.push_str(&format!("  {}: FAILED\n", t.tract));
            }
            _ => {}
        }
        if !t.measures_skipped.is_empty() {
            out.push_str(&format!(
                "  {}: missing scalar maps: {}\n",
                t.tract,
                t.measures_skipped.join(", ")
            ));
        }
    }
    out
}
