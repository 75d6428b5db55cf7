//! Cohort-specific raw-data layout.
//!
//! A cohort names a subject population with its own directory conventions
//! for the anatomical reference and for qsirecon scalar maps. Keeping the
//! variants closed avoids string-typed group checks spreading through the
//! pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::ctx::Layout;
use crate::io::metadata::ScalarMeasure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cohort {
    Hcpya,
    Hcpaging,
    PennControls,
    PennEpilepsy,
}

impl Cohort {
    /// Directory name under derivatives/.
    pub fn as_str(&self) -> &'static str {
        match self {
            Cohort::Hcpya => "hcpya",
            Cohort::Hcpaging => "hcpaging",
            Cohort::PennControls => "penn_controls",
            Cohort::PennEpilepsy => "penn_epilepsy",
        }
    }

    /// Penn acquisitions are organized by BIDS session; HCP releases are not.
    pub fn session_required(&self) -> bool {
        matches!(self, Cohort::PennControls | Cohort::PennEpilepsy)
    }

    /// Anatomical T1w reference defining the output voxel grid.
    pub fn anat_path(&self, layout: &Layout, subject: &str) -> PathBuf {
        match self {
            Cohort::Hcpya => {
                // HCP-YA kept its raw release layout; subject dirs are the
                // bare HCP id without the BIDS prefix.
                let hcp_id = subject.strip_prefix("sub-").unwrap_or(subject);
                layout
                    .hcpya_raw_dir()
                    .join(hcp_id)
                    .join("T1w")
                    .join("T1w_acpc_dc_restore.nii.gz")
            }
            Cohort::Hcpaging | Cohort::PennControls | Cohort::PennEpilepsy => layout
                .qsiprep_dir(*self)
                .join(subject)
                .join("anat")
                .join(format!("{subject}_space-ACPC_desc-preproc_T1w.nii.gz")),
        }
    }

    /// Scalar map path under the qsirecon derivatives tree for one measure.
    pub fn scalar_path(
        &self,
        layout: &Layout,
        subject: &str,
        session: Option<&str>,
        measure: &ScalarMeasure,
    ) -> PathBuf {
        let recon = layout
            .qsirecon_dir(*self)
            .join("derivatives")
            .join(&measure.directory);
        let filename = &measure.filename;
        match self {
            Cohort::PennControls | Cohort::PennEpilepsy => {
                let ses = session.unwrap_or("ses-01");
                recon.join(subject).join(ses).join("dwi").join(format!(
                    "{subject}_{ses}_space-ACPC_{filename}_dwimap.nii.gz"
                ))
            }
            Cohort::Hcpaging => recon
                .join(subject)
                .join("dwi")
                .join(format!("{subject}_space-ACPC_{filename}_dwimap.nii.gz")),
            Cohort::Hcpya => recon
                .join(subject)
                .join("ses-01")
                .join("dwi")
                .join(format!("{subject}_space-T1w_{filename}_dwimap.nii.gz")),
        }
    }
}

/// Find the subject's session directory under qsiprep (`ses-*`).
///
/// Returns the first session in sorted order; multi-session subjects are
/// profiled against their baseline scan.
pub fn discover_session(qsiprep_subject_dir: &Path) -> Result<String> {
    let mut sessions = Vec::new();
    let entries = fs::read_dir(qsiprep_subject_dir).with_context(|| {
        format!(
            "failed to list subject directory {}",
            qsiprep_subject_dir.display()
        )
    })?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with("ses-") && entry.path().is_dir() {
            sessions.push(name);
        }
    }
    if sessions.is_empty() {
        bail!(
            "no ses-* directory under {}",
            qsiprep_subject_dir.display()
        );
    }
    sessions.sort();
    Ok(sessions.remove(0))
}
