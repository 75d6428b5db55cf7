use std::collections::HashMap;
use std::path::PathBuf;

use crate::cohort::Cohort;
use crate::geom::{Bundle, Streamline};
use crate::io::metadata::{ScalarMeasure, TractEnds};
use crate::io::volume::RefGrid;

/// Tracts unsuitable for linear along-tract profiling (Cingulum
/// parolfactory and SLF2 geometry defeats a single centroid orientation).
pub const EXCLUDED_TRACTS: &[&str] = &["C_PO_L", "C_PO_R", "SLF2_L", "SLF2_R"];

/// Directory conventions under the data root.
#[derive(Debug, Clone)]
pub struct Layout {
    pub root: PathBuf,
    pub atlas: String,
}

impl Layout {
    pub fn new(root: PathBuf, atlas: &str) -> Self {
        Self {
            root,
            atlas: atlas.to_string(),
        }
    }

    pub fn atlas_dir(&self) -> PathBuf {
        self.root.join("atlases").join(&self.atlas)
    }

    /// Atlas model bundles, one .trk per tract label.
    pub fn model_dir(&self) -> PathBuf {
        self.atlas_dir().join("all_trk")
    }

    pub fn centroids_dir(&self) -> PathBuf {
        self.atlas_dir().join("centroids")
    }

    pub fn tract_metadata_path(&self) -> PathBuf {
        self.atlas_dir()
            .join(format!("{}_tract_metadata.csv", self.atlas))
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join("metadata")
    }

    pub fn scalar_filenames_path(&self) -> PathBuf {
        self.metadata_dir().join("scalar_labels_to_filenames.json")
    }

    pub fn scalar_directories_path(&self) -> PathBuf {
        self.metadata_dir().join("scalar_labels_to_directories.json")
    }

    /// Bundle-segmentation config whose keys define the tract label list.
    pub fn bundleseg_config_path(&self) -> PathBuf {
        self.root
            .join("code")
            .join("bundleseg")
            .join("config")
            .join(format!("config_{}_association_projection.json", self.atlas))
    }

    pub fn qsiprep_dir(&self, cohort: Cohort) -> PathBuf {
        self.root
            .join("derivatives")
            .join("qsiprep")
            .join(cohort.as_str())
    }

    pub fn qsirecon_dir(&self, cohort: Cohort) -> PathBuf {
        self.root
            .join("derivatives")
            .join("qsirecon")
            .join(cohort.as_str())
    }

    pub fn bundleseg_dir(&self, cohort: Cohort) -> PathBuf {
        self.root
            .join("derivatives")
            .join("bundleseg")
            .join(cohort.as_str())
    }

    pub fn hcpya_raw_dir(&self) -> PathBuf {
        self.root
            .join("data")
            .join("hcpya")
            .join("hcp1200")
            .join("HCP1200")
    }

    /// Per-subject output root: derivatives/pyafq/{cohort}/{subject}/{atlas}.
    pub fn output_dir(&self, cohort: Cohort, subject: &str) -> PathBuf {
        self.root
            .join("derivatives")
            .join("pyafq")
            .join(cohort.as_str())
            .join(subject)
            .join(&self.atlas)
    }
}

/// Immutable per-subject configuration, built once at process start and
/// cloned into each per-tract context.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub subject: String,
    pub cohort: Cohort,
    pub session: Option<String>,
    pub layout: Layout,
    pub n_points: usize,
    pub proportion: f64,
    pub force: bool,
    pub measures: Vec<ScalarMeasure>,
    pub tract_meta: HashMap<String, TractEnds>,
    pub ref_grid: RefGrid,
}

/// Output artifact paths for one (subject, tract).
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub profile_dir: PathBuf,
    pub weights_dir: PathBuf,
    pub segmentation_dir: PathBuf,
    pub weights_csv: PathBuf,
    pub end1_trk: PathBuf,
    pub end2_trk: PathBuf,
    pub core_trk: PathBuf,
    pub end1_nii: PathBuf,
    pub end2_nii: PathBuf,
    pub core_nii: PathBuf,
}

impl OutputPaths {
    fn new(cfg: &RunConfig, tract: &str) -> Self {
        let base = cfg
            .layout
            .output_dir(cfg.cohort, &cfg.subject)
            .join(tract);
        let profile_dir = base.join("profile");
        let weights_dir = base.join("weights");
        let segmentation_dir = base.join("segmentation");

        // Endpoint file names carry the anatomical endpoint labels from the
        // tract metadata; fall back to positional names so path construction
        // never fails (a missing metadata row skips the tract before writes).
        let (end1, end2) = match cfg.tract_meta.get(tract) {
            Some(ends) => (ends.end1.clone(), ends.end2.clone()),
            None => ("end1".to_string(), "end2".to_string()),
        };

        Self {
            weights_csv: weights_dir.join(format!("{tract}_gaussian_weights.csv")),
            end1_trk: segmentation_dir.join(format!("{tract}_end-{end1}.trk")),
            end2_trk: segmentation_dir.join(format!("{tract}_end-{end2}.trk")),
            core_trk: segmentation_dir.join(format!("{tract}_core.trk")),
            end1_nii: segmentation_dir.join(format!("{tract}_end-{end1}.nii.gz")),
            end2_nii: segmentation_dir.join(format!("{tract}_end-{end2}.nii.gz")),
            core_nii: segmentation_dir.join(format!("{tract}_core.nii.gz")),
            profile_dir,
            weights_dir,
            segmentation_dir,
        }
    }

    pub fn profile_csv(&self, measure_label: &str) -> PathBuf {
        self.profile_dir.join(format!("{measure_label}_profile.csv"))
    }

    pub fn segment_trks_exist(&self) -> bool {
        self.end1_trk.exists() && self.end2_trk.exists() && self.core_trk.exists()
    }
}

/// Mutable per-tract state threaded through the pipeline stages.
#[derive(Debug)]
pub struct Ctx {
    pub cfg: RunConfig,
    pub tract: String,
    pub output: OutputPaths,
    pub bundle: Option<Bundle>,
    pub centroid: Option<Streamline>,
    pub weights: Option<Vec<Vec<f64>>>,
    pub segments: Option<(Bundle, Bundle, Bundle)>,
    pub profiles_written: Vec<String>,
    pub measures_skipped: Vec<String>,
}

impl Ctx {
    pub fn new(cfg: RunConfig, tract: &str) -> Self {
        let output = OutputPaths::new(&cfg, tract);
        Self {
            cfg,
            tract: tract.to_string(),
            output,
            bundle: None,
            centroid: None,
            weights: None,
            segments: None,
            profiles_written: Vec::new(),
            measures_skipped: Vec::new(),
        }
    }
}
