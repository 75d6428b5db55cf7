//! Tract and scalar-measure metadata readers.

use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::io::open_maybe_gz;

/// Anatomical endpoint labels (and tissue types) for one tract.
#[derive(Debug, Clone)]
pub struct TractEnds {
    pub end1: String,
    pub end2: String,
    pub end1_type: String,
    pub end2_type: String,
}

/// One diffusion scalar measure: how the label maps onto the qsirecon tree.
#[derive(Debug, Clone)]
pub struct ScalarMeasure {
    pub label: String,
    pub filename: String,
    pub directory: String,
}

/// Parse the per-atlas tract metadata CSV (`label,end1,end2[,end1_type,end2_type]`).
pub fn read_tract_metadata(path: &Path) -> Result<HashMap<String, TractEnds>> {
    let reader = BufReader::new(open_maybe_gz(path)?);
    let mut lines = reader.lines();

    let header = lines
        .next()
        .transpose()?
        .with_context(|| format!("{} is empty", path.display()))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let col = |name: &str| columns.iter().position(|c| *c == name);
    let label_col = col("label")
        .with_context(|| format!("{} has no 'label' column", path.display()))?;
    let end1_col = col("end1")
        .with_context(|| format!("{} has no 'end1' column", path.display()))?;
    let end2_col = col("end2")
        .with_context(|| format!("{} has no 'end2' column", path.display()))?;
    let end1_type_col = col("end1_type");
    let end2_type_col = col("end2_type");

    let mut meta = HashMap::new();
    for (lineno, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |i: usize| -> Result<String> {
            fields
                .get(i)
                .map(|s| s.to_string())
                .with_context(|| format!("{} line {}: missing column {}", path.display(), lineno + 2, i))
        };
        let label = field(label_col)?;
        let ends = TractEnds {
            end1: field(end1_col)?,
            end2: field(end2_col)?,
            end1_type: end1_type_col.map(&field).transpose()?.unwrap_or_default(),
            end2_type: end2_type_col.map(&field).transpose()?.unwrap_or_default(),
        };
        meta.insert(label, ends);
    }
    if meta.is_empty() {
        bail!("{} holds no tract rows", path.display());
    }
    Ok(meta)
}

/// Join the two scalar-measure JSON maps (label -> filename fragment,
/// label -> qsirecon subdirectory) into one sorted measure list.
pub fn read_scalar_measures(filenames_path: &Path, directories_path: &Path) -> Result<Vec<ScalarMeasure>> {
    let filenames: BTreeMap<String, String> =
        serde_json::from_reader(open_maybe_gz(filenames_path)?)
            .with_context(|| format!("failed to parse {}", filenames_path.display()))?;
    let directories: BTreeMap<String, String> =
        serde_json::from_reader(open_maybe_gz(directories_path)?)
            .with_context(|| format!("failed to parse {}", directories_path.display()))?;

    let mut measures = Vec::with_capacity(filenames.len());
    for (label, filename) in filenames {
        let directory = directories.get(&label).with_context(|| {
            format!(
                "measure '{}' present in {} but missing from {}",
                label,
                filenames_path.display(),
                directories_path.display()
            )
        })?;
        measures.push(ScalarMeasure {
            label,
            filename,
            directory: directory.clone(),
        });
    }
    if measures.is_empty() {
        bail!("{} defines no scalar measures", filenames_path.display());
    }
    Ok(measures)
}

/// Tract labels from the bundle-segmentation config: the object's keys with
/// their `.trk` suffix stripped, sorted for a deterministic tract order.
pub fn read_tract_labels(config_path: &Path) -> Result<Vec<String>> {
    let config: BTreeMap<String, serde_json::Value> =
        serde_json::from_reader(open_maybe_gz(config_path)?)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
    let labels: Vec<String> = config
        .keys()
        .map(|k| k.strip_suffix(".trk").unwrap_or(k).to_string())
        .collect();
    if labels.is_empty() {
        bail!("{} defines no tracts", config_path.display());
    }
    Ok(labels)
}
