use std::fs;
use std::path::Path;

use assert_cmd::Command;
use nalgebra::Matrix4;
use ndarray::Array3;
use tempfile::TempDir;

use tractprof::geom::Bundle;
use tractprof::io::trk::write_trk;
use tractprof::io::volume::{RefGrid, write_volume};

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("tractprof").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn run_help_lists_required_flags() {
    let mut cmd = Command::cargo_bin("tractprof").unwrap();
    cmd.args(["run", "--help"]);
    let output = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).to_string();
    assert!(stdout.contains("--subject"));
    assert!(stdout.contains("--cohort"));
    assert!(stdout.contains("--root"));
    assert!(stdout.contains("--proportion"));
}

#[test]
fn unknown_cohort_is_rejected() {
    let mut cmd = Command::cargo_bin("tractprof").unwrap();
    cmd.args([
        "run",
        "--subject",
        "sub-01",
        "--cohort",
        "hcp2030",
        "--root",
        "/tmp",
    ]);
    cmd.assert().failure();
}

#[test]
fn out_of_range_proportion_is_rejected() {
    for value in ["0.6", "0.5", "0", "-0.1"] {
        let mut cmd = Command::cargo_bin("tractprof").unwrap();
        cmd.args([
            "run",
            "--subject",
            "sub-01",
            "--cohort",
            "hcpaging",
            "--root",
            "/tmp",
            &format!("--proportion={value}"),
        ]);
        let output = cmd.assert().failure();
        let stderr = String::from_utf8_lossy(&output.get_output().stderr).to_string();
        assert!(stderr.contains("(0, 0.5)"), "no range message for {value}");
    }
}

fn grid() -> RefGrid {
    RefGrid::from_parts((16, 16, 16), (1.0, 1.0, 1.0), Matrix4::identity())
}

fn x_line(y: f32) -> Vec<[f32; 3]> {
    (2..12).map(|i| [i as f32, y, 8.0]).collect()
}

/// Minimal data root for the hcpaging cohort with two tracts: the first
/// (alphabetically) holds a corrupt tractogram, the second a valid one.
fn write_fatal_error_root(root: &Path) {
    let config_dir = root.join("code").join("bundleseg").join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config_HCP1065_association_projection.json"),
        r#"{"AAA_L.trk": {}, "BBB_L.trk": {}}"#,
    )
    .unwrap();

    let atlas_dir = root.join("atlases").join("HCP1065");
    fs::create_dir_all(atlas_dir.join("all_trk")).unwrap();
    fs::write(
        atlas_dir.join("HCP1065_tract_metadata.csv"),
        "label,end1,end2\nAAA_L,front,back\nBBB_L,front,back\n",
    )
    .unwrap();
    let model = Bundle::new(vec![x_line(5.0), x_line(6.0)]);
    for tract in ["AAA_L", "BBB_L"] {
        write_trk(
            &atlas_dir.join("all_trk").join(format!("{tract}.trk")),
            &model,
            &grid(),
        )
        .unwrap();
    }

    let meta_dir = root.join("metadata");
    fs::create_dir_all(&meta_dir).unwrap();
    fs::write(
        meta_dir.join("scalar_labels_to_filenames.json"),
        r#"{"dti_fa": "model-tensor_param-fa"}"#,
    )
    .unwrap();
    fs::write(
        meta_dir.join("scalar_labels_to_directories.json"),
        r#"{"dti_fa": "qsirecon-DSIStudio"}"#,
    )
    .unwrap();

    let anat_dir = root
        .join("derivatives")
        .join("qsiprep")
        .join("hcpaging")
        .join("sub-01")
        .join("anat");
    fs::create_dir_all(&anat_dir).unwrap();
    let anat = Array3::<f32>::from_elem((16, 16, 16), 1.0);
    write_volume(
        &anat_dir.join("sub-01_space-ACPC_desc-preproc_T1w.nii.gz"),
        &anat,
        &grid().header,
    )
    .unwrap();

    let bundles_dir = root
        .join("derivatives")
        .join("bundleseg")
        .join("hcpaging")
        .join("sub-01");
    fs::create_dir_all(&bundles_dir).unwrap();
    // No TRACK magic: loading this tractogram is a hard error, not a skip.
    fs::write(bundles_dir.join("AAA_L.trk"), vec![0u8; 1200]).unwrap();
    write_trk(
        &bundles_dir.join("BBB_L.trk"),
        &Bundle::new(vec![x_line(5.0), x_line(7.0)]),
        &grid(),
    )
    .unwrap();
}

#[test]
fn run_stops_at_the_first_fatal_error() {
    let tmp = TempDir::new().unwrap();
    write_fatal_error_root(tmp.path());

    let mut cmd = Command::cargo_bin("tractprof").unwrap();
    cmd.args(["run", "--subject", "sub-01", "--cohort", "hcpaging", "--root"]);
    cmd.arg(tmp.path());
    cmd.assert().failure();

    // The later, perfectly valid tract must not have been processed: a
    // fatal error terminates the run, it is not a per-tract skip.
    let out_root = tmp
        .path()
        .join("derivatives")
        .join("pyafq")
        .join("hcpaging")
        .join("sub-01")
        .join("HCP1065");
    assert!(!out_root.join("BBB_L").exists());
}

#[test]
fn validate_fails_on_empty_root() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("tractprof").unwrap();
    cmd.args([
        "validate",
        "--subject",
        "sub-01",
        "--cohort",
        "hcpaging",
        "--root",
    ]);
    cmd.arg(tmp.path());
    cmd.assert().failure();
}

#[test]
fn centroids_fails_without_atlas_config() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("tractprof").unwrap();
    cmd.args(["centroids", "--root"]);
    cmd.arg(tmp.path());
    cmd.assert().failure();
}
