use serde_json::Value;
use tempfile::TempDir;

use tractprof::report::{RunReport, TractOutcome, TractStatus, format_summary, write_report};

fn sample_report() -> RunReport {
    let mut report = RunReport::new("sub-01", "hcpaging", "HCP1065", 100);
    report.tracts.push(TractOutcome {
        tract: "AF_L".to_string(),
        status: TractStatus::Completed,
        skip_reason: None,
        profiles_written: vec!["dti_fa".to_string()],
        measures_skipped: vec!["dki_mk".to_string()],
    });
    report.tracts.push(TractOutcome {
        tract: "C_PO_L".to_string(),
        status: TractStatus::Skipped,
        skip_reason: Some("tract is unsuitable for along-tract profiling".to_string()),
        profiles_written: Vec::new(),
        measures_skipped: Vec::new(),
    });
    report.tracts.push(TractOutcome {
        tract: "CST_R".to_string(),
        status: TractStatus::Failed,
        skip_reason: None,
        profiles_written: Vec::new(),
        measures_skipped: Vec::new(),
    });
    report
}

#[test]
fn counts_by_status() {
    let report = sample_report();
    assert_eq!(report.completed(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 1);
}

#[test]
fn json_report_schema_fields_exist() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("run_report.json");
    write_report(&path, &sample_report()).unwrap();

    let v: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(v["subject"], "sub-01");
    assert_eq!(v["cohort"], "hcpaging");
    assert_eq!(v["atlas"], "HCP1065");
    assert_eq!(v["n_points"], 100);
    assert!(v["version"].is_string());
    let tracts = v["tracts"].as_array().unwrap();
    assert_eq!(tracts.len(), 3);
    assert_eq!(tracts[0]["status"], "completed");
    assert_eq!(tracts[0]["profiles_written"][0], "dti_fa");
    assert_eq!(tracts[1]["status"], "skipped");
    assert!(tracts[1]["skip_reason"].is_string());
    // Empty lists and absent reasons are omitted rather than nulled.
    assert!(tracts[2].get("skip_reason").is_none());
    assert!(tracts[2].get("profiles_written").is_none());
}

#[test]
fn summary_names_skips_failures_and_missing_measures() {
    let summary = format_summary(&sample_report());
    assert!(summary.contains("1 completed, 1 skipped, 1 failed"));
    assert!(summary.contains("C_PO_L: skipped"));
    assert!(summary.contains("CST_R: FAILED"));
    assert!(summary.contains("missing scalar maps: dki_mk"));
}
