use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

/// Settings pointing at the fixture libraries and a scratch output directory.
fn write_settings(dir: &Path) -> PathBuf {
    let settings = dir.join("settings.toml");
    let contents = format!(
        "[data]\nsam_dir = '{}'\nconfig_dir = '{}'\n",
        repo_path("test_data/sam").display(),
        dir.join("configurations").display()
    );
    fs::write(&settings, contents).unwrap();
    settings
}

fn pvplant(settings: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pvplant").unwrap();
    cmd.arg("--settings").arg(settings);
    cmd
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn pvplant_surfaces_lists_albedo_table() {
    let tmp = tempdir().unwrap();
    pvplant(&write_settings(tmp.path()))
        .arg("surfaces")
        .assert()
        .success()
        .stdout(predicate::str::contains("fresh snow"))
        .stdout(predicate::str::contains("0.20"));
}

#[test]
fn pvplant_equipment_manufacturers() {
    let tmp = tempdir().unwrap();
    pvplant(&write_settings(tmp.path()))
        .args(["equipment", "manufacturers", "--db", "CECInverter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ABB\n"))
        .stdout(predicate::str::contains("SMA_America"))
        .stdout(predicate::str::contains("Fronius_International_GmbH"));
}

#[test]
fn pvplant_equipment_search() {
    let tmp = tempdir().unwrap();
    pvplant(&write_settings(tmp.path()))
        .args(["equipment", "search", "--db", "CECMod", "Canadian"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Canadian_Solar_Inc__CS6U_350M"))
        .stdout(predicate::str::contains("Canadian_Solar_Inc__CS6K_280P"))
        .stdout(predicate::str::contains("2 of 4 entries"));
}

#[test]
fn pvplant_equipment_show_inverter() {
    let tmp = tempdir().unwrap();
    pvplant(&write_settings(tmp.path()))
        .args([
            "equipment",
            "show",
            "--db",
            "CECInverter",
            "ABB: PVI-3.0-OUTD-S-US [240V]",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ac_model\": \"sandia\""))
        .stdout(predicate::str::contains("\"Paco\": 3000.0"));
}

#[test]
fn pvplant_equipment_show_sandia_module() {
    let tmp = tempdir().unwrap();
    pvplant(&write_settings(tmp.path()))
        .args(["equipment", "show", "--db", "SandiaMod", "Siemens_Solar_SM55___1995_"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"T_NOCT\": 45.0"))
        .stdout(predicate::str::contains("\"Technology\": \"monosi\""))
        .stdout(predicate::str::contains("\"alpha_sc\": 0.05"));
}

#[test]
fn pvplant_equipment_show_unknown_fails() {
    let tmp = tempdir().unwrap();
    pvplant(&write_settings(tmp.path()))
        .args(["equipment", "show", "--db", "CECMod", "No Such Module"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn pvplant_config_generate_fixed() {
    let tmp = tempdir().unwrap();
    let settings = write_settings(tmp.path());
    let form = repo_path("test_data/forms/fixed.toml");

    pvplant(&settings)
        .args(["config", "generate", "--form", form.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Generating configuration"))
        .stdout(predicate::str::contains("system_config_medellin.json"));

    let path = tmp.path().join("configurations/system_config_medellin.json");
    let config = read_json(&path);
    assert_eq!(config["name"], "medellin");
    assert_eq!(config["with_tracker"], false);
    assert_eq!(config["surface_tilt"], serde_json::json!([10.0, 15.0]));
    assert_eq!(config["surface_azimuth"], serde_json::json!([90.0, 270.0]));
    assert!(config["axis_tilt"].is_null());
    assert!(config["max_angle"].is_null());
    assert_eq!(config["surface_albedo"], 0.2);
    assert_eq!(config["ac_model"], "sandia");
    assert_eq!(config["inverter"]["Paco"], 9995.0);
    assert_eq!(config["module"]["Technology"], "monosi");
    assert_eq!(config["module"]["STC"], 350.0);
    assert_eq!(config["module_type"], "glass_glass");
    assert_eq!(config["modules_per_string"], serde_json::json!([14, 14]));
    assert_eq!(config["loss"], 14.6);
    assert_eq!(config["bifaciality"], 0.0);
    assert_eq!(config["tz"], "America/Bogota");
}

#[test]
fn pvplant_config_generate_tracker_and_show() {
    let tmp = tempdir().unwrap();
    let settings = write_settings(tmp.path());
    let form = repo_path("test_data/forms/tracker.toml");

    pvplant(&settings)
        .args(["config", "generate", "--form", form.to_str().unwrap()])
        .assert()
        .success();

    let path = tmp.path().join("configurations/system_config.json");
    let config = read_json(&path);
    assert_eq!(config["with_tracker"], true);
    assert!(config["surface_tilt"].is_null());
    assert!(config["surface_azimuth"].is_null());
    assert_eq!(config["max_angle"], serde_json::json!([60.0]));
    assert_eq!(config["ac_model"], "pvwatts");
    assert_eq!(config["inverter"]["Pdco"], 2_550_000.0);
    assert_eq!(config["module"]["alpha_sc"], 0.05);
    assert_eq!(config["bifacial"], true);
    assert_eq!(config["bifaciality"], 0.7);
    assert!(config["module_type"].is_null());
    assert_eq!(config["kpc"], 1.2);
    assert_eq!(config["name"], "");

    pvplant(&settings)
        .args(["config", "show", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("single-axis tracker"))
        .stdout(predicate::str::contains("pvwatts"));
}

#[test]
fn pvplant_config_generate_stdout_writes_nothing() {
    let tmp = tempdir().unwrap();
    let settings = write_settings(tmp.path());
    let form = repo_path("test_data/forms/tracker.toml");

    pvplant(&settings)
        .args(["config", "generate", "--stdout", "--form", form.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\n  \"latitude\": 10.4631,"));
    assert!(!tmp.path().join("configurations").exists());
}

#[test]
fn pvplant_config_generate_out_dir_override() {
    let tmp = tempdir().unwrap();
    let settings = write_settings(tmp.path());
    let form = repo_path("test_data/forms/fixed.toml");
    let out_dir = tmp.path().join("elsewhere");

    pvplant(&settings)
        .args([
            "config",
            "generate",
            "--form",
            form.to_str().unwrap(),
            "--out-dir",
            out_dir.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert!(out_dir.join("system_config_medellin.json").exists());
}

#[test]
fn pvplant_config_generate_rejects_count_mismatch() {
    let tmp = tempdir().unwrap();
    let settings = write_settings(tmp.path());
    let form = repo_path("test_data/forms/mismatch.toml");

    pvplant(&settings)
        .args(["config", "generate", "--form", form.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 3 values"));
    assert!(!tmp.path().join("configurations").exists());
}

#[test]
fn pvplant_cen_reports_and_writes_curve() {
    let tmp = tempdir().unwrap();
    let settings = write_settings(tmp.path());
    let input = repo_path("test_data/series/ac.csv");
    let curve = tmp.path().join("curve.csv");

    pvplant(&settings)
        .args([
            "cen",
            input.to_str().unwrap(),
            "--perc",
            "99",
            "--unit",
            "kW",
            "--curve",
            curve.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pac Max. = 9.5 kW"))
        .stdout(predicate::str::contains("CEN (99 %) = 9.5 kW"));

    let written = fs::read_to_string(&curve).unwrap();
    assert!(written.starts_with("power_w,probability\n0.0,0.0\n"));
    assert_eq!(written.lines().count(), 49);
}

#[test]
fn pvplant_cen_single_sample_fails() {
    let tmp = tempdir().unwrap();
    let settings = write_settings(tmp.path());
    let input = tmp.path().join("one.csv");
    fs::write(&input, "ac\n1200.0\n").unwrap();

    pvplant(&settings)
        .args(["cen", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 2"));
}
