//! Integration tests for the `homescan` CLI binary.
//!
//! Every test runs against a throwaway configuration directory and points
//! the homescan config file at a nonexistent location, so nothing on the
//! host is read.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use serde_json::Value;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `homescan` binary with env isolation.
fn homescan_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("homescan");
    cmd.env("HOME", "/tmp/homescan-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/homescan-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("HOMESCAN_CONFIG_DIR")
        .env_remove("HOMESCAN_DATABASE")
        .env_remove("HOMESCAN_STATE_LOOKBACK_HOURS")
        .env_remove("HOMESCAN_AUTOMATION_FILES")
        .env_remove("HOMESCAN_DEFAULTS__OUTPUT")
        .env_remove("HOMESCAN_DEFAULTS__COLOR");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

/// A small installation: two areas, three devices (one in a missing area,
/// one without an area) and four entities.
fn installation(dir: &Path) {
    let storage = dir.join(".storage");
    std::fs::create_dir_all(&storage).unwrap();
    std::fs::write(
        storage.join("core.area_registry"),
        r#"{"data": {"areas": [
            {"id": "living_room", "name": "Living Room"},
            {"area_id": "kitchen", "name": "Kitchen"}
        ]}}"#,
    )
    .unwrap();
    std::fs::write(
        storage.join("core.device_registry"),
        r#"{"data": {"devices": [
            {"id": "dev1", "name": "Hue bridge", "name_by_user": "Sofa Lamps",
             "area_id": "living_room", "manufacturer": "Signify", "model": "BSB002"},
            {"id": "dev2", "name": "Door sensor", "area_id": "garage"},
            {"id": "dev3", "name": "Plug"}
        ]}}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("automations.yaml"),
        "- alias: Evening\n  action:\n    - service: light.turn_on\n      entity_id: light.lamp1\n    - service: switch.turn_off\n      entity_id: switch.fan\n",
    )
    .unwrap();

    let conn = Connection::open(dir.join("home-assistant_v2.db")).unwrap();
    conn.execute_batch(
        "CREATE TABLE states_meta (metadata_id INTEGER PRIMARY KEY, entity_id TEXT);
        CREATE TABLE state_attributes (attributes_id INTEGER PRIMARY KEY, shared_attrs TEXT);
        CREATE TABLE states (
            state_id INTEGER PRIMARY KEY,
            metadata_id INTEGER,
            attributes_id INTEGER,
            state TEXT,
            last_updated_ts FLOAT
        );
        INSERT INTO states_meta VALUES
            (1, 'light.lamp1'), (2, 'light.lamp2'), (3, 'sensor.temp'), (4, 'switch.fan');
        INSERT INTO state_attributes VALUES
            (10, '{\"device_id\": \"dev1\"}'),
            (11, '{\"device_id\": \"dev9\"}'),
            (12, '{\"friendly_name\": \"Fan\"}');
        INSERT INTO states (metadata_id, attributes_id, state, last_updated_ts) VALUES
            (1, 10, 'on', CAST(strftime('%s', 'now') AS REAL) - 60),
            (2, 10, 'off', CAST(strftime('%s', 'now') AS REAL) - 60),
            (3, 11, '21.5', CAST(strftime('%s', 'now') AS REAL) - 60),
            (4, 12, 'unavailable', CAST(strftime('%s', 'now') AS REAL) - 60);",
    )
    .unwrap();
}

fn plain_lines(dir: &Path, args: &[&str]) -> Vec<String> {
    let output = homescan_cmd()
        .arg("-C")
        .arg(dir)
        .args(["-o", "plain"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = homescan_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    homescan_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("areas")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("entities"))
            .and(predicate::str::contains("storage")),
    );
}

#[test]
fn test_version_flag() {
    homescan_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("homescan"));
}

#[test]
fn test_invalid_subcommand() {
    let output = homescan_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("foobar"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    homescan_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    homescan_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Scan ────────────────────────────────────────────────────────────

#[test]
fn test_scan_json_reports_graph_and_issues() {
    let dir = tempfile::tempdir().unwrap();
    installation(dir.path());

    let output = homescan_cmd()
        .arg("-C")
        .arg(dir.path())
        .args(["-o", "json", "scan"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let json = stdout_json(&output);

    let stats = &json["statistics"];
    assert_eq!(stats["totals"], serde_json::json!({"areas": 2, "devices": 3, "entities": 4}));
    assert_eq!(stats["orphan_devices"], serde_json::json!(["dev2"]));
    assert_eq!(stats["unassigned_devices"], serde_json::json!(["dev3"]));
    assert_eq!(stats["orphan_entities"], serde_json::json!(["sensor.temp"]));
    assert_eq!(stats["standalone_entities"], serde_json::json!(["switch.fan"]));
    assert_eq!(stats["unavailable_entities"], serde_json::json!(["switch.fan"]));

    let issues = json["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 2, "{issues:?}");
    assert!(issues.iter().all(|i| i["kind"] == "unresolved_reference"));
}

#[test]
fn test_scan_table_shows_area_map() {
    let dir = tempfile::tempdir().unwrap();
    installation(dir.path());

    homescan_cmd()
        .arg("-C")
        .arg(dir.path())
        .arg("scan")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Living Room (living_room)")
                .and(predicate::str::contains("Sofa Lamps [dev1]: 2 entities"))
                .and(predicate::str::contains("Kitchen (kitchen)"))
                .and(predicate::str::contains("Orphaned devices: 1"))
                .and(predicate::str::contains("Issues (2)")),
        );
}

#[test]
fn test_scan_of_empty_directory_reports_unavailable_sources() {
    let dir = tempfile::tempdir().unwrap();
    let output = homescan_cmd()
        .arg("-C")
        .arg(dir.path())
        .args(["-o", "json", "scan"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let json = stdout_json(&output);
    assert_eq!(json["statistics"]["totals"]["entities"], 0);
    let issues = json["issues"].as_array().unwrap();
    assert!(!issues.is_empty());
    assert!(issues.iter().all(|i| i["kind"] == "source_unavailable"));
}

// ── Listings ────────────────────────────────────────────────────────

#[test]
fn test_areas_plain() {
    let dir = tempfile::tempdir().unwrap();
    installation(dir.path());
    assert_eq!(plain_lines(dir.path(), &["areas"]), vec!["kitchen", "living_room"]);
}

#[test]
fn test_devices_filters() {
    let dir = tempfile::tempdir().unwrap();
    installation(dir.path());
    assert_eq!(plain_lines(dir.path(), &["devices"]), vec!["dev1", "dev2", "dev3"]);
    assert_eq!(plain_lines(dir.path(), &["devices", "--orphaned"]), vec!["dev2"]);
    assert_eq!(plain_lines(dir.path(), &["devices", "--unassigned"]), vec!["dev3"]);
}

#[test]
fn test_devices_orphaned_conflicts_with_unassigned() {
    let dir = tempfile::tempdir().unwrap();
    let output = homescan_cmd()
        .arg("-C")
        .arg(dir.path())
        .args(["devices", "--orphaned", "--unassigned"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_entities_filters() {
    let dir = tempfile::tempdir().unwrap();
    installation(dir.path());
    assert_eq!(
        plain_lines(dir.path(), &["entities", "--domain", "light"]),
        vec!["light.lamp1", "light.lamp2"]
    );
    assert_eq!(
        plain_lines(dir.path(), &["entities", "--referenced"]),
        vec!["light.lamp1", "switch.fan"]
    );
    assert_eq!(plain_lines(dir.path(), &["entities", "--orphaned"]), vec!["sensor.temp"]);
}

#[test]
fn test_stats_plain_groups_domains() {
    let dir = tempfile::tempdir().unwrap();
    installation(dir.path());
    assert_eq!(
        plain_lines(dir.path(), &["stats"]),
        vec!["light=2", "sensor=1", "switch=1"]
    );
}

// ── Storage ─────────────────────────────────────────────────────────

#[test]
fn test_storage_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let lsblk = dir.path().join("lsblk.json");
    std::fs::write(
        &lsblk,
        r#"{"blockdevices": [
            {"name": "mmcblk0", "size": "29.7G", "type": "disk", "mountpoint": null,
             "children": [
                {"name": "mmcblk0p1", "size": "256M", "type": "part", "mountpoint": "/boot", "fstype": "vfat"},
                {"name": "mmcblk0p2", "size": "29.5G", "type": "part", "mountpoint": "/", "fstype": "ext4"}
             ]},
            {"name": "nvme0n1", "size": "476.9G", "type": "disk", "mountpoint": null,
             "children": [
                {"name": "nvme0n1p1", "size": "476.9G", "type": "part", "mountpoint": "/mnt/nvme", "fstype": "ext4"}
             ]}
        ]}"#,
    )
    .unwrap();

    let output = homescan_cmd()
        .args(["-o", "json", "storage", "--from-file"])
        .arg(&lsblk)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let json = stdout_json(&output);

    let recs = json["recommendations"].as_array().unwrap();
    let nvme = recs.iter().find(|r| r["device"] == "nvme0n1p1").unwrap();
    assert_eq!(nvme["tier"], "very_high");
    assert!(nvme["recommended"].as_array().unwrap().contains(&Value::from("recorder_database")));
    let boot = recs.iter().find(|r| r["mountpoint"] == "/boot").unwrap();
    assert_eq!(boot["class"], "removable_flash");
    assert_eq!(json["assessment"]["advisories"], serde_json::json!(["removable_flash_present"]));
    assert!(json.get("migration_plan").is_none());
}

#[test]
fn test_storage_missing_file_is_not_found() {
    let output = homescan_cmd()
        .args(["storage", "--from-file", "/nonexistent/lsblk.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("not found"));
}

// ── Validate ────────────────────────────────────────────────────────

#[test]
fn test_validate_accepts_platform_tags() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("configuration.yaml");
    std::fs::write(
        &file,
        "automation: !include automations.yaml\nhttp:\n  api_password: !secret http_password\n",
    )
    .unwrap();

    homescan_cmd()
        .arg("-C")
        .arg(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("valid")
                .and(predicate::str::contains("automation: !include automations.yaml")),
        );
}

#[test]
fn test_validate_reports_broken_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.yaml");
    std::fs::write(&broken, "key: [unterminated\n").unwrap();

    let output = homescan_cmd()
        .args(["-o", "json", "validate"])
        .arg(&broken)
        .arg(dir.path().join("missing.yaml"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let json = stdout_json(&output);
    assert_eq!(json[0]["status"], "parse_error");
    assert_eq!(json[1]["status"], "missing");
    assert!(combined_output(&output).contains("2 of 2 configuration file(s) failed validation"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    homescan_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("homescan").and(predicate::str::contains("config.toml")));
}

#[test]
fn test_config_init_writes_then_requires_confirmation() {
    let home = tempfile::tempdir().unwrap();
    let init = || {
        let mut cmd = homescan_cmd();
        cmd.env("XDG_CONFIG_HOME", home.path())
            .args(["-C", "/srv/hass", "config", "init"]);
        cmd
    };

    init().arg("-y").assert().success();
    let written = std::fs::read_to_string(home.path().join("homescan/config.toml")).unwrap();
    assert!(written.contains("config_dir = \"/srv/hass\""), "{written}");

    // stdin is not a terminal, so overwriting without --yes is refused
    let output = init().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("requires confirmation"));
}

#[test]
fn test_config_show_reflects_flags() {
    homescan_cmd()
        .args(["-C", "/srv/hass", "--lookback-hours", "6", "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("config_dir = \"/srv/hass\"")
                .and(predicate::str::contains("state_lookback_hours = 6")),
        );
}

#[test]
fn test_invalid_config_file_fails_with_usage_code() {
    let home = tempfile::tempdir().unwrap();
    let cfg_dir = home.path().join("homescan");
    std::fs::create_dir_all(&cfg_dir).unwrap();
    std::fs::write(cfg_dir.join("config.toml"), "state_lookback_hours = 0\n").unwrap();

    let output = homescan_cmd()
        .env("XDG_CONFIG_HOME", home.path())
        .arg("stats")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("state_lookback_hours"));
}
