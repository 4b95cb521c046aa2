//! Integration tests for the `wifictl` CLI binary.
//!
//! Every invocation runs against the simulated HAL, so these cover the
//! whole path from argument parsing to the orchestrator and back.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `wifictl` binary with env isolation.
///
/// Points HOME and the config file at a scratch directory and clears the
/// `WIFICTL_*` overrides a developer might have exported.
fn wifictl_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("wifictl");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("WIFICTL_CONFIG", home.path().join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("WIFICTL_DEFAULTS__OUTPUT")
        .env_remove("WIFICTL_ORCHESTRATOR__POLL_INTERVAL_MS")
        .env_remove("WIFICTL_ORCHESTRATOR__POLL_MAX_TRIES")
        .env_remove("WIFICTL_ORCHESTRATOR__ROLLBACK");
    cmd
}

fn write_config(home: &TempDir, body: &str) {
    std::fs::write(home.path().join("config.toml"), body).unwrap();
}

fn json_of(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = wifictl_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "Expected usage text:\n{stderr}");
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    wifictl_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("start-wifi")
            .and(predicate::str::contains("start-softap"))
            .and(predicate::str::contains("run")),
    );
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    wifictl_cmd(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Station mode ────────────────────────────────────────────────────

#[test]
fn test_start_wifi_plain_prints_interface() {
    let home = TempDir::new().unwrap();
    wifictl_cmd(&home)
        .args(["start-wifi", "--output", "plain"])
        .assert()
        .success()
        .stdout("wlan0\n");
}

#[test]
fn test_start_wifi_json() {
    let home = TempDir::new().unwrap();
    let output = wifictl_cmd(&home)
        .args(["start-wifi", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_of(&output);
    assert_eq!(json["command"], "START_WIFI");
    assert_eq!(json["status"], "SUCCESS");
    assert_eq!(json["sta_interface"], "wlan0");
    assert_eq!(json["id"], 1);
}

#[test]
fn test_interface_name_comes_from_config() {
    let home = TempDir::new().unwrap();
    write_config(&home, "[simulator]\nsta_iface = \"wlp2s0\"\n");
    wifictl_cmd(&home)
        .args(["start-wifi", "-o", "plain"])
        .assert()
        .success()
        .stdout("wlp2s0\n");
}

#[test]
fn test_registration_failure_is_rolled_back() {
    let home = TempDir::new().unwrap();
    let output = wifictl_cmd(&home)
        .args(["start-wifi", "-o", "json", "--trace", "--fail", "setup-client-iface"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let json = json_of(&output);
    assert_eq!(json["status"], "ERROR_COMMAND_FAILED");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("teardown-client-iface"), "trace:\n{stderr}");
    assert!(!stderr.contains("setup-sta-interface"), "trace:\n{stderr}");
    assert!(stderr.contains("wifictl::command_failed"), "report:\n{stderr}");
}

#[test]
fn test_supplicant_timeout_reports_unknown() {
    let home = TempDir::new().unwrap();
    let output = wifictl_cmd(&home)
        .env("WIFICTL_ORCHESTRATOR__POLL_INTERVAL_MS", "1")
        .env("WIFICTL_ORCHESTRATOR__POLL_MAX_TRIES", "3")
        .args(["start-wifi", "-o", "json", "--supplicant-ready-after", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let json = json_of(&output);
    assert_eq!(json["status"], "ERROR_UNKNOWN");
    assert_eq!(json["error"], "supplicant did not become ready after 3 checks");
}

#[test]
fn test_stop_wifi_with_nothing_active_succeeds() {
    let home = TempDir::new().unwrap();
    wifictl_cmd(&home)
        .args(["stop-wifi", "-o", "plain"])
        .assert()
        .success()
        .stdout("SUCCESS\n");
}

// ── Run ─────────────────────────────────────────────────────────────

#[test]
fn test_run_up_and_down() {
    let home = TempDir::new().unwrap();
    let output = wifictl_cmd(&home)
        .args(["-o", "json", "run", "start-wifi", "status", "stop-wifi", "status"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_of(&output);
    let steps = json.as_array().unwrap();
    assert_eq!(steps.len(), 4);
    assert_eq!(steps[1]["kind"], "status");
    assert_eq!(steps[1]["sta"]["name"], "wlan0");
    assert_eq!(steps[1]["supplicant"], "READY");
    assert_eq!(steps[2]["id"], 2);
    assert!(steps[3]["sta"].is_null());
    assert_eq!(steps[3]["supplicant"], "STOPPED");
}

#[test]
fn test_run_stops_at_first_failure() {
    let home = TempDir::new().unwrap();
    let output = wifictl_cmd(&home)
        .args(["-o", "json", "run", "sta-iface", "start-wifi"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let json = json_of(&output);
    let steps = json.as_array().unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["command"], "GET_STA_IFACE");
    assert_eq!(steps[0]["status"], "ERROR_UNKNOWN");
}

#[test]
fn test_run_daemon_death_is_visible_in_status() {
    let home = TempDir::new().unwrap();
    let output = wifictl_cmd(&home)
        .args(["-o", "json", "run", "start-wifi", "kill-supplicant", "status"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_of(&output);
    assert_eq!(json[1]["kind"], "killed");
    assert_eq!(json[1]["notified"], true);
    assert_eq!(json[2]["supplicant"], "STOPPED");
    assert_eq!(json[2]["sta"]["name"], "wlan0");
}

// ── Softap ──────────────────────────────────────────────────────────

#[test]
fn test_start_softap_with_overrides() {
    let home = TempDir::new().unwrap();
    let output = wifictl_cmd(&home)
        .args(["start-softap", "--ssid", "lab", "--country", "de", "-o", "plain", "--trace"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "wlan1\n");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let setup = stderr.find("setup-ap-iface").unwrap();
    let country = stderr.find("set-ap-country-code(DE)").unwrap();
    let start = stderr.find("start-softap").unwrap();
    assert!(setup < country && country < start, "trace:\n{stderr}");
}

#[test]
fn test_softap_requires_passphrase_when_secured() {
    let home = TempDir::new().unwrap();
    write_config(&home, "[softap]\nsecurity = \"wpa2-psk\"\n");
    wifictl_cmd(&home)
        .arg("start-softap")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("softap.passphrase"));
}

// ── Queries ─────────────────────────────────────────────────────────

#[test]
fn test_caps_table() {
    let home = TempDir::new().unwrap();
    wifictl_cmd(&home)
        .arg("caps")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("GET_MODULE_VERSION")
                .and(predicate::str::contains("driver=sim-driver-1.0"))
                .and(predicate::str::contains("capabilities=0x1f3b")),
        );
}

#[test]
fn test_scan_lists_band_channels() {
    let home = TempDir::new().unwrap();
    wifictl_cmd(&home)
        .args(["scan", "--band-mask", "2", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5180").and(predicate::str::contains("5240")));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_unknown_fault_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    wifictl_cmd(&home)
        .args(["start-wifi", "--fail", "warp-drive"])
        .assert()
        .code(2)
        .stderr(
            predicate::str::contains("warp-drive")
                .and(predicate::str::contains("setup-client-iface")),
        );
}

#[test]
fn test_bad_output_default_in_config() {
    let home = TempDir::new().unwrap();
    write_config(&home, "[defaults]\noutput = \"yaml\"\n");
    wifictl_cmd(&home)
        .arg("status")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("defaults.output"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_env() {
    let home = TempDir::new().unwrap();
    let expected = home.path().join("config.toml");
    wifictl_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(format!("{}\n", expected.display()));
}

#[test]
fn test_config_show_merges_file() {
    let home = TempDir::new().unwrap();
    write_config(&home, "[orchestrator]\npoll_max_tries = 7\n");
    wifictl_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("poll_max_tries = 7")
                .and(predicate::str::contains("poll_interval_ms = 100")),
        );
}
