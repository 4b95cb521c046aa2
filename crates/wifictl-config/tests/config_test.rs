#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::time::Duration;

use pretty_assertions::assert_eq;
use wifictl_config::{Config, ConfigError, load_config};
use wifictl_core::RollbackPolicy;
use wifictl_hal::{Band, SecurityType};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn file_overrides_only_what_it_names() {
    let file = write_config(
        r#"
[orchestrator]
poll_interval_ms = 20
rollback = "unwind"

[softap]
ssid = "bench"
country_code = "jp"
band = "5ghz"
security = "wpa3-sae"
passphrase = "correct horse"

[simulator]
supplicant_ready_after = 4
faults = ["start-softap"]
"#,
    );

    let config = load_config(Some(file.path())).unwrap();

    let orchestrator = config.orchestrator_config().unwrap();
    assert_eq!(orchestrator.poll_interval, Duration::from_millis(20));
    assert_eq!(orchestrator.poll_max_tries, 50);
    assert_eq!(orchestrator.rollback, RollbackPolicy::Unwind);

    let softap = config.softap_config().unwrap();
    assert_eq!(softap.ssid, "bench");
    assert_eq!(softap.country_code.as_str(), "JP");
    assert_eq!(softap.band, Band::FiveGhz);
    assert_eq!(softap.security, SecurityType::Wpa3Sae);

    assert_eq!(config.simulator.sta_iface, "wlan0");
    assert_eq!(config.simulator.supplicant_ready_after, 4);
    assert!(config.simulator_builder([]).is_ok());
}

#[test]
fn wrong_types_fail_to_load() {
    let file = write_config("[orchestrator]\npoll_max_tries = \"lots\"\n");
    let err = load_config(Some(file.path())).unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)));
}

#[test]
fn validation_names_the_field() {
    let file = write_config("[orchestrator]\npoll_interval_ms = 0\n\n[softap]\ncountry_code = \"usa\"\n");
    let config = load_config(Some(file.path())).unwrap();

    let err = config.orchestrator_config().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid orchestrator.poll_interval_ms: must be greater than 0"
    );
    let err = config.softap_config().unwrap_err();
    assert!(err.to_string().starts_with("invalid softap.country_code"));
}

#[test]
fn rendered_toml_loads_back() {
    let mut config = Config::default();
    config.softap.ssid = "round".into();
    config.orchestrator.rollback = RollbackPolicy::Unwind;

    let file = write_config(&config.to_toml().unwrap());
    assert_eq!(load_config(Some(file.path())).unwrap(), config);
}
