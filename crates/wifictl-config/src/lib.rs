//! Configuration for wifictl.
//!
//! Layered TOML + environment loading, validation, and translation into
//! `wifictl_core` and `wifictl_hal` types. The CLI adds flag overrides on
//! top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wifictl_core::{OrchestratorConfig, RollbackPolicy};
use wifictl_hal::{Band, CountryCode, HalOp, SecurityType, SimHal, SimHalBuilder, SoftapConfig};

/// Prefix of environment overrides. `__` separates nested keys, e.g.
/// `WIFICTL_ORCHESTRATOR__POLL_MAX_TRIES=10`.
pub const ENV_PREFIX: &str = "WIFICTL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub orchestrator: OrchestratorSection,

    #[serde(default)]
    pub softap: SoftapSection,

    #[serde(default)]
    pub simulator: SimulatorSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// Output format: "table", "json" or "plain".
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrchestratorSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_poll_max_tries")]
    pub poll_max_tries: u32,

    #[serde(default)]
    pub rollback: RollbackPolicy,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_tries: default_poll_max_tries(),
            rollback: RollbackPolicy::default(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}
fn default_poll_max_tries() -> u32 {
    50
}

/// Access point brought up by `start-softap`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SoftapSection {
    #[serde(default = "default_ssid")]
    pub ssid: String,

    /// Passphrase (plaintext, prefer `passphrase_env`).
    pub passphrase: Option<String>,

    /// Environment variable holding the passphrase.
    pub passphrase_env: Option<String>,

    #[serde(default = "default_country_code")]
    pub country_code: String,

    #[serde(default)]
    pub band: Band,

    /// 0 lets the driver choose.
    #[serde(default)]
    pub channel: u32,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default = "default_security")]
    pub security: SecurityType,
}

impl Default for SoftapSection {
    fn default() -> Self {
        Self {
            ssid: default_ssid(),
            passphrase: None,
            passphrase_env: None,
            country_code: default_country_code(),
            band: Band::default(),
            channel: 0,
            hidden: false,
            security: default_security(),
        }
    }
}

fn default_ssid() -> String {
    "wifictl".into()
}
fn default_country_code() -> String {
    "US".into()
}
fn default_security() -> SecurityType {
    SecurityType::Open
}

/// Behaviour of the simulated HAL driven by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimulatorSection {
    #[serde(default = "default_sta_iface")]
    pub sta_iface: String,

    #[serde(default = "default_ap_iface")]
    pub ap_iface: String,

    /// Readiness checks until the supplicant is ready; 0 means never.
    #[serde(default = "default_ready_after")]
    pub supplicant_ready_after: u32,

    #[serde(default = "default_ready_after")]
    pub hostapd_ready_after: u32,

    /// HAL operations that fail, by kebab-case name.
    #[serde(default)]
    pub faults: Vec<String>,
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self {
            sta_iface: default_sta_iface(),
            ap_iface: default_ap_iface(),
            supplicant_ready_after: default_ready_after(),
            hostapd_ready_after: default_ready_after(),
            faults: Vec::new(),
        }
    }
}

fn default_sta_iface() -> String {
    "wlan0".into()
}
fn default_ap_iface() -> String {
    "wlan1".into()
}
fn default_ready_after() -> u32 {
    1
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "wifictl", "wifictl").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("wifictl");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file (`path` or the platform default), then
/// `WIFICTL_*` environment variables.
pub fn figment(path: Option<&Path>) -> Figment {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    Ok(config)
}

impl Config {
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn orchestrator_config(&self) -> Result<OrchestratorConfig, ConfigError> {
        let section = &self.orchestrator;
        if section.poll_interval_ms == 0 {
            return Err(invalid("orchestrator.poll_interval_ms", "must be greater than 0"));
        }
        if section.poll_max_tries == 0 {
            return Err(invalid("orchestrator.poll_max_tries", "must be greater than 0"));
        }
        Ok(OrchestratorConfig {
            poll_interval: Duration::from_millis(section.poll_interval_ms),
            poll_max_tries: section.poll_max_tries,
            rollback: section.rollback,
        })
    }

    pub fn softap_config(&self) -> Result<SoftapConfig, ConfigError> {
        let section = &self.softap;

        if section.ssid.is_empty() || section.ssid.len() > 32 {
            return Err(invalid("softap.ssid", "must be 1 to 32 bytes"));
        }

        let country_code: CountryCode = section.country_code.parse().map_err(|_| {
            invalid(
                "softap.country_code",
                format!("{:?} is not two letters", section.country_code),
            )
        })?;

        let passphrase = resolve_passphrase(section);
        match (section.security, &passphrase) {
            (SecurityType::Open, _) => {}
            (_, None) => {
                return Err(invalid(
                    "softap.passphrase",
                    format!("required for {}", section.security),
                ));
            }
            (_, Some(p)) if !(8..=63).contains(&p.len()) => {
                return Err(invalid("softap.passphrase", "must be 8 to 63 characters"));
            }
            (_, Some(_)) => {}
        }

        Ok(SoftapConfig {
            ssid: section.ssid.clone(),
            passphrase: passphrase.map(SecretString::from),
            country_code,
            band: section.band,
            channel: section.channel,
            hidden: section.hidden,
            security: section.security,
        })
    }

    /// Simulator preconfigured from `[simulator]` plus `extra_faults`.
    pub fn simulator_builder<'a>(
        &self,
        extra_faults: impl IntoIterator<Item = &'a str>,
    ) -> Result<SimHalBuilder, ConfigError> {
        let section = &self.simulator;
        let ready = |n: u32| (n > 0).then_some(n);

        let mut builder = SimHal::builder()
            .sta_iface(section.sta_iface.clone())
            .ap_iface(section.ap_iface.clone())
            .supplicant_ready_after(ready(section.supplicant_ready_after))
            .hostapd_ready_after(ready(section.hostapd_ready_after));

        let names = section.faults.iter().map(String::as_str).chain(extra_faults.into_iter().map(|s| -> &str { s }));
        for name in names {
            let op: HalOp = name.parse().map_err(|_| {
                invalid(
                    "simulator.faults",
                    format!("unknown HAL operation {name:?}"),
                )
            })?;
            builder = builder.fail(op);
        }
        Ok(builder)
    }
}

fn resolve_passphrase(section: &SoftapSection) -> Option<String> {
    section
        .passphrase_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
        .or_else(|| section.passphrase.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_translate_to_core_defaults() {
        let config = Config::default();
        assert_eq!(
            config.orchestrator_config().unwrap(),
            OrchestratorConfig::default()
        );
        let softap = config.softap_config().unwrap();
        assert_eq!(softap.ssid, "wifictl");
        assert_eq!(softap.country_code.as_str(), "US");
        assert!(softap.passphrase.is_none());
    }

    #[test]
    fn secured_softap_needs_a_passphrase() {
        let mut config = Config::default();
        config.softap.security = SecurityType::Wpa2Psk;
        let err = config.softap_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "softap.passphrase"));

        config.softap.passphrase = Some("short".into());
        assert!(config.softap_config().is_err());

        config.softap.passphrase = Some("long enough".into());
        assert!(config.softap_config().unwrap().passphrase.is_some());
    }

    #[test]
    fn zero_ready_after_means_never() {
        let mut config = Config::default();
        config.simulator.supplicant_ready_after = 0;
        assert!(config.simulator_builder([]).is_ok());
    }

    #[test]
    fn unknown_fault_names_are_rejected() {
        let config = Config::default();
        let err = config.simulator_builder(["warp-drive"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid simulator.faults: unknown HAL operation \"warp-drive\""
        );
    }
}
