// ── Value types shared across the HAL contracts ──

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ResultCode};

/// Operating mode of a network interface.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IfaceMode {
    /// Station (client) mode.
    Sta,
    /// Access-point (hotspot) mode.
    Ap,
}

/// The two daemons whose lifecycle is tracked by a session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Daemon {
    Supplicant,
    Hostapd,
}

impl Daemon {
    /// The interface mode this daemon serves.
    pub fn mode(self) -> IfaceMode {
        match self {
            Self::Supplicant => IfaceMode::Sta,
            Self::Hostapd => IfaceMode::Ap,
        }
    }
}

/// ISO 3166-1 alpha-2 regulatory domain, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(Error::Status(ResultCode::ErrorInvalidArgs))
        }
    }
}

impl TryFrom<String> for CountryCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Band {
    #[default]
    #[serde(rename = "2.4ghz")]
    #[strum(serialize = "2.4ghz")]
    TwoPointFourGhz,
    #[serde(rename = "5ghz")]
    #[strum(serialize = "5ghz")]
    FiveGhz,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SecurityType {
    Open,
    #[default]
    Wpa2Psk,
    Wpa3Sae,
}

/// Access-point configuration handed to hostapd.
#[derive(Debug, Clone, Deserialize)]
pub struct SoftapConfig {
    pub ssid: String,
    #[serde(default, deserialize_with = "secret_opt")]
    pub passphrase: Option<SecretString>,
    pub country_code: CountryCode,
    #[serde(default)]
    pub band: Band,
    /// 0 lets the driver pick (ACS).
    #[serde(default)]
    pub channel: u32,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub security: SecurityType,
}

impl SoftapConfig {
    /// WPA2 network on 2.4 GHz with the driver picking the channel.
    pub fn new(ssid: impl Into<String>, country_code: CountryCode) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: None,
            country_code,
            band: Band::default(),
            channel: 0,
            hidden: false,
            security: SecurityType::default(),
        }
    }
}

/// Station network to associate with.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub ssid: String,
    pub bssid: Option<String>,
    #[serde(default, deserialize_with = "secret_opt")]
    pub psk: Option<SecretString>,
    #[serde(default)]
    pub hidden: bool,
}

impl NetworkConfig {
    pub fn open(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: None,
            psk: None,
            hidden: false,
        }
    }
}

/// Parameters of a one-shot scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Frequencies in MHz; empty means all supported channels.
    #[serde(default)]
    pub frequencies: Vec<u32>,
    /// Hidden SSIDs to probe for.
    #[serde(default)]
    pub hidden_networks: Vec<String>,
}

/// One BSS reported by the link-layer daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub ssid: String,
    pub bssid: String,
    pub frequency: u32,
    pub tsf: u64,
    pub capability: u32,
    /// Signal strength in mBm.
    pub signal_mbm: i32,
    pub associated: bool,
    #[serde(default)]
    pub info_element: Vec<u8>,
}

/// Driver and firmware versions of the radio module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub driver_version: String,
    pub firmware_version: String,
}

/// Supplicant logging configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebugLevel {
    pub level: u32,
    pub show_timestamp: bool,
    pub show_keys: bool,
}

fn secret_opt<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_code_is_normalized() {
        let code: CountryCode = " us ".parse().expect("valid code");
        assert_eq!(code.as_str(), "US");
    }

    #[test]
    fn country_code_rejects_garbage() {
        assert!("USA".parse::<CountryCode>().is_err());
        assert!("1A".parse::<CountryCode>().is_err());
        assert!("".parse::<CountryCode>().is_err());
    }

    #[test]
    fn iface_mode_round_trips_through_text() {
        assert_eq!(IfaceMode::Sta.to_string(), "sta");
        assert_eq!("ap".parse::<IfaceMode>().ok(), Some(IfaceMode::Ap));
        assert_eq!(Daemon::Hostapd.mode(), IfaceMode::Ap);
    }

    #[test]
    fn softap_config_reads_secret_passphrase() {
        use secrecy::ExposeSecret;

        let config: SoftapConfig = serde_json::from_str(
            r#"{"ssid":"lab","passphrase":"hunter22","country_code":"de","band":"5ghz"}"#,
        )
        .expect("valid config");
        assert_eq!(config.country_code.as_str(), "DE");
        assert_eq!(config.band, Band::FiveGhz);
        assert_eq!(config.security, SecurityType::Wpa2Psk);
        assert_eq!(
            config.passphrase.as_ref().map(|p| p.expose_secret()),
            Some("hunter22")
        );
    }
}
