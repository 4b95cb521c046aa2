// ── Command API ──
//
// Everything the outside world can ask of the Wi-Fi stack flows through a
// closed `Command` enum. Each command produces one `WifiResult` carrying
// the caller's id, a status code, and whichever outputs the command fills.

use serde::Serialize;
use tokio::sync::oneshot;
use wifictl_hal::{DebugLevel, NetworkConfig, ResultCode, ScanResult, ScanSettings, SoftapConfig};

use crate::error::CoreError;

/// A command envelope sent through the command channel.
pub(crate) struct CommandEnvelope {
    pub id: u64,
    pub command: Command,
    pub response_tx: oneshot::Sender<WifiResult>,
}

/// All operations the controller accepts.
#[derive(Debug, Clone, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    // ── Bring-up and module info ─────────────────────────────────────
    Initialize,
    GetModuleVersion,
    GetCapabilities,
    GetStaCapabilities,
    SetLowLatencyMode {
        enable: bool,
    },

    // ── Station mode ─────────────────────────────────────────────────
    StartWifi,
    StopWifi,
    GetMacAddress,
    GetStaIface,
    GetDebugLevel,
    SetDebugLevel {
        level: DebugLevel,
    },
    SetPowerSave {
        enable: bool,
    },
    SetSuspendMode {
        enable: bool,
    },
    SetCountryCode {
        code: String,
    },

    // ── Scanning ─────────────────────────────────────────────────────
    StartSingleScan {
        settings: ScanSettings,
    },
    StopSingleScan,
    GetScanResults,
    GetChannelsForBand {
        band_mask: u32,
    },

    // ── Association ──────────────────────────────────────────────────
    Connect {
        network: NetworkConfig,
    },
    Reconnect,
    Reassociate,
    Disconnect,
    RemoveNetworks,

    // ── Access-point mode ────────────────────────────────────────────
    #[strum(serialize = "START_SOFTAP")]
    StartSoftAp {
        config: Box<SoftapConfig>,
    },
    #[strum(serialize = "STOP_SOFTAP")]
    StopSoftAp,
    GetApIface,
    #[strum(serialize = "GET_SOFTAP_STATION_NUMBER")]
    GetSoftapStationNumber,
}

impl Command {
    /// Stable upper-case name, e.g. `START_WIFI`.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Whether the command changes mode state, as opposed to a query.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::Initialize
                | Self::StartWifi
                | Self::StopWifi
                | Self::StartSoftAp { .. }
                | Self::StopSoftAp
        )
    }
}

/// Outcome of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WifiResult {
    pub id: u64,
    pub status: ResultCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sta_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ap_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sta_capabilities: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_level: Option<DebugLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_results: Option<Vec<ScanResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_stations: Option<u32>,
}

impl WifiResult {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Record `err` as the outcome, keeping outputs filled so far.
    pub fn fail(mut self, err: &CoreError) -> Self {
        self.status = err.status();
        self.error = Some(err.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use wifictl_hal::IfaceMode;

    use super::*;

    #[test]
    fn command_names_are_stable() {
        assert_eq!(Command::StartWifi.name(), "START_WIFI");
        assert_eq!(Command::StopSoftAp.name(), "STOP_SOFTAP");
        assert_eq!(Command::GetSoftapStationNumber.name(), "GET_SOFTAP_STATION_NUMBER");
        assert_eq!(
            Command::GetChannelsForBand { band_mask: 1 }.name(),
            "GET_CHANNELS_FOR_BAND"
        );
        assert!(Command::StopWifi.is_lifecycle());
        assert!(!Command::GetStaIface.is_lifecycle());
    }

    #[test]
    fn failure_keeps_id_and_outputs() {
        let mut result = WifiResult::new(7);
        result.sta_interface = Some("wlan0".into());
        let result = result.fail(&CoreError::NoInterface {
            mode: IfaceMode::Ap,
        });

        assert_eq!(result.id, 7);
        assert_eq!(result.status, ResultCode::ErrorUnknown);
        assert_eq!(result.sta_interface.as_deref(), Some("wlan0"));
        assert_eq!(result.error.as_deref(), Some("No ap interface is active"));
    }

    #[test]
    fn empty_outputs_are_not_serialized() {
        let json = serde_json::to_value(WifiResult::new(1)).unwrap_or_default();
        assert_eq!(json, serde_json::json!({ "id": 1, "status": "SUCCESS" }));
    }
}
