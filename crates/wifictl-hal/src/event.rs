// ── Hardware-origin events and the callback seams that carry them ──

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::Daemon;

/// Supplicant association state, as reported by the station HAL client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SupplicantState {
    Disconnected,
    InterfaceDisabled,
    Inactive,
    Scanning,
    Authenticating,
    Associating,
    Associated,
    FourWayHandshake,
    GroupHandshake,
    Completed,
}

/// An event delivered upward to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WifiEvent {
    ScanResultReady {
        iface: String,
    },
    ScanResultFailed {
        iface: String,
    },
    SupplicantStateChanged {
        iface: String,
        state: SupplicantState,
        bssid: Option<String>,
        ssid: Option<String>,
        network_id: Option<i32>,
    },
    Disconnected {
        iface: String,
        bssid: String,
        locally_generated: bool,
        reason: u32,
    },
    HotspotClientChanged {
        iface: String,
        num_stations: u32,
    },
    HotspotChannelSwitched {
        iface: String,
        frequency: u32,
        bandwidth: u32,
    },
    DaemonDied {
        daemon: Daemon,
    },
}

impl WifiEvent {
    /// Interface the event belongs to, if any.
    pub fn iface(&self) -> Option<&str> {
        match self {
            Self::ScanResultReady { iface }
            | Self::ScanResultFailed { iface }
            | Self::SupplicantStateChanged { iface, .. }
            | Self::Disconnected { iface, .. }
            | Self::HotspotClientChanged { iface, .. }
            | Self::HotspotChannelSwitched { iface, .. } => Some(iface),
            Self::DaemonDied { .. } => None,
        }
    }
}

/// The process-wide event callback. Registered once and shared by every
/// per-interface listener.
pub type EventCallback = Arc<dyn Fn(WifiEvent) + Send + Sync>;

/// Invoked by a HAL client when the daemon behind it exits unexpectedly.
pub type DeathHandler = Arc<dyn Fn() + Send + Sync>;

/// Receiver for link-layer daemon events on a single interface.
///
/// The daemon holds this as a weak association: it is handed over when the
/// interface is set up and dropped when the interface is torn down.
pub trait IfaceEventListener: Send + Sync {
    fn iface(&self) -> &str;

    fn on_event(&self, event: WifiEvent);
}
