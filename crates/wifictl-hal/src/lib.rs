// ── Wi-Fi HAL contracts ──
//
// Traits describing the hardware-facing services the orchestration layer
// drives: the vendor radio module, the link-layer daemon, and the station
// and access-point HAL clients. `sim` provides an in-memory implementation
// of all of them for tests and the command-line tool.

pub mod error;
pub mod event;
pub mod hostapd;
pub mod radio;
pub mod ril;
pub mod sim;
pub mod supplicant;
pub mod types;
pub mod wificond;

pub use error::{Error, HalResult, ResultCode};
pub use event::{DeathHandler, EventCallback, IfaceEventListener, SupplicantState, WifiEvent};
pub use hostapd::HostapdClient;
pub use radio::RadioModule;
pub use ril::{IndicationType, RadioAck, ResponseType};
pub use sim::{HalCall, HalOp, SimHal, SimHalBuilder};
pub use supplicant::SupplicantClient;
pub use types::{
    Band, CountryCode, Daemon, DebugLevel, IfaceMode, ModuleInfo, NetworkConfig, ScanResult,
    ScanSettings, SecurityType, SoftapConfig,
};
pub use wificond::LinkLayerDaemon;
