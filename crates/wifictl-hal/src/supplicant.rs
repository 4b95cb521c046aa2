// ── Station-mode supplicant HAL client ──

use crate::error::HalResult;
use crate::event::{DeathHandler, EventCallback};
use crate::types::{DebugLevel, NetworkConfig};

/// Client of the station authentication daemon.
///
/// Initialization is asynchronous on the daemon side: after
/// [`init_interface`](Self::init_interface) the client becomes usable only
/// once [`is_interface_ready`](Self::is_interface_ready) reports `true`.
pub trait SupplicantClient: Send + Sync {
    fn init_interface(&self) -> HalResult<()>;

    fn deinit_interface(&self) -> HalResult<()>;

    fn is_interface_ready(&self) -> bool;

    fn is_interface_initializing(&self) -> bool;

    /// Bind the supplicant to a station interface.
    fn setup_sta_interface(&self, iface: &str) -> HalResult<()>;

    fn register_event_callback(&self, callback: EventCallback);

    fn register_death_handler(&self, handler: DeathHandler);

    fn unregister_death_handler(&self);

    fn mac_address(&self) -> HalResult<String>;

    fn connect_to_network(&self, config: &NetworkConfig) -> HalResult<()>;

    fn reconnect(&self) -> HalResult<()>;

    fn reassociate(&self) -> HalResult<()>;

    fn disconnect(&self) -> HalResult<()>;

    fn remove_networks(&self) -> HalResult<()>;

    fn set_power_save(&self, enable: bool) -> HalResult<()>;

    fn set_suspend_mode(&self, enable: bool) -> HalResult<()>;

    fn set_country_code(&self, code: &str) -> HalResult<()>;

    fn debug_level(&self) -> HalResult<DebugLevel>;

    fn set_debug_level(&self, level: &DebugLevel) -> HalResult<()>;
}
