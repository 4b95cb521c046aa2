// ── Access-point-mode hostapd HAL client ──

use crate::error::HalResult;
use crate::event::DeathHandler;
use crate::types::{CountryCode, SoftapConfig};

/// Client of the access-point daemon. The daemon is started lazily when the
/// HAL client is initialized.
pub trait HostapdClient: Send + Sync {
    fn init_interface(&self) -> HalResult<()>;

    fn deinit_interface(&self) -> HalResult<()>;

    fn is_interface_ready(&self) -> bool;

    fn start_softap(
        &self,
        iface: &str,
        country_code: &CountryCode,
        config: &SoftapConfig,
    ) -> HalResult<()>;

    fn stop_softap(&self, iface: &str) -> HalResult<()>;

    fn register_death_handler(&self, handler: DeathHandler);

    fn unregister_death_handler(&self);
}
