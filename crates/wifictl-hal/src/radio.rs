// ── Radio module control (vendor Wi-Fi HAL) ──

use crate::error::HalResult;
use crate::types::{CountryCode, IfaceMode, ModuleInfo};

/// The vendor chip/driver HAL.
///
/// Interface names are assigned here; callers never choose them.
pub trait RadioModule: Send + Sync {
    /// Obtain the HAL service and register for its notifications.
    fn init_hal_interface(&self) -> HalResult<()>;

    /// Load the driver module and bring the chip up.
    fn start_module(&self) -> HalResult<()>;

    /// Configure the chip for `mode` and create an interface, returning its name.
    fn configure_chip_and_create_iface(&self, mode: IfaceMode) -> HalResult<String>;

    /// Remove the interface created for `mode`. Tearing down a mode with no
    /// interface is not an error.
    fn teardown_iface(&self, mode: IfaceMode) -> HalResult<()>;

    /// Program the regulatory domain used by the AP interface.
    fn set_ap_country_code(&self, code: &CountryCode) -> HalResult<()>;

    fn capabilities(&self) -> HalResult<u32>;

    fn sta_capabilities(&self) -> HalResult<u32>;

    fn driver_module_info(&self) -> HalResult<ModuleInfo>;

    fn set_low_latency_mode(&self, enable: bool) -> HalResult<()>;
}
