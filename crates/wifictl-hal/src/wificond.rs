// ── Link-layer scan / AP daemon (wificond) ──

use std::sync::Arc;

use crate::error::HalResult;
use crate::event::IfaceEventListener;
use crate::types::{ScanResult, ScanSettings};

/// The OS service mediating scan and AP interface setup between the
/// kernel driver and the HAL clients.
pub trait LinkLayerDaemon: Send + Sync {
    fn init(&self) -> HalResult<()>;

    fn setup_client_iface(
        &self,
        iface: &str,
        listener: Arc<dyn IfaceEventListener>,
    ) -> HalResult<()>;

    fn teardown_client_iface(&self, iface: &str) -> HalResult<()>;

    fn setup_ap_iface(&self, iface: &str, listener: Arc<dyn IfaceEventListener>)
    -> HalResult<()>;

    fn teardown_ap_iface(&self, iface: &str) -> HalResult<()>;

    /// Ask the daemon to spawn the supplicant process.
    fn start_supplicant(&self) -> HalResult<()>;

    fn stop_supplicant(&self) -> HalResult<()>;

    fn start_single_scan(&self, settings: &ScanSettings) -> HalResult<()>;

    fn stop_single_scan(&self) -> HalResult<()>;

    fn scan_results(&self) -> HalResult<Vec<ScanResult>>;

    fn channels_for_band(&self, band_mask: u32) -> HalResult<Vec<i32>>;

    /// Number of stations associated with the active softap.
    fn softap_station_count(&self) -> HalResult<u32>;
}
