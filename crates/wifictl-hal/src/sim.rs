// ── In-memory simulated HAL ──
//
// A single object implementing every HAL contract. It keeps just enough
// state to behave like the real stack (module load, interfaces, daemon
// lifecycles, asynchronous readiness) and records every call so that tests
// can assert on ordering. Faults can be injected per operation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::{Error, HalResult, ResultCode};
use crate::event::{DeathHandler, EventCallback, IfaceEventListener, WifiEvent};
use crate::hostapd::HostapdClient;
use crate::radio::RadioModule;
use crate::ril::RadioAck;
use crate::supplicant::SupplicantClient;
use crate::types::{
    CountryCode, Daemon, DebugLevel, IfaceMode, ModuleInfo, NetworkConfig, ScanResult,
    ScanSettings, SoftapConfig,
};
use crate::wificond::LinkLayerDaemon;

/// Every operation the simulator records and can be told to fail.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "kebab-case")]
pub enum HalOp {
    // radio module
    InitHal,
    StartModule,
    ConfigureChip,
    TeardownIface,
    SetApCountryCode,
    Capabilities,
    StaCapabilities,
    DriverModuleInfo,
    SetLowLatencyMode,
    // link-layer daemon
    WificondInit,
    SetupClientIface,
    TeardownClientIface,
    SetupApIface,
    TeardownApIface,
    StartSupplicant,
    StopSupplicant,
    StartSingleScan,
    StopSingleScan,
    ScanResults,
    ChannelsForBand,
    SoftapStationCount,
    // supplicant client
    SupplicantInit,
    SupplicantDeinit,
    SetupStaInterface,
    RegisterEventCallback,
    RegisterSupplicantDeath,
    UnregisterSupplicantDeath,
    MacAddress,
    Connect,
    Reconnect,
    Reassociate,
    Disconnect,
    RemoveNetworks,
    SetPowerSave,
    SetSuspendMode,
    SetCountryCode,
    GetDebugLevel,
    SetDebugLevel,
    // hostapd client
    HostapdInit,
    HostapdDeinit,
    StartSoftap,
    StopSoftap,
    RegisterHostapdDeath,
    UnregisterHostapdDeath,
    // radio acknowledgement
    Ack,
}

/// One recorded HAL invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalCall {
    pub op: HalOp,
    pub arg: Option<String>,
}

#[derive(Default)]
struct DaemonState {
    initialized: bool,
    running: bool,
    checks: u32,
    ready_after: Option<u32>,
    death: Option<DeathHandler>,
}

impl DaemonState {
    fn ready_now(&self) -> bool {
        self.initialized && self.running && self.ready_after.is_some_and(|n| self.checks >= n)
    }

    fn reset(&mut self) {
        self.initialized = false;
        self.running = false;
        self.checks = 0;
    }
}

struct SimState {
    calls: Vec<HalCall>,
    faults: HashMap<HalOp, ResultCode>,
    iface_names: HashMap<IfaceMode, String>,
    module_loaded: bool,
    ifaces: HashMap<IfaceMode, String>,
    client_listeners: HashMap<String, Arc<dyn IfaceEventListener>>,
    ap_listeners: HashMap<String, Arc<dyn IfaceEventListener>>,
    supplicant: DaemonState,
    hostapd: DaemonState,
    event_callback: Option<EventCallback>,
    sta_bound: Option<String>,
    softap_iface: Option<String>,
    country_code: Option<CountryCode>,
    scanning: bool,
    scan_results: Vec<ScanResult>,
    stations: u32,
    mac: String,
    debug_level: DebugLevel,
}

/// Builder for [`SimHal`].
#[derive(Debug)]
pub struct SimHalBuilder {
    sta_iface: String,
    ap_iface: String,
    supplicant_ready_after: Option<u32>,
    hostapd_ready_after: Option<u32>,
    faults: HashMap<HalOp, ResultCode>,
    scan_results: Vec<ScanResult>,
    mac: String,
}

impl Default for SimHalBuilder {
    fn default() -> Self {
        Self {
            sta_iface: "wlan0".into(),
            ap_iface: "wlan1".into(),
            supplicant_ready_after: Some(1),
            hostapd_ready_after: Some(1),
            faults: HashMap::new(),
            scan_results: Vec::new(),
            mac: "02:00:00:00:00:00".into(),
        }
    }
}

impl SimHalBuilder {
    /// Name assigned to the station interface. An empty name simulates a
    /// chip that configures without reporting an interface.
    pub fn sta_iface(mut self, name: impl Into<String>) -> Self {
        self.sta_iface = name.into();
        self
    }

    pub fn ap_iface(mut self, name: impl Into<String>) -> Self {
        self.ap_iface = name.into();
        self
    }

    /// Readiness checks needed before the supplicant reports ready.
    /// `None` means it never becomes ready.
    pub fn supplicant_ready_after(mut self, checks: Option<u32>) -> Self {
        self.supplicant_ready_after = checks;
        self
    }

    pub fn hostapd_ready_after(mut self, checks: Option<u32>) -> Self {
        self.hostapd_ready_after = checks;
        self
    }

    /// Make `op` fail with `ERROR_COMMAND_FAILED`.
    pub fn fail(self, op: HalOp) -> Self {
        self.fail_with(op, ResultCode::ErrorCommandFailed)
    }

    pub fn fail_with(mut self, op: HalOp, code: ResultCode) -> Self {
        self.faults.insert(op, code);
        self
    }

    pub fn scan_results(mut self, results: Vec<ScanResult>) -> Self {
        self.scan_results = results;
        self
    }

    pub fn mac_address(mut self, mac: impl Into<String>) -> Self {
        self.mac = mac.into();
        self
    }

    pub fn build(self) -> SimHal {
        let iface_names =
            HashMap::from([(IfaceMode::Sta, self.sta_iface), (IfaceMode::Ap, self.ap_iface)]);
        SimHal {
            state: Mutex::new(SimState {
                calls: Vec::new(),
                faults: self.faults,
                iface_names,
                module_loaded: false,
                ifaces: HashMap::new(),
                client_listeners: HashMap::new(),
                ap_listeners: HashMap::new(),
                supplicant: DaemonState {
                    ready_after: self.supplicant_ready_after,
                    ..DaemonState::default()
                },
                hostapd: DaemonState {
                    ready_after: self.hostapd_ready_after,
                    ..DaemonState::default()
                },
                event_callback: None,
                sta_bound: None,
                softap_iface: None,
                country_code: None,
                scanning: false,
                scan_results: self.scan_results,
                stations: 0,
                mac: self.mac,
                debug_level: DebugLevel::default(),
            }),
        }
    }
}

/// Simulated radio, link-layer daemon, supplicant and hostapd.
pub struct SimHal {
    state: Mutex<SimState>,
}

impl Default for SimHal {
    fn default() -> Self {
        SimHalBuilder::default().build()
    }
}

impl SimHal {
    pub fn builder() -> SimHalBuilder {
        SimHalBuilder::default()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Fault control ────────────────────────────────────────────

    pub fn set_fault(&self, op: HalOp, code: ResultCode) {
        self.state().faults.insert(op, code);
    }

    pub fn clear_fault(&self, op: HalOp) {
        self.state().faults.remove(&op);
    }

    pub fn set_station_count(&self, stations: u32) {
        self.state().stations = stations;
    }

    // ── Inspection ───────────────────────────────────────────────

    pub fn calls(&self) -> Vec<HalCall> {
        self.state().calls.clone()
    }

    pub fn ops(&self) -> Vec<HalOp> {
        self.state().calls.iter().map(|c| c.op).collect()
    }

    pub fn count(&self, op: HalOp) -> usize {
        self.state().calls.iter().filter(|c| c.op == op).count()
    }

    /// Index of the first recorded call of `op`.
    pub fn position(&self, op: HalOp) -> Option<usize> {
        self.state().calls.iter().position(|c| c.op == op)
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn readiness_checks(&self, daemon: Daemon) -> u32 {
        let st = self.state();
        match daemon {
            Daemon::Supplicant => st.supplicant.checks,
            Daemon::Hostapd => st.hostapd.checks,
        }
    }

    pub fn live_iface(&self, mode: IfaceMode) -> Option<String> {
        self.state().ifaces.get(&mode).cloned()
    }

    pub fn module_loaded(&self) -> bool {
        self.state().module_loaded
    }

    pub fn country_code(&self) -> Option<CountryCode> {
        self.state().country_code.clone()
    }

    pub fn sta_bound(&self) -> Option<String> {
        self.state().sta_bound.clone()
    }

    pub fn softap_iface(&self) -> Option<String> {
        self.state().softap_iface.clone()
    }

    pub fn has_death_handler(&self, daemon: Daemon) -> bool {
        let st = self.state();
        match daemon {
            Daemon::Supplicant => st.supplicant.death.is_some(),
            Daemon::Hostapd => st.hostapd.death.is_some(),
        }
    }

    pub fn has_iface_listener(&self, iface: &str) -> bool {
        let st = self.state();
        st.client_listeners.contains_key(iface) || st.ap_listeners.contains_key(iface)
    }

    // ── Stimuli ──────────────────────────────────────────────────

    /// Simulate the daemon process exiting. Returns `true` if a death
    /// handler was registered and invoked.
    pub fn kill(&self, daemon: Daemon) -> bool {
        let handler = {
            let mut st = self.state();
            let ds = match daemon {
                Daemon::Supplicant => &mut st.supplicant,
                Daemon::Hostapd => &mut st.hostapd,
            };
            ds.reset();
            ds.death.clone()
        };
        warn!(%daemon, "simulated daemon death");
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    /// Deliver a link-layer event to the listener registered for `iface`.
    pub fn emit_iface_event(&self, iface: &str, event: WifiEvent) -> bool {
        let listener = {
            let st = self.state();
            st.client_listeners
                .get(iface)
                .or_else(|| st.ap_listeners.get(iface))
                .cloned()
        };
        match listener {
            Some(listener) => {
                listener.on_event(event);
                true
            }
            None => false,
        }
    }

    /// Deliver a supplicant event through the registered event callback.
    pub fn emit_supplicant_event(&self, event: WifiEvent) -> bool {
        let callback = self.state().event_callback.clone();
        match callback {
            Some(callback) => {
                callback(event);
                true
            }
            None => false,
        }
    }

    fn record(&self, op: HalOp, arg: Option<String>) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, op, arg)
    }
}

fn record_in(st: &mut SimState, op: HalOp, arg: Option<String>) -> HalResult<()> {
    debug!(%op, ?arg, "sim hal call");
    st.calls.push(HalCall { op, arg });
    match st.faults.get(&op) {
        Some(code) => Err(Error::Status(*code)),
        None => Ok(()),
    }
}

// ── Radio module ─────────────────────────────────────────────────

impl RadioModule for SimHal {
    fn init_hal_interface(&self) -> HalResult<()> {
        self.record(HalOp::InitHal, None)
    }

    fn start_module(&self) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::StartModule, None)?;
        st.module_loaded = true;
        Ok(())
    }

    fn configure_chip_and_create_iface(&self, mode: IfaceMode) -> HalResult<String> {
        let mut st = self.state();
        record_in(&mut st, HalOp::ConfigureChip, Some(mode.to_string()))?;
        if !st.module_loaded {
            return Err(Error::command_failed());
        }
        let name = st.iface_names.get(&mode).cloned().unwrap_or_default();
        st.ifaces.insert(mode, name.clone());
        Ok(name)
    }

    fn teardown_iface(&self, mode: IfaceMode) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::TeardownIface, Some(mode.to_string()))?;
        st.ifaces.remove(&mode);
        if st.ifaces.is_empty() {
            st.module_loaded = false;
        }
        Ok(())
    }

    fn set_ap_country_code(&self, code: &CountryCode) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::SetApCountryCode, Some(code.to_string()))?;
        st.country_code = Some(code.clone());
        Ok(())
    }

    fn capabilities(&self) -> HalResult<u32> {
        self.record(HalOp::Capabilities, None)?;
        Ok(0x0000_1f3b)
    }

    fn sta_capabilities(&self) -> HalResult<u32> {
        self.record(HalOp::StaCapabilities, None)?;
        Ok(0x0000_0007)
    }

    fn driver_module_info(&self) -> HalResult<ModuleInfo> {
        self.record(HalOp::DriverModuleInfo, None)?;
        Ok(ModuleInfo {
            driver_version: "sim-driver-1.0".into(),
            firmware_version: "sim-fw-1.0".into(),
        })
    }

    fn set_low_latency_mode(&self, enable: bool) -> HalResult<()> {
        self.record(HalOp::SetLowLatencyMode, Some(enable.to_string()))
    }
}

// ── Link-layer daemon ────────────────────────────────────────────

impl LinkLayerDaemon for SimHal {
    fn init(&self) -> HalResult<()> {
        self.record(HalOp::WificondInit, None)
    }

    fn setup_client_iface(
        &self,
        iface: &str,
        listener: Arc<dyn IfaceEventListener>,
    ) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::SetupClientIface, Some(iface.into()))?;
        st.client_listeners.insert(iface.into(), listener);
        Ok(())
    }

    fn teardown_client_iface(&self, iface: &str) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::TeardownClientIface, Some(iface.into()))?;
        st.client_listeners.remove(iface);
        Ok(())
    }

    fn setup_ap_iface(
        &self,
        iface: &str,
        listener: Arc<dyn IfaceEventListener>,
    ) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::SetupApIface, Some(iface.into()))?;
        st.ap_listeners.insert(iface.into(), listener);
        Ok(())
    }

    fn teardown_ap_iface(&self, iface: &str) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::TeardownApIface, Some(iface.into()))?;
        st.ap_listeners.remove(iface);
        Ok(())
    }

    fn start_supplicant(&self) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::StartSupplicant, None)?;
        st.supplicant.running = true;
        Ok(())
    }

    fn stop_supplicant(&self) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::StopSupplicant, None)?;
        st.supplicant.running = false;
        st.supplicant.checks = 0;
        Ok(())
    }

    fn start_single_scan(&self, settings: &ScanSettings) -> HalResult<()> {
        let mut st = self.state();
        record_in(
            &mut st,
            HalOp::StartSingleScan,
            Some(format!("{} freqs", settings.frequencies.len())),
        )?;
        if !st.client_listeners.is_empty() {
            st.scanning = true;
        }
        Ok(())
    }

    fn stop_single_scan(&self) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::StopSingleScan, None)?;
        st.scanning = false;
        Ok(())
    }

    fn scan_results(&self) -> HalResult<Vec<ScanResult>> {
        let mut st = self.state();
        record_in(&mut st, HalOp::ScanResults, None)?;
        Ok(st.scan_results.clone())
    }

    fn channels_for_band(&self, band_mask: u32) -> HalResult<Vec<i32>> {
        self.record(HalOp::ChannelsForBand, Some(band_mask.to_string()))?;
        let mut channels = Vec::new();
        if band_mask & 0x1 != 0 {
            channels.extend([2412, 2437, 2462]);
        }
        if band_mask & 0x2 != 0 {
            channels.extend([5180, 5200, 5220, 5240]);
        }
        Ok(channels)
    }

    fn softap_station_count(&self) -> HalResult<u32> {
        let mut st = self.state();
        record_in(&mut st, HalOp::SoftapStationCount, None)?;
        Ok(st.stations)
    }
}

// ── Supplicant client ────────────────────────────────────────────

impl SupplicantClient for SimHal {
    fn init_interface(&self) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::SupplicantInit, None)?;
        st.supplicant.initialized = true;
        Ok(())
    }

    fn deinit_interface(&self) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::SupplicantDeinit, None)?;
        st.supplicant.initialized = false;
        st.supplicant.checks = 0;
        st.sta_bound = None;
        Ok(())
    }

    fn is_interface_ready(&self) -> bool {
        let mut st = self.state();
        let ds = &mut st.supplicant;
        if !(ds.initialized && ds.running) {
            return false;
        }
        ds.checks += 1;
        ds.ready_now()
    }

    fn is_interface_initializing(&self) -> bool {
        let st = self.state();
        st.supplicant.initialized && !st.supplicant.ready_now()
    }

    fn setup_sta_interface(&self, iface: &str) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::SetupStaInterface, Some(iface.into()))?;
        st.sta_bound = Some(iface.into());
        Ok(())
    }

    fn register_event_callback(&self, callback: EventCallback) {
        let mut st = self.state();
        let _ = record_in(&mut st, HalOp::RegisterEventCallback, None);
        st.event_callback = Some(callback);
    }

    fn register_death_handler(&self, handler: DeathHandler) {
        let mut st = self.state();
        let _ = record_in(&mut st, HalOp::RegisterSupplicantDeath, None);
        st.supplicant.death = Some(handler);
    }

    fn unregister_death_handler(&self) {
        let mut st = self.state();
        let _ = record_in(&mut st, HalOp::UnregisterSupplicantDeath, None);
        st.supplicant.death = None;
    }

    fn mac_address(&self) -> HalResult<String> {
        let mut st = self.state();
        record_in(&mut st, HalOp::MacAddress, None)?;
        Ok(st.mac.clone())
    }

    fn connect_to_network(&self, config: &NetworkConfig) -> HalResult<()> {
        self.record(HalOp::Connect, Some(config.ssid.clone()))
    }

    fn reconnect(&self) -> HalResult<()> {
        self.record(HalOp::Reconnect, None)
    }

    fn reassociate(&self) -> HalResult<()> {
        self.record(HalOp::Reassociate, None)
    }

    fn disconnect(&self) -> HalResult<()> {
        self.record(HalOp::Disconnect, None)
    }

    fn remove_networks(&self) -> HalResult<()> {
        self.record(HalOp::RemoveNetworks, None)
    }

    fn set_power_save(&self, enable: bool) -> HalResult<()> {
        self.record(HalOp::SetPowerSave, Some(enable.to_string()))
    }

    fn set_suspend_mode(&self, enable: bool) -> HalResult<()> {
        self.record(HalOp::SetSuspendMode, Some(enable.to_string()))
    }

    fn set_country_code(&self, code: &str) -> HalResult<()> {
        self.record(HalOp::SetCountryCode, Some(code.into()))
    }

    fn debug_level(&self) -> HalResult<DebugLevel> {
        let mut st = self.state();
        record_in(&mut st, HalOp::GetDebugLevel, None)?;
        Ok(st.debug_level)
    }

    fn set_debug_level(&self, level: &DebugLevel) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::SetDebugLevel, Some(level.level.to_string()))?;
        st.debug_level = *level;
        Ok(())
    }
}

// ── Hostapd client ───────────────────────────────────────────────

impl HostapdClient for SimHal {
    fn init_interface(&self) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::HostapdInit, None)?;
        // hostapd is a lazy HAL: obtaining the service spawns the daemon.
        st.hostapd.initialized = true;
        st.hostapd.running = true;
        Ok(())
    }

    fn deinit_interface(&self) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::HostapdDeinit, None)?;
        st.hostapd.reset();
        Ok(())
    }

    fn is_interface_ready(&self) -> bool {
        let mut st = self.state();
        let ds = &mut st.hostapd;
        if !(ds.initialized && ds.running) {
            return false;
        }
        ds.checks += 1;
        ds.ready_now()
    }

    fn start_softap(
        &self,
        iface: &str,
        country_code: &CountryCode,
        config: &SoftapConfig,
    ) -> HalResult<()> {
        let mut st = self.state();
        record_in(
            &mut st,
            HalOp::StartSoftap,
            Some(format!("{iface} {} {country_code}", config.ssid)),
        )?;
        st.softap_iface = Some(iface.into());
        Ok(())
    }

    fn stop_softap(&self, iface: &str) -> HalResult<()> {
        let mut st = self.state();
        record_in(&mut st, HalOp::StopSoftap, Some(iface.into()))?;
        st.softap_iface = None;
        st.stations = 0;
        Ok(())
    }

    fn register_death_handler(&self, handler: DeathHandler) {
        let mut st = self.state();
        let _ = record_in(&mut st, HalOp::RegisterHostapdDeath, None);
        st.hostapd.death = Some(handler);
    }

    fn unregister_death_handler(&self) {
        let mut st = self.state();
        let _ = record_in(&mut st, HalOp::UnregisterHostapdDeath, None);
        st.hostapd.death = None;
    }
}

impl RadioAck for SimHal {
    fn response_acknowledgement(&self) -> HalResult<()> {
        self.record(HalOp::Ack, None)
    }
}

/// All operation names accepted by [`HalOp`]'s `FromStr`.
pub fn op_names() -> &'static [&'static str] {
    <HalOp as strum::VariantNames>::VARIANTS
}

/// Ops that fail when the simulator is built with these faults.
pub fn parse_faults<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<HashSet<HalOp>, String> {
    names
        .into_iter()
        .map(|name| name.parse::<HalOp>().map_err(|_| name.to_string()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn chip_configuration_requires_loaded_module() {
        let sim = SimHal::default();
        assert!(sim.configure_chip_and_create_iface(IfaceMode::Sta).is_err());
        sim.start_module().unwrap();
        assert_eq!(sim.configure_chip_and_create_iface(IfaceMode::Sta).unwrap(), "wlan0");
        assert_eq!(sim.live_iface(IfaceMode::Sta).as_deref(), Some("wlan0"));
    }

    #[test]
    fn teardown_of_missing_iface_is_not_an_error() {
        let sim = SimHal::default();
        assert!(RadioModule::teardown_iface(&sim, IfaceMode::Ap).is_ok());
        assert!(sim.teardown_client_iface("wlan9").is_ok());
    }

    #[test]
    fn supplicant_becomes_ready_after_configured_checks() {
        let sim = SimHal::builder().supplicant_ready_after(Some(3)).build();
        // Not counted before init + daemon start.
        assert!(!SupplicantClient::is_interface_ready(&sim));
        SupplicantClient::init_interface(&sim).unwrap();
        sim.start_supplicant().unwrap();
        assert!(!SupplicantClient::is_interface_ready(&sim));
        assert!(!SupplicantClient::is_interface_ready(&sim));
        assert!(SupplicantClient::is_interface_ready(&sim));
        assert_eq!(sim.readiness_checks(Daemon::Supplicant), 3);
    }

    #[test]
    fn faults_fail_the_named_op_and_are_still_recorded() {
        let sim = SimHal::builder().fail(HalOp::StartModule).build();
        let err = sim.start_module().unwrap_err();
        assert_eq!(err.code(), ResultCode::ErrorCommandFailed);
        assert_eq!(sim.ops(), vec![HalOp::StartModule]);
        sim.clear_fault(HalOp::StartModule);
        assert!(sim.start_module().is_ok());
    }

    #[test]
    fn kill_invokes_registered_death_handler() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let sim = SimHal::default();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        SupplicantClient::register_death_handler(
            &sim,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert!(sim.kill(Daemon::Supplicant));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!sim.kill(Daemon::Hostapd));
    }

    #[test]
    fn op_names_parse_back() {
        let faults = parse_faults(["setup-client-iface", "start-softap"]).unwrap();
        assert!(faults.contains(&HalOp::SetupClientIface));
        assert!(faults.contains(&HalOp::StartSoftap));
        assert_eq!(parse_faults(["bogus"]).unwrap_err(), "bogus");
        assert!(op_names().contains(&"configure-chip"));
    }
}
