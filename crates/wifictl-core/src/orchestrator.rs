// ── Wi-Fi orchestrator ──
//
// The enable/disable state machine for station and access-point modes.
// Sequences the radio module, the interface manager, the session
// controllers and the link-layer daemon in a fixed order. Every method
// takes `&mut self`, so callers serialize entry points by construction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wifictl_hal::{
    Daemon, HostapdClient, IfaceMode, LinkLayerDaemon, RadioModule, SoftapConfig,
    SupplicantClient, WifiEvent,
};

use crate::config::{OrchestratorConfig, RollbackPolicy};
use crate::error::CoreError;
use crate::event::{EventHub, EventListener};
use crate::iface::{InterfaceInfo, InterfaceManager};
use crate::poller::ReadinessPoller;
use crate::session::{
    DeathSubscription, HostapdSession, SessionCell, SessionState, SupplicantSession,
};

// ── HalHandles ───────────────────────────────────────────────────

/// The collaborator services the orchestrator drives.
#[derive(Clone)]
pub struct HalHandles {
    pub radio: Arc<dyn RadioModule>,
    pub wificond: Arc<dyn LinkLayerDaemon>,
    pub supplicant: Arc<dyn SupplicantClient>,
    pub hostapd: Arc<dyn HostapdClient>,
}

impl HalHandles {
    /// Use one object for every service (the simulator, or a test double).
    pub fn uniform<T>(hal: Arc<T>) -> Self
    where
        T: RadioModule + LinkLayerDaemon + SupplicantClient + HostapdClient + 'static,
    {
        Self {
            radio: hal.clone(),
            wificond: hal.clone(),
            supplicant: hal.clone(),
            hostapd: hal,
        }
    }
}

// ── StatusSnapshot ───────────────────────────────────────────────

/// Point-in-time view of everything the orchestrator owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub sta: Option<InterfaceInfo>,
    pub ap: Option<InterfaceInfo>,
    pub supplicant: SessionState,
    pub hostapd: SessionState,
    pub softap_running: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            sta: None,
            ap: None,
            supplicant: SessionState::Stopped,
            hostapd: SessionState::Stopped,
            softap_running: false,
            updated_at: Utc::now(),
        }
    }
}

/// What a start sequence acquired before it failed.
#[derive(Debug, Default)]
struct Progress {
    module: bool,
    iface: bool,
    session: bool,
    death: bool,
}

// ── WifiOrchestrator ─────────────────────────────────────────────

pub struct WifiOrchestrator {
    hal: HalHandles,
    config: OrchestratorConfig,
    poller: ReadinessPoller,
    hub: EventHub,
    cancel: CancellationToken,
    ifaces: InterfaceManager,
    supplicant: SupplicantSession,
    hostapd: HostapdSession,
    sta_death: Option<DeathSubscription>,
    ap_death: Option<DeathSubscription>,
    softap_running: bool,
}

impl WifiOrchestrator {
    /// Build an orchestrator and register the hub as the process-wide
    /// event callback with the supplicant client.
    pub fn new(hal: HalHandles, config: OrchestratorConfig, hub: EventHub) -> Self {
        hal.supplicant.register_event_callback(hub.callback());
        Self {
            poller: ReadinessPoller::from_config(&config),
            ifaces: InterfaceManager::new(Arc::clone(&hal.radio)),
            supplicant: SupplicantSession::new(
                Arc::clone(&hal.supplicant),
                Arc::clone(&hal.wificond),
            ),
            hostapd: HostapdSession::new(Arc::clone(&hal.hostapd)),
            hal,
            config,
            hub,
            cancel: CancellationToken::new(),
            sta_death: None,
            ap_death: None,
            softap_running: false,
        }
    }

    /// Readiness waits give up when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn hal(&self) -> &HalHandles {
        &self.hal
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn session(&self, daemon: Daemon) -> &SessionCell {
        match daemon {
            Daemon::Supplicant => self.supplicant.cell(),
            Daemon::Hostapd => self.hostapd.cell(),
        }
    }

    /// Name of the live interface for `mode`.
    pub fn iface_name(&self, mode: IfaceMode) -> Option<&str> {
        self.ifaces.name(mode)
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            sta: self.ifaces.info(IfaceMode::Sta),
            ap: self.ifaces.info(IfaceMode::Ap),
            supplicant: self.supplicant.state(),
            hostapd: self.hostapd.state(),
            softap_running: self.softap_running,
            updated_at: Utc::now(),
        }
    }

    // ── Initialize ───────────────────────────────────────────────

    /// Bring up the HAL plumbing before any mode is enabled.
    pub fn initialize(&mut self) -> Result<(), CoreError> {
        self.hal
            .radio
            .init_hal_interface()
            .map_err(CoreError::hal("init_hal_interface"))?;
        self.hal
            .wificond
            .init()
            .map_err(CoreError::hal("wificond init"))?;
        if self.hal.supplicant.is_interface_initializing() {
            debug!("supplicant client already initializing");
        } else {
            self.hal
                .supplicant
                .init_interface()
                .map_err(CoreError::hal("supplicant init_interface"))?;
        }
        info!("wifi HAL initialized");
        Ok(())
    }

    // ── Station mode ─────────────────────────────────────────────

    /// Enable station mode and return the interface name.
    pub async fn start_wifi(&mut self) -> Result<String, CoreError> {
        if let Some(name) = self.ifaces.name(IfaceMode::Sta) {
            return Err(CoreError::AlreadyActive {
                mode: IfaceMode::Sta,
                name: name.to_owned(),
            });
        }

        let mut progress = Progress::default();
        match self.start_wifi_steps(&mut progress).await {
            Ok(name) => {
                info!(iface = %name, "wifi started");
                Ok(name)
            }
            Err(e) => {
                error!(error = %e, "start wifi failed");
                self.after_failed_start(IfaceMode::Sta, &progress);
                Err(e)
            }
        }
    }

    async fn start_wifi_steps(&mut self, progress: &mut Progress) -> Result<String, CoreError> {
        self.hal
            .radio
            .start_module()
            .map_err(CoreError::hal("start_module"))?;
        progress.module = true;

        let name = self.ifaces.create_interface(IfaceMode::Sta)?;
        progress.iface = true;

        let listener = EventListener::new(IfaceMode::Sta, &name)?;
        self.ifaces
            .bind_listener(IfaceMode::Sta, Arc::clone(&listener));
        listener.register_event_callback(self.hub.callback());

        progress.session = true;
        self.supplicant.start(&self.poller, &self.cancel).await?;

        self.sta_death = Some(self.install_death(Daemon::Supplicant));
        progress.death = true;

        if let Err(e) = self.hal.wificond.setup_client_iface(&name, listener) {
            warn!(iface = %name, error = %e, "client iface registration failed, tearing down");
            if let Err(teardown) = self.hal.wificond.teardown_client_iface(&name) {
                warn!(iface = %name, error = %teardown, "client iface teardown failed");
            }
            return Err(CoreError::hal("setup_client_iface")(e));
        }
        self.ifaces.set_registered(IfaceMode::Sta, true);

        self.hal
            .supplicant
            .setup_sta_interface(&name)
            .map_err(CoreError::hal("setup_sta_interface"))?;

        Ok(name)
    }

    /// Disable station mode in strict reverse order, stopping at the first
    /// failure. A start that failed part way is stopped too. Nothing
    /// acquired is a no-op.
    pub fn stop_wifi(&mut self) -> Result<(), CoreError> {
        let handle = self.ifaces.handle(IfaceMode::Sta);
        if handle.is_none() && !self.supplicant.is_acquired() && self.sta_death.is_none() {
            debug!("wifi already stopped");
            return Ok(());
        }
        let has_iface = handle.is_some();
        let registered = handle.filter(|h| h.registered).map(|h| h.name.clone());

        if died(self.sta_death.as_ref()) {
            self.supplicant.forget();
        }
        self.supplicant.stop()?;

        if let Some(name) = registered {
            self.hal
                .wificond
                .teardown_client_iface(&name)
                .map_err(CoreError::hal("teardown_client_iface"))?;
            self.ifaces.set_registered(IfaceMode::Sta, false);
        }

        if let Some(death) = self.sta_death.take() {
            death.cancel();
        }

        self.release_interface(IfaceMode::Sta, has_iface)?;
        info!("wifi stopped");
        Ok(())
    }

    // ── Access-point mode ────────────────────────────────────────

    /// Enable access-point mode with `config` and return the interface name.
    pub async fn start_softap(&mut self, config: &SoftapConfig) -> Result<String, CoreError> {
        if let Some(name) = self.ifaces.name(IfaceMode::Ap) {
            return Err(CoreError::AlreadyActive {
                mode: IfaceMode::Ap,
                name: name.to_owned(),
            });
        }

        let mut progress = Progress::default();
        match self.start_softap_steps(config, &mut progress).await {
            Ok(name) => {
                info!(iface = %name, ssid = %config.ssid, "softap started");
                Ok(name)
            }
            Err(e) => {
                error!(error = %e, "start softap failed");
                self.after_failed_start(IfaceMode::Ap, &progress);
                Err(e)
            }
        }
    }

    async fn start_softap_steps(
        &mut self,
        config: &SoftapConfig,
        progress: &mut Progress,
    ) -> Result<String, CoreError> {
        self.hal
            .radio
            .start_module()
            .map_err(CoreError::hal("start_module"))?;
        progress.module = true;

        progress.session = true;
        self.hostapd.start(&self.poller, &self.cancel).await?;

        self.ap_death = Some(self.install_death(Daemon::Hostapd));
        progress.death = true;

        let name = self.ifaces.create_interface(IfaceMode::Ap)?;
        progress.iface = true;

        let listener = EventListener::new(IfaceMode::Ap, &name)?;
        self.ifaces.bind_listener(IfaceMode::Ap, Arc::clone(&listener));
        listener.register_event_callback(self.hub.callback());

        if let Err(e) = self.hal.wificond.setup_ap_iface(&name, listener) {
            warn!(iface = %name, error = %e, "ap iface registration failed, tearing down");
            if let Err(teardown) = self.hal.wificond.teardown_ap_iface(&name) {
                warn!(iface = %name, error = %teardown, "ap iface teardown failed");
            }
            return Err(CoreError::hal("setup_ap_iface")(e));
        }
        self.ifaces.set_registered(IfaceMode::Ap, true);

        self.hal
            .radio
            .set_ap_country_code(&config.country_code)
            .map_err(CoreError::hal("set_ap_country_code"))?;

        self.hal
            .hostapd
            .start_softap(&name, &config.country_code, config)
            .map_err(CoreError::hal("start_softap"))?;
        self.softap_running = true;

        Ok(name)
    }

    /// Disable access-point mode: softap, link-layer registration, hostapd
    /// session, then the radio interface.
    pub fn stop_softap(&mut self) -> Result<(), CoreError> {
        let handle = self.ifaces.handle(IfaceMode::Ap);
        if handle.is_none() && !self.hostapd.is_acquired() && self.ap_death.is_none() {
            debug!("softap already stopped");
            return Ok(());
        }
        let name = handle.map(|h| h.name.clone());
        let registered = handle.is_some_and(|h| h.registered);

        if let Some(name) = name.as_deref() {
            if self.softap_running {
                self.hal
                    .hostapd
                    .stop_softap(name)
                    .map_err(CoreError::hal("stop_softap"))?;
                self.softap_running = false;
            }
            if registered {
                self.hal
                    .wificond
                    .teardown_ap_iface(name)
                    .map_err(CoreError::hal("teardown_ap_iface"))?;
                self.ifaces.set_registered(IfaceMode::Ap, false);
            }
        }

        if died(self.ap_death.as_ref()) {
            self.hostapd.forget();
        }
        if let Some(death) = self.ap_death.take() {
            death.cancel();
        }
        self.hostapd.stop()?;

        self.release_interface(IfaceMode::Ap, name.is_some())?;
        info!("softap stopped");
        Ok(())
    }

    /// Destroy the mode's interface, or with none recorded, still tear the
    /// mode down so a module loaded by a failed start is unloaded.
    fn release_interface(&mut self, mode: IfaceMode, has_iface: bool) -> Result<(), CoreError> {
        if has_iface {
            return self.ifaces.destroy_interface(mode);
        }
        self.hal
            .radio
            .teardown_iface(mode)
            .map_err(CoreError::hal("teardown_iface"))
    }

    // ── Failure handling ─────────────────────────────────────────

    fn after_failed_start(&mut self, mode: IfaceMode, progress: &Progress) {
        match self.config.rollback {
            RollbackPolicy::FailFast => {
                if progress.iface {
                    warn!(%mode, "leaving partially started resources allocated");
                }
            }
            RollbackPolicy::Unwind => self.unwind(mode, progress),
        }
    }

    /// Release, in reverse order, whatever a failed start acquired.
    fn unwind(&mut self, mode: IfaceMode, progress: &Progress) {
        info!(%mode, ?progress, "unwinding failed start");

        if mode == IfaceMode::Ap && self.softap_running {
            if let Some(name) = self.ifaces.name(IfaceMode::Ap) {
                if let Err(e) = self.hal.hostapd.stop_softap(name) {
                    warn!(error = %e, "unwind: stop softap failed");
                }
            }
            self.softap_running = false;
        }

        if let Some(handle) = self.ifaces.handle(mode) {
            if handle.registered {
                let name = handle.name.clone();
                let torn_down = match mode {
                    IfaceMode::Sta => self.hal.wificond.teardown_client_iface(&name),
                    IfaceMode::Ap => self.hal.wificond.teardown_ap_iface(&name),
                };
                if let Err(e) = torn_down {
                    warn!(iface = %name, error = %e, "unwind: link-layer teardown failed");
                }
                self.ifaces.set_registered(mode, false);
            }
        }

        if progress.death {
            let death = match mode {
                IfaceMode::Sta => self.sta_death.take(),
                IfaceMode::Ap => self.ap_death.take(),
            };
            if let Some(death) = death {
                death.cancel();
            }
        }

        if progress.session {
            match mode {
                IfaceMode::Sta => self.supplicant.release(),
                IfaceMode::Ap => self.hostapd.release(),
            }
        }

        if progress.iface {
            if let Err(e) = self.ifaces.destroy_interface(mode) {
                warn!(%mode, error = %e, "unwind: interface teardown failed");
            }
        } else if progress.module {
            if let Err(e) = self.hal.radio.teardown_iface(mode) {
                warn!(%mode, error = %e, "unwind: module teardown failed");
            }
        }
    }

    // ── Death notification ───────────────────────────────────────

    fn install_death(&self, daemon: Daemon) -> DeathSubscription {
        let cell = self.session(daemon).clone();
        let hub = self.hub.clone();
        let on_death = move |daemon: Daemon| {
            error!(%daemon, mode = %daemon.mode(), "daemon died unexpectedly");
            cell.set(SessionState::Stopped);
            hub.publish(WifiEvent::DaemonDied { daemon });
        };

        match daemon {
            Daemon::Supplicant => {
                let client = Arc::clone(&self.hal.supplicant);
                let unregister = Arc::clone(&client);
                DeathSubscription::install(
                    daemon,
                    |handler| client.register_death_handler(handler),
                    move || unregister.unregister_death_handler(),
                    on_death,
                )
            }
            Daemon::Hostapd => {
                let client = Arc::clone(&self.hal.hostapd);
                let unregister = Arc::clone(&client);
                DeathSubscription::install(
                    daemon,
                    |handler| client.register_death_handler(handler),
                    move || unregister.unregister_death_handler(),
                    on_death,
                )
            }
        }
    }
}

/// A subscription that is still held but disarmed has fired.
fn died(death: Option<&DeathSubscription>) -> bool {
    death.is_some_and(|d| {
        let fired = !d.is_armed();
        if fired {
            debug!(daemon = %d.daemon(), "daemon already gone, skipping its stop");
        }
        fired
    })
}
