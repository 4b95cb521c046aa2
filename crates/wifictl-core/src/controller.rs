// ── Controller ──
//
// Owns a `WifiOrchestrator` inside a single command-processor task. Callers
// hand in commands over a channel and await the reply, so commands never
// interleave and nobody blocks on a readiness poll. Also exposes hardware
// events, per-daemon session state, and a lock-free status snapshot.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wifictl_hal::{CountryCode, Daemon, IfaceMode, WifiEvent};

use crate::command::{Command, CommandEnvelope, WifiResult};
use crate::config::OrchestratorConfig;
use crate::error::CoreError;
use crate::event::EventHub;
use crate::orchestrator::{HalHandles, StatusSnapshot, WifiOrchestrator};
use crate::session::SessionState;

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Created stopped; call
/// [`start()`](Self::start) to spawn the command processor.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: OrchestratorConfig,
    hub: EventHub,
    supplicant_state: watch::Receiver<SessionState>,
    hostapd_state: watch::Receiver<SessionState>,
    snapshot: Arc<ArcSwap<StatusSnapshot>>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    orchestrator: Mutex<Option<WifiOrchestrator>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    pub fn new(hal: HalHandles, config: OrchestratorConfig) -> Self {
        let hub = EventHub::new();
        let cancel = CancellationToken::new();
        let orchestrator = WifiOrchestrator::new(hal, config.clone(), hub.clone())
            .with_cancellation(cancel.child_token());
        let supplicant_state = orchestrator.session(Daemon::Supplicant).subscribe();
        let hostapd_state = orchestrator.session(Daemon::Hostapd).subscribe();
        let snapshot = Arc::new(ArcSwap::from_pointee(orchestrator.status()));
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                hub,
                supplicant_state,
                hostapd_state,
                snapshot,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                orchestrator: Mutex::new(Some(orchestrator)),
                cancel,
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the command processor. Fails if it was already started.
    pub async fn start(&self) -> Result<(), CoreError> {
        let rx = self.inner.command_rx.lock().await.take();
        let orchestrator = self.inner.orchestrator.lock().await.take();
        let (Some(rx), Some(orchestrator)) = (rx, orchestrator) else {
            return Err(CoreError::Internal("controller already started".into()));
        };

        let task = ProcessorTask {
            snapshot: Arc::clone(&self.inner.snapshot),
            cancel: self.inner.cancel.clone(),
            supplicant: self.session_state(Daemon::Supplicant),
            hostapd: self.session_state(Daemon::Hostapd),
        };
        let handle = tokio::spawn(task.run(rx, orchestrator));
        self.inner.task_handles.lock().await.push(handle);
        info!("controller started");
        Ok(())
    }

    /// Cancel any in-flight readiness wait, stop the processor and wait
    /// for it to exit. Queued commands are dropped.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "controller task did not exit cleanly");
            }
        }
        debug!("controller shut down");
    }

    pub fn is_running(&self) -> bool {
        !self.inner.cancel.is_cancelled()
    }

    // ── Command execution ────────────────────────────────────────

    /// Queue `command` and wait for its result. The result echoes `id`.
    ///
    /// Failures of the command itself are reported through
    /// [`WifiResult::status`]; `Err` means the controller is gone.
    pub async fn execute(&self, id: u64, command: Command) -> Result<WifiResult, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ControllerStopped);
        }

        let (tx, rx) = oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                id,
                command,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerStopped)?;

        rx.await.map_err(|_| CoreError::ControllerStopped)
    }

    /// Start a controller, run `f` against it, then shut it down.
    pub async fn oneshot<F, Fut, T>(hal: HalHandles, config: OrchestratorConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Self::new(hal, config);
        controller.start().await?;
        let result = f(controller.clone()).await;
        controller.shutdown().await;
        result
    }

    // ── Observation ──────────────────────────────────────────────

    /// Subscribe to hardware-origin events.
    pub fn events(&self) -> broadcast::Receiver<Arc<WifiEvent>> {
        self.inner.hub.subscribe()
    }

    pub fn session_state(&self, daemon: Daemon) -> watch::Receiver<SessionState> {
        match daemon {
            Daemon::Supplicant => self.inner.supplicant_state.clone(),
            Daemon::Hostapd => self.inner.hostapd_state.clone(),
        }
    }

    /// Session state changes as a stream, starting with the current value.
    pub fn session_stream(&self, daemon: Daemon) -> WatchStream<SessionState> {
        WatchStream::new(self.session_state(daemon))
    }

    /// Latest status, refreshed after every command and session change.
    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.inner.snapshot.load_full()
    }
}

// ── Background task ──────────────────────────────────────────────

/// What the command processor needs, without a `Controller` handle: the
/// task ends once every handle (and so the command sender) is dropped.
struct ProcessorTask {
    snapshot: Arc<ArcSwap<StatusSnapshot>>,
    cancel: CancellationToken,
    supplicant: watch::Receiver<SessionState>,
    hostapd: watch::Receiver<SessionState>,
}

impl ProcessorTask {
    async fn run(mut self, mut rx: mpsc::Receiver<CommandEnvelope>, mut orchestrator: WifiOrchestrator) {
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                envelope = rx.recv() => {
                    let Some(envelope) = envelope else { break };
                    let result = route_command(&mut orchestrator, envelope.id, envelope.command).await;
                    self.publish(&orchestrator);
                    let _ = envelope.response_tx.send(result);
                }
                Ok(()) = self.supplicant.changed() => self.publish(&orchestrator),
                Ok(()) = self.hostapd.changed() => self.publish(&orchestrator),
            }
        }
        debug!("command processor exiting");
    }

    fn publish(&self, orchestrator: &WifiOrchestrator) {
        self.snapshot.store(Arc::new(orchestrator.status()));
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Run one command to completion and fold the outcome into a result.
async fn route_command(orchestrator: &mut WifiOrchestrator, id: u64, command: Command) -> WifiResult {
    let name = command.name();
    if command.is_lifecycle() {
        info!(id, command = name, "mode change requested");
    } else {
        debug!(id, command = name, "routing command");
    }

    let mut result = WifiResult::new(id);
    match dispatch(orchestrator, command, &mut result).await {
        Ok(()) => {
            debug!(id, command = name, "command succeeded");
            result
        }
        Err(e) => {
            warn!(id, command = name, error = %e, "command failed");
            result.fail(&e)
        }
    }
}

#[allow(clippy::too_many_lines)]
async fn dispatch(
    orchestrator: &mut WifiOrchestrator,
    command: Command,
    result: &mut WifiResult,
) -> Result<(), CoreError> {
    let hal = orchestrator.hal().clone();

    match command {
        // ── Bring-up and module info ─────────────────────────────
        Command::Initialize => orchestrator.initialize(),

        Command::GetModuleVersion => {
            let info = hal
                .radio
                .driver_module_info()
                .map_err(CoreError::hal("driver_module_info"))?;
            result.driver_version = Some(info.driver_version);
            result.firmware_version = Some(info.firmware_version);
            Ok(())
        }

        Command::GetCapabilities => {
            let caps = hal
                .radio
                .capabilities()
                .map_err(CoreError::hal("capabilities"))?;
            result.capabilities = Some(caps);
            Ok(())
        }

        Command::GetStaCapabilities => {
            let caps = hal
                .radio
                .sta_capabilities()
                .map_err(CoreError::hal("sta_capabilities"))?;
            result.sta_capabilities = Some(caps);
            Ok(())
        }

        Command::SetLowLatencyMode { enable } => hal
            .radio
            .set_low_latency_mode(enable)
            .map_err(CoreError::hal("set_low_latency_mode")),

        // ── Station mode ─────────────────────────────────────────
        Command::StartWifi => {
            let iface = orchestrator.start_wifi().await?;
            result.sta_interface = Some(iface);
            Ok(())
        }

        Command::StopWifi => orchestrator.stop_wifi(),

        Command::GetMacAddress => {
            let mac = hal
                .supplicant
                .mac_address()
                .map_err(CoreError::hal("mac_address"))?;
            result.mac_address = Some(mac);
            Ok(())
        }

        Command::GetStaIface => {
            let iface = orchestrator
                .iface_name(IfaceMode::Sta)
                .ok_or(CoreError::NoInterface {
                    mode: IfaceMode::Sta,
                })?;
            result.sta_interface = Some(iface.to_owned());
            Ok(())
        }

        Command::GetDebugLevel => {
            let level = hal
                .supplicant
                .debug_level()
                .map_err(CoreError::hal("debug_level"))?;
            result.debug_level = Some(level);
            Ok(())
        }

        Command::SetDebugLevel { level } => hal
            .supplicant
            .set_debug_level(&level)
            .map_err(CoreError::hal("set_debug_level")),

        Command::SetPowerSave { enable } => hal
            .supplicant
            .set_power_save(enable)
            .map_err(CoreError::hal("set_power_save")),

        Command::SetSuspendMode { enable } => hal
            .supplicant
            .set_suspend_mode(enable)
            .map_err(CoreError::hal("set_suspend_mode")),

        Command::SetCountryCode { code } => {
            let code: CountryCode = code.parse().map_err(|_| CoreError::InvalidArgument {
                message: format!("country code {code:?} is not two letters"),
            })?;
            hal.supplicant
                .set_country_code(code.as_str())
                .map_err(CoreError::hal("set_country_code"))
        }

        // ── Scanning ─────────────────────────────────────────────
        Command::StartSingleScan { settings } => hal
            .wificond
            .start_single_scan(&settings)
            .map_err(CoreError::hal("start_single_scan")),

        Command::StopSingleScan => hal
            .wificond
            .stop_single_scan()
            .map_err(CoreError::hal("stop_single_scan")),

        Command::GetScanResults => {
            let results = hal
                .wificond
                .scan_results()
                .map_err(CoreError::hal("scan_results"))?;
            result.scan_results = Some(results);
            Ok(())
        }

        Command::GetChannelsForBand { band_mask } => {
            let channels = hal
                .wificond
                .channels_for_band(band_mask)
                .map_err(CoreError::hal("channels_for_band"))?;
            result.channels = Some(channels);
            Ok(())
        }

        // ── Association ──────────────────────────────────────────
        Command::Connect { network } => {
            // A running scan holds the radio; drop it first.
            if let Err(e) = hal.wificond.stop_single_scan() {
                debug!(error = %e, "no scan to abort before connect");
            }
            hal.supplicant
                .connect_to_network(&network)
                .map_err(CoreError::hal("connect_to_network"))
        }

        Command::Reconnect => hal
            .supplicant
            .reconnect()
            .map_err(CoreError::hal("reconnect")),

        Command::Reassociate => hal
            .supplicant
            .reassociate()
            .map_err(CoreError::hal("reassociate")),

        Command::Disconnect => hal
            .supplicant
            .disconnect()
            .map_err(CoreError::hal("disconnect")),

        Command::RemoveNetworks => hal
            .supplicant
            .remove_networks()
            .map_err(CoreError::hal("remove_networks")),

        // ── Access-point mode ────────────────────────────────────
        Command::StartSoftAp { config } => {
            let iface = orchestrator.start_softap(&config).await?;
            result.ap_interface = Some(iface);
            Ok(())
        }

        Command::StopSoftAp => orchestrator.stop_softap(),

        Command::GetApIface => {
            let iface = orchestrator
                .iface_name(IfaceMode::Ap)
                .ok_or(CoreError::NoInterface { mode: IfaceMode::Ap })?;
            result.ap_interface = Some(iface.to_owned());
            Ok(())
        }

        Command::GetSoftapStationNumber => {
            let stations = hal
                .wificond
                .softap_station_count()
                .map_err(CoreError::hal("softap_station_count"))?;
            result.num_stations = Some(stations);
            Ok(())
        }
    }
}
