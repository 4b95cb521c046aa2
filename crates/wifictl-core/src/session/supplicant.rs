use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wifictl_hal::{Daemon, LinkLayerDaemon, SupplicantClient};

use super::{SessionCell, SessionState, wait_until_ready};
use crate::error::CoreError;
use crate::poller::ReadinessPoller;

/// Start/stop of the station-mode supplicant and its HAL client.
pub struct SupplicantSession {
    client: Arc<dyn SupplicantClient>,
    wificond: Arc<dyn LinkLayerDaemon>,
    cell: SessionCell,
    /// Set once the client is initialized, cleared by a successful stop.
    /// Independent of `cell`, which a timeout or death resets.
    acquired: AtomicBool,
}

impl SupplicantSession {
    pub fn new(client: Arc<dyn SupplicantClient>, wificond: Arc<dyn LinkLayerDaemon>) -> Self {
        Self {
            client,
            wificond,
            cell: SessionCell::new(Daemon::Supplicant),
            acquired: AtomicBool::new(false),
        }
    }

    pub fn cell(&self) -> &SessionCell {
        &self.cell
    }

    pub fn state(&self) -> SessionState {
        self.cell.get()
    }

    /// Whether a start got far enough that a stop has work to do.
    pub fn is_acquired(&self) -> bool {
        self.acquired.load(Ordering::Acquire)
    }

    /// Drop the claim without touching the daemon, after it died.
    pub fn forget(&self) {
        self.acquired.store(false, Ordering::Release);
        self.cell.set(SessionState::Stopped);
    }

    /// Initialize the HAL client (unless it already reports ready), have
    /// the link-layer daemon spawn the supplicant, then wait for it.
    pub async fn start(
        &self,
        poller: &ReadinessPoller,
        cancel: &CancellationToken,
    ) -> Result<(), CoreError> {
        self.cell.set(SessionState::Initializing);

        if self.client.is_interface_ready() {
            debug!("supplicant client already ready");
        } else if let Err(e) = self.client.init_interface() {
            self.cell.set(SessionState::Stopped);
            return Err(CoreError::hal("supplicant init_interface")(e));
        }
        self.acquired.store(true, Ordering::Release);

        if let Err(e) = self.wificond.start_supplicant() {
            self.cell.set(SessionState::Stopped);
            return Err(CoreError::hal("start_supplicant")(e));
        }

        let client = Arc::clone(&self.client);
        wait_until_ready(&self.cell, poller, cancel, || client.is_interface_ready()).await
    }

    /// Deinit the HAL client, then ask the daemon to stop. This runs even
    /// when a readiness wait timed out, since the daemon may still be up.
    /// A session that was never started is left alone.
    pub fn stop(&self) -> Result<(), CoreError> {
        if !self.is_acquired() {
            debug!("supplicant session not started");
            return Ok(());
        }
        let previous = self.cell.get();
        self.cell.set(SessionState::TearingDown);

        let result = self
            .client
            .deinit_interface()
            .map_err(CoreError::hal("supplicant deinit_interface"))
            .and_then(|()| {
                self.wificond
                    .stop_supplicant()
                    .map_err(CoreError::hal("stop_supplicant"))
            });

        match result {
            Ok(()) => {
                self.acquired.store(false, Ordering::Release);
                self.cell.set(SessionState::Stopped);
                info!("supplicant stopped");
                Ok(())
            }
            Err(e) => {
                self.cell.set(previous);
                Err(e)
            }
        }
    }

    /// Best-effort teardown regardless of state. Errors are logged.
    pub fn release(&self) {
        if let Err(e) = self.client.deinit_interface() {
            warn!(error = %e, "supplicant deinit during release failed");
        }
        if let Err(e) = self.wificond.stop_supplicant() {
            warn!(error = %e, "supplicant stop during release failed");
        }
        self.acquired.store(false, Ordering::Release);
        self.cell.set(SessionState::Stopped);
    }
}
