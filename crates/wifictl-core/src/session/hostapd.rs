use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wifictl_hal::{Daemon, HostapdClient};

use super::{SessionCell, SessionState, wait_until_ready};
use crate::error::CoreError;
use crate::poller::ReadinessPoller;

/// Start/stop of the access-point daemon. Initializing the HAL client is
/// what launches hostapd, so there is no separate spawn step.
pub struct HostapdSession {
    client: Arc<dyn HostapdClient>,
    cell: SessionCell,
    acquired: AtomicBool,
}

impl HostapdSession {
    pub fn new(client: Arc<dyn HostapdClient>) -> Self {
        Self {
            client,
            cell: SessionCell::new(Daemon::Hostapd),
            acquired: AtomicBool::new(false),
        }
    }

    pub fn cell(&self) -> &SessionCell {
        &self.cell
    }

    pub fn state(&self) -> SessionState {
        self.cell.get()
    }

    /// Initialized and not yet stopped, whatever the observed state.
    pub fn is_acquired(&self) -> bool {
        self.acquired.load(Ordering::Acquire)
    }

    pub fn forget(&self) {
        self.acquired.store(false, Ordering::Release);
        self.cell.set(SessionState::Stopped);
    }

    pub async fn start(
        &self,
        poller: &ReadinessPoller,
        cancel: &CancellationToken,
    ) -> Result<(), CoreError> {
        self.cell.set(SessionState::Initializing);

        if let Err(e) = self.client.init_interface() {
            self.cell.set(SessionState::Stopped);
            return Err(CoreError::hal("hostapd init_interface")(e));
        }
        self.acquired.store(true, Ordering::Release);

        let client = Arc::clone(&self.client);
        wait_until_ready(&self.cell, poller, cancel, || client.is_interface_ready()).await
    }

    pub fn stop(&self) -> Result<(), CoreError> {
        if !self.is_acquired() {
            debug!("hostapd session not started");
            return Ok(());
        }
        let previous = self.cell.get();
        self.cell.set(SessionState::TearingDown);

        match self.client.deinit_interface() {
            Ok(()) => {
                self.acquired.store(false, Ordering::Release);
                self.cell.set(SessionState::Stopped);
                info!("hostapd stopped");
                Ok(())
            }
            Err(e) => {
                self.cell.set(previous);
                Err(CoreError::hal("hostapd deinit_interface")(e))
            }
        }
    }

    pub fn release(&self) {
        if let Err(e) = self.client.deinit_interface() {
            warn!(error = %e, "hostapd deinit during release failed");
        }
        self.acquired.store(false, Ordering::Release);
        self.cell.set(SessionState::Stopped);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wifictl_hal::{HalOp, SimHal};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn start_then_stop() {
        let sim = Arc::new(SimHal::builder().hostapd_ready_after(Some(4)).build());
        let session = HostapdSession::new(sim.clone());
        let start = tokio::time::Instant::now();

        session
            .start(&ReadinessPoller::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(start.elapsed(), std::time::Duration::from_millis(300));

        session.stop().unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(sim.ops(), vec![HalOp::HostapdInit, HalOp::HostapdDeinit]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_deinit_keeps_session_ready() {
        let sim = Arc::new(SimHal::builder().fail(HalOp::HostapdDeinit).build());
        let session = HostapdSession::new(sim);
        session
            .start(&ReadinessPoller::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(session.stop().is_err());
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.is_acquired());
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_session_is_still_deinitialized() {
        let sim = Arc::new(SimHal::builder().hostapd_ready_after(None).build());
        let session = HostapdSession::new(sim.clone());
        let poller = ReadinessPoller::new(std::time::Duration::from_millis(10), 2);
        assert!(session.start(&poller, &CancellationToken::new()).await.is_err());
        assert_eq!(session.state(), SessionState::Stopped);

        session.stop().unwrap();

        assert_eq!(sim.count(HalOp::HostapdDeinit), 1);
        assert!(!session.is_acquired());
    }
}
