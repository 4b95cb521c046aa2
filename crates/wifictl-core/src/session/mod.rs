// ── Daemon session controllers ──
//
// One controller per daemon. Each owns the daemon's `SessionState` and
// publishes transitions through a `watch` channel so the controller actor
// and death handlers observe the same value.

mod death;
mod hostapd;
mod supplicant;

pub use death::DeathSubscription;
pub use hostapd::HostapdSession;
pub use supplicant::SupplicantSession;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wifictl_hal::Daemon;

use crate::error::CoreError;
use crate::poller::{PollOutcome, ReadinessPoller};

/// Lifecycle of a daemon session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    #[default]
    Stopped,
    Initializing,
    Ready,
    TearingDown,
}

/// Shared, observable session state.
#[derive(Clone)]
pub struct SessionCell {
    daemon: Daemon,
    tx: Arc<watch::Sender<SessionState>>,
}

impl SessionCell {
    pub fn new(daemon: Daemon) -> Self {
        let (tx, _) = watch::channel(SessionState::Stopped);
        Self {
            daemon,
            tx: Arc::new(tx),
        }
    }

    pub fn daemon(&self) -> Daemon {
        self.daemon
    }

    pub fn get(&self) -> SessionState {
        *self.tx.borrow()
    }

    pub fn set(&self, state: SessionState) {
        let previous = self.tx.send_replace(state);
        if previous != state {
            debug!(daemon = %self.daemon, from = %previous, to = %state, "session state");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

/// Poll `check` until the daemon reports ready and move the session to
/// `Ready`. Any other outcome moves it back to `Stopped`.
async fn wait_until_ready<F>(
    cell: &SessionCell,
    poller: &ReadinessPoller,
    cancel: &CancellationToken,
    check: F,
) -> Result<(), CoreError>
where
    F: FnMut() -> bool,
{
    let daemon = cell.daemon();
    match poller.await_ready_until(check, cancel).await {
        PollOutcome::Ready { tries } => {
            cell.set(SessionState::Ready);
            info!(%daemon, tries, "daemon ready");
            Ok(())
        }
        PollOutcome::Exhausted => {
            cell.set(SessionState::Stopped);
            warn!(%daemon, tries = poller.max_tries, "daemon never became ready");
            Err(CoreError::NotReady {
                daemon,
                tries: poller.max_tries,
            })
        }
        PollOutcome::Cancelled => {
            cell.set(SessionState::Stopped);
            warn!(%daemon, "readiness wait cancelled");
            Err(CoreError::Cancelled { daemon })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_publishes_transitions() {
        let cell = SessionCell::new(Daemon::Hostapd);
        let mut rx = cell.subscribe();
        assert_eq!(cell.get(), SessionState::Stopped);

        cell.set(SessionState::Initializing);
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(*rx.borrow_and_update(), SessionState::Initializing);
        assert_eq!(SessionState::TearingDown.to_string(), "TEARING_DOWN");
    }
}
