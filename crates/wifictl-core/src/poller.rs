// ── Readiness poller ──
//
// Bounded, fixed-interval wait for a subsystem that finishes its own
// initialization in the background. The check itself is synchronous; the
// wait between checks is a timer, so the task yields instead of spinning.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::config::OrchestratorConfig;

/// Outcome of a cancellable readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// `check` returned true on call number `tries`.
    Ready { tries: u32 },
    /// `check` never returned true within the budget.
    Exhausted,
    Cancelled,
}

impl PollOutcome {
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPoller {
    pub interval: Duration,
    pub max_tries: u32,
}

impl ReadinessPoller {
    pub fn new(interval: Duration, max_tries: u32) -> Self {
        Self {
            interval,
            max_tries,
        }
    }

    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self::new(config.poll_interval, config.poll_max_tries)
    }

    /// Upper bound on the time a failed wait takes.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_tries
    }

    /// Call `check` up to `max_tries` times, sleeping `interval` after every
    /// negative answer. Returns on the first positive answer.
    pub async fn await_ready<F>(&self, check: F) -> bool
    where
        F: FnMut() -> bool,
    {
        self.await_ready_until(check, &CancellationToken::new())
            .await
            .is_ready()
    }

    /// Like [`await_ready`](Self::await_ready), but gives up as soon as
    /// `cancel` fires.
    pub async fn await_ready_until<F>(&self, mut check: F, cancel: &CancellationToken) -> PollOutcome
    where
        F: FnMut() -> bool,
    {
        for attempt in 1..=self.max_tries {
            if cancel.is_cancelled() {
                return PollOutcome::Cancelled;
            }
            if check() {
                return PollOutcome::Ready { tries: attempt };
            }
            trace!(attempt, max_tries = self.max_tries, "not ready yet");
            tokio::select! {
                biased;
                () = cancel.cancelled() => return PollOutcome::Cancelled,
                () = tokio::time::sleep(self.interval) => {}
            }
        }
        PollOutcome::Exhausted
    }
}

impl Default for ReadinessPoller {
    fn default() -> Self {
        Self::from_config(&OrchestratorConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use tokio::time::Instant;

    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn ready_after_k_checks_stops_checking() {
        let poller = ReadinessPoller::new(INTERVAL, 50);
        let calls = Cell::new(0u32);
        let start = Instant::now();

        let ready = poller
            .await_ready(|| {
                calls.set(calls.get() + 1);
                calls.get() == 3
            })
            .await;

        assert!(ready);
        assert_eq!(calls.get(), 3);
        assert_eq!(start.elapsed(), INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn never_ready_exhausts_the_budget() {
        let poller = ReadinessPoller::new(INTERVAL, 50);
        let calls = Cell::new(0u32);
        let start = Instant::now();

        let ready = poller
            .await_ready(|| {
                calls.set(calls.get() + 1);
                false
            })
            .await;

        assert!(!ready);
        assert_eq!(calls.get(), 50);
        assert_eq!(start.elapsed(), poller.budget());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_readiness_does_not_sleep() {
        let poller = ReadinessPoller::default();
        let start = Instant::now();
        assert_eq!(
            poller.await_ready_until(|| true, &CancellationToken::new()).await,
            PollOutcome::Ready { tries: 1 }
        );
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_wait() {
        let poller = ReadinessPoller::new(INTERVAL, 50);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let outcome = poller.await_ready_until(|| false, &cancel).await;

        assert_eq!(outcome, PollOutcome::Cancelled);
        assert!(start.elapsed() < poller.budget());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_never_checks() {
        let poller = ReadinessPoller::new(INTERVAL, 0);
        let calls = Cell::new(0u32);
        let ready = poller
            .await_ready(|| {
                calls.set(calls.get() + 1);
                true
            })
            .await;
        assert!(!ready);
        assert_eq!(calls.get(), 0);
    }
}
