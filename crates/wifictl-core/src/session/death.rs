use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use wifictl_hal::{Daemon, DeathHandler};

type Unregister = Box<dyn FnOnce() + Send + Sync>;

/// A single-fire death notification registered with a HAL client.
///
/// The handler runs at most once, either when the daemon dies or never if
/// the subscription is cancelled or dropped first.
pub struct DeathSubscription {
    daemon: Daemon,
    armed: Arc<AtomicBool>,
    unregister: Option<Unregister>,
}

impl DeathSubscription {
    /// Build the handler, pass it to `register`, and remember how to
    /// unregister it.
    pub fn install<R, U, F>(daemon: Daemon, register: R, unregister: U, on_death: F) -> Self
    where
        R: FnOnce(DeathHandler),
        U: FnOnce() + Send + Sync + 'static,
        F: Fn(Daemon) + Send + Sync + 'static,
    {
        let armed = Arc::new(AtomicBool::new(true));
        let fired = Arc::clone(&armed);
        register(Arc::new(move || {
            if fired.swap(false, Ordering::AcqRel) {
                on_death(daemon);
            }
        }));
        debug!(%daemon, "death notification installed");
        Self {
            daemon,
            armed,
            unregister: Some(Box::new(unregister)),
        }
    }

    pub fn daemon(&self) -> Daemon {
        self.daemon
    }

    /// `false` once the handler has fired or the subscription was cancelled.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Disarm and unregister from the HAL client.
    pub fn cancel(mut self) {
        self.armed.store(false, Ordering::Release);
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
        debug!(daemon = %self.daemon, "death notification removed");
    }
}

impl Drop for DeathSubscription {
    fn drop(&mut self) {
        self.armed.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn subscription() -> (DeathSubscription, DeathHandler, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let slot: Arc<Mutex<Option<DeathHandler>>> = Arc::default();
        let fired = Arc::new(AtomicUsize::new(0));
        let unregistered = Arc::new(AtomicBool::new(false));

        let store = Arc::clone(&slot);
        let count = Arc::clone(&fired);
        let flag = Arc::clone(&unregistered);
        let sub = DeathSubscription::install(
            Daemon::Supplicant,
            move |h| *store.lock().unwrap() = Some(h),
            move || flag.store(true, Ordering::SeqCst),
            move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            },
        );
        let handler = slot.lock().unwrap().clone().unwrap();
        (sub, handler, fired, unregistered)
    }

    #[test]
    fn fires_only_once() {
        let (sub, handler, fired, _) = subscription();
        handler();
        handler();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!sub.is_armed());
    }

    #[test]
    fn cancelled_subscription_never_fires() {
        let (sub, handler, fired, unregistered) = subscription();
        sub.cancel();
        handler();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(unregistered.load(Ordering::SeqCst));
    }

    #[test]
    fn dropping_disarms_without_unregistering() {
        let (sub, handler, fired, unregistered) = subscription();
        drop(sub);
        handler();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!unregistered.load(Ordering::SeqCst));
    }
}
