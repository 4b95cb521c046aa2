// ── Event hub and per-interface listeners ──
//
// Hardware-origin events arrive on HAL callback threads. The hub turns the
// single process-wide callback into a broadcast channel so any number of
// consumers can subscribe.

use std::sync::{Arc, OnceLock};

use tokio::sync::broadcast;
use tracing::{debug, trace};
use wifictl_hal::{EventCallback, IfaceEventListener, IfaceMode, WifiEvent};

use crate::error::CoreError;

const EVENT_CHANNEL_SIZE: usize = 256;

/// Fan-out point for every [`WifiEvent`].
#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<Arc<WifiEvent>>,
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<WifiEvent>> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: WifiEvent) {
        trace!(?event, "publishing event");
        // No subscribers is fine.
        let _ = self.tx.send(Arc::new(event));
    }

    /// The process-wide callback handed to HAL clients and listeners.
    pub fn callback(&self) -> EventCallback {
        let hub = self.clone();
        Arc::new(move |event| hub.publish(event))
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

// ── EventListener ────────────────────────────────────────────────

/// Listener bound to one interface and registered with the link-layer
/// daemon. Events received before a callback is registered are dropped.
pub struct EventListener {
    iface: String,
    mode: IfaceMode,
    callback: OnceLock<EventCallback>,
}

impl EventListener {
    pub fn new(mode: IfaceMode, iface: &str) -> Result<Arc<Self>, CoreError> {
        if iface.is_empty() {
            return Err(CoreError::ListenerCreation {
                mode,
                iface: iface.to_owned(),
            });
        }
        Ok(Arc::new(Self {
            iface: iface.to_owned(),
            mode,
            callback: OnceLock::new(),
        }))
    }

    pub fn mode(&self) -> IfaceMode {
        self.mode
    }

    /// Attach the process-wide callback. Only the first registration
    /// takes effect.
    pub fn register_event_callback(&self, callback: EventCallback) -> bool {
        self.callback.set(callback).is_ok()
    }
}

impl IfaceEventListener for EventListener {
    fn iface(&self) -> &str {
        &self.iface
    }

    fn on_event(&self, event: WifiEvent) {
        match self.callback.get() {
            Some(callback) => callback(event),
            None => debug!(iface = %self.iface, ?event, "event before callback registration"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_iface_name_is_rejected() {
        let err = EventListener::new(IfaceMode::Sta, "").err().unwrap();
        assert!(matches!(err, CoreError::ListenerCreation { .. }));
    }

    #[tokio::test]
    async fn listener_forwards_through_hub() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe();
        let listener = EventListener::new(IfaceMode::Ap, "wlan1").unwrap();

        listener.on_event(WifiEvent::ScanResultReady {
            iface: "wlan1".into(),
        });
        assert!(rx.try_recv().is_err());

        assert!(listener.register_event_callback(hub.callback()));
        assert!(!listener.register_event_callback(hub.callback()));
        listener.on_event(WifiEvent::HotspotClientChanged {
            iface: "wlan1".into(),
            num_stations: 1,
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.iface(), Some("wlan1"));
    }
}
