// ── Radio indication relay ──
//
// Radio HAL indications and responses arrive on a HAL callback thread.
// The relay acknowledges them there when the HAL asks for it, then hands
// the message to the control loop through a channel.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use wifictl_hal::{IndicationType, RadioAck, ResponseType};

/// A radio message on its way to the control loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RilMessage {
    Indication {
        name: String,
        payload: Value,
    },
    Response {
        name: String,
        token: i32,
        error: i32,
        payload: Value,
    },
}

pub struct IndicationRelay {
    radio: Arc<dyn RadioAck>,
    tx: mpsc::UnboundedSender<RilMessage>,
}

impl IndicationRelay {
    pub fn new(radio: Arc<dyn RadioAck>) -> (Self, mpsc::UnboundedReceiver<RilMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { radio, tx }, rx)
    }

    /// Handle an unsolicited indication. Returns whether it was dispatched.
    pub fn process_indication(&self, kind: IndicationType, name: &str, payload: Value) -> bool {
        debug!(?kind, name, "radio indication");
        if kind.expects_ack() {
            self.send_ack();
        }
        self.dispatch(RilMessage::Indication {
            name: name.to_owned(),
            payload,
        })
    }

    /// Handle a solicited response. Responses to internal requests carry a
    /// non-positive token and are acknowledged but not dispatched.
    pub fn process_response(
        &self,
        kind: ResponseType,
        token: i32,
        name: &str,
        error: i32,
        payload: Value,
    ) -> bool {
        debug!(?kind, token, name, "radio response");
        if kind.expects_ack() {
            self.send_ack();
        }
        if token <= 0 {
            debug!(token, name, "internal response, not dispatched");
            return false;
        }
        self.dispatch(RilMessage::Response {
            name: name.to_owned(),
            token,
            error,
            payload,
        })
    }

    fn send_ack(&self) {
        match self.radio.response_acknowledgement() {
            Ok(()) => info!("acknowledged radio message"),
            Err(e) => error!(error = %e, "radio acknowledgement failed"),
        }
    }

    fn dispatch(&self, message: RilMessage) -> bool {
        if self.tx.send(message).is_err() {
            error!("control loop gone, dropping radio message");
            return false;
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wifictl_hal::{HalOp, SimHal};

    use super::*;

    #[test]
    fn ack_is_sent_only_when_expected() {
        let sim = Arc::new(SimHal::default());
        let (relay, mut rx) = IndicationRelay::new(sim.clone());

        assert!(relay.process_indication(IndicationType::Unsolicited, "signalStrength", json!({})));
        assert_eq!(sim.count(HalOp::Ack), 0);

        assert!(relay.process_indication(
            IndicationType::UnsolicitedAckExpected,
            "radioStateChanged",
            json!({ "state": 10 })
        ));
        assert_eq!(sim.count(HalOp::Ack), 1);

        assert!(matches!(rx.try_recv().unwrap(), RilMessage::Indication { .. }));
        let second = rx.try_recv().unwrap();
        assert_eq!(
            second,
            RilMessage::Indication {
                name: "radioStateChanged".into(),
                payload: json!({ "state": 10 }),
            }
        );
    }

    #[test]
    fn internal_responses_are_acked_but_not_dispatched() {
        let sim = Arc::new(SimHal::default());
        let (relay, mut rx) = IndicationRelay::new(sim.clone());

        assert!(!relay.process_response(ResponseType::SolicitedAckExpected, 0, "getIccCardStatus", 0, json!(null)));
        assert_eq!(sim.count(HalOp::Ack), 1);
        assert!(rx.try_recv().is_err());

        assert!(relay.process_response(ResponseType::Solicited, 12, "getOperator", 0, json!(["Op"])));
        assert_eq!(sim.count(HalOp::Ack), 1);
        assert!(matches!(rx.try_recv().unwrap(), RilMessage::Response { token: 12, .. }));
    }

    #[test]
    fn closed_control_loop_drops_messages() {
        let sim = Arc::new(SimHal::default());
        let (relay, rx) = IndicationRelay::new(sim);
        drop(rx);
        assert!(!relay.process_indication(IndicationType::Unsolicited, "nitz", json!({})));
    }
}
