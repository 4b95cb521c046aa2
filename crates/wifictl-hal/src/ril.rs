// ── Radio interface (cellular) acknowledgement seam ──

use serde::{Deserialize, Serialize};

use crate::error::HalResult;

/// Kind of an unsolicited radio indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicationType {
    Unsolicited,
    UnsolicitedAckExpected,
}

/// Kind of a solicited radio response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    Solicited,
    SolicitedAckExpected,
}

impl IndicationType {
    pub fn expects_ack(self) -> bool {
        self == Self::UnsolicitedAckExpected
    }
}

impl ResponseType {
    pub fn expects_ack(self) -> bool {
        self == Self::SolicitedAckExpected
    }
}

/// The radio HAL's acknowledgement entry point.
pub trait RadioAck: Send + Sync {
    fn response_acknowledgement(&self) -> HalResult<()>;
}
