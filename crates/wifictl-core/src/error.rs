// ── Core error types ──
//
// Orchestration errors. Every variant collapses onto the closed HAL result
// code set via `CoreError::status()`, which is what command results carry.

use thiserror::Error;
use wifictl_hal::{Daemon, IfaceMode, ResultCode};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── HAL errors ───────────────────────────────────────────────────
    #[error("{op} failed: {source}")]
    Hal {
        op: &'static str,
        #[source]
        source: wifictl_hal::Error,
    },

    // ── Session errors ───────────────────────────────────────────────
    #[error("{daemon} did not become ready after {tries} checks")]
    NotReady { daemon: Daemon, tries: u32 },

    #[error("Wait for {daemon} readiness was cancelled")]
    Cancelled { daemon: Daemon },

    // ── Interface errors ─────────────────────────────────────────────
    #[error("A {mode} interface is already active ({name})")]
    AlreadyActive { mode: IfaceMode, name: String },

    #[error("No {mode} interface is active")]
    NoInterface { mode: IfaceMode },

    #[error("Could not create event listener for {mode} interface {iface:?}")]
    ListenerCreation { mode: IfaceMode, iface: String },

    // ── Command errors ───────────────────────────────────────────────
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Controller is not running")]
    ControllerStopped,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Attach the name of the failing HAL operation.
    pub fn hal(op: &'static str) -> impl FnOnce(wifictl_hal::Error) -> Self {
        move |source| Self::Hal { op, source }
    }

    /// The result code reported for this error.
    pub fn status(&self) -> ResultCode {
        match self {
            Self::Hal { source, .. } => source.code(),
            Self::AlreadyActive { .. } | Self::ListenerCreation { .. } => {
                ResultCode::ErrorCommandFailed
            }
            Self::InvalidArgument { .. } => ResultCode::ErrorInvalidArgs,
            Self::NotReady { .. }
            | Self::Cancelled { .. }
            | Self::NoInterface { .. }
            | Self::ControllerStopped
            | Self::Internal(_) => ResultCode::ErrorUnknown,
        }
    }
}
