//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use wifictl_config::ConfigError;
use wifictl_core::CoreError;
use wifictl_hal::ResultCode;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const COMMAND_FAILED: i32 = 3;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Command outcome ──────────────────────────────────────────────

    #[error("{command} failed with {status}: {message}")]
    #[diagnostic(
        code(wifictl::command_failed),
        help(
            "Run again with --trace to see the HAL calls made before the failure,\n\
             or -vv for the orchestrator log."
        )
    )]
    CommandFailed {
        command: &'static str,
        status: ResultCode,
        message: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(
        code(wifictl::validation),
        help("`wifictl config show` prints the effective configuration.")
    )]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(wifictl::config),
        help("Check the file printed by `wifictl config path` and any WIFICTL_* variables.")
    )]
    Config(ConfigError),

    // ── Runtime ──────────────────────────────────────────────────────

    #[error("Controller error: {0}")]
    #[diagnostic(code(wifictl::controller))]
    Controller(#[from] CoreError),

    #[error(transparent)]
    #[diagnostic(code(wifictl::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed { .. } => exit_code::COMMAND_FAILED,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config(_) | Self::Controller(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
