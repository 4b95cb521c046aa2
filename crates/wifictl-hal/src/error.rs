use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result code reported by every HAL call and by every command result.
///
/// This is a small closed set. Anything that is not explicitly classified
/// (including readiness timeouts) is reported as [`ResultCode::ErrorUnknown`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    #[default]
    Success,
    ErrorCommandFailed,
    ErrorInvalidInterface,
    ErrorInvalidArgs,
    ErrorNotSupported,
    ErrorUnknown,
}

impl ResultCode {
    /// Numeric value as seen by the scripting-facing API.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Success => 0,
            Self::ErrorCommandFailed => 1,
            Self::ErrorInvalidInterface => 2,
            Self::ErrorInvalidArgs => 3,
            Self::ErrorNotSupported => 4,
            Self::ErrorUnknown => 9,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Error type shared by all HAL contracts.
///
/// HAL proxies report failure as a non-success [`ResultCode`]; the other
/// variants cover a proxy that could not be reached at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The HAL answered with a failure status.
    #[error("HAL returned {0}")]
    Status(ResultCode),

    /// The HAL service could not be obtained.
    #[error("{0} service unavailable")]
    ServiceUnavailable(&'static str),

    /// The remote call itself failed (binder / transport level).
    #[error("remote call failed: {0}")]
    Transport(String),
}

impl Error {
    pub fn command_failed() -> Self {
        Self::Status(ResultCode::ErrorCommandFailed)
    }

    /// The result code this error should surface as.
    pub fn code(&self) -> ResultCode {
        match self {
            Self::Status(code) => *code,
            Self::ServiceUnavailable(_) | Self::Transport(_) => ResultCode::ErrorUnknown,
        }
    }

    /// Returns `true` if retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_) | Self::Transport(_))
    }
}

pub type HalResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_keep_their_code() {
        let err = Error::Status(ResultCode::ErrorInvalidArgs);
        assert_eq!(err.code(), ResultCode::ErrorInvalidArgs);
        assert!(!err.is_transient());
    }

    #[test]
    fn unreachable_services_surface_as_unknown() {
        assert_eq!(
            Error::ServiceUnavailable("supplicant").code(),
            ResultCode::ErrorUnknown
        );
        assert!(Error::Transport("dead object".into()).is_transient());
    }

    #[test]
    fn result_codes_use_stable_names() {
        assert!(ResultCode::Success.is_success());
        assert!(!ResultCode::ErrorUnknown.is_success());
        assert_eq!(ResultCode::ErrorUnknown.to_string(), "ERROR_UNKNOWN");
    }
}
