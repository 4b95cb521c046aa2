// ── Runtime orchestration configuration ──
//
// Tuning knobs for the orchestrator. They never touch disk: the CLI (via
// wifictl-config) builds an `OrchestratorConfig` and hands it in.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Interval between readiness checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Readiness checks before giving up (about 5 s with the default interval).
pub const DEFAULT_POLL_MAX_TRIES: u32 = 50;

/// What to do with resources acquired earlier in a start sequence that
/// fails partway.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RollbackPolicy {
    /// Return the first error. Only a failed link-layer registration is
    /// undone; the module, interface and session stay allocated.
    #[default]
    FailFast,
    /// Release everything acquired so far in reverse order, best-effort,
    /// then return the original error.
    Unwind,
}

/// Configuration for one orchestrator instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub poll_interval: Duration,
    pub poll_max_tries: u32,
    pub rollback: RollbackPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_max_tries: DEFAULT_POLL_MAX_TRIES,
            rollback: RollbackPolicy::default(),
        }
    }
}
