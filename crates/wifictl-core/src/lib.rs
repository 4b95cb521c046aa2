// ── Wi-Fi orchestration core ──
//
// Turns commands into ordered calls against the HAL contracts in
// `wifictl-hal`: readiness polling, per-mode interface lifecycle, daemon
// sessions with death notification, and the enable/disable state machine,
// all driven from a single controller task.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod iface;
pub mod indication;
pub mod orchestrator;
pub mod poller;
pub mod session;

pub use command::{Command, WifiResult};
pub use config::{OrchestratorConfig, RollbackPolicy};
pub use controller::Controller;
pub use error::CoreError;
pub use event::{EventHub, EventListener};
pub use iface::{InterfaceHandle, InterfaceInfo, InterfaceManager};
pub use indication::{IndicationRelay, RilMessage};
pub use orchestrator::{HalHandles, StatusSnapshot, WifiOrchestrator};
pub use poller::{PollOutcome, ReadinessPoller};
pub use session::{DeathSubscription, SessionState};
