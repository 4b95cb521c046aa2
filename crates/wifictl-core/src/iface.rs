// ── Mode interface manager ──
//
// Owns at most one live interface per mode. Names come from the radio
// module; this layer never picks them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use wifictl_hal::{IfaceMode, RadioModule};

use crate::error::CoreError;
use crate::event::EventListener;

/// A live interface and its listener registration.
#[derive(Clone)]
pub struct InterfaceHandle {
    pub mode: IfaceMode,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub listener: Option<Arc<EventListener>>,
    /// Registered with the link-layer daemon.
    pub registered: bool,
}

/// Serializable view of an [`InterfaceHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    pub mode: IfaceMode,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub registered: bool,
}

impl From<&InterfaceHandle> for InterfaceInfo {
    fn from(handle: &InterfaceHandle) -> Self {
        Self {
            mode: handle.mode,
            name: handle.name.clone(),
            created_at: handle.created_at,
            registered: handle.registered,
        }
    }
}

pub struct InterfaceManager {
    radio: Arc<dyn RadioModule>,
    sta: Option<InterfaceHandle>,
    ap: Option<InterfaceHandle>,
}

impl InterfaceManager {
    pub fn new(radio: Arc<dyn RadioModule>) -> Self {
        Self {
            radio,
            sta: None,
            ap: None,
        }
    }

    fn slot(&self, mode: IfaceMode) -> &Option<InterfaceHandle> {
        match mode {
            IfaceMode::Sta => &self.sta,
            IfaceMode::Ap => &self.ap,
        }
    }

    fn slot_mut(&mut self, mode: IfaceMode) -> &mut Option<InterfaceHandle> {
        match mode {
            IfaceMode::Sta => &mut self.sta,
            IfaceMode::Ap => &mut self.ap,
        }
    }

    /// Configure the chip for `mode` and record the interface it reports.
    /// A chip that reports no name has not produced a usable interface:
    /// the mode is torn down again and nothing is recorded.
    pub fn create_interface(&mut self, mode: IfaceMode) -> Result<String, CoreError> {
        if let Some(live) = self.slot(mode) {
            return Err(CoreError::AlreadyActive {
                mode,
                name: live.name.clone(),
            });
        }

        let name = self
            .radio
            .configure_chip_and_create_iface(mode)
            .map_err(CoreError::hal("configure_chip_and_create_iface"))?;
        if name.is_empty() {
            warn!(%mode, "chip reported an empty interface name");
            if let Err(e) = self.radio.teardown_iface(mode) {
                warn!(%mode, error = %e, "teardown of unnamed interface failed");
            }
            return Err(CoreError::hal("configure_chip_and_create_iface")(
                wifictl_hal::Error::command_failed(),
            ));
        }
        info!(%mode, iface = %name, "interface created");

        *self.slot_mut(mode) = Some(InterfaceHandle {
            mode,
            name: name.clone(),
            created_at: Utc::now(),
            listener: None,
            registered: false,
        });
        Ok(name)
    }

    /// Tear down the interface for `mode`. Nothing live is not an error.
    pub fn destroy_interface(&mut self, mode: IfaceMode) -> Result<(), CoreError> {
        let Some(handle) = self.slot(mode).as_ref() else {
            debug!(%mode, "no interface to destroy");
            return Ok(());
        };
        let name = handle.name.clone();
        self.radio
            .teardown_iface(mode)
            .map_err(CoreError::hal("teardown_iface"))?;
        *self.slot_mut(mode) = None;
        info!(%mode, iface = %name, "interface destroyed");
        Ok(())
    }

    pub fn handle(&self, mode: IfaceMode) -> Option<&InterfaceHandle> {
        self.slot(mode).as_ref()
    }

    /// Name of the live interface for `mode`, if any.
    pub fn name(&self, mode: IfaceMode) -> Option<&str> {
        self.slot(mode).as_ref().map(|h| h.name.as_str())
    }

    pub fn bind_listener(&mut self, mode: IfaceMode, listener: Arc<EventListener>) {
        if let Some(handle) = self.slot_mut(mode) {
            handle.listener = Some(listener);
        }
    }

    pub fn set_registered(&mut self, mode: IfaceMode, registered: bool) {
        if let Some(handle) = self.slot_mut(mode) {
            handle.registered = registered;
        }
    }

    pub fn info(&self, mode: IfaceMode) -> Option<InterfaceInfo> {
        self.slot(mode).as_ref().map(InterfaceInfo::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wifictl_hal::{HalOp, SimHal};

    use super::*;

    fn loaded_sim() -> Arc<SimHal> {
        let sim = Arc::new(SimHal::default());
        sim.start_module().unwrap();
        sim
    }

    #[test]
    fn at_most_one_interface_per_mode() {
        let sim = loaded_sim();
        let mut ifaces = InterfaceManager::new(sim.clone());

        assert_eq!(ifaces.create_interface(IfaceMode::Sta).unwrap(), "wlan0");
        let err = ifaces.create_interface(IfaceMode::Sta).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyActive { mode: IfaceMode::Sta, .. }));
        assert_eq!(sim.count(HalOp::ConfigureChip), 1);

        assert_eq!(ifaces.create_interface(IfaceMode::Ap).unwrap(), "wlan1");
    }

    #[test]
    fn destroy_is_idempotent() {
        let sim = loaded_sim();
        let mut ifaces = InterfaceManager::new(sim.clone());

        ifaces.destroy_interface(IfaceMode::Sta).unwrap();
        assert_eq!(sim.count(HalOp::TeardownIface), 0);

        ifaces.create_interface(IfaceMode::Sta).unwrap();
        ifaces.destroy_interface(IfaceMode::Sta).unwrap();
        ifaces.destroy_interface(IfaceMode::Sta).unwrap();
        assert_eq!(sim.count(HalOp::TeardownIface), 1);
        assert!(ifaces.name(IfaceMode::Sta).is_none());
    }

    #[test]
    fn unnamed_interface_is_not_recorded() {
        let sim = Arc::new(SimHal::builder().sta_iface("").build());
        sim.start_module().unwrap();
        let mut ifaces = InterfaceManager::new(sim.clone());

        let err = ifaces.create_interface(IfaceMode::Sta).unwrap_err();

        assert!(matches!(err, CoreError::Hal { op: "configure_chip_and_create_iface", .. }));
        assert!(ifaces.name(IfaceMode::Sta).is_none());
        assert_eq!(sim.count(HalOp::TeardownIface), 1);
        assert!(!sim.module_loaded());
    }

    #[test]
    fn chip_failure_leaves_no_handle() {
        let sim = Arc::new(SimHal::builder().fail(HalOp::ConfigureChip).build());
        let mut ifaces = InterfaceManager::new(sim);
        assert!(ifaces.create_interface(IfaceMode::Ap).is_err());
        assert!(ifaces.handle(IfaceMode::Ap).is_none());
    }
}
