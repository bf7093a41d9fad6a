//! Inbound commands to the monitor service.
//!
//! These represent actions requested by the outside world (web settings
//! endpoint, serial console) that the
//! [`MonitorService`](super::service::MonitorService) interprets and acts
//! upon.

use crate::config::SettingsPatch;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Apply a partial settings update (validated before application).
    ApplySettings(SettingsPatch),

    /// Explicitly persist the current config immediately.
    SaveConfig,

    /// Drop the stored configuration and revert to defaults.
    FactoryReset,
}
