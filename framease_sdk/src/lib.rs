//! # framease SDK
//!
//! Built-in plugins for FortiGate configuration compliance.
//! Provides the offline configuration data source, live host probing, and the
//! setting, per-entry, version, manual and legacy dictionary checks.

pub mod checks;
pub mod commands;
pub mod datasources;

use framease_base::plugins::{CapabilityRegistry, PluginError, RegistryBuilder};
use std::time::Duration;

/// Create a registry with all built-in plugins
///
/// Data sources:
/// - `fortigate_offline` - parses an offline configuration dump
/// - `host_address` - publishes a device's management address
///
/// Checks:
/// - `fg_setting`, `fg_each`, `fg_version`, `manual`, `validate_dict_key`, `ping`
pub fn create_plugin_registry() -> Result<CapabilityRegistry, PluginError> {
    create_plugin_registry_with_timeout(commands::DEFAULT_PROBE_TIMEOUT)
}

/// Same as [`create_plugin_registry`] with a custom live-probe timeout
pub fn create_plugin_registry_with_timeout(
    probe_timeout: Duration,
) -> Result<CapabilityRegistry, PluginError> {
    let registry = RegistryBuilder::new()
        .add_data_source(datasources::FortigateOfflineSource::new())?
        .add_data_source(datasources::HostAddressSource::new())?
        .add_check(checks::SettingCheck::new())?
        .add_check(checks::EachEntryCheck::new())?
        .add_check(checks::VersionCheck::new())?
        .add_check(checks::ManualCheck::new())?
        .add_check(checks::DictKeyCheck::new())?
        .add_check(checks::PingCheck::new(commands::create_ping_command_executor(
            probe_timeout,
        )))?
        .build();
    Ok(registry)
}
