//! Plugin protocol and capability registry
//!
//! - [`DataSourcePlugin`] turns device configuration into capability data
//! - [`CheckPlugin`] evaluates capability data against case parameters
//! - [`CapabilityRegistry`] catalogs both and answers suite compatibility
//! - [`SystemCommandExecutor`] runs whitelisted commands for live probes

pub mod command_executor;
pub mod errors;
pub mod registry;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use command_executor::{CommandError, CommandOutput, SystemCommandExecutor};
pub use errors::PluginError;
pub use registry::{
    is_valid_capability_tag, CapabilityRegistry, RegistryBuilder, RegistryMetadata,
    RegistryStatistics,
};
pub use traits::{envelope_parameters, flag, parameter, CheckPlugin, DataSourcePlugin};

// ============================================================================
// Module-level convenience functions
// ============================================================================

/// Create a new empty capability registry
pub fn create_registry() -> CapabilityRegistry {
    CapabilityRegistry::new()
}

/// Create a registry builder for fluent configuration
pub fn registry_builder() -> RegistryBuilder {
    RegistryBuilder::new()
}

/// Text of a caught plugin panic
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
