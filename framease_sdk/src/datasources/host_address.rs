//! Management address source
//!
//! Publishes a device's configured address as the `ip_address` capability
//! for live probes.

use framease_base::plugins::{DataSourcePlugin, PluginError};
use framease_base::types::CapabilityData;
use serde_json::Value;
use std::net::IpAddr;

pub const IP_ADDRESS_TAG: &str = "ip_address";

#[derive(Default)]
pub struct HostAddressSource;

impl HostAddressSource {
    pub fn new() -> Self {
        Self
    }
}

impl DataSourcePlugin for HostAddressSource {
    fn name(&self) -> &str {
        "host_address"
    }

    fn provides(&self) -> Vec<String> {
        vec![IP_ADDRESS_TAG.to_string()]
    }

    fn requires(&self) -> Vec<String> {
        vec![IP_ADDRESS_TAG.to_string()]
    }

    fn description(&self) -> &str {
        "Management address of a reachable device"
    }

    fn process(&self, bag: &CapabilityData) -> Result<CapabilityData, PluginError> {
        let address = bag
            .get(IP_ADDRESS_TAG)
            .and_then(Value::as_str)
            .map(str::trim)
            .ok_or_else(|| PluginError::missing_input(self.name(), IP_ADDRESS_TAG))?;

        if address.parse::<IpAddr>().is_err() && !is_hostname(address) {
            return Err(PluginError::execution(
                self.name(),
                format!("'{}' is neither an IP address nor a hostname", address),
            ));
        }

        let mut output = CapabilityData::new();
        output.insert(IP_ADDRESS_TAG.to_string(), Value::String(address.to_string()));
        Ok(output)
    }
}

/// RFC 1123 host name
fn is_hostname(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.len() > 253 {
        return false;
    }
    candidate.trim_end_matches('.').split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
