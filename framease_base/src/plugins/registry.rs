//! Capability registry for data-source and check plugins
//!
//! Populated once at process start through explicit registration calls, then
//! shared read-only. Answers plugin lookups and the capability questions a
//! scheduler asks: what a device provides, what a suite requires, and which
//! suites a device can run.

use crate::plugins::errors::PluginError;
use crate::plugins::traits::{CheckPlugin, DataSourcePlugin};
use crate::types::{DeviceCapabilitySet, TestSuite};
use chrono::{DateTime, Utc};
use framease_parser::logging::codes;
use framease_parser::{log_debug, log_success, log_warning};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

static TAG_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Capability tags and input names are lowercase identifiers
pub fn is_valid_capability_tag(tag: &str) -> bool {
    TAG_PATTERN
        .get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").ok())
        .as_ref()
        .map(|pattern| pattern.is_match(tag))
        .unwrap_or(false)
}

/// Catalog of available plugins keyed by name
pub struct CapabilityRegistry {
    data_sources: BTreeMap<String, Box<dyn DataSourcePlugin>>,
    checks: BTreeMap<String, Box<dyn CheckPlugin>>,
    metadata: RegistryMetadata,
}

#[derive(Debug, Clone)]
pub struct RegistryMetadata {
    pub creation_time: DateTime<Utc>,
    pub last_registration: Option<DateTime<Utc>>,
}

impl CapabilityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            data_sources: BTreeMap::new(),
            checks: BTreeMap::new(),
            metadata: RegistryMetadata {
                creation_time: Utc::now(),
                last_registration: None,
            },
        }
    }

    pub fn register_data_source<P>(&mut self, plugin: P) -> Result<(), PluginError>
    where
        P: DataSourcePlugin + 'static,
    {
        let name = plugin.name().to_string();
        if self.data_sources.contains_key(&name) {
            return Err(PluginError::DuplicatePlugin { name });
        }
        validate_tags(&name, plugin.provides().iter().chain(plugin.requires().iter()))?;

        log_debug!("Registered data source", "plugin" => &name,
            "provides" => plugin.provides().join(","));
        self.data_sources.insert(name, Box::new(plugin));
        self.metadata.last_registration = Some(Utc::now());
        Ok(())
    }

    pub fn register_check<P>(&mut self, plugin: P) -> Result<(), PluginError>
    where
        P: CheckPlugin + 'static,
    {
        let name = plugin.name().to_string();
        if self.checks.contains_key(&name) {
            return Err(PluginError::DuplicatePlugin { name });
        }
        validate_tags(&name, plugin.requires().iter())?;

        log_debug!("Registered check", "plugin" => &name,
            "requires" => plugin.requires().join(","));
        self.checks.insert(name, Box::new(plugin));
        self.metadata.last_registration = Some(Utc::now());
        Ok(())
    }

    pub fn data_source(&self, name: &str) -> Result<&dyn DataSourcePlugin, PluginError> {
        self.data_sources
            .get(name)
            .map(|plugin| plugin.as_ref())
            .ok_or_else(|| PluginError::PluginNotFound {
                name: name.to_string(),
            })
    }

    pub fn check(&self, name: &str) -> Result<&dyn CheckPlugin, PluginError> {
        self.checks
            .get(name)
            .map(|plugin| plugin.as_ref())
            .ok_or_else(|| PluginError::PluginNotFound {
                name: name.to_string(),
            })
    }

    pub fn has_data_source(&self, name: &str) -> bool {
        self.data_sources.contains_key(name)
    }

    pub fn has_check(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Data source names in sorted order
    pub fn list_data_sources(&self) -> Vec<String> {
        self.data_sources.keys().cloned().collect()
    }

    /// Check names in sorted order
    pub fn list_checks(&self) -> Vec<String> {
        self.checks.keys().cloned().collect()
    }

    pub fn data_sources(&self) -> impl Iterator<Item = &dyn DataSourcePlugin> {
        self.data_sources.values().map(|plugin| plugin.as_ref())
    }

    pub fn checks(&self) -> impl Iterator<Item = &dyn CheckPlugin> {
        self.checks.values().map(|plugin| plugin.as_ref())
    }

    pub fn metadata(&self) -> &RegistryMetadata {
        &self.metadata
    }

    // ========================================================================
    // Capability matching
    // ========================================================================

    /// Union of the tags provided by a device's configured data sources.
    ///
    /// Data sources missing from the registry contribute nothing.
    pub fn provided_tags(&self, device: &DeviceCapabilitySet) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        for instance in device.data_sources() {
            match self.data_source(&instance.plugin) {
                Ok(plugin) => tags.extend(plugin.provides()),
                Err(e) => {
                    log_warning!(code = e.error_code(), "Device references unknown data source",
                        "device" => &device.device,
                        "plugin" => &instance.plugin);
                }
            }
        }
        tags
    }

    /// Union of the tags required by every case of a suite
    pub fn suite_requirements(&self, suite: &TestSuite) -> Result<BTreeSet<String>, PluginError> {
        let mut tags = BTreeSet::new();
        for case in suite.cases() {
            tags.extend(self.check(&case.plugin)?.requires());
        }
        Ok(tags)
    }

    /// Whether every requirement of `suite` is provided by `device`
    pub fn is_compatible(&self, device: &DeviceCapabilitySet, suite: &TestSuite) -> bool {
        let provided = self.provided_tags(device);
        self.is_compatible_with(&provided, suite)
    }

    /// Suites whose aggregate requirements the device satisfies, in input order.
    ///
    /// Suites that reference unknown check plugins are excluded.
    pub fn compatible_suites<'a>(
        &self,
        device: &DeviceCapabilitySet,
        suites: &'a [TestSuite],
    ) -> Vec<&'a TestSuite> {
        let provided = self.provided_tags(device);
        suites
            .iter()
            .filter(|suite| self.is_compatible_with(&provided, suite))
            .collect()
    }

    fn is_compatible_with(&self, provided: &BTreeSet<String>, suite: &TestSuite) -> bool {
        match self.suite_requirements(suite) {
            Ok(required) => required.is_subset(provided),
            Err(e) => {
                log_warning!(code = e.error_code(), "Suite references unknown check plugin",
                    "suite" => &suite.id,
                    "error" => &e);
                false
            }
        }
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    pub fn unregister_data_source(&mut self, name: &str) -> Result<(), PluginError> {
        self.data_sources
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PluginError::PluginNotFound {
                name: name.to_string(),
            })
    }

    pub fn unregister_check(&mut self, name: &str) -> Result<(), PluginError> {
        self.checks
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PluginError::PluginNotFound {
                name: name.to_string(),
            })
    }

    /// Clear all registered plugins
    pub fn clear(&mut self) {
        self.data_sources.clear();
        self.checks.clear();
        self.metadata.last_registration = None;
    }

    pub fn get_statistics(&self) -> RegistryStatistics {
        let provided: BTreeSet<String> = self
            .data_sources
            .values()
            .flat_map(|plugin| plugin.provides())
            .collect();
        let required: BTreeSet<String> = self
            .checks
            .values()
            .flat_map(|plugin| plugin.requires())
            .collect();
        let unsatisfiable_checks = self
            .checks
            .iter()
            .filter(|(_, plugin)| plugin.requires().iter().any(|tag| !provided.contains(tag)))
            .map(|(name, _)| name.clone())
            .collect();

        RegistryStatistics {
            total_data_sources: self.data_sources.len(),
            total_checks: self.checks.len(),
            provided_tags: provided.len(),
            required_tags: required.len(),
            unsatisfiable_checks,
            creation_time: self.metadata.creation_time,
            last_registration: self.metadata.last_registration,
        }
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_tags<'a>(
    plugin: &str,
    tags: impl Iterator<Item = &'a String>,
) -> Result<(), PluginError> {
    for tag in tags {
        if !is_valid_capability_tag(tag) {
            return Err(PluginError::InvalidCapabilityTag {
                plugin: plugin.to_string(),
                tag: tag.clone(),
            });
        }
    }
    Ok(())
}

/// Registry statistics
#[derive(Debug, Clone)]
pub struct RegistryStatistics {
    pub total_data_sources: usize,
    pub total_checks: usize,
    pub provided_tags: usize,
    pub required_tags: usize,
    /// Checks requiring a tag no registered data source provides
    pub unsatisfiable_checks: Vec<String>,
    pub creation_time: DateTime<Utc>,
    pub last_registration: Option<DateTime<Utc>>,
}

// ============================================================================
// Registry Builder
// ============================================================================

/// Fluent builder for registry construction
pub struct RegistryBuilder {
    registry: CapabilityRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            registry: CapabilityRegistry::new(),
        }
    }

    pub fn add_data_source<P>(mut self, plugin: P) -> Result<Self, PluginError>
    where
        P: DataSourcePlugin + 'static,
    {
        self.registry.register_data_source(plugin)?;
        Ok(self)
    }

    pub fn add_check<P>(mut self, plugin: P) -> Result<Self, PluginError>
    where
        P: CheckPlugin + 'static,
    {
        self.registry.register_check(plugin)?;
        Ok(self)
    }

    pub fn build(self) -> CapabilityRegistry {
        log_success!(codes::success::REGISTRY_READY, "Capability registry ready",
            "data_sources" => self.registry.data_sources.len(),
            "checks" => self.registry.checks.len());
        self.registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::{StaticCheck, StaticSource};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn registry() -> CapabilityRegistry {
        RegistryBuilder::new()
            .add_data_source(StaticSource::new("offline", &["fgt_cli_configuration"], &["file"]))
            .unwrap()
            .add_data_source(StaticSource::new("address", &["ip_address"], &["ip_address"]))
            .unwrap()
            .add_check(StaticCheck::passing("setting", &["fgt_cli_configuration"]))
            .unwrap()
            .add_check(StaticCheck::passing("ping", &["ip_address"]))
            .unwrap()
            .build()
    }

    fn suite(id: &str, plugins: &[&str]) -> TestSuite {
        let mut suite = TestSuite::new(id);
        for (i, plugin) in plugins.iter().enumerate() {
            suite.add_case(*plugin, i as u32 + 1, json!({}));
        }
        suite
    }

    #[test]
    fn test_tag_validation() {
        assert!(is_valid_capability_tag("fgt_cli_configuration"));
        assert!(is_valid_capability_tag("ip_address"));
        assert!(!is_valid_capability_tag("IP Address"));
        assert!(!is_valid_capability_tag(""));
        assert!(!is_valid_capability_tag("1abc"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = registry();
        let err = registry
            .register_check(StaticCheck::passing("ping", &[]))
            .unwrap_err();
        assert_matches!(err, PluginError::DuplicatePlugin { name } if name == "ping");
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let err = CapabilityRegistry::new()
            .register_data_source(StaticSource::new("bad", &["Bad-Tag"], &[]))
            .unwrap_err();
        assert_matches!(err, PluginError::InvalidCapabilityTag { .. });
    }

    #[test]
    fn test_lookup_not_found() {
        let registry = registry();
        assert!(registry.check("setting").is_ok());
        assert_matches!(
            registry.check("nope").err(),
            Some(PluginError::PluginNotFound { name }) if name == "nope"
        );
        assert_matches!(
            registry.data_source("nope").err(),
            Some(PluginError::PluginNotFound { .. })
        );
    }

    #[test]
    fn test_suite_compatibility() {
        let registry = registry();
        let both = suite("both", &["setting", "ping"]);
        let config_only = suite("config", &["setting"]);
        let broken = suite("broken", &["unknown"]);
        let suites = vec![both, config_only, broken];

        let mut device = DeviceCapabilitySet::new("fw1");
        device.add_data_source("offline", Default::default());
        let compatible: Vec<&str> = registry
            .compatible_suites(&device, &suites)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(compatible, vec!["config"]);

        device.add_data_source("address", Default::default());
        let compatible: Vec<&str> = registry
            .compatible_suites(&device, &suites)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(compatible, vec!["both", "config"]);
    }

    #[test]
    fn test_suite_requirements() {
        let registry = registry();
        let required = registry
            .suite_requirements(&suite("both", &["setting", "ping"]))
            .unwrap();
        assert_eq!(
            required.into_iter().collect::<Vec<_>>(),
            vec!["fgt_cli_configuration", "ip_address"]
        );
    }

    #[test]
    fn test_statistics_and_maintenance() {
        let mut registry = registry();
        registry
            .register_check(StaticCheck::passing("orphan", &["snmp_walk"]))
            .unwrap();

        let stats = registry.get_statistics();
        assert_eq!(stats.total_data_sources, 2);
        assert_eq!(stats.total_checks, 3);
        assert_eq!(stats.unsatisfiable_checks, vec!["orphan"]);

        registry.unregister_check("orphan").unwrap();
        assert!(!registry.has_check("orphan"));
        assert!(registry.unregister_check("orphan").is_err());

        registry.clear();
        assert!(registry.list_checks().is_empty());
        assert!(registry.list_data_sources().is_empty());
    }
}
