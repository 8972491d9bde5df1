//! Device data-source configuration

use crate::types::CapabilityData;
use serde::{Deserialize, Serialize};

/// One configured data source of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceInstance {
    pub plugin: String,
    pub sequence: u32,
    /// Stored inputs keyed by required input name
    #[serde(default)]
    pub data: CapabilityData,
}

/// A device's ordered data sources
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceCapabilitySet {
    pub device: String,
    #[serde(default)]
    data_sources: Vec<DataSourceInstance>,
}

impl DeviceCapabilitySet {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            data_sources: Vec::new(),
        }
    }

    /// Next free sequence: one past the highest in use, 1 when empty
    pub fn next_sequence(&self) -> u32 {
        self.data_sources
            .iter()
            .map(|instance| instance.sequence)
            .max()
            .map(|max| max + 1)
            .unwrap_or(1)
    }

    /// Append a data source and return its assigned sequence
    pub fn add_data_source(&mut self, plugin: impl Into<String>, data: CapabilityData) -> u32 {
        let sequence = self.next_sequence();
        self.data_sources.push(DataSourceInstance {
            plugin: plugin.into(),
            sequence,
            data,
        });
        sequence
    }

    pub fn remove_data_source(&mut self, sequence: u32) -> Option<DataSourceInstance> {
        let index = self
            .data_sources
            .iter()
            .position(|instance| instance.sequence == sequence)?;
        Some(self.data_sources.remove(index))
    }

    /// Data sources in insertion order
    pub fn data_sources(&self) -> &[DataSourceInstance] {
        &self.data_sources
    }

    /// Data sources by ascending sequence; ties keep insertion order
    pub fn ordered_instances(&self) -> Vec<&DataSourceInstance> {
        let mut ordered: Vec<&DataSourceInstance> = self.data_sources.iter().collect();
        ordered.sort_by_key(|instance| instance.sequence);
        ordered
    }
}
