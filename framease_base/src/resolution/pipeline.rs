//! Data-source pipeline
//!
//! Runs a device's data sources in sequence order, threading one capability
//! bag through all of them. Any failure aborts resolution: checks never see
//! partial capability data.

use crate::plugins::{panic_message, CapabilityRegistry, DataSourcePlugin, PluginError};
use crate::resolution::error::PipelineError;
use crate::resolution::files::{expand_file_markers, has_input};
use crate::types::{CapabilityData, DataSourceInstance, DeviceCapabilitySet};
use framease_parser::logging::codes;
use framease_parser::FileProcessor;
use framease_parser::{log_debug, log_error, log_info, log_success};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub struct DataSourcePipeline {
    registry: Arc<CapabilityRegistry>,
    files: FileProcessor,
    isolate_panics: bool,
}

impl DataSourcePipeline {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            files: FileProcessor::new(),
            isolate_panics: true,
        }
    }

    /// Use a processor with a custom size limit or root directory
    pub fn with_file_processor(mut self, files: FileProcessor) -> Self {
        self.files = files;
        self
    }

    pub fn with_panic_isolation(mut self, isolate: bool) -> Self {
        self.isolate_panics = isolate;
        self
    }

    /// Resolve the device's capability bag
    pub fn resolve(&self, device: &DeviceCapabilitySet) -> Result<CapabilityData, PipelineError> {
        let instances = device.ordered_instances();
        log_info!("Resolving device capability data",
            "device" => &device.device,
            "data_sources" => instances.len());

        let mut bag = CapabilityData::new();
        for instance in instances {
            if let Err(e) = self.run_instance(instance, &mut bag) {
                log_error!(codes::pipeline::PIPELINE_ABORTED, "Capability resolution aborted",
                    "device" => &device.device,
                    "plugin" => e.plugin(),
                    "cause_code" => e.error_code(),
                    "error" => &e);
                return Err(e);
            }
        }

        log_success!(codes::success::PIPELINE_COMPLETE, "Capability data resolved",
            "device" => &device.device,
            "keys" => bag.len());
        Ok(bag)
    }

    fn run_instance(
        &self,
        instance: &DataSourceInstance,
        bag: &mut CapabilityData,
    ) -> Result<(), PipelineError> {
        let plugin = self
            .registry
            .data_source(&instance.plugin)
            .map_err(|e| data_source_error(instance, e))?;
        log_debug!("Running data source", "plugin" => &instance.plugin,
            "sequence" => instance.sequence);

        // Stored instance data wins over upstream values
        for (key, value) in &instance.data {
            bag.insert(key.clone(), value.clone());
        }
        expand_file_markers(bag, &self.files).map_err(|e| data_source_error(instance, e))?;

        for input in plugin.requires() {
            if !has_input(bag, &input) {
                return Err(data_source_error(
                    instance,
                    PluginError::missing_input(plugin.name(), &input),
                ));
            }
        }

        let output = self.invoke(plugin, bag, instance)?;
        let emitted = output.len();
        for (key, value) in output {
            bag.insert(key, value);
        }

        log_success!(codes::success::DATA_SOURCE_COMPLETE, "Data source resolved",
            "plugin" => &instance.plugin,
            "sequence" => instance.sequence,
            "keys" => emitted);
        Ok(())
    }

    fn invoke(
        &self,
        plugin: &dyn DataSourcePlugin,
        bag: &CapabilityData,
        instance: &DataSourceInstance,
    ) -> Result<CapabilityData, PipelineError> {
        if !self.isolate_panics {
            return plugin
                .process(bag)
                .map_err(|e| data_source_error(instance, e));
        }
        match panic::catch_unwind(AssertUnwindSafe(|| plugin.process(bag))) {
            Ok(result) => result.map_err(|e| data_source_error(instance, e)),
            Err(payload) => Err(PipelineError::Panicked {
                plugin: instance.plugin.clone(),
                sequence: instance.sequence,
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn data_source_error(instance: &DataSourceInstance, source: PluginError) -> PipelineError {
    PipelineError::DataSource {
        plugin: instance.plugin.clone(),
        sequence: instance.sequence,
        source,
    }
}
