//! Reachability check (`ping`)
//!
//! Sends one ICMP echo to the device's management address through the
//! whitelisted command executor.

use crate::datasources::IP_ADDRESS_TAG;
use framease_base::plugins::{CheckPlugin, CommandError, PluginError, SystemCommandExecutor};
use framease_base::results::{CheckOutput, CheckResult, Results};
use framease_base::types::ParamSpec;
use serde_json::Value;

pub struct PingCheck {
    executor: SystemCommandExecutor,
}

impl PingCheck {
    pub fn new(executor: SystemCommandExecutor) -> Self {
        Self { executor }
    }
}

impl CheckPlugin for PingCheck {
    fn name(&self) -> &str {
        "ping"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    fn requires(&self) -> Vec<String> {
        vec![IP_ADDRESS_TAG.to_string()]
    }

    fn description(&self) -> &str {
        "Checks that the device answers ICMP echo"
    }

    fn check(&self, envelope: &Value) -> Result<CheckOutput, PluginError> {
        let address = envelope
            .get(IP_ADDRESS_TAG)
            .and_then(Value::as_str)
            .ok_or_else(|| PluginError::missing_input(self.name(), IP_ADDRESS_TAG))?;
        if address.is_empty() || address.starts_with('-') || address.contains(char::is_whitespace) {
            return Err(PluginError::execution(
                self.name(),
                format!("refusing to ping '{}'", address),
            ));
        }

        let description = format!("Host {} is reachable", address);
        let result = match self.executor.execute("ping", &["-c1", "-w2", address], None) {
            Ok(output) if output.success() => CheckResult::pass(description),
            Ok(output) => CheckResult::fail(description)
                .with_detail(format!("exit code {}", output.exit_code)),
            Err(CommandError::Timeout { timeout_ms }) => CheckResult::fail(description)
                .with_detail(format!("no reply within {}ms", timeout_ms)),
            Err(e) => return Err(PluginError::execution(self.name(), e.to_string())),
        };
        Ok(Results::from(result).into())
    }
}
