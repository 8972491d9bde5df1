//! Reachability probe command executor
//!
//! Provides a whitelisted command executor for live device checks.

use framease_base::plugins::SystemCommandExecutor;
use std::time::Duration;

/// Overall budget for one probe; `ping -w2` itself gives up after 2 seconds
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create command executor configured for reachability probes
///
/// Whitelist includes:
/// - ping: ICMP echo to the device's management address
pub fn create_ping_command_executor(timeout: Duration) -> SystemCommandExecutor {
    let mut executor = SystemCommandExecutor::with_timeout(timeout);
    executor.allow_command("ping");
    executor
}
