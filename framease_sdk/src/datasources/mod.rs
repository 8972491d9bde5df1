//! Data-source plugins
//!
//! Turn a device's configured inputs into capability data.

pub mod fortigate_offline;
pub mod host_address;

pub use fortigate_offline::{FortigateOfflineSource, CONFIGURATION_TAG, FILE_INPUT};
pub use host_address::{HostAddressSource, IP_ADDRESS_TAG};
