//! Bridge configuration
//!
//! Read from a JSON file; every field is optional.
//!
//! ```json
//! {
//!   "log_level": "debug",
//!   "schema_mount_path": "/etc/bridge/schema-mount.json",
//!   "inventory_path": "/var/lib/bridge/inventory.json",
//!   "mount_label": "data"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::plugin::DEFAULT_MOUNT_LABEL;

/// Log levels accepted in `log_level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Extension data (YANG library and schema mounts) of the device mount point
    pub schema_mount_path: PathBuf,
    /// Inventory snapshot served to the datastore
    pub inventory_path: Option<PathBuf>,
    /// Label of the device mount point
    pub mount_label: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_level: "error".to_string(),
            schema_mount_path: PathBuf::from("/schema-mount.json"),
            inventory_path: None,
            mount_label: DEFAULT_MOUNT_LABEL.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unknown log levels and an empty mount label
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(BridgeError::Config(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        if self.mount_label.trim().is_empty() {
            return Err(BridgeError::Config("empty mount label".to_string()));
        }
        Ok(())
    }
}
