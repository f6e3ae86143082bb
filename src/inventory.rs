//! Inventory snapshot provider
//!
//! `InventoryProvider` serves devices and services from a JSON snapshot
//! written by the device-facing side:
//!
//! ```json
//! {
//!   "devices": [{"id": "olt-1", "root": true, "vendor": "BBSim"}],
//!   "ports": {"onu-1": [{"portNo": 16, "type": "ETHERNET_UNI", "ofpPort": {"name": "BBSM00000001-1"}}]},
//!   "programmedSubscribers": [{"location": "of:00000a0a0a0a0a0a/16", "tagInfo": {"serviceName": "hsia"}}],
//!   "logicalPorts": [{"element": "of:00000a0a0a0a0a0a", "port": "16", "annotations": {"portName": "BBSM00000001-1"}}],
//!   "serviceAliases": []
//! }
//! ```
//!
//! The snapshot is read once and never modified while requests are served.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::device::{Device, DeviceId, DeviceProvider, Port};
use crate::error::{BridgeError, Result};
use crate::schema::SchemaContext;
use crate::services::{ProgrammedService, ServiceAlias, ServiceKey, ServiceProvider, UniTag};
use crate::translation::{self, HARDWARE_MODULE, INTERFACES_MODULE};
use crate::tree::DataTree;

/// A service as reported by the access controller, keyed by port location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgrammedSubscriber {
    pub location: String,
    pub tag_info: UniTag,
}

/// Logical switch port, naming a port location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalPort {
    pub element: String,
    pub port: String,
    pub annotations: BTreeMap<String, String>,
}

impl LogicalPort {
    /// `element/port` location of the port
    pub fn location(&self) -> String {
        format!("{}/{}", self.element, self.port)
    }

    /// UNI port name from the `portName` annotation
    pub fn port_name(&self) -> Option<&str> {
        self.annotations.get("portName").map(String::as_str)
    }
}

/// On-disk inventory snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventorySnapshot {
    pub devices: Vec<Device>,
    pub ports: HashMap<DeviceId, Vec<Port>>,
    pub programmed_subscribers: Vec<ProgrammedSubscriber>,
    pub logical_ports: Vec<LogicalPort>,
    pub service_aliases: Vec<ServiceAlias>,
}

/// Device and service provider over an inventory snapshot
#[derive(Debug, Clone, Default)]
pub struct InventoryProvider {
    snapshot: InventorySnapshot,
}

impl InventoryProvider {
    /// Serve a snapshot already in memory
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse a snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// The snapshot being served
    pub fn snapshot(&self) -> &InventorySnapshot {
        &self.snapshot
    }

    fn ports(&self, id: &DeviceId) -> &[Port] {
        self.snapshot
            .ports
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Location to port name, e.g. `of:00000a0a0a0a0a0a/256` to `BBSM000a0001-1`
    fn port_names(&self) -> HashMap<String, &str> {
        self.snapshot
            .logical_ports
            .iter()
            .filter_map(|p| p.port_name().map(|name| (p.location(), name)))
            .collect()
    }
}

impl DeviceProvider for InventoryProvider {
    fn devices(&self) -> Result<Vec<Device>> {
        Ok(self.snapshot.devices.clone())
    }

    fn device_data(&self, device: &Device, mount: &SchemaContext) -> Result<Option<DataTree>> {
        let mut items = Vec::new();

        if mount.implements(HARDWARE_MODULE) {
            items.extend(translation::translate_device_hardware(device));
        }

        if device.is_onu() && mount.implements(INTERFACES_MODULE) {
            let ports = self.ports(&device.id);
            debug!(device = %device.id, ports = ports.len(), "get-onu-ports-success");
            match translation::translate_onu_ports(&device.id, ports) {
                Ok(port_items) => items.extend(port_items),
                Err(e) => error!(device = %device.id, error = %e, "cannot-translate-onu-ports"),
            }
        }

        if items.is_empty() {
            return Ok(None);
        }
        translation::items_to_tree(mount, &items).map(Some)
    }
}

impl ServiceProvider for InventoryProvider {
    fn programmed_services(&self) -> Result<Vec<ProgrammedService>> {
        let subscribers = &self.snapshot.programmed_subscribers;
        if subscribers.is_empty() {
            return Ok(Vec::new());
        }

        let port_names = self.port_names();
        subscribers
            .iter()
            .map(|s| -> Result<ProgrammedService> {
                let port_name = port_names.get(&s.location).ok_or_else(|| {
                    BridgeError::Provider(format!("no-port-name-for-location: {}", s.location))
                })?;
                Ok(ProgrammedService {
                    port_name: port_name.to_string(),
                    tag: s.tag_info.clone(),
                })
            })
            .collect()
    }

    fn alias(&self, key: &ServiceKey) -> Result<Option<ServiceAlias>> {
        Ok(self
            .snapshot
            .service_aliases
            .iter()
            .find(|a| a.key == *key)
            .cloned())
    }
}
