//! Managed devices and the device-facing collaborator
//!
//! Device records use the field names and state enumerations of the device
//! manager's JSON API, so inventory snapshots can be read without mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::SchemaContext;
use crate::tree::DataTree;

/// Device identifier, the key of `device[name=…]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Administrative state as reported by the device manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminState {
    #[default]
    Unknown,
    Preprovisioned,
    Enabled,
    Disabled,
    DownloadingImage,
}

/// Operational status as reported by the device manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperStatus {
    #[default]
    Unknown,
    Discovered,
    Activating,
    Testing,
    Active,
    Failed,
    Reconciling,
    ReconcilingFailed,
}

/// Port type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortType {
    #[default]
    Unknown,
    EthernetNni,
    EthernetUni,
    PonOlt,
    PonOnu,
    VenetOlt,
    VenetOnu,
}

/// One device of the fleet
///
/// Root devices are OLTs; every other device is an ONU attached to
/// `parent_id` on port `parent_port_no`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    pub id: DeviceId,
    pub root: bool,
    pub parent_id: String,
    pub parent_port_no: u32,
    pub vendor: String,
    pub model: String,
    pub hardware_version: String,
    pub firmware_version: String,
    pub serial_number: String,
    pub admin_state: AdminState,
    pub oper_status: OperStatus,
}

impl Device {
    /// Whether the device is an ONU (not a root device)
    pub fn is_onu(&self) -> bool {
        !self.root
    }
}

/// OpenFlow view of a port
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfpPort {
    pub name: String,
}

/// One port of a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Port {
    pub port_no: u32,
    #[serde(rename = "type")]
    pub port_type: PortType,
    pub oper_status: OperStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ofp_port: Option<OfpPort>,
}

/// Device-facing collaborator
///
/// Implementations are called concurrently from several datastore sessions
/// and must not mutate shared state while serving a request.
pub trait DeviceProvider: Send + Sync {
    /// The fleet, in a stable order
    fn devices(&self) -> Result<Vec<Device>>;

    /// The subtree to mount under `device`, interpreted against `mount`
    ///
    /// `Ok(None)` when the device has nothing to expose in that context.
    fn device_data(&self, device: &Device, mount: &SchemaContext) -> Result<Option<DataTree>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_from_json() {
        let device: Device = serde_json::from_str(
            r#"{
                "id": "onu-1",
                "parentId": "olt-1",
                "parentPortNo": 16,
                "vendor": "BBSM",
                "serialNumber": "BBSM00000001",
                "adminState": "ENABLED",
                "operStatus": "ACTIVE"
            }"#,
        )
        .unwrap();

        assert_eq!(device.id, DeviceId::from("onu-1"));
        assert!(device.is_onu());
        assert_eq!(device.parent_port_no, 16);
        assert_eq!(device.admin_state, AdminState::Enabled);
        assert_eq!(device.oper_status, OperStatus::Active);
        assert_eq!(device.model, "");
    }

    #[test]
    fn test_port_from_json() {
        let port: Port = serde_json::from_str(
            r#"{"portNo": 16, "type": "ETHERNET_UNI", "operStatus": "RECONCILING_FAILED",
                "ofpPort": {"name": "BBSM00000001-1"}}"#,
        )
        .unwrap();

        assert_eq!(port.port_type, PortType::EthernetUni);
        assert_eq!(port.oper_status, OperStatus::ReconcilingFailed);
        assert_eq!(port.ofp_port.unwrap().name, "BBSM00000001-1");
    }
}
