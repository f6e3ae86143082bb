//! Translation of device and service records into YANG items
//!
//! Every record becomes a list of `YangItem`s, each an XPath plus an
//! optional value, which are then materialized into a `DataTree` against a
//! schema context. Fleet-level items use absolute datastore paths; items of
//! a mounted subtree use paths relative to the mount point, so the subtree
//! can be built against the mount context and grafted afterwards.

use crate::device::{AdminState, Device, DeviceId, OperStatus, Port, PortType};
use crate::error::{BridgeError, Result};
use crate::schema::SchemaContext;
use crate::services::{ServiceAlias, UniTag};
use crate::tree::DataTree;
use crate::xpath::quote;

pub const DEVICE_AGGREGATION_MODULE: &str = "bbf-device-aggregation";
pub const DEVICES_PATH: &str = "/bbf-device-aggregation:devices";
/// Schema path of the mount point below each device
pub const DEVICE_DATA_SCHEMA_PATH: &str = "/bbf-device-aggregation:devices/device/data";

pub const SERVICE_PROFILE_MODULE: &str = "bbf-nt-service-profile";
pub const SERVICE_PROFILES_PATH: &str = "/bbf-nt-service-profile:service-profiles";
pub const SERVICE_PROFILE_VOLTHA_MODULE: &str = "bbf-nt-service-profile-voltha";

pub const VLANS_MODULE: &str = "bbf-l2-access-attributes";
pub const VLANS_PATH: &str = "/bbf-l2-access-attributes:vlan-translation-profiles";
pub const VLAN_TRANSLATION_VOLTHA_MODULE: &str = "bbf-voltha-vlan-translation";

pub const HARDWARE_MODULE: &str = "ietf-hardware";
pub const INTERFACES_MODULE: &str = "ietf-interfaces";

pub const DEVICE_TYPE_OLT: &str = "bbf-device-types:olt";
pub const DEVICE_TYPE_ONU: &str = "bbf-device-types:onu";
pub const UNI_INTERFACE_TYPE: &str = "bbf-xpon-if-type:onu-v-vrefpoint";

/// Wildcard VLAN id on the controller side
pub const VOLTHA_VLAN_ID_ANY: i32 = 4096;
/// Wildcard VLAN id on the YANG side
pub const YANG_VLAN_ID_ANY: &str = "any";

/// Modules the datastore implements for the subtrees this crate serves
pub const DATASTORE_MODULES: &[&str] = &[
    DEVICE_AGGREGATION_MODULE,
    SERVICE_PROFILE_MODULE,
    SERVICE_PROFILE_VOLTHA_MODULE,
    VLANS_MODULE,
    VLAN_TRANSLATION_VOLTHA_MODULE,
];

/// One node to create: a path and, for leaves, its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YangItem {
    pub path: String,
    pub value: Option<String>,
}

impl YangItem {
    /// A leaf item
    pub fn leaf(path: String, value: impl Into<String>) -> Self {
        Self {
            path,
            value: Some(value.into()),
        }
    }

    /// A container or list entry item
    pub fn node(path: String) -> Self {
        Self { path, value: None }
    }
}

/// Path of a device entry in the fleet list
pub fn device_path(id: &DeviceId) -> String {
    format!("{}/device[name={}]", DEVICES_PATH, quote(id.as_str()))
}

/// Mount point node of a device
pub fn device_data_path(id: &DeviceId) -> String {
    format!("{}/data", device_path(id))
}

/// Hardware component of a device, relative to its mount point
pub fn device_hardware_path(id: &DeviceId) -> String {
    format!(
        "/ietf-hardware:hardware/component[name={}]",
        quote(id.as_str())
    )
}

/// Interface entry, relative to a device's mount point
pub fn interface_path(name: &str) -> String {
    format!("/ietf-interfaces:interfaces/interface[name={}]", quote(name))
}

/// Path of a port inside a service profile
pub fn service_port_path(service_name: &str, port_name: &str) -> String {
    format!(
        "{}/service-profile[name={}]/ports/port[name={}]",
        SERVICE_PROFILES_PATH,
        quote(service_name),
        quote(port_name)
    )
}

/// Path of a VLAN translation profile
pub fn vlans_path(vlans_name: &str) -> String {
    format!(
        "{}/vlan-translation-profile[name={}]",
        VLANS_PATH,
        quote(vlans_name)
    )
}

/// `ietf-hardware` admin-state of a device
pub fn hardware_admin_state(state: AdminState) -> &'static str {
    match state {
        AdminState::Enabled => "unlocked",
        AdminState::Disabled => "locked",
        AdminState::Unknown | AdminState::Preprovisioned | AdminState::DownloadingImage => {
            "unknown"
        }
    }
}

/// `ietf-hardware` oper-state of a device
pub fn hardware_oper_state(status: OperStatus) -> &'static str {
    match status {
        OperStatus::Active => "enabled",
        OperStatus::Testing => "testing",
        OperStatus::ReconcilingFailed => "disabled",
        OperStatus::Unknown
        | OperStatus::Discovered
        | OperStatus::Activating
        | OperStatus::Failed
        | OperStatus::Reconciling => "unknown",
    }
}

/// `ietf-interfaces` oper-status of a port
pub fn interface_oper_state(status: OperStatus) -> &'static str {
    match status {
        OperStatus::Active => "up",
        OperStatus::Testing => "testing",
        OperStatus::ReconcilingFailed => "down",
        OperStatus::Unknown
        | OperStatus::Discovered
        | OperStatus::Activating
        | OperStatus::Failed
        | OperStatus::Reconciling => "unknown",
    }
}

/// Fleet-level items of a device
pub fn translate_device(device: &Device) -> Vec<YangItem> {
    let device_type = if device.root {
        DEVICE_TYPE_OLT
    } else {
        DEVICE_TYPE_ONU
    };
    vec![YangItem::leaf(
        format!("{}/type", device_path(&device.id)),
        device_type,
    )]
}

/// Hardware component items of a device, relative to its mount point
pub fn translate_device_hardware(device: &Device) -> Vec<YangItem> {
    let hw = device_hardware_path(&device.id);
    let mut items = Vec::new();

    if device.is_onu() {
        items.push(YangItem::leaf(format!("{}/parent", hw), &device.parent_id));
        items.push(YangItem::leaf(
            format!("{}/parent-rel-pos", hw),
            device.parent_port_no.to_string(),
        ));
    }

    items.extend([
        YangItem::leaf(format!("{}/mfg-name", hw), &device.vendor),
        YangItem::leaf(format!("{}/model-name", hw), &device.model),
        YangItem::leaf(format!("{}/hardware-rev", hw), &device.hardware_version),
        YangItem::leaf(format!("{}/firmware-rev", hw), &device.firmware_version),
        YangItem::leaf(format!("{}/serial-num", hw), &device.serial_number),
        YangItem::leaf(
            format!("{}/state/admin-state", hw),
            hardware_admin_state(device.admin_state),
        ),
        YangItem::leaf(
            format!("{}/state/oper-state", hw),
            hardware_oper_state(device.oper_status),
        ),
    ]);
    items
}

/// Interface items of an ONU's UNI ports, relative to its mount point
///
/// Fails if a UNI has no OpenFlow port, since the interface has no name.
pub fn translate_onu_ports(device_id: &DeviceId, ports: &[Port]) -> Result<Vec<YangItem>> {
    let mut items = Vec::new();

    for port in ports.iter().filter(|p| p.port_type == PortType::EthernetUni) {
        let ofp = port.ofp_port.as_ref().ok_or_else(|| {
            BridgeError::Translation(format!(
                "no-ofp-port-in-uni: {} {}",
                device_id, port.port_no
            ))
        })?;

        let interface = interface_path(&ofp.name);
        items.push(YangItem::leaf(
            format!("{}/type", interface),
            UNI_INTERFACE_TYPE,
        ));
        items.push(YangItem::leaf(
            format!("{}/oper-status", interface),
            interface_oper_state(port.oper_status),
        ));
    }
    Ok(items)
}

/// Service profile items of a programmed service
pub fn translate_service(tag: &UniTag, alias: &ServiceAlias) -> Vec<YangItem> {
    let port = service_port_path(&alias.service_name, &alias.key.port);
    let voltha = |leaf: &str| format!("{}/{}:{}", port, SERVICE_PROFILE_VOLTHA_MODULE, leaf);
    let mut items = Vec::new();

    if !tag.configured_mac_address.is_empty() {
        items.push(YangItem::leaf(
            voltha("configured-mac-address"),
            &tag.configured_mac_address,
        ));
    }

    items.extend([
        YangItem::node(format!(
            "{}/port-vlans/port-vlan[name={}]",
            port,
            quote(&alias.vlans_name)
        )),
        YangItem::leaf(
            voltha("technology-profile-id"),
            tag.technology_profile_id.to_string(),
        ),
        YangItem::leaf(
            voltha("mac-learning-enabled"),
            tag.enable_mac_learning.to_string(),
        ),
        YangItem::leaf(voltha("dhcp-required"), tag.is_dhcp_required.to_string()),
        YangItem::leaf(voltha("igmp-required"), tag.is_igmp_required.to_string()),
        YangItem::leaf(voltha("pppoe-required"), tag.is_pppoe_required.to_string()),
    ]);
    items
}

/// VLAN translation profile items of a programmed service
pub fn translate_vlans(tag: &UniTag, alias: &ServiceAlias) -> Vec<YangItem> {
    let profile = vlans_path(&alias.vlans_name);
    let mut items = Vec::new();

    if tag.uni_tag_match > 0 {
        items.push(YangItem::leaf(
            format!("{}/match-criteria/outer-tag/vlan-id", profile),
            vlan_id(tag.uni_tag_match),
        ));
        items.push(YangItem::leaf(
            format!("{}/match-criteria/second-tag/vlan-id", profile),
            YANG_VLAN_ID_ANY,
        ));
    }

    let outer = format!("{}/ingress-rewrite/push-outer-tag", profile);
    let second = format!("{}/ingress-rewrite/push-second-tag", profile);
    let dpbit = format!("{}:dpbit", VLAN_TRANSLATION_VOLTHA_MODULE);

    let priorities = [
        (&outer, "pbit", tag.us_pon_s_tag_priority),
        (&outer, dpbit.as_str(), tag.ds_pon_s_tag_priority),
        (&second, "pbit", tag.us_pon_c_tag_priority),
        (&second, dpbit.as_str(), tag.ds_pon_c_tag_priority),
    ];
    for (base, leaf, priority) in priorities {
        if priority >= 0 {
            items.push(YangItem::leaf(
                format!("{}/{}", base, leaf),
                priority.to_string(),
            ));
        }
    }

    items.push(YangItem::leaf(
        format!("{}/vlan-id", outer),
        vlan_id(tag.pon_s_tag),
    ));
    items.push(YangItem::leaf(
        format!("{}/vlan-id", second),
        vlan_id(tag.pon_c_tag),
    ));
    items
}

fn vlan_id(id: i32) -> String {
    if id == VOLTHA_VLAN_ID_ANY {
        YANG_VLAN_ID_ANY.to_string()
    } else {
        id.to_string()
    }
}

/// Create every item in `tree`
///
/// Stops at the first item the tree rejects; items created before it stay.
pub fn apply_items(tree: &mut DataTree, ctx: &SchemaContext, items: &[YangItem]) -> Result<()> {
    for item in items {
        tree.new_path(ctx, &item.path, item.value.as_deref())?;
    }
    Ok(())
}

/// Build a new tree from items
pub fn items_to_tree(ctx: &SchemaContext, items: &[YangItem]) -> Result<DataTree> {
    let mut tree = DataTree::new();
    apply_items(&mut tree, ctx, items)?;
    Ok(tree)
}
