//! Tree assembly for each request shape
//!
//! Every function builds a fresh, request-local tree and returns
//! `Ok(None)` when there is nothing to report. Trees that are not returned
//! are dropped on the way out, including on early error returns.

use tracing::{debug, info, warn};

use crate::device::{Device, DeviceProvider};
use crate::error::{BridgeError, Result};
use crate::mount::{ExtensionInstance, MountRegistry};
use crate::schema::SchemaContext;
use crate::services::{self, ServiceProvider};
use crate::translation;
use crate::tree::DataTree;
use crate::xpath;

/// One `device[name=…]` entry per device, with its fleet-level leaves
///
/// Always builds the full fleet, whatever narrower path was requested.
pub fn enumerate_fleet(
    devices: &dyn DeviceProvider,
    ctx: &SchemaContext,
) -> Result<Option<DataTree>> {
    let fleet = devices.devices()?;
    debug!(devices = fleet.len(), "get-devices-success");
    if fleet.is_empty() {
        return Ok(None);
    }

    let mut tree = DataTree::new();
    for device in &fleet {
        translation::apply_items(&mut tree, ctx, &translation::translate_device(device))?;
    }
    Ok(Some(tree))
}

/// Device identity named by a request XPath
///
/// `None` when the XPath does not single out a device, including XPaths
/// whose shape cannot be inspected; those select every device.
pub fn requested_device(request_xpath: Option<&str>) -> Option<String> {
    let xpath = request_xpath?;
    match xpath::list_key(xpath, "device", "name") {
        Ok(name) => name,
        Err(e) => {
            debug!(xpath, error = %e, "cannot-inspect-request-xpath");
            None
        }
    }
}

/// Mounted subtrees of the requested devices, each under its `data` node
///
/// An XPath naming a device not in the fleet yields no data, as does a
/// device whose collaborator has nothing to mount.
pub fn mounted_device_data(
    devices: &dyn DeviceProvider,
    mounts: &MountRegistry,
    ext: &ExtensionInstance,
    ctx: &SchemaContext,
    request_xpath: Option<&str>,
) -> Result<Option<DataTree>> {
    let wanted = requested_device(request_xpath);
    let fleet = devices.devices()?;

    let selected: Vec<&Device> = match &wanted {
        Some(name) => fleet.iter().filter(|d| d.id.as_str() == name.as_str()).collect(),
        None => fleet.iter().collect(),
    };
    if selected.is_empty() {
        if let Some(name) = &wanted {
            info!(device = %name, "device-not-found");
        }
        return Ok(None);
    }

    let mut tree = DataTree::new();
    for device in selected {
        let mount_ctx = mounts.mount_context(ext);
        let Some(subtree) = devices.device_data(device, &mount_ctx)? else {
            debug!(device = %device.id, "no-mounted-data");
            continue;
        };
        if subtree.is_empty() {
            continue;
        }

        subtree
            .validate(&mount_ctx)
            .map_err(|e| BridgeError::SchemaMismatch {
                mount: ext.to_string(),
                reason: format!("device {}: {}", device.id, e),
            })?;

        let data = tree.new_path(ctx, &translation::device_data_path(&device.id), None)?;
        tree.graft(Some(data), subtree)?;
    }

    if tree.is_empty() {
        return Ok(None);
    }
    Ok(Some(tree))
}

/// Service profiles of every programmed service
pub fn services_tree(
    provider: &dyn ServiceProvider,
    ctx: &SchemaContext,
) -> Result<Option<DataTree>> {
    build_per_service(provider, ctx, translation::translate_service)
}

/// VLAN translation profiles of every programmed service
pub fn vlans_tree(provider: &dyn ServiceProvider, ctx: &SchemaContext) -> Result<Option<DataTree>> {
    build_per_service(provider, ctx, translation::translate_vlans)
}

fn build_per_service(
    provider: &dyn ServiceProvider,
    ctx: &SchemaContext,
    translate: fn(&services::UniTag, &services::ServiceAlias) -> Vec<translation::YangItem>,
) -> Result<Option<DataTree>> {
    let programmed = provider.programmed_services()?;
    debug!(services = programmed.len(), "get-programmed-subscribers-success");
    if programmed.is_empty() {
        return Ok(None);
    }

    let mut tree = DataTree::new();
    for service in &programmed {
        let alias = services::resolve_alias(provider, service)?;
        let items = translate(&service.tag, &alias);
        if items.is_empty() {
            warn!(service = %alias.service_name, "service-without-items");
            continue;
        }
        translation::apply_items(&mut tree, ctx, &items)?;
    }
    Ok(Some(tree))
}
