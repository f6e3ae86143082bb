//! Fixed-signature get-items callbacks
//!
//! One function per request shape, each matching `OperGetItemsCb`. They only
//! repackage their arguments into a `RequestDescriptor` and hand over to the
//! `Plugin` passed as private data.

#![allow(clippy::too_many_arguments)]

use crate::plugin::Plugin;
use crate::session::Session;
use crate::sr_types::{ErrorCode, RequestDescriptor};
use crate::tree::DataTree;

fn descriptor(
    subscription_id: u32,
    module_name: &str,
    path: &str,
    request_xpath: Option<&str>,
    request_id: u32,
) -> RequestDescriptor {
    let request = RequestDescriptor::new(module_name, path).with_ids(subscription_id, request_id);
    match request_xpath {
        Some(xpath) => request.with_request_xpath(xpath),
        None => request,
    }
}

/// Fleet enumeration callback
pub fn get_devices_cb(
    session: &dyn Session,
    subscription_id: u32,
    module_name: &str,
    path: &str,
    request_xpath: Option<&str>,
    request_id: u32,
    parent: &mut Option<DataTree>,
    private_data: &Plugin,
) -> ErrorCode {
    let request = descriptor(subscription_id, module_name, path, request_xpath, request_id);
    private_data.get_devices(session, &request, parent)
}

/// Mounted per-device data callback
pub fn get_device_data_cb(
    session: &dyn Session,
    subscription_id: u32,
    module_name: &str,
    path: &str,
    request_xpath: Option<&str>,
    request_id: u32,
    parent: &mut Option<DataTree>,
    private_data: &Plugin,
) -> ErrorCode {
    let request = descriptor(subscription_id, module_name, path, request_xpath, request_id);
    private_data.get_device_data(session, &request, parent)
}

/// Service profiles callback
pub fn get_services_cb(
    session: &dyn Session,
    subscription_id: u32,
    module_name: &str,
    path: &str,
    request_xpath: Option<&str>,
    request_id: u32,
    parent: &mut Option<DataTree>,
    private_data: &Plugin,
) -> ErrorCode {
    let request = descriptor(subscription_id, module_name, path, request_xpath, request_id);
    private_data.get_services(session, &request, parent)
}

/// VLAN translation profiles callback
pub fn get_vlans_cb(
    session: &dyn Session,
    subscription_id: u32,
    module_name: &str,
    path: &str,
    request_xpath: Option<&str>,
    request_id: u32,
    parent: &mut Option<DataTree>,
    private_data: &Plugin,
) -> ErrorCode {
    let request = descriptor(subscription_id, module_name, path, request_xpath, request_id);
    private_data.get_vlans(session, &request, parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sr_types::OperGetItemsCb;

    #[test]
    fn test_callbacks_match_fixed_signature() {
        let callbacks: [OperGetItemsCb; 4] =
            [get_devices_cb, get_device_data_cb, get_services_cb, get_vlans_cb];
        assert_eq!(callbacks.len(), 4);
    }

    #[test]
    fn test_descriptor_keeps_every_field() {
        let request = descriptor(3, "m", "/m:a", Some("/m:a/b"), 42);
        assert_eq!(request.subscription_id, 3);
        assert_eq!(request.module_name, "m");
        assert_eq!(request.path, "/m:a");
        assert_eq!(request.effective_xpath(), Some("/m:a/b"));
        assert_eq!(request.request_id, 42);

        let request = descriptor(1, "m", "/m:a", None, 2);
        assert_eq!(request.request_xpath, None);
        assert_eq!(request.subscription_id, 1);
    }
}
