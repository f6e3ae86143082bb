//! Operational data plugin
//!
//! The `Plugin` is the typed private data every callback receives. It owns
//! the collaborators and the mount registry, and turns each request into a
//! status code and the content of the parent slot.
//!
//! # Example
//! ```ignore
//! let inventory = Arc::new(InventoryProvider::from_file("inventory.json")?);
//! let plugin = PluginBuilder::new()
//!     .devices(inventory.clone())
//!     .services(inventory)
//!     .ext_data(StaticExtData::from_file("/schema-mount.json")?)
//!     .build()?;
//!
//! for sub in Plugin::subscriptions() {
//!     // register sub.callback for sub.module_name / sub.xpath with the datastore
//! }
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::assembly;
use crate::callbacks;
use crate::device::DeviceProvider;
use crate::error::{BridgeError, Result};
use crate::mount::{ExtDataProvider, ExtensionInstance, MountRegistry, StaticExtData};
use crate::services::ServiceProvider;
use crate::session::Session;
use crate::sr_types::{ErrorCode, RequestDescriptor, Subscription};
use crate::translation::{
    DEVICE_AGGREGATION_MODULE, DEVICE_DATA_SCHEMA_PATH, DEVICES_PATH, SERVICE_PROFILE_MODULE,
    SERVICE_PROFILES_PATH, VLANS_MODULE, VLANS_PATH,
};
use crate::tree::DataTree;

/// Default label of the device mount point
pub const DEFAULT_MOUNT_LABEL: &str = "data";

/// The request shapes the plugin serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Fleet enumeration
    Devices,
    /// Mounted per-device subtrees
    DeviceData,
    /// Service profiles
    Services,
    /// VLAN translation profiles
    Vlans,
}

impl RequestKind {
    /// Every request shape, in subscription order
    pub const ALL: [RequestKind; 4] = [
        RequestKind::Devices,
        RequestKind::DeviceData,
        RequestKind::Services,
        RequestKind::Vlans,
    ];

    /// Module of the subscribed path
    pub fn module(self) -> &'static str {
        match self {
            Self::Devices | Self::DeviceData => DEVICE_AGGREGATION_MODULE,
            Self::Services => SERVICE_PROFILE_MODULE,
            Self::Vlans => VLANS_MODULE,
        }
    }

    /// Subscribed path
    pub fn xpath(self) -> &'static str {
        match self {
            Self::Devices => DEVICES_PATH,
            Self::DeviceData => DEVICE_DATA_SCHEMA_PATH,
            Self::Services => SERVICE_PROFILES_PATH,
            Self::Vlans => VLANS_PATH,
        }
    }

    /// Short name used in logs and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::Devices => "devices",
            Self::DeviceData => "device-data",
            Self::Services => "services",
            Self::Vlans => "vlans",
        }
    }

    fn callback(self) -> crate::sr_types::OperGetItemsCb {
        match self {
            Self::Devices => callbacks::get_devices_cb,
            Self::DeviceData => callbacks::get_device_data_cb,
            Self::Services => callbacks::get_services_cb,
            Self::Vlans => callbacks::get_vlans_cb,
        }
    }
}

/// Typed private data of the operational callbacks
///
/// Read-only once built, so one `Arc<Plugin>` serves every session.
pub struct Plugin {
    devices: Arc<dyn DeviceProvider>,
    services: Arc<dyn ServiceProvider>,
    mounts: MountRegistry,
    mount_point: ExtensionInstance,
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("mounts", &self.mounts)
            .field("mount_point", &self.mount_point)
            .finish_non_exhaustive()
    }
}

impl Plugin {
    /// The operational subscriptions to register, one per request shape
    pub fn subscriptions() -> Vec<Subscription> {
        RequestKind::ALL
            .iter()
            .map(|kind| Subscription {
                module_name: kind.module(),
                xpath: kind.xpath(),
                callback: kind.callback(),
            })
            .collect()
    }

    /// The device mount point
    pub fn mount_point(&self) -> &ExtensionInstance {
        &self.mount_point
    }

    /// Registered mount points and their extension data
    pub fn mounts(&self) -> &MountRegistry {
        &self.mounts
    }

    /// Serve a fleet enumeration request
    pub fn get_devices(
        &self,
        session: &dyn Session,
        request: &RequestDescriptor,
        parent: &mut Option<DataTree>,
    ) -> ErrorCode {
        self.serve(RequestKind::Devices, session, request, parent)
    }

    /// Serve a mounted per-device subtree request
    pub fn get_device_data(
        &self,
        session: &dyn Session,
        request: &RequestDescriptor,
        parent: &mut Option<DataTree>,
    ) -> ErrorCode {
        self.serve(RequestKind::DeviceData, session, request, parent)
    }

    /// Serve a service profiles request
    pub fn get_services(
        &self,
        session: &dyn Session,
        request: &RequestDescriptor,
        parent: &mut Option<DataTree>,
    ) -> ErrorCode {
        self.serve(RequestKind::Services, session, request, parent)
    }

    /// Serve a VLAN translation profiles request
    pub fn get_vlans(
        &self,
        session: &dyn Session,
        request: &RequestDescriptor,
        parent: &mut Option<DataTree>,
    ) -> ErrorCode {
        self.serve(RequestKind::Vlans, session, request, parent)
    }

    /// Run one request and settle the parent slot
    ///
    /// Success with data fills the slot, merging into a tree already there.
    /// Success without data leaves an existing tree alone and fills an empty
    /// slot with an empty tree. Any failure, panics included, leaves the slot
    /// exactly as it was on entry.
    fn serve(
        &self,
        kind: RequestKind,
        session: &dyn Session,
        request: &RequestDescriptor,
        parent: &mut Option<DataTree>,
    ) -> ErrorCode {
        debug!(
            request = kind.name(),
            session = session.id(),
            request_id = request.request_id,
            xpath = request.effective_xpath().unwrap_or(kind.xpath()),
            "get-items-request"
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.build(kind, session, request)));
        let result = match outcome {
            Ok(result) => result,
            Err(_) => {
                error!(request = kind.name(), "get-items-panicked");
                return ErrorCode::Internal;
            }
        };

        match result {
            Ok(Some(tree)) => {
                info!(request = kind.name(), nodes = tree.len(), "get-items-success");
                match parent {
                    Some(existing) => existing.merge(&tree),
                    None => *parent = Some(tree),
                }
                ErrorCode::Ok
            }
            Ok(None) => {
                info!(request = kind.name(), "get-items-no-data");
                if parent.is_none() {
                    *parent = Some(DataTree::new());
                }
                ErrorCode::Ok
            }
            Err(e) => {
                let code = e.error_code();
                error!(request = kind.name(), error = %e, code = code.as_i32(), "get-items-failed");
                code
            }
        }
    }

    fn build(
        &self,
        kind: RequestKind,
        session: &dyn Session,
        request: &RequestDescriptor,
    ) -> Result<Option<DataTree>> {
        check_request(kind, request)?;
        let ctx = session
            .context()
            .ok_or_else(|| BridgeError::NullContext(session.id()))?;

        match kind {
            RequestKind::Devices => assembly::enumerate_fleet(self.devices.as_ref(), ctx),
            RequestKind::DeviceData => assembly::mounted_device_data(
                self.devices.as_ref(),
                &self.mounts,
                &self.mount_point,
                ctx,
                request.effective_xpath(),
            ),
            RequestKind::Services => assembly::services_tree(self.services.as_ref(), ctx),
            RequestKind::Vlans => assembly::vlans_tree(self.services.as_ref(), ctx),
        }
    }
}

/// Reject requests delivered to a callback registered for another path
///
/// Empty module names and paths are accepted as the registered ones.
fn check_request(kind: RequestKind, request: &RequestDescriptor) -> Result<()> {
    let module = request.module_name.trim();
    if !module.is_empty() && module != kind.module() {
        return Err(BridgeError::ContractViolation(format!(
            "{} callback received module '{}'",
            kind.name(),
            module
        )));
    }
    let path = request.path.trim();
    if !path.is_empty() && path != kind.xpath() {
        return Err(BridgeError::ContractViolation(format!(
            "{} callback received path '{}'",
            kind.name(),
            path
        )));
    }
    Ok(())
}

/// Builder for a `Plugin`
///
/// Mount points can only be registered here; a built plugin never changes.
pub struct PluginBuilder {
    devices: Option<Arc<dyn DeviceProvider>>,
    services: Option<Arc<dyn ServiceProvider>>,
    mount_label: String,
    ext_data: Option<Box<dyn ExtDataProvider>>,
}

impl Default for PluginBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginBuilder {
    /// Builder with the default mount label and no collaborators
    pub fn new() -> Self {
        Self {
            devices: None,
            services: None,
            mount_label: DEFAULT_MOUNT_LABEL.to_string(),
            ext_data: None,
        }
    }

    /// Device-facing collaborator (required)
    pub fn devices(mut self, devices: Arc<dyn DeviceProvider>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// Service-facing collaborator (required)
    pub fn services(mut self, services: Arc<dyn ServiceProvider>) -> Self {
        self.services = Some(services);
        self
    }

    /// Label of the device mount point
    pub fn mount_label(mut self, label: &str) -> Self {
        self.mount_label = label.to_string();
        self
    }

    /// Extension data provider of the device mount point
    ///
    /// Without one the mount point resolves to an empty context.
    pub fn ext_data(mut self, provider: impl ExtDataProvider + 'static) -> Self {
        self.ext_data = Some(Box::new(provider));
        self
    }

    /// Validate the collaborators and register the device mount point
    pub fn build(self) -> Result<Plugin> {
        let devices = self
            .devices
            .ok_or_else(|| BridgeError::Config("no device provider".to_string()))?;
        let services = self
            .services
            .ok_or_else(|| BridgeError::Config("no service provider".to_string()))?;
        if self.mount_label.trim().is_empty() {
            return Err(BridgeError::Config("empty mount label".to_string()));
        }

        let mount_point = ExtensionInstance::mount_point(
            DEVICE_AGGREGATION_MODULE,
            &self.mount_label,
            DEVICE_DATA_SCHEMA_PATH,
        );
        let provider = self
            .ext_data
            .unwrap_or_else(|| Box::new(StaticExtData::empty()));

        let mut mounts = MountRegistry::new();
        mounts.register_boxed(mount_point.clone(), provider)?;

        Ok(Plugin {
            devices,
            services,
            mounts,
            mount_point,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Device, DeviceId};
    use crate::schema::SchemaContext;
    use crate::services::{ProgrammedService, ServiceAlias, ServiceKey};
    use crate::session::LocalSession;
    use crate::translation::DATASTORE_MODULES;

    struct Fleet(Vec<&'static str>);

    impl DeviceProvider for Fleet {
        fn devices(&self) -> Result<Vec<Device>> {
            Ok(self
                .0
                .iter()
                .map(|id| Device {
                    id: DeviceId::from(*id),
                    root: true,
                    ..Default::default()
                })
                .collect())
        }

        fn device_data(&self, _device: &Device, _mount: &SchemaContext) -> Result<Option<DataTree>> {
            Ok(None)
        }
    }

    struct Failing;

    impl DeviceProvider for Failing {
        fn devices(&self) -> Result<Vec<Device>> {
            Err(BridgeError::Provider("device manager unreachable".to_string()))
        }

        fn device_data(&self, _device: &Device, _mount: &SchemaContext) -> Result<Option<DataTree>> {
            Ok(None)
        }
    }

    struct Panicking;

    impl DeviceProvider for Panicking {
        fn devices(&self) -> Result<Vec<Device>> {
            panic!("collaborator bug");
        }

        fn device_data(&self, _device: &Device, _mount: &SchemaContext) -> Result<Option<DataTree>> {
            Ok(None)
        }
    }

    struct NoServices;

    impl ServiceProvider for NoServices {
        fn programmed_services(&self) -> Result<Vec<ProgrammedService>> {
            Ok(Vec::new())
        }

        fn alias(&self, _key: &ServiceKey) -> Result<Option<ServiceAlias>> {
            Ok(None)
        }
    }

    fn plugin(devices: impl DeviceProvider + 'static) -> Plugin {
        PluginBuilder::new()
            .devices(Arc::new(devices))
            .services(Arc::new(NoServices))
            .build()
            .unwrap()
    }

    fn session() -> LocalSession {
        LocalSession::new(
            1,
            Arc::new(SchemaContext::from_modules(DATASTORE_MODULES.iter().copied())),
        )
    }

    fn devices_request() -> RequestDescriptor {
        RequestDescriptor::new(DEVICE_AGGREGATION_MODULE, DEVICES_PATH)
    }

    #[test]
    fn test_subscriptions() {
        let subs = Plugin::subscriptions();
        assert_eq!(subs.len(), 4);
        assert_eq!(subs[0].xpath, DEVICES_PATH);
        assert_eq!(subs[1].xpath, DEVICE_DATA_SCHEMA_PATH);
        assert_eq!(subs[2].module_name, SERVICE_PROFILE_MODULE);
        assert_eq!(subs[3].module_name, VLANS_MODULE);
    }

    #[test]
    fn test_devices_fill_empty_slot() {
        let mut slot = None;
        let code = plugin(Fleet(vec!["dev-1"])).get_devices(&session(), &devices_request(), &mut slot);

        assert_eq!(code, ErrorCode::Ok);
        assert!(!slot.unwrap().is_empty());
    }

    #[test]
    fn test_no_data_gives_empty_tree() {
        let mut slot = None;
        let code = plugin(Fleet(vec![])).get_devices(&session(), &devices_request(), &mut slot);

        assert_eq!(code, ErrorCode::Ok);
        assert!(slot.unwrap().is_empty());
    }

    #[test]
    fn test_no_data_keeps_parent() {
        let ctx = SchemaContext::from_modules(DATASTORE_MODULES.iter().copied());
        let mut existing = DataTree::new();
        existing
            .new_path(&ctx, "/bbf-device-aggregation:devices/device[name='x']/type", Some("t"))
            .unwrap();
        let mut slot = Some(existing.clone());

        let code = plugin(Fleet(vec![])).get_devices(&session(), &devices_request(), &mut slot);
        assert_eq!(code, ErrorCode::Ok);
        assert_eq!(slot, Some(existing));
    }

    #[test]
    fn test_result_merges_into_parent() {
        let ctx = SchemaContext::from_modules(DATASTORE_MODULES.iter().copied());
        let mut existing = DataTree::new();
        existing
            .new_path(&ctx, "/bbf-device-aggregation:devices/device[name='x']/type", Some("t"))
            .unwrap();
        let mut slot = Some(existing);

        let code = plugin(Fleet(vec!["dev-1"])).get_devices(&session(), &devices_request(), &mut slot);
        assert_eq!(code, ErrorCode::Ok);
        let tree = slot.unwrap();
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.children(tree.roots()[0]).len(), 2);
    }

    #[test]
    fn test_provider_failure() {
        let mut slot = None;
        let code = plugin(Failing).get_devices(&session(), &devices_request(), &mut slot);

        assert_eq!(code, ErrorCode::OperationFailed);
        assert!(slot.is_none());
    }

    #[test]
    fn test_panic_does_not_cross_boundary() {
        let mut slot = None;
        let code = plugin(Panicking).get_devices(&session(), &devices_request(), &mut slot);

        assert_eq!(code, ErrorCode::Internal);
        assert!(slot.is_none());
    }

    #[test]
    fn test_null_context() {
        let mut slot = None;
        let code = plugin(Fleet(vec!["dev-1"])).get_devices(
            &LocalSession::without_context(9),
            &devices_request(),
            &mut slot,
        );

        assert_eq!(code, ErrorCode::OperationFailed);
        assert!(slot.is_none());
    }

    #[test]
    fn test_wrong_path_is_contract_violation() {
        let mut slot = None;
        let request = RequestDescriptor::new(SERVICE_PROFILE_MODULE, SERVICE_PROFILES_PATH);
        let code = plugin(Fleet(vec!["dev-1"])).get_devices(&session(), &request, &mut slot);

        assert_eq!(code, ErrorCode::Internal);
        assert!(slot.is_none());
    }

    #[test]
    fn test_empty_request_path_is_accepted() {
        let mut slot = None;
        let request = RequestDescriptor::new("", "");
        let code = plugin(Fleet(vec!["dev-1"])).get_devices(&session(), &request, &mut slot);
        assert_eq!(code, ErrorCode::Ok);
    }

    #[test]
    fn test_tree_construction_failure() {
        let mut slot = None;
        let narrow = LocalSession::new(2, Arc::new(SchemaContext::new()));
        let code = plugin(Fleet(vec!["dev-1"])).get_devices(&narrow, &devices_request(), &mut slot);

        assert_eq!(code, ErrorCode::Ly);
        assert!(slot.is_none());
    }

    #[test]
    fn test_builder_requires_providers() {
        assert!(matches!(
            PluginBuilder::new().build(),
            Err(BridgeError::Config(_))
        ));
        assert!(matches!(
            PluginBuilder::new()
                .devices(Arc::new(Fleet(vec![])))
                .services(Arc::new(NoServices))
                .mount_label(" ")
                .build(),
            Err(BridgeError::Config(_))
        ));
    }

    #[test]
    fn test_default_mount_point_has_no_ext_data() {
        let plugin = plugin(Fleet(vec![]));
        assert_eq!(plugin.mount_point().label, DEFAULT_MOUNT_LABEL);
        assert!(plugin.mounts().ext_data(plugin.mount_point()).data.is_none());
    }

    #[test]
    fn test_plugin_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Plugin>();
    }
}
