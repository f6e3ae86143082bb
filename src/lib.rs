//! rust-schemamount - operational data bridge with dynamic schema mount
//!
//! This library serves a YANG datastore's operational get-items requests for
//! a fleet of devices. Fleet enumeration lists every device; the mounted
//! subtree of each device is built against the schema context its
//! schema-mount point resolves to and grafted under `device[name]/data`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rust_schemamount::{InventoryProvider, LocalSession, PluginBuilder, SchemaContext, StaticExtData};
//! use rust_schemamount::translation::{DATASTORE_MODULES, DEVICES_PATH, DEVICE_AGGREGATION_MODULE};
//! use rust_schemamount::callbacks::get_devices_cb;
//!
//! let inventory = Arc::new(InventoryProvider::from_file("inventory.json").unwrap());
//! let plugin = PluginBuilder::new()
//!     .devices(inventory.clone())
//!     .services(inventory)
//!     .ext_data(StaticExtData::from_file("schema-mount.json").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let ctx = SchemaContext::from_modules(DATASTORE_MODULES.iter().copied());
//! let session = LocalSession::new(1, Arc::new(ctx));
//! let mut parent = None;
//! let code = get_devices_cb(
//!     &session, 1, DEVICE_AGGREGATION_MODULE, DEVICES_PATH, None, 1, &mut parent, &plugin,
//! );
//! assert!(code.is_success());
//! ```

pub mod assembly;
pub mod callbacks;
pub mod config;
pub mod device;
mod error;
pub mod inventory;
pub mod mount;
pub mod plugin;
pub mod schema;
pub mod services;
pub mod session;
pub mod sr_types;
pub mod translation;
pub mod tree;
pub mod xpath;

pub use config::BridgeConfig;
pub use device::{Device, DeviceId, DeviceProvider};
pub use error::{BridgeError, Result};
pub use inventory::InventoryProvider;
pub use mount::{ExtData, ExtDataProvider, ExtensionInstance, MountRegistry, Ownership, StaticExtData};
pub use plugin::{Plugin, PluginBuilder, RequestKind};
pub use schema::SchemaContext;
pub use services::ServiceProvider;
pub use session::{LocalSession, Session};
pub use sr_types::{ErrorCode, OperGetItemsCb, RequestDescriptor, Subscription};
pub use tree::{DataTree, NodeId, NodeKind};
