//! Schema-mount extension data
//!
//! Each schema-mount point is an extension instance in the datastore schema.
//! Resolving a mount point asks the provider registered for that instance
//! for its extension data: YANG library content (and optionally the
//! `ietf-yang-schema-mount` declarations) describing the schema used below
//! the mount point.
//!
//! Extension data is lent, never handed over. `ExtData` borrows from its
//! provider, so a consumer cannot release it, and the provider keeps the
//! data for as long as the registry lives.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{BridgeError, Result};
use crate::schema::SchemaContext;
use crate::tree::DataTree;

/// Module name of the schema-mount declarations
pub const SCHEMA_MOUNT_MODULE: &str = "ietf-yang-schema-mount";

/// Identity of one schema-mount extension instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionInstance {
    /// Module defining the mount point
    pub module: String,
    /// Extension name, `mount-point` for schema mount
    pub extension: String,
    /// Mount point label
    pub label: String,
    /// Schema path of the node carrying the extension
    pub path: String,
}

impl ExtensionInstance {
    /// A `yangmnt:mount-point` instance
    pub fn mount_point(module: &str, label: &str, path: &str) -> Self {
        Self {
            module: module.to_string(),
            extension: "mount-point".to_string(),
            label: label.to_string(),
            path: path.to_string(),
        }
    }
}

impl fmt::Display for ExtensionInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} \"{}\" at {}", self.module, self.extension, self.label, self.path)
    }
}

/// Who releases extension data after use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The provider keeps the data; the caller must not release it
    Retained,
    /// The caller owns the data and must release it
    Transferred,
}

/// Extension data for one mount resolution
#[derive(Debug, Clone, Copy)]
pub struct ExtData<'a> {
    /// The data, if the provider has any
    pub data: Option<&'a DataTree>,
    /// Release responsibility for `data`
    pub ownership: Ownership,
}

impl<'a> ExtData<'a> {
    /// Data retained by the provider
    pub fn retained(data: &'a DataTree) -> Self {
        Self {
            data: Some(data),
            ownership: Ownership::Retained,
        }
    }

    /// No extension data available
    pub fn none() -> Self {
        Self {
            data: None,
            ownership: Ownership::Retained,
        }
    }
}

/// Supplies extension data for mount points
///
/// Called once per mount resolution, possibly from several sessions at the
/// same time; implementations must not mutate shared state.
pub trait ExtDataProvider: Send + Sync {
    fn ext_data(&self, ext: &ExtensionInstance) -> ExtData<'_>;
}

/// Provider serving one tree loaded at startup
#[derive(Debug, Clone, Default)]
pub struct StaticExtData {
    tree: Option<Arc<DataTree>>,
}

impl StaticExtData {
    /// Serve `tree` for every mount point the provider is registered for
    pub fn new(tree: DataTree) -> Self {
        Self::shared(Arc::new(tree))
    }

    /// Serve a tree shared with other providers
    pub fn shared(tree: Arc<DataTree>) -> Self {
        Self { tree: Some(tree) }
    }

    /// Provider with no data set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load RFC 7951 JSON extension data from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::new(DataTree::from_json_str(&content)?))
    }
}

impl ExtDataProvider for StaticExtData {
    fn ext_data(&self, _ext: &ExtensionInstance) -> ExtData<'_> {
        match &self.tree {
            Some(tree) => ExtData::retained(tree),
            None => ExtData::none(),
        }
    }
}

/// Mount points and their providers, frozen once the plugin is built
#[derive(Default)]
pub struct MountRegistry {
    entries: Vec<(ExtensionInstance, Box<dyn ExtDataProvider>)>,
}

impl MountRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the provider for an extension instance
    ///
    /// Each instance takes exactly one provider.
    pub fn register(
        &mut self,
        ext: ExtensionInstance,
        provider: impl ExtDataProvider + 'static,
    ) -> Result<()> {
        self.register_boxed(ext, Box::new(provider))
    }

    /// Register an already boxed provider, see [`MountRegistry::register`]
    pub fn register_boxed(
        &mut self,
        ext: ExtensionInstance,
        provider: Box<dyn ExtDataProvider>,
    ) -> Result<()> {
        if self.entries.iter().any(|(e, _)| *e == ext) {
            return Err(BridgeError::DuplicateMount(ext.to_string()));
        }
        self.entries.push((ext, provider));
        Ok(())
    }

    /// Registered extension instances in registration order
    pub fn instances(&self) -> impl Iterator<Item = &ExtensionInstance> {
        self.entries.iter().map(|(e, _)| e)
    }

    /// Extension instance registered for a schema path
    pub fn instance_at(&self, path: &str) -> Option<&ExtensionInstance> {
        self.instances().find(|e| e.path == path)
    }

    /// Extension data for `ext`; none when no provider is registered
    pub fn ext_data(&self, ext: &ExtensionInstance) -> ExtData<'_> {
        self.entries
            .iter()
            .find(|(e, _)| e == ext)
            .map_or_else(ExtData::none, |(_, provider)| provider.ext_data(ext))
    }

    /// Schema context to interpret data below `ext`
    ///
    /// Without extension data, or when the data declares mount points but
    /// not this one, the context is empty.
    pub fn mount_context(&self, ext: &ExtensionInstance) -> SchemaContext {
        let ext_data = self.ext_data(ext);
        let Some(data) = ext_data.data else {
            debug!(mount = %ext, "no-extension-data-for-mount-point");
            return SchemaContext::new();
        };

        if !declares_mount_point(data, ext) {
            warn!(mount = %ext, "extension-data-does-not-declare-mount-point");
            return SchemaContext::new();
        }

        let ctx = SchemaContext::from_yang_library(data);
        debug!(mount = %ext, modules = ctx.len(), "mount-context-resolved");
        ctx
    }
}

impl fmt::Debug for MountRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.instances()).finish()
    }
}

/// Whether the schema-mount declarations in `data` cover `ext`
///
/// Data without declarations covers every mount point.
fn declares_mount_point(data: &DataTree, ext: &ExtensionInstance) -> bool {
    let mounts: Vec<_> = data
        .children_named(None, "schema-mounts")
        .into_iter()
        .filter(|id| data.module(*id) == Some(SCHEMA_MOUNT_MODULE))
        .collect();

    if mounts.is_empty() {
        return true;
    }

    mounts.iter().any(|mounts| {
        data.children_named(Some(*mounts), "mount-point")
            .into_iter()
            .any(|mp| {
                data.key_value(mp, "module") == Some(ext.module.as_str())
                    && data.key_value(mp, "label") == Some(ext.label.as_str())
            })
    })
}
