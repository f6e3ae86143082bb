//! Schema contexts
//!
//! A `SchemaContext` is the set of YANG modules a tree is interpreted
//! against. The datastore's own context comes from the session; the context
//! of a mount point is derived from the `ietf-yang-library` content of its
//! extension data.

use std::collections::BTreeMap;

use crate::tree::{DataTree, NodeId};

/// Module name of the YANG library
pub const YANG_LIBRARY_MODULE: &str = "ietf-yang-library";

/// A module implemented by a schema context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub revision: Option<String>,
}

/// Set of implemented YANG modules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaContext {
    modules: BTreeMap<String, Module>,
}

impl SchemaContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context implementing the given module names
    pub fn from_modules<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ctx = Self::new();
        for name in names {
            ctx.add_module(name, None);
        }
        ctx
    }

    /// Add a module, builder style
    pub fn with_module(mut self, name: &str, revision: Option<&str>) -> Self {
        self.add_module(name, revision);
        self
    }

    /// Add a module; a later revision replaces an earlier one
    pub fn add_module(&mut self, name: &str, revision: Option<&str>) {
        self.modules.insert(
            name.to_string(),
            Module {
                name: name.to_string(),
                revision: revision.map(str::to_string),
            },
        );
    }

    /// Whether `module` is implemented
    pub fn implements(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Look up a module
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Implemented modules, sorted by name
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Build a context from YANG library data
    ///
    /// Reads every `module` of every `module-set` of
    /// `ietf-yang-library:yang-library`, and the implemented entries of the
    /// legacy `modules-state` list. Import-only modules are not part of the
    /// context.
    pub fn from_yang_library(data: &DataTree) -> Self {
        let mut ctx = Self::new();

        for library in data.children_named(None, "yang-library") {
            if data.module(library) != Some(YANG_LIBRARY_MODULE) {
                continue;
            }
            for set in data.children_named(Some(library), "module-set") {
                for module in data.children_named(Some(set), "module") {
                    ctx.add_library_entry(data, module);
                }
            }
        }

        for state in data.children_named(None, "modules-state") {
            if data.module(state) != Some(YANG_LIBRARY_MODULE) {
                continue;
            }
            for module in data.children_named(Some(state), "module") {
                let conformance = data
                    .child(module, "conformance-type")
                    .and_then(|c| data.value(c));
                if conformance.is_none_or(|c| c == "implement") {
                    ctx.add_library_entry(data, module);
                }
            }
        }

        ctx
    }

    fn add_library_entry(&mut self, data: &DataTree, entry: NodeId) {
        let name = data.child(entry, "name").and_then(|n| data.value(n));
        let revision = data
            .child(entry, "revision")
            .and_then(|r| data.value(r))
            .filter(|r| !r.is_empty());
        if let Some(name) = name {
            self.add_module(name, revision);
        }
    }
}
