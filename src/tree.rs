//! Schema-typed data trees
//!
//! A `DataTree` owns its nodes in an arena; nodes refer to each other by
//! `NodeId`, which gives every node a parent back-reference without shared
//! ownership. A tree may hold several top-level nodes (roots), each of them
//! qualified by its module. Children inherit their parent's module unless
//! they carry one of their own, which is how schema-mounted subtrees and
//! augmentations appear.
//!
//! Trees move by value: handing a tree to the datastore moves it, and
//! extension data is only ever lent out by reference.

use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};
use crate::schema::SchemaContext;
use crate::xpath::{self, Segment};

/// Handle to a node inside one `DataTree`
///
/// Ids are only meaningful for the tree that produced them; using them with
/// another tree panics or addresses an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Kind of a data node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    ListEntry,
    Leaf,
    LeafListEntry,
}

impl NodeKind {
    /// Whether nodes of this kind carry a value instead of children
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Leaf | Self::LeafListEntry)
    }
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    /// Explicit module, only set where it differs from the parent's
    module: Option<String>,
    kind: NodeKind,
    value: Option<String>,
    /// Key leaf names of a list entry, in key order
    keys: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Rooted data tree
#[derive(Debug, Clone, Default)]
pub struct DataTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl DataTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the tree holds no node at all
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Top-level nodes in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].value.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Module the node belongs to, inherited from its ancestors if needed
    pub fn module(&self, id: NodeId) -> Option<&str> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = &self.nodes[cur.0];
            if let Some(module) = node.module.as_deref() {
                return Some(module);
            }
            current = node.parent;
        }
        None
    }

    /// First child of `id` with the given name
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.name(*c) == name)
    }

    /// All children of `parent` (or roots) with the given name
    pub fn children_named(&self, parent: Option<NodeId>, name: &str) -> Vec<NodeId> {
        self.siblings(parent)
            .iter()
            .copied()
            .filter(|c| self.name(*c) == name)
            .collect()
    }

    /// Value of the leaf child `key`, typically a list entry key
    pub fn key_value(&self, id: NodeId, key: &str) -> Option<&str> {
        self.children(id)
            .iter()
            .find(|c| self.name(**c) == key && self.kind(**c) == NodeKind::Leaf)
            .and_then(|c| self.value(*c))
    }

    /// Absolute path of a node, with key predicates on list entries
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = &self.nodes[cur.0];
            let mut segment = Segment::new(node.module.as_deref(), &node.name);
            if node.kind == NodeKind::ListEntry {
                segment.predicates = node
                    .keys
                    .iter()
                    .filter_map(|k| self.key_value(cur, k).map(|v| (k.clone(), v.to_string())))
                    .collect();
            }
            segments.push(segment);
            current = node.parent;
        }
        segments.reverse();
        xpath::format_path(&segments)
    }

    /// Find the node addressed by an absolute path
    pub fn find_path(&self, path: &str) -> Result<Option<NodeId>> {
        let segments = xpath::parse(path)?;
        let mut parent = None;
        let mut module = String::new();

        for segment in &segments {
            if let Some(m) = &segment.module {
                module.clone_from(m);
            }
            match self.find_child(parent, segment, &module) {
                Some(id) => parent = Some(id),
                None => return Ok(None),
            }
        }
        Ok(parent)
    }

    /// Create every missing node along `path` and return the last one
    ///
    /// Steps with key predicates create list entries together with their key
    /// leaves. With a value the last step is a leaf (an existing leaf gets its
    /// value replaced); without one it is a container or list entry. Every
    /// module prefix must be implemented by `ctx`. On error the tree is left
    /// exactly as it was.
    pub fn new_path(
        &mut self,
        ctx: &SchemaContext,
        path: &str,
        value: Option<&str>,
    ) -> Result<NodeId> {
        let segments = xpath::parse(path)?;
        let first = segments
            .first()
            .ok_or_else(|| BridgeError::invalid_path(path, "empty path"))?;
        if first.module.is_none() {
            return Err(BridgeError::invalid_path(
                path,
                "top-level step needs a module prefix",
            ));
        }

        for segment in &segments {
            if segment.is_wildcard() {
                return Err(BridgeError::invalid_path(path, "cannot create wildcard step"));
            }
            if let Some(module) = &segment.module {
                if !ctx.implements(module) {
                    return Err(BridgeError::UnknownModule(module.clone()));
                }
            }
        }

        let mark = self.nodes.len();
        let result = self.create_steps(&segments, path, value);
        if result.is_err() {
            self.rollback(mark);
        }
        result
    }

    fn create_steps(
        &mut self,
        segments: &[Segment],
        path: &str,
        value: Option<&str>,
    ) -> Result<NodeId> {
        let mut parent: Option<NodeId> = None;
        let mut module = String::new();
        let last = segments.len().saturating_sub(1);

        for (i, segment) in segments.iter().enumerate() {
            if let Some(m) = &segment.module {
                module.clone_from(m);
            }
            if let Some(p) = parent {
                if self.kind(p).is_terminal() {
                    return Err(BridgeError::LeafHasChildren(self.name(p).to_string()));
                }
            }

            let is_last = i == last;
            let leaf_value = if is_last { value } else { None };

            let id = match self.find_child(parent, segment, &module) {
                Some(id) => {
                    let kind = self.kind(id);
                    if kind == NodeKind::ListEntry && segment.predicates.is_empty() {
                        return Err(BridgeError::invalid_path(
                            path,
                            format!("list '{}' requires key predicates", segment.name),
                        ));
                    }
                    if let Some(v) = leaf_value {
                        if !kind.is_terminal() {
                            return Err(BridgeError::NotALeaf(segment.name.clone()));
                        }
                        self.nodes[id.0].value = Some(v.to_string());
                    }
                    id
                }
                None if !segment.predicates.is_empty() => {
                    if leaf_value.is_some() {
                        return Err(BridgeError::NotALeaf(segment.name.clone()));
                    }
                    let id = self.push_node(
                        parent,
                        &segment.name,
                        Some(module.as_str()),
                        NodeKind::ListEntry,
                        None,
                    );
                    for (key, key_value) in &segment.predicates {
                        self.push_node(
                            Some(id),
                            key,
                            None,
                            NodeKind::Leaf,
                            Some(key_value.as_str()),
                        );
                        self.nodes[id.0].keys.push(key.clone());
                    }
                    id
                }
                None => {
                    let kind = if leaf_value.is_some() {
                        NodeKind::Leaf
                    } else {
                        NodeKind::Container
                    };
                    self.push_node(parent, &segment.name, Some(module.as_str()), kind, leaf_value)
                }
            };
            parent = Some(id);
        }

        parent.ok_or_else(|| BridgeError::invalid_path(path, "empty path"))
    }

    /// Move every top-level node of `subtree` under `at` (or to the top level)
    ///
    /// Returns the ids of the grafted nodes in this tree.
    pub fn graft(&mut self, at: Option<NodeId>, subtree: DataTree) -> Result<Vec<NodeId>> {
        if let Some(at) = at {
            if self.kind(at).is_terminal() {
                return Err(BridgeError::LeafHasChildren(self.name(at).to_string()));
            }
        }
        Ok(subtree
            .roots
            .iter()
            .map(|root| self.import(at, &subtree, *root))
            .collect())
    }

    /// Copy the children of `at` into a new tree
    ///
    /// Reads back what was grafted at a node: `subtree` of a graft point
    /// compares equal to the grafted tree.
    pub fn subtree(&self, at: NodeId) -> DataTree {
        let mut tree = DataTree::new();
        for child in self.children(at) {
            tree.import(None, self, *child);
        }
        tree
    }

    /// Merge `other` into this tree
    ///
    /// Containers and keyed list entries present on both sides are merged,
    /// leaves take the value from `other`, everything else is appended.
    pub fn merge(&mut self, other: &DataTree) {
        for root in &other.roots {
            self.merge_node(None, other, *root);
        }
    }

    /// Check every module used by the tree against a schema context
    pub fn validate(&self, ctx: &SchemaContext) -> Result<()> {
        for node in &self.nodes {
            if let Some(module) = &node.module {
                if !ctx.implements(module) {
                    return Err(BridgeError::UnknownModule(module.clone()));
                }
            }
        }
        Ok(())
    }

    /// Modules explicitly used in the tree, in first-use order
    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = Vec::new();
        for node in &self.nodes {
            if let Some(module) = node.module.as_deref() {
                if !modules.contains(&module) {
                    modules.push(module);
                }
            }
        }
        modules
    }

    /// Encode as RFC 7951 JSON
    pub fn to_json(&self) -> Value {
        Value::Object(self.members_json(&self.roots, None))
    }

    /// Encode as pretty-printed JSON text
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }

    /// Encode as name-keyed YANG-CBOR
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        let mut cbor_bytes = Vec::new();
        ciborium::into_writer(&self.to_json(), &mut cbor_bytes)
            .map_err(|e| BridgeError::CborEncode(e.to_string()))?;
        Ok(cbor_bytes)
    }

    /// Decode RFC 7951 JSON
    ///
    /// Arrays of objects become list entries (without known keys), arrays of
    /// scalars leaf-list entries, `[null]` an empty-type leaf.
    pub fn from_json(value: &Value) -> Result<Self> {
        let members = value.as_object().ok_or_else(|| {
            BridgeError::invalid_path("/", "top-level JSON value must be an object")
        })?;

        let mut tree = DataTree::new();
        for (member, v) in members {
            tree.import_json(None, member, v)?;
        }
        Ok(tree)
    }

    /// Decode RFC 7951 JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }

    fn siblings(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(p) => self.children(p),
            None => &self.roots,
        }
    }

    fn find_child(&self, parent: Option<NodeId>, segment: &Segment, module: &str) -> Option<NodeId> {
        self.siblings(parent).iter().copied().find(|id| {
            let node = &self.nodes[id.0];
            node.name == segment.name
                && self.module(*id) == Some(module)
                && (segment.predicates.is_empty() || node.kind == NodeKind::ListEntry)
                && segment
                    .predicates
                    .iter()
                    .all(|(k, v)| self.key_value(*id, k) == Some(v.as_str()))
        })
    }

    fn push_node(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        module: Option<&str>,
        kind: NodeKind,
        value: Option<&str>,
    ) -> NodeId {
        let inherited = parent.and_then(|p| self.module(p));
        let module = module.filter(|m| Some(*m) != inherited).map(str::to_string);

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            module,
            kind,
            value: value.map(str::to_string),
            keys: Vec::new(),
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Deep-copy node `sid` of `src` under `parent`
    fn import(&mut self, parent: Option<NodeId>, src: &DataTree, sid: NodeId) -> NodeId {
        let source = &src.nodes[sid.0];
        let id = self.push_node(
            parent,
            &source.name,
            src.module(sid),
            source.kind,
            source.value.as_deref(),
        );
        self.nodes[id.0].keys.clone_from(&source.keys);
        for child in &source.children {
            self.import(Some(id), src, *child);
        }
        id
    }

    fn merge_node(&mut self, parent: Option<NodeId>, src: &DataTree, sid: NodeId) {
        match self.find_equivalent(parent, src, sid) {
            Some(id) => {
                let source = &src.nodes[sid.0];
                if source.kind == NodeKind::Leaf {
                    self.nodes[id.0].value.clone_from(&source.value);
                }
                for child in &source.children {
                    self.merge_node(Some(id), src, *child);
                }
            }
            None => {
                self.import(parent, src, sid);
            }
        }
    }

    fn find_equivalent(&self, parent: Option<NodeId>, src: &DataTree, sid: NodeId) -> Option<NodeId> {
        let source = &src.nodes[sid.0];
        let source_module = src.module(sid);

        self.siblings(parent).iter().copied().find(|id| {
            let node = &self.nodes[id.0];
            node.name == source.name
                && node.kind == source.kind
                && self.module(*id) == source_module
                && match source.kind {
                    NodeKind::ListEntry => {
                        !source.keys.is_empty()
                            && source.keys == node.keys
                            && source
                                .keys
                                .iter()
                                .all(|k| self.key_value(*id, k) == src.key_value(sid, k))
                    }
                    NodeKind::LeafListEntry => node.value == source.value,
                    NodeKind::Container | NodeKind::Leaf => true,
                }
        })
    }

    fn rollback(&mut self, mark: usize) {
        self.nodes.truncate(mark);
        self.roots.retain(|id| id.0 < mark);
        for node in &mut self.nodes {
            node.children.retain(|id| id.0 < mark);
        }
    }

    fn members_json(&self, ids: &[NodeId], parent_module: Option<&str>) -> Map<String, Value> {
        let mut members = Map::new();

        for id in ids {
            let node = &self.nodes[id.0];
            let module = self.module(*id);
            let member = match module {
                Some(m) if module != parent_module => format!("{}:{}", m, node.name),
                _ => node.name.clone(),
            };

            let value = match node.kind {
                NodeKind::Container | NodeKind::ListEntry => {
                    Value::Object(self.members_json(&node.children, module))
                }
                NodeKind::Leaf | NodeKind::LeafListEntry => match &node.value {
                    Some(v) => Value::String(v.clone()),
                    None => Value::Array(vec![Value::Null]),
                },
            };

            match node.kind {
                NodeKind::ListEntry | NodeKind::LeafListEntry => {
                    let slot = members
                        .entry(member)
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if let Value::Array(entries) = slot {
                        entries.push(value);
                    }
                }
                NodeKind::Container | NodeKind::Leaf => {
                    members.insert(member, value);
                }
            }
        }
        members
    }

    fn import_json(&mut self, parent: Option<NodeId>, member: &str, value: &Value) -> Result<()> {
        let (module, name) = match member.split_once(':') {
            Some((module, name)) => (Some(module), name),
            None => (None, member),
        };
        if parent.is_none() && module.is_none() {
            return Err(BridgeError::invalid_path(
                member,
                "top-level member needs a module prefix",
            ));
        }

        match value {
            Value::Object(members) => {
                let id = self.push_node(parent, name, module, NodeKind::Container, None);
                for (m, v) in members {
                    self.import_json(Some(id), m, v)?;
                }
            }
            Value::Array(entries) if entries.len() == 1 && entries[0].is_null() => {
                self.push_node(parent, name, module, NodeKind::Leaf, None);
            }
            Value::Array(entries) => {
                for entry in entries {
                    match entry {
                        Value::Object(members) => {
                            let id = self.push_node(parent, name, module, NodeKind::ListEntry, None);
                            for (m, v) in members {
                                self.import_json(Some(id), m, v)?;
                            }
                        }
                        Value::Array(_) => {
                            return Err(BridgeError::invalid_path(
                                member,
                                "nested arrays are not valid YANG JSON",
                            ));
                        }
                        scalar => {
                            let text = scalar_text(scalar);
                            self.push_node(
                                parent,
                                name,
                                module,
                                NodeKind::LeafListEntry,
                                text.as_deref(),
                            );
                        }
                    }
                }
            }
            scalar => {
                let text = scalar_text(scalar);
                self.push_node(parent, name, module, NodeKind::Leaf, text.as_deref());
            }
        }
        Ok(())
    }

    fn node_eq(&self, id: NodeId, other: &DataTree, oid: NodeId) -> bool {
        let a = &self.nodes[id.0];
        let b = &other.nodes[oid.0];
        a.name == b.name
            && a.kind == b.kind
            && a.value == b.value
            && self.module(id) == other.module(oid)
            && a.children.len() == b.children.len()
            && a
                .children
                .iter()
                .zip(&b.children)
                .all(|(x, y)| self.node_eq(*x, other, *y))
    }
}

/// Structural equality, independent of how the arenas are laid out
impl PartialEq for DataTree {
    fn eq(&self, other: &Self) -> bool {
        self.roots.len() == other.roots.len()
            && self
                .roots
                .iter()
                .zip(&other.roots)
                .all(|(a, b)| self.node_eq(*a, other, *b))
    }
}

impl Eq for DataTree {}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SchemaContext {
        SchemaContext::new()
            .with_module("bbf-device-aggregation", None)
            .with_module("ietf-hardware", None)
            .with_module("ietf-interfaces", None)
    }

    const DEVICE: &str = "/bbf-device-aggregation:devices/device[name='dev-1']";

    #[test]
    fn test_new_path_creates_list_entry_with_key() {
        let mut tree = DataTree::new();
        let leaf = tree
            .new_path(&ctx(), &format!("{}/type", DEVICE), Some("bbf-device-types:olt"))
            .unwrap();

        assert_eq!(tree.value(leaf), Some("bbf-device-types:olt"));
        let entry = tree.parent(leaf).unwrap();
        assert_eq!(tree.kind(entry), NodeKind::ListEntry);
        assert_eq!(tree.key_value(entry, "name"), Some("dev-1"));
        assert_eq!(tree.module(leaf), Some("bbf-device-aggregation"));
        assert_eq!(tree.path(leaf), format!("{}/type", DEVICE));
    }

    #[test]
    fn test_new_path_reuses_existing_nodes() {
        let mut tree = DataTree::new();
        tree.new_path(&ctx(), &format!("{}/type", DEVICE), Some("a"))
            .unwrap();
        tree.new_path(&ctx(), &format!("{}/type", DEVICE), Some("b"))
            .unwrap();
        tree.new_path(
            &ctx(),
            "/bbf-device-aggregation:devices/device[name='dev-2']/type",
            Some("c"),
        )
        .unwrap();

        assert_eq!(tree.roots().len(), 1);
        let devices = tree.roots()[0];
        assert_eq!(tree.children(devices).len(), 2);

        let leaf = tree.find_path(&format!("{}/type", DEVICE)).unwrap().unwrap();
        assert_eq!(tree.value(leaf), Some("b"));
    }

    #[test]
    fn test_new_path_unknown_module_leaves_tree_untouched() {
        let mut tree = DataTree::new();
        tree.new_path(&ctx(), &format!("{}/type", DEVICE), Some("a"))
            .unwrap();
        let before = tree.clone();

        let err = tree
            .new_path(&ctx(), &format!("{}/data/unknown:thing/x", DEVICE), Some("1"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnknownModule(m) if m == "unknown"));
        assert_eq!(tree, before);
        assert_eq!(tree.len(), before.len());
    }

    #[test]
    fn test_new_path_rolls_back_on_leaf_parent() {
        let mut tree = DataTree::new();
        tree.new_path(&ctx(), &format!("{}/type", DEVICE), Some("a"))
            .unwrap();
        let before = tree.len();

        let err = tree
            .new_path(&ctx(), &format!("{}/type/deeper/x", DEVICE), Some("1"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::LeafHasChildren(_)));
        assert_eq!(tree.len(), before);
    }

    #[test]
    fn test_new_path_rejects_unqualified_root() {
        let mut tree = DataTree::new();
        assert!(tree.new_path(&ctx(), "/devices", None).is_err());
        assert!(tree.new_path(&ctx(), "/", None).is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_mounted_module_is_explicit() {
        let mut tree = DataTree::new();
        let leaf = tree
            .new_path(
                &ctx(),
                &format!(
                    "{}/data/ietf-hardware:hardware/component[name='dev-1']/serial-num",
                    DEVICE
                ),
                Some("SN1"),
            )
            .unwrap();
        assert_eq!(tree.module(leaf), Some("ietf-hardware"));
        assert_eq!(
            tree.modules(),
            vec!["bbf-device-aggregation", "ietf-hardware"]
        );
    }

    #[test]
    fn test_graft_and_read_back() {
        let mut mounted = DataTree::new();
        mounted
            .new_path(
                &ctx(),
                "/ietf-hardware:hardware/component[name='dev-1']/mfg-name",
                Some("BBSim"),
            )
            .unwrap();
        mounted
            .new_path(
                &ctx(),
                "/ietf-interfaces:interfaces/interface[name='uni-1']/oper-status",
                Some("up"),
            )
            .unwrap();

        let mut tree = DataTree::new();
        let data = tree
            .new_path(&ctx(), &format!("{}/data", DEVICE), None)
            .unwrap();
        let grafted = tree.graft(Some(data), mounted.clone()).unwrap();

        assert_eq!(grafted.len(), 2);
        assert_eq!(tree.parent(grafted[0]), Some(data));
        assert_eq!(tree.subtree(data), mounted);
    }

    #[test]
    fn test_graft_under_leaf_fails() {
        let mut tree = DataTree::new();
        let leaf = tree
            .new_path(&ctx(), &format!("{}/type", DEVICE), Some("a"))
            .unwrap();
        assert!(tree.graft(Some(leaf), DataTree::new()).is_err());
    }

    #[test]
    fn test_merge() {
        let mut left = DataTree::new();
        left.new_path(&ctx(), &format!("{}/type", DEVICE), Some("old"))
            .unwrap();

        let mut right = DataTree::new();
        right
            .new_path(&ctx(), &format!("{}/type", DEVICE), Some("new"))
            .unwrap();
        right
            .new_path(
                &ctx(),
                "/bbf-device-aggregation:devices/device[name='dev-2']/type",
                Some("x"),
            )
            .unwrap();

        left.merge(&right);
        assert_eq!(left, right);
    }

    #[test]
    fn test_json_encoding() {
        let mut tree = DataTree::new();
        tree.new_path(&ctx(), &format!("{}/type", DEVICE), Some("olt"))
            .unwrap();
        tree.new_path(
            &ctx(),
            &format!(
                "{}/data/ietf-hardware:hardware/component[name='dev-1']/serial-num",
                DEVICE
            ),
            Some("SN1"),
        )
        .unwrap();

        let json = tree.to_json();
        let device = &json["bbf-device-aggregation:devices"]["device"][0];
        assert_eq!(device["name"], "dev-1");
        assert_eq!(device["type"], "olt");
        assert_eq!(
            device["data"]["ietf-hardware:hardware"]["component"][0]["serial-num"],
            "SN1"
        );
    }

    #[test]
    fn test_json_roundtrip_shape() {
        let json = r#"{
            "ietf-yang-library:yang-library": {
                "module-set": [{"name": "mounted", "module": [{"name": "ietf-hardware"}]}],
                "content-id": "1"
            },
            "ietf-interfaces:interfaces": {"enabled": true, "tags": ["a", "b"], "flag": [null]}
        }"#;
        let tree = DataTree::from_json_str(json).unwrap();
        let again = DataTree::from_json(&tree.to_json()).unwrap();

        assert_eq!(tree.to_json(), again.to_json());
        let flag = tree.find_path("/ietf-interfaces:interfaces/flag").unwrap().unwrap();
        assert_eq!(tree.value(flag), None);
        let enabled = tree.find_path("/ietf-interfaces:interfaces/enabled").unwrap().unwrap();
        assert_eq!(tree.value(enabled), Some("true"));
    }

    #[test]
    fn test_from_json_rejects_unqualified_member() {
        assert!(DataTree::from_json_str(r#"{"devices": {}}"#).is_err());
        assert!(DataTree::from_json_str(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_validate() {
        let mut tree = DataTree::new();
        tree.new_path(&ctx(), "/ietf-hardware:hardware", None)
            .unwrap();

        assert!(tree.validate(&ctx()).is_ok());
        let narrow = SchemaContext::new().with_module("ietf-interfaces", None);
        assert!(matches!(
            tree.validate(&narrow),
            Err(BridgeError::UnknownModule(_))
        ));
    }

    #[test]
    fn test_to_cbor() {
        let mut tree = DataTree::new();
        tree.new_path(&ctx(), &format!("{}/type", DEVICE), Some("olt"))
            .unwrap();
        let cbor = tree.to_cbor().unwrap();
        assert!(!cbor.is_empty());

        let decoded: Value = ciborium::from_reader(cbor.as_slice()).unwrap();
        assert_eq!(decoded, tree.to_json());
    }
}
