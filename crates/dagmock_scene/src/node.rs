// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene nodes.
//!
//! A node stores only its own name and its links; its dag path is derived
//! from the ancestor chain by the owning [`Session`](crate::Session) each time
//! it is asked for, so renaming or re-parenting never leaves a stale path.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node.
///
/// This is the node's identity: it survives renames and re-parenting,
/// while names and paths are neither unique nor stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A node instance in the scene
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    name: String,
    node_type: String,
    parent: Option<NodeId>,
    children: IndexSet<NodeId>,
}

impl Node {
    /// Create a detached node. Name legality is the session's concern.
    pub(crate) fn new(node_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            node_type: node_type.into(),
            parent: None,
            children: IndexSet::new(),
        }
    }

    /// Node name (the last dag path segment)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node type (`transform`, `mesh`, ...)
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Parent node, `None` at the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in parenting order
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().copied()
    }

    /// Whether any node is parented under this one
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_parent_link(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn attach_child(&mut self, child: NodeId) {
        self.children.insert(child);
    }

    pub(crate) fn detach_child(&mut self, child: NodeId) {
        self.children.shift_remove(&child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
    }

    #[test]
    fn test_child_links() {
        let mut parent = Node::new("transform", "parent");
        let child = Node::new("transform", "child");

        parent.attach_child(child.id);
        parent.attach_child(child.id);
        assert_eq!(parent.children().collect::<Vec<_>>(), vec![child.id]);

        parent.detach_child(child.id);
        parent.detach_child(child.id);
        assert!(!parent.has_children());
    }

    #[test]
    fn test_identity_survives_rename() {
        let mut node = Node::new("transform", "A");
        let id = node.id;
        node.set_name("B".to_string());
        assert_eq!(node.id, id);
        assert_eq!(node.name(), "B");
        assert_eq!(node.node_type(), "transform");
    }
}
