// SPDX-License-Identifier: MIT OR Apache-2.0
//! The scene's active list of selected dag nodes.

use crate::node::NodeId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Select flag of the host's `select` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    /// `replace`: the given nodes become the active list
    #[default]
    Set,
    /// `add`: append nodes not already active
    Add,
    /// `deselect`: drop the given nodes from the active list
    Remove,
    /// `toggle`: flip each node's membership
    Toggle,
}

/// Active list: each node at most once, in the order it was selected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    active: IndexSet<NodeId>,
}

impl Selection {
    /// Empty active list
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the node is active
    pub fn contains(&self, id: &NodeId) -> bool {
        self.active.contains(id)
    }

    /// Append a node; already active nodes keep their position
    pub fn add(&mut self, id: NodeId) {
        self.active.insert(id);
    }

    /// Drop a node, keeping the order of the rest
    pub fn remove(&mut self, id: &NodeId) {
        self.active.shift_remove(id);
    }

    /// Flip membership
    pub fn toggle(&mut self, id: NodeId) {
        if !self.active.shift_remove(&id) {
            self.active.insert(id);
        }
    }

    /// Update the active list the way `select` does with `mode`
    pub fn apply(&mut self, nodes: &[NodeId], mode: SelectMode) {
        match mode {
            SelectMode::Set => {
                self.active = nodes.iter().copied().collect();
            }
            SelectMode::Add => self.active.extend(nodes.iter().copied()),
            SelectMode::Remove => nodes.iter().for_each(|id| self.remove(id)),
            SelectMode::Toggle => nodes.iter().for_each(|id| self.toggle(*id)),
        }
    }

    /// Deselect everything
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Nothing selected
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of active nodes
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Active nodes in selection order
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.active.iter().copied()
    }

    /// Active nodes in selection order, as `ls -selection` lists them
    pub fn to_vec(&self) -> Vec<NodeId> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_modes() {
        let a = NodeId::new();
        let b = NodeId::new();
        let c = NodeId::new();
        let mut selection = Selection::new();

        selection.apply(&[a, b, a], SelectMode::Set);
        assert_eq!(selection.to_vec(), vec![a, b]);

        selection.apply(&[b, c], SelectMode::Add);
        assert_eq!(selection.to_vec(), vec![a, b, c]);

        selection.apply(&[a], SelectMode::Remove);
        assert_eq!(selection.to_vec(), vec![b, c]);

        selection.apply(&[a, b], SelectMode::Toggle);
        assert_eq!(selection.to_vec(), vec![c, a]);

        selection.apply(&[b], SelectMode::Set);
        assert_eq!(selection.to_vec(), vec![b]);
    }

    #[test]
    fn test_reselect_keeps_order() {
        let a = NodeId::new();
        let b = NodeId::new();
        let mut selection = Selection::new();
        selection.add(a);
        selection.add(b);
        selection.add(a);
        assert_eq!(selection.to_vec(), vec![a, b]);
        assert!(selection.contains(&a));
        selection.clear();
        assert!(selection.is_empty());
    }
}
