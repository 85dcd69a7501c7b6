//! The document tree.
//!
//! `Document` is an id-indexed arena: every live node is owned by the
//! arena and linked to its parent by id. Structural edits move owned data
//! in and out as [`Subtree`] values, which is what lets the command layer
//! hold exact-inverse captures without aliasing the tree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use beamkit_core::constants::{DEFS_ID, ID_PREFIX, ROOT_ID};
use beamkit_core::{Result, SceneError};

use crate::node::{Node, NodeId, NodeKind};
use crate::transform::TransformList;

/// A (parent, next-sibling) tree location.
///
/// `next_sibling == None` means "last child of parent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub parent: NodeId,
    pub next_sibling: Option<NodeId>,
}

impl Anchor {
    pub fn new(parent: NodeId, next_sibling: Option<NodeId>) -> Self {
        Self {
            parent,
            next_sibling,
        }
    }
}

/// An owned, detached piece of tree.
///
/// Nodes are stored in preorder; the first node is the subtree root with
/// its parent link cleared. Internal parent/child links stay intact so the
/// subtree can be reinserted without reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtree {
    nodes: Vec<Node>,
}

impl Subtree {
    /// Wraps a single node (children links are cleared).
    pub fn from_node(mut node: Node) -> Self {
        node.parent = None;
        node.children.clear();
        Self { nodes: vec![node] }
    }

    /// Builds a subtree from preorder nodes. The first node is the root.
    ///
    /// Callers must ensure every non-root node's parent is also in the
    /// list; `Document::insert_subtree` revalidates id uniqueness against
    /// the tree but trusts internal links.
    pub fn from_parts(mut nodes: Vec<Node>) -> Self {
        assert!(!nodes.is_empty(), "subtree must have a root node");
        nodes[0].parent = None;
        Self { nodes }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn root_id(&self) -> &NodeId {
        self.nodes[0].id()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        false // a subtree always has at least its root
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|n| n.id() == id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Iterates nodes in preorder.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Deep copy with every id replaced through `remap`.
    ///
    /// Used by clipboard paste: the pasted copy needs fresh ids while
    /// preserving internal structure and attributes.
    pub fn with_remapped_ids(&self, mut remap: impl FnMut(&NodeId) -> NodeId) -> Subtree {
        let mut table: HashMap<NodeId, NodeId> = HashMap::new();
        for node in &self.nodes {
            table.insert(node.id().clone(), remap(node.id()));
        }
        let nodes = self
            .nodes
            .iter()
            .map(|node| {
                let mut copy = node.clone();
                copy.id = table[node.id()].clone();
                copy.parent = node.parent.as_ref().and_then(|p| table.get(p).cloned());
                copy.children = node
                    .children
                    .iter()
                    .map(|c| table[c].clone())
                    .collect();
                copy
            })
            .collect();
        Subtree { nodes }
    }

    pub(crate) fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

/// The mutable scene-graph tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
}

impl Document {
    /// Creates a document containing only the root container.
    pub fn new() -> Self {
        let root = NodeId::new(ROOT_ID);
        let mut nodes = HashMap::new();
        nodes.insert(root.clone(), Node::new(root.clone(), NodeKind::Root));
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    /// Generates a fresh `svg_<n>` id not currently live in the tree.
    pub fn generate_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::new(format!("{}{}", ID_PREFIX, self.next_id));
            self.next_id += 1;
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.nodes.get(id).and_then(|n| n.parent.as_ref())
    }

    /// Ordered children of `id`; empty for missing nodes.
    pub fn children_of(&self, id: &NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// The sibling immediately after `id`, if any.
    pub fn next_sibling_of(&self, id: &NodeId) -> Option<NodeId> {
        let parent = self.parent_of(id)?;
        let siblings = self.children_of(parent);
        let pos = siblings.iter().position(|c| c == id)?;
        siblings.get(pos + 1).cloned()
    }

    /// The current (parent, next-sibling) location of `id`.
    pub fn anchor_of(&self, id: &NodeId) -> Option<Anchor> {
        let parent = self.parent_of(id)?.clone();
        Some(Anchor::new(parent, self.next_sibling_of(id)))
    }

    /// Preorder ids of the subtree rooted at `id`, including `id` itself.
    pub fn subtree_ids(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                out.push(current);
                for child in node.children.iter().rev() {
                    stack.push(child.clone());
                }
            }
        }
        out
    }

    /// Top-level layers in stacking order.
    pub fn layers(&self) -> Vec<NodeId> {
        self.children_of(&self.root)
            .iter()
            .filter(|id| {
                self.node(id)
                    .map(|n| matches!(n.kind(), NodeKind::Layer))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Checks that `subtree` could be inserted under `parent` before
    /// `before`, without consuming it. Lets callers that must not lose an
    /// owned subtree probe for dangling targets first.
    pub fn validate_insertion(
        &self,
        parent: &NodeId,
        subtree: &Subtree,
        before: Option<&NodeId>,
    ) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound {
                id: parent.to_string(),
            }
            .into());
        }
        for node in subtree.iter() {
            if self.nodes.contains_key(node.id()) {
                return Err(SceneError::DuplicateId {
                    id: node.id().to_string(),
                }
                .into());
            }
        }
        if let Some(sibling) = before {
            if !self.children_of(parent).contains(sibling) {
                return Err(SceneError::InvalidAnchor {
                    sibling: sibling.to_string(),
                    parent: parent.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Inserts an owned subtree under `parent`, before `before` (or as the
    /// last child when `before` is `None`).
    pub fn insert_subtree(
        &mut self,
        parent: &NodeId,
        subtree: Subtree,
        before: Option<&NodeId>,
    ) -> Result<()> {
        self.validate_insertion(parent, &subtree, before)?;
        let position = match before {
            Some(sibling) => self
                .children_of(parent)
                .iter()
                .position(|c| c == sibling)
                .expect("anchor validated above"),
            None => self.children_of(parent).len(),
        };

        let mut nodes = subtree.into_nodes();
        let root_id = nodes[0].id().clone();
        nodes[0].parent = Some(parent.clone());
        for node in nodes {
            self.nodes.insert(node.id().clone(), node);
        }
        let parent_node = self.nodes.get_mut(parent).expect("parent checked above");
        parent_node.children.insert(position, root_id);
        Ok(())
    }

    /// Detaches the subtree rooted at `id`, returning it with its prior
    /// location. The root container cannot be detached.
    pub fn detach_subtree(&mut self, id: &NodeId) -> Result<(Subtree, Anchor)> {
        if *id == self.root {
            return Err(SceneError::RootImmovable.into());
        }
        let anchor = self.anchor_of(id).ok_or_else(|| SceneError::NodeNotFound {
            id: id.to_string(),
        })?;

        let parent_node = self
            .nodes
            .get_mut(&anchor.parent)
            .expect("anchor parent is live");
        parent_node.children.retain(|c| c != id);

        let ids = self.subtree_ids(id);
        let mut nodes = Vec::with_capacity(ids.len());
        for node_id in &ids {
            let node = self.nodes.remove(node_id).expect("subtree id is live");
            nodes.push(node);
        }
        nodes[0].parent = None;
        Ok((Subtree { nodes }, anchor))
    }

    /// Relinks `id` under `new_parent` before `before`, atomically.
    /// Returns the old anchor. The subtree contents never leave the arena.
    pub fn move_node(
        &mut self,
        id: &NodeId,
        new_parent: &NodeId,
        before: Option<&NodeId>,
    ) -> Result<Anchor> {
        if *id == self.root {
            return Err(SceneError::RootImmovable.into());
        }
        let old_anchor = self.anchor_of(id).ok_or_else(|| SceneError::NodeNotFound {
            id: id.to_string(),
        })?;
        if !self.nodes.contains_key(new_parent) {
            return Err(SceneError::NodeNotFound {
                id: new_parent.to_string(),
            }
            .into());
        }
        // Walking up from the target parent catches moves into the node's
        // own subtree.
        let mut cursor = Some(new_parent.clone());
        while let Some(current) = cursor {
            if current == *id {
                return Err(SceneError::CyclicMove { id: id.to_string() }.into());
            }
            cursor = self.parent_of(&current).cloned();
        }

        // Unlink first so a same-parent reposition computes its insertion
        // point against the post-removal sibling list.
        let old_parent_node = self
            .nodes
            .get_mut(&old_anchor.parent)
            .expect("old parent is live");
        old_parent_node.children.retain(|c| c != id);

        let position = match before {
            Some(sibling) => {
                let siblings = self.children_of(new_parent);
                match siblings.iter().position(|c| c == sibling) {
                    Some(pos) => pos,
                    None => {
                        // Roll back the unlink before reporting.
                        let old_parent_node = self
                            .nodes
                            .get_mut(&old_anchor.parent)
                            .expect("old parent is live");
                        let restore_pos = match &old_anchor.next_sibling {
                            Some(next) => old_parent_node
                                .children
                                .iter()
                                .position(|c| c == next)
                                .unwrap_or(old_parent_node.children.len()),
                            None => old_parent_node.children.len(),
                        };
                        old_parent_node.children.insert(restore_pos, id.clone());
                        return Err(SceneError::InvalidAnchor {
                            sibling: sibling.to_string(),
                            parent: new_parent.to_string(),
                        }
                        .into());
                    }
                }
            }
            None => self.children_of(new_parent).len(),
        };
        let new_parent_node = self
            .nodes
            .get_mut(new_parent)
            .expect("new parent checked above");
        new_parent_node.children.insert(position, id.clone());
        let moved = self.nodes.get_mut(id).expect("moved node is live");
        moved.parent = Some(new_parent.clone());
        Ok(old_anchor)
    }

    /// Reads an attribute. The `transform` name reads the typed transform
    /// list in its serialized form.
    pub fn get_attribute(&self, id: &NodeId, name: &str) -> Option<String> {
        let node = self.nodes.get(id)?;
        if name == "transform" {
            if node.transform().is_empty() {
                None
            } else {
                Some(node.transform().to_string())
            }
        } else {
            node.attribute(name).map(str::to_string)
        }
    }

    /// Sets an attribute, returning the old value. `transform` writes the
    /// typed transform list; an unparseable transform value is rejected
    /// with a warning and leaves the node untouched.
    pub fn set_attribute(
        &mut self,
        id: &NodeId,
        name: &str,
        value: &str,
    ) -> Result<Option<String>> {
        let node = self.nodes.get_mut(id).ok_or_else(|| SceneError::NodeNotFound {
            id: id.to_string(),
        })?;
        if name == "transform" {
            let Some(list) = TransformList::parse(value) else {
                warn!(node = %id, value, "ignoring unparseable transform value");
                return Ok(None);
            };
            let old = std::mem::replace(node.transform_mut(), list);
            Ok((!old.is_empty()).then(|| old.to_string()))
        } else {
            Ok(node.attributes_mut().set(name, value))
        }
    }

    /// Removes an attribute, returning the old value.
    pub fn remove_attribute(&mut self, id: &NodeId, name: &str) -> Result<Option<String>> {
        let node = self.nodes.get_mut(id).ok_or_else(|| SceneError::NodeNotFound {
            id: id.to_string(),
        })?;
        if name == "transform" {
            let old = std::mem::take(node.transform_mut());
            Ok((!old.is_empty()).then(|| old.to_string()))
        } else {
            Ok(node.attributes_mut().remove(name))
        }
    }

    /// The node's transform list; empty list for missing nodes.
    pub fn transform_of(&self, id: &NodeId) -> Option<&TransformList> {
        self.nodes.get(id).map(|n| n.transform())
    }

    /// Replaces the transform list, returning the old one.
    pub fn set_transform(&mut self, id: &NodeId, list: TransformList) -> Result<TransformList> {
        let node = self.nodes.get_mut(id).ok_or_else(|| SceneError::NodeNotFound {
            id: id.to_string(),
        })?;
        Ok(std::mem::replace(node.transform_mut(), list))
    }

    /// Text content lines of a text node.
    pub fn text_of(&self, id: &NodeId) -> Option<&[String]> {
        self.nodes.get(id).map(|n| n.text())
    }

    /// Replaces text content, returning the old lines.
    pub fn set_text(&mut self, id: &NodeId, lines: Vec<String>) -> Result<Vec<String>> {
        let node = self.nodes.get_mut(id).ok_or_else(|| SceneError::NodeNotFound {
            id: id.to_string(),
        })?;
        Ok(node.set_text(lines))
    }

    /// A non-detaching deep copy of the subtree rooted at `id`.
    pub fn clone_subtree(&self, id: &NodeId) -> Option<Subtree> {
        let ids = self.subtree_ids(id);
        if ids.is_empty() {
            return None;
        }
        let mut nodes: Vec<Node> = ids
            .iter()
            .map(|node_id| self.nodes[node_id].clone())
            .collect();
        nodes[0].parent = None;
        Some(Subtree { nodes })
    }

    /// The resource-definition container, created as the first child of
    /// the root on first use.
    pub fn resource_container(&mut self) -> NodeId {
        let root = self.root.clone();
        if let Some(defs) = self
            .children_of(&root)
            .iter()
            .find(|id| {
                self.node(id)
                    .map(|n| matches!(n.kind(), NodeKind::Defs))
                    .unwrap_or(false)
            })
            .cloned()
        {
            return defs;
        }
        let mut id = NodeId::new(DEFS_ID);
        if self.nodes.contains_key(&id) {
            id = self.generate_id();
        }
        let defs = Node::new(id.clone(), NodeKind::Defs);
        let first_child = self.children_of(&root).first().cloned();
        self.insert_subtree(&root, Subtree::from_node(defs), first_child.as_ref())
            .expect("defs insertion cannot collide");
        id
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
