//! Element creation, deletion and sibling reordering.

use beamkit_core::{Result, SceneError};
use beamkit_history::{HistoryRecordingService, UndoManager};
use beamkit_scene::{refscan, Document, Node, NodeId, NodeKind, Subtree};
use tracing::{debug, warn};

/// What to build when adding a new element.
#[derive(Debug, Clone)]
pub struct ElementDescriptor {
    kind: NodeKind,
    attrs: Vec<(String, String)>,
    text: Vec<String>,
}

impl ElementDescriptor {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
            text: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, lines: Vec<String>) -> Self {
        self.text = lines;
        self
    }
}

/// Creates a new element under `parent` and records the insertion.
/// Returns the freshly generated id.
pub fn add_element(
    doc: &mut Document,
    manager: &mut UndoManager,
    parent: &NodeId,
    desc: ElementDescriptor,
) -> Result<NodeId> {
    let id = doc.generate_id();
    let mut node = Node::new(id.clone(), desc.kind);
    for (name, value) in desc.attrs {
        node = node.with_attr(name, value);
    }
    if !desc.text.is_empty() {
        node = node.with_text(desc.text);
    }
    doc.insert_subtree(parent, Subtree::from_node(node), None)?;
    debug!(node = %id, %parent, "added element");

    HistoryRecordingService::new(manager).insert_element(doc, &id);
    Ok(id)
}

/// Deletes the given elements as one undoable step. Ids that are no
/// longer in the tree are skipped with a warning.
pub fn delete_elements(
    doc: &mut Document,
    manager: &mut UndoManager,
    ids: &[NodeId],
) -> Result<()> {
    let mut recording = HistoryRecordingService::new(manager);
    recording.start_batch_command("Delete Elements");
    for id in ids {
        if !doc.contains(id) {
            warn!(node = %id, "delete skipped, node is not in the tree");
            continue;
        }
        let (subtree, anchor) = doc.detach_subtree(id)?;
        recording.remove_element(doc, subtree, anchor);
    }
    recording.end_batch_command(doc);
    Ok(())
}

/// Removes resource definitions nothing references any more.
/// Returns how many were removed.
pub fn remove_unused_defs(doc: &mut Document, manager: &mut UndoManager) -> Result<usize> {
    let container = doc.resource_container();
    let unused: Vec<NodeId> = doc
        .children_of(&container)
        .iter()
        .filter(|id| !refscan::is_referenced(doc, id))
        .cloned()
        .collect();
    if unused.is_empty() {
        return Ok(0);
    }

    let mut recording = HistoryRecordingService::new(manager);
    recording.start_batch_command("Remove Unused Definitions");
    for id in &unused {
        let (subtree, anchor) = doc.detach_subtree(id)?;
        recording.remove_element(doc, subtree, anchor);
    }
    recording.end_batch_command(doc);
    debug!(count = unused.len(), "removed unused resource definitions");
    Ok(unused.len())
}

/// Direction for sibling reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackDirection {
    Up,
    Down,
    ToTop,
    ToBottom,
}

/// Moves `id` within its parent's child list and records the move.
/// Already at the edge is a no-op.
pub fn reorder_element(
    doc: &mut Document,
    manager: &mut UndoManager,
    id: &NodeId,
    direction: StackDirection,
) -> Result<()> {
    let parent = doc
        .parent_of(id)
        .cloned()
        .ok_or_else(|| SceneError::NodeNotFound { id: id.to_string() })?;
    let siblings = doc.children_of(&parent);
    let index = siblings
        .iter()
        .position(|s| s == id)
        .expect("child listed under its parent");
    let last = siblings.len() - 1;

    // Later siblings paint on top, so "up" moves toward the end.
    let before: Option<NodeId> = match direction {
        StackDirection::Up if index < last => {
            // Past the next sibling: before the one after it, or to the end.
            siblings.get(index + 2).cloned()
        }
        StackDirection::Down if index > 0 => Some(siblings[index - 1].clone()),
        StackDirection::ToTop if index < last => None,
        StackDirection::ToBottom if index > 0 => Some(siblings[0].clone()),
        _ => return Ok(()),
    };

    let old_anchor = doc.move_node(id, &parent, before.as_ref())?;
    HistoryRecordingService::new(manager).move_element(doc, id, old_anchor);
    Ok(())
}
