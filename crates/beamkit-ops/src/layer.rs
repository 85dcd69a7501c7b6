//! Layer management: creation, renaming, deletion, merging, and moving
//! elements between layers. Layers are direct children of the root and
//! stack in document order.

use beamkit_core::{Error, Result, SceneError};
use beamkit_history::{HistoryRecordingService, UndoManager};
use beamkit_scene::{Document, Node, NodeId, NodeKind, Subtree};
use beamkit_core::constants::LAYER_CLASS;
use tracing::{debug, warn};

fn require_layer<'a>(doc: &'a Document, id: &NodeId) -> Result<&'a Node> {
    let node = doc
        .node(id)
        .ok_or_else(|| SceneError::NodeNotFound { id: id.to_string() })?;
    if !matches!(node.kind(), NodeKind::Layer) {
        return Err(Error::other(format!("{id} is not a layer")));
    }
    Ok(node)
}

/// Creates a new named layer on top of the stack (last under the root).
/// Recorded as one undoable step; returns the layer id.
pub fn create_layer(
    doc: &mut Document,
    manager: &mut UndoManager,
    name: &str,
) -> Result<NodeId> {
    let id = doc.generate_id();
    let layer = Node::new(id.clone(), NodeKind::Layer)
        .with_attr("class", LAYER_CLASS)
        .with_attr("data-name", name);
    let root = doc.root_id().clone();
    doc.insert_subtree(&root, Subtree::from_node(layer), None)?;
    debug!(layer = %id, name, "created layer");

    let mut recording = HistoryRecordingService::new(manager);
    recording
        .start_batch_command("Create Layer")
        .insert_element(doc, &id)
        .end_batch_command(doc);
    Ok(id)
}

/// Renames a layer as one undoable step.
pub fn rename_layer(
    doc: &mut Document,
    manager: &mut UndoManager,
    layer: &NodeId,
    new_name: &str,
) -> Result<()> {
    require_layer(doc, layer)?;
    let old = vec![(
        "data-name".to_string(),
        doc.get_attribute(layer, "data-name"),
    )];
    doc.set_attribute(layer, "data-name", new_name)?;

    let mut recording = HistoryRecordingService::new(manager);
    recording
        .start_batch_command("Rename Layer")
        .change_element(doc, layer, old)
        .end_batch_command(doc);
    Ok(())
}

/// Deletes a layer and everything on it as one undoable step.
pub fn delete_layer(
    doc: &mut Document,
    manager: &mut UndoManager,
    layer: &NodeId,
) -> Result<()> {
    require_layer(doc, layer)?;
    let (subtree, anchor) = doc.detach_subtree(layer)?;
    debug!(layer = %subtree.root_id(), nodes = subtree.len(), "deleted layer");

    let mut recording = HistoryRecordingService::new(manager);
    recording
        .start_batch_command("Delete Layer")
        .remove_element(doc, subtree, anchor)
        .end_batch_command(doc);
    Ok(())
}

/// Merges a layer into the layer below it: contents move to the end of
/// the lower layer, the emptied layer is removed. One undoable step.
/// Merging the bottom layer is a no-op.
pub fn merge_layer_down(
    doc: &mut Document,
    manager: &mut UndoManager,
    layer: &NodeId,
) -> Result<()> {
    require_layer(doc, layer)?;
    let layers = doc.layers();
    let index = layers
        .iter()
        .position(|l| l == layer)
        .ok_or_else(|| Error::other(format!("{layer} is not a root-level layer")))?;
    if index == 0 {
        warn!(layer = %layer, "merge skipped, no layer below");
        return Ok(());
    }
    let target = layers[index - 1].clone();
    let contents: Vec<NodeId> = doc.children_of(layer).to_vec();

    let mut recording = HistoryRecordingService::new(manager);
    recording.start_batch_command("Merge Layer");
    for id in &contents {
        let old_anchor = doc.move_node(id, &target, None)?;
        recording.move_element(doc, id, old_anchor);
    }
    let (subtree, anchor) = doc.detach_subtree(layer)?;
    recording.remove_element(doc, subtree, anchor);
    recording.end_batch_command(doc);
    debug!(from = %layer, to = %target, count = contents.len(), "merged layer down");
    Ok(())
}

/// Moves the given elements to the end of another layer as one
/// undoable step. Elements already on the target layer are skipped.
pub fn move_to_layer(
    doc: &mut Document,
    manager: &mut UndoManager,
    ids: &[NodeId],
    layer: &NodeId,
) -> Result<()> {
    require_layer(doc, layer)?;
    let mut recording = HistoryRecordingService::new(manager);
    recording.start_batch_command("Move Elements to Layer");
    for id in ids {
        if doc.parent_of(id) == Some(layer) {
            continue;
        }
        let old_anchor = doc.move_node(id, layer, None)?;
        recording.move_element(doc, id, old_anchor);
    }
    recording.end_batch_command(doc);
    Ok(())
}
