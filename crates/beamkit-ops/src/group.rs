//! Grouping: durable groups, ungrouping with transform push-down, and
//! transient selection groups that never touch history.

use beamkit_core::{Error, Result, SceneError};
use beamkit_history::{HistoryRecordingService, UndoManager};
use beamkit_scene::{Document, Node, NodeId, NodeKind, Subtree};
use tracing::debug;

/// Wraps the given elements in a new group node, inserted where the
/// first element was. Recorded as one undoable step; returns the group id.
pub fn group_elements(
    doc: &mut Document,
    manager: &mut UndoManager,
    ids: &[NodeId],
) -> Result<NodeId> {
    let first = ids
        .first()
        .ok_or_else(|| Error::other("cannot group an empty selection"))?;
    let parent = doc
        .parent_of(first)
        .cloned()
        .ok_or_else(|| SceneError::NodeNotFound {
            id: first.to_string(),
        })?;

    let group_id = doc.generate_id();
    let group = Node::new(group_id.clone(), NodeKind::Group);
    doc.insert_subtree(&parent, Subtree::from_node(group), Some(first))?;

    let mut recording = HistoryRecordingService::new(manager);
    recording
        .start_batch_command("Group Elements")
        .insert_element(doc, &group_id);
    for id in ids {
        let old_anchor = doc.move_node(id, &group_id, None)?;
        recording.move_element(doc, id, old_anchor);
    }
    recording.end_batch_command(doc);
    debug!(group = %group_id, count = ids.len(), "grouped elements");
    Ok(group_id)
}

/// Dissolves a group: pushes the group transform down onto each child,
/// moves the children to where the group was, and removes the now-empty
/// group node. One undoable step; returns the freed children.
pub fn ungroup_elements(
    doc: &mut Document,
    manager: &mut UndoManager,
    group_id: &NodeId,
) -> Result<Vec<NodeId>> {
    let node = doc
        .node(group_id)
        .ok_or_else(|| SceneError::NodeNotFound {
            id: group_id.to_string(),
        })?;
    if !matches!(node.kind(), NodeKind::Group) {
        return Err(Error::other(format!("{group_id} is not a group")));
    }
    let group_transform = node.transform().clone();
    let parent = doc
        .parent_of(group_id)
        .cloned()
        .ok_or(SceneError::RootImmovable)?;
    let children: Vec<NodeId> = doc.children_of(group_id).to_vec();

    let mut recording = HistoryRecordingService::new(manager);
    recording.start_batch_command("Ungroup Elements");

    if !group_transform.is_empty() {
        for child in &children {
            let old = vec![("transform".to_string(), doc.get_attribute(child, "transform"))];
            let mut pushed = group_transform.clone();
            for op in doc
                .transform_of(child)
                .cloned()
                .unwrap_or_default()
                .iter()
            {
                pushed.push(*op);
            }
            doc.set_transform(child, pushed)?;
            recording.change_element(doc, child, old);
        }
    }

    for child in &children {
        let old_anchor = doc.move_node(child, &parent, Some(group_id))?;
        recording.move_element(doc, child, old_anchor);
    }

    let (subtree, anchor) = doc.detach_subtree(group_id)?;
    recording.remove_element(doc, subtree, anchor);
    recording.end_batch_command(doc);
    debug!(group = %group_id, count = children.len(), "ungrouped elements");
    Ok(children)
}

/// Wraps a multi-selection in a transient group so it can be dragged as
/// one unit. Never recorded: the group exists only until the selection
/// changes.
pub fn create_temp_group(doc: &mut Document, ids: &[NodeId]) -> Result<NodeId> {
    let first = ids
        .first()
        .ok_or_else(|| Error::other("cannot group an empty selection"))?;
    let parent = doc
        .parent_of(first)
        .cloned()
        .ok_or_else(|| SceneError::NodeNotFound {
            id: first.to_string(),
        })?;

    let temp_id = doc.generate_id();
    let temp = Node::new(temp_id.clone(), NodeKind::TempGroup);
    doc.insert_subtree(&parent, Subtree::from_node(temp), Some(first))?;
    for id in ids {
        doc.move_node(id, &temp_id, None)?;
    }
    Ok(temp_id)
}

/// Dissolves a transient group in place, returning its members to where
/// the group sat. Never recorded.
pub fn dissolve_temp_group(doc: &mut Document, temp_id: &NodeId) -> Result<Vec<NodeId>> {
    let node = doc.node(temp_id).ok_or_else(|| SceneError::NodeNotFound {
        id: temp_id.to_string(),
    })?;
    if !matches!(node.kind(), NodeKind::TempGroup) {
        return Err(Error::other(format!("{temp_id} is not a temporary group")));
    }
    let parent = doc
        .parent_of(temp_id)
        .cloned()
        .ok_or(SceneError::RootImmovable)?;
    let children: Vec<NodeId> = doc.children_of(temp_id).to_vec();
    for child in &children {
        doc.move_node(child, &parent, Some(temp_id))?;
    }
    doc.detach_subtree(temp_id)?;
    Ok(children)
}
