use beamkit_history::{HistoryRecordingService, UndoManager};
use beamkit_scene::{refscan, Document, NodeId};

use crate::util::{add_rect, add_resource_def, doc_with_layer};

/// Layer + rect filled by a gradient definition; returns (doc, rect, def).
fn doc_with_referenced_def() -> (Document, NodeId, NodeId) {
    let (mut doc, layer) = doc_with_layer();
    let def = add_resource_def(&mut doc);
    let rect = add_rect(&mut doc, &layer);
    doc.set_attribute(&rect, "fill", &format!("url(#{def})"))
        .unwrap();
    (doc, rect, def)
}

#[test]
fn test_removing_referenced_def_parks_it() {
    let (mut doc, rect, def) = doc_with_referenced_def();
    let mut manager = UndoManager::new();

    let (subtree, anchor) = doc.detach_subtree(&def).unwrap();
    HistoryRecordingService::new(&mut manager).remove_element(&doc, subtree, anchor);

    assert!(!doc.contains(&def));
    assert!(manager.resolver().contains(&def));
    // The dangling reference is still on the live node.
    assert!(refscan::is_referenced(&doc, &def));
    let _ = rect;
}

#[test]
fn test_removing_unreferenced_def_stays_with_command() {
    let (mut doc, _) = doc_with_layer();
    let def = add_resource_def(&mut doc);
    let mut manager = UndoManager::new();

    let (subtree, anchor) = doc.detach_subtree(&def).unwrap();
    HistoryRecordingService::new(&mut manager).remove_element(&doc, subtree, anchor);

    assert!(manager.resolver().is_empty());
    assert!(manager.undo(&mut doc));
    assert!(doc.contains(&def));
}

#[test]
fn test_undo_revives_parked_def_from_resolver() {
    let (mut doc, _, def) = doc_with_referenced_def();
    let mut manager = UndoManager::new();

    let (subtree, anchor) = doc.detach_subtree(&def).unwrap();
    HistoryRecordingService::new(&mut manager).remove_element(&doc, subtree, anchor);

    assert!(manager.undo(&mut doc));
    assert!(doc.contains(&def));
    assert!(manager.resolver().is_empty());

    assert!(manager.redo(&mut doc));
    assert!(!doc.contains(&def));
    assert!(manager.resolver().contains(&def));
}

#[test]
fn test_new_reference_revives_parked_def() {
    let (mut doc, _, def) = doc_with_referenced_def();
    let layer2 = add_layer_to(&mut doc);
    let mut manager = UndoManager::new();

    let (subtree, anchor) = doc.detach_subtree(&def).unwrap();
    HistoryRecordingService::new(&mut manager).remove_element(&doc, subtree, anchor);
    assert!(manager.resolver().contains(&def));

    // A pasted element references the removed definition by id.
    let revived = add_rect(&mut doc, &layer2);
    doc.set_attribute(&revived, "stroke", &format!("url(#{def})"))
        .unwrap();
    let restored = manager.restore_references(&mut doc, &revived);

    assert_eq!(restored, 1);
    assert!(doc.contains(&def));
    assert!(manager.resolver().is_empty());
}

#[test]
fn test_parked_def_is_reattached_exactly_once() {
    let (mut doc, _, def) = doc_with_referenced_def();
    let mut manager = UndoManager::new();

    let (subtree, anchor) = doc.detach_subtree(&def).unwrap();
    HistoryRecordingService::new(&mut manager).remove_element(&doc, subtree, anchor);

    // Revive through a new reference, then undo the removal that parked
    // it. The revived node must be relocated, never duplicated.
    let layer = add_layer_to(&mut doc);
    let rect2 = add_rect(&mut doc, &layer);
    doc.set_attribute(&rect2, "fill", &format!("url(#{def})"))
        .unwrap();
    assert_eq!(manager.restore_references(&mut doc, &rect2), 1);
    let count_after_revival = doc.node_count();

    assert!(manager.undo(&mut doc));
    assert!(doc.contains(&def));
    assert_eq!(doc.node_count(), count_after_revival);
    // Exactly one parent claims it.
    let parents: Vec<_> = doc
        .subtree_ids(doc.root_id())
        .iter()
        .filter(|id| doc.children_of(id).contains(&def))
        .cloned()
        .collect();
    assert_eq!(parents.len(), 1);
}

#[test]
fn test_attribute_change_revives_parked_def() {
    let (mut doc, rect, def) = doc_with_referenced_def();
    let mut manager = UndoManager::new();

    let (subtree, anchor) = doc.detach_subtree(&def).unwrap();
    HistoryRecordingService::new(&mut manager).remove_element(&doc, subtree, anchor);
    assert!(manager.resolver().contains(&def));

    manager.begin_undoable_change(&doc, "stroke", std::slice::from_ref(&rect));
    doc.set_attribute(&rect, "stroke", &format!("url(#{def})"))
        .unwrap();
    let batch = manager.finish_undoable_change(&mut doc).unwrap();
    manager.add_command_to_history(&doc, batch.into());

    assert!(doc.contains(&def));
    assert!(manager.resolver().is_empty());
}

#[test]
fn test_unresolved_reference_is_skipped() {
    let (mut doc, layer) = doc_with_layer();
    let rect = add_rect(&mut doc, &layer);
    doc.set_attribute(&rect, "fill", "url(#nope)").unwrap();
    let mut manager = UndoManager::new();

    assert_eq!(manager.restore_references(&mut doc, &rect), 0);
}

/// Adds another layer to an existing document.
fn add_layer_to(doc: &mut Document) -> NodeId {
    let id = doc.generate_id();
    let layer = beamkit_scene::Node::new(id.clone(), beamkit_scene::NodeKind::Layer);
    let root = doc.root_id().clone();
    doc.insert_subtree(&root, beamkit_scene::Subtree::from_node(layer), None)
        .unwrap();
    id
}
