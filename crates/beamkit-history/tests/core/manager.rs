use std::cell::RefCell;
use std::rc::Rc;

use beamkit_history::{HistoryEventType, HistoryRecordingService, UndoManager};
use beamkit_scene::NodeId;

use crate::util::{add_rect, doc_with_layer, snapshot};

#[test]
fn test_new_manager_is_idle_and_empty() {
    let manager = UndoManager::new();
    assert!(!manager.can_undo());
    assert!(!manager.can_redo());
    assert_eq!(manager.undo_stack_size(), 0);
    assert_eq!(manager.redo_stack_size(), 0);
    assert!(manager.next_undo_label().is_none());
}

#[test]
fn test_undo_redo_with_empty_stacks_returns_false() {
    let (mut doc, _) = doc_with_layer();
    let mut manager = UndoManager::new();
    assert!(!manager.undo(&mut doc));
    assert!(!manager.redo(&mut doc));
}

#[test]
fn test_recording_clears_redo_stack() {
    let (mut doc, layer) = doc_with_layer();
    let mut manager = UndoManager::new();

    let a = add_rect(&mut doc, &layer);
    HistoryRecordingService::new(&mut manager).insert_element(&doc, &a);
    let b = add_rect(&mut doc, &layer);
    HistoryRecordingService::new(&mut manager).insert_element(&doc, &b);

    manager.undo(&mut doc);
    assert_eq!(manager.redo_stack_size(), 1);

    // A fresh edit forks history; the undone branch is gone.
    let c = add_rect(&mut doc, &layer);
    HistoryRecordingService::new(&mut manager).insert_element(&doc, &c);
    assert_eq!(manager.redo_stack_size(), 0);
    assert!(!manager.can_redo());
    assert_eq!(manager.undo_stack_size(), 2);
}

#[test]
fn test_full_undo_then_full_redo_round_trip() {
    let (mut doc, layer) = doc_with_layer();
    let initial = snapshot(&doc);
    let mut manager = UndoManager::new();

    for _ in 0..4 {
        let id = add_rect(&mut doc, &layer);
        HistoryRecordingService::new(&mut manager).insert_element(&doc, &id);
    }
    let final_state = snapshot(&doc);

    while manager.undo(&mut doc) {}
    assert_eq!(snapshot(&doc), initial);
    assert_eq!(manager.redo_stack_size(), 4);

    while manager.redo(&mut doc) {}
    assert_eq!(snapshot(&doc), final_state);
    assert_eq!(manager.undo_stack_size(), 4);
}

#[test]
fn test_reset_undo_stack_drops_everything() {
    let (mut doc, layer) = doc_with_layer();
    let mut manager = UndoManager::new();

    let id = add_rect(&mut doc, &layer);
    HistoryRecordingService::new(&mut manager).insert_element(&doc, &id);
    manager.undo(&mut doc);
    let id = add_rect(&mut doc, &layer);
    HistoryRecordingService::new(&mut manager).insert_element(&doc, &id);

    manager.reset_undo_stack();
    assert!(!manager.can_undo());
    assert!(!manager.can_redo());
    // The document itself is untouched.
    assert!(doc.contains(&id));
}

#[test]
fn test_lifecycle_events_fire_in_order() {
    let (mut doc, layer) = doc_with_layer();
    let mut manager = UndoManager::new();
    let seen: Rc<RefCell<Vec<HistoryEventType>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    manager.on_history_event(move |event, _cmd, _doc| sink.borrow_mut().push(event));

    let id = add_rect(&mut doc, &layer);
    HistoryRecordingService::new(&mut manager).insert_element(&doc, &id);
    manager.undo(&mut doc);
    manager.redo(&mut doc);

    assert_eq!(
        seen.borrow().as_slice(),
        &[
            HistoryEventType::BeforeUnapply,
            HistoryEventType::AfterUnapply,
            HistoryEventType::BeforeApply,
            HistoryEventType::AfterApply,
        ]
    );
}

#[test]
fn test_undoable_change_records_only_what_changed() {
    let (mut doc, layer) = doc_with_layer();
    let mut manager = UndoManager::new();
    let a = add_rect(&mut doc, &layer);
    let b = add_rect(&mut doc, &layer);
    let c = add_rect(&mut doc, &layer);
    let targets = vec![a.clone(), b.clone(), c.clone()];

    manager.begin_undoable_change(&doc, "x", &targets);
    // Touch only two of the three captured nodes; one ends up where it
    // started and must not be recorded either.
    doc.set_attribute(&a, "x", "7").unwrap();
    doc.set_attribute(&b, "x", "8").unwrap();
    doc.set_attribute(&b, "x", "0").unwrap();
    let batch = manager.finish_undoable_change(&mut doc).unwrap();

    assert_eq!(batch.len(), 1);
    manager.add_command_to_history(&doc, batch.into());

    manager.undo(&mut doc);
    assert_eq!(doc.get_attribute(&a, "x").as_deref(), Some("0"));
    manager.redo(&mut doc);
    assert_eq!(doc.get_attribute(&a, "x").as_deref(), Some("7"));
}

#[test]
fn test_unchanged_capture_records_nothing() {
    let (mut doc, layer) = doc_with_layer();
    let mut manager = UndoManager::new();
    let a = add_rect(&mut doc, &layer);

    manager.begin_undoable_change(&doc, "x", &[a]);
    let batch = manager.finish_undoable_change(&mut doc).unwrap();
    assert!(batch.is_empty());
    manager.add_command_to_history(&doc, batch.into());
    assert!(!manager.can_undo());
}

#[test]
fn test_finish_without_begin_is_an_error() {
    let (mut doc, _) = doc_with_layer();
    let mut manager = UndoManager::new();
    let err = manager.finish_undoable_change(&mut doc).unwrap_err();
    assert!(err.is_history_error());
}

#[test]
fn test_nested_undoable_changes_pop_innermost_first() {
    let (mut doc, layer) = doc_with_layer();
    let mut manager = UndoManager::new();
    let a = add_rect(&mut doc, &layer);

    manager.begin_undoable_change(&doc, "x", std::slice::from_ref(&a));
    manager.begin_undoable_change(&doc, "y", std::slice::from_ref(&a));
    doc.set_attribute(&a, "y", "3").unwrap();
    let inner = manager.finish_undoable_change(&mut doc).unwrap();
    assert_eq!(inner.label(), "Change y");
    doc.set_attribute(&a, "x", "4").unwrap();
    let outer = manager.finish_undoable_change(&mut doc).unwrap();
    assert_eq!(outer.label(), "Change x");
    assert_eq!(inner.len(), 1);
    assert_eq!(outer.len(), 1);
}

#[test]
fn test_undoable_change_tolerates_vanished_target() {
    let (mut doc, layer) = doc_with_layer();
    let mut manager = UndoManager::new();
    let a = add_rect(&mut doc, &layer);
    let ghost = NodeId::new("svg_404");

    manager.begin_undoable_change(&doc, "x", &[a.clone(), ghost]);
    doc.set_attribute(&a, "x", "11").unwrap();
    let batch = manager.finish_undoable_change(&mut doc).unwrap();
    assert_eq!(batch.len(), 1);
}
