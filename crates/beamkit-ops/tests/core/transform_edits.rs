use beamkit_ops::{
    align_elements, combined_bbox, flip_elements, node_bbox, translate_elements, Alignment,
};

use beamkit_scene::NodeId;

use crate::util::{add_rect_at, workspace};

#[test]
fn test_translate_bakes_into_coordinates() {
    let (mut doc, mut manager, layer) = workspace();
    let id = add_rect_at(&mut doc, &mut manager, &layer, 10.0, 10.0);

    translate_elements(&mut doc, &mut manager, &[id.clone()], 5.0, -3.0).unwrap();
    assert_eq!(doc.get_attribute(&id, "x").as_deref(), Some("15"));
    assert_eq!(doc.get_attribute(&id, "y").as_deref(), Some("7"));
    assert!(doc.transform_of(&id).unwrap().is_empty());
}

#[test]
fn test_translate_is_one_undo_step() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let b = add_rect_at(&mut doc, &mut manager, &layer, 20.0, 0.0);
    let steps = manager.undo_stack_size();

    translate_elements(&mut doc, &mut manager, &[a.clone(), b.clone()], 1.0, 2.0).unwrap();
    assert_eq!(manager.undo_stack_size(), steps + 1);
    assert_eq!(manager.next_undo_label().as_deref(), Some("Move Elements"));

    assert!(manager.undo(&mut doc));
    assert_eq!(doc.get_attribute(&a, "x").as_deref(), Some("0"));
    assert_eq!(doc.get_attribute(&b, "x").as_deref(), Some("20"));
    assert!(doc.transform_of(&a).unwrap().is_empty());

    assert!(manager.redo(&mut doc));
    assert_eq!(doc.get_attribute(&a, "x").as_deref(), Some("1"));
    assert_eq!(doc.get_attribute(&b, "x").as_deref(), Some("21"));
}

#[test]
fn test_translate_with_vanished_target_still_closes_capture() {
    let (mut doc, mut manager, layer) = workspace();
    let id = add_rect_at(&mut doc, &mut manager, &layer, 10.0, 10.0);
    let ghost = NodeId::new("svg_999");
    let steps = manager.undo_stack_size();

    // The ghost is skipped; the live rect still moves as one step.
    translate_elements(&mut doc, &mut manager, &[id.clone(), ghost], 5.0, 0.0).unwrap();
    assert_eq!(doc.get_attribute(&id, "x").as_deref(), Some("15"));
    assert_eq!(manager.undo_stack_size(), steps + 1);

    // The capture opened for this edit was consumed, not left dangling.
    assert!(manager.finish_undoable_change(&mut doc).is_err());
}

#[test]
fn test_flip_with_vanished_target_still_closes_capture() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let b = add_rect_at(&mut doc, &mut manager, &layer, 30.0, 0.0);
    let ghost = NodeId::new("svg_999");

    flip_elements(
        &mut doc,
        &mut manager,
        &[a.clone(), b.clone(), ghost],
        true,
    )
    .unwrap();
    assert!((node_bbox(&doc, &a).unwrap().x - 30.0).abs() < 1e-9);
    assert!(manager.finish_undoable_change(&mut doc).is_err());
}

#[test]
fn test_zero_translate_records_nothing() {
    let (mut doc, mut manager, layer) = workspace();
    let id = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let steps = manager.undo_stack_size();

    translate_elements(&mut doc, &mut manager, &[id], 0.0, 0.0).unwrap();
    assert_eq!(manager.undo_stack_size(), steps);
}

#[test]
fn test_flip_keeps_selection_bounds() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let b = add_rect_at(&mut doc, &mut manager, &layer, 30.0, 0.0);
    let ids = vec![a.clone(), b.clone()];
    let before = combined_bbox(&doc, &ids).unwrap();

    flip_elements(&mut doc, &mut manager, &ids, true).unwrap();
    let after = combined_bbox(&doc, &ids).unwrap();
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.width - after.width).abs() < 1e-9);

    // The two rects swapped sides.
    let a_box = node_bbox(&doc, &a).unwrap();
    assert!((a_box.x - 30.0).abs() < 1e-9);

    assert!(manager.undo(&mut doc));
    let a_box = node_bbox(&doc, &a).unwrap();
    assert!(a_box.x.abs() < 1e-9);
}

#[test]
fn test_align_left_and_center() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let b = add_rect_at(&mut doc, &mut manager, &layer, 40.0, 20.0);

    align_elements(&mut doc, &mut manager, &[a.clone(), b.clone()], Alignment::Left).unwrap();
    assert!(node_bbox(&doc, &b).unwrap().x.abs() < 1e-9);
    // Vertical positions untouched.
    assert!((node_bbox(&doc, &b).unwrap().y - 20.0).abs() < 1e-9);

    assert!(manager.undo(&mut doc));
    assert!((node_bbox(&doc, &b).unwrap().x - 40.0).abs() < 1e-9);

    align_elements(
        &mut doc,
        &mut manager,
        &[a.clone(), b.clone()],
        Alignment::CenterVertical,
    )
    .unwrap();
    let a_box = node_bbox(&doc, &a).unwrap();
    let b_box = node_bbox(&doc, &b).unwrap();
    assert!((a_box.center_y() - b_box.center_y()).abs() < 1e-9);
}

#[test]
fn test_align_single_element_records_nothing() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 5.0, 5.0);
    let steps = manager.undo_stack_size();

    align_elements(&mut doc, &mut manager, &[a], Alignment::Right).unwrap();
    assert_eq!(manager.undo_stack_size(), steps);
}
