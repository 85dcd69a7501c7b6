use beamkit_ops::{
    add_element, delete_elements, remove_unused_defs, reorder_element, ElementDescriptor,
    StackDirection,
};
use beamkit_scene::NodeKind;

use crate::util::{add_rect_at, workspace};

#[test]
fn test_add_element_is_undoable() {
    let (mut doc, mut manager, layer) = workspace();

    let id = add_rect_at(&mut doc, &mut manager, &layer, 5.0, 5.0);
    assert!(doc.contains(&id));
    assert_eq!(doc.get_attribute(&id, "x").as_deref(), Some("5"));

    assert!(manager.undo(&mut doc));
    assert!(!doc.contains(&id));
    assert!(manager.redo(&mut doc));
    assert!(doc.contains(&id));
}

#[test]
fn test_delete_elements_is_one_step() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let b = add_rect_at(&mut doc, &mut manager, &layer, 20.0, 0.0);
    let steps_before = manager.undo_stack_size();

    delete_elements(&mut doc, &mut manager, &[a.clone(), b.clone()]).unwrap();
    assert!(!doc.contains(&a));
    assert!(!doc.contains(&b));
    assert_eq!(manager.undo_stack_size(), steps_before + 1);

    assert!(manager.undo(&mut doc));
    assert_eq!(doc.children_of(&layer), &[a, b]);
}

#[test]
fn test_delete_skips_missing_ids() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let ghost = beamkit_scene::NodeId::new("svg_404");

    delete_elements(&mut doc, &mut manager, &[ghost, a.clone()]).unwrap();
    assert!(!doc.contains(&a));
}

#[test]
fn test_remove_unused_defs_keeps_referenced_ones() {
    let (mut doc, mut manager, layer) = workspace();
    let defs = doc.resource_container();
    let used = add_element(
        &mut doc,
        &mut manager,
        &defs,
        ElementDescriptor::new(NodeKind::ResourceDef),
    )
    .unwrap();
    let unused = add_element(
        &mut doc,
        &mut manager,
        &defs,
        ElementDescriptor::new(NodeKind::ResourceDef),
    )
    .unwrap();
    let rect = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    doc.set_attribute(&rect, "fill", &format!("url(#{used})"))
        .unwrap();

    let removed = remove_unused_defs(&mut doc, &mut manager).unwrap();
    assert_eq!(removed, 1);
    assert!(doc.contains(&used));
    assert!(!doc.contains(&unused));

    // Pruning is undoable.
    assert!(manager.undo(&mut doc));
    assert!(doc.contains(&unused));
}

#[test]
fn test_remove_unused_defs_with_nothing_to_do() {
    let (mut doc, mut manager, _) = workspace();
    let steps = manager.undo_stack_size();
    assert_eq!(remove_unused_defs(&mut doc, &mut manager).unwrap(), 0);
    assert_eq!(manager.undo_stack_size(), steps);
}

#[test]
fn test_reorder_up_and_down() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let b = add_rect_at(&mut doc, &mut manager, &layer, 1.0, 0.0);
    let c = add_rect_at(&mut doc, &mut manager, &layer, 2.0, 0.0);

    reorder_element(&mut doc, &mut manager, &a, StackDirection::Up).unwrap();
    assert_eq!(doc.children_of(&layer), &[b.clone(), a.clone(), c.clone()]);

    reorder_element(&mut doc, &mut manager, &c, StackDirection::Down).unwrap();
    assert_eq!(doc.children_of(&layer), &[b.clone(), c.clone(), a.clone()]);

    assert!(manager.undo(&mut doc));
    assert!(manager.undo(&mut doc));
    assert_eq!(doc.children_of(&layer), &[a, b, c]);
}

#[test]
fn test_reorder_to_edges() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let b = add_rect_at(&mut doc, &mut manager, &layer, 1.0, 0.0);
    let c = add_rect_at(&mut doc, &mut manager, &layer, 2.0, 0.0);

    reorder_element(&mut doc, &mut manager, &a, StackDirection::ToTop).unwrap();
    assert_eq!(doc.children_of(&layer), &[b.clone(), c.clone(), a.clone()]);

    reorder_element(&mut doc, &mut manager, &a, StackDirection::ToBottom).unwrap();
    assert_eq!(doc.children_of(&layer), &[a, b, c]);
}

#[test]
fn test_reorder_at_edge_records_nothing() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let _b = add_rect_at(&mut doc, &mut manager, &layer, 1.0, 0.0);
    let steps = manager.undo_stack_size();

    reorder_element(&mut doc, &mut manager, &a, StackDirection::Down).unwrap();
    reorder_element(&mut doc, &mut manager, &a, StackDirection::ToBottom).unwrap();
    assert_eq!(manager.undo_stack_size(), steps);
}

#[test]
fn test_add_text_element() {
    let (mut doc, mut manager, layer) = workspace();
    let id = add_element(
        &mut doc,
        &mut manager,
        &layer,
        ElementDescriptor::new(NodeKind::Text)
            .attr("x", "3")
            .text(vec!["cut here".to_string()]),
    )
    .unwrap();

    assert_eq!(doc.text_of(&id).unwrap(), ["cut here".to_string()]);
    assert_eq!(doc.node(&id).unwrap().kind(), &NodeKind::Text);
}
