use beamkit_ops::{
    add_element, delete_elements, group_elements, paste_elements, Clipboard, ElementDescriptor,
};
use beamkit_scene::NodeKind;

use crate::util::{add_rect_at, workspace};

#[test]
fn test_paste_creates_fresh_ids() {
    let (mut doc, mut manager, layer) = workspace();
    let original = add_rect_at(&mut doc, &mut manager, &layer, 10.0, 10.0);

    let mut clipboard = Clipboard::new();
    clipboard.copy_elements(&doc, &[original.clone()]);
    assert_eq!(clipboard.len(), 1);

    let pasted = paste_elements(&mut doc, &mut manager, &clipboard, &layer, 0.0, 0.0).unwrap();
    assert_eq!(pasted.len(), 1);
    assert_ne!(pasted[0], original);
    assert!(doc.contains(&original));
    assert!(doc.contains(&pasted[0]));
    assert_eq!(doc.get_attribute(&pasted[0], "x").as_deref(), Some("10"));
}

#[test]
fn test_paste_applies_offset() {
    let (mut doc, mut manager, layer) = workspace();
    let original = add_rect_at(&mut doc, &mut manager, &layer, 10.0, 10.0);

    let mut clipboard = Clipboard::new();
    clipboard.copy_elements(&doc, &[original]);
    let pasted = paste_elements(&mut doc, &mut manager, &clipboard, &layer, 7.0, 7.0).unwrap();

    let bbox = beamkit_ops::node_bbox(&doc, &pasted[0]).unwrap();
    assert!((bbox.x - 17.0).abs() < 1e-9);
    assert!((bbox.y - 17.0).abs() < 1e-9);
}

#[test]
fn test_paste_is_one_undo_step() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let b = add_rect_at(&mut doc, &mut manager, &layer, 20.0, 0.0);
    let mut clipboard = Clipboard::new();
    clipboard.copy_elements(&doc, &[a, b]);
    let steps = manager.undo_stack_size();

    let pasted = paste_elements(&mut doc, &mut manager, &clipboard, &layer, 0.0, 0.0).unwrap();
    assert_eq!(pasted.len(), 2);
    assert_eq!(manager.undo_stack_size(), steps + 1);

    assert!(manager.undo(&mut doc));
    for id in &pasted {
        assert!(!doc.contains(id));
    }
    assert!(manager.redo(&mut doc));
    for id in &pasted {
        assert!(doc.contains(id));
    }
}

#[test]
fn test_copied_group_pastes_with_descendants() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    let b = add_rect_at(&mut doc, &mut manager, &layer, 20.0, 0.0);
    let group = group_elements(&mut doc, &mut manager, &[a, b]).unwrap();

    let mut clipboard = Clipboard::new();
    clipboard.copy_elements(&doc, &[group.clone()]);
    let pasted = paste_elements(&mut doc, &mut manager, &clipboard, &layer, 0.0, 0.0).unwrap();

    let copy = &pasted[0];
    assert_ne!(copy, &group);
    assert_eq!(doc.children_of(copy).len(), 2);
    for child in doc.children_of(copy) {
        assert_eq!(doc.node(child).unwrap().kind(), &NodeKind::Shape(beamkit_scene::ShapeTag::Rect));
    }
}

#[test]
fn test_clipboard_survives_source_deletion() {
    let (mut doc, mut manager, layer) = workspace();
    let original = add_rect_at(&mut doc, &mut manager, &layer, 10.0, 10.0);
    let mut clipboard = Clipboard::new();
    clipboard.copy_elements(&doc, &[original.clone()]);

    delete_elements(&mut doc, &mut manager, &[original.clone()]).unwrap();
    assert!(!doc.contains(&original));

    let pasted = paste_elements(&mut doc, &mut manager, &clipboard, &layer, 0.0, 0.0).unwrap();
    assert!(doc.contains(&pasted[0]));
    assert_eq!(doc.get_attribute(&pasted[0], "x").as_deref(), Some("10"));
}

#[test]
fn test_paste_revives_parked_definition() {
    let (mut doc, mut manager, layer) = workspace();
    let defs = doc.resource_container();
    let def = add_element(
        &mut doc,
        &mut manager,
        &defs,
        ElementDescriptor::new(NodeKind::ResourceDef),
    )
    .unwrap();
    let rect = add_rect_at(&mut doc, &mut manager, &layer, 0.0, 0.0);
    doc.set_attribute(&rect, "fill", &format!("url(#{def})"))
        .unwrap();

    let mut clipboard = Clipboard::new();
    clipboard.copy_elements(&doc, &[rect.clone()]);

    // Deleting the gradient while the rect still uses it parks it in
    // the resolver; deleting the rect afterwards leaves only the parked
    // copy.
    delete_elements(&mut doc, &mut manager, &[def.clone()]).unwrap();
    delete_elements(&mut doc, &mut manager, &[rect.clone()]).unwrap();
    assert!(!doc.contains(&def));
    assert!(manager.resolver().contains(&def));

    let pasted = paste_elements(&mut doc, &mut manager, &clipboard, &layer, 0.0, 0.0).unwrap();
    assert!(doc.contains(&def));
    assert!(doc.contains(&pasted[0]));
}

#[test]
fn test_clipboard_serde_round_trip() {
    let (mut doc, mut manager, layer) = workspace();
    let a = add_rect_at(&mut doc, &mut manager, &layer, 1.0, 2.0);
    let mut clipboard = Clipboard::new();
    clipboard.copy_elements(&doc, &[a]);

    let json = serde_json::to_string(&clipboard).unwrap();
    let back: Clipboard = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back.items()[0].root_id(), clipboard.items()[0].root_id());
}
