//! Transform-based edits: translate, flip and align. Each edit is
//! captured as an attribute change on `transform` and normalized through
//! the geometry recalculation pass inside the same batch.

use beamkit_core::Result;
use beamkit_history::{BatchCommand, UndoManager};
use beamkit_scene::{Document, Matrix2D, NodeId, TransformOp};
use tracing::{debug, warn};

use crate::geometry::{self, combined_bbox, node_bbox};

/// Alignment edge for [`align_elements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    CenterHorizontal,
    Right,
    Top,
    CenterVertical,
    Bottom,
}

/// Applies a per-node translation, captured and normalized as one
/// undoable step labeled `label`. Nodes with a zero delta are skipped.
fn translate_each(
    doc: &mut Document,
    manager: &mut UndoManager,
    label: &str,
    deltas: &[(NodeId, f64, f64)],
) -> Result<()> {
    let ids: Vec<NodeId> = deltas.iter().map(|(id, _, _)| id.clone()).collect();
    manager.begin_undoable_change(doc, "transform", &ids);
    for (id, dx, dy) in deltas {
        if *dx == 0.0 && *dy == 0.0 {
            continue;
        }
        let mut list = doc
            .transform_of(id)
            .cloned()
            .unwrap_or_default();
        list.prepend(TransformOp::Translate { tx: *dx, ty: *dy });
        // Skip vanished ids; the open capture must always reach finish.
        if let Err(err) = doc.set_transform(id, list) {
            warn!(node = %id, %err, "skipping translate: target unavailable");
        }
    }
    let changes = manager.finish_undoable_change(doc)?;

    let mut batch = BatchCommand::new(label);
    batch.add_sub_command(changes.into());
    for id in &ids {
        if let Some(cmd) = geometry::recalculate_dimensions(doc, id) {
            batch.add_sub_command(cmd);
        }
    }
    manager.add_command_to_history(doc, batch.into());
    Ok(())
}

/// Moves the given elements by `(dx, dy)` as one undoable step.
pub fn translate_elements(
    doc: &mut Document,
    manager: &mut UndoManager,
    ids: &[NodeId],
    dx: f64,
    dy: f64,
) -> Result<()> {
    let deltas: Vec<(NodeId, f64, f64)> = ids.iter().map(|id| (id.clone(), dx, dy)).collect();
    debug!(count = ids.len(), dx, dy, "translating elements");
    translate_each(doc, manager, "Move Elements", &deltas)
}

/// Mirrors the given elements about the combined selection center, along
/// the horizontal axis when `horizontal` is set and the vertical axis
/// otherwise.
pub fn flip_elements(
    doc: &mut Document,
    manager: &mut UndoManager,
    ids: &[NodeId],
    horizontal: bool,
) -> Result<()> {
    let Some(bounds) = combined_bbox(doc, ids) else {
        return Ok(());
    };
    let (cx, cy) = (bounds.center_x(), bounds.center_y());
    let (sx, sy) = if horizontal { (-1.0, 1.0) } else { (1.0, -1.0) };
    let mirror = Matrix2D::translate(cx, cy)
        .multiply(&Matrix2D::scale(sx, sy))
        .multiply(&Matrix2D::translate(-cx, -cy));

    manager.begin_undoable_change(doc, "transform", ids);
    for id in ids {
        let mut list = doc.transform_of(id).cloned().unwrap_or_default();
        list.prepend(TransformOp::Matrix(mirror));
        if let Err(err) = doc.set_transform(id, list) {
            warn!(node = %id, %err, "skipping flip: target unavailable");
        }
    }
    let changes = manager.finish_undoable_change(doc)?;

    let mut batch = BatchCommand::new("Flip Elements");
    batch.add_sub_command(changes.into());
    for id in ids {
        if let Some(cmd) = geometry::recalculate_dimensions(doc, id) {
            batch.add_sub_command(cmd);
        }
    }
    manager.add_command_to_history(doc, batch.into());
    Ok(())
}

/// Aligns each element to the given edge of the combined selection
/// bounds, as one undoable step.
pub fn align_elements(
    doc: &mut Document,
    manager: &mut UndoManager,
    ids: &[NodeId],
    alignment: Alignment,
) -> Result<()> {
    let Some(bounds) = combined_bbox(doc, ids) else {
        return Ok(());
    };
    let mut deltas: Vec<(NodeId, f64, f64)> = Vec::new();
    for id in ids {
        let Some(b) = node_bbox(doc, id) else { continue };
        let (dx, dy) = match alignment {
            Alignment::Left => (bounds.x - b.x, 0.0),
            Alignment::Right => (bounds.right() - b.right(), 0.0),
            Alignment::CenterHorizontal => (bounds.center_x() - b.center_x(), 0.0),
            Alignment::Top => (0.0, bounds.y - b.y),
            Alignment::Bottom => (0.0, bounds.bottom() - b.bottom()),
            Alignment::CenterVertical => (0.0, bounds.center_y() - b.center_y()),
        };
        deltas.push((id.clone(), dx, dy));
    }
    debug!(count = deltas.len(), ?alignment, "aligning elements");
    translate_each(doc, manager, "Align Elements", &deltas)
}
