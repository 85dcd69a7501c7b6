//! Text content editing.

use beamkit_core::{Result, SceneError};
use beamkit_history::{HistoryRecordingService, UndoManager};
use beamkit_scene::{Document, NodeId};
use tracing::debug;

/// Replaces the text content of `id` as one undoable step. Setting the
/// same content is a no-op and records nothing.
pub fn edit_text(
    doc: &mut Document,
    manager: &mut UndoManager,
    id: &NodeId,
    new_lines: Vec<String>,
) -> Result<()> {
    let old_lines = doc
        .text_of(id)
        .map(<[String]>::to_vec)
        .ok_or_else(|| SceneError::NodeNotFound { id: id.to_string() })?;
    if old_lines == new_lines {
        return Ok(());
    }
    doc.set_text(id, new_lines.clone())?;
    debug!(node = %id, lines = new_lines.len(), "edited text content");

    HistoryRecordingService::new(manager).change_text(doc, id, old_lines, new_lines);
    Ok(())
}
