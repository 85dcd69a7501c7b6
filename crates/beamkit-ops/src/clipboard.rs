//! Copy/paste. The clipboard stores detached deep copies, so source
//! elements can be edited or deleted without invalidating a later paste.

use beamkit_core::Result;
use beamkit_history::{HistoryRecordingService, UndoManager};
use beamkit_scene::{Document, NodeId, Subtree, TransformOp};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// One copied subtree, tagged so a UI can list clipboard contents.
/// Serializable so the clipboard survives a session restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardItem {
    id: Uuid,
    subtree: Subtree,
}

impl ClipboardItem {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn root_id(&self) -> &NodeId {
        self.subtree.root_id()
    }
}

/// In-memory clipboard holding deep copies of the last copied selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clipboard {
    items: Vec<ClipboardItem>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[ClipboardItem] {
        &self.items
    }

    /// Replaces the clipboard contents with deep copies of the given
    /// elements. Ids not in the tree are skipped with a warning.
    pub fn copy_elements(&mut self, doc: &Document, ids: &[NodeId]) {
        self.items.clear();
        for id in ids {
            match doc.clone_subtree(id) {
                Some(subtree) => self.items.push(ClipboardItem {
                    id: Uuid::new_v4(),
                    subtree,
                }),
                None => warn!(node = %id, "copy skipped, node is not in the tree"),
            }
        }
        debug!(count = self.items.len(), "copied elements to clipboard");
    }
}

/// Pastes every clipboard item under `parent`, offset by `(dx, dy)`,
/// with freshly generated ids throughout. One undoable step; parked
/// resource definitions the copies reference are revived. Returns the
/// new root ids.
pub fn paste_elements(
    doc: &mut Document,
    manager: &mut UndoManager,
    clipboard: &Clipboard,
    parent: &NodeId,
    dx: f64,
    dy: f64,
) -> Result<Vec<NodeId>> {
    let mut pasted = Vec::with_capacity(clipboard.items.len());

    for item in &clipboard.items {
        let fresh = item.subtree.with_remapped_ids(|_| doc.generate_id());
        let new_root = fresh.root_id().clone();
        doc.insert_subtree(parent, fresh, None)?;
        if dx != 0.0 || dy != 0.0 {
            let mut list = doc.transform_of(&new_root).cloned().unwrap_or_default();
            list.prepend(TransformOp::Translate { tx: dx, ty: dy });
            doc.set_transform(&new_root, list)?;
        }
        manager.restore_references(doc, &new_root);
        pasted.push(new_root);
    }

    let mut recording = HistoryRecordingService::new(manager);
    recording.start_batch_command("Paste Elements");
    for id in &pasted {
        recording.insert_element(doc, id);
    }
    recording.end_batch_command(doc);
    debug!(count = pasted.len(), "pasted clipboard contents");
    Ok(pasted)
}
