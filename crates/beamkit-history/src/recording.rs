//! Chainable history recording façade.
//!
//! Call sites build their history through this service instead of the
//! manager directly: `start_batch_command` opens a batch context, the
//! `*_element` methods drop their command into the innermost open batch
//! (or straight into the manager when none is open), `end_batch_command`
//! closes and records. Batch nesting is an explicit stack with a checked
//! end-never-exceeds-start invariant.
//!
//! [`HistoryRecordingService::no_history`] builds the sentinel instance
//! for call sites that must skip recording: identical contract, every
//! method a chainable no-op.

use tracing::warn;

use beamkit_scene::{Anchor, Document, NodeId, Subtree};

use crate::batch::BatchCommand;
use crate::command::{
    ChangeAttributes, ChangeText, Command, InsertElement, MoveElement, RemoveElement,
};
use crate::manager::UndoManager;

/// Ergonomic façade over an [`UndoManager`].
#[derive(Debug)]
pub struct HistoryRecordingService<'a> {
    manager: Option<&'a mut UndoManager>,
    open_batches: Vec<BatchCommand>,
}

impl<'a> HistoryRecordingService<'a> {
    /// A recording service backed by `manager`.
    pub fn new(manager: &'a mut UndoManager) -> Self {
        Self {
            manager: Some(manager),
            open_batches: Vec::new(),
        }
    }

    /// The `NO_HISTORY` sentinel: same contract, records nothing.
    pub fn no_history() -> Self {
        Self {
            manager: None,
            open_batches: Vec::new(),
        }
    }

    /// False for the no-history sentinel.
    pub fn is_recording(&self) -> bool {
        self.manager.is_some()
    }

    /// Number of batch contexts currently open.
    pub fn open_batch_depth(&self) -> usize {
        self.open_batches.len()
    }

    /// Opens a new batch context.
    pub fn start_batch_command(&mut self, label: impl Into<String>) -> &mut Self {
        if self.manager.is_some() {
            self.open_batches.push(BatchCommand::new(label));
        }
        self
    }

    /// Closes the innermost batch context, adding it to its parent batch
    /// or, if it was outermost, recording it with the manager.
    pub fn end_batch_command(&mut self, doc: &Document) -> &mut Self {
        if self.manager.is_none() {
            return self;
        }
        match self.open_batches.pop() {
            Some(batch) => self.add_command(doc, Command::Batch(batch)),
            None => {
                debug_assert!(false, "end_batch_command without matching start");
                warn!("end_batch_command called with no open batch");
                self
            }
        }
    }

    /// Records an insert of the live node `id`.
    pub fn insert_element(&mut self, doc: &Document, id: &NodeId) -> &mut Self {
        if self.manager.is_none() {
            return self;
        }
        match InsertElement::from_inserted(doc, id) {
            Some(cmd) => self.add_command(doc, Command::Insert(cmd)),
            None => {
                warn!(node = %id, "insert_element: node is not in the tree");
                self
            }
        }
    }

    /// Records a removal from its detached subtree and prior anchor.
    ///
    /// Without a manager the subtree is dropped, which is exactly the
    /// non-recorded removal semantics.
    pub fn remove_element(&mut self, doc: &Document, subtree: Subtree, anchor: Anchor) -> &mut Self {
        if self.manager.is_none() {
            return self;
        }
        self.add_command(doc, Command::Remove(RemoveElement::new(subtree, anchor)))
    }

    /// Records a move/reparent of the live node `id` from `old_anchor`.
    pub fn move_element(&mut self, doc: &Document, id: &NodeId, old_anchor: Anchor) -> &mut Self {
        if self.manager.is_none() {
            return self;
        }
        match MoveElement::from_moved(doc, id, old_anchor) {
            Some(cmd) => self.add_command(doc, Command::Move(cmd)),
            None => {
                warn!(node = %id, "move_element: node is not in the tree");
                self
            }
        }
    }

    /// Records attribute changes on `id`, diffing `old_values` against the
    /// live node.
    pub fn change_element(
        &mut self,
        doc: &Document,
        id: &NodeId,
        old_values: impl IntoIterator<Item = (String, Option<String>)>,
    ) -> &mut Self {
        if self.manager.is_none() {
            return self;
        }
        let cmd = ChangeAttributes::capture(doc, id, old_values);
        if cmd.is_noop() {
            return self;
        }
        self.add_command(doc, Command::ChangeAttributes(cmd))
    }

    /// Records a text content change on `id`.
    pub fn change_text(
        &mut self,
        doc: &Document,
        id: &NodeId,
        old_lines: Vec<String>,
        new_lines: Vec<String>,
    ) -> &mut Self {
        if self.manager.is_none() {
            return self;
        }
        self.add_command(
            doc,
            Command::ChangeText(ChangeText::new(id.clone(), old_lines, new_lines)),
        )
    }

    /// Adds an already-built command to the innermost open batch, or
    /// records it directly when no batch is open.
    pub fn add_command(&mut self, doc: &Document, cmd: Command) -> &mut Self {
        let Some(manager) = self.manager.as_deref_mut() else {
            return self;
        };
        match self.open_batches.last_mut() {
            Some(batch) => batch.add_sub_command(cmd),
            None => manager.add_command_to_history(doc, cmd),
        }
        self
    }
}

impl Drop for HistoryRecordingService<'_> {
    fn drop(&mut self) {
        // Discarding unfinished batches is how an operation cancels; only
        // note it, the commands were never recorded.
        if !self.open_batches.is_empty() {
            warn!(
                open = self.open_batches.len(),
                "recording service dropped with unfinished batches"
            );
        }
    }
}
