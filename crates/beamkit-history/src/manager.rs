//! The undo/redo manager.
//!
//! Owns the two history stacks, the lifecycle event dispatcher, and the
//! reference resolver. Constructed as an explicit instance and passed by
//! handle to every editing operation; tests instantiate independent
//! managers per case.

use tracing::{debug, warn};

use beamkit_core::{HistoryError, Result};
use beamkit_scene::{Document, NodeId};

use crate::batch::BatchCommand;
use crate::command::{ChangeAttributes, Command, HistoryContext};
use crate::events::{EventDispatcher, HistoryEventType};
use crate::resolver::ReferenceResolver;

/// Execution state; re-entrant undo/redo is rejected while not `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Idle,
    Applying,
    Unapplying,
}

/// One open `begin_undoable_change` capture.
#[derive(Debug)]
struct ChangeCapture {
    attr: String,
    targets: Vec<(NodeId, Option<String>)>,
}

/// Undo/redo stacks plus the machinery around them.
pub struct UndoManager {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    state: ManagerState,
    events: EventDispatcher,
    resolver: ReferenceResolver,
    change_captures: Vec<ChangeCapture>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            state: ManagerState::Idle,
            events: EventDispatcher::new(),
            resolver: ReferenceResolver::new(),
            change_captures: Vec::new(),
        }
    }

    /// Subscribes a listener to all four lifecycle events.
    pub fn on_history_event(
        &mut self,
        listener: impl FnMut(HistoryEventType, &Command, &Document) + 'static,
    ) {
        self.events.subscribe(listener);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_stack_size(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_stack_size(&self) -> usize {
        self.redo_stack.len()
    }

    /// Description of the command `undo()` would revert.
    pub fn next_undo_label(&self) -> Option<String> {
        self.undo_stack.last().map(Command::description)
    }

    /// Description of the command `redo()` would re-run.
    pub fn next_redo_label(&self) -> Option<String> {
        self.redo_stack.last().map(Command::description)
    }

    /// Drops all history. Does not touch the document.
    pub fn reset_undo_stack(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Read access to the parked-resource table.
    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// Revives parked resources referenced from the subtree at `root`.
    /// Operations call this after inserting content that may re-reference
    /// removed definitions (paste, import).
    pub fn restore_references(&mut self, doc: &mut Document, root: &NodeId) -> usize {
        self.resolver.restore_references(doc, root)
    }

    /// Records a command. The edit it describes has already happened;
    /// recording never re-executes it.
    ///
    /// Empty commands are dropped. Recording clears the redo stack. Remove
    /// commands holding a still-referenced resource definition hand their
    /// subtree to the resolver here, at the moment of removal.
    pub fn add_command_to_history(&mut self, doc: &Document, cmd: Command) {
        if cmd.is_empty() {
            debug!(command = %cmd.description(), "dropping empty command");
            return;
        }
        let mut cmd = cmd;
        self.park_removed_resources(doc, &mut cmd);
        debug!(command = %cmd.description(), "recording command");
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
    }

    fn park_removed_resources(&mut self, doc: &Document, cmd: &mut Command) {
        match cmd {
            Command::Remove(remove) => remove.take_for_parking(doc, &mut self.resolver),
            Command::Batch(batch) => {
                let resolver = &mut self.resolver;
                batch.for_each_leaf_mut(&mut |leaf| {
                    if let Command::Remove(remove) = leaf {
                        remove.take_for_parking(doc, resolver);
                    }
                });
            }
            _ => {}
        }
    }

    /// Reverts the most recent command. Returns false when there is
    /// nothing to undo or a re-entrant call was rejected.
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        if self.state != ManagerState::Idle {
            warn!(state = ?self.state, "re-entrant undo rejected");
            return false;
        }
        let Some(mut cmd) = self.undo_stack.pop() else {
            return false;
        };
        self.state = ManagerState::Unapplying;
        {
            let mut ctx = HistoryContext {
                doc,
                resolver: &mut self.resolver,
                events: &mut self.events,
            };
            cmd.unapply(&mut ctx);
        }
        self.redo_stack.push(cmd);
        self.state = ManagerState::Idle;
        true
    }

    /// Re-runs the most recently undone command. Returns false when there
    /// is nothing to redo or a re-entrant call was rejected.
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        if self.state != ManagerState::Idle {
            warn!(state = ?self.state, "re-entrant redo rejected");
            return false;
        }
        let Some(mut cmd) = self.redo_stack.pop() else {
            return false;
        };
        self.state = ManagerState::Applying;
        {
            let mut ctx = HistoryContext {
                doc,
                resolver: &mut self.resolver,
                events: &mut self.events,
            };
            cmd.apply(&mut ctx);
        }
        self.undo_stack.push(cmd);
        self.state = ManagerState::Idle;
        true
    }

    /// Snapshots `attr` on each node. The caller may then mutate freely;
    /// `finish_undoable_change` diffs against this snapshot.
    ///
    /// Captures nest: each begin pushes onto a stack, each finish pops.
    pub fn begin_undoable_change(&mut self, doc: &Document, attr: &str, nodes: &[NodeId]) {
        let targets = nodes
            .iter()
            .map(|id| (id.clone(), doc.get_attribute(id, attr)))
            .collect();
        self.change_captures.push(ChangeCapture {
            attr: attr.to_string(),
            targets,
        });
    }

    /// Closes the innermost capture and returns one batch holding a
    /// ChangeAttributes command per node whose value actually differs.
    /// The batch is empty if nothing changed.
    pub fn finish_undoable_change(&mut self, doc: &mut Document) -> Result<BatchCommand> {
        let capture = self
            .change_captures
            .pop()
            .ok_or(HistoryError::NoOpenChangeCapture)?;
        let mut batch = BatchCommand::new(format!("Change {}", capture.attr));
        for (id, old) in capture.targets {
            let cmd = ChangeAttributes::capture(doc, &id, [(capture.attr.clone(), old)]);
            if !cmd.is_noop() {
                // A fresh value may re-reference a parked resource.
                self.resolver.restore_references(doc, &id);
                batch.add_sub_command(Command::ChangeAttributes(cmd));
            }
        }
        Ok(batch)
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoManager")
            .field("undo_stack", &self.undo_stack.len())
            .field("redo_stack", &self.redo_stack.len())
            .field("state", &self.state)
            .field("parked", &self.resolver.len())
            .field("open_captures", &self.change_captures.len())
            .finish()
    }
}
