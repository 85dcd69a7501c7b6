//! Composite commands.
//!
//! A batch is an ordered sequence of sub-commands (possibly nested
//! batches) treated as one atomic undo/redo unit: apply runs sub-commands
//! in recorded order, unapply in reverse order, depth-first.

use std::fmt;

use tracing::debug;

use beamkit_scene::Document;

use crate::command::{Command, HistoryContext};

/// Hook run once after a batch finishes applying or unapplying.
///
/// Receives a read-only view of the document; used to refresh derived,
/// non-undoable UI state, never scene-graph state.
pub type AfterHook = Box<dyn Fn(&Document)>;

/// An ordered, possibly nested composite of commands.
pub struct BatchCommand {
    label: String,
    stack: Vec<Command>,
    on_after: Option<AfterHook>,
}

impl BatchCommand {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            stack: Vec::new(),
            on_after: None,
        }
    }

    /// Label shown for this batch in undo/redo menus.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Appends a sub-command. Empty batches are dropped, not appended,
    /// which keeps `is_empty` equivalent to "no effective sub-commands".
    pub fn add_sub_command(&mut self, cmd: Command) {
        if let Command::Batch(batch) = &cmd {
            if batch.is_empty() {
                debug!(batch = %self.label, dropped = %batch.label, "dropping empty sub-batch");
                return;
            }
        }
        self.stack.push(cmd);
    }

    /// True iff, after discarding sub-commands that are themselves empty,
    /// nothing remains. Recomputed on every call: sub-commands can become
    /// empty while an operation is still being assembled.
    pub fn is_empty(&self) -> bool {
        self.stack.iter().all(|cmd| cmd.is_empty())
    }

    /// Number of direct sub-commands (including empty ones).
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Direct sub-commands, in recorded order.
    pub fn sub_commands(&self) -> &[Command] {
        &self.stack
    }

    /// Installs the after-direction hook. Fires once per apply/unapply of
    /// this batch; nested batches fire only their own hooks.
    pub fn set_on_after(&mut self, hook: impl Fn(&Document) + 'static) {
        self.on_after = Some(Box::new(hook));
    }

    pub(crate) fn apply_children(&mut self, ctx: &mut HistoryContext<'_>) {
        for cmd in &mut self.stack {
            cmd.apply(ctx);
        }
        if let Some(hook) = &self.on_after {
            hook(ctx.doc);
        }
    }

    pub(crate) fn unapply_children(&mut self, ctx: &mut HistoryContext<'_>) {
        for cmd in self.stack.iter_mut().rev() {
            cmd.unapply(ctx);
        }
        if let Some(hook) = &self.on_after {
            hook(ctx.doc);
        }
    }

    /// Depth-first walk over every non-batch command in this batch.
    pub(crate) fn for_each_leaf_mut(&mut self, f: &mut impl FnMut(&mut Command)) {
        for cmd in &mut self.stack {
            match cmd {
                Command::Batch(batch) => batch.for_each_leaf_mut(f),
                leaf => f(leaf),
            }
        }
    }
}

impl From<BatchCommand> for Command {
    fn from(batch: BatchCommand) -> Self {
        Command::Batch(batch)
    }
}

impl fmt::Debug for BatchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchCommand")
            .field("label", &self.label)
            .field("stack", &self.stack)
            .field("on_after", &self.on_after.is_some())
            .finish()
    }
}
