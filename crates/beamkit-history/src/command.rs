//! Invertible command objects.
//!
//! Each command stores exactly the prior-state data needed to invert
//! itself. Structural commands (insert/remove/move) are constructed at the
//! moment the mutation happens, from the values the mutation returned;
//! attribute commands may be built after the fact by diffing captured old
//! values against the live tree.
//!
//! `apply` re-performs the edit (redo), `unapply` performs the exact
//! inverse (undo). Both are defensive: a target that has vanished from the
//! tree is a logged no-op, never a panic or a corrupted document, because
//! an aborted redo chain is worse than a skipped cosmetic update.

use std::fmt;

use tracing::{debug, warn};

use beamkit_scene::{refscan, Anchor, Document, NodeId, Subtree};

use crate::batch::BatchCommand;
use crate::events::{EventDispatcher, HistoryEventType};
use crate::resolver::ReferenceResolver;

/// Everything a command may touch while executing.
///
/// Built by the undo manager for each undo/redo pass; commands never hold
/// onto it.
pub struct HistoryContext<'a> {
    pub doc: &'a mut Document,
    pub resolver: &'a mut ReferenceResolver,
    pub events: &'a mut EventDispatcher,
}

/// Decides whether a freshly detached subtree stays with its command or
/// is parked in the resolver.
///
/// Returns `None` when parked. Only still-referenced resource definitions
/// are parked; everything else remains owned by the command.
pub(crate) fn stash_or_park(
    doc: &Document,
    resolver: &mut ReferenceResolver,
    subtree: Subtree,
) -> Option<Subtree> {
    if subtree.root().kind().is_resource_def() && refscan::is_referenced(doc, subtree.root_id()) {
        resolver.park(subtree);
        None
    } else {
        Some(subtree)
    }
}

/// A single invertible unit of tree mutation.
#[derive(Debug)]
pub enum Command {
    Insert(InsertElement),
    Remove(RemoveElement),
    Move(MoveElement),
    ChangeAttributes(ChangeAttributes),
    ChangeText(ChangeText),
    Batch(BatchCommand),
}

impl Command {
    /// Redo path: re-performs the described edit, with lifecycle events
    /// around it. Batches recurse, firing events per sub-command.
    pub fn apply(&mut self, ctx: &mut HistoryContext<'_>) {
        ctx.events
            .dispatch(HistoryEventType::BeforeApply, self, ctx.doc);
        self.do_apply(ctx);
        ctx.events
            .dispatch(HistoryEventType::AfterApply, self, ctx.doc);
    }

    /// Undo path: performs the exact inverse of the described edit.
    pub fn unapply(&mut self, ctx: &mut HistoryContext<'_>) {
        ctx.events
            .dispatch(HistoryEventType::BeforeUnapply, self, ctx.doc);
        self.do_unapply(ctx);
        ctx.events
            .dispatch(HistoryEventType::AfterUnapply, self, ctx.doc);
    }

    fn do_apply(&mut self, ctx: &mut HistoryContext<'_>) {
        match self {
            Command::Insert(cmd) => cmd.attach(ctx),
            Command::Remove(cmd) => cmd.detach(ctx),
            Command::Move(cmd) => cmd.relocate(ctx, Direction::Forward),
            Command::ChangeAttributes(cmd) => cmd.write(ctx, Direction::Forward),
            Command::ChangeText(cmd) => cmd.write(ctx, Direction::Forward),
            Command::Batch(batch) => batch.apply_children(ctx),
        }
    }

    fn do_unapply(&mut self, ctx: &mut HistoryContext<'_>) {
        match self {
            Command::Insert(cmd) => cmd.detach(ctx),
            Command::Remove(cmd) => cmd.attach(ctx),
            Command::Move(cmd) => cmd.relocate(ctx, Direction::Reverse),
            Command::ChangeAttributes(cmd) => cmd.write(ctx, Direction::Reverse),
            Command::ChangeText(cmd) => cmd.write(ctx, Direction::Reverse),
            Command::Batch(batch) => batch.unapply_children(ctx),
        }
    }

    /// True for batches whose effective sub-command list is empty and for
    /// attribute changes that changed nothing. Empty commands are never
    /// recorded.
    pub fn is_empty(&self) -> bool {
        match self {
            Command::Batch(batch) => batch.is_empty(),
            Command::ChangeAttributes(cmd) => cmd.is_noop(),
            _ => false,
        }
    }

    /// Human-readable description, shown in undo/redo menus.
    pub fn description(&self) -> String {
        match self {
            Command::Insert(cmd) => format!("Create {}", cmd.id),
            Command::Remove(cmd) => format!("Delete {}", cmd.id),
            Command::Move(cmd) => format!("Move {}", cmd.id),
            Command::ChangeAttributes(cmd) => format!("Change {}", cmd.id),
            Command::ChangeText(cmd) => format!("Edit text {}", cmd.id),
            Command::Batch(batch) => batch.label().to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Reverse,
}

/// Inverse capture for an element added to the tree.
///
/// Constructed from the live, just-inserted node; the command holds the
/// owned subtree only while the element is out of the tree (after undo).
#[derive(Debug)]
pub struct InsertElement {
    id: NodeId,
    anchor: Anchor,
    detached: Option<Subtree>,
}

impl InsertElement {
    /// Captures the location of a node that was just inserted.
    /// Returns `None` if `id` is not live.
    pub fn from_inserted(doc: &Document, id: &NodeId) -> Option<Self> {
        let anchor = doc.anchor_of(id)?;
        Some(Self {
            id: id.clone(),
            anchor,
            detached: None,
        })
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Redo: put the subtree back at its recorded location.
    fn attach(&mut self, ctx: &mut HistoryContext<'_>) {
        attach_at(
            ctx,
            &self.id,
            &self.anchor,
            &mut self.detached,
            "insert (redo)",
        );
    }

    /// Undo: take the subtree back out of the tree.
    fn detach(&mut self, ctx: &mut HistoryContext<'_>) {
        detach_into(
            ctx,
            &self.id,
            &mut self.anchor,
            &mut self.detached,
            "insert (undo)",
        );
    }
}

/// Inverse capture for an element removed from the tree.
///
/// Constructed at detach time from the subtree and anchor the detach
/// returned, the only place those values exist.
#[derive(Debug)]
pub struct RemoveElement {
    id: NodeId,
    anchor: Anchor,
    detached: Option<Subtree>,
}

impl RemoveElement {
    /// Wraps the result of `Document::detach_subtree`.
    pub fn new(subtree: Subtree, anchor: Anchor) -> Self {
        Self {
            id: subtree.root_id().clone(),
            anchor,
            detached: Some(subtree),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub(crate) fn take_for_parking(
        &mut self,
        doc: &Document,
        resolver: &mut ReferenceResolver,
    ) {
        if let Some(subtree) = self.detached.take() {
            self.detached = stash_or_park(doc, resolver, subtree);
        }
    }

    /// Redo: detach the subtree again.
    fn detach(&mut self, ctx: &mut HistoryContext<'_>) {
        detach_into(
            ctx,
            &self.id,
            &mut self.anchor,
            &mut self.detached,
            "remove (redo)",
        );
    }

    /// Undo: restore the subtree at its prior location.
    fn attach(&mut self, ctx: &mut HistoryContext<'_>) {
        attach_at(
            ctx,
            &self.id,
            &self.anchor,
            &mut self.detached,
            "remove (undo)",
        );
    }
}

/// Shared attach logic for Insert.apply / Remove.unapply.
///
/// The subtree may be held by the command, parked in the resolver (a
/// still-referenced resource definition), or already live again (revived
/// by a re-reference before this undo/redo reached it). In that last
/// case the node is relocated to the recorded anchor.
fn attach_at(
    ctx: &mut HistoryContext<'_>,
    id: &NodeId,
    anchor: &Anchor,
    detached: &mut Option<Subtree>,
    what: &str,
) {
    let subtree = detached.take().or_else(|| ctx.resolver.take(id));
    match subtree {
        Some(subtree) => {
            if let Err(err) =
                ctx.doc
                    .validate_insertion(&anchor.parent, &subtree, anchor.next_sibling.as_ref())
            {
                warn!(node = %id, %err, "skipping {what}: target location no longer valid");
                *detached = Some(subtree);
                return;
            }
            ctx.doc
                .insert_subtree(&anchor.parent, subtree, anchor.next_sibling.as_ref())
                .expect("insertion validated above");
            ctx.resolver.restore_references(ctx.doc, id);
        }
        None if ctx.doc.contains(id) => {
            // Revived under the resource container; move it home.
            match ctx
                .doc
                .move_node(id, &anchor.parent, anchor.next_sibling.as_ref())
            {
                Ok(_) => debug!(node = %id, "relocated revived node during {what}"),
                Err(err) => {
                    warn!(node = %id, %err, "skipping {what}: cannot relocate revived node")
                }
            }
        }
        None => warn!(node = %id, "skipping {what}: subtree is gone"),
    }
}

/// Shared detach logic for Insert.unapply / Remove.apply.
fn detach_into(
    ctx: &mut HistoryContext<'_>,
    id: &NodeId,
    anchor: &mut Anchor,
    detached: &mut Option<Subtree>,
    what: &str,
) {
    if detached.is_some() || ctx.resolver.contains(id) {
        debug!(node = %id, "{what}: already detached");
        return;
    }
    match ctx.doc.detach_subtree(id) {
        Ok((subtree, live_anchor)) => {
            // Later edits may have moved the node; capture where it really
            // was so re-attach is exact.
            *anchor = live_anchor;
            *detached = stash_or_park(ctx.doc, ctx.resolver, subtree);
        }
        Err(err) => warn!(node = %id, %err, "skipping {what}: node not in tree"),
    }
}

/// Inverse capture for a reparent/reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveElement {
    id: NodeId,
    old_anchor: Anchor,
    new_anchor: Anchor,
}

impl MoveElement {
    /// Captures a move that already happened: the old anchor was returned
    /// by the mutation, the new one is read from the live node.
    pub fn from_moved(doc: &Document, id: &NodeId, old_anchor: Anchor) -> Option<Self> {
        let new_anchor = doc.anchor_of(id)?;
        Some(Self {
            id: id.clone(),
            old_anchor,
            new_anchor,
        })
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The parent the node arrived at (forward direction).
    pub fn new_parent(&self) -> &NodeId {
        &self.new_anchor.parent
    }

    /// The parent the node left (forward direction).
    pub fn old_parent(&self) -> &NodeId {
        &self.old_anchor.parent
    }

    fn relocate(&mut self, ctx: &mut HistoryContext<'_>, direction: Direction) {
        let target = match direction {
            Direction::Forward => &self.new_anchor,
            Direction::Reverse => &self.old_anchor,
        };
        match ctx
            .doc
            .move_node(&self.id, &target.parent, target.next_sibling.as_ref())
        {
            Ok(_) => {}
            Err(err) => warn!(node = %self.id, %err, "skipping move: target unavailable"),
        }
    }
}

/// Inverse capture for attribute edits on one node.
///
/// Stores `name -> old value`; new values are read live at construction
/// (snapshot-and-diff). `None` means the attribute was absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeAttributes {
    id: NodeId,
    old_values: Vec<(String, Option<String>)>,
    new_values: Vec<(String, Option<String>)>,
}

impl ChangeAttributes {
    /// Diffs captured old values against the node's live state, keeping
    /// only attributes that actually changed.
    pub fn capture(
        doc: &Document,
        id: &NodeId,
        old_values: impl IntoIterator<Item = (String, Option<String>)>,
    ) -> Self {
        let mut old_kept = Vec::new();
        let mut new_kept = Vec::new();
        for (name, old) in old_values {
            let current = doc.get_attribute(id, &name);
            if current == old {
                continue;
            }
            new_kept.push((name.clone(), current));
            old_kept.push((name, old));
        }
        Self {
            id: id.clone(),
            old_values: old_kept,
            new_values: new_kept,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Names of the attributes this command touches.
    pub fn changed_attrs(&self) -> impl Iterator<Item = &str> {
        self.old_values.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn is_noop(&self) -> bool {
        self.old_values.is_empty()
    }

    fn write(&mut self, ctx: &mut HistoryContext<'_>, direction: Direction) {
        if !ctx.doc.contains(&self.id) {
            warn!(node = %self.id, "skipping attribute change: node not in tree");
            return;
        }
        let values = match direction {
            Direction::Forward => &self.new_values,
            Direction::Reverse => &self.old_values,
        };
        for (name, value) in values {
            let result = match value {
                Some(v) => ctx.doc.set_attribute(&self.id, name, v).map(|_| ()),
                None => ctx.doc.remove_attribute(&self.id, name).map(|_| ()),
            };
            if let Err(err) = result {
                warn!(node = %self.id, attr = %name, %err, "attribute write failed");
            }
        }
        // A restored value may re-reference a parked resource.
        ctx.resolver.restore_references(ctx.doc, &self.id);
    }
}

/// Inverse capture for a text edit.
///
/// Text nodes carry positional multi-line content, kept separate from the
/// attribute map, so text edits get their own command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeText {
    id: NodeId,
    old_lines: Vec<String>,
    new_lines: Vec<String>,
}

impl ChangeText {
    pub fn new(id: NodeId, old_lines: Vec<String>, new_lines: Vec<String>) -> Self {
        Self {
            id,
            old_lines,
            new_lines,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    fn write(&mut self, ctx: &mut HistoryContext<'_>, direction: Direction) {
        let lines = match direction {
            Direction::Forward => self.new_lines.clone(),
            Direction::Reverse => self.old_lines.clone(),
        };
        if let Err(err) = ctx.doc.set_text(&self.id, lines) {
            warn!(node = %self.id, %err, "skipping text change: node not in tree");
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
