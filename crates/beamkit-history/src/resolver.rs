//! Resource reference resolver.
//!
//! When an edit removes a resource definition (gradient, filter, symbol)
//! that other nodes still point at through `url(#id)` attributes, the
//! detached subtree is parked here instead of being dropped. The first
//! time any node re-establishes a reference to that id, the parked
//! subtree is reattached under the document's resource container and the
//! table entry is consumed.
//!
//! Invariant: a given id is live in the tree or parked here, never both.

use std::collections::HashMap;

use tracing::{debug, warn};

use beamkit_scene::refscan;
use beamkit_scene::{Document, NodeId, Subtree};

/// Table of resource subtrees detached mid-edit, keyed by their root id.
#[derive(Debug, Default)]
pub struct ReferenceResolver {
    parked: HashMap<NodeId, Subtree>,
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parked subtrees.
    pub fn len(&self) -> usize {
        self.parked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parked.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.parked.contains_key(id)
    }

    /// Parks a detached resource subtree, keyed by its root id.
    ///
    /// Replacing an existing entry means two detached subtrees claimed the
    /// same id; the older one cannot be revived and is dropped.
    pub fn park(&mut self, subtree: Subtree) {
        let id = subtree.root_id().clone();
        debug!(id = %id, nodes = subtree.len(), "parking removed resource");
        if self.parked.insert(id.clone(), subtree).is_some() {
            warn!(id = %id, "replaced an already-parked resource with the same id");
        }
    }

    /// Removes and returns the parked subtree for `id`, if any.
    pub fn take(&mut self, id: &NodeId) -> Option<Subtree> {
        self.parked.remove(id)
    }

    /// Scans the live subtree rooted at `root` for references and
    /// reattaches any parked target under the document's resource
    /// container. Returns the number of subtrees revived.
    ///
    /// References to ids that are neither live nor parked are left in
    /// place and reported as warnings; a broken cosmetic reference must
    /// not block the rest of the edit.
    pub fn restore_references(&mut self, doc: &mut Document, root: &NodeId) -> usize {
        let mut revived = 0;
        for (referrer, attr, target) in refscan::references_in_subtree(doc, root) {
            let target_id = NodeId::new(target);
            if doc.contains(&target_id) {
                continue;
            }
            match self.parked.remove(&target_id) {
                Some(subtree) => {
                    let defs = doc.resource_container();
                    doc.insert_subtree(&defs, subtree, None)
                        .expect("parked ids are never live");
                    debug!(id = %target_id, referrer = %referrer, "revived parked resource");
                    revived += 1;
                }
                None => {
                    warn!(
                        referrer = %referrer,
                        attr,
                        target = %target_id,
                        "reference to missing resource left unresolved"
                    );
                }
            }
        }
        revived
    }
}
