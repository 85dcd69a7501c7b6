//! # BeamKit Scene
//!
//! The hierarchical scene-graph model the history engine mutates.
//! A [`Document`] owns a tree of [`Node`]s (layers, groups, shapes, text,
//! resource definitions and references). Every structural mutation moves
//! owned data: detaching a subtree returns it by value, inserting one
//! consumes it, so a node id is live in exactly one place at any time.
//!
//! Nothing in this crate records history. Mutation methods return the
//! prior state (old attribute value, old anchor, detached subtree) so the
//! command layer can capture exact inverses.

pub mod attr;
pub mod document;
pub mod node;
pub mod refscan;
pub mod transform;

pub use attr::AttributeMap;
pub use document::{Anchor, Document, Subtree};
pub use node::{Node, NodeId, NodeKind, ShapeTag};
pub use transform::{Matrix2D, TransformList, TransformOp};
