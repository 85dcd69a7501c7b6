//! Error handling for BeamKit
//!
//! Provides error types for the two layers of the engine:
//! - Scene errors (tree structure violations)
//! - History errors (command/undo-redo misuse)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Scene-graph error type
///
/// Represents violations of the tree structure: unknown ids, illegal
/// insertion targets, and ownership conflicts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No node with the given id exists in the tree
    #[error("Node not found: {id}")]
    NodeNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A node with this id is already live in the tree
    #[error("Duplicate node id: {id}")]
    DuplicateId {
        /// The conflicting id.
        id: String,
    },

    /// The requested sibling anchor is not a child of the target parent
    #[error("Sibling {sibling} is not a child of {parent}")]
    InvalidAnchor {
        /// The sibling id used as the insertion anchor.
        sibling: String,
        /// The parent the insertion targeted.
        parent: String,
    },

    /// Attempted to detach or reparent the document root
    #[error("The document root cannot be moved or removed")]
    RootImmovable,

    /// Moving a node under one of its own descendants
    #[error("Cannot move {id} into its own subtree")]
    CyclicMove {
        /// The node being moved.
        id: String,
    },
}

/// History engine error type
///
/// Represents misuse of the command/undo-redo API. Cosmetic failures
/// (dangling targets, unresolved references) are deliberately *not* errors;
/// they are logged and skipped so a batch can never corrupt the document.
/// Re-entrant undo/redo and batch-stack underflow are reported in-band
/// (a `false` return, a logged warning) rather than through this enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// finish_undoable_change() without a matching begin_undoable_change()
    #[error("finish_undoable_change called with no open change capture")]
    NoOpenChangeCapture,
}

/// Main error type for BeamKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Scene-graph error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// History engine error
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a scene-graph error
    pub fn is_scene_error(&self) -> bool {
        matches!(self, Error::Scene(_))
    }

    /// Check if this is a history engine error
    pub fn is_history_error(&self) -> bool {
        matches!(self, Error::History(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
