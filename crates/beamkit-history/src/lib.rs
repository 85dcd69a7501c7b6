//! # BeamKit History
//!
//! The transactional edit engine: invertible commands over the scene
//! graph, composite batches, the undo/redo manager, and the resource
//! reference resolver.
//!
//! Every editing operation follows the same shape:
//!
//! 1. mutate the [`Document`](beamkit_scene::Document) through its direct
//!    API, keeping what it returns (old values, anchors, detached subtrees),
//! 2. wrap those captures into [`Command`]s, usually inside a
//!    [`BatchCommand`],
//! 3. push the result through [`UndoManager::add_command_to_history`].
//!
//! Recording never re-executes the edit; `apply` is the redo path and
//! `unapply` the undo path, each the exact inverse of the other.

pub mod batch;
pub mod command;
pub mod events;
pub mod manager;
pub mod recording;
pub mod resolver;

pub use batch::BatchCommand;
pub use command::{
    ChangeAttributes, ChangeText, Command, HistoryContext, InsertElement, MoveElement,
    RemoveElement,
};
pub use events::{EventDispatcher, HistoryEventType};
pub use manager::{ManagerState, UndoManager};
pub use recording::HistoryRecordingService;
pub use resolver::ReferenceResolver;
