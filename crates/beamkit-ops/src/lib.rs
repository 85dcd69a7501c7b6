//! Editing operations for BeamKit documents.
//!
//! Every operation here follows the same shape: mutate the
//! [`Document`](beamkit_scene::Document) directly, capture what changed
//! as invertible commands, and hand them to the
//! [`UndoManager`](beamkit_history::UndoManager) through a
//! [`HistoryRecordingService`](beamkit_history::HistoryRecordingService).
//! Multi-part edits batch their commands so undo and redo treat them as
//! one step.

pub mod clipboard;
pub mod element;
pub mod geometry;
pub mod group;
pub mod layer;
pub mod text;
pub mod transform_ops;

pub use clipboard::{paste_elements, Clipboard, ClipboardItem};
pub use element::{
    add_element, delete_elements, remove_unused_defs, reorder_element, ElementDescriptor,
    StackDirection,
};
pub use geometry::{combined_bbox, node_bbox, recalculate_dimensions, BBox};
pub use group::{create_temp_group, dissolve_temp_group, group_elements, ungroup_elements};
pub use layer::{create_layer, delete_layer, merge_layer_down, move_to_layer, rename_layer};
pub use text::edit_text;
pub use transform_ops::{align_elements, flip_elements, translate_elements, Alignment};
