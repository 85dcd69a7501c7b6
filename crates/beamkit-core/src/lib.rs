//! # BeamKit Core
//!
//! Shared types, error taxonomy, and constants for the BeamKit
//! design-tool engine. Provides the fundamental abstractions used by the
//! scene graph, the history engine, and the editing operations.

pub mod constants;
pub mod error;

pub use error::{Error, HistoryError, Result, SceneError};
