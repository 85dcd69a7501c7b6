//! History lifecycle notifications.
//!
//! Subscribers (selection refresh, layer re-identification, rendering)
//! observe commands as they are applied and unapplied. They receive a
//! read-only view of the command and the resulting tree; any mutation they
//! want must go through a new, independently recorded command.

use std::fmt;

use beamkit_scene::Document;

use crate::command::Command;

/// The four lifecycle points surrounding command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryEventType {
    BeforeApply,
    AfterApply,
    BeforeUnapply,
    AfterUnapply,
}

/// A subscribed history listener.
pub type HistoryListener = Box<dyn FnMut(HistoryEventType, &Command, &Document)>;

/// Fan-out dispatcher for history events.
///
/// Events fire for every command processed, including each sub-command of
/// a batch as the batch recurses.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<HistoryListener>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for all four event types.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(HistoryEventType, &Command, &Document) + 'static,
    ) {
        self.listeners.push(Box::new(listener));
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Delivers one event to every listener in subscription order.
    pub fn dispatch(&mut self, event: HistoryEventType, command: &Command, doc: &Document) {
        for listener in &mut self.listeners {
            listener(event, command, doc);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
