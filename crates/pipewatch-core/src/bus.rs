// Rust guideline compliant 2026-02-06

//! Minimal observer surface a pipeline runtime exposes to reporters.

use crate::event::{EventKind, PipelineEvent};
use std::collections::BTreeMap;
use std::fmt;

/// Callback invoked for one event.
pub type Handler = Box<dyn FnMut(&PipelineEvent)>;

/// Dispatches events to the handlers subscribed to their kind.
///
/// Handlers run synchronously, in registration order, on the caller's thread.
#[derive(Default)]
pub struct EventBus {
    handlers: BTreeMap<EventKind, Vec<Handler>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for one event kind.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: FnMut(&PipelineEvent) + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    /// Delivers an event to every handler of its kind.
    ///
    /// # Returns
    ///
    /// The number of handlers invoked.
    pub fn emit(&mut self, event: &PipelineEvent) -> usize {
        match self.handlers.get_mut(&event.kind()) {
            Some(handlers) => {
                for handler in handlers.iter_mut() {
                    handler(event);
                }
                handlers.len()
            }
            None => 0,
        }
    }

    /// Number of handlers subscribed to `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<&EventKind, usize> =
            self.handlers.iter().map(|(k, v)| (k, v.len())).collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}
