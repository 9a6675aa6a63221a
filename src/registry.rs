//! The "handler registration adapter" collaborator named in spec.md §6: the
//! core only needs, by the time it builds a `ProcessContext`, an ordered
//! sequence of applicable entries for an event type. `StaticRegistry` is a
//! minimal `HashMap`-backed implementation for tests and small embedders —
//! deliberately not the "global registration/manager bookkeeping" spec.md §1
//! excludes.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::handler::HandlerEntry;

pub trait HandlerRegistry {
    /// Returns every handler entry applicable to `event_type`, in whatever
    /// order the registry happens to hold them — the caller (`Event::dispatch`
    /// via `BusinessState`/terminal-state construction) is responsible for
    /// the priority sort, not the registry.
    fn handlers_for(&self, event_type: &str) -> EngineResult<Vec<HandlerEntry>>;
}

/// A plain in-memory registry keyed by event-type tag.
#[derive(Default)]
pub struct StaticRegistry {
    by_type: HashMap<String, Vec<HandlerEntry>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, event_type: impl Into<String>, entry: HandlerEntry) {
        self.by_type.entry(event_type.into()).or_default().push(entry);
    }
}

impl HandlerRegistry for StaticRegistry {
    fn handlers_for(&self, event_type: &str) -> EngineResult<Vec<HandlerEntry>> {
        self.by_type
            .get(event_type)
            .cloned()
            .ok_or_else(|| EngineError::TypeNotFound(event_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::PhaseHandlerFn;
    use crate::outcome::HandlerOutcome;
    use crate::phase::PhaseTag;
    use crate::priority::Priority;
    use std::sync::Arc;

    #[test]
    fn unregistered_event_type_is_type_not_found() {
        let registry = StaticRegistry::new();
        let result = registry.handlers_for("nonexistent.event");
        assert!(matches!(result, Err(EngineError::TypeNotFound(_))));
    }

    #[test]
    fn registered_handlers_are_returned_for_their_event_type() {
        let mut registry = StaticRegistry::new();
        let f: PhaseHandlerFn = Arc::new(|_ctx| HandlerOutcome::Success);
        registry.register(
            "order.created",
            HandlerEntry::phase("h1", PhaseTag::Validate, Priority::Normal, f),
        );
        let handlers = registry.handlers_for("order.created").unwrap();
        assert_eq!(handlers.len(), 1);
    }
}
