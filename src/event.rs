//! `Event`: the data bag that flows through dispatch (spec.md §3.1).
//!
//! An `Event` owns no reference back to its `ProcessContext` — phases and
//! states borrow it for the duration of a single call instead, which is how
//! this crate avoids the inheritance/back-reference cycles spec.md §9 flags
//! in the system it replaces.

use serde_json::Value;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::context::ProcessContext;
use crate::handler::HandlerEntry;

/// A single occurrence dispatched into the engine.
#[derive(Debug, Clone)]
pub struct Event {
    id: Uuid,
    type_tag: std::sync::Arc<str>,
    data: Value,
    in_dispatch: bool,
}

impl Event {
    pub fn new(type_tag: impl Into<std::sync::Arc<str>>, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            type_tag: type_tag.into(),
            data,
            in_dispatch: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    /// Whether this event is currently owned by a live `ProcessContext`
    /// (spec.md §7 `not_in_dispatch`: any external call made while this is
    /// `false` is rejected).
    pub fn in_dispatch(&self) -> bool {
        self.in_dispatch
    }

    pub(crate) fn mark_in_dispatch(&mut self) {
        self.in_dispatch = true;
    }

    pub(crate) fn release(&mut self) {
        self.in_dispatch = false;
    }

    /// Begins processing: hands ownership of `self` plus the resolved
    /// handler list to a fresh `ProcessContext`, which filters and
    /// priority-sorts a snapshot per phase/state as it builds the state
    /// machine.
    pub fn dispatch(mut self, handlers: Vec<HandlerEntry>) -> ProcessContext {
        self.mark_in_dispatch();
        ProcessContext::new(self, handlers)
    }

    /// Like [`dispatch`](Self::dispatch) but honors [`EngineConfig`]'s
    /// retry cap instead of the built-in default.
    pub fn dispatch_with_config(mut self, handlers: Vec<HandlerEntry>, config: &EngineConfig) -> ProcessContext {
        self.mark_in_dispatch();
        ProcessContext::with_max_executions(self, handlers, config.max_handler_executions)
    }
}

/// Minimal constructor-style builder for [`Event`] (spec.md §1 excludes the
/// full public fluent event-builder API as a non-core collaborator; this
/// covers just enough to construct the one entity the core owns).
#[derive(Debug, Default)]
pub struct EventBuilder {
    type_tag: Option<std::sync::Arc<str>>,
    data: Value,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            type_tag: None,
            data: Value::Null,
        }
    }

    #[must_use]
    pub fn type_tag(mut self, type_tag: impl Into<std::sync::Arc<str>>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Builds the event. Panics if `type_tag` was never set — call sites
    /// construct this in one fluent chain, so there is no recoverable
    /// partial-event state to hand back.
    pub fn build(self) -> Event {
        let type_tag = self.type_tag.expect("EventBuilder::build called without a type_tag");
        Event::new(type_tag, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_is_not_yet_in_dispatch() {
        let event = Event::new("order.created", serde_json::json!({"id": 1}));
        assert!(!event.in_dispatch());
    }

    #[test]
    fn dispatch_marks_the_event_in_dispatch() {
        let event = Event::new("order.created", serde_json::json!({}));
        let ctx = event.dispatch(vec![]);
        assert!(ctx.event().in_dispatch());
    }

    #[test]
    fn builder_constructs_an_event_with_the_given_type_and_data() {
        let event = EventBuilder::new()
            .type_tag("order.created")
            .data(serde_json::json!({"id": 7}))
            .build();
        assert_eq!(event.type_tag(), "order.created");
        assert_eq!(event.data(), &serde_json::json!({"id": 7}));
    }

    #[test]
    #[should_panic(expected = "type_tag")]
    fn builder_panics_without_a_type_tag() {
        let _ = EventBuilder::new().build();
    }
}
