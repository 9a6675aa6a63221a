//! `SucceedState` (spec.md §4.7): runs its State-kind handler stack, then
//! always transitions to Completed.

use crate::event::Event;
use crate::handler::{sorted_snapshot, HandlerEntry, HandlerKind, StateTarget};
use crate::outcome::StateResult;

use super::{run_state_handlers, StateOutcome, StateTag};

#[derive(Debug)]
pub struct SucceedState {
    handlers: Vec<HandlerEntry>,
}

impl SucceedState {
    pub(crate) fn new(handlers: &[HandlerEntry]) -> Self {
        let matching = handlers
            .iter()
            .filter(|h| h.kind() == HandlerKind::State(StateTarget::Succeed))
            .cloned();
        Self {
            handlers: sorted_snapshot(matching),
        }
    }

    pub fn process(&mut self, event: &Event) -> StateOutcome {
        run_state_handlers(&self.handlers, event);
        StateOutcome::new(StateResult::Success, Some(StateTag::Completed))
    }

    pub fn resume(&mut self, event: &Event) -> StateOutcome {
        self.process(event)
    }

    pub fn fail(&mut self, event: &Event) -> StateOutcome {
        self.process(event)
    }

    pub fn cancel(&mut self, event: &Event) -> StateOutcome {
        self.process(event)
    }
}
