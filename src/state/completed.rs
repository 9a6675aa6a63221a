//! `CompletedState` (spec.md §4.7): the absolute terminus. Runs its final
//! entries and never transitions further.

use crate::event::Event;
use crate::handler::{sorted_snapshot, HandlerEntry, HandlerKind, StateTarget};
use crate::outcome::StateResult;

use super::{run_state_handlers, StateOutcome};

#[derive(Debug)]
pub struct CompletedState {
    handlers: Vec<HandlerEntry>,
}

impl CompletedState {
    pub(crate) fn new(handlers: &[HandlerEntry]) -> Self {
        let matching = handlers
            .iter()
            .filter(|h| h.kind() == HandlerKind::State(StateTarget::Completed))
            .cloned();
        Self {
            handlers: sorted_snapshot(matching),
        }
    }

    pub fn process(&mut self, event: &Event) -> StateOutcome {
        run_state_handlers(&self.handlers, event);
        StateOutcome::new(StateResult::Success, None)
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
