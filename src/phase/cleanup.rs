//! `CleanupPhase` — best-effort, never waits (spec.md §4.5). Runs after
//! Configure/Execute failure or cancellation, and also after Execute
//! succeeds outright. Any outcome other than CANCELLED just continues;
//! FAILURE is recorded but does not stop the walk.

use crate::event::Event;
use crate::handler::HandlerEntry;
use crate::outcome::{HandlerOutcome, PhaseResult};

use super::{invoke_with_policy, PhaseOutcome, PhaseTag, DEFAULT_MAX_HANDLER_EXECUTIONS};

#[derive(Debug)]
pub struct CleanupPhase {
    handlers: Vec<HandlerEntry>,
    cursor: usize,
    has_failures: bool,
    max_executions: u32,
}

impl CleanupPhase {
    pub(crate) fn new(handlers: Vec<HandlerEntry>) -> Self {
        Self {
            handlers,
            cursor: 0,
            has_failures: false,
            max_executions: DEFAULT_MAX_HANDLER_EXECUTIONS,
        }
    }

    pub(crate) fn with_max_executions(mut self, max_executions: u32) -> Self {
        self.max_executions = max_executions;
        self
    }

    pub fn process(&mut self, event: &mut Event) -> PhaseOutcome {
        while self.cursor < self.handlers.len() {
            let outcome = invoke_with_policy(
                &self.handlers[self.cursor],
                event,
                PhaseTag::Cleanup,
                self.max_executions,
            );
            match outcome {
                HandlerOutcome::Cancelled => {
                    self.cursor += 1;
                    return PhaseOutcome::new(PhaseResult::Cancelled, None);
                }
                HandlerOutcome::Failure => {
                    self.has_failures = true;
                }
                HandlerOutcome::Success | HandlerOutcome::Waiting => {}
                HandlerOutcome::Retry => unreachable!("invoke_with_policy resolves Retry internally"),
            }
            self.cursor += 1;
        }
        if self.has_failures {
            PhaseOutcome::new(PhaseResult::Failure, None)
        } else {
            PhaseOutcome::new(PhaseResult::Continue, None)
        }
    }

    /// Cleanup never suspends (spec.md §4.5); these exist only so the
    /// generic drive loop doesn't need a special case for this phase.
    pub fn resume(&mut self, event: &mut Event) -> PhaseOutcome {
        self.process(event)
    }

    pub fn fail(&mut self, event: &mut Event) -> PhaseOutcome {
        self.process(event)
    }

    pub fn cancel(&mut self, _event: &mut Event) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::PhaseHandlerFn;
    use crate::priority::Priority;
    use std::sync::Arc;

    fn handler(name: &str, outcome: HandlerOutcome) -> HandlerEntry {
        let f: PhaseHandlerFn = Arc::new(move |_ctx| outcome);
        HandlerEntry::phase(name, PhaseTag::Cleanup, Priority::Normal, f)
    }

    #[test]
    fn failure_does_not_stop_remaining_cleanup_handlers() {
        let h1 = handler("k1", HandlerOutcome::Failure);
        let h2 = handler("k2", HandlerOutcome::Success);
        let mut phase = CleanupPhase::new(vec![h1, h2.clone()]);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = phase.process(&mut event);
        assert_eq!(outcome.result, PhaseResult::Failure);
        assert_eq!(h2.execution_count(), 1);
    }

    #[test]
    fn all_success_reports_continue() {
        let h1 = handler("k1", HandlerOutcome::Success);
        let mut phase = CleanupPhase::new(vec![h1]);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = phase.process(&mut event);
        assert_eq!(outcome.result, PhaseResult::Continue);
        assert_eq!(outcome.next, None);
    }

    #[test]
    fn cancelled_stops_immediately() {
        let h1 = handler("k1", HandlerOutcome::Cancelled);
        let h2 = handler("k2", HandlerOutcome::Success);
        let mut phase = CleanupPhase::new(vec![h1, h2.clone()]);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = phase.process(&mut event);
        assert_eq!(outcome.result, PhaseResult::Cancelled);
        assert_eq!(h2.execution_count(), 0);
    }
}
