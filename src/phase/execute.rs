//! `ExecutePhase` — comprehensive, never short-circuits on failure
//! (spec.md §4.4). Every handler runs regardless of earlier outcomes; the
//! phase accumulates a `has_failures` flag and a waiting counter across the
//! *entire* handler list in a single pass, then reports once at the end.

use crate::event::Event;
use crate::handler::HandlerEntry;
use crate::outcome::{HandlerOutcome, PhaseResult};

use super::{invoke_with_policy, PhaseOutcome, PhaseTag, DEFAULT_MAX_HANDLER_EXECUTIONS};

#[derive(Debug)]
pub struct ExecutePhase {
    handlers: Vec<HandlerEntry>,
    results: Vec<Option<HandlerOutcome>>,
    cursor: usize,
    waiting: i64,
    has_failures: bool,
    max_executions: u32,
}

impl ExecutePhase {
    pub(crate) fn new(handlers: Vec<HandlerEntry>) -> Self {
        let len = handlers.len();
        Self {
            handlers,
            results: vec![None; len],
            cursor: 0,
            waiting: 0,
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
            let i = self.cursor;
            let outcome = invoke_with_policy(&self.handlers[i], event, PhaseTag::Execute, self.max_executions);
            match outcome {
                HandlerOutcome::Success => {
                    self.results[i] = Some(HandlerOutcome::Success);
                }
                HandlerOutcome::Failure => {
                    self.results[i] = Some(HandlerOutcome::Failure);
                    self.has_failures = true;
                }
                HandlerOutcome::Cancelled => {
                    self.results[i] = Some(HandlerOutcome::Cancelled);
                    self.cursor += 1;
                    // Emergency abort: does not even route through Cleanup.
                    return PhaseOutcome::new(PhaseResult::Cancelled, None);
                }
                HandlerOutcome::Waiting => {
                    self.waiting += 1;
                    if self.waiting <= 0 {
                        self.results[i] = Some(HandlerOutcome::Success);
                        self.waiting = 0;
                    } else {
                        self.results[i] = Some(HandlerOutcome::Waiting);
                    }
                }
                HandlerOutcome::Retry => unreachable!("invoke_with_policy resolves Retry internally"),
            }
            self.cursor += 1;
        }
        self.finish()
    }

    fn finish(&self) -> PhaseOutcome {
        if self.waiting > 0 {
            PhaseOutcome::new(PhaseResult::Waiting, None)
        } else if self.has_failures {
            PhaseOutcome::new(PhaseResult::Failure, Some(PhaseTag::Cleanup))
        } else {
            PhaseOutcome::new(PhaseResult::Continue, Some(PhaseTag::Cleanup))
        }
    }

    /// Unlike Configure, a single pass already visited every handler, so
    /// resuming only needs to decrement the aggregate counter and finalize.
    pub fn resume(&mut self, _event: &mut Event) -> PhaseOutcome {
        self.waiting -= 1;
        if self.waiting > 0 {
            return PhaseOutcome::new(PhaseResult::Waiting, None);
        }
        let result = if self.has_failures {
            PhaseResult::Failure
        } else {
            PhaseResult::Continue
        };
        PhaseOutcome::new(result, Some(PhaseTag::Cleanup))
    }

    pub fn fail(&mut self, _event: &mut Event) -> PhaseOutcome {
        self.waiting -= 1;
        self.has_failures = true;
        if self.waiting > 0 {
            return PhaseOutcome::new(PhaseResult::Waiting, None);
        }
        PhaseOutcome::new(PhaseResult::Failure, Some(PhaseTag::Cleanup))
    }

    pub fn cancel(&mut self, _event: &mut Event) {
        self.waiting = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::PhaseHandlerFn;
    use crate::priority::Priority;
    use std::sync::Arc;

    fn handler(name: &str, outcome: HandlerOutcome) -> HandlerEntry {
        let f: PhaseHandlerFn = Arc::new(move |_ctx| outcome);
        HandlerEntry::phase(name, PhaseTag::Execute, Priority::Normal, f)
    }

    #[test]
    fn a_single_failure_does_not_stop_remaining_handlers() {
        let h1 = handler("e1", HandlerOutcome::Failure);
        let h2 = handler("e2", HandlerOutcome::Success);
        let mut phase = ExecutePhase::new(vec![h1, h2.clone()]);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = phase.process(&mut event);
        assert_eq!(outcome.result, PhaseResult::Failure);
        assert_eq!(outcome.next, Some(PhaseTag::Cleanup));
        assert_eq!(h2.execution_count(), 1);
    }

    #[test]
    fn all_success_continues_to_cleanup() {
        let h1 = handler("e1", HandlerOutcome::Success);
        let mut phase = ExecutePhase::new(vec![h1]);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = phase.process(&mut event);
        assert_eq!(outcome.result, PhaseResult::Continue);
        assert_eq!(outcome.next, Some(PhaseTag::Cleanup));
    }

    #[test]
    fn waiting_handlers_still_let_iteration_finish_before_reporting() {
        let h1 = handler("e1", HandlerOutcome::Waiting);
        let h2 = handler("e2", HandlerOutcome::Success);
        let mut phase = ExecutePhase::new(vec![h1, h2.clone()]);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = phase.process(&mut event);
        assert_eq!(outcome.result, PhaseResult::Waiting);
        assert_eq!(h2.execution_count(), 1);
        let resumed = phase.resume(&mut event);
        assert_eq!(resumed.result, PhaseResult::Continue);
        assert_eq!(resumed.next, Some(PhaseTag::Cleanup));
    }

    #[test]
    fn cancelled_aborts_without_routing_to_cleanup() {
        let h1 = handler("e1", HandlerOutcome::Cancelled);
        let h2 = handler("e2", HandlerOutcome::Success);
        let mut phase = ExecutePhase::new(vec![h1, h2.clone()]);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = phase.process(&mut event);
        assert_eq!(outcome.result, PhaseResult::Cancelled);
        assert_eq!(outcome.next, None);
        assert_eq!(h2.execution_count(), 0);
    }
}
