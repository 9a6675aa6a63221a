//! `ConfigurePhase` — fault-tolerant and resumable (spec.md §4.3).
//!
//! Unlike Validate, a single FAILURE does not stop the phase: Configure
//! keeps walking its handler list, and only reports FAILURE for the whole
//! phase if *every* handler that actually ran reported FAILURE. A WAITING
//! outcome suspends the whole phase at the current handler; the external
//! Resume/Fail calls resolve that one handler's outcome and let the walk
//! continue from there.

use crate::event::Event;
use crate::handler::HandlerEntry;
use crate::observability::{default_sink, LogRecord};
use crate::outcome::{HandlerOutcome, PhaseResult};

use super::{invoke_with_policy, PhaseOutcome, PhaseTag, DEFAULT_MAX_HANDLER_EXECUTIONS};

#[derive(Debug)]
pub struct ConfigurePhase {
    handlers: Vec<HandlerEntry>,
    results: Vec<Option<HandlerOutcome>>,
    cursor: usize,
    /// Signed: a Resume observed before the matching WAITING is recorded
    /// drives this negative (spec.md §9 "early-resume race"). The next
    /// WAITING seen only actually suspends once the counter is positive.
    waiting: i64,
    max_executions: u32,
}

impl ConfigurePhase {
    pub(crate) fn new(handlers: Vec<HandlerEntry>) -> Self {
        let len = handlers.len();
        Self {
            handlers,
            results: vec![None; len],
            cursor: 0,
            waiting: 0,
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
            let outcome = invoke_with_policy(&self.handlers[i], event, PhaseTag::Configure, self.max_executions);
            match outcome {
                HandlerOutcome::Success | HandlerOutcome::Failure => {
                    self.results[i] = Some(outcome);
                    self.cursor += 1;
                }
                HandlerOutcome::Cancelled => {
                    self.results[i] = Some(HandlerOutcome::Cancelled);
                    self.cursor += 1;
                    return PhaseOutcome::new(PhaseResult::Cancelled, Some(PhaseTag::Cleanup));
                }
                HandlerOutcome::Waiting => {
                    self.waiting += 1;
                    if self.waiting <= 0 {
                        // A Resume already arrived for this handler before we
                        // observed WAITING; treat it as sequential success.
                        self.results[i] = Some(HandlerOutcome::Success);
                        self.waiting = 0;
                        self.cursor += 1;
                        continue;
                    }
                    default_sink().record(LogRecord {
                        level: tracing::Level::DEBUG,
                        source: self.handlers[i].name(),
                        message: "configure phase suspended",
                    });
                    return PhaseOutcome::new(PhaseResult::Waiting, None);
                }
                HandlerOutcome::Retry => unreachable!("invoke_with_policy resolves Retry internally"),
            }
        }
        self.finish()
    }

    fn finish(&self) -> PhaseOutcome {
        let ran_any = self.results.iter().any(Option::is_some);
        let all_failed = ran_any
            && self
                .results
                .iter()
                .all(|r| matches!(r, Some(HandlerOutcome::Failure)));
        if all_failed {
            PhaseOutcome::new(PhaseResult::Failure, Some(PhaseTag::Cleanup))
        } else {
            PhaseOutcome::new(PhaseResult::Continue, Some(PhaseTag::Execute))
        }
    }

    pub fn resume(&mut self, event: &mut Event) -> PhaseOutcome {
        self.waiting -= 1;
        if self.waiting > 0 {
            return PhaseOutcome::new(PhaseResult::Waiting, None);
        }
        if self.cursor < self.handlers.len() {
            self.results[self.cursor] = Some(HandlerOutcome::Success);
            self.cursor += 1;
        }
        self.process(event)
    }

    pub fn fail(&mut self, event: &mut Event) -> PhaseOutcome {
        self.waiting -= 1;
        if self.waiting > 0 {
            return PhaseOutcome::new(PhaseResult::Waiting, None);
        }
        if self.cursor < self.handlers.len() {
            self.results[self.cursor] = Some(HandlerOutcome::Failure);
            self.cursor += 1;
        }
        self.process(event)
    }

    pub fn cancel(&mut self, _event: &mut Event) {
        self.waiting = 0;
    }
}
