//! `ValidatePhase` — fail-fast (spec.md §4.2).
//!
//! One FAILURE or CANCELLED terminates the whole event. WAITING is not a
//! supported suspension point here: the phase finishes iterating its
//! remaining handlers and then reports the whole phase as FAILURE, since
//! "validation must be quick and synchronous."

use crate::event::Event;
use crate::handler::HandlerEntry;
use crate::observability::{default_sink, LogRecord};
use crate::outcome::{HandlerOutcome, PhaseResult};

use super::{invoke_with_policy, PhaseOutcome, PhaseTag, DEFAULT_MAX_HANDLER_EXECUTIONS};

#[derive(Debug)]
pub struct ValidatePhase {
    handlers: Vec<HandlerEntry>,
    max_executions: u32,
}

impl ValidatePhase {
    pub(crate) fn new(handlers: Vec<HandlerEntry>) -> Self {
        Self {
            handlers,
            max_executions: DEFAULT_MAX_HANDLER_EXECUTIONS,
        }
    }

    pub(crate) fn with_max_executions(mut self, max_executions: u32) -> Self {
        self.max_executions = max_executions;
        self
    }

    pub fn process(&mut self, event: &mut Event) -> PhaseOutcome {
        let mut saw_waiting = false;
        for entry in &self.handlers {
            let outcome = invoke_with_policy(entry, event, PhaseTag::Validate, self.max_executions);
            match outcome {
                HandlerOutcome::Success => {}
                HandlerOutcome::Failure => {
                    default_sink().record(LogRecord {
                        level: tracing::Level::DEBUG,
                        source: entry.name(),
                        message: "validate phase failed fast",
                    });
                    return PhaseOutcome::new(PhaseResult::Failure, None);
                }
                HandlerOutcome::Cancelled => {
                    return PhaseOutcome::new(PhaseResult::Cancelled, None);
                }
                HandlerOutcome::Waiting => {
                    // Keep iterating the rest of the handlers (spec.md §4.2),
                    // but validation as a whole is no longer synchronous.
                    saw_waiting = true;
                }
                HandlerOutcome::Retry => unreachable!("invoke_with_policy resolves Retry internally"),
            }
        }
        if saw_waiting {
            default_sink().record(LogRecord {
                level: tracing::Level::DEBUG,
                source: "validate",
                message: "validate phase observed WAITING; treating as failure",
            });
            PhaseOutcome::new(PhaseResult::Failure, None)
        } else {
            PhaseOutcome::new(PhaseResult::Continue, Some(PhaseTag::Configure))
        }
    }

    /// Validate never suspends, so resume/fail are harmless re-entries.
    pub fn resume(&mut self, event: &mut Event) -> PhaseOutcome {
        self.process(event)
    }

    pub fn fail(&mut self, event: &mut Event) -> PhaseOutcome {
        self.process(event)
    }

    pub fn cancel(&mut self, _event: &mut Event) {}
}
