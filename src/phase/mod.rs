//! The four business phases (spec.md §4.2–§4.5) and the shared dispatch
//! primitive they all invoke handlers through.

pub mod cleanup;
pub mod configure;
pub mod execute;
pub mod validate;

pub use cleanup::CleanupPhase;
pub use configure::ConfigurePhase;
pub use execute::ExecutePhase;
pub use validate::ValidatePhase;

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::context::HandlerContext;
use crate::error::EngineError;
use crate::event::Event;
use crate::handler::HandlerEntry;
use crate::observability::{default_sink, LogRecord};
use crate::outcome::{HandlerOutcome, PhaseResult};
use crate::priority::Priority;

/// Which of the four business phases is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseTag {
    Validate,
    Configure,
    Execute,
    Cleanup,
}

/// What a phase's `process`/`resume`/`fail`/`cancel` reports: the coarse
/// [`PhaseResult`] plus, when relevant, which phase runs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub result: PhaseResult,
    pub next: Option<PhaseTag>,
}

impl PhaseOutcome {
    pub(crate) fn new(result: PhaseResult, next: Option<PhaseTag>) -> Self {
        Self { result, next }
    }
}

/// Default cap on total executions of a single handler when it requests
/// [`HandlerOutcome::Retry`] (spec.md §4.1: "spec choice: 3 total executions").
pub const DEFAULT_MAX_HANDLER_EXECUTIONS: u32 = 3;

/// The dispatch primitive (spec.md §4.1): honors the predicate skip, invokes
/// the callable, catches a panicking handler and converts it to an outcome
/// per spec.md §7 ("handler_threw"), and bounds `Retry` re-invocation.
///
/// `phase` is only used to decide the Validate+CRITICAL escalation rule; it
/// does not affect anything else about invocation.
pub(crate) fn invoke_with_policy(
    entry: &HandlerEntry,
    event: &mut Event,
    phase: PhaseTag,
    max_executions: u32,
) -> HandlerOutcome {
    if entry.is_skipped(event) {
        return HandlerOutcome::Success;
    }

    loop {
        entry.record_invocation();
        let mut ctx = HandlerContext::new(event, phase);
        let invoked = catch_unwind(AssertUnwindSafe(|| entry.call_phase(&mut ctx)));

        let outcome = match invoked {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic_message(&panic);
                default_sink().record(LogRecord {
                    level: tracing::Level::ERROR,
                    source: entry.name(),
                    message: &format!("handler panicked during {:?}: {}", phase, reason),
                });
                let escalated = EngineError::HandlerThrew {
                    handler: entry.name().to_string(),
                    phase,
                    reason,
                };
                default_sink().record(LogRecord {
                    level: tracing::Level::DEBUG,
                    source: entry.name(),
                    message: &format!("handler_threw escalation recorded: {escalated}"),
                });
                if phase == PhaseTag::Validate && entry.priority() == Priority::Critical {
                    HandlerOutcome::Cancelled
                } else {
                    HandlerOutcome::Failure
                }
            }
        };

        if outcome != HandlerOutcome::Retry {
            return outcome;
        }
        if entry.execution_count() >= max_executions {
            default_sink().record(LogRecord {
                level: tracing::Level::DEBUG,
                source: entry.name(),
                message: &format!("retry cap of {max_executions} reached, treating as failure"),
            });
            return HandlerOutcome::Failure;
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::PhaseHandlerFn;
    use std::sync::Arc;

    fn entry(outcome: HandlerOutcome, priority: Priority) -> HandlerEntry {
        HandlerEntry::phase(
            "h",
            PhaseTag::Execute,
            priority,
            Arc::new(move |_ctx| outcome) as PhaseHandlerFn,
        )
    }

    #[test]
    fn retry_re_invokes_up_to_cap_then_fails() {
        let retrying = entry(HandlerOutcome::Retry, Priority::Normal);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = invoke_with_policy(&retrying, &mut event, PhaseTag::Execute, 3);
        assert_eq!(outcome, HandlerOutcome::Failure);
        assert_eq!(retrying.execution_count(), 3);
    }

    #[test]
    fn panic_in_validate_critical_handler_escalates_to_cancelled() {
        let panicking: PhaseHandlerFn = Arc::new(|_ctx| panic!("boom"));
        let e = HandlerEntry::phase("critical", PhaseTag::Validate, Priority::Critical, panicking);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = invoke_with_policy(&e, &mut event, PhaseTag::Validate, 3);
        assert_eq!(outcome, HandlerOutcome::Cancelled);
    }

    #[test]
    fn panic_elsewhere_converts_to_failure() {
        let panicking: PhaseHandlerFn = Arc::new(|_ctx| panic!("boom"));
        let e = HandlerEntry::phase("h", PhaseTag::Execute, Priority::Normal, panicking);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = invoke_with_policy(&e, &mut event, PhaseTag::Execute, 3);
        assert_eq!(outcome, HandlerOutcome::Failure);
    }
}
