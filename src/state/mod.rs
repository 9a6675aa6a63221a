//! The outer state machine (spec.md §2, §4.6–§4.7): Business, Succeed,
//! Cancelled, Completed.

pub mod business;
pub mod cancelled;
pub mod completed;
pub mod succeed;

pub use business::BusinessState;
pub use cancelled::CancelledState;
pub use completed::CompletedState;
pub use succeed::SucceedState;

use crate::outcome::StateResult;

/// Which node of the outer state machine is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTag {
    Business,
    Succeed,
    Cancelled,
    Completed,
}

/// What a state reports after one pass through `process`/`resume`/`fail`/`cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateOutcome {
    pub result: StateResult,
    pub next: Option<StateTag>,
}

impl StateOutcome {
    pub(crate) fn new(result: StateResult, next: Option<StateTag>) -> Self {
        Self { result, next }
    }
}

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::event::Event;
use crate::handler::HandlerEntry;
use crate::observability::{default_sink, LogRecord};

/// Runs a state's handler stack (predicate-filtered, priority-ordered,
/// spec.md §4.7). State handlers return no outcome, so a panic here is
/// logged and the walk continues rather than escalating like a phase
/// handler would (there is no CRITICAL-escalation rule for state handlers).
pub(crate) fn run_state_handlers(handlers: &[HandlerEntry], event: &Event) {
    for entry in handlers {
        if entry.is_skipped(event) {
            continue;
        }
        entry.record_invocation();
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| entry.call_state(event))) {
            let reason = crate::phase::panic_message(&panic);
            default_sink().record(LogRecord {
                level: tracing::Level::ERROR,
                source: entry.name(),
                message: &format!("state handler panicked: {reason}"),
            });
        }
    }
}
