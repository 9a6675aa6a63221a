//! Outcome, result, and disposition types at the three scopes the engine
//! reasons about: a single handler invocation, a phase, and a state — plus
//! the final event-scoped result returned from `Event::dispatch`.

use std::fmt;

/// What a phase handler callable reports after being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HandlerOutcome {
    Success,
    Failure,
    Waiting,
    Cancelled,
    /// Ask the dispatch primitive to re-invoke this handler, up to the
    /// configured execution cap (spec default: 3 total executions).
    Retry,
}

/// What a phase reports after running its handlers to whatever point it
/// stops at (completion, a failure short-circuit, a wait, or cancellation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseResult {
    Continue,
    Failure,
    Waiting,
    Cancelled,
    Unknown,
}

/// What a state (Business, Succeed, Cancelled, Completed) reports after one
/// pass through `process`/`resume`/`fail`/`cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateResult {
    Success,
    Failure,
    Waiting,
    Cancelled,
    Unknown,
}

/// The final, event-scoped disposition returned by `ProcessContext::process_event`
/// (and by `resume`/`cancel`/`fail` once they drain to completion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventProcessResult {
    Success,
    Failure,
    Cancelled,
    Waiting,
    Unknown,
}

impl fmt::Display for EventProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl EventProcessResult {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventProcessResult::Waiting)
    }
}
