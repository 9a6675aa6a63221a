//! `ProcessContext` (spec.md §4.8): the sole owner of the outer state
//! machine for one event's dispatch. `HandlerContext` is the narrow,
//! non-owning view a phase handler actually sees — it borrows the event for
//! the duration of a single call and carries the active phase tag, rather
//! than holding a reference back into the context itself (spec.md §9: no
//! ownership cycles between context, state, and phase).

use crate::error::{EngineError, EngineResult};
use crate::event::Event;
use crate::handler::HandlerEntry;
use crate::outcome::{EventProcessResult, StateResult};
use crate::phase::{PhaseTag, DEFAULT_MAX_HANDLER_EXECUTIONS};
use crate::state::{BusinessState, CancelledState, CompletedState, StateTag, SucceedState};

/// What a phase handler sees when invoked: the event it may read and
/// mutate, and which phase is currently running it.
pub struct HandlerContext<'a> {
    event: &'a mut Event,
    phase: PhaseTag,
}

impl<'a> HandlerContext<'a> {
    pub(crate) fn new(event: &'a mut Event, phase: PhaseTag) -> Self {
        Self { event, phase }
    }

    pub fn event(&self) -> &Event {
        self.event
    }

    pub fn event_mut(&mut self) -> &mut Event {
        self.event
    }

    pub fn phase(&self) -> PhaseTag {
        self.phase
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepKind {
    Process,
    Resume,
    Fail,
}

/// Owns the event and the full outer state machine for one dispatch
/// (spec.md §3.1, §4.8). Constructed by [`Event::dispatch`].
pub struct ProcessContext {
    event: Event,
    current: StateTag,
    business: BusinessState,
    succeed: SucceedState,
    cancelled: CancelledState,
    completed: CompletedState,
    waiting: bool,
    is_cancelled: bool,
    has_failures: bool,
    last_result: Option<EventProcessResult>,
}

impl ProcessContext {
    pub(crate) fn new(event: Event, handlers: Vec<HandlerEntry>) -> Self {
        Self::with_max_executions(event, handlers, DEFAULT_MAX_HANDLER_EXECUTIONS)
    }

    pub(crate) fn with_max_executions(event: Event, handlers: Vec<HandlerEntry>, max_executions: u32) -> Self {
        Self {
            business: BusinessState::new(&handlers, max_executions),
            succeed: SucceedState::new(&handlers),
            cancelled: CancelledState::new(&handlers),
            completed: CompletedState::new(&handlers),
            event,
            current: StateTag::Business,
            waiting: false,
            is_cancelled: false,
            has_failures: false,
            last_result: None,
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn event_mut(&mut self) -> &mut Event {
        &mut self.event
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn last_result(&self) -> Option<EventProcessResult> {
        self.last_result
    }

    /// Drives the state machine to completion or the next waiting pause
    /// (spec.md §4.8, the entry point `Event::dispatch` calls).
    pub fn process_event(&mut self) -> EngineResult<EventProcessResult> {
        if !self.event.in_dispatch() {
            return Err(EngineError::NotInDispatch);
        }
        Ok(self.run(StepKind::Process))
    }

    /// Nudges a waiting event forward (spec.md §6 `Context.Resume()`).
    pub fn resume(&mut self) -> EngineResult<EventProcessResult> {
        if !self.waiting {
            return Err(EngineError::ResumeWithoutWaiting);
        }
        Ok(self.run(StepKind::Resume))
    }

    /// Like [`resume`](Self::resume) but marks the pending handler FAILURE
    /// rather than SUCCESS.
    pub fn fail(&mut self) -> EngineResult<EventProcessResult> {
        if !self.waiting {
            return Err(EngineError::ResumeWithoutWaiting);
        }
        Ok(self.run(StepKind::Fail))
    }

    /// Cancels the event. Idempotent once Cancelled/Completed is reached
    /// (spec.md §8 property 5): further calls are no-ops returning the
    /// already-settled result.
    pub fn cancel(&mut self) -> EventProcessResult {
        if let Some(result) = self.last_result {
            if matches!(self.current, StateTag::Completed) {
                return result;
            }
        }
        if self.current == StateTag::Business {
            let outcome = self.business.cancel(&mut self.event);
            self.waiting = false;
            self.apply(outcome.result);
            self.current = outcome.next.unwrap_or(StateTag::Completed);
            return self.drain();
        }
        // Succeed/Cancelled/Completed don't support Cancel (spec.md §4.7);
        // fall through to draining whatever is already in flight.
        self.drain()
    }

    fn apply(&mut self, result: StateResult) {
        match result {
            StateResult::Cancelled => self.is_cancelled = true,
            StateResult::Failure => self.has_failures = true,
            StateResult::Waiting | StateResult::Success | StateResult::Unknown => {}
        }
    }

    fn run(&mut self, first: StepKind) -> EventProcessResult {
        let mut step = first;
        loop {
            let outcome = match self.current {
                StateTag::Business => match step {
                    StepKind::Process => self.business.process(&mut self.event),
                    StepKind::Resume => self.business.resume(&mut self.event),
                    StepKind::Fail => self.business.fail(&mut self.event),
                },
                StateTag::Succeed => self.succeed.process(&self.event),
                StateTag::Cancelled => self.cancelled.process(&self.event),
                StateTag::Completed => self.completed.process(&self.event),
            };
            step = StepKind::Process;
            self.apply(outcome.result);
            if matches!(outcome.result, StateResult::Waiting) {
                self.waiting = true;
                return EventProcessResult::Waiting;
            }
            self.waiting = false;
            match outcome.next {
                Some(next) => self.current = next,
                None => {
                    let result = self.finish();
                    self.last_result = Some(result);
                    return result;
                }
            }
        }
    }

    /// Continues draining from wherever `current`/`waiting` already stand,
    /// without forcing a particular entry kind on the first step.
    fn drain(&mut self) -> EventProcessResult {
        self.run(StepKind::Process)
    }

    fn finish(&mut self) -> EventProcessResult {
        self.event.release();
        if self.is_cancelled {
            EventProcessResult::Cancelled
        } else if self.has_failures {
            EventProcessResult::Failure
        } else {
            EventProcessResult::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::PhaseHandlerFn;
    use crate::outcome::HandlerOutcome;
    use crate::priority::Priority;
    use std::sync::Arc;

    fn phase_handler(name: &str, phase: PhaseTag, outcome: HandlerOutcome) -> HandlerEntry {
        let f: PhaseHandlerFn = Arc::new(move |_ctx| outcome);
        HandlerEntry::phase(name, phase, Priority::Normal, f)
    }

    #[test]
    fn process_event_rejects_an_event_not_marked_in_dispatch() {
        let event = Event::new("t", serde_json::json!({}));
        let mut ctx = ProcessContext::new(event, vec![]);
        // never dispatched, so in_dispatch is false
        let result = ctx.process_event();
        assert!(matches!(result, Err(EngineError::NotInDispatch)));
    }

    #[test]
    fn full_happy_path_via_dispatch_returns_success() {
        let handlers = vec![
            phase_handler("v1", PhaseTag::Validate, HandlerOutcome::Success),
            phase_handler("c1", PhaseTag::Configure, HandlerOutcome::Success),
            phase_handler("e1", PhaseTag::Execute, HandlerOutcome::Success),
            phase_handler("cl1", PhaseTag::Cleanup, HandlerOutcome::Success),
        ];
        let event = Event::new("t", serde_json::json!({}));
        let mut ctx = event.dispatch(handlers);
        let result = ctx.process_event().expect("dispatch does not error");
        assert_eq!(result, EventProcessResult::Success);
        assert!(!ctx.event().in_dispatch());
    }

    #[test]
    fn resume_without_a_pending_wait_is_an_error() {
        let event = Event::new("t", serde_json::json!({}));
        let mut ctx = event.dispatch(vec![]);
        ctx.process_event().unwrap();
        assert!(matches!(ctx.resume(), Err(EngineError::ResumeWithoutWaiting)));
    }

    #[test]
    fn cancel_is_idempotent_once_completed() {
        let event = Event::new("t", serde_json::json!({}));
        let mut ctx = event.dispatch(vec![]);
        ctx.process_event().unwrap();
        let first = ctx.cancel();
        let second = ctx.cancel();
        assert_eq!(first, second);
    }
}
