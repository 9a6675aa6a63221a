//! `BusinessState` (spec.md §4.6): composes the four phases in fixed order
//! Validate → Configure → Execute → Cleanup, interpreting each `PhaseResult`
//! to decide the next phase or the terminal state the event leaves Business
//! through.
//!
//! Open question resolution (spec.md §9, §4.3 vs §4.6): the generic phase
//! loop in §4.6 reads "CANCELLED: ... else transition to Cancelled," which
//! taken literally would skip Cleanup on a Configure-phase cancellation.
//! That contradicts §4.3's own contract ("next phase = Cleanup") and the
//! worked scenario in §8 #3, where Cleanup runs after a Configure CANCELLED.
//! This implementation follows the concrete scenario and the Cleanup
//! guarantee (§3.2 invariant 5): a non-Cleanup phase reporting CANCELLED
//! sets `pending_cancel` and still honors the phase's own `next` routing;
//! the CANCELLED disposition is only finalized once the chain runs out of
//! further phases.

use crate::event::Event;
use crate::handler::{sorted_snapshot, HandlerEntry, HandlerKind};
use crate::outcome::{PhaseResult, StateResult};
use crate::phase::{CleanupPhase, ConfigurePhase, ExecutePhase, PhaseOutcome, PhaseTag, ValidatePhase};

use super::{StateOutcome, StateTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Process,
    Resume,
    Fail,
}

#[derive(Debug)]
pub struct BusinessState {
    validate: ValidatePhase,
    configure: ConfigurePhase,
    execute: ExecutePhase,
    cleanup: CleanupPhase,
    current: Option<PhaseTag>,
    pending_cancel: bool,
}

impl BusinessState {
    pub(crate) fn new(handlers: &[HandlerEntry], max_executions: u32) -> Self {
        let by_phase = |tag: PhaseTag| -> Vec<HandlerEntry> {
            let matching = handlers
                .iter()
                .filter(|h| h.kind() == HandlerKind::Phase(tag))
                .cloned();
            sorted_snapshot(matching)
        };
        Self {
            validate: ValidatePhase::new(by_phase(PhaseTag::Validate)).with_max_executions(max_executions),
            configure: ConfigurePhase::new(by_phase(PhaseTag::Configure)).with_max_executions(max_executions),
            execute: ExecutePhase::new(by_phase(PhaseTag::Execute)).with_max_executions(max_executions),
            cleanup: CleanupPhase::new(by_phase(PhaseTag::Cleanup)).with_max_executions(max_executions),
            current: Some(PhaseTag::Validate),
            pending_cancel: false,
        }
    }

    pub fn process(&mut self, event: &mut Event) -> StateOutcome {
        self.drive(event, Entry::Process)
    }

    pub fn resume(&mut self, event: &mut Event) -> StateOutcome {
        self.drive(event, Entry::Resume)
    }

    pub fn fail(&mut self, event: &mut Event) -> StateOutcome {
        self.drive(event, Entry::Fail)
    }

    /// Cancel entry (spec.md §4.6): delegate to the current phase's cancel;
    /// regardless of its return, transition to Cancelled.
    pub fn cancel(&mut self, event: &mut Event) -> StateOutcome {
        match self.current {
            Some(PhaseTag::Validate) => self.validate.cancel(event),
            Some(PhaseTag::Configure) => self.configure.cancel(event),
            Some(PhaseTag::Execute) => self.execute.cancel(event),
            Some(PhaseTag::Cleanup) => self.cleanup.cancel(event),
            None => {}
        }
        self.current = None;
        self.pending_cancel = true;
        StateOutcome::new(StateResult::Cancelled, Some(StateTag::Cancelled))
    }

    fn invoke(&mut self, phase: PhaseTag, event: &mut Event, entry: Entry) -> PhaseOutcome {
        match (phase, entry) {
            (PhaseTag::Validate, Entry::Process) => self.validate.process(event),
            (PhaseTag::Validate, Entry::Resume) => self.validate.resume(event),
            (PhaseTag::Validate, Entry::Fail) => self.validate.fail(event),
            (PhaseTag::Configure, Entry::Process) => self.configure.process(event),
            (PhaseTag::Configure, Entry::Resume) => self.configure.resume(event),
            (PhaseTag::Configure, Entry::Fail) => self.configure.fail(event),
            (PhaseTag::Execute, Entry::Process) => self.execute.process(event),
            (PhaseTag::Execute, Entry::Resume) => self.execute.resume(event),
            (PhaseTag::Execute, Entry::Fail) => self.execute.fail(event),
            (PhaseTag::Cleanup, Entry::Process) => self.cleanup.process(event),
            (PhaseTag::Cleanup, Entry::Resume) => self.cleanup.resume(event),
            (PhaseTag::Cleanup, Entry::Fail) => self.cleanup.fail(event),
        }
    }

    fn drive(&mut self, event: &mut Event, first: Entry) -> StateOutcome {
        let Some(mut phase) = self.current else {
            return StateOutcome::new(StateResult::Success, Some(StateTag::Succeed));
        };
        let mut outcome = self.invoke(phase, event, first);
        loop {
            match outcome.result {
                PhaseResult::Waiting => {
                    self.current = Some(phase);
                    return StateOutcome::new(StateResult::Waiting, None);
                }
                PhaseResult::Cancelled => {
                    if phase == PhaseTag::Cleanup {
                        self.current = None;
                        if self.pending_cancel {
                            return StateOutcome::new(StateResult::Cancelled, Some(StateTag::Cancelled));
                        }
                        // Cleanup cancelled itself while reached via the
                        // normal path: the three core phases already passed.
                        return StateOutcome::new(StateResult::Success, Some(StateTag::Succeed));
                    }
                    self.pending_cancel = true;
                    match outcome.next {
                        Some(next) => {
                            self.current = Some(next);
                            phase = next;
                            outcome = self.invoke(phase, event, Entry::Process);
                            continue;
                        }
                        None => {
                            self.current = None;
                            return StateOutcome::new(StateResult::Cancelled, Some(StateTag::Cancelled));
                        }
                    }
                }
                PhaseResult::Failure => match outcome.next {
                    Some(next) => {
                        self.current = Some(next);
                        phase = next;
                        outcome = self.invoke(phase, event, Entry::Process);
                        continue;
                    }
                    None => {
                        self.current = None;
                        return StateOutcome::new(StateResult::Failure, Some(StateTag::Completed));
                    }
                },
                PhaseResult::Continue => {
                    self.current = outcome.next;
                    match self.current {
                        Some(next) => {
                            phase = next;
                            outcome = self.invoke(phase, event, Entry::Process);
                            continue;
                        }
                        None => return StateOutcome::new(StateResult::Success, Some(StateTag::Succeed)),
                    }
                }
                PhaseResult::Unknown => unreachable!("phases never report Unknown"),
            }
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

    fn handler(name: &str, phase: PhaseTag, outcome: HandlerOutcome) -> HandlerEntry {
        let f: PhaseHandlerFn = Arc::new(move |_ctx| outcome);
        HandlerEntry::phase(name, phase, Priority::Normal, f)
    }

    #[test]
    fn happy_path_runs_all_four_phases_and_reaches_succeed() {
        let handlers = vec![
            handler("v1", PhaseTag::Validate, HandlerOutcome::Success),
            handler("c1", PhaseTag::Configure, HandlerOutcome::Success),
            handler("e1", PhaseTag::Execute, HandlerOutcome::Success),
            handler("cl1", PhaseTag::Cleanup, HandlerOutcome::Success),
        ];
        let mut business = BusinessState::new(&handlers, 3);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = business.process(&mut event);
        assert_eq!(outcome.result, StateResult::Success);
        assert_eq!(outcome.next, Some(StateTag::Succeed));
    }

    #[test]
    fn validate_failure_ends_business_at_completed() {
        let handlers = vec![handler("v1", PhaseTag::Validate, HandlerOutcome::Failure)];
        let mut business = BusinessState::new(&handlers, 3);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = business.process(&mut event);
        assert_eq!(outcome.result, StateResult::Failure);
        assert_eq!(outcome.next, Some(StateTag::Completed));
    }

    #[test]
    fn configure_cancel_runs_cleanup_before_reporting_cancelled() {
        let handlers = vec![
            handler("v1", PhaseTag::Validate, HandlerOutcome::Success),
            handler("c1", PhaseTag::Configure, HandlerOutcome::Cancelled),
            handler("cl1", PhaseTag::Cleanup, HandlerOutcome::Success),
        ];
        let mut business = BusinessState::new(&handlers, 3);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = business.process(&mut event);
        assert_eq!(outcome.result, StateResult::Cancelled);
        assert_eq!(outcome.next, Some(StateTag::Cancelled));
    }

    #[test]
    fn execute_cancel_skips_cleanup_entirely() {
        let handlers = vec![
            handler("v1", PhaseTag::Validate, HandlerOutcome::Success),
            handler("c1", PhaseTag::Configure, HandlerOutcome::Success),
            handler("e1", PhaseTag::Execute, HandlerOutcome::Cancelled),
            handler("cl1", PhaseTag::Cleanup, HandlerOutcome::Success),
        ];
        let mut business = BusinessState::new(&handlers, 3);
        let mut event = Event::new("t", serde_json::json!({}));
        let outcome = business.process(&mut event);
        assert_eq!(outcome.result, StateResult::Cancelled);
        assert_eq!(outcome.next, Some(StateTag::Cancelled));
        let cleanup_entry = handlers
            .iter()
            .find(|h| h.name() == "cl1")
            .expect("cleanup handler present");
        assert_eq!(cleanup_entry.execution_count(), 0);
    }

    #[test]
    fn waiting_then_resume_drains_through_to_succeed() {
        let handlers = vec![
            handler("v1", PhaseTag::Validate, HandlerOutcome::Success),
            handler("c1", PhaseTag::Configure, HandlerOutcome::Waiting),
            handler("e1", PhaseTag::Execute, HandlerOutcome::Success),
            handler("cl1", PhaseTag::Cleanup, HandlerOutcome::Success),
        ];
        let mut business = BusinessState::new(&handlers, 3);
        let mut event = Event::new("t", serde_json::json!({}));
        let first = business.process(&mut event);
        assert_eq!(first.result, StateResult::Waiting);
        let resumed = business.resume(&mut event);
        assert_eq!(resumed.result, StateResult::Success);
        assert_eq!(resumed.next, Some(StateTag::Succeed));
    }
}
