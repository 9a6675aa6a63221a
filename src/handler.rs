//! `HandlerEntry`: the immutable (apart from its execution counter)
//! descriptor of a registered callback, and the dispatch primitive that
//! invokes it (spec.md §3.1, §4.1).

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::event::Event;
use crate::outcome::HandlerOutcome;
use crate::phase::PhaseTag;
use crate::priority::Priority;

/// Terminal state a `State`-kind handler targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTarget {
    Succeed,
    Cancelled,
    Completed,
}

/// What kind of node a handler is registered against, and which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Phase(PhaseTag),
    State(StateTarget),
}

/// A pure, side-effect-free gate on whether a handler runs at all.
///
/// A predicate that returns `false` SKIPS the handler and counts as
/// [`HandlerOutcome::Success`] for phase-outcome purposes (spec.md §4.1) —
/// absent or non-matching handlers never cause a phase to fail.
pub type PredicateFn = Arc<dyn Fn(&Event, &HandlerEntry) -> bool + Send + Sync>;

/// `(context) -> HandlerOutcome` callable for a phase-targeted handler.
pub type PhaseHandlerFn = Arc<dyn Fn(&mut crate::context::HandlerContext<'_>) -> HandlerOutcome + Send + Sync>;

/// `(event) -> ()` callable for a state-targeted handler.
pub type StateHandlerFn = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Callable {
    Phase(PhaseHandlerFn),
    State(StateHandlerFn),
}

/// Immutable descriptor of a registered callback.
///
/// Cloning a `HandlerEntry` is cheap (everything heap-shared via `Arc`) and
/// shares the same `execution_count` — entries are snapshotted by reference
/// into each phase/state's handler stack, not duplicated.
#[derive(Clone)]
pub struct HandlerEntry {
    pub(crate) name: Arc<str>,
    pub(crate) kind: HandlerKind,
    pub(crate) priority: Priority,
    pub(crate) predicate: Option<PredicateFn>,
    pub(crate) callable: Callable,
    pub(crate) execution_count: Arc<AtomicU32>,
}

impl HandlerEntry {
    /// Registers a handler against a business phase.
    pub fn phase(
        name: impl Into<Arc<str>>,
        target: PhaseTag,
        priority: Priority,
        callable: PhaseHandlerFn,
    ) -> Self {
        Self {
            name: name.into(),
            kind: HandlerKind::Phase(target),
            priority,
            predicate: None,
            callable: Callable::Phase(callable),
            execution_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Registers a handler against a terminal state.
    pub fn state(
        name: impl Into<Arc<str>>,
        target: StateTarget,
        priority: Priority,
        callable: StateHandlerFn,
    ) -> Self {
        Self {
            name: name.into(),
            kind: HandlerKind::State(target),
            priority,
            predicate: None,
            callable: Callable::State(callable),
            execution_count: Arc::new(AtomicU32::new(0)),
        }
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: PredicateFn) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// How many times the callable has actually been invoked (predicate
    /// skips do not count, per spec.md §4.1 step 1).
    pub fn execution_count(&self) -> u32 {
        self.execution_count.load(Ordering::SeqCst)
    }

    /// Returns `true` if the predicate exists and rejects this invocation.
    pub(crate) fn is_skipped(&self, event: &Event) -> bool {
        match &self.predicate {
            Some(pred) => !pred(event, self),
            None => false,
        }
    }

    pub(crate) fn record_invocation(&self) -> u32 {
        self.execution_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Invokes a state-kind handler; panics are caught at the call site in
    /// `state::run_state_handlers`, not here, so the caller can attribute
    /// the failure to a specific entry.
    pub(crate) fn call_state(&self, event: &Event) {
        match &self.callable {
            Callable::State(f) => f(event),
            Callable::Phase(_) => unreachable!("state handler stack only holds State callables"),
        }
    }

    pub(crate) fn call_phase(&self, ctx: &mut crate::context::HandlerContext<'_>) -> HandlerOutcome {
        match &self.callable {
            Callable::Phase(f) => f(ctx),
            Callable::State(_) => unreachable!("phase handler stack only holds Phase callables"),
        }
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("has_predicate", &self.predicate.is_some())
            .field("execution_count", &self.execution_count())
            .finish()
    }
}

/// Sorts a snapshot of entries by priority using a stable sort, so ties
/// preserve registration order (spec.md §3.2 invariant 1).
pub(crate) fn sorted_snapshot(entries: impl IntoIterator<Item = HandlerEntry>) -> Vec<HandlerEntry> {
    let mut snapshot: Vec<HandlerEntry> = entries.into_iter().collect();
    snapshot.sort_by_key(|h| h.priority);
    snapshot
}
