//! A deterministic, cooperative state machine that routes an event through
//! an ordered sequence of lifecycle states (Business, Succeed, Cancelled,
//! Completed) and, within Business, a fixed sequence of phases (Validate,
//! Configure, Execute, Cleanup). Handlers registered against an event's type
//! run in strict priority order within their phase/state and return
//! structured outcomes that govern transitions.
//!
//! The engine is single-threaded and cooperative (no internal thread pool,
//! no preemption): suspension is explicit, via a [`HandlerOutcome::Waiting`]
//! outcome from Configure or Execute, resumed by an external
//! [`ProcessContext::resume`]/[`ProcessContext::fail`] call.
//!
//! ```
//! use eventflow_core::{Event, HandlerEntry, HandlerOutcome, EventProcessResult, Priority};
//! use eventflow_core::phase::PhaseTag;
//! use std::sync::Arc;
//!
//! let validate = HandlerEntry::phase(
//!     "not-empty",
//!     PhaseTag::Validate,
//!     Priority::Normal,
//!     Arc::new(|ctx| {
//!         if ctx.event().data().is_null() {
//!             HandlerOutcome::Failure
//!         } else {
//!             HandlerOutcome::Success
//!         }
//!     }),
//! );
//!
//! let event = Event::new("order.created", serde_json::json!({"id": 1}));
//! let mut ctx = event.dispatch(vec![validate]);
//! let result = ctx.process_event().unwrap();
//! assert_eq!(result, EventProcessResult::Success);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod handler;
pub mod observability;
pub mod outcome;
pub mod phase;
pub mod priority;
pub mod registry;
pub mod state;

pub use config::EngineConfig;
pub use context::{HandlerContext, ProcessContext};
pub use error::{EngineError, EngineResult};
pub use event::{Event, EventBuilder};
pub use handler::{HandlerEntry, HandlerKind, PhaseHandlerFn, PredicateFn, StateHandlerFn, StateTarget};
pub use outcome::{EventProcessResult, HandlerOutcome, PhaseResult, StateResult};
pub use priority::Priority;
pub use registry::{HandlerRegistry, StaticRegistry};
