//! Engine error taxonomy (spec.md §7).
//!
//! Mirrors the shape of `tasker_shared::errors::OrchestrationError` /
//! `OrchestrationResult`: one `thiserror` enum, one result alias, variants
//! that name *why* rather than wrapping an opaque message.

use crate::phase::PhaseTag;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("process_event called on an event that is not marked in-dispatch")]
    NotInDispatch,

    #[error("resume/fail called while no phase in this context is waiting")]
    ResumeWithoutWaiting,

    #[error("handler '{handler}' returned an outcome the engine does not recognize; treated as failure")]
    InvalidOutcome { handler: String },

    #[error("handler '{handler}' panicked during {phase:?}: {reason}")]
    HandlerThrew {
        handler: String,
        phase: PhaseTag,
        reason: String,
    },

    #[error("handler registry unavailable")]
    RegistryUnavailable,

    #[error("no handlers registered for event type '{0}'")]
    TypeNotFound(String),

    #[error("state transition failed: {0}")]
    StateTransitionFailed(String),

    #[error("configuration error")]
    Config(#[from] config::ConfigError),
}

pub type EngineResult<T> = Result<T, EngineError>;
