//! The "external logging collaborator" named in spec.md §6 — a small
//! `LogSink` trait, and a default `TracingSink` forwarding to `tracing`
//! macros so the crate is usable standalone without forcing embedders to
//! wire up their own sink.

use tracing::Level;

/// A single log record in the `(timestamp, level, source, message,
/// properties)` shape spec.md §6 describes. `timestamp` is left to the
/// sink implementation (this crate does not take a `Clock` dependency).
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    pub level: Level,
    pub source: &'a str,
    pub message: &'a str,
}

pub trait LogSink: Send + Sync {
    fn record(&self, record: LogRecord<'_>);
}

/// Forwards every record to `tracing`, tagging the originating component as
/// a structured field rather than folding it into the message string.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, record: LogRecord<'_>) {
        match record.level {
            Level::ERROR => tracing::error!(source = record.source, "{}", record.message),
            Level::WARN => tracing::warn!(source = record.source, "{}", record.message),
            Level::INFO => tracing::info!(source = record.source, "{}", record.message),
            Level::DEBUG => tracing::debug!(source = record.source, "{}", record.message),
            Level::TRACE => tracing::trace!(source = record.source, "{}", record.message),
        }
    }
}

static DEFAULT_SINK: TracingSink = TracingSink;

/// The sink the dispatch primitive, phase transitions, and state-handler
/// panic logging all route through, so an embedder supplying its own
/// `LogSink` actually observes the engine's instrumentation.
pub fn default_sink() -> &'static dyn LogSink {
    &DEFAULT_SINK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_sink_does_not_panic_on_any_level() {
        let sink = TracingSink;
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            sink.record(LogRecord {
                level,
                source: "test",
                message: "hello",
            });
        }
    }
}
