//! Logging capability handed to the client and the orchestrator
//!
//! Callers pass an `Arc<dyn LogSink>` at construction time. The default
//! implementation forwards to `tracing`.

use std::fmt;
use std::sync::Arc;

/// Five-level log interface
///
/// Use with `format_args!`:
/// ```
/// # use fibery_client::{LogSink, TracingLog};
/// let log = TracingLog::new("example");
/// log.info(format_args!("connected to {}", "https://example.fibery.io"));
/// ```
pub trait LogSink: Send + Sync {
    /// Diagnostic detail
    fn debug(&self, args: fmt::Arguments<'_>);

    /// Progress
    fn info(&self, args: fmt::Arguments<'_>);

    /// Recoverable oddity
    fn warning(&self, args: fmt::Arguments<'_>);

    /// Failure
    fn error(&self, args: fmt::Arguments<'_>);

    /// Completed step
    fn success(&self, args: fmt::Arguments<'_>);
}

/// `LogSink` backed by `tracing` events
#[derive(Debug, Clone)]
pub struct TracingLog {
    scope: Arc<str>,
}

impl TracingLog {
    /// Create a sink whose events carry `scope`
    pub fn new(scope: impl Into<Arc<str>>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    /// Scope attached to every event
    #[inline]
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Shareable handle
    #[must_use]
    pub fn shared(scope: impl Into<Arc<str>>) -> Arc<dyn LogSink> {
        Arc::new(Self::new(scope))
    }
}

impl LogSink for TracingLog {
    fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(scope = %self.scope, "{}", args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(scope = %self.scope, "{}", args);
    }

    fn warning(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(scope = %self.scope, "{}", args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(scope = %self.scope, "{}", args);
    }

    // tracing has no success level
    fn success(&self, args: fmt::Arguments<'_>) {
        tracing::info!(scope = %self.scope, outcome = "success", "{}", args);
    }
}
