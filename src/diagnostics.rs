//! Diagnostic sink for deprecation warnings.

/// Receives deprecation warnings emitted by the strategy.
///
/// Injectable so tests can assert on emitted warnings without capturing
/// process-wide output.
pub trait DeprecationSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Default sink routing warnings through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DeprecationSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "oauth_app_auth", "{message}");
    }
}
