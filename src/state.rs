//! Strategy state: the immutable credential/transport bundle shared by the
//! authenticator and the request hook.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::diagnostics::DeprecationSink;
use crate::transport::Transport;
use crate::types::{ClientType, StrategyOptions, TokenWithScopes};

/// Shared state for one strategy instance.
///
/// Everything here is read-only after construction except `cached_token`, the
/// single unit of shared mutable data. The mutex guards cache reads and
/// writes only, never the token exchange itself: two concurrent first calls
/// may both exchange and the last write wins, matching the intended
/// single-token-per-process usage pattern.
pub struct State {
    pub client_id: String,
    pub client_secret: String,
    pub client_type: ClientType,
    /// One-time web-flow authorization code. Presence activates the legacy
    /// single-token model.
    pub code: Option<String>,
    pub redirect_url: Option<String>,
    pub state: Option<String>,
    pub transport: Arc<dyn Transport>,
    pub sink: Arc<dyn DeprecationSink>,
    pub cached_token: Mutex<Option<TokenWithScopes>>,
    deprecation_warned: AtomicBool,
}

impl State {
    pub fn from_options(
        options: StrategyOptions,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn DeprecationSink>,
    ) -> Self {
        Self {
            client_id: options.client_id,
            client_secret: options.client_secret,
            client_type: options.client_type,
            code: options.code,
            redirect_url: options.redirect_url,
            state: options.state,
            transport,
            sink,
            cached_token: Mutex::new(None),
            deprecation_warned: AtomicBool::new(false),
        }
    }

    /// Whether this strategy runs the legacy single-token model.
    pub fn is_legacy(&self) -> bool {
        self.code.is_some()
    }

    /// Emit the deprecated-spelling warning at most once per instance.
    pub(crate) fn warn_deprecated_spelling(&self) {
        if !self.deprecation_warned.swap(true, Ordering::SeqCst) {
            self.sink.warn(
                "auth options `type: \"token\"` is deprecated, use `type: \"oauth-user\"` instead",
            );
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("client_type", &self.client_type)
            .field("code", &self.code.as_ref().map(|_| "<redacted>"))
            .field("redirect_url", &self.redirect_url)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
