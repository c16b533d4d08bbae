//! Public entry point: wires state, transport, and diagnostics together.

use std::fmt;
use std::sync::Arc;

use crate::auth;
use crate::diagnostics::{DeprecationSink, TracingSink};
use crate::hook;
use crate::state::State;
use crate::token;
use crate::transport::{HttpTransport, Parameters, Response, Transport};
use crate::types::{
    AuthOptions, Authentication, FactoryOptions, StrategyOptions, TokenWithScopes, UserAuthOptions,
};
use crate::Result;

/// OAuth App authentication strategy.
///
/// Cheap to clone; clones share the same state, including the legacy token
/// cache.
#[derive(Clone)]
pub struct OAuthAppStrategy {
    state: Arc<State>,
}

impl OAuthAppStrategy {
    /// Create a strategy against the public GitHub API with the default
    /// transport and diagnostic sink.
    pub fn new(options: StrategyOptions) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::github()?);
        Ok(Self::with_components(options, transport, Arc::new(TracingSink)))
    }

    /// Create a strategy over a caller-supplied transport (custom base URL,
    /// GitHub Enterprise, or a test double).
    pub fn with_transport(options: StrategyOptions, transport: Arc<dyn Transport>) -> Self {
        Self::with_components(options, transport, Arc::new(TracingSink))
    }

    /// Create a strategy with every collaborator supplied.
    pub fn with_components(
        options: StrategyOptions,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn DeprecationSink>,
    ) -> Self {
        Self {
            state: Arc::new(State::from_options(options, transport, sink)),
        }
    }

    /// Resolve an authentication descriptor for one call.
    pub async fn authenticate(&self, options: AuthOptions) -> Result<Authentication> {
        auth::authenticate(&self.state, options).await
    }

    /// Factory escape hatch: hand the merged credential/flow record to the
    /// caller's constructor instead of resolving a token.
    pub fn authenticate_with<T, F>(&self, options: UserAuthOptions, factory: F) -> Result<T>
    where
        F: FnOnce(FactoryOptions) -> T,
    {
        auth::authenticate_with(&self.state, options, factory)
    }

    /// Legacy model: the memoized single-token resolution.
    pub async fn get_oauth_access_token(&self) -> Result<TokenWithScopes> {
        token::get_oauth_access_token(&self.state, None).await
    }

    /// Dispatch a request through the interceptor using the strategy's own
    /// transport.
    pub async fn hook(&self, route: &str, parameters: Parameters) -> Result<Response> {
        hook::hook(&self.state, &self.state.transport, route, parameters).await
    }

    /// Dispatch a request through the interceptor using a caller-supplied
    /// transport, as a request-pipeline hook would.
    pub async fn hook_with(
        &self,
        transport: &Arc<dyn Transport>,
        route: &str,
        parameters: Parameters,
    ) -> Result<Response> {
        hook::hook(&self.state, transport, route, parameters).await
    }

    /// The shared strategy state.
    pub fn state(&self) -> &State {
        &self.state
    }
}

impl fmt::Debug for OAuthAppStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthAppStrategy")
            .field("state", &self.state)
            .finish()
    }
}
