//! Legacy cached-token resolution.

use std::sync::Arc;

use crate::oauth::exchange_web_flow_code_with;
use crate::state::State;
use crate::transport::Transport;
use crate::types::{TokenWithScopes, UserAuthOptions};
use crate::{Error, Result};

/// Resolve the legacy single token, exchanging the configured web-flow code
/// at most once per state instance and memoizing the result.
///
/// Sequential callers after the first get the cached token without a network
/// call. Concurrent first callers may race: both exchange and the last cache
/// write wins (see [`State`]).
pub async fn get_oauth_access_token(
    state: &State,
    transport: Option<&Arc<dyn Transport>>,
) -> Result<TokenWithScopes> {
    {
        let cached = state.cached_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
    }

    if state.code.is_none() {
        return Err(Error::config(
            "no web flow code configured for this strategy",
        ));
    }

    let transport = transport.unwrap_or(&state.transport);
    let options = UserAuthOptions {
        redirect_url: state.redirect_url.clone(),
        state: state.state.clone(),
        ..Default::default()
    };
    let token = exchange_web_flow_code_with(transport, state, &options).await?;

    let mut cached = state.cached_token.lock().await;
    *cached = Some(token.clone());
    Ok(token)
}
