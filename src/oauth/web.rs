//! Web-flow code exchange.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::ExchangeReply;
use crate::auth::split_scopes;
use crate::endpoint::oauth_token_url;
use crate::state::State;
use crate::transport::{Parameters, RequestDescriptor, Transport};
use crate::types::{TokenWithScopes, UserAuthOptions};
use crate::{Error, Result};

/// Exchange a one-time web-flow code for a token via the state's transport.
pub async fn exchange_web_flow_code(
    state: &State,
    options: &UserAuthOptions,
) -> Result<TokenWithScopes> {
    exchange_web_flow_code_with(&state.transport, state, options).await
}

/// Exchange a one-time web-flow code for a token via a caller-supplied
/// transport (the hook passes its own).
pub async fn exchange_web_flow_code_with(
    transport: &Arc<dyn Transport>,
    state: &State,
    options: &UserAuthOptions,
) -> Result<TokenWithScopes> {
    let code = options
        .code
        .as_deref()
        .or(state.code.as_deref())
        .ok_or_else(|| Error::config("web flow requires an authorization code"))?;

    let mut parameters = Parameters::new();
    parameters.insert("client_id".into(), Value::String(state.client_id.clone()));
    parameters.insert(
        "client_secret".into(),
        Value::String(state.client_secret.clone()),
    );
    parameters.insert("code".into(), Value::String(code.to_string()));
    if let Some(redirect_uri) = options.redirect_url.as_deref().or(state.redirect_url.as_deref()) {
        parameters.insert("redirect_uri".into(), Value::String(redirect_uri.into()));
    }
    if let Some(flow_state) = options.state.as_deref().or(state.state.as_deref()) {
        parameters.insert("state".into(), Value::String(flow_state.into()));
    }

    let request = RequestDescriptor {
        method: "POST".to_string(),
        url: oauth_token_url(transport.base_url()),
        headers: BTreeMap::from([("accept".to_string(), "application/json".to_string())]),
        parameters,
    };

    tracing::debug!(url = %request.url, "exchanging web flow code");
    let response = transport.send(request).await?;

    match ExchangeReply::parse(response.data)? {
        ExchangeReply::Success {
            access_token,
            scope,
        } => Ok(TokenWithScopes {
            token: access_token,
            scopes: split_scopes(&scope),
        }),
        ExchangeReply::Failure {
            error,
            error_description,
        } => Err(Error::provider(error, error_description)),
    }
}
