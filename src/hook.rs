//! Request interceptor: injects authentication into an outbound request
//! before the transport dispatches it.

use std::sync::Arc;

use serde_json::Value;

use crate::basic_auth::{basic_auth_header, requires_basic_auth};
use crate::state::State;
use crate::token::get_oauth_access_token;
use crate::transport::{Parameters, RequestDescriptor, Response, Transport};
use crate::types::ClientType;
use crate::{Error, Result};

/// Wrap an outbound request: classify the target endpoint, inject the
/// appropriate `authorization` header, dispatch, and clarify 401 rejections.
///
/// Requests to the token-issuing endpoints themselves pass through
/// unmodified, so the token request never tries to authenticate itself.
pub async fn hook(
    state: &State,
    transport: &Arc<dyn Transport>,
    route: &str,
    parameters: Parameters,
) -> Result<Response> {
    let endpoint = transport.merge(route, parameters)?;

    if is_token_request(&endpoint.url) {
        return transport.send(endpoint).await;
    }

    if state.is_legacy() {
        return legacy_dispatch(state, transport, endpoint).await;
    }

    if !requires_basic_auth(&endpoint.url) && state.client_type == ClientType::GithubApp {
        // GitHub Apps may only use client credentials against the
        // privileged /applications/{client_id}/** surface. OAuth Apps route
        // every call through Basic auth instead.
        return Err(Error::UnsupportedEndpoint {
            method: endpoint.method.clone(),
            path: url_path(&endpoint.url),
        });
    }

    let mut endpoint = endpoint;
    endpoint.headers.insert(
        "authorization".to_string(),
        basic_auth_header(&state.client_id, &state.client_secret),
    );
    dispatch_basic(transport, endpoint).await
}

/// Legacy model: bearer-token injection for plain endpoints, Basic auth plus
/// template-parameter defaulting for the privileged families, and the
/// token-reset self-update afterwards.
async fn legacy_dispatch(
    state: &State,
    transport: &Arc<dyn Transport>,
    mut endpoint: RequestDescriptor,
) -> Result<Response> {
    let token = get_oauth_access_token(state, Some(transport)).await?;

    if !requires_basic_auth(&endpoint.url) {
        endpoint.headers.insert(
            "authorization".to_string(),
            format!("token {}", token.token),
        );
        return transport.send(endpoint).await;
    }

    endpoint.headers.insert(
        "authorization".to_string(),
        basic_auth_header(&state.client_id, &state.client_secret),
    );

    // Callers may omit :client_id / :access_token on the privileged routes.
    if endpoint.url.contains(":client_id") || endpoint.url.contains("{client_id}") {
        endpoint
            .parameters
            .entry("client_id".to_string())
            .or_insert_with(|| Value::String(state.client_id.clone()));
    }
    if endpoint.url.contains(":access_token") || endpoint.url.contains("{access_token}") {
        endpoint
            .parameters
            .entry("access_token".to_string())
            .or_insert_with(|| Value::String(token.token.clone()));
    }

    let resolved_url = endpoint.resolved_url();
    let is_token_reset = endpoint.method == "POST" && resolved_url.contains(&token.token);

    let response = dispatch_basic(transport, endpoint).await?;

    // POST /applications/:client_id/tokens/:access_token rotates the passed
    // token server-side; keep the cache in sync with the replacement.
    if is_token_reset
        && let Some(new_token) = response.data.get("token").and_then(Value::as_str)
    {
        let mut cached = state.cached_token.lock().await;
        if let Some(cached) = cached.as_mut() {
            cached.token = new_token.to_string();
            tracing::debug!("updated cached token after reset request");
        }
    }

    Ok(response)
}

/// Whether the URL targets a token-issuing endpoint (the web-flow token URL
/// or the device-flow code URL), on any host. Matching on the path suffix
/// covers routes written relative to an API base as well as the derived
/// absolute URLs.
fn is_token_request(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or(url);
    path.ends_with("/login/oauth/access_token") || path.ends_with("/login/device/code")
}

/// Path component of a URL, falling back to the input when it is already a
/// bare path.
fn url_path(url: &str) -> String {
    url::Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Dispatch a Basic-authenticated request, rewriting a 401 into the
/// clarified diagnostic with the status preserved.
async fn dispatch_basic(
    transport: &Arc<dyn Transport>,
    endpoint: RequestDescriptor,
) -> Result<Response> {
    let method = endpoint.method.clone();
    let url = endpoint.resolved_url();

    match transport.send(endpoint).await {
        Err(Error::Api { status: 401, .. }) => Err(Error::BasicAuthRejected {
            method,
            url,
            status: 401,
        }),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_endpoints_are_recognized_on_any_host() {
        assert!(is_token_request(
            "https://github.com/login/oauth/access_token"
        ));
        assert!(is_token_request(
            "https://github.acme-inc.com/login/device/code"
        ));
        assert!(is_token_request(
            "https://api.github.com/login/oauth/access_token"
        ));
        assert!(is_token_request(
            "https://github.com/login/device/code?foo=bar"
        ));
    }

    #[test]
    fn test_other_endpoints_are_not_token_requests() {
        assert!(!is_token_request("https://api.github.com/user"));
        assert!(!is_token_request(
            "https://api.github.com/login/oauth/access_token/extra"
        ));
    }

    #[test]
    fn test_url_path_strips_host_and_keeps_bare_paths() {
        assert_eq!(url_path("https://api.github.com/user"), "/user");
        assert_eq!(
            url_path("https://github.acme-inc.com/api/v3/orgs/octo/repos"),
            "/api/v3/orgs/octo/repos"
        );
        assert_eq!(url_path("/user"), "/user");
    }
}
