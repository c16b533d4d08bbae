//! Basic-auth applicability predicate and header synthesis.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;

/// Endpoints that authenticate with the client ID/secret as Basic auth
/// instead of a bearer token or query parameters:
///
/// - `POST   /applications/{client_id}/token`  - check a token
/// - `PATCH  /applications/{client_id}/token`  - reset a token
/// - `DELETE /applications/{client_id}/token`  - delete a token
/// - `DELETE /applications/{client_id}/grant`  - delete an authorization
///
/// plus the legacy plural families:
///
/// - `GET/POST/DELETE /applications/{client_id}/tokens/{access_token}`
/// - `DELETE          /applications/{client_id}/grants/{access_token}`
///
/// IDs may be literal or unresolved `:name` / `{name}` template placeholders;
/// the match terminates at end-of-string or at a query-string boundary.
static BASIC_AUTH_ROUTES: LazyLock<Regex> = LazyLock::new(|| {
    // GitHub App client IDs contain dots (e.g. "Iv1.8a61f9b3a7aba766").
    Regex::new(r"/applications/(:?[\w.]+|\{\w+\})/(token|grant)(s/(:?[\w.]+|\{\w+\}))?($|\?)")
        .expect("valid basic-auth route regex")
});

/// Whether the given URL (or path) must carry application Basic auth.
pub fn requires_basic_auth(url: &str) -> bool {
    BASIC_AUTH_ROUTES.is_match(url)
}

/// `basic <base64(client_id:client_secret)>` header value.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "basic {}",
        BASE64.encode(format!("{client_id}:{client_secret}"))
    )
}
