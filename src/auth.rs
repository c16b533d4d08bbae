//! Authentication-mode resolution.

use std::collections::BTreeMap;

use crate::basic_auth::{basic_auth_header, requires_basic_auth};
use crate::oauth;
use crate::state::State;
use crate::token::get_oauth_access_token;
use crate::types::{
    AuthOptions, Authentication, FactoryOptions, TokenType, TokenWithScopes, UserAuthOptions,
};
use crate::{Error, Result};

/// Resolve an authentication descriptor for one call.
///
/// The variant is fully determined by the options' `type` discriminator:
/// app-credential options synthesize Basic-auth (or query-parameter)
/// credentials locally, user-flow options delegate to the OAuth exchange.
/// Failures from the exchange propagate verbatim; there is no fallback from
/// one auth mode to another.
pub async fn authenticate(state: &State, options: AuthOptions) -> Result<Authentication> {
    match options {
        AuthOptions::App(app) => Ok(app_authentication(state, app.url.as_deref())),
        AuthOptions::User(user) => {
            if user.deprecated_spelling {
                state.warn_deprecated_spelling();
            }
            let resolved = resolve_user_token(state, &user).await?;
            Ok(Authentication::Token {
                client_id: state.client_id.clone(),
                client_secret: state.client_secret.clone(),
                client_type: state.client_type,
                token: resolved.token,
                token_type: TokenType::OAuth,
                scopes: resolved.scopes,
            })
        }
    }
}

/// Factory escape hatch: compute the merged credential/flow record and hand
/// it to the caller's factory instead of resolving a token. The returned
/// value is the factory's, untouched.
pub fn authenticate_with<T, F>(state: &State, options: UserAuthOptions, factory: F) -> Result<T>
where
    F: FnOnce(FactoryOptions) -> T,
{
    if options.deprecated_spelling {
        state.warn_deprecated_spelling();
    }
    let merged = FactoryOptions {
        client_id: state.client_id.clone(),
        client_secret: state.client_secret.clone(),
        client_type: state.client_type,
        code: options.code.or_else(|| state.code.clone()),
        redirect_url: options.redirect_url.or_else(|| state.redirect_url.clone()),
        state: options.state.or_else(|| state.state.clone()),
        scopes: options.scopes,
    };
    Ok(factory(merged))
}

fn app_authentication(state: &State, url: Option<&str>) -> Authentication {
    let mut headers = BTreeMap::new();
    let mut query = BTreeMap::new();

    // Legacy dual encoding: with a target URL the endpoint classification
    // picks exactly one of the two encodings at call time.
    match url {
        Some(url) if !requires_basic_auth(url) => {
            query.insert("client_id".to_string(), state.client_id.clone());
            query.insert("client_secret".to_string(), state.client_secret.clone());
        }
        _ => {
            headers.insert(
                "authorization".to_string(),
                basic_auth_header(&state.client_id, &state.client_secret),
            );
        }
    }

    Authentication::App {
        client_id: state.client_id.clone(),
        client_secret: state.client_secret.clone(),
        client_type: state.client_type,
        headers,
        query,
    }
}

async fn resolve_user_token(state: &State, options: &UserAuthOptions) -> Result<TokenWithScopes> {
    if options.on_verification.is_some() {
        return oauth::exchange_device_flow(state, options).await;
    }
    if options.code.is_some() {
        return oauth::exchange_web_flow_code(state, options).await;
    }
    if state.is_legacy() {
        // Legacy model: one memoized exchange per strategy instance.
        return get_oauth_access_token(state, None).await;
    }
    Err(Error::config(
        "user authentication requires a web flow code or an on_verification callback",
    ))
}

/// Split a comma-separated scope string into an ordered scopes list.
///
/// Splits on `,` with optional following whitespace and drops empty
/// segments; `""` yields `[]`.
pub fn split_scopes(scope: &str) -> Vec<String> {
    scope
        .split(',')
        .map(str::trim_start)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::TracingSink;
    use crate::transport::HttpTransport;
    use crate::types::{ClientType, StrategyOptions};
    use std::sync::Arc;

    fn test_state(options: StrategyOptions) -> State {
        let transport = Arc::new(HttpTransport::new("https://api.github.com").unwrap());
        State::from_options(options, transport, Arc::new(TracingSink))
    }

    #[test]
    fn test_split_scopes_empty() {
        assert_eq!(split_scopes(""), Vec::<String>::new());
    }

    #[test]
    fn test_split_scopes_preserves_order() {
        assert_eq!(
            split_scopes("repo, gist,user,  notifications"),
            vec!["repo", "gist", "user", "notifications"]
        );
    }

    #[test]
    fn test_split_scopes_drops_empty_segments() {
        assert_eq!(split_scopes("repo,,gist,"), vec!["repo", "gist"]);
    }

    #[test]
    fn test_split_scopes_is_idempotent_on_clean_input() {
        let once = split_scopes("repo,gist");
        assert_eq!(split_scopes(&once.join(",")), once);
    }

    #[tokio::test]
    async fn test_app_authentication_basic_header() {
        let state = test_state(StrategyOptions::new("123", "secret"));
        let auth = authenticate(&state, AuthOptions::app()).await.unwrap();
        match auth {
            Authentication::App { headers, query, .. } => {
                assert_eq!(
                    headers.get("authorization").map(String::as_str),
                    Some("basic MTIzOnNlY3JldA==")
                );
                assert!(query.is_empty());
            }
            other => panic!("expected app authentication, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_app_authentication_query_encoding_for_plain_endpoints() {
        let state = test_state(StrategyOptions::new("123", "secret").with_code("random123"));
        let auth = authenticate(&state, AuthOptions::app_for_url("/orgs/:org/repos"))
            .await
            .unwrap();
        match auth {
            Authentication::App { headers, query, .. } => {
                assert!(headers.is_empty());
                assert_eq!(query.get("client_id").map(String::as_str), Some("123"));
                assert_eq!(
                    query.get("client_secret").map(String::as_str),
                    Some("secret")
                );
            }
            other => panic!("expected app authentication, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_app_authentication_header_encoding_for_privileged_endpoints() {
        let state = test_state(StrategyOptions::new("123", "secret").with_code("random123"));
        let auth = authenticate(
            &state,
            AuthOptions::app_for_url("/applications/:client_id/tokens/secret123"),
        )
        .await
        .unwrap();
        match auth {
            Authentication::App { headers, query, .. } => {
                assert_eq!(
                    headers.get("authorization").map(String::as_str),
                    Some("basic MTIzOnNlY3JldA==")
                );
                assert!(query.is_empty());
            }
            other => panic!("expected app authentication, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_user_flow_without_code_or_callback_fails() {
        let state = test_state(StrategyOptions::new("123", "secret"));
        let result = authenticate(&state, AuthOptions::user(UserAuthOptions::new())).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_factory_receives_merged_options() {
        let state = test_state(
            StrategyOptions::new("123", "secret")
                .with_client_type(ClientType::GithubApp)
                .with_code("random123")
                .with_state("mystate123"),
        );
        let options = UserAuthOptions::new().with_redirect_url("https://example.com/login");

        let merged = authenticate_with(&state, options, |merged| merged).unwrap();
        assert_eq!(merged.client_id, "123");
        assert_eq!(merged.client_type, ClientType::GithubApp);
        assert_eq!(merged.code.as_deref(), Some("random123"));
        assert_eq!(merged.state.as_deref(), Some("mystate123"));
        assert_eq!(
            merged.redirect_url.as_deref(),
            Some("https://example.com/login")
        );
    }

    #[test]
    fn test_factory_return_type_is_callers() {
        let state = test_state(StrategyOptions::new("123", "secret"));
        let value: usize =
            authenticate_with(&state, UserAuthOptions::new().with_code("c"), |_| 42).unwrap();
        assert_eq!(value, 42);
    }
}
