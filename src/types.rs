//! Data model: strategy options, per-call auth options, and authentication
//! descriptors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Distinguishes a plain OAuth App from a GitHub App, which has stricter
/// Basic-auth usage rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientType {
    #[default]
    #[serde(rename = "oauth-app")]
    OAuthApp,
    #[serde(rename = "github-app")]
    GithubApp,
}

/// Configuration for an [`OAuthAppStrategy`](crate::OAuthAppStrategy).
///
/// Setting `code` activates the legacy single-token model: the strategy
/// resolves the web-flow token at most once and memoizes it for its lifetime.
#[derive(Clone, Debug, Default)]
pub struct StrategyOptions {
    pub client_id: String,
    pub client_secret: String,
    pub client_type: ClientType,
    /// One-time authorization code from the OAuth web flow (legacy model).
    pub code: Option<String>,
    pub redirect_url: Option<String>,
    pub state: Option<String>,
}

impl StrategyOptions {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Default::default()
        }
    }

    pub fn with_client_type(mut self, client_type: ClientType) -> Self {
        self.client_type = client_type;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = Some(redirect_url.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

/// A resolved token with its granted scopes, in grant order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenWithScopes {
    pub token: String,
    pub scopes: Vec<String>,
}

/// Device-flow verification data, handed to the caller's `on_verification`
/// callback exactly once before polling begins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    pub interval: u64,
}

/// Callback invoked with the device-flow verification data.
pub type VerificationCallback = Arc<dyn Fn(Verification) + Send + Sync>;

/// Options for the app-credential variant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AppAuthOptions {
    /// Target endpoint, used in the legacy model to pick between the
    /// Basic-auth header and `client_id`/`client_secret` query parameters.
    #[serde(default)]
    pub url: Option<String>,
}

/// Options for the user/token flow variant.
///
/// A `code` selects the web flow, an `on_verification` callback selects the
/// device flow. Without either, a legacy strategy falls back to the code it
/// was constructed with.
#[derive(Clone, Default, Deserialize)]
pub struct UserAuthOptions {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Scopes requested for the device flow, space-joined on the wire.
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    #[serde(skip)]
    pub on_verification: Option<VerificationCallback>,
    /// Set when the deprecated `"token"` discriminator spelled this variant.
    #[serde(skip)]
    pub(crate) deprecated_spelling: bool,
}

impl UserAuthOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = Some(redirect_url.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn on_verification<F>(mut self, callback: F) -> Self
    where
        F: Fn(Verification) + Send + Sync + 'static,
    {
        self.on_verification = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for UserAuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAuthOptions")
            .field("code", &self.code)
            .field("redirect_url", &self.redirect_url)
            .field("state", &self.state)
            .field("scopes", &self.scopes)
            .field("on_verification", &self.on_verification.is_some())
            .finish()
    }
}

/// Per-call authentication options, discriminated by the `type` field.
///
/// The deprecated `"token"` spelling deserializes to the user variant and
/// triggers a one-time warning through the strategy's diagnostic sink.
#[derive(Clone, Debug)]
pub enum AuthOptions {
    App(AppAuthOptions),
    User(UserAuthOptions),
}

impl AuthOptions {
    /// Authenticate as the OAuth App itself.
    pub fn app() -> Self {
        AuthOptions::App(AppAuthOptions::default())
    }

    /// Authenticate as the OAuth App for a specific endpoint (legacy model:
    /// picks header vs. query-parameter encoding by endpoint classification).
    pub fn app_for_url(url: impl Into<String>) -> Self {
        AuthOptions::App(AppAuthOptions {
            url: Some(url.into()),
        })
    }

    /// Authenticate on behalf of a user (web or device flow).
    pub fn user(options: UserAuthOptions) -> Self {
        AuthOptions::User(options)
    }

    /// The deprecated `"token"` spelling of [`AuthOptions::user`]. Still
    /// works, but emits a one-time deprecation warning.
    pub fn deprecated_user(mut options: UserAuthOptions) -> Self {
        options.deprecated_spelling = true;
        AuthOptions::User(options)
    }
}

impl<'de> Deserialize<'de> for AuthOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("oauth-app")
            .to_string();

        match kind.as_str() {
            "oauth-app" => {
                let options = AppAuthOptions::deserialize(value).map_err(DeError::custom)?;
                Ok(AuthOptions::App(options))
            }
            "oauth-user" => {
                let options = UserAuthOptions::deserialize(value).map_err(DeError::custom)?;
                Ok(AuthOptions::User(options))
            }
            "token" => {
                let mut options = UserAuthOptions::deserialize(value).map_err(DeError::custom)?;
                options.deprecated_spelling = true;
                Ok(AuthOptions::User(options))
            }
            other => Err(DeError::custom(format!(
                "unknown auth options type: {other:?}"
            ))),
        }
    }
}

/// Merged credential/flow record handed to the caller's factory in
/// [`authenticate_with`](crate::authenticate_with).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FactoryOptions {
    pub client_id: String,
    pub client_secret: String,
    pub client_type: ClientType,
    pub code: Option<String>,
    pub redirect_url: Option<String>,
    pub state: Option<String>,
    pub scopes: Option<Vec<String>>,
}

/// Authentication descriptor: exactly one variant per call, fully determined
/// by the options' `type` discriminator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Authentication {
    #[serde(rename = "oauth-app", rename_all = "camelCase")]
    App {
        client_id: String,
        client_secret: String,
        client_type: ClientType,
        /// Carries `authorization: basic <base64(id:secret)>` when the target
        /// endpoint takes Basic auth.
        headers: BTreeMap<String, String>,
        /// Carries `client_id`/`client_secret` in the legacy model when the
        /// target endpoint does not take Basic auth.
        query: BTreeMap<String, String>,
    },
    #[serde(rename = "token", rename_all = "camelCase")]
    Token {
        client_id: String,
        client_secret: String,
        client_type: ClientType,
        token: String,
        token_type: TokenType,
        scopes: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "oauth")]
    OAuth,
}

impl Authentication {
    pub fn token(&self) -> Option<&str> {
        match self {
            Authentication::Token { token, .. } => Some(token),
            Authentication::App { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_type_serde() {
        assert_eq!(
            serde_json::to_value(ClientType::OAuthApp).unwrap(),
            json!("oauth-app")
        );
        assert_eq!(
            serde_json::to_value(ClientType::GithubApp).unwrap(),
            json!("github-app")
        );
        let parsed: ClientType = serde_json::from_value(json!("github-app")).unwrap();
        assert_eq!(parsed, ClientType::GithubApp);
    }

    #[test]
    fn test_auth_options_app() {
        let options: AuthOptions = serde_json::from_value(json!({
            "type": "oauth-app",
            "url": "/orgs/:org/repos"
        }))
        .unwrap();
        match options {
            AuthOptions::App(app) => assert_eq!(app.url.as_deref(), Some("/orgs/:org/repos")),
            other => panic!("expected app options, got {other:?}"),
        }
    }

    #[test]
    fn test_auth_options_user() {
        let options: AuthOptions = serde_json::from_value(json!({
            "type": "oauth-user",
            "code": "random123",
            "state": "mystate123"
        }))
        .unwrap();
        match options {
            AuthOptions::User(user) => {
                assert_eq!(user.code.as_deref(), Some("random123"));
                assert!(!user.deprecated_spelling);
            }
            other => panic!("expected user options, got {other:?}"),
        }
    }

    #[test]
    fn test_auth_options_deprecated_token_spelling() {
        let options: AuthOptions =
            serde_json::from_value(json!({ "type": "token", "code": "random123" })).unwrap();
        match options {
            AuthOptions::User(user) => assert!(user.deprecated_spelling),
            other => panic!("expected user options, got {other:?}"),
        }
    }

    #[test]
    fn test_auth_options_unknown_extra_fields_ignored() {
        let options: AuthOptions = serde_json::from_value(json!({
            "type": "oauth-user",
            "code": "random123",
            "something_else": true
        }))
        .unwrap();
        assert!(matches!(options, AuthOptions::User(_)));
    }

    #[test]
    fn test_auth_options_unknown_type_rejected() {
        let result: std::result::Result<AuthOptions, _> =
            serde_json::from_value(json!({ "type": "installation" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_token_authentication_serializes_camel_case() {
        let auth = Authentication::Token {
            client_id: "123".to_string(),
            client_secret: "secret".to_string(),
            client_type: ClientType::OAuthApp,
            token: "secret123".to_string(),
            token_type: TokenType::OAuth,
            scopes: vec![],
        };
        let value = serde_json::to_value(&auth).unwrap();
        assert_eq!(value["type"], "token");
        assert_eq!(value["tokenType"], "oauth");
        assert_eq!(value["clientId"], "123");
        assert_eq!(value["scopes"], json!([]));
    }
}
