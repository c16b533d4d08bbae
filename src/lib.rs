//! # oauth-app-auth
//!
//! GitHub OAuth App authentication strategy for HTTP API clients.
//!
//! Given long-lived application credentials (client ID and secret) and optional
//! per-call user-authorization options, this crate produces an authentication
//! descriptor for outbound requests and can transparently inject authentication
//! into a request pipeline via a hook.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oauth_app_auth::{AuthOptions, OAuthAppStrategy, StrategyOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), oauth_app_auth::Error> {
//!     let auth = OAuthAppStrategy::new(StrategyOptions::new("1234567890abcdef1234", "secret"))?;
//!
//!     // Authenticate as the OAuth App itself (Basic auth)
//!     let app = auth.authenticate(AuthOptions::app()).await?;
//!     println!("{:?}", app);
//!     Ok(())
//! }
//! ```
//!
//! ## Web Flow
//!
//! ```rust,no_run
//! use oauth_app_auth::{AuthOptions, OAuthAppStrategy, StrategyOptions, UserAuthOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), oauth_app_auth::Error> {
//!     let auth = OAuthAppStrategy::new(StrategyOptions::new("1234567890abcdef1234", "secret"))?;
//!
//!     // Exchange a one-time code from the OAuth web flow for a token
//!     let user = auth
//!         .authenticate(AuthOptions::user(
//!             UserAuthOptions::new().with_code("random123"),
//!         ))
//!         .await?;
//!     println!("{:?}", user);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod basic_auth;
pub mod diagnostics;
pub mod endpoint;
pub mod hook;
pub mod oauth;
pub mod state;
pub mod strategy;
pub mod token;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use auth::{authenticate, authenticate_with, split_scopes};
pub use basic_auth::{basic_auth_header, requires_basic_auth};
pub use diagnostics::{DeprecationSink, TracingSink};
pub use endpoint::{device_code_url, oauth_token_url};
pub use hook::hook;
pub use state::State;
pub use strategy::OAuthAppStrategy;
pub use token::get_oauth_access_token;
pub use transport::{HttpTransport, Parameters, RequestDescriptor, Response, Transport};
pub use types::{
    AppAuthOptions, AuthOptions, Authentication, ClientType, FactoryOptions, StrategyOptions,
    TokenType, TokenWithScopes, UserAuthOptions, Verification, VerificationCallback,
};

/// Error type for oauth-app-auth operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Identity provider rejected the request with an OAuth error body.
    ///
    /// The display message is the provider's `error` code, verbatim
    /// (e.g. `incorrect_client_credentials`).
    #[error("{error}")]
    Provider {
        error: String,
        description: Option<String>,
    },

    /// Basic auth attempted against an endpoint the client type forbids.
    /// Raised before any network call.
    #[error("\"{method} {path}\" is not supported by GitHub App client credentials")]
    UnsupportedEndpoint { method: String, path: String },

    /// A Basic-authenticated dispatch came back with HTTP 401.
    #[error("\"{method} {url}\" does not support clientId/clientSecret basic authentication.")]
    BasicAuthRejected {
        method: String,
        url: String,
        status: u16,
    },

    /// API returned a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn provider(error: impl Into<String>, description: Option<String>) -> Self {
        Error::Provider {
            error: error.into(),
            description,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// HTTP status associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::BasicAuthRejected { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401)) || matches!(self, Error::Provider { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
