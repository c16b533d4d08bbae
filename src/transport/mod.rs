//! HTTP transport collaborator boundary.
//!
//! The strategy never talks to the network directly; it goes through the
//! [`Transport`] trait, which merges a route template with call parameters
//! into a [`RequestDescriptor`] and dispatches it. [`HttpTransport`] is the
//! default reqwest-backed implementation.

mod http;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use serde_json::Value;

pub use http::HttpTransport;

use crate::Result;

/// Call parameters: a JSON object merged into the route template.
pub type Parameters = serde_json::Map<String, Value>;

/// An outbound request, mutated in place by the hook before dispatch and
/// consumed exactly once by [`Transport::send`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestDescriptor {
    /// Uppercase HTTP method.
    pub method: String,
    /// Target URL, possibly still carrying `:name` / `{name}` placeholders.
    pub url: String,
    /// Header mapping with lowercase names.
    pub headers: BTreeMap<String, String>,
    /// Parameters not yet consumed by placeholder substitution. Dispatched as
    /// the JSON body (or query string for bodyless methods).
    pub parameters: Parameters,
}

impl RequestDescriptor {
    /// The URL with any remaining placeholders resolved from `parameters`.
    pub fn resolved_url(&self) -> String {
        expand_placeholders(&self.url, &mut self.parameters.clone())
    }
}

/// A parsed response from the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub data: Value,
}

/// HTTP collaborator: pre-configured with a base URL and identifying headers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Configured base URL, without a trailing slash.
    fn base_url(&self) -> &str;

    /// Merge a route template (`"GET /user"`, `"/orgs/{org}/repos"`, or a
    /// full URL) with call parameters into a request descriptor.
    fn merge(&self, route: &str, parameters: Parameters) -> Result<RequestDescriptor> {
        merge_route(self.base_url(), route, parameters)
    }

    /// Perform the network call. Placeholders still present in the URL are
    /// resolved from the descriptor's parameters before dispatch.
    async fn send(&self, request: RequestDescriptor) -> Result<Response>;
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}|:(\w+)").expect("valid placeholder regex"));

/// Substitute `:name` and `{name}` URL placeholders from `parameters`,
/// removing each consumed parameter. Unmatched placeholders are left as-is.
pub(crate) fn expand_placeholders(url: &str, parameters: &mut Parameters) -> String {
    let mut consumed = Vec::new();
    let expanded = PLACEHOLDER.replace_all(url, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        match parameters.get(name) {
            Some(value) => {
                consumed.push(name.to_string());
                value_as_string(value)
            }
            None => caps[0].to_string(),
        }
    });
    for name in consumed {
        parameters.remove(&name);
    }
    expanded.into_owned()
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Merge a route template with call parameters against a base URL.
pub(crate) fn merge_route(
    base_url: &str,
    route: &str,
    mut parameters: Parameters,
) -> Result<RequestDescriptor> {
    let (method, target) = match route.split_once(' ') {
        Some((method, target))
            if !method.is_empty() && method.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            (method.to_string(), target.trim().to_string())
        }
        _ => ("GET".to_string(), route.trim().to_string()),
    };

    if target.is_empty() {
        return Err(crate::Error::config(format!("empty route: {route:?}")));
    }

    let target = expand_placeholders(&target, &mut parameters);
    let url = if target.starts_with("http://") || target.starts_with("https://") {
        target
    } else if target.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), target)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), target)
    };

    Ok(RequestDescriptor {
        method,
        url,
        headers: BTreeMap::new(),
        parameters,
    })
}
