//! Default reqwest-backed transport.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::{RequestDescriptor, Response, Transport, expand_placeholders};
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const DEFAULT_ACCEPT: &str = "application/vnd.github.v3+json";

/// Reqwest-backed [`Transport`] with a configured base URL and identifying
/// `user-agent` header.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)
            .map_err(|e| Error::config(format!("invalid base URL {base_url:?}: {e}")))?;

        let client = reqwest::Client::builder().build().map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: format!("oauth-app-auth/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Default transport against the public GitHub API.
    pub fn github() -> Result<Self> {
        Self::new(DEFAULT_BASE_URL)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, mut request: RequestDescriptor) -> Result<Response> {
        let url = expand_placeholders(&request.url, &mut request.parameters);
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::config(format!("invalid HTTP method {:?}", request.method)))?;
        let has_body = method != Method::GET && method != Method::HEAD;

        let mut builder = self.client.request(method, url.as_str());
        if !request.headers.contains_key("user-agent") {
            builder = builder.header("user-agent", &self.user_agent);
        }
        if !request.headers.contains_key("accept") {
            builder = builder.header("accept", DEFAULT_ACCEPT);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if !request.parameters.is_empty() {
            if has_body {
                builder = builder.json(&request.parameters);
            } else {
                let query: Vec<(String, String)> = request
                    .parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), super::value_as_string(v)))
                    .collect();
                builder = builder.query(&query);
            }
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect::<BTreeMap<_, _>>();

        let text = response.text().await?;
        let data: Value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status >= 400 {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| match &data {
                    Value::String(s) => s.clone(),
                    Value::Null => "empty response body".to_string(),
                    other => other.to_string(),
                });
            return Err(Error::Api { status, message });
        }

        Ok(Response {
            status,
            headers,
            data,
        })
    }
}
