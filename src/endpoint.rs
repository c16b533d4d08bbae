//! Token-endpoint URL derivation.
//!
//! The OAuth token and device-code endpoints are not part of the REST API
//! surface: on github.com they live on the web host, and on GitHub Enterprise
//! they live next to the `/api/v3` prefix rather than under it.

use std::sync::LazyLock;

use regex::Regex;

static GITHUB_BASE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https://(api\.)?github\.com$").expect("valid base URL regex"));

/// Web-flow token endpoint for the given API base URL.
///
/// `https://api.github.com` and `https://github.com` map to the public web
/// host; enterprise base URLs have their `/api/v3` suffix replaced.
pub fn oauth_token_url(base_url: &str) -> String {
    web_url(base_url, "/login/oauth/access_token")
}

/// Device-flow code endpoint, derived with the same rule.
pub fn device_code_url(base_url: &str) -> String {
    web_url(base_url, "/login/device/code")
}

fn web_url(base_url: &str, path: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    if GITHUB_BASE_URL.is_match(base_url) {
        return format!("https://github.com{path}");
    }
    match base_url.strip_suffix("/api/v3") {
        Some(host) => format!("{host}{path}"),
        None => format!("{base_url}{path}"),
    }
}
