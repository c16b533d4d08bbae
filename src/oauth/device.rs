//! Device-flow code request and token polling.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use super::ExchangeReply;
use crate::auth::split_scopes;
use crate::endpoint::{device_code_url, oauth_token_url};
use crate::state::State;
use crate::transport::{Parameters, RequestDescriptor};
use crate::types::{TokenWithScopes, UserAuthOptions, Verification};
use crate::{Error, Result};

const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Run the device flow: request a device code, hand the verification data to
/// the caller's callback, then poll the token endpoint until the user
/// completes out-of-band verification.
///
/// `authorization_pending` continues polling, `slow_down` widens the interval
/// by five seconds, any other provider error terminates the flow.
pub async fn exchange_device_flow(
    state: &State,
    options: &UserAuthOptions,
) -> Result<TokenWithScopes> {
    let on_verification = options
        .on_verification
        .as_ref()
        .ok_or_else(|| Error::config("device flow requires an on_verification callback"))?;

    let mut parameters = Parameters::new();
    parameters.insert("client_id".into(), Value::String(state.client_id.clone()));
    if let Some(scopes) = &options.scopes {
        parameters.insert("scope".into(), Value::String(scopes.join(" ")));
    }

    let request = RequestDescriptor {
        method: "POST".to_string(),
        url: device_code_url(state.transport.base_url()),
        headers: json_accept_headers(),
        parameters,
    };

    tracing::debug!(url = %request.url, "requesting device code");
    let response = state.transport.send(request).await?;
    if let Some(error) = response.data.get("error").and_then(Value::as_str) {
        let description = response
            .data
            .get("error_description")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(Error::provider(error, description));
    }
    let verification: Verification = serde_json::from_value(response.data)?;

    // The caller displays user_code/verification_uri before polling begins.
    on_verification(verification.clone());

    let mut interval = verification.interval.max(1);
    loop {
        tokio::time::sleep(Duration::from_secs(interval)).await;

        let mut parameters = Parameters::new();
        parameters.insert("client_id".into(), Value::String(state.client_id.clone()));
        parameters.insert(
            "device_code".into(),
            Value::String(verification.device_code.clone()),
        );
        parameters.insert(
            "grant_type".into(),
            Value::String(DEVICE_GRANT_TYPE.to_string()),
        );

        let request = RequestDescriptor {
            method: "POST".to_string(),
            url: oauth_token_url(state.transport.base_url()),
            headers: json_accept_headers(),
            parameters,
        };

        let response = state.transport.send(request).await?;
        match ExchangeReply::parse(response.data)? {
            ExchangeReply::Success {
                access_token,
                scope,
            } => {
                return Ok(TokenWithScopes {
                    token: access_token,
                    scopes: split_scopes(&scope),
                });
            }
            ExchangeReply::Failure { error, .. } if error == "authorization_pending" => {}
            ExchangeReply::Failure { error, .. } if error == "slow_down" => {
                interval += 5;
                tracing::debug!(interval, "device flow slow_down, widening poll interval");
            }
            ExchangeReply::Failure {
                error,
                error_description,
            } => return Err(Error::provider(error, error_description)),
        }
    }
}

fn json_accept_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("accept".to_string(), "application/json".to_string())])
}
