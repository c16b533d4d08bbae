//! OAuth user-flow collaborators: web-flow code exchange and device-flow
//! polling against the derived token endpoints.

mod device;
mod web;

use serde::Deserialize;
use serde_json::Value;

pub use device::exchange_device_flow;
pub use web::{exchange_web_flow_code, exchange_web_flow_code_with};

use crate::{Error, Result};

/// Token-endpoint reply: either a token grant or an OAuth error body.
/// GitHub returns both with HTTP 200, so this is decided by body shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ExchangeReply {
    Failure {
        error: String,
        error_description: Option<String>,
    },
    Success {
        access_token: String,
        #[serde(default)]
        scope: String,
    },
}

impl ExchangeReply {
    pub(crate) fn parse(data: Value) -> Result<Self> {
        serde_json::from_value(data).map_err(Error::Json)
    }
}
