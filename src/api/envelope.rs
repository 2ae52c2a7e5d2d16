use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::error::ApiError;
use super::transport::ApiResponse;

/// The `{success, data, message}` wrapper used by every endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "assumed_success")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

fn assumed_success() -> bool {
    true
}

impl Envelope<Value> {
    /// Reads an envelope from a body. Bodies that are not envelopes are
    /// treated as bare data.
    pub fn from_body(body: &Value) -> Envelope<Value> {
        let is_envelope = body
            .as_object()
            .map(|object| object.contains_key("success") || object.contains_key("data"))
            .unwrap_or(false);
        if is_envelope {
            if let Ok(envelope) = serde_json::from_value::<Envelope<Value>>(body.clone()) {
                return envelope;
            }
        }
        Envelope {
            success: true,
            data: Some(body.clone()),
            message: None,
        }
    }
}

/// Turns a raw response into `T`, mapping non-2xx statuses and
/// `success: false` envelopes to [`ApiError::Rejected`].
pub fn decode_response<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(ApiError::from_response(&response));
    }
    let envelope = Envelope::from_body(&response.body);
    if !envelope.success {
        return Err(ApiError::Rejected {
            status: response.status,
            message: envelope.message,
            body: response.body,
        });
    }
    let data = envelope.data.unwrap_or(Value::Null);
    serde_json::from_value(data).map_err(|err| ApiError::Decode(err.to_string()))
}
