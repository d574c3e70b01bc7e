use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::config::FetchConfig;
use crate::error::AppError;

use super::FetchResult;

/// Envelope status signalling success.
pub const RET_OK: i64 = 200;
/// Envelope status signalling that a requested code is unknown upstream.
pub const RET_INVALID_CODE: i64 = 600;

/// Immutable description of one outbound call.
#[derive(Debug, Clone)]
pub enum CallRequest {
    Get {
        endpoint: &'static str,
        /// JSON query payload, passed through verbatim. The transport is the
        /// single place it gets percent-encoded; pre-encoding it here would
        /// double-encode and the remote rejects that.
        query: String,
    },
    Post {
        endpoint: &'static str,
        body: Value,
    },
}

impl CallRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            CallRequest::Get { endpoint, .. } | CallRequest::Post { endpoint, .. } => *endpoint,
        }
    }
}

/// Every response comes wrapped in this envelope; `ret == 200` is the only
/// success signal, independent of the HTTP status.
#[derive(Debug, Deserialize)]
struct Envelope {
    ret: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Value,
}

/// HTTP transport for the quote service.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
    token: String,
}

impl Transport {
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Executes one call and returns the envelope payload on success.
    pub async fn execute(&self, request: CallRequest) -> FetchResult<Value> {
        let endpoint = request.endpoint();
        debug!("request: {endpoint}");
        let url = format!("{}{}", self.base_url, endpoint);

        let response = match request {
            CallRequest::Get { query, .. } => {
                self.client
                    .get(&url)
                    .query(&[("token", self.token.as_str()), ("query", query.as_str())])
                    .send()
                    .await?
            }
            CallRequest::Post { body, .. } => {
                self.client
                    .post(&url)
                    .query(&[("token", self.token.as_str())])
                    .json(&body)
                    .send()
                    .await?
            }
        };

        let status = response.status();
        let body = response.text().await?;
        match decode_envelope(status, &body) {
            Ok(payload) => {
                debug!("request succeeded: {endpoint}");
                Ok(payload)
            }
            Err(err) => {
                error!("request failed [{endpoint}]: {err}");
                Err(err)
            }
        }
    }
}

/// Maps a raw response onto the envelope contract. A decodable envelope wins
/// over the HTTP status so remote codes stay visible even on HTTP errors.
fn decode_envelope(status: StatusCode, body: &str) -> FetchResult<Value> {
    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) if envelope.ret == RET_OK => Ok(envelope.data),
        Ok(envelope) => {
            let message = if envelope.msg.is_empty() {
                format!("HTTP {status}")
            } else {
                envelope.msg
            };
            let raw = serde_json::from_str(body).unwrap_or(Value::Null);
            Err(AppError::remote(envelope.ret, message, raw))
        }
        Err(err) if status.is_success() => Err(err.into()),
        Err(_) => Err(AppError::message(format!(
            "request failed with HTTP {status}"
        ))),
    }
}
