//! Slack Web API client.
//!
//! One [`SlackClient`] is built per process from the configured token and
//! passed explicitly to everything that talks to Slack. Every failed call is
//! reduced to an [`ApiError`] so the retry policy can decide what to do.

pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Error, Result};
use crate::model::{Page, ReactedItem};

/// Used when Slack rate limits us without saying for how long.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Error codes that mean "try again shortly".
const TRANSIENT_CODES: &[&str] = &[
    "internal_error",
    "fatal_error",
    "service_unavailable",
    "request_timeout",
];

/// The one remote operation the collector depends on.
#[async_trait]
pub trait ReactionsApi: Send + Sync {
    /// Fetch up to `count` items `user_id` reacted to, continuing from
    /// `cursor`. `None` starts from the beginning.
    async fn list_reactions(
        &self,
        user_id: &str,
        count: u32,
        cursor: Option<&str>,
    ) -> std::result::Result<Page, ApiError>;
}

/// Client for the subset of the Slack Web API we use.
pub struct SlackClient {
    http: reqwest::Client,
    token: SecretString,
    base_url: String,
}

impl SlackClient {
    pub fn new(token: SecretString, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("reactji/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Call a Web API method and decode its successful body.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<T, ApiError> {
        let url = format!("{}/{method}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.map_err(transport_error)?;

        decode_response(status, retry_after.as_deref(), &body)
    }
}

#[async_trait]
impl ReactionsApi for SlackClient {
    async fn list_reactions(
        &self,
        user_id: &str,
        count: u32,
        cursor: Option<&str>,
    ) -> std::result::Result<Page, ApiError> {
        let mut query = vec![
            ("user", user_id.to_string()),
            ("limit", count.to_string()),
            // Without `full` Slack may truncate the reactor list, which
            // would hide who reacted first.
            ("full", "true".to_string()),
        ];
        // Slack treats a present cursor as meaningful, so it is only sent
        // when continuing.
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let body: ReactionsListBody = self.call("reactions.list", &query).await?;
        Ok(Page::new(body.items, body.response_metadata.next_cursor))
    }
}

#[derive(Debug, Deserialize)]
struct ReactionsListBody {
    #[serde(default)]
    items: Vec<ReactedItem>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Turn a raw HTTP response into either a decoded body or a classified error.
pub fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    retry_after: Option<&str>,
    body: &str,
) -> std::result::Result<T, ApiError> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            return Err(classify_error(
                status,
                retry_after,
                &format!("unreadable response ({e})"),
            ));
        }
    };

    let envelope: Envelope = serde_json::from_value(value.clone())
        .map_err(|e| ApiError::Fatal(format!("unexpected response shape: {e}")))?;

    if !envelope.ok || !status.is_success() {
        let code = envelope
            .error
            .unwrap_or_else(|| format!("http_{}", status.as_u16()));
        return Err(classify_error(status, retry_after, &code));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::Fatal(format!("unexpected response shape: {e}")))
}

/// Classify a failed call by HTTP status and Slack error code.
pub fn classify_error(status: StatusCode, retry_after: Option<&str>, code: &str) -> ApiError {
    if status == StatusCode::TOO_MANY_REQUESTS || code == "ratelimited" || code == "rate_limited"
    {
        let retry_after = retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RETRY_AFTER);
        return ApiError::RateLimited { retry_after };
    }
    if status.is_server_error() || TRANSIENT_CODES.contains(&code) {
        return ApiError::Transient(code.to_string());
    }
    ApiError::Fatal(code.to_string())
}

/// Connection trouble is transient: refused, timed out, dropped while the
/// request was in flight, or cut off mid-body. reqwest reports the last as a
/// body or decode error; bodies are only read as text, so a decode error
/// here is always the transport. Anything else, such as a bad URL, is fatal.
fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode() {
        ApiError::Transient(e.to_string())
    } else {
        ApiError::Fatal(e.to_string())
    }
}
