//! JSON-over-HTTP plumbing shared by the adapters.

use agent_core::error::{AgentError, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ProviderConfig;

/// Longest slice of an error body kept in a provider error
const MAX_ERROR_BODY: usize = 512;

/// Build a client with the configured timeout and the given extra headers
pub fn build_client(config: &ProviderConfig, mut headers: HeaderMap) -> Result<reqwest::Client> {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.timeout())
        .build()
        .map_err(|e| AgentError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Header value that is never printed by `Debug`
pub fn secret_header(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| AgentError::Config("API key contains invalid header characters".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// POST `body` and decode the JSON reply.
///
/// Single attempt. Timeouts map to [`AgentError::Timeout`], everything else
/// (transport, non-2xx, undecodable body) to [`AgentError::Provider`].
pub async fn post_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    body: &Value,
    timeout_ms: u64,
) -> Result<T> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| transport_error(&e, timeout_ms))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(&e, timeout_ms))?;

    if !status.is_success() {
        tracing::error!(status = status.as_u16(), body = %truncate(&text), "Provider returned an error status");
        return Err(AgentError::Provider {
            status: Some(status.as_u16()),
            detail: truncate(&text).to_string(),
        });
    }

    serde_json::from_str(&text).map_err(|e| AgentError::Provider {
        status: Some(status.as_u16()),
        detail: format!("malformed response body: {e}"),
    })
}

fn transport_error(err: &reqwest::Error, timeout_ms: u64) -> AgentError {
    if err.is_timeout() {
        AgentError::Timeout(timeout_ms)
    } else {
        AgentError::Provider {
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        }
    }
}

fn truncate(text: &str) -> &str {
    if text.len() <= MAX_ERROR_BODY {
        return text;
    }
    let mut end = MAX_ERROR_BODY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
