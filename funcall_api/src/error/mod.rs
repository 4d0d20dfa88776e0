//! Decoding failed API responses into typed errors

use std::fmt;

use reqwest::{StatusCode, header::HeaderMap};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::rate_limit::RateLimit;

/// The `error.type` field of an API error body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ApiErrorType {
    InsufficientQuota,
    InvalidRequest,
    /// Any type this crate does not name.
    Other(String),
    /// `type` was missing or empty.
    #[default]
    Unknown,
}

impl ApiErrorType {
    pub fn as_str(&self) -> &str {
        match self {
            ApiErrorType::InsufficientQuota => "insufficient_quota",
            ApiErrorType::InvalidRequest => "invalid_request_error",
            ApiErrorType::Other(other) => other.as_str(),
            ApiErrorType::Unknown => "",
        }
    }
}

impl From<String> for ApiErrorType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "insufficient_quota" => ApiErrorType::InsufficientQuota,
            "invalid_request_error" => ApiErrorType::InvalidRequest,
            "" => ApiErrorType::Unknown,
            _ => ApiErrorType::Other(value),
        }
    }
}

impl fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{"error": {..}}` body of a failed request, plus the HTTP status.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Error)]
#[error(
    "openai API error: {kind}: {message} (param: {}, code: {})",
    field(.param),
    field(.code)
)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: ApiErrorType,
    #[serde(default)]
    pub param: Value,
    #[serde(default)]
    pub code: Value,

    /// Status line, e.g. `429 Too Many Requests`.
    #[serde(skip)]
    pub status: String,
    #[serde(skip)]
    pub status_code: u16,
}

fn field(value: &Value) -> String {
    match value {
        Value::Null => "none".to_owned(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// Everything a failed API request can turn into.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A 429 response: the API error joined with the quota headers.
    #[error("{error}\n{rate_limit}")]
    RateLimited {
        #[source]
        error: ApiError,
        rate_limit: RateLimit,
    },

    #[error("failed to decode error body: {0}")]
    Body(#[source] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Build the error for a non-success response from its parts.
    pub fn parse(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut error = match serde_json::from_slice::<ErrorEnvelope>(body) {
            Ok(envelope) => envelope.error,
            Err(err) => return ClientError::Body(err),
        };
        error.status = status.to_string();
        error.status_code = status.as_u16();
        tracing::debug!(status = error.status_code, kind = %error.kind, "API error response");

        if status == StatusCode::TOO_MANY_REQUESTS {
            let rate_limit = RateLimit::from_headers(headers);
            return ClientError::RateLimited { error, rate_limit };
        }
        ClientError::Api(error)
    }

    /// Read the body of a failed response and parse it.
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status();
        let headers = res.headers().clone();
        match res.bytes().await {
            Ok(body) => Self::parse(status, &headers, &body),
            Err(err) => ClientError::Transport(err),
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(error) | ClientError::RateLimited { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn rate_limit(&self) -> Option<&RateLimit> {
        match self {
            ClientError::RateLimited { rate_limit, .. } => Some(rate_limit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::{RESET_REQUESTS, RESET_TOKENS};
    use reqwest::header::HeaderValue;
    use serde_json::json;
    use std::time::Duration;

    const BODY: &[u8] = br#"{
        "error": {
            "message": "Rate limit reached for requests",
            "type": "requests",
            "param": null,
            "code": "rate_limit_exceeded"
        }
    }"#;

    #[test]
    fn test_plain_api_error() {
        let body = br#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","param":null,"code":null}}"#;
        let err = ClientError::parse(StatusCode::BAD_REQUEST, &HeaderMap::new(), body);

        let api = err.api_error().unwrap();
        assert_eq!(api.kind, ApiErrorType::InsufficientQuota);
        assert_eq!(api.status, "400 Bad Request");
        assert_eq!(api.status_code, 400);
        assert!(err.rate_limit().is_none());
        assert_eq!(
            err.to_string(),
            "openai API error: insufficient_quota: You exceeded your current quota (param: none, code: none)"
        );
    }

    #[test]
    fn test_rate_limited_joins_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(RESET_REQUESTS, HeaderValue::from_static("20ms"));
        headers.insert(RESET_TOKENS, HeaderValue::from_static("1m30s"));
        let err = ClientError::parse(StatusCode::TOO_MANY_REQUESTS, &headers, BODY);

        let api = err.api_error().unwrap();
        assert_eq!(api.kind, ApiErrorType::Other("requests".into()));
        assert_eq!(api.code, json!("rate_limit_exceeded"));

        let rl = err.rate_limit().unwrap();
        assert_eq!(rl.reset_requests, Duration::from_millis(20));
        assert_eq!(rl.reset_tokens, Duration::from_secs(90));

        let text = err.to_string();
        assert!(text.starts_with("openai API error: requests: Rate limit reached"));
        assert!(text.contains("\nopenai rate limit exceeded"));
    }

    #[test]
    fn test_rate_limited_without_headers_keeps_error() {
        let err = ClientError::parse(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new(), BODY);
        assert!(err.rate_limit().unwrap().is_empty());
        assert_eq!(err.api_error().unwrap().status_code, 429);
    }

    #[test]
    fn test_undecodable_body() {
        let err = ClientError::parse(StatusCode::BAD_GATEWAY, &HeaderMap::new(), b"<html>");
        assert!(matches!(err, ClientError::Body(_)));
        assert!(err.api_error().is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let err = ClientError::parse(StatusCode::NOT_FOUND, &HeaderMap::new(), br#"{"error":{}}"#);
        let api = err.api_error().unwrap();
        assert_eq!(api.kind, ApiErrorType::Unknown);
        assert!(api.message.is_empty());
    }
}
