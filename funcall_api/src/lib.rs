#![deny(unsafe_code)]

//! The error boundary of an OpenAI-style function-calling API.
//!
//! A failed response body `{"error":{"message","type","param","code"}}`
//! becomes an [`ApiError`]. On `429 Too Many Requests` the
//! `X-Ratelimit-*` headers are parsed into a [`RateLimit`] and returned
//! together with it as [`ClientError::RateLimited`].

pub mod error;
pub mod rate_limit;

pub use error::{ApiError, ApiErrorType, ClientError};
pub use rate_limit::{RateLimit, format_duration, parse_duration};
