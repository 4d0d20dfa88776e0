//! Rate-limit headers sent alongside `429 Too Many Requests`

use std::time::Duration;

use reqwest::header::HeaderMap;
use thiserror::Error;

pub const REMAINING_REQUESTS: &str = "x-ratelimit-remaining-requests";
pub const REMAINING_TOKENS: &str = "x-ratelimit-remaining-tokens";
pub const RESET_REQUESTS: &str = "x-ratelimit-reset-requests";
pub const RESET_TOKENS: &str = "x-ratelimit-reset-tokens";

/// Remaining quota and time until it resets.
///
/// All fields are empty when the reset headers were missing or unreadable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error(
    "openai rate limit exceeded, RemainingRequests: {remaining_requests}, RemainingTokens: {remaining_tokens}, ResetRequests: {}, ResetTokens: {}",
    format_duration(*.reset_requests),
    format_duration(*.reset_tokens)
)]
pub struct RateLimit {
    pub remaining_requests: String,
    pub remaining_tokens: String,
    pub reset_requests: Duration,
    pub reset_tokens: Duration,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
        };

        let (Some(reset_requests), Some(reset_tokens)) = (
            parse_duration(header(RESET_REQUESTS)),
            parse_duration(header(RESET_TOKENS)),
        ) else {
            tracing::warn!(
                reset_requests = header(RESET_REQUESTS),
                reset_tokens = header(RESET_TOKENS),
                "unreadable rate-limit reset headers"
            );
            return Self::default();
        };

        Self {
            remaining_requests: header(REMAINING_REQUESTS).to_owned(),
            remaining_tokens: header(REMAINING_TOKENS).to_owned(),
            reset_requests,
            reset_tokens,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse a Go-style duration such as `"1s"`, `"6m0s"`, `"20ms"` or
/// `"1.5h"`. Negative durations are rejected.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let s = input.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s == "0" {
        return Some(Duration::ZERO);
    }
    if s.is_empty() {
        return None;
    }

    let mut rest = s;
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            _ => return None,
        };
        total = total.checked_add(scaled(number, unit_nanos)?)?;
        rest = tail;
    }

    u64::try_from(total).ok().map(Duration::from_nanos)
}

/// Format a duration the way Go prints one: `"0s"`, `"20ms"`, `"1.5s"`,
/// `"6m0s"`, `"1h30m0s"`.
pub fn format_duration(d: Duration) -> String {
    const SECOND: u128 = 1_000_000_000;

    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_owned();
    }
    if nanos < SECOND {
        let (unit_nanos, unit) = match nanos {
            n if n < 1_000 => (1, "ns"),
            n if n < 1_000_000 => (1_000, "µs"),
            _ => (1_000_000, "ms"),
        };
        return format!("{}{unit}", decimal(nanos, unit_nanos));
    }

    let secs = d.as_secs();
    let (hours, minutes) = (secs / 3_600, secs % 3_600 / 60);
    let seconds = decimal(
        u128::from(secs % 60) * SECOND + u128::from(d.subsec_nanos()),
        SECOND,
    );
    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, m) => format!("{m}m{seconds}s"),
        (h, m) => format!("{h}h{m}m{seconds}s"),
    }
}

/// `value / unit` with trailing fractional zeros trimmed. `unit` is a power
/// of ten.
fn decimal(value: u128, unit: u128) -> String {
    let (whole, frac) = (value / unit, value % unit);
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// `number` (decimal, optional fraction) times `unit_nanos`.
fn scaled(number: &str, unit_nanos: u128) -> Option<u128> {
    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(unit_nanos)?;
    if !frac.is_empty() {
        let digits = u32::try_from(frac.len()).ok()?;
        let frac_value: u128 = frac.parse().ok()?;
        nanos = nanos.checked_add(frac_value.checked_mul(unit_nanos)? / 10u128.checked_pow(digits)?)?;
    }
    Some(nanos)
}
