//! Duration strings for command-line flags.
//!
//! Accepted forms are `<number><unit>` with unit `ms`, `s`, `m` or `h`
//! (case insensitive, surrounding whitespace ignored). A bare number is
//! read as milliseconds.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

/// Reasons a duration string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    /// Nothing to parse
    #[error("duration string cannot be empty")]
    Empty,

    /// Input does not match `<number><unit>`
    #[error("invalid duration format '{0}', expected <number>[ms|s|m|h] (e.g. '500ms', '5s', '10m')")]
    Format(String),

    /// Number does not fit
    #[error("duration '{0}' is out of range")]
    Overflow(String),
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^(?P<number>\d+)(?P<unit>ms|s|m|h)?$").expect("duration pattern is valid")
    })
}

/// Parse a duration flag value.
///
/// # Errors
///
/// Returns [`DurationParseError`] when the input is empty, malformed or
/// too large.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vaultenv_common::parse_duration;
///
/// assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
/// assert_eq!(parse_duration("250").unwrap(), Duration::from_millis(250));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let lower = trimmed.to_lowercase();
    let captures = duration_regex()
        .captures(&lower)
        .ok_or_else(|| DurationParseError::Format(trimmed.to_string()))?;

    let number: u64 = captures["number"]
        .parse()
        .map_err(|_| DurationParseError::Overflow(trimmed.to_string()))?;

    let multiplier_ms = match captures.name("unit").map(|m| m.as_str()) {
        None | Some("ms") => 1,
        Some("s") => 1_000,
        Some("m") => 60_000,
        Some("h") => 3_600_000,
        Some(_) => return Err(DurationParseError::Format(trimmed.to_string())),
    };

    number
        .checked_mul(multiplier_ms)
        .map(Duration::from_millis)
        .ok_or_else(|| DurationParseError::Overflow(trimmed.to_string()))
}
