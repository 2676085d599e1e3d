//! Time related utils.

use crate::{Error, Result};
use chrono::Utc;
use std::fmt::Debug;

/// The timestamp type used across the client, always normalized to UTC.
pub type DateTime = chrono::DateTime<Utc>;

/// Return the current UTC time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Date format: "20220313"
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// ISO 8601 basic format with seconds precision: "20220313T072004Z"
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse an RFC 3339 timestamp like "2022-03-13T07:20:04Z" into [`DateTime`].
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::unexpected(format!("invalid rfc3339 timestamp `{s}`")).with_source(e))
}

/// Clock is the source of the signing instant.
///
/// Signing must happen against the actual moment of use, but callers that
/// need determinism (tests, replay verification) can inject their own
/// implementation instead of relying on an ambient "now".
pub trait Clock: Debug + Send + Sync + 'static {
    /// Return the current UTC time.
    fn now(&self) -> DateTime;
}

/// Clock implementation backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        now()
    }
}
