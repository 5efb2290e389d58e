//! HTTP date formatting
//!
//! Formats timestamps in the RFC 1123 form used by the `Date` header,
//! e.g. `Sun, 06 Nov 1994 08:49:37 GMT`. Times before the Unix epoch are
//! clamped to it.

use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// `strftime` pattern of an RFC 1123 date
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an HTTP date
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time.max(UNIX_EPOCH))
        .format(HTTP_DATE_FORMAT)
        .to_string()
}

/// Format the current time as an HTTP date
pub fn now() -> String {
    Utc::now().format(HTTP_DATE_FORMAT).to_string()
}
