//! HTTP message parsing
//!
//! This module reads header blocks and validates their first line.
//!
//! A header block is a run of lines ended by a line consisting only of
//! CRLF. Only the first line is interpreted; the others are consumed to
//! reach the terminator, which is the sole length delimiter of the block.

use super::session::{HttpSession, SessionOps};
use super::{Error, Method, RequestLine, Result, Status, StatusLine, HTTP_VERSION, MAX_LINE_LEN};

/// Check whether a raw line is the blank line ending a header block
pub fn is_terminator(line: &[u8]) -> bool {
    line == b"\r\n"
}

/// Strip the line ending from a raw line
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Split a first line into its space-separated tokens
///
/// Runs of spaces count as one separator.
fn tokens(line: &str) -> Vec<&str> {
    line.split(' ').filter(|t| !t.is_empty()).collect()
}

/// A consumed header block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    first_line: String,
    lines_read: usize,
}

impl HeaderBlock {
    /// First line without its line ending
    pub fn first_line(&self) -> &str {
        &self.first_line
    }

    /// Number of lines read, terminator included
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}

/// Header block reader
#[derive(Debug, Clone, Copy)]
pub struct HeaderReader {
    line_limit: usize,
}

impl HeaderReader {
    /// Create a reader with the default line limit
    pub fn new() -> Self {
        HeaderReader {
            line_limit: MAX_LINE_LEN,
        }
    }

    /// Create a reader with a custom line limit
    pub fn with_line_limit(line_limit: usize) -> Self {
        HeaderReader { line_limit }
    }

    /// Consume a header block up to and including its blank line
    ///
    /// End of input before the blank line fails with
    /// `Error::TruncatedHeader`. A blank first line ends the block at once
    /// and yields an empty first line.
    pub fn read<S: SessionOps>(&self, session: &mut HttpSession<S>) -> Result<HeaderBlock> {
        let first = session
            .read_line(self.line_limit)?
            .ok_or(Error::TruncatedHeader)?;
        let mut lines_read = 1;

        let first_line = String::from_utf8_lossy(trim_line_ending(&first)).into_owned();

        if !is_terminator(&first) {
            loop {
                let line = session
                    .read_line(self.line_limit)?
                    .ok_or(Error::TruncatedHeader)?;
                lines_read += 1;

                if is_terminator(&line) {
                    break;
                }
            }
        }

        Ok(HeaderBlock {
            first_line,
            lines_read,
        })
    }
}

impl Default for HeaderReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse and validate an HTTP request line
///
/// Format: METHOD PATH VERSION
///
/// Checks run in this order: the line must carry a method and a path
/// (`BadRequest`), the method must be GET (`NotImplemented`), and the
/// protocol token must be exactly `HTTP/1.1` with nothing after it
/// (`BadRequest`).
pub fn parse_request_line(line: &str) -> Result<RequestLine> {
    let parts = tokens(line);

    if parts.len() < 2 {
        return Err(Error::BadRequest(format!(
            "Invalid request line: expected 3 parts, got {}",
            parts.len()
        )));
    }

    let method = Method::from_str(parts[0])?;

    if parts.len() != 3 || parts[2] != HTTP_VERSION {
        return Err(Error::BadRequest(format!(
            "Invalid protocol in request line: {}",
            parts[2..].join(" ")
        )));
    }

    Ok(RequestLine {
        method,
        path: parts[1].to_string(),
    })
}

/// Parse an HTTP response status line
///
/// Format: VERSION STATUS REASON...
///
/// The protocol token must be exactly `HTTP/1.1` and the status token must
/// be all digits within 100..=599; anything else is a `Protocol` error.
pub fn parse_status_line(line: &str) -> Result<StatusLine> {
    let parts = tokens(line);

    if parts.first().copied() != Some(HTTP_VERSION) {
        return Err(Error::Protocol(format!("Unexpected protocol: {}", line)));
    }

    let code_token = parts
        .get(1)
        .ok_or_else(|| Error::Protocol(format!("Missing status code: {}", line)))?;

    if !code_token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Protocol(format!("Invalid status code: {}", code_token)));
    }

    let status = code_token
        .parse::<u16>()
        .ok()
        .and_then(Status::new)
        .ok_or_else(|| Error::Protocol(format!("Invalid status code: {}", code_token)))?;

    Ok(StatusLine {
        status,
        reason: parts[2..].join(" "),
    })
}

/// Parse a status line and accept it only when the status is 200
///
/// Any other well-formed status fails with `Error::NonSuccessStatus`
/// carrying the code and reason text.
pub fn check_status_line(line: &str) -> Result<StatusLine> {
    let status_line = parse_status_line(line)?;

    if !status_line.status.is_ok() {
        return Err(Error::NonSuccessStatus {
            code: status_line.code(),
            reason: status_line.reason,
        });
    }

    Ok(status_line)
}
