//! HTTP message types
//!
//! This module defines the first-line types of requests and responses and
//! the encoders for the only two message heads this protocol subset sends.

use super::{Error, Result, CRLF, HTTP_VERSION};
use std::fmt;

/// HTTP methods
///
/// GET is the only method served; every other token is rejected while
/// parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
}

impl Method {
    /// Parse method from string
    ///
    /// Method names are case-sensitive; any token other than `GET` is
    /// reported as not implemented.
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(Method::Get),
            _ => Err(Error::NotImplemented(s.to_string())),
        }
    }

    /// Convert method to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status {
    code: u16,
}

impl Status {
    /// Create a new status code, which must lie in `100..=599`
    pub fn new(code: u16) -> Option<Self> {
        if (100..600).contains(&code) {
            Some(Status { code })
        } else {
            None
        }
    }

    /// Get the status code
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Get the canonical reason phrase for this status code
    pub fn reason_phrase(&self) -> &'static str {
        match self.code {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            501 => "Not Implemented",
            _ => "Unknown",
        }
    }

    /// Check if this is the one status the client accepts
    pub fn is_ok(&self) -> bool {
        self.code == 200
    }

    pub const OK: Status = Status { code: 200 };
    pub const BAD_REQUEST: Status = Status { code: 400 };
    pub const NOT_FOUND: Status = Status { code: 404 };
    pub const NOT_IMPLEMENTED: Status = Status { code: 501 };
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason_phrase())
    }
}

/// Parsed request line: `METHOD PATH HTTP/1.1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub path: String,
}

/// Parsed status line: `HTTP/1.1 CODE REASON...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub status: Status,
    pub reason: String,
}

impl StatusLine {
    /// Get the numeric status code
    pub fn code(&self) -> u16 {
        self.status.code()
    }
}

/// The request head the client sends
///
/// There is never a body, so the head is the whole request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    host: String,
    path: String,
}

impl RequestHead {
    /// Create a GET request for `path`, given without its leading slash
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        RequestHead {
            host: host.into(),
            path: path.into(),
        }
    }

    /// Serialize to wire format
    pub fn to_wire(&self) -> Vec<u8> {
        format!(
            "{} /{} {HTTP_VERSION}{CRLF}Host: {}{CRLF}Connection: close{CRLF}{CRLF}",
            Method::Get,
            self.path,
            self.host,
        )
        .into_bytes()
    }
}

/// The response head the server sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    status: Status,
    date: Option<String>,
    content_length: Option<u64>,
}

impl ResponseHead {
    /// Success head announcing a body of `content_length` bytes
    pub fn ok(date: impl Into<String>, content_length: u64) -> Self {
        ResponseHead {
            status: Status::OK,
            date: Some(date.into()),
            content_length: Some(content_length),
        }
    }

    /// Error head; error responses carry no body
    pub fn error(status: Status) -> Self {
        ResponseHead {
            status,
            date: None,
            content_length: None,
        }
    }

    /// Serialize to wire format
    pub fn to_wire(&self) -> Vec<u8> {
        let mut wire = format!("{HTTP_VERSION} {}{CRLF}", self.status);

        if let Some(date) = &self.date {
            wire.push_str(&format!("Date: {date}{CRLF}"));
        }
        if let Some(len) = self.content_length {
            wire.push_str(&format!("Content-Length: {len}{CRLF}"));
        }
        wire.push_str("Connection: close");
        wire.push_str(CRLF);
        wire.push_str(CRLF);

        wire.into_bytes()
    }
}
