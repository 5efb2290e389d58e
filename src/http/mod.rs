//! HTTP/1.1 file transfer for minihttp
//!
//! This module provides the protocol core shared by the client and the
//! server: message framing, first-line validation, URL and path resolution
//! and body streaming.
//!
//! # Architecture
//!
//! Both peers talk through the session operations abstraction:
//!
//! - `SessionOps` trait defines the raw operations (read, write, close)
//! - `HttpSession` adds buffered line reads on top of any `SessionOps`
//! - `HttpClient` and `HttpServer` drive one request/response exchange
//!
//! # Examples
//!
//! ```no_run
//! use minihttp::http::{HttpClient, RequestHead};
//! use minihttp::http::session::FdSessionOps;
//! use std::net::TcpStream;
//!
//! let stream = TcpStream::connect("127.0.0.1:8080").unwrap();
//! let mut client = HttpClient::new(FdSessionOps::new(stream));
//!
//! client.send_request(&RequestHead::new("localhost", "index.html")).unwrap();
//! let status = client.receive_header().unwrap();
//! assert_eq!(status.code(), 200);
//!
//! let mut body = Vec::new();
//! client.receive_body(&mut body).unwrap();
//! ```

pub mod client;
pub mod date;
pub mod message;
pub mod parser;
pub mod resolve;
pub mod server;
pub mod session;
pub mod stream;
pub mod url;

pub use client::HttpClient;
pub use message::{Method, RequestHead, RequestLine, ResponseHead, Status, StatusLine};
pub use parser::{HeaderBlock, HeaderReader};
pub use server::{DocumentRoot, FileServer, HttpServer};
pub use session::{HttpSession, SessionOps};
pub use url::Url;

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP operation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Could not connect: {0}")]
    Connection(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("{code} {reason}")]
    NonSuccessStatus { code: u16, reason: String },

    #[error("Connection closed before end of header")]
    TruncatedHeader,

    #[error("Header line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Method not implemented: {0}")]
    NotImplemented(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Status a server answers with when this error ends a request
    ///
    /// Returns `None` for errors that leave nothing to answer, such as a
    /// failed write on the connection itself.
    pub fn response_status(&self) -> Option<Status> {
        match self {
            Error::BadRequest(_) | Error::LineTooLong(_) | Error::TruncatedHeader => {
                Some(Status::BAD_REQUEST)
            }
            Error::NotImplemented(_) => Some(Status::NOT_IMPLEMENTED),
            Error::NotFound(_) => Some(Status::NOT_FOUND),
            _ => None,
        }
    }

    /// Process exit code for a client that fails with this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NonSuccessStatus { .. } => EXIT_NON_SUCCESS_STATUS,
            _ => 1,
        }
    }
}

/// Exit code of a client that received a status other than 200
pub const EXIT_NON_SUCCESS_STATUS: i32 = 3;

/// Longest header line accepted, terminator included
pub const MAX_LINE_LEN: usize = 2048;

/// Size of the intermediate buffer used for body transfer
pub const STREAM_BUFFER_LEN: usize = 1024 * 1024;

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Default port the file server listens on
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default index file name
pub const DEFAULT_INDEX: &str = "index.html";

/// The only protocol token either peer sends or accepts
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// CRLF line ending
pub const CRLF: &str = "\r\n";
