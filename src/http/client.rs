//! HTTP client implementation
//!
//! This module provides the client side of the exchange: send one GET
//! request, validate the response header, then stream the body to a sink.

use super::parser::check_status_line;
use super::session::FdSessionOps;
use super::stream::ByteStreamer;
use super::{
    HeaderReader, HttpSession, RequestHead, Result, SessionOps, StatusLine, Url,
};
use crate::net;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// HTTP client
///
/// Provides methods for sending the request and receiving the response.
pub struct HttpClient<S: SessionOps> {
    session: HttpSession<S>,
    reader: HeaderReader,
    streamer: ByteStreamer,
}

impl<S: SessionOps> HttpClient<S> {
    /// Create a new HTTP client with a session
    pub fn new(session: S) -> Self {
        HttpClient {
            session: HttpSession::new(session),
            reader: HeaderReader::new(),
            streamer: ByteStreamer::new(),
        }
    }

    /// Send the request and flush it to the server
    pub fn send_request(&mut self, request: &RequestHead) -> Result<()> {
        self.session.send(&request.to_wire())
    }

    /// Receive and validate the response header
    ///
    /// The whole header block is consumed. Anything but a `HTTP/1.1 200`
    /// status line is an error.
    pub fn receive_header(&mut self) -> Result<StatusLine> {
        let block = self.reader.read(&mut self.session)?;
        debug!("Read {} header lines", block.lines_read());

        let status = check_status_line(block.first_line())?;
        info!("Received response with status {}", status.code());
        Ok(status)
    }

    /// Stream the response body into `sink` until the server closes
    pub fn receive_body<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<u64> {
        let n = self.streamer.copy(&mut self.session, sink)?;
        debug!("Received {} body bytes", n);
        Ok(n)
    }

    /// Run the full exchange for `url`
    ///
    /// The sink is only opened once the response header was accepted.
    pub fn fetch(&mut self, url: &Url, destination: &Destination) -> Result<u64> {
        self.send_request(&RequestHead::new(url.host(), url.path()))?;
        self.receive_header()?;

        let mut sink = destination.open(url)?;
        self.receive_body(&mut sink)
    }

    /// Close the connection
    pub fn close(&mut self) -> Result<()> {
        self.session.close()
    }

    /// Get a reference to the underlying session
    pub fn session(&self) -> &HttpSession<S> {
        &self.session
    }
}

/// Where a downloaded body is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output
    Stdout,
    /// A named file, created or truncated
    File(PathBuf),
    /// A file inside this directory, named after the URL
    Directory(PathBuf),
}

impl Destination {
    /// Path the body of `url` lands in, `None` for stdout
    pub fn path_for(&self, url: &Url) -> Option<PathBuf> {
        match self {
            Destination::Stdout => None,
            Destination::File(path) => Some(path.clone()),
            Destination::Directory(dir) => Some(url.destination_in(dir)),
        }
    }

    /// Open the sink for the body of `url`
    pub fn open(&self, url: &Url) -> io::Result<Box<dyn Write>> {
        match self.path_for(url) {
            Some(path) => {
                debug!("Writing body to {}", path.display());
                Ok(Box::new(File::create(path)?))
            }
            None => Ok(Box::new(io::stdout().lock())),
        }
    }
}

/// Download `url` from `port` into `destination`
///
/// Returns the number of body bytes written. The connection is closed
/// exactly once, whether or not the exchange succeeded.
pub fn download(url: &str, port: u16, destination: &Destination) -> Result<u64> {
    info!("Send request for {} on port {}", url, port);
    let url = Url::parse(url)?;

    let stream = net::connect(url.host(), port)?;
    let mut client = HttpClient::new(FdSessionOps::new(stream));

    let outcome = client.fetch(&url, destination);
    let closed = client.close();

    let n = outcome?;
    closed?;
    Ok(n)
}
