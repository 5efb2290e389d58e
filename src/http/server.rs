//! HTTP server implementation
//!
//! This module provides the file server: `HttpServer` answers the single
//! request on one connection, `FileServer` accepts connections one at a
//! time and hands each to an `HttpServer` until shut down.

use super::parser::parse_request_line;
use super::resolve::{has_parent_segment, resolve_path};
use super::session::FdSessionOps;
use super::stream::ByteStreamer;
use super::{
    date, Error, HeaderReader, HttpSession, RequestLine, ResponseHead, Result, SessionOps, Status,
    DEFAULT_INDEX,
};
use crate::net;
use crate::shutdown::ShutdownToken;
use std::fs::File;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Read-only site configuration: document root and index file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRoot {
    root: PathBuf,
    index: String,
}

impl DocumentRoot {
    /// Create a document root
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        DocumentRoot {
            root: root.into(),
            index: index.into(),
        }
    }

    /// Create a document root serving `index.html` for `/`
    pub fn with_default_index(root: impl Into<PathBuf>) -> Self {
        Self::new(root, DEFAULT_INDEX)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Map a request path to a file path
    pub fn resolve(&self, request_path: &str) -> PathBuf {
        resolve_path(&self.root, request_path, &self.index)
    }
}

/// Open `path` for reading if it is a regular file
///
/// Returns the file together with its length in bytes.
fn open_regular_file(path: &Path) -> io::Result<(File, u64)> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;

    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "not a regular file"));
    }

    Ok((file, metadata.len()))
}

/// HTTP server
///
/// Handles the single request of one connection.
pub struct HttpServer<S: SessionOps> {
    session: HttpSession<S>,
    reader: HeaderReader,
}

impl<S: SessionOps> HttpServer<S> {
    /// Create a new HTTP server with a session
    pub fn new(session: S) -> Self {
        HttpServer {
            session: HttpSession::new(session),
            reader: HeaderReader::new(),
        }
    }

    /// Receive and validate the request header
    pub fn receive_request(&mut self) -> Result<RequestLine> {
        let block = self.reader.read(&mut self.session)?;
        debug!("Read {} header lines", block.lines_read());

        parse_request_line(block.first_line())
    }

    /// Send an error response; error responses have no body
    pub fn send_error(&mut self, status: Status) -> Result<()> {
        self.session.send(&ResponseHead::error(status).to_wire())
    }

    /// Send a success header followed by the contents of `file`
    ///
    /// Returns the number of body bytes sent.
    pub fn send_file(
        &mut self,
        file: &mut File,
        len: u64,
        streamer: &mut ByteStreamer,
    ) -> Result<u64> {
        self.session.send(&ResponseHead::ok(date::now(), len).to_wire())?;

        let sent = streamer.copy(file, &mut self.session)?;
        if sent != len {
            warn!("File changed while sending: announced {} bytes, sent {}", len, sent);
        }
        Ok(sent)
    }

    /// Answer the request on this connection from `site`
    ///
    /// Request faults (malformed request, unsupported method, missing file)
    /// are answered with the matching error status and reported as `Ok`.
    /// Only failures of the connection itself are returned as errors.
    pub fn serve(&mut self, site: &DocumentRoot, streamer: &mut ByteStreamer) -> Result<Status> {
        match self.respond(site, streamer) {
            Ok(status) => Ok(status),
            Err(e) => match e.response_status() {
                Some(status) => {
                    warn!("{}", e);
                    self.send_error(status)?;
                    Ok(status)
                }
                None => Err(e),
            },
        }
    }

    fn respond(&mut self, site: &DocumentRoot, streamer: &mut ByteStreamer) -> Result<Status> {
        let request = self.receive_request()?;
        debug!("{} {}", request.method, request.path);

        if has_parent_segment(&request.path) {
            return Err(Error::BadRequest(format!(
                "Path leaves document root: {}",
                request.path
            )));
        }

        let path = site.resolve(&request.path);
        let (mut file, len) = open_regular_file(&path)
            .map_err(|e| Error::NotFound(format!("{}: {}", path.display(), e)))?;

        self.send_file(&mut file, len, streamer)?;
        Ok(Status::OK)
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

/// Sequential file server
///
/// Serves one connection to completion before accepting the next.
pub struct FileServer {
    listener: TcpListener,
    site: DocumentRoot,
    streamer: ByteStreamer,
    poll_interval: Duration,
}

impl FileServer {
    /// How often the accept loop checks for shutdown while idle
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

    /// Bind a listening socket on `addr` and serve `site` from it
    pub fn bind(addr: SocketAddr, site: DocumentRoot) -> Result<Self> {
        let listener = net::bind(addr)?;
        Ok(Self::from_listener(listener, site))
    }

    /// Serve `site` from an already bound listener
    pub fn from_listener(listener: TcpListener, site: DocumentRoot) -> Self {
        FileServer {
            listener,
            site,
            streamer: ByteStreamer::new(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set how often the accept loop checks for shutdown while idle
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    /// Address the server listens on
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and serve connections until `shutdown` is cancelled
    ///
    /// The token is checked between connections only; a connection in
    /// progress always runs to completion.
    pub fn run(&mut self, shutdown: &ShutdownToken) -> Result<()> {
        info!("Listening on http://{}", self.local_addr()?);

        while !shutdown.is_cancelled() {
            if !net::wait_readable(&self.listener, self.poll_interval)? {
                continue;
            }

            match self.listener.accept() {
                Ok((stream, peer)) => self.handle_connection(stream, peer),
                Err(e) if is_transient(&e) => {
                    warn!("Accept failed: {}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!("Shutdown server");
        Ok(())
    }

    fn handle_connection(&mut self, stream: TcpStream, peer: SocketAddr) {
        info!("Request from {}", peer);

        let mut server = HttpServer::new(FdSessionOps::new(stream));
        match server.serve(&self.site, &mut self.streamer) {
            Ok(status) => info!("Sent {} to {}", status, peer),
            Err(e) => error!("Connection error from {}: {}", peer, e),
        }

        if let Err(e) = server.close() {
            debug!("Close failed for {}: {}", peer, e);
        }
        debug!("Closed connection to {}", peer);
    }
}

/// Accept errors caused by a single connection rather than the listener
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}
