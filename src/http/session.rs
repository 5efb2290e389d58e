//! Session operations abstraction
//!
//! This module provides the session operations pattern that lets the client
//! and server code run unchanged over a TCP socket or an in-memory buffer.
//!
//! `HttpSession` layers buffered line reads on top of the raw operations.
//! Bytes read past the end of the header block stay buffered and are handed
//! out first by the `Read` impl, so the body stream starts exactly where the
//! header ended.

use super::{Error, Result};
use std::io::{self, Cursor, Read, Write};
use std::net::{Shutdown, TcpStream};

/// Session operations trait
///
/// Defines the raw operations on a duplex byte stream. Read and write
/// cursors are independent.
pub trait SessionOps {
    /// Read data from the session
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write data to the session
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Push buffered output to the peer
    fn flush(&mut self) -> io::Result<()>;

    /// Close the session
    fn close(&mut self) -> io::Result<()>;
}

/// HTTP session wrapping a transport with session operations
pub struct HttpSession<S: SessionOps> {
    session: S,
    buffer: Vec<u8>,
    closed: bool,
}

impl<S: SessionOps> HttpSession<S> {
    /// Create a new HTTP session
    pub fn new(session: S) -> Self {
        HttpSession {
            session,
            buffer: Vec::with_capacity(4096),
            closed: false,
        }
    }

    /// Read one line, terminator included
    ///
    /// Returns `Ok(None)` once the peer has closed and nothing is buffered.
    /// A final line without a terminator is returned as is. Lines longer
    /// than `limit` bytes fail with `Error::LineTooLong`.
    pub fn read_line(&mut self, limit: usize) -> Result<Option<Vec<u8>>> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                if pos + 1 > limit {
                    return Err(Error::LineTooLong(limit));
                }
                return Ok(Some(self.buffer.drain(..=pos).collect()));
            }

            if self.buffer.len() >= limit {
                return Err(Error::LineTooLong(limit));
            }

            let mut temp = [0u8; 4096];
            let n = self.session.read(&mut temp)?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.buffer)));
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }

    /// Write a whole message and flush it to the peer
    pub fn send(&mut self, wire: &[u8]) -> Result<()> {
        self.write_all(wire)?;
        self.flush()?;
        Ok(())
    }

    /// Close the session
    ///
    /// Pending output is flushed first. Only the first call reaches the
    /// transport.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let flushed = self.session.flush();
        self.session.close()?;
        flushed?;
        Ok(())
    }

    /// Check whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Get a reference to the underlying session
    pub fn get_ref(&self) -> &S {
        &self.session
    }
}

impl<S: SessionOps> Read for HttpSession<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.buffer.is_empty() {
            let n = buf.len().min(self.buffer.len());
            buf[..n].copy_from_slice(&self.buffer[..n]);
            self.buffer.drain(..n);
            return Ok(n);
        }

        self.session.read(buf)
    }
}

impl<S: SessionOps> Write for HttpSession<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.session.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.session.flush()
    }
}

/// Plain file descriptor session operations
pub struct FdSessionOps {
    stream: TcpStream,
}

impl FdSessionOps {
    /// Create a new FD session operations from a TCP stream
    pub fn new(stream: TcpStream) -> Self {
        FdSessionOps { stream }
    }
}

impl SessionOps for FdSessionOps {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            // The peer may already have torn the connection down
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

/// In-memory session operations
///
/// Reads come from a fixed input buffer, writes are collected. Used to
/// check wire bytes exactly without a socket.
#[derive(Debug, Default)]
pub struct MemorySessionOps {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
    close_calls: usize,
}

impl MemorySessionOps {
    /// Create a session whose peer sends `input` and then closes
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        MemorySessionOps {
            input: Cursor::new(input.into()),
            output: Vec::new(),
            close_calls: 0,
        }
    }

    /// Bytes written so far
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Number of times the transport was closed
    pub fn close_calls(&self) -> usize {
        self.close_calls
    }
}

impl SessionOps for MemorySessionOps {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.close_calls += 1;
        Ok(())
    }
}

/// Helper to create an HTTP session from a TCP stream
pub fn from_tcp_stream(stream: TcpStream) -> HttpSession<FdSessionOps> {
    HttpSession::new(FdSessionOps::new(stream))
}
