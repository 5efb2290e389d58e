//! Network utilities
//!
//! Connect and listen helpers for the client and the file server, plus a
//! readiness poll that lets the accept loop wake up periodically.

use crate::http::{Error, Result};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::os::fd::AsRawFd;
use std::time::Duration;
use tracing::debug;

/// Pending connection queue length of the listening socket
pub const LISTEN_BACKLOG: i32 = 10;

/// Connect to `host:port`
///
/// Every resolved address is tried in order; the first one that accepts
/// the connection wins.
pub fn connect(host: &str, port: u16) -> Result<TcpStream> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| Error::Connection(format!("{host}:{port}: {e}")))?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr) {
            Ok(stream) => {
                debug!("Connected to {}", addr);
                return Ok(stream);
            }
            Err(e) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(Error::Connection(match last_err {
        Some(e) => format!("{host}:{port}: {e}"),
        None => format!("{host}:{port}: no address found"),
    }))
}

/// Bind a listening TCP socket
///
/// The address is marked reusable so a restarted server does not trip
/// over connections still in TIME_WAIT.
pub fn bind(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    Ok(socket.into())
}

/// Wait until `listener` has a pending connection
///
/// Returns false when `timeout` elapses or a signal interrupts the wait.
pub fn wait_readable(listener: &TcpListener, timeout: Duration) -> io::Result<bool> {
    use libc::{poll, pollfd, POLLIN};

    let mut pfd = pollfd {
        fd: listener.as_raw_fd(),
        events: POLLIN,
        revents: 0,
    };

    let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;

    let result = unsafe { poll(&mut pfd as *mut pollfd, 1, timeout_ms) };

    if result < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }

    Ok(result > 0)
}
