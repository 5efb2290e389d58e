//! Cooperative shutdown
//!
//! The accept loop polls a `ShutdownToken` between connections. SIGINT and
//! SIGTERM can be routed to a token; the signal only flips the flag, so a
//! connection being served is always finished before the loop stops.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Cancellation flag shared between the accept loop and its controllers
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownToken {
    /// Create a token that is not yet cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether shutdown was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

static SIGNAL_TARGET: OnceLock<Arc<AtomicBool>> = OnceLock::new();

extern "C" fn handle_signal(_signal: libc::c_int) {
    if let Some(flag) = SIGNAL_TARGET.get() {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Cancel `token` on SIGINT or SIGTERM
///
/// Handlers are installed without `SA_RESTART`, so a blocking poll in the
/// accept loop returns early when a signal arrives. Only one token per
/// process can be registered.
pub fn install_signal_handlers(token: &ShutdownToken) -> io::Result<()> {
    SIGNAL_TARGET
        .set(Arc::clone(&token.cancelled))
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "signal handlers already installed",
            )
        })?;

    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handle_signal as libc::sighandler_t;
        action.sa_flags = 0;
        libc::sigemptyset(&mut action.sa_mask);

        for signal in [libc::SIGINT, libc::SIGTERM] {
            if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
    }

    Ok(())
}
