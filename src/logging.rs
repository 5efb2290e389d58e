//! Diagnostic logging
//!
//! Logs go to stderr so that stdout stays free for downloaded content.

use tracing::Level;

/// Install the global tracing subscriber
///
/// `verbose` lowers the threshold from INFO to DEBUG. Calling this again
/// once a subscriber is installed has no effect.
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .try_init();
}
