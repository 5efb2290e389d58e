//! HTTP file server binary
//!
//! Serves files below a document root, one connection at a time, until
//! SIGINT or SIGTERM arrives.

use minihttp::config::ServerConfig;
use minihttp::http::FileServer;
use minihttp::logging;
use minihttp::shutdown::{self, ShutdownToken};
use tracing::error;

fn run(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = ShutdownToken::new();
    shutdown::install_signal_handlers(&shutdown)?;

    let mut server = FileServer::bind(config.listen_addr()?, config.document_root())?;
    server.run(&shutdown)?;
    Ok(())
}

fn main() {
    let config = ServerConfig::from_args().unwrap_or_else(|e| e.exit());
    logging::init(config.verbose);

    if let Err(e) = run(&config) {
        error!("{}", e);
        std::process::exit(1);
    }
}
