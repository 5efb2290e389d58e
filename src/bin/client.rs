//! HTTP client binary
//!
//! Fetches the file named by a URL and writes it to stdout, a file, or a
//! directory. Exits with 3 when the server answers with a status other
//! than 200, with 1 on any other failure.

use minihttp::config::ClientConfig;
use minihttp::http::client::download;
use minihttp::logging;
use tracing::error;

fn main() {
    let config = ClientConfig::from_args().unwrap_or_else(|e| e.exit());
    logging::init(config.verbose);

    if let Err(e) = download(&config.url, config.port, &config.destination()) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}
