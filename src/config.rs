//! Command-line configuration
//!
//! Both binaries parse their arguments into a config struct and validate it
//! before any socket is opened.
//!
//! ```bash
//! client -p 8080 -d downloads http://localhost/docs/
//! server -p 8080 -i home.html /srv/www
//! ```

use crate::http::client::Destination;
use crate::http::server::DocumentRoot;
use crate::http::{DEFAULT_HTTP_PORT, DEFAULT_INDEX, DEFAULT_SERVER_PORT};
use clap::Parser;
use std::ffi::OsString;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Usage(#[from] clap::Error),

    #[error("Directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),
}

impl ConfigError {
    /// Whether this is a `--help` or `--version` request rather than an error
    pub fn is_informational(&self) -> bool {
        match self {
            ConfigError::Usage(e) => !e.use_stderr(),
            _ => false,
        }
    }

    /// Report the error and terminate the process
    ///
    /// Help and version output exit with 0, every configuration error
    /// exits with 1.
    pub fn exit(&self) -> ! {
        match self {
            ConfigError::Usage(e) if self.is_informational() => e.exit(),
            ConfigError::Usage(e) => {
                let _ = e.print();
            }
            other => eprintln!("error: {other}"),
        }
        std::process::exit(1)
    }
}

fn port_parser() -> clap::builder::RangedI64ValueParser<u16> {
    clap::value_parser!(u16).range(1..=65535)
}

/// Client configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "client")]
#[command(about = "Fetch a file over HTTP/1.1")]
#[command(version)]
pub struct ClientConfig {
    /// Port to connect to
    #[arg(short, long, default_value_t = DEFAULT_HTTP_PORT, value_parser = port_parser())]
    pub port: u16,

    /// Write the content to FILE
    #[arg(short, long, value_name = "FILE", conflicts_with = "dir")]
    pub output: Option<PathBuf>,

    /// Write the content into a file of the same name inside DIR
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Log debug details
    #[arg(short, long)]
    pub verbose: bool,

    /// URL to fetch, e.g. http://localhost/index.html
    pub url: String,
}

impl ClientConfig {
    /// Parse and validate the process arguments
    pub fn from_args() -> Result<Self, ConfigError> {
        Self::try_from_args(std::env::args_os())
    }

    /// Parse and validate an argument list, program name first
    pub fn try_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let config = Self::try_parse_from(args)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that an output directory exists
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.dir {
            Some(dir) if !dir.is_dir() => Err(ConfigError::MissingDirectory(dir.clone())),
            _ => Ok(()),
        }
    }

    /// Where the downloaded content goes
    pub fn destination(&self) -> Destination {
        match (&self.output, &self.dir) {
            (Some(file), _) => Destination::File(file.clone()),
            (None, Some(dir)) => Destination::Directory(dir.clone()),
            (None, None) => Destination::Stdout,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "server")]
#[command(about = "Serve files from a document root over HTTP/1.1")]
#[command(version)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT, value_parser = port_parser())]
    pub port: u16,

    /// File served for requests to `/`
    #[arg(short, long, default_value = DEFAULT_INDEX)]
    pub index: String,

    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Log debug details
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory files are served from
    pub doc_root: PathBuf,
}

impl ServerConfig {
    /// Parse and validate the process arguments
    pub fn from_args() -> Result<Self, ConfigError> {
        Self::try_from_args(std::env::args_os())
    }

    /// Parse and validate an argument list, program name first
    pub fn try_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let config = Self::try_parse_from(args)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the document root and bind address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.doc_root.is_dir() {
            return Err(ConfigError::MissingDirectory(self.doc_root.clone()));
        }
        self.listen_addr()?;
        Ok(())
    }

    /// Socket address to listen on
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.bind.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Site served by this configuration
    pub fn document_root(&self) -> DocumentRoot {
        DocumentRoot::new(self.doc_root.clone(), self.index.clone())
    }
}
