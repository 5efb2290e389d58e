//! URL resolution for the client
//!
//! Only `http://` URLs are accepted. The host ends at the first delimiter
//! character after the scheme; everything after that delimiter is the path
//! sent in the request line. The delimiter itself belongs to neither part.

use super::{Error, Result, DEFAULT_INDEX};
use std::path::{Path, PathBuf};

/// Required scheme prefix
pub const SCHEME: &str = "http://";

/// Characters that end the host part of a URL
pub const DELIMITERS: [char; 7] = ['/', ';', '?', ':', '@', '=', '&'];

/// Split a URL into host and path
///
/// Returns views into `url`; the input is left untouched.
pub fn split_url(url: &str) -> Result<(&str, &str)> {
    let rest = url
        .strip_prefix(SCHEME)
        .ok_or_else(|| Error::InvalidUrl(format!("missing {SCHEME} prefix: {url}")))?;

    let pos = rest
        .find(DELIMITERS)
        .ok_or_else(|| Error::InvalidUrl(format!("no delimiter after host: {url}")))?;

    // Every delimiter is a single byte
    Ok((&rest[..pos], &rest[pos + 1..]))
}

/// A resolved request target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    host: String,
    path: String,
    trailing_slash: bool,
}

impl Url {
    /// Parse an `http://host<delim>path` URL
    pub fn parse(url: &str) -> Result<Self> {
        let (host, path) = split_url(url)?;

        Ok(Url {
            host: host.to_string(),
            path: path.to_string(),
            trailing_slash: url.ends_with('/'),
        })
    }

    /// Host name, without port
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path after the delimiter, without a leading slash
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name a download of this URL is saved under
    ///
    /// A URL ending in `/` names the index file; otherwise the last path
    /// segment is used, or the whole path when it has no `/`. An empty
    /// name falls back to the index file as well.
    pub fn file_name(&self) -> &str {
        if self.trailing_slash {
            return DEFAULT_INDEX;
        }

        let name = match self.path.rfind('/') {
            Some(pos) => &self.path[pos + 1..],
            None => &self.path,
        };

        if name.is_empty() {
            DEFAULT_INDEX
        } else {
            name
        }
    }

    /// Destination path of a download into `dir`
    pub fn destination_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}
