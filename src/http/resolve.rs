//! Request path resolution against a document root

use std::path::{Path, PathBuf};

/// Map a request path to a file under `root`
///
/// The root path `/` names the index file; any other path is appended to
/// the root as given. The path is not canonicalized, so callers that care
/// about `..` must check with [`has_parent_segment`] first.
pub fn resolve_path(root: &Path, request_path: &str, index: &str) -> PathBuf {
    if request_path == "/" {
        return root.join(index);
    }

    // A leading slash must not turn the joined path absolute
    root.join(request_path.trim_start_matches('/'))
}

/// Check whether a request path climbs out of its directory
pub fn has_parent_segment(request_path: &str) -> bool {
    request_path.split('/').any(|segment| segment == "..")
}
