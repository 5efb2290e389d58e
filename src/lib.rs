//! minihttp - single-file HTTP/1.1 transfer
//!
//! This crate provides a minimal HTTP/1.1 client and file server that
//! exchange exactly one GET request and one response per connection.

pub mod config;
pub mod http;
pub mod logging;
pub mod net;
pub mod shutdown;
