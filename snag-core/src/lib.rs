//! # Snag Core Library
//!
//! Core library for snag providing a URI-addressable file-fetching
//! abstraction with transparent credential injection from `.netrc` files.
//! Callers construct a [`Fetcher`] variant for the source they want to read
//! from and receive a byte stream back, without hand-coding authentication
//! logic at each call site.

pub mod creds;
pub mod fetch;

// Re-export the main types for consumers
pub use creds::netrc::{find_netrc_entry, resolve_netrc_path};
pub use creds::{CredentialError, NetrcEntry};
pub use fetch::{Fetcher, FileFetcher, HttpFetcher};
