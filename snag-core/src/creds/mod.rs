//! # Credential Resolution
//!
//! Read-only discovery of HTTP Basic credentials stored in `.netrc` files,
//! used by the network fetcher to authenticate requests transparently.
//!
//! Credentials live in `~/.netrc` (`~/_netrc` on Windows):
//!
//! ```text
//! machine artifacts.example.com
//!   login your.name@example.com
//!   password your-token-here
//! ```
//!
//! This module never writes the file; it parses a fresh snapshot on every
//! lookup and returns `Ok(None)` when no usable entry exists, reserving
//! errors for unreadable or malformed input.

pub mod netrc;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A single usable credential from a netrc file.
///
/// Invariant: `login` and `password` are both non-empty. A record missing
/// either value is never surfaced as an entry.
#[derive(Debug, Clone)]
pub struct NetrcEntry {
  /// Machine name exactly as written in the file.
  pub machine: String,
  pub login: String,
  pub password: String,
}

/// Errors produced while resolving credentials from a netrc file.
///
/// "No matching entry" is not represented here; lookups report it as a
/// successful `None`.
#[derive(Debug, Error)]
pub enum CredentialError {
  /// The requested URI could not be parsed, so there is no hostname to
  /// match against.
  #[error("failed to parse URL `{uri}`")]
  InvalidUri {
    uri: String,
    #[source]
    source: url::ParseError,
  },

  /// The netrc file could not be opened or read.
  #[error("failed to open netrc file `{path}`")]
  Open {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The netrc file was read but its contents are structurally invalid.
  #[error("failed to parse netrc file `{path}`: {reason}")]
  Parse { path: PathBuf, reason: String },
}
