//! netrc file fixtures for testing
//!
//! This module provides an RAII guard that materializes a netrc file with
//! the platform filename inside a temporary HOME directory, so tests can
//! exercise credential lookups without touching the user's real files.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::MutexGuard;

use tempfile::TempDir;

use crate::env::lock_env;

#[cfg(windows)]
const NETRC_FILENAME: &str = "_netrc";
#[cfg(not(windows))]
const NETRC_FILENAME: &str = ".netrc";

/// RAII guard for test netrc files
///
/// Creates a temporary directory holding a netrc file with the given
/// content, points the HOME environment variable at that directory, and
/// restores the original HOME value when dropped. The guard also holds the
/// process-wide environment lock, serializing it against other
/// environment-mutating guards.
pub struct NetrcGuard {
  temp_dir: TempDir,
  netrc_path: PathBuf,
  original_home: Option<String>,
  _lock: MutexGuard<'static, ()>,
}

impl NetrcGuard {
  /// Create a new NetrcGuard with the given content
  pub fn new(content: &str) -> Self {
    let lock = lock_env();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let netrc_path = temp_dir.path().join(NETRC_FILENAME);
    fs::write(&netrc_path, content).expect("Failed to write test netrc");

    let original_home = env::var("HOME").ok();
    unsafe {
      env::set_var("HOME", temp_dir.path());
    }

    Self {
      temp_dir,
      netrc_path,
      original_home,
      _lock: lock,
    }
  }

  /// Get the path to the netrc file
  pub fn netrc_path(&self) -> &Path {
    &self.netrc_path
  }

  /// Get the path to the temporary HOME directory
  pub fn home_dir(&self) -> &Path {
    self.temp_dir.path()
  }
}

impl Drop for NetrcGuard {
  fn drop(&mut self) {
    match &self.original_home {
      Some(val) => unsafe {
        env::set_var("HOME", val);
      },
      None => unsafe {
        env::remove_var("HOME");
      },
    }
  }
}
