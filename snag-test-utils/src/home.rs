//! HOME directory management for testing
//!
//! This module provides utilities for isolating the HOME directory during
//! testing to prevent tests from touching the user's actual home directory.

use std::env;
use std::path::Path;
use std::sync::MutexGuard;

use tempfile::TempDir;

use crate::env::lock_env;

/// A test environment that overrides the HOME directory with a temporary
/// directory, restoring the original value when dropped.
///
/// The guard holds the process-wide environment lock, so tests using it are
/// serialized against other environment-mutating guards.
pub struct HomeEnvTestGuard {
  /// The temporary directory that will be used as HOME
  pub temp_dir: TempDir,
  /// The original HOME value, if any
  original_home: Option<String>,
  _lock: MutexGuard<'static, ()>,
}

impl Default for HomeEnvTestGuard {
  fn default() -> Self {
    Self::new()
  }
}

impl HomeEnvTestGuard {
  /// Create a new test environment with a temporary HOME directory
  pub fn new() -> Self {
    let lock = lock_env();
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    let original_home = env::var("HOME").ok();

    unsafe {
      env::set_var("HOME", temp_dir.path());
    }

    Self {
      temp_dir,
      original_home,
      _lock: lock,
    }
  }

  /// Get the path to the temporary HOME directory
  pub fn home_dir(&self) -> &Path {
    self.temp_dir.path()
  }
}

impl Drop for HomeEnvTestGuard {
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
