//! Helpers for reading credentials stored in `.netrc` files.
//!
//! The parser keeps the file's records in order and lookups return the first
//! machine entry matching the requested hostname, so behavior stays
//! predictable when a file carries several entries. Files are re-read on
//! every lookup; nothing is cached between calls.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use url::Url;

use crate::creds::{CredentialError, NetrcEntry};

#[cfg(windows)]
const NETRC_FILENAME: &str = "_netrc";
#[cfg(not(windows))]
const NETRC_FILENAME: &str = ".netrc";

/// Raw machine record as written in the file. Only the name, login, and
/// password take part in lookups; `account` values are parsed and dropped.
#[derive(Debug, Default)]
struct MachineRecord {
  name: String,
  login: String,
  password: String,
}

/// Resolves the netrc file path to use for credential lookups.
///
/// An explicit path always wins and is returned unchanged. Without one, the
/// default is `.netrc` (`_netrc` on Windows) under the current user's home
/// directory.
///
/// # Errors
///
/// Returns an error if no explicit path is given and the home directory
/// cannot be determined.
pub fn resolve_netrc_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
  if let Some(path) = explicit {
    return Ok(path);
  }

  let base_dirs = BaseDirs::new().context("could not determine the current user's home directory")?;
  Ok(base_dirs.home_dir().join(NETRC_FILENAME))
}

/// Finds the netrc entry applicable to a URI.
///
/// The URI's hostname (without any port) is matched against the machine
/// records in `netrc_file`, first match wins. Ports never block a match: a
/// request to `host:8080` matches a record stored for bare `host`. Login
/// names are not used to discriminate between entries.
///
/// # Returns
///
/// * `Ok(Some(NetrcEntry))` when a record with both login and password
///   matches the hostname. The machine name is reported exactly as written
///   in the file.
/// * `Ok(None)` when no record matches, or the matching record is missing
///   its login or password.
///
/// # Errors
///
/// Returns [`CredentialError`] when the URI does not parse, or the file
/// cannot be read, or its contents are structurally invalid. A missing file
/// is an error, not a missing entry.
pub fn find_netrc_entry(uri: &str, netrc_file: &Path) -> Result<Option<NetrcEntry>, CredentialError> {
  let url = Url::parse(uri).map_err(|source| CredentialError::InvalidUri {
    uri: uri.to_string(),
    source,
  })?;

  let contents = fs::read_to_string(netrc_file).map_err(|source| CredentialError::Open {
    path: netrc_file.to_path_buf(),
    source,
  })?;

  let records = parse_netrc(netrc_file, &contents)?;

  let Some(hostname) = url.host_str() else {
    // URIs without a host component (mailto:, data:, ...) match nothing.
    return Ok(None);
  };

  let Some(record) = records.iter().find(|record| machine_matches(&record.name, hostname)) else {
    return Ok(None);
  };

  // An incomplete record is treated as absent. The lookup stops at the
  // first structural match and does not fall through to later records.
  if record.login.is_empty() || record.password.is_empty() {
    return Ok(None);
  }

  Ok(Some(NetrcEntry {
    machine: record.name.clone(),
    login: record.login.clone(),
    password: record.password.clone(),
  }))
}

/// Tokenizes netrc contents into ordered machine records.
///
/// Both the single-line (`machine host login user password pass`) and the
/// multi-line layout are accepted, as is a mix of the two. A `#` token
/// comments out the rest of its line. Tokens that are not recognized
/// keywords are skipped.
fn parse_netrc(path: &Path, contents: &str) -> Result<Vec<MachineRecord>, CredentialError> {
  let mut tokens = Vec::new();
  for line in contents.lines() {
    for token in line.split_whitespace() {
      if token.starts_with('#') {
        break;
      }
      tokens.push(token);
    }
  }

  let mut records: Vec<MachineRecord> = Vec::new();
  let mut iter = tokens.into_iter();
  while let Some(token) = iter.next() {
    match token {
      "machine" => {
        let name = iter.next().ok_or_else(|| missing_value(path, "machine"))?;
        records.push(MachineRecord {
          name: name.to_string(),
          ..MachineRecord::default()
        });
      }
      // A `default` record carries no name and can never match a hostname.
      "default" => records.push(MachineRecord::default()),
      "login" => {
        let value = iter.next().ok_or_else(|| missing_value(path, "login"))?;
        if let Some(record) = records.last_mut() {
          record.login = value.to_string();
        }
      }
      "password" => {
        let value = iter.next().ok_or_else(|| missing_value(path, "password"))?;
        if let Some(record) = records.last_mut() {
          record.password = value.to_string();
        }
      }
      "account" => {
        iter.next().ok_or_else(|| missing_value(path, "account"))?;
      }
      _ => {}
    }
  }

  Ok(records)
}

fn missing_value(path: &Path, keyword: &str) -> CredentialError {
  CredentialError::Parse {
    path: path.to_path_buf(),
    reason: format!("keyword `{keyword}` is missing a value"),
  }
}

/// Compares a stored machine name against a request hostname.
///
/// A `:port` suffix on the stored name is ignored, mirroring the hostname
/// extraction on the request side. Hostnames from parsed URLs are
/// lowercased, so the comparison ignores ASCII case.
fn machine_matches(name: &str, hostname: &str) -> bool {
  if name.is_empty() {
    return false;
  }

  let bare = name.split(':').next().unwrap_or(name);
  bare.eq_ignore_ascii_case(hostname)
}
