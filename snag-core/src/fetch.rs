//! # URI Fetchers
//!
//! Polymorphic retrieval of byte streams addressed by a URI, either from an
//! HTTP(S) endpoint or from a file already on local disk. The network
//! variant can transparently attach HTTP Basic credentials discovered in a
//! netrc file before the request goes out.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, trace};

use crate::creds::netrc::find_netrc_entry;

/// Retrieves files addressed by a URI.
///
/// The variant is selected by the caller at construction time, so call
/// sites never branch on the URI scheme themselves.
pub trait Fetcher {
  /// Fetch the file and return a stream to read it from.
  ///
  /// The caller owns the returned stream; dropping it releases the
  /// underlying connection or file handle on every exit path.
  fn get(&self, uri: &str) -> Result<Box<dyn Read>>;
}

/// Fetches a file from an `http://` or `https://` URI.
///
/// Each `get` issues a single blocking GET request with no retries and no
/// response buffering. Responses with a status code above 200 are treated
/// as failures; that includes other success codes such as 201 or 204, which
/// is the current behavior rather than a general success-range check.
pub struct HttpFetcher {
  client: Client,
  enable_netrc: bool,
  netrc_file: PathBuf,
}

impl HttpFetcher {
  /// Create a fetcher that never consults a netrc file.
  pub fn new() -> Self {
    Self {
      client: Client::new(),
      enable_netrc: false,
      netrc_file: PathBuf::new(),
    }
  }

  /// Create a fetcher that resolves credentials from `netrc_file` before
  /// each request.
  ///
  /// Callers with no explicit path should resolve the platform default
  /// first, see [`crate::creds::netrc::resolve_netrc_path`].
  pub fn with_netrc(netrc_file: impl Into<PathBuf>) -> Self {
    Self {
      client: Client::new(),
      enable_netrc: true,
      netrc_file: netrc_file.into(),
    }
  }
}

impl Default for HttpFetcher {
  fn default() -> Self {
    Self::new()
  }
}

impl Fetcher for HttpFetcher {
  fn get(&self, uri: &str) -> Result<Box<dyn Read>> {
    debug!("Fetching {}", uri);

    let mut request = self.client.get(uri);

    if self.enable_netrc {
      let entry = find_netrc_entry(uri, &self.netrc_file).context("failed to load netrc credentials")?;
      if let Some(entry) = entry {
        trace!("Using netrc credentials for {}", entry.machine);
        request = request.basic_auth(&entry.login, Some(&entry.password));
      }
    }

    let response = request
      .send()
      .with_context(|| format!("failed to download `{uri}`"))?;

    let status = response.status().as_u16();
    if status > 200 {
      // Dropping the response releases the connection before returning.
      drop(response);
      return Err(anyhow::anyhow!("failed to download `{uri}`, status code {status}"));
    }

    Ok(Box::new(response))
  }
}

/// Reads a file that is already on local disk.
///
/// The `uri` argument to `get` is ignored; the fetcher always opens the
/// path it was constructed with.
pub struct FileFetcher {
  path: PathBuf,
}

impl FileFetcher {
  /// Create a local file reader for `path`.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl Fetcher for FileFetcher {
  fn get(&self, _uri: &str) -> Result<Box<dyn Read>> {
    debug!("Reading {}", self.path.display());

    let file =
      File::open(&self.path).with_context(|| format!("failed to open `{}` for reading", self.path.display()))?;
    Ok(Box::new(file))
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;
  use tokio::runtime::Runtime;
  use wiremock::matchers::{header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use super::*;

  fn read_to_string(mut stream: Box<dyn Read>) -> String {
    let mut buffer = String::new();
    stream.read_to_string(&mut buffer).expect("Failed to read stream");
    buffer
  }

  /// Write a netrc file pointing at the mock server's host (127.0.0.1).
  fn create_server_netrc(login: &str, password: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let netrc_path = temp_dir.path().join(".netrc");
    let content = format!("machine 127.0.0.1 login {login} password {password}\n");
    fs::write(&netrc_path, content).expect("Failed to write test .netrc");

    (temp_dir, netrc_path)
  }

  // Tests for HttpFetcher

  #[test]
  fn test_http_get_returns_body_on_200() {
    let rt = Runtime::new().expect("Failed to create runtime");
    let server = rt.block_on(MockServer::start());

    rt.block_on(
      Mock::given(method("GET"))
        .and(path("/artifact.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("artifact bytes"))
        .mount(&server),
    );

    let fetcher = HttpFetcher::new();
    let stream = fetcher.get(&format!("{}/artifact.tar.gz", server.uri())).unwrap();

    assert_eq!(read_to_string(stream), "artifact bytes");
  }

  #[test]
  fn test_http_get_error_names_uri_and_status() {
    let rt = Runtime::new().expect("Failed to create runtime");
    let server = rt.block_on(MockServer::start());

    rt.block_on(
      Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server),
    );

    let fetcher = HttpFetcher::new();
    let uri = format!("{}/missing", server.uri());
    let error = fetcher.get(&uri).err().unwrap().to_string();

    assert!(error.contains(&uri));
    assert!(error.contains("404"));
  }

  #[test]
  fn test_http_get_rejects_server_errors() {
    let rt = Runtime::new().expect("Failed to create runtime");
    let server = rt.block_on(MockServer::start());

    rt.block_on(
      Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server),
    );

    let fetcher = HttpFetcher::new();
    let error = fetcher.get(&format!("{}/x", server.uri())).err().unwrap().to_string();

    assert!(error.contains("500"));
  }

  #[test]
  fn test_http_get_rejects_status_above_200() {
    let rt = Runtime::new().expect("Failed to create runtime");
    let server = rt.block_on(MockServer::start());

    rt.block_on(
      Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server),
    );

    // 201 is a success code but the literal status policy rejects it.
    let fetcher = HttpFetcher::new();
    let error = fetcher.get(&format!("{}/x", server.uri())).err().unwrap().to_string();

    assert!(error.contains("201"));
  }

  #[test]
  fn test_http_get_attaches_basic_auth_from_netrc() {
    let rt = Runtime::new().expect("Failed to create runtime");
    let server = rt.block_on(MockServer::start());
    let (_temp_dir, netrc_path) = create_server_netrc("user", "pass");

    // base64("user:pass")
    rt.block_on(
      Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("Authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(1)
        .mount(&server),
    );

    let fetcher = HttpFetcher::with_netrc(&netrc_path);
    let stream = fetcher.get(&format!("{}/private", server.uri())).unwrap();

    assert_eq!(read_to_string(stream), "secret");
  }

  #[test]
  fn test_http_get_sends_no_auth_when_netrc_disabled() {
    let rt = Runtime::new().expect("Failed to create runtime");
    let server = rt.block_on(MockServer::start());

    // A usable netrc exists for the server's host, but the fetcher was
    // built without netrc support and must never read it.
    let (_temp_dir, _netrc_path) = create_server_netrc("user", "pass");

    rt.block_on(
      Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server),
    );

    let fetcher = HttpFetcher::new();
    fetcher.get(&format!("{}/public", server.uri())).unwrap();

    let requests = rt.block_on(server.received_requests()).expect("request recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
  }

  #[test]
  fn test_http_get_sends_no_auth_without_matching_entry() {
    let rt = Runtime::new().expect("Failed to create runtime");
    let server = rt.block_on(MockServer::start());

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let netrc_path = temp_dir.path().join(".netrc");
    fs::write(&netrc_path, "machine elsewhere.example.com login user password pass\n")
      .expect("Failed to write test .netrc");

    rt.block_on(
      Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("public bytes"))
        .mount(&server),
    );

    let fetcher = HttpFetcher::with_netrc(&netrc_path);
    let stream = fetcher.get(&format!("{}/public", server.uri())).unwrap();
    assert_eq!(read_to_string(stream), "public bytes");

    let requests = rt.block_on(server.received_requests()).expect("request recording enabled");
    assert!(requests[0].headers.get("authorization").is_none());
  }

  #[test]
  fn test_http_get_fails_when_netrc_file_is_missing() {
    let rt = Runtime::new().expect("Failed to create runtime");
    let server = rt.block_on(MockServer::start());

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let missing = temp_dir.path().join("does-not-exist");

    let fetcher = HttpFetcher::with_netrc(&missing);
    let error = fetcher.get(&format!("{}/x", server.uri())).err().unwrap();

    assert!(format!("{error:#}").contains("failed to load netrc credentials"));

    // The request was aborted before reaching the server
    let requests = rt.block_on(server.received_requests()).expect("request recording enabled");
    assert!(requests.is_empty());
  }

  // Tests for FileFetcher

  #[test]
  fn test_file_get_reads_configured_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let file_path = temp_dir.path().join("artifact.bin");
    fs::write(&file_path, "local bytes").expect("Failed to write test file");

    // The URI argument is ignored; the configured path is what gets read.
    let fetcher = FileFetcher::new(&file_path);
    let stream = fetcher.get("https://irrelevant.example.com/whatever").unwrap();

    assert_eq!(read_to_string(stream), "local bytes");
  }

  #[test]
  fn test_file_get_yields_independent_streams() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let file_path = temp_dir.path().join("artifact.bin");
    fs::write(&file_path, "same content twice").expect("Failed to write test file");

    let fetcher = FileFetcher::new(&file_path);
    let first = fetcher.get("").unwrap();
    let second = fetcher.get("").unwrap();

    assert_eq!(read_to_string(first), "same content twice");
    assert_eq!(read_to_string(second), "same content twice");
  }

  #[test]
  fn test_file_get_missing_path_is_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let missing = temp_dir.path().join("does-not-exist");

    let fetcher = FileFetcher::new(&missing);
    let error = fetcher.get("").err().unwrap().to_string();

    assert!(error.contains("does-not-exist"));
    assert!(error.contains("failed to open"));
  }
}
