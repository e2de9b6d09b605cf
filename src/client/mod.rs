//! Repository content client.
//!
//! Translates filesystem-like verbs into requests against a Gitea-compatible
//! `/api/v1` content, raw, tree and commit API, and decodes the responses into
//! the typed records in [`types`].
//!
//! A [`Client`] owns its [`Coordinates`]. They can be changed between calls
//! through `&mut self`, so one client belongs to one logical session.

mod error;
#[cfg(test)]
pub(crate) mod fixtures;
mod tree;
mod types;
pub mod uri;

use std::io::{self, Read};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

pub use error::ClientError;
pub use tree::{TREE_PAGE_SIZE, TreePages};
pub use types::{
    CommitDetail, CommitInfo, CommitUser, EntryKind, FileEntry, TreeEntry, TreePage,
};

use types::{DeletePayload, FileResponse, TreeResponse, WritePayload};
use uri::{encode_path, normalize_path, repo_url, with_query};

pub type Result<T> = std::result::Result<T, ClientError>;

/// Response header the remote sets to `true` while more tree pages remain.
pub const HAS_MORE_HEADER: &str = "x-hasmore";

/// Where requests go and who they are made as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub base_url: String,
    pub username: String,
    pub repository: String,
    pub branch: String,
    pub token: Option<String>,
}

impl Coordinates {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            repository: repository.into(),
            branch: branch.into(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer {token}` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Raw file body handed out by [`Client::read_stream`].
///
/// Reads straight from the open response; it can be consumed once and the
/// connection is released when it is dropped.
pub struct RawStream {
    inner: Response,
}

impl Read for RawStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

pub struct Client {
    coords: Coordinates,
    http: HttpClient,
}

impl Client {
    /// Build a client using the transport's default timeout.
    ///
    /// # Errors
    /// - Returns [`ClientError::Build`] if the HTTP client cannot be built
    ///   (for example, the TLS backend fails to initialize).
    pub fn new(coords: Coordinates) -> Result<Self> {
        Self::with_timeout(coords, None)
    }

    /// Build a client whose requests give up after `timeout`.
    ///
    /// # Errors
    /// - Returns [`ClientError::Build`] if the HTTP client cannot be built.
    pub fn with_timeout(coords: Coordinates, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("giteafs/", env!("CARGO_PKG_VERSION"))),
        );
        let mut builder = HttpClient::builder().default_headers(headers);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build().map_err(ClientError::Build)?;
        Ok(Self { coords, http })
    }

    /// Coordinates used for the next request.
    pub fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    /// Host URL as configured, before `/api/v1` is appended.
    pub fn base_url(&self) -> &str {
        &self.coords.base_url
    }

    /// Branch every read, write and listing targets.
    pub fn branch(&self) -> &str {
        &self.coords.branch
    }

    /// Point subsequent requests at another branch.
    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.coords.branch = branch.into();
    }

    pub fn token(&self) -> Option<&str> {
        self.coords.token.as_deref()
    }

    /// Replace the bearer token; `None` sends requests unauthenticated.
    pub fn set_token(&mut self, token: Option<String>) {
        self.coords.token = token;
    }

    pub fn username(&self) -> &str {
        &self.coords.username
    }

    /// Owner (user or organization) of the repository.
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.coords.username = username.into();
    }

    pub fn repository(&self) -> &str {
        &self.coords.repository
    }

    pub fn set_repository(&mut self, repository: impl Into<String>) {
        self.coords.repository = repository.into();
    }

    /// Fetch the raw bytes of a file.
    pub fn read_raw(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.raw_url(path);
        let resp = self.send(self.request(Method::GET, &url)?, Method::GET, &url)?;
        let bytes = resp.bytes().map_err(|source| ClientError::Transport {
            url: url.clone(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    /// Fetch file metadata, including the current revision hash.
    ///
    /// Paths naming a directory fail with [`ClientError::NotAFile`].
    pub fn read_metadata(&self, path: &str) -> Result<FileEntry> {
        let path = normalize_path(path);
        let url = with_query(
            repo_url(&self.coords, &format!("contents/{}", encode_path(&path))),
            &[("ref", &self.coords.branch)],
        );
        let resp = self.send(self.request(Method::GET, &url)?, Method::GET, &url)?;
        let value: serde_json::Value = decode_json(&url, resp)?;
        // The contents endpoint answers with the directory listing for dirs.
        if value.is_array() {
            return Err(ClientError::NotAFile { path });
        }
        serde_json::from_value(value).map_err(|source| ClientError::Decode { url, source })
    }

    /// Open the raw file body as a reader without buffering it.
    pub fn read_stream(&self, path: &str) -> Result<RawStream> {
        let url = self.raw_url(path);
        let resp = self.send(self.request(Method::GET, &url)?, Method::GET, &url)?;
        Ok(RawStream { inner: resp })
    }

    /// Commit `contents` to `path`.
    ///
    /// Without `overwrite` this is a create and the remote rejects it if the
    /// path exists. With `overwrite` the current revision hash is looked up
    /// first and sent along; a path that turns out not to exist is created.
    pub fn write(
        &self,
        path: &str,
        contents: &[u8],
        message: &str,
        overwrite: bool,
    ) -> Result<FileEntry> {
        let path = normalize_path(path);
        let sha = if overwrite {
            self.current_sha(&path)?
        } else {
            None
        };
        self.write_revision(&path, contents, message, sha)
    }

    /// Commit `contents` to `path` against a known revision hash.
    ///
    /// `Some(sha)` updates the file with `PUT`; `None` creates it with `POST`.
    /// No lookup is made, so the caller decides which revision it overwrites.
    pub fn write_revision(
        &self,
        path: &str,
        contents: &[u8],
        message: &str,
        sha: Option<String>,
    ) -> Result<FileEntry> {
        let path = normalize_path(path);
        let method = if sha.is_some() {
            Method::PUT
        } else {
            Method::POST
        };
        let payload = WritePayload {
            content: STANDARD.encode(contents),
            message,
            branch: &self.coords.branch,
            signoff: false,
            sha,
        };
        let url = repo_url(&self.coords, &format!("contents/{}", encode_path(&path)));
        let req = self.request(method.clone(), &url)?.json(&payload);
        let resp = self.send(req, method, &url)?;
        let written: FileResponse = decode_json(&url, resp)?;
        Ok(written.content)
    }

    /// Drain `reader` and commit its bytes via [`Client::write`].
    pub fn write_stream<R: Read>(
        &self,
        path: &str,
        mut reader: R,
        message: &str,
        overwrite: bool,
    ) -> Result<FileEntry> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).map_err(ClientError::Stream)?;
        self.write(path, &buf, message, overwrite)
    }

    /// Delete `path` in a new commit.
    ///
    /// The revision hash is resolved first, so a missing path fails on that
    /// lookup and no delete request is sent.
    pub fn delete(&self, path: &str, message: &str) -> Result<()> {
        let path = normalize_path(path);
        let existing = self.read_metadata(&path)?;
        let payload = DeletePayload {
            message,
            branch: &self.coords.branch,
            sha: existing.sha,
        };
        let url = repo_url(&self.coords, &format!("contents/{}", encode_path(&path)));
        let req = self.request(Method::DELETE, &url)?.json(&payload);
        self.send(req, Method::DELETE, &url)?;
        Ok(())
    }

    /// Page through the repository tree at the current branch.
    ///
    /// With a `directory`, the listing is forced recursive and narrowed to
    /// entries below that directory. See [`TreePages`].
    pub fn list_tree(&self, directory: Option<&str>, recursive: bool) -> TreePages<'_> {
        TreePages::new(self, directory, recursive)
    }

    /// Fetch a single commit.
    pub fn blame(&self, commit_sha: &str) -> Result<CommitInfo> {
        let url = with_query(
            repo_url(
                &self.coords,
                &format!("git/commits/{}", urlencoding::encode(commit_sha)),
            ),
            &[("ref", &self.coords.branch)],
        );
        let resp = self.send(self.request(Method::GET, &url)?, Method::GET, &url)?;
        decode_json(&url, resp)
    }

    /// Most recent commits on the current branch touching `path`, newest first.
    pub fn commits_for_path(&self, path: &str, limit: u32) -> Result<Vec<CommitInfo>> {
        let path = normalize_path(path);
        let limit = limit.to_string();
        let url = with_query(
            repo_url(&self.coords, "commits"),
            &[
                ("sha", &self.coords.branch),
                ("path", &path),
                ("limit", &limit),
                ("stat", "false"),
                ("verification", "false"),
                ("files", "false"),
            ],
        );
        let resp = self.send(self.request(Method::GET, &url)?, Method::GET, &url)?;
        decode_json(&url, resp)
    }

    pub(crate) fn fetch_tree_page(&self, recursive: bool, page: u32) -> Result<(TreeResponse, bool)> {
        let page_str = page.to_string();
        let limit = TREE_PAGE_SIZE.to_string();
        let url = with_query(
            repo_url(
                &self.coords,
                &format!("git/trees/{}", urlencoding::encode(&self.coords.branch)),
            ),
            &[
                ("ref", &self.coords.branch),
                ("recursive", if recursive { "true" } else { "false" }),
                ("limit", &limit),
                ("page", &page_str),
            ],
        );
        let resp = self.send(self.request(Method::GET, &url)?, Method::GET, &url)?;
        let has_more = resp
            .headers()
            .get(HAS_MORE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        let tree: TreeResponse = decode_json(&url, resp)?;
        Ok((tree, has_more))
    }

    fn current_sha(&self, path: &str) -> Result<Option<String>> {
        match self.read_metadata(path) {
            Ok(entry) => Ok(Some(entry.sha)),
            Err(e) if e.is_not_found() => {
                debug!(path, "no existing revision, creating");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn raw_url(&self, path: &str) -> String {
        with_query(
            repo_url(
                &self.coords,
                &format!("raw/{}", encode_path(&normalize_path(path))),
            ),
            &[("ref", &self.coords.branch)],
        )
    }

    fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.coords.token {
            req = req.header(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
        }
        Ok(req)
    }

    fn send(&self, req: RequestBuilder, method: Method, url: &str) -> Result<Response> {
        debug!(%method, url, "request");
        let resp = req.send().map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            debug!(%method, url, %status, "request failed");
            return Err(ClientError::Status {
                method,
                url: url.to_string(),
                status,
                body,
            });
        }
        Ok(resp)
    }
}

fn decode_json<T: DeserializeOwned>(url: &str, resp: Response) -> Result<T> {
    let bytes = resp.bytes().map_err(|source| ClientError::Transport {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}
