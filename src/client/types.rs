use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::error::ClientError;

/// Object kinds as reported by the contents endpoint (`file`, `dir`, ...) and
/// by the git trees endpoint (`blob`, `tree`, `commit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "file", alias = "blob")]
    File,
    #[serde(rename = "dir", alias = "tree")]
    Dir,
    #[serde(rename = "submodule", alias = "commit")]
    Submodule,
    #[serde(rename = "symlink")]
    Symlink,
}

/// Git mode of a symbolic link blob.
const SYMLINK_MODE: &str = "120000";

/// Metadata of a single file as returned by `GET contents/{path}`.
///
/// `sha` is the revision hash the remote demands back on overwrite and delete.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub last_commit_sha: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl FileEntry {
    /// Decode the base64 `content` field, if the remote included one.
    ///
    /// The remote wraps long base64 payloads across lines, so whitespace is
    /// dropped before decoding.
    pub fn decoded_content(&self) -> Result<Option<Vec<u8>>, ClientError> {
        let Some(encoded) = self.content.as_deref() else {
            return Ok(None);
        };
        let compact: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD
            .decode(compact)
            .map(Some)
            .map_err(|source| ClientError::Content {
                path: self.path.clone(),
                source,
            })
    }
}

/// One entry of a git tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub entry_type: EntryKind,
    pub sha: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeEntry {
    /// Kind of the entry; symlinks travel as blobs and are told apart by mode.
    pub fn kind(&self) -> EntryKind {
        if self.entry_type == EntryKind::File && self.mode == SYMLINK_MODE {
            EntryKind::Symlink
        } else {
            self.entry_type
        }
    }
}

/// A single page produced by [`TreePages`](super::TreePages).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePage {
    pub page: u32,
    pub entries: Vec<TreeEntry>,
    pub truncated: bool,
    pub total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub total_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitUser {
    pub name: String,
    pub email: String,
    pub date: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: CommitUser,
    pub committer: CommitUser,
}

/// Commit metadata from `GET git/commits/{sha}` or `GET commits`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileResponse {
    pub content: FileEntry,
}

#[derive(Debug, Serialize)]
pub(crate) struct WritePayload<'a> {
    pub content: String,
    pub message: &'a str,
    pub branch: &'a str,
    pub signoff: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeletePayload<'a> {
    pub message: &'a str,
    pub branch: &'a str,
    pub sha: String,
}
