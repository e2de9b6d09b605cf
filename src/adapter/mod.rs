//! Filesystem adapter over the repository content client.
//!
//! The remote stores files only. Directories are inferred from file paths and
//! an empty directory is kept alive by a [`PLACEHOLDER_FILE`] inside it. Every
//! mutation is a commit; the adapter writes the commit messages itself unless
//! [`WriteConfig::commit_message`] is given.

mod attributes;
mod error;
mod listing;

use std::io::Read;

use tracing::{debug, warn};

use crate::client::uri::normalize_path;
use crate::client::{Client, ClientError, EntryKind};

pub use attributes::{DirectoryAttributes, FileAttributes, StorageAttributes, Visibility};
pub use error::{FilesystemError, MetadataKind, Operation};
pub use listing::Listing;

pub type Result<T> = std::result::Result<T, FilesystemError>;

/// Name of the file that stands in for an otherwise empty directory.
pub const PLACEHOLDER_FILE: &str = ".gitkeep";

/// Options for mutating operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteConfig {
    /// Commit message to use instead of the generated one.
    pub commit_message: Option<String>,
}

impl WriteConfig {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            commit_message: Some(message.into()),
        }
    }

    fn message_or(&self, fallback: impl FnOnce() -> String) -> String {
        self.commit_message.clone().unwrap_or_else(fallback)
    }
}

/// The filesystem contract callers program against.
pub trait Filesystem {
    fn file_exists(&self, path: &str) -> Result<bool>;
    fn directory_exists(&self, path: &str) -> Result<bool>;
    fn read(&self, path: &str) -> Result<Vec<u8>>;
    fn read_stream(&self, path: &str) -> Result<Box<dyn Read>>;
    fn write(&self, path: &str, contents: &[u8], config: &WriteConfig) -> Result<()>;
    fn write_stream(&self, path: &str, contents: &mut dyn Read, config: &WriteConfig) -> Result<()>;
    fn delete(&self, path: &str) -> Result<()>;
    fn delete_directory(&self, path: &str) -> Result<()>;
    fn create_directory(&self, path: &str, config: &WriteConfig) -> Result<()>;
    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<()>;
    fn visibility(&self, path: &str) -> Result<FileAttributes>;
    fn mime_type(&self, path: &str) -> Result<FileAttributes>;
    fn last_modified(&self, path: &str) -> Result<FileAttributes>;
    fn file_size(&self, path: &str) -> Result<FileAttributes>;
    fn list_contents<'a>(
        &'a self,
        path: &str,
        deep: bool,
    ) -> Box<dyn Iterator<Item = Result<StorageAttributes>> + 'a>;
    fn move_file(&self, source: &str, destination: &str, config: &WriteConfig) -> Result<()>;
    fn copy(&self, source: &str, destination: &str, config: &WriteConfig) -> Result<()>;
}

pub struct GiteaAdapter {
    client: Client,
}

impl GiteaAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut Client {
        &mut self.client
    }

    pub fn set_client(&mut self, client: Client) {
        self.client = client;
    }

    pub fn into_client(self) -> Client {
        self.client
    }

    /// Lazy listing; see [`Listing`].
    pub fn listing(&self, path: &str, deep: bool) -> Listing<'_> {
        let base = normalize_path(path);
        let directory = (!base.is_empty()).then_some(base.as_str());
        let pages = self.client.list_tree(directory, deep);
        Listing::new(pages, base, deep)
    }

    /// Revision hash of the regular file at `path`, `None` when there is none.
    fn current_revision(&self, path: &str) -> std::result::Result<Option<String>, ClientError> {
        match self.client.read_metadata(path) {
            Ok(entry) => Ok(Some(entry.sha)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(ClientError::NotAFile { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether a regular file exists at `path`, with not-found folded into `false`.
    fn probe(&self, path: &str) -> std::result::Result<bool, ClientError> {
        Ok(self.current_revision(path)?.is_some())
    }

    /// Create or update `path` with a single revision lookup; the hash read
    /// here is the one sent back with the update.
    fn write_bytes(
        &self,
        path: &str,
        contents: &[u8],
        message: Option<String>,
    ) -> std::result::Result<(), ClientError> {
        let sha = self.current_revision(path)?;
        let message = message.unwrap_or_else(|| {
            let verb = if sha.is_some() { "Update" } else { "Create" };
            format!("{} {}", verb, normalize_path(path))
        });
        self.client.write_revision(path, contents, &message, sha)?;
        Ok(())
    }

    fn last_commit_timestamp(&self, path: &str) -> Result<i64> {
        let fail = |reason: String, source: Option<ClientError>| {
            FilesystemError::UnableToRetrieveMetadata {
                location: path.to_string(),
                kind: MetadataKind::LastModified,
                reason,
                source,
            }
        };

        let meta = self
            .client
            .read_metadata(path)
            .map_err(|e| fail(e.to_string(), Some(e)))?;
        let commit = match meta.last_commit_sha.as_deref() {
            Some(sha) => self
                .client
                .blame(sha)
                .map_err(|e| fail(e.to_string(), Some(e)))?,
            None => self
                .client
                .commits_for_path(path, 1)
                .map_err(|e| fail(e.to_string(), Some(e)))?
                .into_iter()
                .next()
                .ok_or_else(|| fail("no commit touches this path".into(), None))?,
        };
        Ok(commit.commit.committer.date.timestamp())
    }
}

impl Filesystem for GiteaAdapter {
    fn file_exists(&self, path: &str) -> Result<bool> {
        self.probe(path)
            .map_err(|source| FilesystemError::UnableToCheckExistence {
                location: path.to_string(),
                source,
            })
    }

    fn directory_exists(&self, path: &str) -> Result<bool> {
        let dir = normalize_path(path);
        if dir.is_empty() {
            return Ok(true);
        }
        let fail = |source| FilesystemError::UnableToCheckExistence {
            location: path.to_string(),
            source,
        };

        for page in self.client.list_tree(Some(&dir), true) {
            if !page.map_err(fail)?.entries.is_empty() {
                return Ok(true);
            }
        }
        self.probe(&format!("{}/{}", dir, PLACEHOLDER_FILE))
            .map_err(fail)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.client
            .read_raw(path)
            .map_err(|source| FilesystemError::UnableToReadFile {
                location: path.to_string(),
                source,
            })
    }

    fn read_stream(&self, path: &str) -> Result<Box<dyn Read>> {
        let stream = self
            .client
            .read_stream(path)
            .map_err(|source| FilesystemError::UnableToReadFile {
                location: path.to_string(),
                source,
            })?;
        Ok(Box::new(stream))
    }

    fn write(&self, path: &str, contents: &[u8], config: &WriteConfig) -> Result<()> {
        self.write_bytes(path, contents, config.commit_message.clone())
            .map_err(|source| FilesystemError::UnableToWriteFile {
                location: path.to_string(),
                source,
            })
    }

    fn write_stream(
        &self,
        path: &str,
        contents: &mut dyn Read,
        config: &WriteConfig,
    ) -> Result<()> {
        let mut buf = Vec::new();
        contents
            .read_to_end(&mut buf)
            .map_err(|e| FilesystemError::UnableToWriteFile {
                location: path.to_string(),
                source: ClientError::Stream(e),
            })?;
        self.write(path, &buf, config)
    }

    fn delete(&self, path: &str) -> Result<()> {
        let message = format!("Delete {}", normalize_path(path));
        self.client
            .delete(path, &message)
            .map_err(|source| FilesystemError::UnableToDeleteFile {
                location: path.to_string(),
                source,
            })
    }

    fn delete_directory(&self, path: &str) -> Result<()> {
        let dir = normalize_path(path);
        let list_failed = |source| FilesystemError::UnableToDeleteDirectory {
            location: path.to_string(),
            failed: 0,
            source,
        };

        // Every delete is a commit that reshapes the tree, so the whole
        // listing is collected before anything is removed.
        let mut files = Vec::new();
        for page in self.client.list_tree(Some(&dir), true) {
            files.extend(
                page.map_err(list_failed)?
                    .entries
                    .into_iter()
                    .filter(|e| matches!(e.kind(), EntryKind::File | EntryKind::Symlink))
                    .map(|e| e.path),
            );
        }
        debug!(dir = %dir, files = files.len(), "deleting directory");

        let message = format!("Delete directory {}", dir);
        let mut first_failure = None;
        let mut failed = 0;
        for file in &files {
            if let Err(e) = self.client.delete(file, &message) {
                warn!(file = %file, error = %e, "failed to delete file in directory");
                failed += 1;
                first_failure.get_or_insert(e);
            }
        }
        match first_failure {
            None => Ok(()),
            Some(source) => Err(FilesystemError::UnableToDeleteDirectory {
                location: path.to_string(),
                failed,
                source,
            }),
        }
    }

    fn create_directory(&self, path: &str, config: &WriteConfig) -> Result<()> {
        let dir = normalize_path(path);
        let placeholder = if dir.is_empty() {
            PLACEHOLDER_FILE.to_string()
        } else {
            format!("{}/{}", dir, PLACEHOLDER_FILE)
        };
        let message = config.message_or(|| format!("Create directory {}", dir));
        self.client
            .write(&placeholder, b"", &message, true)
            .map(|_| ())
            .map_err(|source| FilesystemError::UnableToCreateDirectory {
                location: path.to_string(),
                source,
            })
    }

    fn set_visibility(&self, path: &str, _visibility: Visibility) -> Result<()> {
        Err(FilesystemError::UnsupportedVisibility {
            location: path.to_string(),
        })
    }

    fn visibility(&self, path: &str) -> Result<FileAttributes> {
        Err(FilesystemError::UnsupportedVisibility {
            location: path.to_string(),
        })
    }

    fn mime_type(&self, path: &str) -> Result<FileAttributes> {
        let fail = |e: ClientError| FilesystemError::UnableToRetrieveMetadata {
            location: path.to_string(),
            kind: MetadataKind::MimeType,
            reason: e.to_string(),
            source: Some(e),
        };
        let meta = self.client.read_metadata(path).map_err(fail)?;
        let location = normalize_path(path);
        if let Some(mime) = mime_guess::from_path(&location).first() {
            return Ok(FileAttributes::new(location).with_mime_type(mime.essence_str()));
        }

        // No usable extension; sniff the content instead. Large files come
        // without inline content and are fetched raw.
        let contents = match meta.decoded_content().map_err(fail)? {
            Some(bytes) => bytes,
            None => self.client.read_raw(path).map_err(fail)?,
        };
        let mime = if std::str::from_utf8(&contents).is_ok() {
            "text/plain"
        } else {
            "application/octet-stream"
        };
        Ok(FileAttributes::new(location).with_mime_type(mime))
    }

    fn last_modified(&self, path: &str) -> Result<FileAttributes> {
        let timestamp = self.last_commit_timestamp(path)?;
        Ok(FileAttributes::new(normalize_path(path)).with_last_modified(timestamp))
    }

    fn file_size(&self, path: &str) -> Result<FileAttributes> {
        let meta =
            self.client
                .read_metadata(path)
                .map_err(|e| FilesystemError::UnableToRetrieveMetadata {
                    location: path.to_string(),
                    kind: MetadataKind::FileSize,
                    reason: e.to_string(),
                    source: Some(e),
                })?;
        Ok(FileAttributes::new(meta.path).with_file_size(meta.size))
    }

    fn list_contents<'a>(
        &'a self,
        path: &str,
        deep: bool,
    ) -> Box<dyn Iterator<Item = Result<StorageAttributes>> + 'a> {
        Box::new(self.listing(path, deep))
    }

    /// Write-then-delete. Not atomic: if the delete fails the destination
    /// already exists and the error still reports a failed move.
    fn move_file(&self, source: &str, destination: &str, config: &WriteConfig) -> Result<()> {
        let (from, to) = (normalize_path(source), normalize_path(destination));
        if from == to {
            return Ok(());
        }
        let fail = |source| FilesystemError::UnableToMoveFile {
            from: from.clone(),
            to: to.clone(),
            source,
        };
        let message = config.message_or(|| format!("Move {} to {}", from, to));

        let contents = self.client.read_raw(&from).map_err(fail)?;
        self.write_bytes(&to, &contents, Some(message.clone()))
            .map_err(fail)?;
        self.client.delete(&from, &message).map_err(|e| {
            warn!(from = %from, to = %to, "destination written but source not deleted");
            fail(e)
        })
    }

    fn copy(&self, source: &str, destination: &str, config: &WriteConfig) -> Result<()> {
        let (from, to) = (normalize_path(source), normalize_path(destination));
        let fail = |source| FilesystemError::UnableToCopyFile {
            from: from.clone(),
            to: to.clone(),
            source,
        };
        let message = config.message_or(|| format!("Copy {} to {}", from, to));

        let contents = self.client.read_raw(&from).map_err(fail)?;
        self.write_bytes(&to, &contents, Some(message))
            .map_err(fail)
    }
}
