use std::fmt;

use thiserror::Error;

use crate::client::ClientError;

/// High-level filesystem operation a [`FilesystemError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Move,
    Copy,
    Delete,
    DeleteDirectory,
    CreateDirectory,
    ExistenceCheck,
    RetrieveMetadata,
    SetVisibility,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Read => "READ",
            Operation::Write => "WRITE",
            Operation::Move => "MOVE",
            Operation::Copy => "COPY",
            Operation::Delete => "DELETE",
            Operation::DeleteDirectory => "DELETE_DIRECTORY",
            Operation::CreateDirectory => "CREATE_DIRECTORY",
            Operation::ExistenceCheck => "EXISTENCE_CHECK",
            Operation::RetrieveMetadata => "RETRIEVE_METADATA",
            Operation::SetVisibility => "SET_VISIBILITY",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    FileSize,
    MimeType,
    LastModified,
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetadataKind::FileSize => "file_size",
            MetadataKind::MimeType => "mime_type",
            MetadataKind::LastModified => "last_modified",
        })
    }
}

/// Every failure the [`Filesystem`](super::Filesystem) surface reports.
///
/// Client errors never leak through on their own; they are the `source` of
/// the variant naming the operation that failed.
#[derive(Debug, Error)]
pub enum FilesystemError {
    #[error("unable to read file at {location}: {source}")]
    UnableToReadFile {
        location: String,
        #[source]
        source: ClientError,
    },

    #[error("unable to write file at {location}: {source}")]
    UnableToWriteFile {
        location: String,
        #[source]
        source: ClientError,
    },

    #[error("unable to move file from {from} to {to}: {source}")]
    UnableToMoveFile {
        from: String,
        to: String,
        #[source]
        source: ClientError,
    },

    #[error("unable to copy file from {from} to {to}: {source}")]
    UnableToCopyFile {
        from: String,
        to: String,
        #[source]
        source: ClientError,
    },

    #[error("unable to delete file at {location}: {source}")]
    UnableToDeleteFile {
        location: String,
        #[source]
        source: ClientError,
    },

    #[error("unable to delete directory {location} ({failed} failed): {source}")]
    UnableToDeleteDirectory {
        location: String,
        failed: usize,
        #[source]
        source: ClientError,
    },

    #[error("unable to create directory {location}: {source}")]
    UnableToCreateDirectory {
        location: String,
        #[source]
        source: ClientError,
    },

    #[error("unable to check existence of {location}: {source}")]
    UnableToCheckExistence {
        location: String,
        #[source]
        source: ClientError,
    },

    #[error("unable to retrieve {kind} of {location}: {reason}")]
    UnableToRetrieveMetadata {
        location: String,
        kind: MetadataKind,
        reason: String,
        #[source]
        source: Option<ClientError>,
    },

    #[error("unable to retrieve file tree of {location}: {source}")]
    UnableToRetrieveFileTree {
        location: String,
        #[source]
        source: ClientError,
    },

    #[error("visibility is not supported by the remote, requested for {location}")]
    UnsupportedVisibility { location: String },
}

impl FilesystemError {
    pub fn operation(&self) -> Operation {
        match self {
            FilesystemError::UnableToReadFile { .. } => Operation::Read,
            FilesystemError::UnableToWriteFile { .. } => Operation::Write,
            FilesystemError::UnableToMoveFile { .. } => Operation::Move,
            FilesystemError::UnableToCopyFile { .. } => Operation::Copy,
            FilesystemError::UnableToDeleteFile { .. } => Operation::Delete,
            FilesystemError::UnableToDeleteDirectory { .. } => Operation::DeleteDirectory,
            FilesystemError::UnableToCreateDirectory { .. } => Operation::CreateDirectory,
            FilesystemError::UnableToCheckExistence { .. } => Operation::ExistenceCheck,
            FilesystemError::UnableToRetrieveMetadata { .. } => Operation::RetrieveMetadata,
            FilesystemError::UnableToRetrieveFileTree { .. } => Operation::Read,
            FilesystemError::UnsupportedVisibility { .. } => Operation::SetVisibility,
        }
    }

    /// The client failure behind this error, if there was one.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            FilesystemError::UnableToReadFile { source, .. }
            | FilesystemError::UnableToWriteFile { source, .. }
            | FilesystemError::UnableToMoveFile { source, .. }
            | FilesystemError::UnableToCopyFile { source, .. }
            | FilesystemError::UnableToDeleteFile { source, .. }
            | FilesystemError::UnableToDeleteDirectory { source, .. }
            | FilesystemError::UnableToCreateDirectory { source, .. }
            | FilesystemError::UnableToCheckExistence { source, .. }
            | FilesystemError::UnableToRetrieveFileTree { source, .. } => Some(source),
            FilesystemError::UnableToRetrieveMetadata { source, .. } => source.as_ref(),
            FilesystemError::UnsupportedVisibility { .. } => None,
        }
    }
}
