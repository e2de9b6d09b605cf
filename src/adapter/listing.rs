use std::collections::{HashSet, VecDeque};

use crate::client::{EntryKind, TreeEntry, TreePage, TreePages};

use super::attributes::{DirectoryAttributes, FileAttributes, StorageAttributes};
use super::error::FilesystemError;
use super::PLACEHOLDER_FILE;

/// Lazy listing returned by [`Filesystem::list_contents`](super::Filesystem::list_contents).
///
/// Tree pages are pulled one at a time as records are consumed. Directory
/// records are yielded once each, whether the remote reported them or they
/// were inferred from the paths of deeper files. Placeholder files are left
/// out; their directory is listed instead.
pub struct Listing<'a> {
    pages: TreePages<'a>,
    base: String,
    deep: bool,
    pending: VecDeque<StorageAttributes>,
    seen_dirs: HashSet<String>,
}

impl<'a> Listing<'a> {
    pub(crate) fn new(pages: TreePages<'a>, base: String, deep: bool) -> Self {
        Self {
            pages,
            base,
            deep,
            pending: VecDeque::new(),
            seen_dirs: HashSet::new(),
        }
    }

    fn absorb(&mut self, page: TreePage) {
        for entry in page.entries {
            self.absorb_entry(entry);
        }
    }

    fn absorb_entry(&mut self, entry: TreeEntry) {
        let rel = if self.base.is_empty() {
            entry.path.as_str()
        } else {
            match entry
                .path
                .strip_prefix(self.base.as_str())
                .and_then(|r| r.strip_prefix('/'))
            {
                Some(r) if !r.is_empty() => r,
                _ => return,
            }
        };

        let segments: Vec<&str> = rel.split('/').collect();
        let ancestors = if self.deep { segments.len() - 1 } else { 1 };
        for depth in 1..=ancestors.min(segments.len() - 1) {
            let dir = self.join(&segments[..depth].join("/"));
            self.push_dir(dir);
        }
        if !self.deep && segments.len() > 1 {
            return;
        }

        match entry.kind() {
            EntryKind::Dir | EntryKind::Submodule => self.push_dir(entry.path),
            EntryKind::File | EntryKind::Symlink => {
                if segments.last() == Some(&PLACEHOLDER_FILE) {
                    return;
                }
                let mut attrs = FileAttributes::new(entry.path);
                attrs.file_size = entry.size;
                self.pending.push_back(StorageAttributes::File(attrs));
            }
        }
    }

    fn join(&self, rel: &str) -> String {
        if self.base.is_empty() {
            rel.to_string()
        } else {
            format!("{}/{}", self.base, rel)
        }
    }

    fn push_dir(&mut self, path: String) {
        if self.seen_dirs.insert(path.clone()) {
            self.pending
                .push_back(StorageAttributes::Directory(DirectoryAttributes::new(path)));
        }
    }
}

impl Iterator for Listing<'_> {
    type Item = Result<StorageAttributes, FilesystemError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(Ok(item));
            }
            match self.pages.next()? {
                Ok(page) => self.absorb(page),
                Err(source) => {
                    return Some(Err(FilesystemError::UnableToRetrieveFileTree {
                        location: self.base.clone(),
                        source,
                    }));
                }
            }
        }
    }
}
