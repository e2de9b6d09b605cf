use tracing::debug;

use super::error::ClientError;
use super::types::TreePage;
use super::uri::normalize_path;
use super::Client;

/// Fixed number of entries requested per tree page.
pub const TREE_PAGE_SIZE: u32 = 100;

/// Pull-based paginator over a git tree listing.
///
/// Nothing is fetched until [`advance`](TreePages::advance) (or
/// [`Iterator::next`]) is called, and each call fetches exactly one page.
/// Paging stops once the remote no longer answers `X-HasMore: true`, or after
/// the first failed request. Call [`Client::list_tree`] again to start over.
pub struct TreePages<'c> {
    client: &'c Client,
    prefix: Option<String>,
    recursive: bool,
    next_page: Option<u32>,
}

impl<'c> TreePages<'c> {
    pub(crate) fn new(client: &'c Client, directory: Option<&str>, recursive: bool) -> Self {
        let prefix = directory
            .map(normalize_path)
            .filter(|d| !d.is_empty())
            .map(|d| format!("{}/", d));
        // A shallow listing of the root cannot be narrowed to a subtree, so any
        // directory filter needs the full recursive tree.
        let recursive = recursive || prefix.is_some();
        Self {
            client,
            prefix,
            recursive,
            next_page: Some(1),
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Fetch the next page, or `None` once the listing is exhausted.
    pub fn advance(&mut self) -> Option<Result<TreePage, ClientError>> {
        let page = self.next_page.take()?;
        let (response, has_more) = match self.client.fetch_tree_page(self.recursive, page) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        if has_more {
            self.next_page = Some(page + 1);
        }

        let mut entries = response.tree;
        if let Some(prefix) = &self.prefix {
            entries.retain(|e| e.path.starts_with(prefix.as_str()));
        }
        debug!(page, entries = entries.len(), has_more, "tree page");

        Some(Ok(TreePage {
            page,
            entries,
            truncated: response.truncated,
            total_count: response.total_count,
        }))
    }
}

impl Iterator for TreePages<'_> {
    type Item = Result<TreePage, ClientError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}
