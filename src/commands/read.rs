use anyhow::{Context, Result};
use chrono::DateTime;
use colored::Colorize;
use std::io::{self, Write};

use crate::adapter::{Filesystem, FilesystemError, StorageAttributes};

use super::progress::with_spinner;

/// `gfs cat`: stream the raw file to `out`.
pub fn cmd_cat(fs: &dyn Filesystem, path: &str, out: &mut dyn Write) -> Result<()> {
    let mut stream = fs.read_stream(path)?;
    io::copy(&mut stream, out).with_context(|| format!("failed to read {}", path))?;
    out.flush()?;
    Ok(())
}

/// Output format for `gfs ls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Human,
    Json,
}

/// `gfs ls`: one line per record, in the order the remote pages arrive.
///
/// Example output:
/// ```text
///          -  docs/
///       1065  LICENSE
///         37  README.md
/// ```
pub fn cmd_ls(
    fs: &dyn Filesystem,
    path: &str,
    deep: bool,
    format: ListFormat,
    out: &mut dyn Write,
) -> Result<()> {
    for item in fs.list_contents(path, deep) {
        let item = item?;
        let line = match format {
            ListFormat::Human => format_entry(&item),
            ListFormat::Json => serde_json::to_string(&item)?,
        };
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn format_entry(item: &StorageAttributes) -> String {
    match item {
        StorageAttributes::Directory(d) => {
            format!("{:>10}  {}", "-", format!("{}/", d.path).blue().bold())
        }
        StorageAttributes::File(f) => {
            let size = f
                .file_size
                .map(|s| s.to_string())
                .unwrap_or_else(|| "?".to_string());
            format!("{:>10}  {}", size, f.path)
        }
    }
}

/// `gfs stat`: size, mime type and last commit time of a file.
pub fn cmd_stat(fs: &dyn Filesystem, path: &str, out: &mut dyn Write) -> Result<()> {
    let (size, mime, modified) = with_spinner(format!("stat {}", path), || {
        let size = fs.file_size(path)?;
        let mime = fs.mime_type(path)?;
        let modified = fs.last_modified(path)?;
        Ok::<_, FilesystemError>((size, mime, modified))
    })?;

    let when = modified
        .last_modified
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());

    writeln!(out, "{:<15}{}", "path:".dimmed(), size.path)?;
    writeln!(out, "{:<15}{}", "size:".dimmed(), size.file_size.unwrap_or_default())?;
    writeln!(out, "{:<15}{}", "mime type:".dimmed(), mime.mime_type.unwrap_or_default())?;
    writeln!(out, "{:<15}{}", "last modified:".dimmed(), when)?;
    Ok(())
}

/// `gfs exists`: prints `true`/`false` and returns the answer for the exit code.
pub fn cmd_exists(fs: &dyn Filesystem, path: &str, dir: bool, out: &mut dyn Write) -> Result<bool> {
    let found = if dir {
        fs.directory_exists(path)?
    } else {
        fs.file_exists(path)?
    };
    let label = if found { "true".green() } else { "false".red() };
    writeln!(out, "{}", label)?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::GiteaAdapter;
    use crate::client::fixtures::*;
    use httpmock::prelude::*;

    fn plain() {
        colored::control::set_override(false);
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cat_copies_raw_bytes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(api_path("raw/README.md"));
            then.status(200).body("# hello\n");
        });
        let fs = GiteaAdapter::new(client_for(&server));

        let out = render(|w| cmd_cat(&fs, "README.md", w));
        assert_eq!(out, "# hello\n");
    }

    #[test]
    fn ls_prints_directories_and_sizes() {
        plain();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(api_path("git/trees/main"));
            then.status(200)
                .json_body(tree_json(&[("docs", "tree"), ("README.md", "blob")]));
        });
        let fs = GiteaAdapter::new(client_for(&server));

        let out = render(|w| cmd_ls(&fs, "/", false, ListFormat::Human, w));
        assert_eq!(out, "         -  docs/\n        10  README.md\n");
    }

    #[test]
    fn ls_json_tags_each_record() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(api_path("git/trees/main"));
            then.status(200).json_body(tree_json(&[("docs", "tree")]));
        });
        let fs = GiteaAdapter::new(client_for(&server));

        let out = render(|w| cmd_ls(&fs, "", true, ListFormat::Json, w));
        let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["type"], "dir");
        assert_eq!(v["path"], "docs");
    }

    #[test]
    fn ls_surfaces_listing_errors() {
        let server = MockServer::start();
        let fs = GiteaAdapter::new(client_for(&server));

        let mut buf = Vec::new();
        assert!(cmd_ls(&fs, "/", false, ListFormat::Human, &mut buf).is_err());
    }

    #[test]
    fn stat_reports_size_mime_and_commit_time() {
        plain();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(api_path("contents/data.json"));
            then.status(200).json_body(file_json("data.json", "abc", b"{}"));
        });
        server.mock(|when, then| {
            when.method(GET).path(api_path("git/commits/c0ffee"));
            then.status(200)
                .json_body(commit_json("c0ffee", "2023-11-17T15:54:33Z"));
        });
        let fs = GiteaAdapter::new(client_for(&server));

        let out = render(|w| cmd_stat(&fs, "data.json", w));
        assert!(out.contains("size:          2\n"));
        assert!(out.contains("mime type:     application/json\n"));
        assert!(out.contains("last modified: 2023-11-17T15:54:33+00:00\n"));
    }

    #[test]
    fn exists_prints_and_returns_answer() {
        plain();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(api_path("contents/missing.md"));
            then.status(404);
        });
        let fs = GiteaAdapter::new(client_for(&server));

        let mut buf = Vec::new();
        assert!(!cmd_exists(&fs, "missing.md", false, &mut buf).unwrap());
        assert_eq!(String::from_utf8(buf).unwrap(), "false\n");

        let mut buf = Vec::new();
        assert!(cmd_exists(&fs, "/", true, &mut buf).unwrap());
    }
}
