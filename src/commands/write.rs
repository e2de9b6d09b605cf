use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::adapter::{Filesystem, WriteConfig};

use super::progress::with_spinner;

fn write_config(message: Option<String>) -> WriteConfig {
    WriteConfig {
        commit_message: message,
    }
}

/// `gfs put`: upload `source` (or stdin) to `path`, creating or updating it.
pub fn cmd_put(
    fs: &dyn Filesystem,
    path: &str,
    source: Option<&Path>,
    message: Option<String>,
) -> Result<()> {
    let mut reader: Box<dyn Read> = match source {
        Some(p) => Box::new(
            File::open(p).with_context(|| format!("failed to open {}", p.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    let cfg = write_config(message);
    with_spinner(format!("writing {}", path), || {
        fs.write_stream(path, &mut reader, &cfg)
    })?;
    Ok(())
}

pub fn cmd_rm(fs: &dyn Filesystem, path: &str) -> Result<()> {
    with_spinner(format!("deleting {}", path), || fs.delete(path))?;
    Ok(())
}

pub fn cmd_mv(fs: &dyn Filesystem, from: &str, to: &str, message: Option<String>) -> Result<()> {
    let cfg = write_config(message);
    with_spinner(format!("moving {} to {}", from, to), || {
        fs.move_file(from, to, &cfg)
    })?;
    Ok(())
}

pub fn cmd_cp(fs: &dyn Filesystem, from: &str, to: &str, message: Option<String>) -> Result<()> {
    let cfg = write_config(message);
    with_spinner(format!("copying {} to {}", from, to), || fs.copy(from, to, &cfg))?;
    Ok(())
}

pub fn cmd_mkdir(fs: &dyn Filesystem, path: &str, message: Option<String>) -> Result<()> {
    let cfg = write_config(message);
    with_spinner(format!("creating directory {}", path), || {
        fs.create_directory(path, &cfg)
    })?;
    Ok(())
}

/// `gfs rmdir`: one commit per file under `path`.
pub fn cmd_rmdir(fs: &dyn Filesystem, path: &str) -> Result<()> {
    with_spinner(format!("deleting directory {}", path), || {
        fs.delete_directory(path)
    })?;
    Ok(())
}
