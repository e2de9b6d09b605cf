//! Subcommands of the `gfs` binary. Each one drives a [`Filesystem`](crate::adapter::Filesystem).

mod progress;
mod read;
mod write;

use anyhow::Result;

use crate::paths::paths;

pub use read::{ListFormat, cmd_cat, cmd_exists, cmd_ls, cmd_stat};
pub use write::{cmd_cp, cmd_mkdir, cmd_mv, cmd_put, cmd_rm, cmd_rmdir};

pub fn cmd_home() -> Result<()> {
    println!("{}", paths()?.home.display());
    Ok(())
}
