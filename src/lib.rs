//! Crate entry point for **giteafs**.
//!
//! Exposes the files of a Gitea repository branch as a filesystem. The
//! [`client`] module speaks the remote content API; the [`adapter`] module
//! builds the [`Filesystem`] contract on top of it. The rest backs the `gfs`
//! binary.

pub mod adapter;
pub mod client;
pub mod commands;
pub mod config;
pub mod logging;
mod paths;

/// Re-export commonly used types so they can be accessed from `giteafs::*`.
pub use adapter::{Filesystem, FilesystemError, GiteaAdapter, StorageAttributes, WriteConfig};
pub use client::{Client, ClientError, Coordinates};
pub use config::{Config, Overrides, load_config, load_config_from};
pub use paths::giteafs_home;
