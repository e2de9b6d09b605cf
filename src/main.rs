//! # giteafs (gfs)
//!
//! **gfs** works on the files of a Gitea repository branch without a clone.
//!
//! Features:
//! - Connection settings in `$(gfs home)/config.toml`
//! - `gfs cat`, `gfs put`, `gfs rm`, `gfs mv`, `gfs cp` operate on single files
//! - `gfs ls`, `gfs mkdir`, `gfs rmdir` operate on directories
//! - `gfs stat` and `gfs exists` inspect paths
//! - Every change is a commit on the configured branch
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use giteafs::commands::{
    ListFormat, cmd_cat, cmd_cp, cmd_exists, cmd_home, cmd_ls, cmd_mkdir, cmd_mv, cmd_put,
    cmd_rm, cmd_rmdir, cmd_stat,
};
use giteafs::{GiteaAdapter, Overrides, load_config, load_config_from, logging};

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "gfs",
    version,
    about = "giteafs (gfs) - files of a Gitea repository as a filesystem",
    arg_required_else_help = true
)]
struct Cli {
    /// Branch to operate on instead of the configured one
    #[arg(long, global = true)]
    branch: Option<String>,
    /// Repository name instead of the configured one
    #[arg(long, global = true)]
    repo: Option<String>,
    /// Repository owner instead of the configured one
    #[arg(long, global = true)]
    owner: Option<String>,
    /// Read this config file instead of $(gfs home)/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print a file to stdout
    Cat { path: String },
    /// Upload a local file (or stdin) to a path
    Put {
        path: String,
        /// Local file to upload; stdin when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Delete a file
    Rm { path: String },
    /// Move a file
    Mv {
        from: String,
        to: String,
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Copy a file
    Cp {
        from: String,
        to: String,
        #[arg(short, long)]
        message: Option<String>,
    },
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
        /// Include everything below the directory
        #[arg(short, long)]
        recursive: bool,
        /// One JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Create a directory placeholder
    Mkdir {
        path: String,
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Delete every file under a directory
    Rmdir { path: String },
    /// Show size, mime type and last commit time of a file
    Stat { path: String },
    /// Exit 0 if the path exists, 1 otherwise
    Exists {
        path: String,
        /// Check for a directory instead of a file
        #[arg(short, long)]
        dir: bool,
    },
    /// Print the giteafs home directory
    Home,
}

fn adapter(cli: &Cli) -> Result<GiteaAdapter> {
    let mut cfg = match &cli.config {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    cfg.apply(&Overrides {
        owner: cli.owner.clone(),
        repository: cli.repo.clone(),
        branch: cli.branch.clone(),
    });
    Ok(GiteaAdapter::new(cfg.client()?))
}

/// CLI entry point.
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(cmd) = &cli.cmd else {
        return Ok(ExitCode::SUCCESS);
    };
    // `home` needs no config.
    if let Cmd::Home = cmd {
        cmd_home()?;
        return Ok(ExitCode::SUCCESS);
    }

    let fs = adapter(&cli)?;
    let mut out = io::stdout().lock();
    match cmd {
        Cmd::Cat { path } => cmd_cat(&fs, path, &mut out)?,
        Cmd::Put {
            path,
            file,
            message,
        } => cmd_put(&fs, path, file.as_deref(), message.clone())?,
        Cmd::Rm { path } => cmd_rm(&fs, path)?,
        Cmd::Mv { from, to, message } => cmd_mv(&fs, from, to, message.clone())?,
        Cmd::Cp { from, to, message } => cmd_cp(&fs, from, to, message.clone())?,
        Cmd::Ls {
            path,
            recursive,
            json,
        } => {
            let format = if *json {
                ListFormat::Json
            } else {
                ListFormat::Human
            };
            cmd_ls(&fs, path, *recursive, format, &mut out)?
        }
        Cmd::Mkdir { path, message } => cmd_mkdir(&fs, path, message.clone())?,
        Cmd::Rmdir { path } => cmd_rmdir(&fs, path)?,
        Cmd::Stat { path } => cmd_stat(&fs, path, &mut out)?,
        Cmd::Exists { path, dir } => {
            if !cmd_exists(&fs, path, *dir, &mut out)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Cmd::Home => {}
    }
    Ok(ExitCode::SUCCESS)
}
