use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use std::{env, fs};

use crate::client::{Client, Coordinates};
use crate::paths::paths;

/// Environment variable that takes precedence over `token` in the file.
pub const TOKEN_ENV: &str = "GITEA_TOKEN";

/// Connection settings loaded from `config.toml`.
///
/// Example TOML:
/// ```toml
/// base_url   = "https://gitea.example.com"
/// owner      = "alice"
/// repository = "notes"
/// branch     = "main"
/// token      = "..."
/// timeout_secs = 30
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub owner: String,
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Values given on the command line; each one replaces its config key.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub owner: Option<String>,
    pub repository: Option<String>,
    pub branch: Option<String>,
}

impl Config {
    pub fn parse(txt: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(txt).context("failed to parse config.toml")?;
        if cfg.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        Ok(cfg)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(owner) = &overrides.owner {
            self.owner = owner.clone();
        }
        if let Some(repo) = &overrides.repository {
            self.repository = repo.clone();
        }
        if let Some(branch) = &overrides.branch {
            self.branch = branch.clone();
        }
    }

    fn apply_env(&mut self) {
        if let Some(token) = env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        let coords = Coordinates::new(&self.base_url, &self.owner, &self.repository, &self.branch);
        match &self.token {
            Some(t) => coords.with_token(t),
            None => coords,
        }
    }

    pub fn client(&self) -> Result<Client> {
        let timeout = self.timeout_secs.map(Duration::from_secs);
        Client::with_timeout(self.coordinates(), timeout).context("failed to build http client")
    }
}

/// Load `config.toml` from the giteafs home, then apply `GITEA_TOKEN`.
///
/// # Errors
/// - The file is missing (the message includes the resolved path).
/// - The TOML is invalid or `base_url` is empty.
pub fn load_config() -> Result<Config> {
    let p = paths()?;
    load_config_from(&p.config)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("config not found: {}", path.display()))?;
    let mut cfg = Config::parse(&txt)?;
    cfg.apply_env();
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const MINIMAL: &str = r#"
base_url = "https://gitea.example.com/"
owner = "alice"
repository = "notes"
"#;

    #[test]
    fn branch_defaults_to_main() {
        let cfg = Config::parse(MINIMAL).unwrap();
        assert_eq!(cfg.branch, "main");
        assert_eq!(cfg.token, None);
        assert_eq!(cfg.timeout_secs, None);
    }

    #[test]
    fn missing_required_key_fails() {
        let err = Config::parse("owner = \"alice\"").unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let txt = "base_url = \" \"\nowner = \"a\"\nrepository = \"r\"";
        assert!(Config::parse(txt).is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = Config::parse(MINIMAL).unwrap();
        cfg.apply(&Overrides {
            owner: None,
            repository: Some("wiki".into()),
            branch: Some("dev".into()),
        });
        assert_eq!(cfg.owner, "alice");
        assert_eq!(cfg.repository, "wiki");
        assert_eq!(cfg.branch, "dev");
    }

    #[test]
    fn coordinates_carry_token() {
        let mut cfg = Config::parse(MINIMAL).unwrap();
        cfg.token = Some("secret".into());
        let coords = cfg.coordinates();
        assert_eq!(coords.username, "alice");
        assert_eq!(coords.repository, "notes");
        assert_eq!(coords.token.as_deref(), Some("secret"));
    }

    #[test]
    #[serial]
    fn env_token_wins_over_file() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("config.toml");
        fs::write(&path, format!("{}token = \"from-file\"\n", MINIMAL)).unwrap();

        unsafe { env::set_var(TOKEN_ENV, "from-env") };
        let cfg = load_config_from(&path).unwrap();
        unsafe { env::remove_var(TOKEN_ENV) };

        assert_eq!(cfg.token.as_deref(), Some("from-env"));
    }

    #[test]
    #[serial]
    fn file_token_used_without_env() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("config.toml");
        fs::write(&path, format!("{}token = \"from-file\"\ntimeout_secs = 5\n", MINIMAL)).unwrap();

        unsafe { env::remove_var(TOKEN_ENV) };
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.token.as_deref(), Some("from-file"));
        assert_eq!(cfg.timeout_secs, Some(5));
    }

    #[test]
    #[serial]
    fn load_config_reads_from_home() {
        let td = tempfile::tempdir().unwrap();
        unsafe { env::set_var("XDG_CONFIG_HOME", td.path()) };
        let dir = td.path().join(".giteafs");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), MINIMAL).unwrap();

        let cfg = load_config().unwrap();
        unsafe { env::remove_var("XDG_CONFIG_HOME") };

        assert_eq!(cfg.owner, "alice");
    }

    #[test]
    fn missing_file_names_the_path() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("nope.toml");
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }
}
