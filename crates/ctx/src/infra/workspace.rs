//! Directory conventions for configuration and fragments.
//!
//! Global state lives under `<config home>/.ctx/` (`config.toml` and `fragments/`), where the
//! config home is `$XDG_CONFIG_HOME` or `~/.config`. Project state lives under
//! `<project root>/.ctx/`, the project root being the nearest ancestor holding `.git`, or the
//! working directory when there is none.

use std::env;
use std::path::{Path, PathBuf};

use crate::infra::config::{Config, ConfigError};

pub const CTX_DIR: &str = ".ctx";
pub const CONFIG_FILE: &str = "config.toml";
pub const FRAGMENTS_DIR: &str = "fragments";

/// Resolved filesystem locations for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    /// Directory holding global state (`<config home>/.ctx`).
    pub ctx_home: PathBuf,
    /// Global configuration file, or the one passed with `--config-file`.
    pub config_path: PathBuf,
    pub project_root: PathBuf,
    pub cwd: PathBuf,
}

impl Locations {
    /// Discover locations from the environment and current directory.
    pub fn discover(config_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let cwd = env::current_dir().map_err(|source| ConfigError::Read {
            path: PathBuf::from("."),
            source,
        })?;
        let ctx_home = config_home()?.join(CTX_DIR);
        Ok(Self::from_parts(ctx_home, cwd, config_file))
    }

    pub fn from_parts(ctx_home: PathBuf, cwd: PathBuf, config_file: Option<PathBuf>) -> Self {
        let project_root = find_project_root(&cwd).unwrap_or_else(|| cwd.clone());
        let config_path = config_file
            .map(|path| cwd.join(path))
            .unwrap_or_else(|| ctx_home.join(CONFIG_FILE));
        Self {
            ctx_home,
            config_path,
            project_root,
            cwd,
        }
    }

    pub fn workspace_config_path(&self) -> PathBuf {
        self.project_root.join(CTX_DIR).join(CONFIG_FILE)
    }

    /// Global fragments: the configured directory, or `<ctx home>/fragments`.
    pub fn global_fragments_dir(&self, config: &Config) -> PathBuf {
        match &config.fragments_dir {
            Some(dir) => self.cwd.join(dir),
            None => self.ctx_home.join(FRAGMENTS_DIR),
        }
    }

    /// Project-local fragments that may override global ones.
    pub fn local_fragments_dir(&self) -> PathBuf {
        self.project_root.join(CTX_DIR).join(FRAGMENTS_DIR)
    }
}

fn config_home() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs_next::home_dir()
        .map(|home| home.join(".config"))
        .ok_or(ConfigError::NoHome)
}

fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}
