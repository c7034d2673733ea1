//! Configuration management utilities.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infra::workspace::Locations;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));

/// Configuration failures, kept apart from fragment errors so callers can tell them apart.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to parse built-in config: {0}")]
    Builtin(#[source] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to determine the home directory for the configuration")]
    NoHome,
}

/// Layered configuration loaded from defaults, global config, workspace config, and env.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, alias = "defaultTags")]
    pub default_tags: Vec<String>,
    #[serde(default, alias = "fragmentsDir", skip_serializing_if = "Option::is_none")]
    pub fragments_dir: Option<PathBuf>,
    #[serde(default = "Config::default_output_formats", alias = "outputFormats")]
    pub output_formats: BTreeMap<String, String>,
    #[serde(default)]
    pub ignore: Ignore,
    #[serde(default, alias = "customSettings")]
    pub custom_settings: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ignore {
    #[serde(default)]
    pub globs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_tags: Vec::new(),
            fragments_dir: None,
            output_formats: Self::default_output_formats(),
            ignore: Ignore::default(),
            custom_settings: BTreeMap::new(),
        }
    }
}

/// One configuration file. Keys a layer leaves out keep the value from the layer below.
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    #[serde(alias = "defaultTags")]
    default_tags: Option<Vec<String>>,
    #[serde(alias = "fragmentsDir")]
    fragments_dir: Option<PathBuf>,
    #[serde(alias = "outputFormats")]
    output_formats: Option<BTreeMap<String, String>>,
    ignore: Option<Ignore>,
    #[serde(alias = "customSettings")]
    custom_settings: Option<BTreeMap<String, toml::Value>>,
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    default_tags: Option<String>,
    fragments_dir: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            default_tags: env::var("CTX_DEFAULT_TAGS").ok(),
            fragments_dir: env::var("CTX_FRAGMENTS_DIR").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(default_tags: &str, fragments_dir: &str) -> Self {
        Self {
            default_tags: Some(default_tags.to_owned()),
            fragments_dir: Some(fragments_dir.to_owned()),
        }
    }
}

impl Config {
    fn default_output_formats() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("opencode".to_owned(), "AGENTS.md".to_owned()),
            ("gemini".to_owned(), "GEMINI.md".to_owned()),
        ])
    }

    /// Load configuration for the discovered locations, applying env overrides.
    pub fn load(locations: &Locations) -> Result<Self, ConfigError> {
        Self::load_with_layers(
            Some(locations.config_path.clone()),
            Some(locations.workspace_config_path()),
            EnvOverrides::from_env(),
        )
    }

    pub fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default()
            .apply(toml::from_str(&DEFAULT_CONFIG).map_err(ConfigError::Builtin)?);

        let mut seen: Vec<PathBuf> = Vec::new();
        for path in [global, workspace].into_iter().flatten() {
            if !path.exists() || seen.contains(&path) {
                continue;
            }
            tracing::debug!(path = %path.display(), "loading config layer");
            config = config.apply(read_layer(&path)?);
            seen.push(path);
        }

        Ok(apply_env_overrides(config, env_overrides))
    }

    /// Read a single configuration file without layering.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Config::default().apply(read_layer(path)?))
    }

    /// Persist the configuration, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let data = toml::to_string_pretty(self)?;
        fs::write(path, data).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply(mut self, layer: ConfigLayer) -> Self {
        if let Some(tags) = layer.default_tags {
            self.default_tags = tags;
        }
        if let Some(dir) = layer.fragments_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            self.fragments_dir = Some(dir);
        }
        if let Some(formats) = layer.output_formats {
            self.output_formats = formats;
        }
        if let Some(ignore) = layer.ignore {
            for glob in ignore.globs {
                if !self.ignore.globs.contains(&glob) {
                    self.ignore.globs.push(glob);
                }
            }
        }
        if let Some(settings) = layer.custom_settings {
            self.custom_settings.extend(settings);
        }
        self
    }
}

fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(tags) = env.default_tags {
        config.default_tags = tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect();
    }
    if let Some(dir) = env.fragments_dir.filter(|dir| !dir.trim().is_empty()) {
        config.fragments_dir = Some(PathBuf::from(dir));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;

    #[test]
    fn load_uses_defaults_when_no_files() -> Result<()> {
        let config = Config::load_with_layers(None, None, EnvOverrides::default())?;
        assert_eq!(config, Config::default());
        assert_eq!(
            config.output_formats.get("opencode").map(String::as_str),
            Some("AGENTS.md")
        );
        assert!(config.default_tags.is_empty());
        Ok(())
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
default_tags = ["common"]
fragments_dir = "/srv/fragments"
[output_formats]
claude = "CLAUDE.md"
[ignore]
globs = ["drafts/**"]
"#,
        )?;

        let workspace = temp.path().join("repo/.ctx/config.toml");
        fs::create_dir_all(workspace.parent().unwrap())?;
        fs::write(
            &workspace,
            r#"
defaultTags = ["rust", "testing"]
[ignore]
globs = ["*.wip.md"]
[custom_settings]
team = "platform"
"#,
        )?;

        let config =
            Config::load_with_layers(Some(global), Some(workspace), EnvOverrides::default())?;

        assert_eq!(config.default_tags, vec!["rust", "testing"]);
        assert_eq!(config.fragments_dir, Some(PathBuf::from("/srv/fragments")));
        assert_eq!(config.output_formats.len(), 1);
        assert_eq!(config.output_formats["claude"], "CLAUDE.md");
        assert_eq!(config.ignore.globs, vec!["drafts/**", "*.wip.md"]);
        assert_eq!(
            config.custom_settings.get("team"),
            Some(&toml::Value::String("platform".into()))
        );
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests(" go, ,python ", "/tmp/frags");
        let config = Config::load_with_layers(None, None, overrides)?;
        assert_eq!(config.default_tags, vec!["go", "python"]);
        assert_eq!(config.fragments_dir, Some(PathBuf::from("/tmp/frags")));
        Ok(())
    }

    #[test]
    fn invalid_config_returns_parse_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let err = Config::from_file(&file).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        Ok(())
    }

    #[test]
    fn save_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested/.ctx/config.toml");

        let mut config = Config::default();
        config.default_tags = vec!["rust".into()];
        config.fragments_dir = Some(temp.path().join("fragments"));
        config
            .output_formats
            .insert("claude".into(), "CLAUDE.md".into());
        config
            .custom_settings
            .insert("editor".into(), toml::Value::String("helix".into()));
        config.save(&path)?;

        let loaded = Config::from_file(&path)?;
        assert_eq!(loaded, config);
        Ok(())
    }
}
