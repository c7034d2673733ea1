//! The `init` flow: write a configuration and prepare the fragments directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::domain::errors::CtxError;
use crate::infra::config::Config;
use crate::infra::workspace::{FRAGMENTS_DIR, Locations};
use crate::ui::prompt::Prompter;

const SAMPLE_FRAGMENT_NAME: &str = "hello-world.md";

const SAMPLE_FRAGMENT: &str = "---
ctx-tags: hello, world, sample
---

# Hello World

This is a sample fragment created by ctx init.

You can edit this file and add more fragments to get started with ctx.

## Usage

Run 'ctx build' to combine fragments based on tags.
";

/// Answers for `ctx init`, supplied as flags or collected interactively.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub non_interactive: bool,
    pub fragments_dir: Option<PathBuf>,
    /// Additional `name = file` output formats.
    pub formats: Vec<(String, String)>,
    pub sample: bool,
    /// Overwrite an existing configuration without asking.
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub config_path: PathBuf,
    pub backup: Option<PathBuf>,
    pub fragments_dir: PathBuf,
    pub sample: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created(InitReport),
    Cancelled,
}

pub fn run_init(
    locations: &Locations,
    options: &InitOptions,
    prompter: &mut dyn Prompter,
) -> Result<InitOutcome> {
    let config_path = &locations.config_path;
    let existing = config_path.exists();

    if existing {
        if options.non_interactive {
            if !options.force {
                bail!(
                    "configuration already exists at {}; pass --force to overwrite it",
                    config_path.display()
                );
            }
        } else if !options.force {
            let question = format!(
                "A configuration file already exists at {}. Do you want to overwrite it?",
                config_path.display()
            );
            if !prompter.confirm(&question).map_err(CtxError::Prompt)? {
                return Ok(InitOutcome::Cancelled);
            }
        }
    }

    let answers = if options.non_interactive {
        options.clone()
    } else {
        match ask(locations, options, prompter)? {
            Some(answers) => answers,
            None => return Ok(InitOutcome::Cancelled),
        }
    };

    let mut config = generate_config(locations, &answers);
    if existing {
        match Config::from_file(config_path) {
            Ok(previous) => config.custom_settings = previous.custom_settings,
            Err(err) => tracing::warn!(error = %err, "existing configuration could not be read"),
        }
    }

    let backup = if existing {
        Some(backup_config(config_path)?)
    } else {
        None
    };

    config
        .save(config_path)
        .with_context(|| format!("failed to save config to {}", config_path.display()))?;
    tracing::info!(path = %config_path.display(), "configuration saved");

    let fragments_dir = locations.global_fragments_dir(&config);
    fs::create_dir_all(&fragments_dir).with_context(|| {
        format!(
            "failed to create fragments directory {}",
            fragments_dir.display()
        )
    })?;

    let sample = if answers.sample {
        Some(create_sample_fragment(&fragments_dir)?)
    } else {
        None
    };

    Ok(InitOutcome::Created(InitReport {
        config_path: config_path.clone(),
        backup,
        fragments_dir,
        sample,
    }))
}

/// Build the configuration described by the answers on top of the defaults.
pub fn generate_config(locations: &Locations, answers: &InitOptions) -> Config {
    let mut config = Config::default();
    if let Some(dir) = answers
        .fragments_dir
        .as_ref()
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        config.fragments_dir = Some(locations.cwd.join(dir));
    }
    for (name, file) in &answers.formats {
        config.output_formats.insert(name.clone(), file.clone());
    }
    config
}

/// Copy the current configuration to `<file>.bak.<timestamp>`.
pub fn backup_config(path: &Path) -> Result<PathBuf> {
    let stamp = OffsetDateTime::now_utc()
        .format(format_description!(
            "[year][month][day][hour][minute][second]"
        ))
        .context("failed to format backup timestamp")?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "config.toml".to_owned());
    let backup = path.with_file_name(format!("{file_name}.bak.{stamp}"));
    fs::copy(path, &backup).with_context(|| {
        format!(
            "failed to back up {} to {}",
            path.display(),
            backup.display()
        )
    })?;
    tracing::info!(path = %backup.display(), "previous configuration backed up");
    Ok(backup)
}

pub fn create_sample_fragment(fragments_dir: &Path) -> Result<PathBuf> {
    let path = fragments_dir.join(SAMPLE_FRAGMENT_NAME);
    fs::write(&path, SAMPLE_FRAGMENT)
        .with_context(|| format!("failed to write sample fragment {}", path.display()))?;
    Ok(path)
}

/// Collect answers interactively. Flags already given are used as they are.
fn ask(
    locations: &Locations,
    options: &InitOptions,
    prompter: &mut dyn Prompter,
) -> Result<Option<InitOptions>> {
    let mut answers = options.clone();

    if answers.fragments_dir.is_none() {
        let default_dir = locations.ctx_home.join(FRAGMENTS_DIR);
        let Some(dir) = prompter
            .input(
                "Where would you like to store your fragments? (blank for default)",
                &default_dir.display().to_string(),
            )
            .map_err(CtxError::Prompt)?
        else {
            return Ok(None);
        };
        let dir = dir.trim();
        if !dir.is_empty() {
            answers.fragments_dir = Some(PathBuf::from(dir));
        }
    }

    let defaults = Config::default().output_formats;
    let listed = defaults
        .iter()
        .map(|(name, file)| format!("{name}: {file}"))
        .collect::<Vec<_>>()
        .join(", ");
    let question = format!("Default output formats are {listed}. Add additional output formats?");
    if prompter.confirm(&question).map_err(CtxError::Prompt)? {
        loop {
            let Some((name, file)) = ask_format(prompter, &answers.formats)? else {
                return Ok(None);
            };
            answers.formats.push((name, file));
            if !prompter
                .confirm("Add another custom output format?")
                .map_err(CtxError::Prompt)?
            {
                break;
            }
        }
    }

    if !answers.sample {
        answers.sample = prompter
            .confirm("Would you like to create a sample fragment to start?")
            .map_err(CtxError::Prompt)?;
    }

    Ok(Some(answers))
}

fn ask_format(
    prompter: &mut dyn Prompter,
    taken: &[(String, String)],
) -> Result<Option<(String, String)>> {
    let mut title = "Format name (e.g. 'claude')".to_owned();
    let name = loop {
        let Some(name) = prompter.input(&title, "claude").map_err(CtxError::Prompt)? else {
            return Ok(None);
        };
        let name = name.trim().to_owned();
        if name.is_empty() {
            title = "Format name cannot be empty, try again".to_owned();
        } else if taken.iter().any(|(existing, _)| *existing == name) {
            title = format!("Format '{name}' already exists, choose another name");
        } else {
            break name;
        }
    };

    let mut title = format!("Output file for '{name}' (e.g. 'CLAUDE.md')");
    let file = loop {
        let Some(file) = prompter.input(&title, "CLAUDE.md").map_err(CtxError::Prompt)? else {
            return Ok(None);
        };
        let file = file.trim().to_owned();
        if file.is_empty() {
            title = "File name cannot be empty, try again".to_owned();
        } else {
            break file;
        }
    };

    Ok(Some((name, file)))
}
