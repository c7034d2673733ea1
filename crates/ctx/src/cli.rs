//! Command-line surface: argument definitions and command dispatch.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::build::{BuildOptions, BuildOutcome, Builder, FragmentSources};
use crate::app::init::{InitOptions, InitOutcome, run_init};
use crate::app::output::WriteAction;
use crate::app::tags::tag_counts;
use crate::domain::model::{ExecutionMode, OverrideMode};
use crate::infra::config::Config;
use crate::infra::workspace::Locations;
use crate::ui::terminal::prompter_for;

#[derive(Debug, Parser)]
#[command(name = "ctx", version, about = "Compose tagged markdown fragments into context files")]
pub struct Cli {
    /// Use this configuration file instead of the global one
    #[arg(long, global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Enable debug logging on stderr (CTX_LOG overrides the filter)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Combine fragments matching the selected tags and write them out
    Build(BuildArgs),
    /// Create the configuration file and fragments directory
    Init(InitArgs),
    /// List the tags declared by the available fragments
    Tags(TagsArgs),
    /// Print a shell completion script
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Comma-separated tags to include
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Never prompt; use flags and configuration only
    #[arg(long)]
    pub non_interactive: bool,

    /// Output formats to write, by configured name
    #[arg(long = "output-format", value_delimiter = ',', value_name = "FORMAT")]
    pub output_formats: Vec<String>,

    /// Write the result to this file
    #[arg(short, long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Print the result to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// Include both local and global fragments even if they have the same name
    #[arg(long)]
    pub no_local_override: bool,

    /// Also write a replication manifest to this path
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,
}

impl From<BuildArgs> for BuildOptions {
    fn from(args: BuildArgs) -> Self {
        BuildOptions {
            tags: args.tags,
            non_interactive: args.non_interactive,
            output_formats: args.output_formats,
            output_file: args.output_file,
            stdout: args.stdout,
            include_both: args.no_local_override,
            manifest: args.manifest,
        }
    }
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Never prompt; use the flags below
    #[arg(long)]
    pub non_interactive: bool,

    /// Directory holding global fragments
    #[arg(long, value_name = "DIR")]
    pub fragments_dir: Option<PathBuf>,

    /// Additional output format, repeatable
    #[arg(long = "format", value_name = "NAME=FILE", value_parser = parse_format)]
    pub formats: Vec<(String, String)>,

    /// Create a sample fragment
    #[arg(long)]
    pub sample: bool,

    /// Overwrite an existing configuration (a backup is kept)
    #[arg(long)]
    pub force: bool,
}

impl From<InitArgs> for InitOptions {
    fn from(args: InitArgs) -> Self {
        InitOptions {
            non_interactive: args.non_interactive,
            fragments_dir: args.fragments_dir,
            formats: args.formats,
            sample: args.sample,
            force: args.force,
        }
    }
}

#[derive(Debug, Args)]
pub struct TagsArgs {
    /// Print the tag inventory as JSON
    #[arg(long)]
    pub json: bool,

    /// Include both local and global fragments even if they have the same name
    #[arg(long)]
    pub no_local_override: bool,
}

fn parse_format(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, file)) if !name.trim().is_empty() && !file.trim().is_empty() => {
            Ok((name.trim().to_owned(), file.trim().to_owned()))
        }
        _ => Err(format!("expected NAME=FILE, got '{value}'")),
    }
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build(args) => build(cli.config_file, args.into()),
        Command::Init(args) => init(cli.config_file, args.into()),
        Command::Tags(args) => tags(cli.config_file, &args),
        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ctx", &mut io::stdout());
            Ok(())
        }
    }
}

fn load(config_file: Option<PathBuf>) -> Result<(Locations, Config)> {
    let locations = Locations::discover(config_file)?;
    let config = Config::load(&locations)
        .with_context(|| format!("failed to load {}", locations.config_path.display()))?;
    Ok((locations, config))
}

fn build(config_file: Option<PathBuf>, options: BuildOptions) -> Result<()> {
    let (locations, config) = load(config_file)?;
    let sources = FragmentSources::from_locations(&locations, &config);
    let mut prompter = prompter_for(options.mode())?;

    let builder = Builder::new(&config, sources, &locations.cwd);
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    match builder.run(&options, prompter.as_mut(), &mut stdout)? {
        BuildOutcome::Cancelled => eprintln!("Build cancelled."),
        BuildOutcome::Completed(report) => {
            for write in &report.writes {
                let Some(path) = &write.target.destination else {
                    continue;
                };
                match write.action {
                    WriteAction::Written => eprintln!(
                        "Wrote {} fragment(s) to {} ({})",
                        report.fragments.len(),
                        path.display(),
                        write.target.format
                    ),
                    WriteAction::Skipped => eprintln!("Skipped {}", path.display()),
                    WriteAction::Printed => {}
                }
            }
            if let Some(manifest) = &report.manifest {
                eprintln!("Replication manifest written to {}", manifest.display());
            }
        }
    }
    Ok(())
}

fn init(config_file: Option<PathBuf>, options: InitOptions) -> Result<()> {
    let locations = Locations::discover(config_file)?;
    let mut prompter = prompter_for(ExecutionMode::from_non_interactive(
        options.non_interactive,
    ))?;

    match run_init(&locations, &options, prompter.as_mut())? {
        InitOutcome::Cancelled => eprintln!("Initialization cancelled."),
        InitOutcome::Created(report) => {
            if let Some(backup) = &report.backup {
                eprintln!("Backed up previous configuration to {}", backup.display());
            }
            eprintln!("Configuration saved to {}", report.config_path.display());
            eprintln!("Fragments directory: {}", report.fragments_dir.display());
            if let Some(sample) = &report.sample {
                eprintln!("Created sample fragment {}", sample.display());
            }
        }
    }
    Ok(())
}

fn tags(config_file: Option<PathBuf>, args: &TagsArgs) -> Result<()> {
    let (locations, config) = load(config_file)?;
    let sources = FragmentSources::from_locations(&locations, &config);
    let fragments = sources.load(
        &config,
        OverrideMode::from_include_both(args.no_local_override),
    )?;
    let counts = tag_counts(&fragments);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &counts)?;
        writeln!(out)?;
    } else {
        for count in &counts {
            writeln!(out, "{}\t{}", count.tag, count.fragments)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_flags_parse() {
        let cli = Cli::try_parse_from([
            "ctx",
            "build",
            "--tags",
            "go,testing",
            "--output-format",
            "opencode,gemini",
            "--non-interactive",
            "--no-local-override",
        ])
        .unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        let options = BuildOptions::from(args);
        assert_eq!(options.tags, vec!["go", "testing"]);
        assert_eq!(options.output_formats, vec!["opencode", "gemini"]);
        assert!(options.include_both);
        assert_eq!(options.mode(), ExecutionMode::NonInteractive);
    }

    #[test]
    fn init_formats_require_name_and_file() {
        assert_eq!(
            parse_format("claude=CLAUDE.md"),
            Ok(("claude".to_owned(), "CLAUDE.md".to_owned()))
        );
        assert!(parse_format("claude").is_err());
        assert!(parse_format("=CLAUDE.md").is_err());
    }

    #[test]
    fn global_options_follow_subcommands() {
        let cli =
            Cli::try_parse_from(["ctx", "tags", "--json", "--config-file", "c.toml"]).unwrap();
        assert_eq!(cli.config_file, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Command::Tags(TagsArgs { json: true, .. })));
    }
}
