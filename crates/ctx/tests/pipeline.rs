use std::fs;
use std::path::Path;

use anyhow::Result;
use ctx::app::build::{BuildOptions, BuildOutcome, Builder, FragmentSources};
use ctx::app::output::{OutputRequest, WriteAction, resolve_outputs};
use ctx::domain::errors::CtxError;
use ctx::domain::model::ExecutionMode;
use ctx::infra::config::Config;
use ctx::ui::prompt::NonInteractive;
use tempfile::TempDir;

struct Workspace {
    temp: TempDir,
    sources: FragmentSources,
}

impl Workspace {
    fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let sources = FragmentSources {
            global: temp.path().join("global"),
            local: temp.path().join("project/.ctx/fragments"),
        };
        fs::create_dir_all(&sources.global)?;
        fs::create_dir_all(&sources.local)?;
        Ok(Self { temp, sources })
    }

    fn global(&self, name: &str, tags: &str, body: &str) -> Result<()> {
        write_fragment(&self.sources.global, name, tags, body)
    }

    fn local(&self, name: &str, tags: &str, body: &str) -> Result<()> {
        write_fragment(&self.sources.local, name, tags, body)
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    fn build(&self, config: &Config, options: BuildOptions) -> Result<(BuildOutcome, String)> {
        let builder = Builder::new(config, self.sources.clone(), self.root());
        let mut stdout = Vec::<u8>::new();
        let outcome = builder.run(&options, &mut NonInteractive, &mut stdout)?;
        Ok((outcome, String::from_utf8(stdout)?))
    }
}

fn write_fragment(dir: &Path, name: &str, tags: &str, body: &str) -> Result<()> {
    fs::write(dir.join(name), format!("---\nctx-tags: {tags}\n---\n{body}\n"))?;
    Ok(())
}

fn stdout_options(tags: &[&str]) -> BuildOptions {
    BuildOptions {
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        non_interactive: true,
        stdout: true,
        ..Default::default()
    }
}

#[test]
fn local_fragment_overrides_global_with_same_name() -> Result<()> {
    let ws = Workspace::new()?;
    ws.global("common.md", "common, global", "global common")?;
    ws.global("ts.md", "typescript, global", "global ts")?;
    ws.local("common.md", "common, local", "local common")?;

    let (_, document) = ws.build(&Config::default(), stdout_options(&[]))?;

    assert!(document.contains("local common"));
    assert!(document.contains("global ts"));
    assert!(!document.contains("global common"));
    Ok(())
}

#[test]
fn include_both_keeps_both_copies() -> Result<()> {
    let ws = Workspace::new()?;
    ws.global("common.md", "common", "global common")?;
    ws.local("common.md", "common", "local common")?;

    let options = BuildOptions {
        include_both: true,
        ..stdout_options(&["common"])
    };
    let (_, document) = ws.build(&Config::default(), options)?;

    assert_eq!(document.matches("global common").count(), 1);
    assert_eq!(document.matches("local common").count(), 1);
    Ok(())
}

#[test]
fn no_tags_anywhere_selects_every_fragment() -> Result<()> {
    let ws = Workspace::new()?;
    ws.global("a.md", "go", "alpha")?;
    ws.global("b.md", "rust", "beta")?;
    fs::write(ws.sources.global.join("c.md"), "plain body\n")?;

    let (outcome, document) = ws.build(&Config::default(), stdout_options(&[]))?;

    let BuildOutcome::Completed(report) = outcome else {
        panic!("build was cancelled");
    };
    assert_eq!(report.fragments.len(), 3);
    assert_eq!(document, "alpha\n\nbeta\n\nplain body");
    Ok(())
}

#[test]
fn config_default_tags_apply_without_explicit_tags() -> Result<()> {
    let ws = Workspace::new()?;
    ws.global("a.md", "go", "alpha")?;
    ws.global("b.md", "rust", "beta")?;
    let config = Config {
        default_tags: vec!["rust".into()],
        ..Config::default()
    };

    let (_, document) = ws.build(&config, stdout_options(&[]))?;

    assert_eq!(document, "beta");
    Ok(())
}

#[test]
fn configured_formats_write_files_relative_to_base_dir() -> Result<()> {
    let ws = Workspace::new()?;
    ws.global("a.md", "go", "alpha")?;
    let options = BuildOptions {
        non_interactive: true,
        ..Default::default()
    };

    let (outcome, document) = ws.build(&Config::default(), options)?;

    assert!(document.is_empty());
    let BuildOutcome::Completed(report) = outcome else {
        panic!("build was cancelled");
    };
    assert!(report.writes.iter().all(|w| w.action == WriteAction::Written));
    assert_eq!(fs::read_to_string(ws.root().join("AGENTS.md"))?, "alpha");
    assert_eq!(fs::read_to_string(ws.root().join("GEMINI.md"))?, "alpha");
    Ok(())
}

#[test]
fn unknown_format_fails_at_write_time() -> Result<()> {
    let ws = Workspace::new()?;
    ws.global("a.md", "go", "alpha")?;
    let config = Config::default();
    let formats = vec!["nope".to_owned(), "opencode".to_owned()];

    let plan = resolve_outputs(
        OutputRequest {
            stdout: false,
            formats: &formats,
            file: None,
            mode: ExecutionMode::NonInteractive,
        },
        &config.output_formats,
        &mut NonInteractive,
    )?;
    assert_eq!(plan.formats, formats);

    let options = BuildOptions {
        output_formats: formats,
        non_interactive: true,
        ..Default::default()
    };
    let err = ws.build(&config, options).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CtxError>(),
        Some(CtxError::UnknownOutputFormat(name)) if name == "nope"
    ));
    assert!(!ws.root().join("AGENTS.md").exists());
    Ok(())
}

#[test]
fn unmatched_tags_are_an_error() -> Result<()> {
    let ws = Workspace::new()?;
    ws.global("a.md", "go", "alpha")?;

    let err = ws
        .build(&Config::default(), stdout_options(&["python"]))
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<CtxError>(),
        Some(CtxError::EmptySelectionResult { .. })
    ));
    Ok(())
}

#[test]
fn ignore_globs_exclude_fragments() -> Result<()> {
    let ws = Workspace::new()?;
    ws.global("a.md", "go", "alpha")?;
    fs::create_dir_all(ws.sources.global.join("drafts"))?;
    write_fragment(&ws.sources.global.join("drafts"), "wip.md", "go", "draft")?;
    let mut config = Config::default();
    config.ignore.globs = vec!["drafts/**".into()];

    let (_, document) = ws.build(&config, stdout_options(&["go"]))?;

    assert_eq!(document, "alpha");
    Ok(())
}

#[test]
fn explicit_file_is_written_alongside_formats() -> Result<()> {
    let ws = Workspace::new()?;
    ws.global("a.md", "go", "alpha")?;
    let options = BuildOptions {
        non_interactive: true,
        output_formats: vec!["gemini".into()],
        output_file: Some("out/CONTEXT.md".into()),
        ..Default::default()
    };

    ws.build(&Config::default(), options)?;

    assert_eq!(fs::read_to_string(ws.root().join("GEMINI.md"))?, "alpha");
    assert_eq!(fs::read_to_string(ws.root().join("out/CONTEXT.md"))?, "alpha");
    Ok(())
}
