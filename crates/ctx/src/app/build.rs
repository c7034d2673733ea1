//! The `build` pipeline: scan, merge, select, filter, splice, write, record.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::merge::merge_fragments;
use crate::app::output::{OutputPlan, OutputRequest, OutputWriter, WriteReport, resolve_outputs};
use crate::app::replication::ReplicationRecorder;
use crate::app::scan::{Scanner, ScannerConfig};
use crate::app::splice::splice;
use crate::app::tags::{TagRequest, filter_by_tags, resolve_tags};
use crate::domain::errors::CtxError;
use crate::domain::model::{ExecutionMode, Fragment, OverrideMode, SelectionContext};
use crate::infra::config::Config;
use crate::infra::workspace::Locations;
use crate::ui::prompt::Prompter;

/// Options of a single `ctx build` invocation.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub tags: Vec<String>,
    pub non_interactive: bool,
    pub output_formats: Vec<String>,
    pub output_file: Option<PathBuf>,
    pub stdout: bool,
    /// Keep global fragments even when a local fragment has the same file name.
    pub include_both: bool,
    pub manifest: Option<PathBuf>,
}

impl BuildOptions {
    pub fn mode(&self) -> ExecutionMode {
        ExecutionMode::from_non_interactive(self.non_interactive)
    }

    pub fn override_mode(&self) -> OverrideMode {
        OverrideMode::from_include_both(self.include_both)
    }
}

/// Directories fragments are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSources {
    pub global: PathBuf,
    pub local: PathBuf,
}

impl FragmentSources {
    pub fn from_locations(locations: &Locations, config: &Config) -> Self {
        Self {
            global: locations.global_fragments_dir(config),
            local: locations.local_fragments_dir(),
        }
    }

    /// Scan both directories and merge them. Fails when neither contributes a fragment.
    pub fn load(&self, config: &Config, mode: OverrideMode) -> Result<Vec<Fragment>, CtxError> {
        let scanner = Scanner::new();
        let global = scanner.scan(&ScannerConfig::from_root(&self.global).with_config(config))?;
        let local = scanner.scan(&ScannerConfig::from_root(&self.local).with_config(config))?;
        tracing::debug!(
            global = global.len(),
            local = local.len(),
            ?mode,
            "merging fragment sets"
        );

        let merged = merge_fragments(global, local, mode);
        if merged.is_empty() {
            return Err(CtxError::NoFragmentsFound {
                searched: vec![self.global.clone(), self.local.clone()],
            });
        }
        Ok(merged)
    }
}

/// Result of a build that ran to completion.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub context: SelectionContext,
    pub fragments: Vec<Fragment>,
    pub document: String,
    pub writes: Vec<WriteReport>,
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum BuildOutcome {
    Completed(BuildReport),
    /// The user backed out; nothing was written.
    Cancelled,
}

/// Runs the build pipeline against a configuration and a pair of fragment directories.
pub struct Builder<'a> {
    config: &'a Config,
    sources: FragmentSources,
    base_dir: PathBuf,
}

impl<'a> Builder<'a> {
    /// `base_dir` anchors relative output and manifest paths.
    pub fn new(config: &'a Config, sources: FragmentSources, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            sources,
            base_dir: base_dir.into(),
        }
    }

    pub fn run(
        &self,
        options: &BuildOptions,
        prompter: &mut dyn Prompter,
        stdout: &mut dyn Write,
    ) -> Result<BuildOutcome> {
        match self.compose(options, prompter, stdout) {
            Err(err)
                if err
                    .downcast_ref::<CtxError>()
                    .is_some_and(CtxError::is_cancellation) =>
            {
                Ok(BuildOutcome::Cancelled)
            }
            other => other,
        }
    }

    fn compose(
        &self,
        options: &BuildOptions,
        prompter: &mut dyn Prompter,
        stdout: &mut dyn Write,
    ) -> Result<BuildOutcome> {
        let mode = options.mode();
        let override_mode = options.override_mode();
        let fragments = self.sources.load(self.config, override_mode)?;

        let tags = resolve_tags(
            TagRequest {
                explicit: &options.tags,
                defaults: &self.config.default_tags,
                mode,
            },
            &fragments,
            prompter,
        )?;

        let selected = filter_by_tags(&fragments, &tags);
        if selected.is_empty() {
            return Err(CtxError::EmptySelectionResult { tags }.into());
        }
        tracing::debug!(
            tags = ?tags,
            fragments = selected.len(),
            "selected fragments"
        );

        let plan = resolve_outputs(
            OutputRequest {
                stdout: options.stdout,
                formats: &options.output_formats,
                file: options.output_file.as_deref(),
                mode,
            },
            &self.config.output_formats,
            prompter,
        )?;

        if mode.is_interactive() {
            let summary = build_summary(&selected, &tags, &plan);
            if !prompter.confirm_build(&summary).map_err(CtxError::Prompt)? {
                return Ok(BuildOutcome::Cancelled);
            }
        }

        let document = splice(&selected);
        let writes = OutputWriter::new(&self.base_dir, mode).write(
            &document,
            &plan,
            &self.config.output_formats,
            prompter,
            stdout,
        )?;

        let manifest = match &options.manifest {
            Some(path) => Some(self.write_manifest(path, &selected, &tags)?),
            None => None,
        };

        Ok(BuildOutcome::Completed(BuildReport {
            context: SelectionContext {
                tags,
                targets: writes.iter().map(|report| report.target.clone()).collect(),
                override_mode,
            },
            fragments: selected,
            document,
            writes,
            manifest,
        }))
    }

    fn write_manifest(
        &self,
        path: &Path,
        fragments: &[Fragment],
        tags: &[String],
    ) -> Result<PathBuf> {
        let manifest = ReplicationRecorder::new()?.record(fragments, tags)?;
        let destination = self.base_dir.join(path);
        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create manifest directory: {}", parent.display())
            })?;
        }
        fs::write(&destination, manifest).with_context(|| {
            format!("failed to write replication manifest to {}", destination.display())
        })?;
        Ok(destination)
    }
}

/// Text shown before an interactive build is confirmed.
pub fn build_summary(fragments: &[Fragment], tags: &[String], plan: &OutputPlan) -> String {
    let mut summary = format!(
        "Selected tags: {}\nOutput formats: {}\nFragments to include: {}\n\nFragments:\n",
        tags.join(", "),
        plan.formats.join(", "),
        fragments.len()
    );
    for fragment in fragments {
        summary.push_str(&format!(
            "- {} (tags: {})\n",
            fragment.path.display(),
            fragment.tags.join(", ")
        ));
    }
    summary
}
