//! Output destination resolution and writing.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::errors::CtxError;
use crate::domain::model::{
    CUSTOM_FORMAT, ExecutionMode, OutputTarget, STDOUT_FORMAT, unique_in_order,
};
use crate::ui::prompt::Prompter;

/// Output-related flags of a build invocation.
#[derive(Debug, Clone, Copy)]
pub struct OutputRequest<'a> {
    pub stdout: bool,
    pub formats: &'a [String],
    pub file: Option<&'a Path>,
    pub mode: ExecutionMode,
}

/// Where the list of output formats comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Stdout,
    ExplicitFormats,
    ExplicitFile,
    AllConfigured,
    Interactive,
}

impl OutputSource {
    /// First matching row wins:
    ///
    /// | condition                  | source          |
    /// |----------------------------|-----------------|
    /// | `--stdout`                 | Stdout          |
    /// | `--output-format` given    | ExplicitFormats |
    /// | `--output-file` given      | ExplicitFile    |
    /// | non-interactive            | AllConfigured   |
    /// | interactive                | Interactive     |
    pub fn decide(request: &OutputRequest<'_>) -> Self {
        if request.stdout {
            OutputSource::Stdout
        } else if !request.formats.is_empty() {
            OutputSource::ExplicitFormats
        } else if request.file.is_some() {
            OutputSource::ExplicitFile
        } else if request.mode.is_interactive() {
            OutputSource::Interactive
        } else {
            OutputSource::AllConfigured
        }
    }
}

/// Resolved output formats plus the explicit file bound to the `custom` format, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputPlan {
    pub formats: Vec<String>,
    pub custom_file: Option<PathBuf>,
}

impl OutputPlan {
    /// Bind every format to a destination. `stdout` has none; `custom` uses the explicit file;
    /// anything else must be a configured format.
    pub fn targets(
        &self,
        configured: &BTreeMap<String, String>,
        base_dir: &Path,
    ) -> Result<Vec<OutputTarget>, CtxError> {
        self.formats
            .iter()
            .map(|format| {
                if format == STDOUT_FORMAT {
                    return Ok(OutputTarget::stdout());
                }
                if format == CUSTOM_FORMAT
                    && let Some(file) = &self.custom_file
                {
                    return Ok(OutputTarget::file(format.as_str(), base_dir.join(file)));
                }
                configured
                    .get(format)
                    .map(|file| OutputTarget::file(format.as_str(), base_dir.join(file)))
                    .ok_or_else(|| CtxError::UnknownOutputFormat(format.clone()))
            })
            .collect()
    }
}

/// Decide which formats receive the document. Format names are not validated here; unknown
/// names fail when the document is written. An explicit file given together with explicit
/// formats is appended as the `custom` target.
pub fn resolve_outputs(
    request: OutputRequest<'_>,
    configured: &BTreeMap<String, String>,
    prompter: &mut dyn Prompter,
) -> Result<OutputPlan, CtxError> {
    let source = OutputSource::decide(&request);
    tracing::debug!(?source, "resolving output formats");

    let custom_file = request.file.map(Path::to_path_buf);
    let plan = match source {
        OutputSource::Stdout => OutputPlan {
            formats: vec![STDOUT_FORMAT.to_owned()],
            custom_file: None,
        },
        OutputSource::ExplicitFormats => {
            let mut formats = unique_in_order(request.formats.iter().cloned());
            if custom_file.is_some() && !formats.iter().any(|format| format == CUSTOM_FORMAT) {
                formats.push(CUSTOM_FORMAT.to_owned());
            }
            OutputPlan {
                formats,
                custom_file,
            }
        }
        OutputSource::ExplicitFile => OutputPlan {
            formats: vec![CUSTOM_FORMAT.to_owned()],
            custom_file,
        },
        OutputSource::AllConfigured => {
            if configured.is_empty() {
                return Err(CtxError::NoFormatsAvailable);
            }
            OutputPlan {
                formats: configured.keys().cloned().collect(),
                custom_file: None,
            }
        }
        OutputSource::Interactive => {
            let mut candidates: Vec<String> = configured.keys().cloned().collect();
            candidates.push(STDOUT_FORMAT.to_owned());
            let chosen = match prompter
                .select_formats(&candidates)
                .map_err(CtxError::Prompt)?
            {
                None => return Err(CtxError::Cancelled),
                Some(chosen) if chosen.is_empty() => {
                    return Err(CtxError::NoSelectionMade("output formats".into()));
                }
                Some(chosen) => chosen,
            };
            OutputPlan {
                formats: unique_in_order(chosen),
                custom_file: None,
            }
        }
    };
    Ok(plan)
}

/// What happened to one output target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Printed,
    Written,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub target: OutputTarget,
    pub action: WriteAction,
}

/// Writes the composed document to every target of a plan.
pub struct OutputWriter<'a> {
    base_dir: &'a Path,
    mode: ExecutionMode,
}

impl<'a> OutputWriter<'a> {
    pub fn new(base_dir: &'a Path, mode: ExecutionMode) -> Self {
        Self { base_dir, mode }
    }

    /// Resolve every destination first, so an unknown format aborts before any file is touched,
    /// then print or write each target in order.
    pub fn write(
        &self,
        document: &str,
        plan: &OutputPlan,
        configured: &BTreeMap<String, String>,
        prompter: &mut dyn Prompter,
        stdout: &mut dyn Write,
    ) -> Result<Vec<WriteReport>, CtxError> {
        let targets = plan.targets(configured, self.base_dir)?;

        let mut reports = Vec::with_capacity(targets.len());
        for target in targets {
            let action = match &target.destination {
                None => {
                    stdout
                        .write_all(document.as_bytes())
                        .and_then(|()| stdout.flush())
                        .map_err(|err| CtxError::file_system("<stdout>", err))?;
                    WriteAction::Printed
                }
                Some(path) => self.write_file(document, path, prompter)?,
            };
            reports.push(WriteReport { target, action });
        }
        Ok(reports)
    }

    fn write_file(
        &self,
        document: &str,
        path: &Path,
        prompter: &mut dyn Prompter,
    ) -> Result<WriteAction, CtxError> {
        if self.mode.is_interactive()
            && path.exists()
            && !prompter.confirm_overwrite(path).map_err(CtxError::Prompt)?
        {
            tracing::info!(path = %path.display(), "kept existing output file");
            return Ok(WriteAction::Skipped);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| CtxError::file_system(parent, err))?;
        }
        fs::write(path, document).map_err(|err| CtxError::file_system(path, err))?;
        tracing::info!(path = %path.display(), "wrote output");
        Ok(WriteAction::Written)
    }
}
