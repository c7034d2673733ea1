//! Domain models for fragments, selections, and output targets.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Pseudo-format that prints the composed document instead of writing a file.
pub const STDOUT_FORMAT: &str = "stdout";

/// Pseudo-format bound to an explicit `--output-file` path.
pub const CUSTOM_FORMAT: &str = "custom";

/// A discovered markdown fragment and the tags declared in its header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub path: PathBuf,
    pub tags: Vec<String>,
    pub content: String,
}

impl Fragment {
    pub fn new(path: impl Into<PathBuf>, tags: Vec<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tags,
            content: content.into(),
        }
    }

    /// File name used to decide whether a local fragment overrides a global one.
    pub fn basename(&self) -> Option<&OsStr> {
        self.path.file_name()
    }

    pub fn has_any_tag(&self, selected: &[String]) -> bool {
        self.tags.iter().any(|tag| selected.contains(tag))
    }
}

/// Policy for local and global fragments sharing a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrideMode {
    /// A local fragment replaces the global fragment with the same file name.
    #[default]
    LocalOverridesGlobal,
    /// Both copies participate.
    IncludeBoth,
}

impl OverrideMode {
    pub fn from_include_both(include_both: bool) -> Self {
        if include_both {
            OverrideMode::IncludeBoth
        } else {
            OverrideMode::LocalOverridesGlobal
        }
    }
}

/// Whether the invocation may prompt the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Interactive,
    NonInteractive,
}

impl ExecutionMode {
    pub fn from_non_interactive(non_interactive: bool) -> Self {
        if non_interactive {
            ExecutionMode::NonInteractive
        } else {
            ExecutionMode::Interactive
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, ExecutionMode::Interactive)
    }
}

/// A resolved output: a format name and, unless it is `stdout`, a file destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub format: String,
    pub destination: Option<PathBuf>,
}

impl OutputTarget {
    pub fn stdout() -> Self {
        Self {
            format: STDOUT_FORMAT.to_owned(),
            destination: None,
        }
    }

    pub fn file(format: impl Into<String>, destination: impl AsRef<Path>) -> Self {
        Self {
            format: format.into(),
            destination: Some(destination.as_ref().to_path_buf()),
        }
    }

    pub fn is_stdout(&self) -> bool {
        self.destination.is_none()
    }
}

/// Decision state for a single build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionContext {
    pub tags: Vec<String>,
    pub targets: Vec<OutputTarget>,
    pub override_mode: OverrideMode,
}

/// Deduplicate while keeping the first occurrence of each entry.
pub fn unique_in_order(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_ignores_directories() {
        let global = Fragment::new("/global/rules/common.md", vec![], "");
        let local = Fragment::new("/repo/.ctx/fragments/common.md", vec![], "");
        assert_eq!(global.basename(), local.basename());
    }

    #[test]
    fn unique_in_order_keeps_first_occurrence() {
        let tags = unique_in_order(["b", "a", "b", "c", "a"].map(String::from));
        assert_eq!(tags, vec!["b", "a", "c"]);
    }
}
