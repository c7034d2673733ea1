//! Domain-specific errors.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CtxError {
    #[error("i/o error on {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to scan {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
    #[error("invalid ignore glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("no fragments found in {}", display_paths(.searched))]
    NoFragmentsFound { searched: Vec<PathBuf> },
    #[error("no tags found in fragments")]
    NoTagsAvailable,
    #[error("no {0} selected")]
    NoSelectionMade(String),
    #[error("no fragments match the selected tags: {}", .tags.join(", "))]
    EmptySelectionResult { tags: Vec<String> },
    #[error("unknown output format: {0}")]
    UnknownOutputFormat(String),
    #[error("no output formats configured and none specified")]
    NoFormatsAvailable,
    #[error("interactive prompt failed: {0}")]
    Prompt(#[source] io::Error),
    #[error("cancelled by user")]
    Cancelled,
}

impl CtxError {
    pub fn file_system(path: impl AsRef<Path>, source: io::Error) -> Self {
        CtxError::FileSystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Cancellation is a normal way to finish, not a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CtxError::Cancelled)
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_lists_tags() {
        let err = CtxError::EmptySelectionResult {
            tags: vec!["rust".into(), "go".into()],
        };
        assert_eq!(
            err.to_string(),
            "no fragments match the selected tags: rust, go"
        );
    }

    #[test]
    fn file_system_error_names_path() {
        let err = CtxError::file_system(
            "/tmp/missing.md",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/missing.md"));
    }
}
