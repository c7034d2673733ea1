//! Fragment directory scanning.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::app::fragment::parse_fragment;
use crate::domain::errors::CtxError;
use crate::domain::model::Fragment;
use crate::infra::config::Config;

/// File extensions treated as fragments.
const FRAGMENT_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Inputs for a single directory scan.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub root: PathBuf,
    pub ignore_globs: Vec<String>,
}

impl ScannerConfig {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_globs: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: &Config) -> Self {
        self.ignore_globs = config.ignore.globs.clone();
        self
    }
}

/// Walks a fragments directory and parses every markdown file in it.
#[derive(Debug, Default)]
pub struct Scanner;

impl Scanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan `cfg.root` recursively. A missing directory yields no fragments.
    pub fn scan(&self, cfg: &ScannerConfig) -> Result<Vec<Fragment>, CtxError> {
        if !cfg.root.exists() {
            tracing::debug!(root = %cfg.root.display(), "fragments directory does not exist");
            return Ok(Vec::new());
        }

        let matcher = IgnoreMatcher::build(&cfg.ignore_globs)?;
        let walker = WalkBuilder::new(&cfg.root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut fragments = Vec::new();
        for result in walker {
            let entry = result.map_err(|source| CtxError::Scan {
                path: error_path(&source)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cfg.root.clone()),
                source,
            })?;

            // Symlinks are read through, so a dangling link fails the scan.
            let path = entry.path();
            let readable = entry
                .file_type()
                .is_some_and(|kind| kind.is_file() || kind.is_symlink());
            if !readable || !has_fragment_extension(path) {
                continue;
            }

            let relative = path.strip_prefix(&cfg.root).unwrap_or(path);
            if matcher.should_skip(relative) {
                tracing::debug!(path = %relative.display(), "fragment ignored by glob");
                continue;
            }

            fragments.push(parse_fragment(path)?);
        }

        tracing::debug!(
            root = %cfg.root.display(),
            count = fragments.len(),
            "scanned fragments"
        );
        Ok(fragments)
    }
}

/// The entry a walk error refers to, when the error records one.
fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

fn has_fragment_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAGMENT_EXTENSIONS.contains(&ext))
}

#[derive(Debug, Clone)]
struct IgnoreMatcher {
    globs: Option<GlobSet>,
}

impl IgnoreMatcher {
    fn build(patterns: &[String]) -> Result<Self, CtxError> {
        if patterns.is_empty() {
            return Ok(Self { globs: None });
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|err| invalid_glob(pattern, err))?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .map_err(|err| invalid_glob(&patterns.join(", "), err))?;
        Ok(Self { globs: Some(globs) })
    }

    fn should_skip(&self, rel: &Path) -> bool {
        self.globs.as_ref().is_some_and(|set| set.is_match(rel))
    }
}

fn invalid_glob(pattern: &str, source: globset::Error) -> CtxError {
    CtxError::InvalidGlob {
        pattern: pattern.to_owned(),
        source,
    }
}
