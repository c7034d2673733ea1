//! Fragment header parsing.
//!
//! A fragment may open with a header block delimited by `---` lines. Inside
//! the header a `ctx-tags:` line declares a comma-separated tag list; every
//! other header line is ignored. Only the first block at the top of the file
//! counts as a header, later `---` lines are ordinary markdown.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::errors::CtxError;
use crate::domain::model::Fragment;

const HEADER_BOUNDARY: &str = "---";

static TAGS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*ctx-tags\s*:\s*(.*)$").expect("tags line pattern is valid")
});

/// Read and parse the fragment stored at `path`. Invalid UTF-8 is replaced, not rejected.
pub fn parse_fragment(path: &Path) -> Result<Fragment, CtxError> {
    let bytes = fs::read(path).map_err(|err| CtxError::file_system(path, err))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                "fragment is not valid UTF-8; invalid sequences replaced"
            );
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };
    Ok(parse_fragment_str(path, &text))
}

/// Parse fragment text that has already been read from `path`.
pub fn parse_fragment_str(path: &Path, text: &str) -> Fragment {
    let mut lines = text.lines();
    let opens_header = lines
        .next()
        .is_some_and(|first| first.trim() == HEADER_BOUNDARY);

    if !opens_header {
        return Fragment::new(path, Vec::new(), join_lines(text.lines()));
    }

    let mut tags = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim() == HEADER_BOUNDARY {
            closed = true;
            break;
        }
        if let Some(captures) = TAGS_LINE.captures(line) {
            tags.extend(split_tags(&captures[1]));
        }
    }

    if !closed {
        tracing::warn!(
            path = %path.display(),
            "fragment header is never closed; treating the whole file as content"
        );
        return Fragment::new(path, Vec::new(), join_lines(text.lines()));
    }

    Fragment::new(path, tags, join_lines(lines))
}

/// Split a comma-separated tag list, trimming entries and dropping empty ones.
pub fn split_tags(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
}

fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    lines.collect::<Vec<_>>().join("\n")
}
