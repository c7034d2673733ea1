//! Tag selection and tag-based fragment filtering.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::errors::CtxError;
use crate::domain::model::{ExecutionMode, Fragment, unique_in_order};
use crate::ui::prompt::Prompter;

/// Inputs deciding which tags a build uses.
#[derive(Debug, Clone, Copy)]
pub struct TagRequest<'a> {
    pub explicit: &'a [String],
    pub defaults: &'a [String],
    pub mode: ExecutionMode,
}

/// Where the final tag selection comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    Explicit,
    ConfigDefaults,
    Interactive,
}

impl TagSource {
    /// First matching row wins:
    ///
    /// | explicit tags | mode            | source         |
    /// |---------------|-----------------|----------------|
    /// | non-empty     | any             | Explicit       |
    /// | empty         | non-interactive | ConfigDefaults |
    /// | empty         | interactive     | Interactive    |
    pub fn decide(request: &TagRequest<'_>) -> Self {
        if !request.explicit.is_empty() {
            return TagSource::Explicit;
        }
        match request.mode {
            ExecutionMode::NonInteractive => TagSource::ConfigDefaults,
            ExecutionMode::Interactive => TagSource::Interactive,
        }
    }
}

/// Resolve the tag selection for a build.
///
/// Explicit tags are not validated against the available fragments; an unknown tag simply
/// matches nothing when filtering. Empty configured defaults in non-interactive mode are a valid
/// "no filter" selection.
pub fn resolve_tags(
    request: TagRequest<'_>,
    fragments: &[Fragment],
    prompter: &mut dyn Prompter,
) -> Result<Vec<String>, CtxError> {
    let source = TagSource::decide(&request);
    tracing::debug!(?source, "resolving tags");

    let selected = match source {
        TagSource::Explicit => request.explicit.to_vec(),
        TagSource::ConfigDefaults => request.defaults.to_vec(),
        TagSource::Interactive => {
            let candidates = available_tags(fragments);
            if candidates.is_empty() {
                return Err(CtxError::NoTagsAvailable);
            }
            let preselected: Vec<String> = request
                .defaults
                .iter()
                .filter(|tag| candidates.contains(tag))
                .cloned()
                .collect();

            match prompter
                .select_tags(&candidates, &preselected)
                .map_err(CtxError::Prompt)?
            {
                None => return Err(CtxError::Cancelled),
                Some(chosen) if chosen.is_empty() => {
                    return Err(CtxError::NoSelectionMade("tags".into()));
                }
                Some(chosen) => chosen,
            }
        }
    };

    Ok(unique_in_order(selected))
}

/// Distinct tags across all fragments, sorted.
pub fn available_tags(fragments: &[Fragment]) -> Vec<String> {
    tag_counts(fragments).into_iter().map(|count| count.tag).collect()
}

/// Number of fragments declaring a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub fragments: usize,
}

/// Per-tag fragment counts, sorted by tag. A fragment declaring a tag twice counts once.
pub fn tag_counts(fragments: &[Fragment]) -> Vec<TagCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for fragment in fragments {
        for tag in unique_in_order(fragment.tags.iter().cloned()) {
            *counts.entry(tag).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(tag, fragments)| TagCount {
            tag,
            fragments,
        })
        .collect()
}

/// Fragments carrying at least one selected tag, in their original order.
///
/// An empty selection means "everything" and returns the input unchanged.
pub fn filter_by_tags(fragments: &[Fragment], selected: &[String]) -> Vec<Fragment> {
    if selected.is_empty() {
        return fragments.to_vec();
    }
    fragments
        .iter()
        .filter(|fragment| fragment.has_any_tag(selected))
        .cloned()
        .collect()
}
