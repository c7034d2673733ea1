//! Replication manifests describing how a document was composed.

use anyhow::{Result, anyhow};
use minijinja::Environment;
use serde::Serialize;

use crate::domain::model::Fragment;

const MANIFEST_TEMPLATE_NAME: &str = "replication";

/// Renders the manifest listing selected tags, contributing fragments, and the command that
/// rebuilds the same document.
pub struct ReplicationRecorder {
    env: Environment<'static>,
}

impl ReplicationRecorder {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.add_template(MANIFEST_TEMPLATE_NAME, MANIFEST_TEMPLATE)
            .map_err(|err| anyhow!("failed to register replication template: {err}"))?;
        Ok(Self { env })
    }

    pub fn record(&self, fragments: &[Fragment], selected_tags: &[String]) -> Result<String> {
        let context = ManifestContext {
            tags: selected_tags.to_vec(),
            joined_tags: selected_tags.join(","),
            fragments: fragments
                .iter()
                .map(|fragment| ManifestFragment {
                    path: fragment.path.display().to_string(),
                    tags: fragment.tags.join(", "),
                })
                .collect(),
        };

        self.env
            .get_template(MANIFEST_TEMPLATE_NAME)
            .and_then(|template| template.render(&context))
            .map_err(|err| anyhow!("failed to render replication manifest: {err}"))
    }
}

#[derive(Serialize)]
struct ManifestContext {
    tags: Vec<String>,
    joined_tags: String,
    fragments: Vec<ManifestFragment>,
}

#[derive(Serialize)]
struct ManifestFragment {
    path: String,
    tags: String,
}

const MANIFEST_TEMPLATE: &str = r#"# ctx command file for replication
# Generated automatically - do not edit manually

## Selected Tags
{% for tag in tags %}
- {{ tag }}
{% endfor %}

## Fragments Used
{% for fragment in fragments %}
- {{ fragment.path }} (tags: {{ fragment.tags }})
{% endfor %}

## Command
```
ctx build --tags {{ joined_tags }}
```
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_tags_fragments_and_command() -> Result<()> {
        let fragments = vec![
            Fragment::new(
                "/home/me/.config/.ctx/fragments/ts.md",
                vec!["typescript".into(), "global".into()],
                "body",
            ),
            Fragment::new("/repo/.ctx/fragments/common.md", vec!["common".into()], "body"),
        ];
        let tags = vec!["common".to_string(), "typescript".to_string()];

        let manifest = ReplicationRecorder::new()?.record(&fragments, &tags)?;

        assert!(manifest.starts_with("# ctx command file for replication\n"));
        assert!(manifest.contains("## Selected Tags\n- common\n- typescript\n\n"));
        assert!(manifest.contains(
            "- /home/me/.config/.ctx/fragments/ts.md (tags: typescript, global)\n"
        ));
        assert!(manifest.contains("ctx build --tags common,typescript\n"));
        Ok(())
    }

    #[test]
    fn empty_selection_still_renders() -> Result<()> {
        let manifest = ReplicationRecorder::new()?.record(&[], &[])?;
        assert!(manifest.contains("## Selected Tags\n\n## Fragments Used\n\n## Command"));
        Ok(())
    }
}
