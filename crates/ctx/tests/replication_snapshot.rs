use anyhow::Result;
use ctx::app::replication::ReplicationRecorder;
use ctx::domain::model::Fragment;
use insta::assert_snapshot;

#[test]
fn manifest_for_two_fragments() -> Result<()> {
    let fragments = vec![
        Fragment::new(
            ".ctx/fragments/common.md",
            vec!["common".into(), "local".into()],
            "local common",
        ),
        Fragment::new("fragments/ts.md", vec!["typescript".into()], "global ts"),
    ];
    let tags = vec!["common".to_owned(), "typescript".to_owned()];

    let manifest = ReplicationRecorder::new()?.record(&fragments, &tags)?;

    assert_snapshot!(manifest.trim_end(), @r###"
    # ctx command file for replication
    # Generated automatically - do not edit manually

    ## Selected Tags
    - common
    - typescript

    ## Fragments Used
    - .ctx/fragments/common.md (tags: common, local)
    - fragments/ts.md (tags: typescript)

    ## Command
    ```
    ctx build --tags common,typescript
    ```
    "###);
    Ok(())
}
