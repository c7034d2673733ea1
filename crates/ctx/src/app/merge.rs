//! Combining global and local fragment sets.

use std::collections::HashSet;
use std::ffi::OsStr;

use crate::domain::model::{Fragment, OverrideMode};

/// Merge the global and local fragment sets.
///
/// Local fragments always come first. With [`OverrideMode::LocalOverridesGlobal`] a global
/// fragment is dropped when any local fragment shares its file name; directories do not take
/// part in the comparison. [`OverrideMode::IncludeBoth`] keeps every fragment from both sets.
pub fn merge_fragments(
    global: Vec<Fragment>,
    local: Vec<Fragment>,
    mode: OverrideMode,
) -> Vec<Fragment> {
    match mode {
        OverrideMode::IncludeBoth => {
            let mut merged = local;
            merged.extend(global);
            merged
        }
        OverrideMode::LocalOverridesGlobal => {
            let overridden: HashSet<&OsStr> =
                local.iter().filter_map(Fragment::basename).collect();
            let kept: Vec<Fragment> = global
                .into_iter()
                .filter(|fragment| {
                    let shadowed = fragment
                        .basename()
                        .is_some_and(|name| overridden.contains(name));
                    if shadowed {
                        tracing::debug!(
                            path = %fragment.path.display(),
                            "global fragment overridden by local copy"
                        );
                    }
                    !shadowed
                })
                .collect();

            let mut merged = local;
            merged.extend(kept);
            merged
        }
    }
}
