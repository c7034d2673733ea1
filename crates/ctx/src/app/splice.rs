//! Joining fragment bodies into the composed document.

use crate::domain::model::Fragment;

/// Separator placed between consecutive fragment bodies.
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Concatenate fragment contents in the given order.
pub fn splice(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.content.as_str())
        .collect::<Vec<_>>()
        .join(FRAGMENT_SEPARATOR)
}
