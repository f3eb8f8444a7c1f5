// SPDX-License-Identifier: MIT

//! Positional line diff used for side-by-side run comparison.
//!
//! This is an index-aligned comparison, not a sequence alignment: line
//! `i` on the left is compared with line `i` on the right, so a single
//! inserted or deleted line shifts everything after it out of alignment
//! and marks the remainder changed. That behavior is intentional and
//! pinned by tests; do not swap in an LCS diff.

use std::collections::BTreeSet;

/// Result of diffing two texts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineDiff {
    pub left_lines: Vec<String>,
    pub right_lines: Vec<String>,
    /// Indices into `left_lines` whose line differs from the right.
    pub left_changed: BTreeSet<usize>,
    /// Indices into `right_lines` whose line differs from the left.
    pub right_changed: BTreeSet<usize>,
    /// The larger of the two changed-index-set sizes.
    pub changed_count: usize,
}

/// Compare two texts line by line at matching indices.
///
/// A missing line (index past one side's length) compares as an empty
/// string but is never marked changed on the side where it does not
/// exist, since there is no line there to highlight.
pub fn line_diff(left_text: &str, right_text: &str) -> LineDiff {
    let left_lines: Vec<String> = left_text.split('\n').map(str::to_string).collect();
    let right_lines: Vec<String> = right_text.split('\n').map(str::to_string).collect();

    let mut left_changed = BTreeSet::new();
    let mut right_changed = BTreeSet::new();

    let max = left_lines.len().max(right_lines.len());
    for index in 0..max {
        let left = left_lines.get(index).map(String::as_str).unwrap_or("");
        let right = right_lines.get(index).map(String::as_str).unwrap_or("");

        if left != right {
            if index < left_lines.len() {
                left_changed.insert(index);
            }
            if index < right_lines.len() {
                right_changed.insert(index);
            }
        }
    }

    let changed_count = left_changed.len().max(right_changed.len());
    LineDiff {
        left_lines,
        right_lines,
        left_changed,
        right_changed,
        changed_count,
    }
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
