// SPDX-License-Identifier: MIT

//! Run history filtering: format, tag, and text predicates combined
//! with AND.

use crate::model::{OutputFormat, Run};
use std::collections::BTreeSet;

/// Filter state for the run history.
///
/// `None` for format or tag means pass-through; an empty or whitespace
/// search passes everything.
#[derive(Clone, Debug, Default)]
pub struct HistoryFilter {
    pub format: Option<OutputFormat>,
    pub tag: Option<String>,
    pub search: String,
}

impl HistoryFilter {
    /// All three predicates must pass.
    pub fn matches(&self, run: &Run) -> bool {
        let matches_format = self
            .format
            .is_none_or(|format| run.scenario_snapshot.output_format == format);

        let matches_tag = self
            .tag
            .as_deref()
            .is_none_or(|tag| run.scenario_snapshot.constraints.iter().any(|c| c == tag));

        let query = self.search.trim().to_lowercase();
        let matches_query = query.is_empty()
            || run.scenario_snapshot.name.to_lowercase().contains(&query)
            || run.prompt_text.to_lowercase().contains(&query);

        matches_format && matches_tag && matches_query
    }
}

/// Apply a filter, preserving run order.
pub fn filter_runs<'a>(runs: &'a [Run], filter: &HistoryFilter) -> Vec<&'a Run> {
    runs.iter().filter(|run| filter.matches(run)).collect()
}

/// The tag vocabulary: union of all runs' snapshot constraints,
/// deduplicated and lexicographically sorted.
pub fn all_tags(runs: &[Run]) -> Vec<String> {
    let tags: BTreeSet<&str> = runs
        .iter()
        .flat_map(|run| run.scenario_snapshot.constraints.iter())
        .map(String::as_str)
        .collect();
    tags.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
