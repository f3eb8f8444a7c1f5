// SPDX-License-Identifier: MIT

//! Export naming, tag cleanup, and small display formatters.

use crate::model::{OutputFormat, Run};

/// Lowercase, trim, strip everything outside `[a-z0-9 -]`, collapse
/// whitespace runs to single dashes, then collapse repeated dashes.
pub fn slugify(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(lowered.len());
    let mut last_dash = false;
    for c in lowered.trim().chars() {
        let mapped = if c == ' ' { '-' } else { c };
        if mapped == '-' {
            if !last_dash {
                slug.push('-');
            }
            last_dash = true;
        } else {
            slug.push(mapped);
            last_dash = false;
        }
    }
    slug
}

/// Trim a tag and collapse internal whitespace runs to single spaces.
pub fn sanitize_tag(tag: &str) -> String {
    tag.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean a tag list: sanitize each entry, drop empties, and keep only
/// the first occurrence of a repeated tag, preserving order.
pub fn sanitize_tags(tags: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = sanitize_tag(tag);
        if !tag.is_empty() && !cleaned.contains(&tag) {
            cleaned.push(tag);
        }
    }
    cleaned
}

/// File extension for an output format.
pub fn extension_for(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Code => "ts",
        OutputFormat::Markdown => "md",
        OutputFormat::Json => "json",
        OutputFormat::PlainText => "txt",
    }
}

/// Deterministic export file name: slugified scenario name, the run's
/// creation timestamp with `:` and `.` replaced, and the format's
/// extension. The exported content is the run's output text verbatim.
pub fn export_file_name(run: &Run) -> String {
    let timestamp = run
        .created_at
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!(
        "{}-{}.{}",
        slugify(&run.scenario_snapshot.name),
        timestamp,
        extension_for(run.scenario_snapshot.output_format)
    )
}

/// Short human form for a run duration.
pub fn format_duration(milliseconds: u64) -> String {
    if milliseconds < 1000 {
        format!("{milliseconds}ms")
    } else {
        format!("{:.2}s", milliseconds as f64 / 1000.0)
    }
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
