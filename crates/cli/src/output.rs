// SPDX-License-Identifier: MIT

//! Human-readable rendering for the CLI.

use crate::diff::LineDiff;
use crate::export::format_duration;
use crate::model::{Run, RunStatus};
use crate::template::PromptTemplate;
use chrono::{DateTime, Utc};
use std::io::Write;

/// Short display form for a timestamp, e.g. `Jan 15 10:30`.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format("%b %d %H:%M").to_string()
}

/// Print an error line to stderr.
pub fn print_error(message: impl AsRef<str>) {
    eprintln!("error: {}", message.as_ref());
}

/// List the template library.
pub fn write_templates<W: Write>(
    w: &mut W,
    templates: &[PromptTemplate],
) -> std::io::Result<()> {
    for template in templates {
        writeln!(w, "{:<22} {}", template.id, template.name)?;
        writeln!(w, "{:<22} {}", "", template.description)?;
        writeln!(
            w,
            "{:<22} {} | temp {:.2} | max {} tokens",
            "",
            template.scenario.output_format,
            template.settings.temperature,
            template.settings.max_tokens
        )?;
    }
    Ok(())
}

/// One-line-per-run history listing.
pub fn write_history<W: Write>(w: &mut W, runs: &[Run]) -> std::io::Result<()> {
    if runs.is_empty() {
        return writeln!(w, "No runs match.");
    }
    for run in runs {
        let best = if run.is_best { "*" } else { " " };
        writeln!(
            w,
            "{best} {id}  {when}  {status:<9}  {format:<10}  {duration:>8}  {name}",
            id = short_id(&run.id),
            when = format_timestamp(run.created_at),
            status = run.status.to_string(),
            format = run.scenario_snapshot.output_format.to_string(),
            duration = duration_cell(run),
            name = run.scenario_snapshot.name,
        )?;
    }
    Ok(())
}

/// Full view of one run: metadata, notes, and output text.
pub fn write_run<W: Write>(w: &mut W, run: &Run) -> std::io::Result<()> {
    writeln!(w, "run       {}", run.id)?;
    writeln!(w, "scenario  {} ({})", run.scenario_snapshot.name, run.scenario_id)?;
    writeln!(w, "goal      {}", run.scenario_snapshot.goal)?;
    writeln!(
        w,
        "tags      {}",
        if run.scenario_snapshot.constraints.is_empty() {
            "none".to_string()
        } else {
            run.scenario_snapshot.constraints.join(", ")
        }
    )?;
    writeln!(w, "format    {}", run.scenario_snapshot.output_format)?;
    writeln!(
        w,
        "settings  temp {:.2} | max {} tokens",
        run.settings.temperature, run.settings.max_tokens
    )?;
    writeln!(w, "created   {}", format_timestamp(run.created_at))?;
    writeln!(w, "status    {}{}", run.status, best_suffix(run))?;
    if run.status == RunStatus::Completed {
        writeln!(w, "duration  {}", format_duration(run.duration_ms))?;
    }
    if !run.notes.is_empty() {
        writeln!(w, "notes     {}", run.notes)?;
    }
    if !run.output_text.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", run.output_text)?;
    }
    Ok(())
}

/// Render a positional diff: every line of both sides, changed indices
/// marked, plus the changed-line count.
pub fn write_diff<W: Write>(w: &mut W, left: &Run, right: &Run, diff: &LineDiff) -> std::io::Result<()> {
    writeln!(
        w,
        "{} changed line{}",
        diff.changed_count,
        if diff.changed_count == 1 { "" } else { "s" }
    )?;
    writeln!(w)?;
    writeln!(w, "--- {} ({})", short_id(&left.id), left.scenario_snapshot.name)?;
    for (index, line) in diff.left_lines.iter().enumerate() {
        let marker = if diff.left_changed.contains(&index) { "!" } else { " " };
        writeln!(w, "{marker} {index:>4} {line}")?;
    }
    writeln!(w)?;
    writeln!(w, "+++ {} ({})", short_id(&right.id), right.scenario_snapshot.name)?;
    for (index, line) in diff.right_lines.iter().enumerate() {
        let marker = if diff.right_changed.contains(&index) { "!" } else { " " };
        writeln!(w, "{marker} {index:>4} {line}")?;
    }
    Ok(())
}

fn best_suffix(run: &Run) -> &'static str {
    if run.is_best {
        " (best)"
    } else {
        ""
    }
}

fn duration_cell(run: &Run) -> String {
    match run.status {
        RunStatus::Completed => format_duration(run.duration_ms),
        RunStatus::Running => "...".to_string(),
        RunStatus::Failed => "-".to_string(),
    }
}

/// First eight characters of a run id, enough to disambiguate locally.
pub fn short_id(id: &str) -> &str {
    let end = id
        .char_indices()
        .nth(8)
        .map(|(index, _)| index)
        .unwrap_or(id.len());
    &id[..end]
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
