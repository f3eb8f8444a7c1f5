// SPDX-License-Identifier: MIT

//! Core entities: scenarios, runs, and the builder draft.
//!
//! Field names serialize in camelCase so the stored aggregate matches the
//! original on-disk format (`codexlab:store:v1`).

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format a scenario asks the backend for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
pub enum OutputFormat {
    Code,
    Markdown,
    #[serde(rename = "JSON")]
    #[value(name = "json")]
    Json,
    #[serde(rename = "Plain text")]
    #[value(name = "plain-text")]
    PlainText,
}

impl OutputFormat {
    /// All formats, in menu order.
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Code,
        OutputFormat::Markdown,
        OutputFormat::Json,
        OutputFormat::PlainText,
    ];

    /// The user-facing label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Code => "Code",
            OutputFormat::Markdown => "Markdown",
            OutputFormat::Json => "JSON",
            OutputFormat::PlainText => "Plain text",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of a run. `Running` transitions to exactly one of
/// `Completed` or `Failed`; both are terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Persisted theme preference.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// The serialized form, also used as the CLI label.
    pub fn label(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// The other mode.
    pub fn toggled(&self) -> ThemeMode {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

/// Sampling settings attached to each run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSettings {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl RunSettings {
    /// Smallest accepted token budget; smaller drafts are rejected.
    pub const MIN_MAX_TOKENS: u32 = 64;

    /// Build settings with temperature clamped into `[0, 1]`.
    pub fn new(temperature: f64, max_tokens: u32) -> Self {
        Self {
            temperature: temperature.clamp(0.0, 1.0),
            max_tokens,
        }
    }
}

/// A named, reusable intent that runs are executed against.
///
/// Re-running with the same id upserts the entry in place: `updated_at`
/// refreshes and the editable fields are overwritten, never appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub goal: String,
    pub constraints: Vec<String>,
    pub output_format: OutputFormat,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Point-in-time copy of scenario fields embedded in a run.
///
/// Never changes after run creation, even if the originating scenario is
/// later edited or deleted; historical display reads this, not the
/// scenario collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSnapshot {
    pub name: String,
    pub goal: String,
    pub constraints: Vec<String>,
    pub output_format: OutputFormat,
}

/// One execution record.
///
/// Immutable once created apart from the completion fields (`status`,
/// `output_text`, `duration_ms`) and the annotation fields (`is_best`,
/// `notes`). `scenario_id` is a weak reference: lookup only, may dangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    pub scenario_id: String,
    pub prompt_text: String,
    pub settings: RunSettings,
    pub output_text: String,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub is_best: bool,
    pub notes: String,
    pub scenario_snapshot: ScenarioSnapshot,
}

/// The ephemeral, editable working copy that precedes scenario and run
/// creation. Never persisted on its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// Present only when editing or re-running an existing scenario.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    pub scenario_name: String,
    pub goal: String,
    pub constraints: Vec<String>,
    pub output_format: OutputFormat,
    pub prompt_text: String,
    pub settings: RunSettings,
}

impl Draft {
    /// A defensive value copy, insulating an in-flight run from further
    /// edits to the live draft. `Vec` and settings are owned copies, not
    /// shared references.
    pub fn snapshot(&self) -> Draft {
        self.clone()
    }
}

/// Comparator for most-recent-first run display.
pub fn by_newest(a: &Run, b: &Run) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at)
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
