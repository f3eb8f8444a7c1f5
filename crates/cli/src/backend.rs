// SPDX-License-Identifier: MIT

//! The execution backend boundary and the built-in simulated backend.
//!
//! The backend is called at most once per submission and delivers its
//! result or failure exactly once; there are no partial or streaming
//! results.

use crate::model::{Draft, OutputFormat};
use crate::time::{Clock, ClockHandle};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// What a backend produces for a draft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub output_text: String,
    pub duration_ms: u64,
}

/// Backend-side failure.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("execution failed: {0}")]
    Failed(String),
}

/// Boxed future returned by [`ExecutionBackend::execute`].
pub type ExecuteFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ExecutionOutput, BackendError>> + Send + 'a>>;

/// Turns a draft snapshot into output text and a duration.
pub trait ExecutionBackend: Send + Sync {
    /// Execute the draft. The draft is an owned snapshot; the live draft
    /// may keep changing while this is outstanding.
    fn execute(&self, draft: Draft) -> ExecuteFuture<'_>;
}

/// Local backend that fabricates plausible output per format after a
/// randomized delay, so the workspace works end to end without real
/// inference.
#[derive(Clone, Debug)]
pub struct SimulatedBackend {
    clock: ClockHandle,
}

impl SimulatedBackend {
    pub fn new(clock: ClockHandle) -> Self {
        Self { clock }
    }
}

impl ExecutionBackend for SimulatedBackend {
    fn execute(&self, draft: Draft) -> ExecuteFuture<'_> {
        Box::pin(async move {
            let duration_ms = 850 + fastrand::u64(..900);
            self.clock.sleep(Duration::from_millis(duration_ms)).await;
            Ok(ExecutionOutput {
                output_text: output_for_format(draft.output_format, &draft),
                duration_ms,
            })
        })
    }
}

/// Backend that always fails, for exercising the failure path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingBackend;

impl ExecutionBackend for FailingBackend {
    fn execute(&self, _draft: Draft) -> ExecuteFuture<'_> {
        Box::pin(async { Err(BackendError::Failed("injected failure".to_string())) })
    }
}

/// Collapse whitespace and truncate to `max_length`, with an ellipsis
/// when shortened.
fn preview_text(text: &str, max_length: usize) -> String {
    let compact = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.chars().count() <= max_length {
        return compact;
    }
    let truncated: String = compact.chars().take(max_length).collect();
    format!("{truncated}...")
}

fn escape_single_quotes(text: &str) -> String {
    text.replace('\'', "\\'")
}

fn output_for_format(format: OutputFormat, draft: &Draft) -> String {
    match format {
        OutputFormat::Code => code_output(draft),
        OutputFormat::Markdown => markdown_output(draft),
        OutputFormat::Json => json_output(draft),
        OutputFormat::PlainText => plain_text_output(draft),
    }
}

fn code_output(draft: &Draft) -> String {
    let constraints = if draft.constraints.is_empty() {
        "  'No explicit constraints provided'".to_string()
    } else {
        draft
            .constraints
            .iter()
            .map(|item| format!("  '{item}'"))
            .collect::<Vec<_>>()
            .join(",\n")
    };
    let inline_constraints = draft
        .constraints
        .iter()
        .map(|tag| format!("'{}'", escape_single_quotes(tag)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "type ScenarioInput = {{\n  name: string;\n  goal: string;\n  prompt: string;\n  constraints: string[];\n}};\n\nexport function runScenario(input: ScenarioInput) {{\n  const summary = {{\n    id: crypto.randomUUID(),\n    createdAt: new Date().toISOString(),\n    score: 0.92,\n    modelHints: {{\n      temperature: {temperature:.2},\n      maxTokens: {max_tokens},\n    }},\n  }};\n\n  return {{\n    ...summary,\n    scenario: input.name,\n    goal: input.goal,\n    promptPreview: input.prompt.slice(0, 120),\n    constraints: [\n{constraints}\n    ],\n  }};\n}}\n\nconst result = runScenario({{\n  name: '{name}',\n  goal: '{goal}',\n  prompt: '{prompt}',\n  constraints: [{inline_constraints}],\n}});\n\nconsole.log(result);\n",
        temperature = draft.settings.temperature,
        max_tokens = draft.settings.max_tokens,
        name = draft.scenario_name,
        goal = escape_single_quotes(&draft.goal),
        prompt = escape_single_quotes(&preview_text(&draft.prompt_text, 72)),
    )
}

fn markdown_output(draft: &Draft) -> String {
    let constraint_lines = if draft.constraints.is_empty() {
        "- None provided".to_string()
    } else {
        draft
            .constraints
            .iter()
            .map(|tag| format!("- {tag}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "# {name}\n\n## Goal\n{goal}\n\n## Constraints\n{constraint_lines}\n\n## Prompt Snapshot\n> {preview}\n\n## Recommended Next Steps\n1. Run one low-temperature baseline.\n2. Run one exploratory variant at +0.2 temperature.\n3. Compare outputs and mark the strongest run as Best.\n",
        name = draft.scenario_name,
        goal = draft.goal,
        preview = preview_text(&draft.prompt_text, 180),
    )
}

fn json_output(draft: &Draft) -> String {
    let determinism = if draft.settings.temperature <= 0.3 {
        "high"
    } else {
        "moderate"
    };
    let payload = serde_json::json!({
        "scenario": {
            "name": draft.scenario_name,
            "goal": draft.goal,
            "constraints": draft.constraints,
            "outputFormat": draft.output_format,
        },
        "runSummary": {
            "qualityScore": 0.89,
            "determinism": determinism,
            "promptDigest": preview_text(&draft.prompt_text, 120),
            "settings": draft.settings,
        },
        "suggestions": [
            "Add one strict negative constraint to reduce off-target output.",
            "Capture acceptance criteria as checkboxes in the prompt.",
            "Duplicate this run and test with lower max tokens for concise responses.",
        ],
    });
    serde_json::to_string_pretty(&payload).unwrap_or_default()
}

fn plain_text_output(draft: &Draft) -> String {
    let constraints = if draft.constraints.is_empty() {
        "none".to_string()
    } else {
        draft.constraints.join(", ")
    };

    format!(
        "Scenario {name} was processed with {max_tokens} max tokens at temperature {temperature:.2}. The primary goal is {goal}. Active constraints: {constraints}. Prompt summary: {preview}. Suggested next action: run one stricter variant focused on acceptance criteria and compare line-by-line against this result.",
        name = draft.scenario_name,
        max_tokens = draft.settings.max_tokens,
        temperature = draft.settings.temperature,
        goal = draft.goal,
        preview = preview_text(&draft.prompt_text, 200),
    )
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
