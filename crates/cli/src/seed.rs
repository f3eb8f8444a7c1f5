// SPDX-License-Identifier: MIT

//! Fixed example data written when the store is empty or unreadable.

use crate::model::{Run, RunStatus, Scenario, ScenarioSnapshot};
use crate::template::{templates, PromptTemplate};
use crate::time::Clock;
use chrono::{DateTime, Duration, Utc};

fn snapshot_of(template: &PromptTemplate) -> ScenarioSnapshot {
    ScenarioSnapshot {
        name: template.scenario.name.to_string(),
        goal: template.scenario.goal.to_string(),
        constraints: template
            .scenario
            .constraints
            .iter()
            .map(|c| c.to_string())
            .collect(),
        output_format: template.scenario.output_format,
    }
}

fn scenario_of(
    template: &PromptTemplate,
    id: &str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Scenario {
    let snapshot = snapshot_of(template);
    Scenario {
        id: id.to_string(),
        name: snapshot.name,
        goal: snapshot.goal,
        constraints: snapshot.constraints,
        output_format: snapshot.output_format,
        created_at,
        updated_at,
    }
}

/// Build the three-scenario, three-run example set, with timestamps
/// offset into the recent past.
pub fn seed_data(clock: &dyn Clock) -> (Vec<Scenario>, Vec<Run>) {
    let now = clock.now_utc();
    let minutes_ago = |m: i64| now - Duration::minutes(m);

    let [bug_fix, refactor, write_tests, ..] = templates();

    let scenarios = vec![
        scenario_of(bug_fix, "scenario-seed-1", minutes_ago(180), minutes_ago(120)),
        scenario_of(refactor, "scenario-seed-2", minutes_ago(95), minutes_ago(70)),
        scenario_of(write_tests, "scenario-seed-3", minutes_ago(60), minutes_ago(45)),
    ];

    let runs = vec![
        Run {
            id: "run-seed-1".to_string(),
            scenario_id: "scenario-seed-1".to_string(),
            prompt_text: bug_fix.prompt_text.to_string(),
            settings: bug_fix.settings,
            output_text: SEED_OUTPUT_BUG_FIX.to_string(),
            status: RunStatus::Completed,
            created_at: minutes_ago(40),
            duration_ms: 1126,
            is_best: true,
            notes: "Best run so far. Tight patch and clear guard clauses.".to_string(),
            scenario_snapshot: snapshot_of(bug_fix),
        },
        Run {
            id: "run-seed-2".to_string(),
            scenario_id: "scenario-seed-2".to_string(),
            prompt_text: refactor.prompt_text.to_string(),
            settings: refactor.settings,
            output_text: SEED_OUTPUT_REFACTOR.to_string(),
            status: RunStatus::Completed,
            created_at: minutes_ago(24),
            duration_ms: 957,
            is_best: false,
            notes: "Readable, but could be more concrete on tradeoffs.".to_string(),
            scenario_snapshot: snapshot_of(refactor),
        },
        Run {
            id: "run-seed-3".to_string(),
            scenario_id: "scenario-seed-3".to_string(),
            prompt_text: write_tests.prompt_text.to_string(),
            settings: write_tests.settings,
            output_text: SEED_OUTPUT_COMPONENT.to_string(),
            status: RunStatus::Completed,
            created_at: minutes_ago(8),
            duration_ms: 801,
            is_best: false,
            notes: String::new(),
            scenario_snapshot: snapshot_of(write_tests),
        },
    ];

    (scenarios, runs)
}

const SEED_OUTPUT_BUG_FIX: &str = r#"type CheckoutInput = {
  cartId: string;
  totalCents: number;
};

export function validateCheckout(input: CheckoutInput): void {
  if (!input.cartId.trim()) {
    throw new Error('Missing cart id');
  }

  // Guard against NaN and negative values before rounding.
  if (!Number.isFinite(input.totalCents) || input.totalCents < 0) {
    throw new Error('Invalid total');
  }
}
"#;

const SEED_OUTPUT_REFACTOR: &str = r#"## Refactor Plan

1. Extract request validation from the handler.
2. Move persistence concerns into a small repository wrapper.
3. Replace nested conditionals with early returns.

## Safety Notes

- Kept all public method signatures unchanged.
- Added explicit unit tests around branch-heavy behavior.
- Preserved logging format to avoid breaking monitoring dashboards.
"#;

const SEED_OUTPUT_COMPONENT: &str = r#"{
  "componentName": "MetricCard",
  "props": {
    "title": "string",
    "value": "string | number",
    "trend": "'up' | 'down' | 'neutral'"
  },
  "interactionStates": ["default", "hover", "focus-visible"],
  "accessibilityChecklist": [
    "4.5:1 text contrast",
    "Semantic heading structure",
    "Keyboard focus ring"
  ],
  "implementationPlan": [
    "Create typed props interface",
    "Add responsive Tailwind classes",
    "Document examples in Storybook"
  ]
}"#;

#[cfg(test)]
#[path = "seed_tests.rs"]
mod tests;
