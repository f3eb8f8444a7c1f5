// SPDX-License-Identifier: MIT

//! Draft construction: default, from a template, and from an existing run.

use crate::model::{Draft, Run, RunSettings};
use crate::template::{templates, PromptTemplate};

/// Suffix appended to the scenario name when duplicating a run.
const COPY_SUFFIX: &str = " Copy";

/// The draft the builder opens with, seeded from the first template.
pub fn default_draft() -> Draft {
    from_template(&templates()[0])
}

/// Build a draft from a template.
///
/// Constraints and settings are independent copies; editing the draft
/// cannot mutate the template.
pub fn from_template(template: &PromptTemplate) -> Draft {
    Draft {
        scenario_id: None,
        scenario_name: template.scenario.name.to_string(),
        goal: template.scenario.goal.to_string(),
        constraints: template
            .scenario
            .constraints
            .iter()
            .map(|c| c.to_string())
            .collect(),
        output_format: template.scenario.output_format,
        prompt_text: template.prompt_text.to_string(),
        settings: RunSettings::new(template.settings.temperature, template.settings.max_tokens),
    }
}

/// Duplicate a run back into an editable draft.
///
/// The draft carries no `scenario_id`: duplication always starts a new
/// scenario lineage instead of upserting onto the original.
pub fn from_run(run: &Run) -> Draft {
    Draft {
        scenario_id: None,
        scenario_name: format!("{}{}", run.scenario_snapshot.name, COPY_SUFFIX),
        goal: run.scenario_snapshot.goal.clone(),
        constraints: run.scenario_snapshot.constraints.clone(),
        output_format: run.scenario_snapshot.output_format,
        prompt_text: run.prompt_text.clone(),
        settings: run.settings,
    }
}

#[cfg(test)]
#[path = "draft_tests.rs"]
mod tests;
