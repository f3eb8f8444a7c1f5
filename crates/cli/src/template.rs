// SPDX-License-Identifier: MIT

//! The fixed prompt template library.

use crate::model::{OutputFormat, RunSettings};

/// Scenario fields carried by a template.
#[derive(Clone, Debug)]
pub struct TemplateScenario {
    pub name: &'static str,
    pub goal: &'static str,
    pub constraints: &'static [&'static str],
    pub output_format: OutputFormat,
}

/// A starting point for the builder draft.
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub scenario: TemplateScenario,
    pub prompt_text: &'static str,
    pub settings: RunSettings,
}

/// The template library, in menu order. The first entry seeds the
/// default draft.
pub fn templates() -> &'static [PromptTemplate; 5] {
    &TEMPLATES
}

/// Look up a template by id.
pub fn template_by_id(id: &str) -> Option<&'static PromptTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

static TEMPLATES: [PromptTemplate; 5] = [
    PromptTemplate {
        id: "bug-fix",
        name: "Bug Fix",
        description: "Locate root cause and provide a minimal safe patch.",
        scenario: TemplateScenario {
            name: "Stabilize Checkout Bug",
            goal: "Resolve a reproducible payment edge case without changing public APIs.",
            constraints: &["No breaking changes", "Preserve tests", "Small diff"],
            output_format: OutputFormat::Code,
        },
        prompt_text: "You are fixing a production bug.\n\nContext:\n- Module: <path/to/file>\n- Symptom: <what fails>\n- Repro steps: <steps>\n\nTasks:\n1. Explain the root cause in 2-4 bullets.\n2. Provide a minimal patch.\n3. Add or update tests proving the fix.\n4. List risk and rollback plan.\n\nReturn code first, then brief rationale.",
        settings: RunSettings {
            temperature: 0.2,
            max_tokens: 1600,
        },
    },
    PromptTemplate {
        id: "refactor",
        name: "Refactor",
        description: "Improve structure and readability while keeping behavior unchanged.",
        scenario: TemplateScenario {
            name: "Refactor Legacy Service",
            goal: "Reduce complexity and improve maintainability.",
            constraints: &["Behavior must match", "Type-safe", "Document tradeoffs"],
            output_format: OutputFormat::Markdown,
        },
        prompt_text: "Refactor this code for readability and maintainability.\n\nRequirements:\n- Keep observable behavior identical.\n- Split large functions into composable units.\n- Improve naming and remove duplication.\n- Keep final answer concise.\n\nOutput:\n- Refactoring plan\n- Updated code\n- Why this is safer",
        settings: RunSettings {
            temperature: 0.35,
            max_tokens: 1800,
        },
    },
    PromptTemplate {
        id: "write-tests",
        name: "Write Tests",
        description: "Generate focused tests for critical behavior and edge cases.",
        scenario: TemplateScenario {
            name: "Coverage Expansion Sprint",
            goal: "Add high-signal tests for fragile paths.",
            constraints: &["Fast tests", "Deterministic", "Edge cases included"],
            output_format: OutputFormat::Code,
        },
        prompt_text: "Write tests for the following module:\n\n<module code>\n\nRequirements:\n- Cover success path, failure path, and edge cases.\n- Use clear arrange/act/assert structure.\n- Avoid brittle snapshot tests unless justified.\n- Include one table-driven test if suitable.\n\nReturn only test code and short assumptions.",
        settings: RunSettings {
            temperature: 0.15,
            max_tokens: 1400,
        },
    },
    PromptTemplate {
        id: "explain-code",
        name: "Explain Code",
        description: "Produce a concise technical walkthrough for onboarding and reviews.",
        scenario: TemplateScenario {
            name: "Architecture Walkthrough",
            goal: "Explain critical flow for a new team member.",
            constraints: &["Clear language", "No fluff", "Highlight risks"],
            output_format: OutputFormat::PlainText,
        },
        prompt_text: "Explain this code to a senior engineer joining the team.\n\nInclude:\n1. High-level purpose\n2. Data flow in order\n3. Important edge cases\n4. Risks and technical debt\n5. Suggested next improvements\n\nKeep the explanation practical and no more than 400 words.",
        settings: RunSettings {
            temperature: 0.4,
            max_tokens: 1100,
        },
    },
    PromptTemplate {
        id: "generate-ui-component",
        name: "Generate UI Component",
        description: "Create a production-ready UI component with accessibility details.",
        scenario: TemplateScenario {
            name: "Design System Component",
            goal: "Generate a reusable component with good defaults and keyboard support.",
            constraints: &["Accessible", "Responsive", "Theme-aware"],
            output_format: OutputFormat::Json,
        },
        prompt_text: "Generate a reusable UI component spec and implementation notes.\n\nReturn valid JSON with these keys:\n- componentName\n- props\n- interactionStates\n- accessibilityChecklist\n- implementationPlan\n\nContext:\n- Framework: React + TypeScript\n- Styling: Tailwind\n- Goal: ship-ready component",
        settings: RunSettings {
            temperature: 0.3,
            max_tokens: 1300,
        },
    },
];
