// SPDX-License-Identifier: MIT

//! The run lifecycle controller.
//!
//! Owns the scenario and run collections, the editable draft, and the
//! single-flight submission flow: validate, upsert the scenario, create
//! a running run, invoke the backend, then transition the run to
//! completed or failed. All mutations are discrete serialized updates
//! under one lock; the only suspension point is the backend call, made
//! with the lock released.

use crate::backend::ExecutionBackend;
use crate::draft::{default_draft, from_run, from_template};
use crate::export::sanitize_tags;
use crate::filter::{all_tags, filter_runs, HistoryFilter};
use crate::model::{
    by_newest, Draft, Run, RunSettings, RunStatus, Scenario, ScenarioSnapshot, ThemeMode,
};
use crate::persistence;
use crate::template::template_by_id;
use crate::time::{Clock, ClockHandle};
use codexlab_store::{KvStore, StoreError};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// How long a transient status notice stays visible.
pub const STATUS_NOTICE_MS: u64 = 2200;

/// Generic fallback output when the backend fails.
pub const FAILED_OUTPUT_TEXT: &str = "Execution failed. Try running again.";

const VALIDATION_REQUIRED: &str = "Scenario name, goal, and prompt are required before running.";
const VALIDATION_MAX_TOKENS: &str = "Max tokens must be at least 64.";

/// Submission rejected before any state changed.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(String),
}

/// Outcome of a submission attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    /// A run was created and driven to a terminal status.
    Started { run_id: String },
    /// Another run was in flight; nothing changed.
    Busy,
}

/// Auto-expiring status notification.
#[derive(Clone, Debug)]
struct StatusNotice {
    message: String,
    expires_at_millis: u64,
}

struct WorkspaceState {
    scenarios: Vec<Scenario>,
    runs: Vec<Run>,
    draft: Draft,
    active_run_id: Option<String>,
    /// One-slot single-flight marker: at most one run may be `running`
    /// across the whole process.
    running_run_id: Option<String>,
    notice: Option<StatusNotice>,
}

/// The workspace: collections, draft, and submission control.
pub struct Workspace {
    state: Arc<RwLock<WorkspaceState>>,
    backend: Arc<dyn ExecutionBackend>,
    store: Arc<dyn KvStore>,
    clock: ClockHandle,
    recovered: bool,
}

impl Workspace {
    /// Load (or seed) the store and open a workspace over it.
    pub fn open(
        store: Arc<dyn KvStore>,
        backend: Arc<dyn ExecutionBackend>,
        clock: ClockHandle,
    ) -> Result<Self, StoreError> {
        let loaded = persistence::load_or_seed(store.as_ref(), &clock)?;
        let mut runs = loaded.runs;
        runs.sort_by(by_newest);
        let active_run_id = runs.first().map(|run| run.id.clone());

        Ok(Self {
            state: Arc::new(RwLock::new(WorkspaceState {
                scenarios: loaded.scenarios,
                runs,
                draft: default_draft(),
                active_run_id,
                running_run_id: None,
                notice: None,
            })),
            backend,
            store,
            clock,
            recovered: loaded.recovered,
        })
    }

    /// Whether opening reseeded an absent or corrupted store.
    pub fn recovered(&self) -> bool {
        self.recovered
    }

    /// Submit the current draft.
    ///
    /// Returns `Busy` without mutating anything while a run is in
    /// flight. Validation failures are reported synchronously and also
    /// mutate nothing. Otherwise the scenario is upserted, a running run
    /// is created and selected, the backend is invoked with a draft
    /// snapshot, and the run transitions to completed or failed. The
    /// in-flight marker is cleared unconditionally afterwards.
    pub async fn submit(&self) -> Result<Submission, SubmitError> {
        let (run_id, snapshot) = {
            let mut state = self.state.write();
            if state.running_run_id.is_some() {
                return Ok(Submission::Busy);
            }

            let draft = &state.draft;
            if draft.scenario_name.trim().is_empty()
                || draft.goal.trim().is_empty()
                || draft.prompt_text.trim().is_empty()
            {
                return Err(SubmitError::Validation(VALIDATION_REQUIRED.to_string()));
            }
            if draft.settings.max_tokens < RunSettings::MIN_MAX_TOKENS {
                return Err(SubmitError::Validation(VALIDATION_MAX_TOKENS.to_string()));
            }

            let mut snapshot = draft.snapshot();
            // Constraint tags are an ordered set: clean each entry and
            // drop repeats before anything is persisted.
            snapshot.constraints = sanitize_tags(&snapshot.constraints);
            let now = self.clock.now_utc();

            let scenario_id = snapshot
                .scenario_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            // Upsert: replace in place preserving created_at, or prepend.
            let created_at = state
                .scenarios
                .iter()
                .find(|s| s.id == scenario_id)
                .map(|s| s.created_at)
                .unwrap_or(now);
            let scenario = Scenario {
                id: scenario_id.clone(),
                name: snapshot.scenario_name.clone(),
                goal: snapshot.goal.clone(),
                constraints: snapshot.constraints.clone(),
                output_format: snapshot.output_format,
                created_at,
                updated_at: now,
            };
            match state.scenarios.iter().position(|s| s.id == scenario_id) {
                Some(index) => state.scenarios[index] = scenario.clone(),
                None => state.scenarios.insert(0, scenario.clone()),
            }
            state.draft.scenario_id = Some(scenario_id.clone());
            state.draft.constraints = snapshot.constraints.clone();

            let run_id = Uuid::new_v4().to_string();
            let run = Run {
                id: run_id.clone(),
                scenario_id,
                prompt_text: snapshot.prompt_text.clone(),
                settings: snapshot.settings,
                output_text: String::new(),
                status: RunStatus::Running,
                created_at: now,
                duration_ms: 0,
                is_best: false,
                notes: String::new(),
                scenario_snapshot: ScenarioSnapshot {
                    name: scenario.name,
                    goal: scenario.goal,
                    constraints: scenario.constraints,
                    output_format: scenario.output_format,
                },
            };
            state.runs.insert(0, run);
            state.active_run_id = Some(run_id.clone());
            state.running_run_id = Some(run_id.clone());
            self.persist(&state);
            (run_id, snapshot)
        };

        // Lock released: filtering, diffing, annotation, and draft edits
        // stay available while the backend call is outstanding.
        let result = self.backend.execute(snapshot).await;

        let mut state = self.state.write();
        match result {
            Ok(output) => {
                if let Some(run) = state.runs.iter_mut().find(|run| run.id == run_id) {
                    run.status = RunStatus::Completed;
                    run.output_text = output.output_text;
                    run.duration_ms = output.duration_ms;
                }
                self.set_notice(&mut state, "Run completed.");
            }
            Err(_) => {
                if let Some(run) = state.runs.iter_mut().find(|run| run.id == run_id) {
                    run.status = RunStatus::Failed;
                    run.output_text = FAILED_OUTPUT_TEXT.to_string();
                }
                self.set_notice(&mut state, "Run failed.");
            }
        }
        state.running_run_id = None;
        self.persist(&state);

        Ok(Submission::Started { run_id })
    }

    /// The current draft, by value.
    pub fn draft(&self) -> Draft {
        self.state.read().draft.clone()
    }

    /// Replace the draft for the next submission.
    pub fn set_draft(&self, draft: Draft) {
        self.state.write().draft = draft;
    }

    /// Reset the draft from a template. Returns false for unknown ids.
    pub fn apply_template(&self, template_id: &str) -> bool {
        match template_by_id(template_id) {
            Some(template) => {
                self.state.write().draft = from_template(template);
                true
            }
            None => false,
        }
    }

    /// Duplicate a run into the draft (new scenario lineage).
    pub fn duplicate_run(&self, run_id: &str) -> bool {
        let mut state = self.state.write();
        let Some(run) = state.runs.iter().find(|run| run.id == run_id).cloned() else {
            return false;
        };
        state.draft = from_run(&run);
        self.set_notice(&mut state, "Run duplicated into builder.");
        true
    }

    /// All runs, most recent first.
    pub fn history(&self) -> Vec<Run> {
        let mut runs = self.state.read().runs.clone();
        runs.sort_by(by_newest);
        runs
    }

    /// Runs passing a history filter, most recent first.
    pub fn filtered_history(&self, filter: &HistoryFilter) -> Vec<Run> {
        let runs = self.history();
        filter_runs(&runs, filter).into_iter().cloned().collect()
    }

    /// Completed runs, most recent first (the compare pool).
    pub fn completed_runs(&self) -> Vec<Run> {
        self.history()
            .into_iter()
            .filter(|run| run.status == RunStatus::Completed)
            .collect()
    }

    /// The scenario collection, newest-created first.
    pub fn scenarios(&self) -> Vec<Scenario> {
        self.state.read().scenarios.clone()
    }

    /// Look up one run.
    pub fn run(&self, run_id: &str) -> Option<Run> {
        self.state
            .read()
            .runs
            .iter()
            .find(|run| run.id == run_id)
            .cloned()
    }

    /// The currently selected run.
    pub fn active_run(&self) -> Option<Run> {
        let state = self.state.read();
        let id = state.active_run_id.as_deref()?;
        state.runs.iter().find(|run| run.id == id).cloned()
    }

    /// Select a run for display. Returns false for unknown ids.
    pub fn view_run(&self, run_id: &str) -> bool {
        let mut state = self.state.write();
        if state.runs.iter().any(|run| run.id == run_id) {
            state.active_run_id = Some(run_id.to_string());
            true
        } else {
            false
        }
    }

    /// Flip the best marker on the active run.
    pub fn toggle_best(&self) {
        let mut state = self.state.write();
        let Some(id) = state.active_run_id.clone() else {
            return;
        };
        if let Some(run) = state.runs.iter_mut().find(|run| run.id == id) {
            run.is_best = !run.is_best;
        }
        self.persist(&state);
    }

    /// Replace the notes on the active run.
    pub fn set_notes(&self, notes: &str) {
        let mut state = self.state.write();
        let Some(id) = state.active_run_id.clone() else {
            return;
        };
        if let Some(run) = state.runs.iter_mut().find(|run| run.id == id) {
            run.notes = notes.to_string();
        }
        self.persist(&state);
    }

    /// Delete a run. If it was active, selection falls back to the
    /// newest remaining run or to none.
    pub fn delete_run(&self, run_id: &str) -> bool {
        let mut state = self.state.write();
        let before = state.runs.len();
        state.runs.retain(|run| run.id != run_id);
        if state.runs.len() == before {
            return false;
        }
        state.runs.sort_by(by_newest);
        if state.active_run_id.as_deref() == Some(run_id) {
            state.active_run_id = state.runs.first().map(|run| run.id.clone());
        }
        self.persist(&state);
        true
    }

    /// The tag vocabulary across all runs.
    pub fn all_tags(&self) -> Vec<String> {
        all_tags(&self.state.read().runs)
    }

    /// The current transient status notice, if it has not expired.
    pub fn status_message(&self) -> Option<String> {
        let state = self.state.read();
        state
            .notice
            .as_ref()
            .filter(|notice| self.clock.now_millis() < notice.expires_at_millis)
            .map(|notice| notice.message.clone())
    }

    /// Export payload for a completed run: derived file name plus the
    /// output text verbatim. `None` for unknown or non-completed runs.
    pub fn export_run(&self, run_id: &str) -> Option<(String, String)> {
        let run = self.run(run_id)?;
        if run.status != RunStatus::Completed {
            return None;
        }
        Some((crate::export::export_file_name(&run), run.output_text))
    }

    /// The persisted theme preference.
    pub fn theme(&self) -> Result<ThemeMode, StoreError> {
        persistence::load_theme(self.store.as_ref())
    }

    /// Persist a theme preference.
    pub fn set_theme(&self, theme: ThemeMode) -> Result<(), StoreError> {
        persistence::save_theme(self.store.as_ref(), theme)
    }

    /// Flip and persist the theme, returning the new mode.
    pub fn toggle_theme(&self) -> Result<ThemeMode, StoreError> {
        let next = self.theme()?.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    fn set_notice(&self, state: &mut WorkspaceState, message: &str) {
        state.notice = Some(StatusNotice {
            message: message.to_string(),
            expires_at_millis: self.clock.now_millis() + STATUS_NOTICE_MS,
        });
    }

    // Writes are fire-and-forget: the in-process state change is the
    // source of truth and a failed write must not wedge the controller.
    fn persist(&self, state: &WorkspaceState) {
        let _ = persistence::save(self.store.as_ref(), &state.scenarios, &state.runs);
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
