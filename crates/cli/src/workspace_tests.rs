#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::backend::{
    ExecuteFuture, ExecutionBackend, ExecutionOutput, FailingBackend, SimulatedBackend,
};
use crate::persistence::STORE_KEY;
use codexlab_store::{KvStore, MemoryStore};
use std::sync::Arc;
use tokio::sync::Notify;

const EMPTY_AGGREGATE: &str = r#"{"version":1,"scenarios":[],"runs":[]}"#;

fn empty_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.set(STORE_KEY, EMPTY_AGGREGATE).unwrap();
    store
}

fn open_empty(backend: Arc<dyn ExecutionBackend>) -> (Workspace, MemoryStore, ClockHandle) {
    let store = empty_store();
    let clock = ClockHandle::fake_at(10 * 24 * 3600 * 1000);
    let workspace = Workspace::open(Arc::new(store.clone()), backend, clock.clone()).unwrap();
    (workspace, store, clock)
}

fn simulated(clock: &ClockHandle) -> Arc<dyn ExecutionBackend> {
    Arc::new(SimulatedBackend::new(clock.clone()))
}

fn open_simulated() -> (Workspace, MemoryStore, ClockHandle) {
    let clock = ClockHandle::fake_at(10 * 24 * 3600 * 1000);
    let store = empty_store();
    let workspace =
        Workspace::open(Arc::new(store.clone()), simulated(&clock), clock.clone()).unwrap();
    (workspace, store, clock)
}

/// Backend that parks until released, to hold a run in flight.
struct BlockingBackend {
    release: Arc<Notify>,
}

impl ExecutionBackend for BlockingBackend {
    fn execute(&self, _draft: crate::model::Draft) -> ExecuteFuture<'_> {
        let release = Arc::clone(&self.release);
        Box::pin(async move {
            release.notified().await;
            Ok(ExecutionOutput {
                output_text: "late output".to_string(),
                duration_ms: 5,
            })
        })
    }
}

async fn wait_for_running(workspace: &Workspace) {
    for _ in 0..1000 {
        if workspace
            .history()
            .iter()
            .any(|run| run.status == RunStatus::Running)
        {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("no run entered the running state");
}

#[test]
fn test_open_seeds_absent_store() {
    let clock = ClockHandle::fake_at(10 * 24 * 3600 * 1000);
    let store = MemoryStore::new();
    let workspace =
        Workspace::open(Arc::new(store.clone()), simulated(&clock), clock.clone()).unwrap();
    assert!(workspace.recovered());
    assert_eq!(workspace.scenarios().len(), 3);
    assert_eq!(workspace.history().len(), 3);
    // The newest seeded run is pre-selected.
    assert_eq!(workspace.active_run().unwrap().id, "run-seed-3");

    let reopened = Workspace::open(Arc::new(store), simulated(&clock), clock).unwrap();
    assert!(!reopened.recovered());
}

#[tokio::test]
async fn test_rejects_blank_required_fields() {
    let (workspace, _, _) = open_simulated();
    let mut draft = workspace.draft();
    draft.scenario_name = "   ".to_string();
    workspace.set_draft(draft);

    let err = workspace.submit().await.unwrap_err();
    let SubmitError::Validation(message) = err;
    assert_eq!(
        message,
        "Scenario name, goal, and prompt are required before running."
    );
    assert!(workspace.scenarios().is_empty());
    assert!(workspace.history().is_empty());
}

#[tokio::test]
async fn test_rejects_small_token_budget() {
    let (workspace, _, _) = open_simulated();
    let mut draft = workspace.draft();
    draft.settings.max_tokens = 32;
    workspace.set_draft(draft);

    let err = workspace.submit().await.unwrap_err();
    let SubmitError::Validation(message) = err;
    assert_eq!(message, "Max tokens must be at least 64.");
    assert!(workspace.scenarios().is_empty());
    assert!(workspace.history().is_empty());
}

#[tokio::test]
async fn test_submit_creates_scenario_and_completes_run() {
    let (workspace, _, _) = open_simulated();

    let submission = workspace.submit().await.unwrap();
    let Submission::Started { run_id } = submission else {
        panic!("expected a started run");
    };

    assert_eq!(workspace.scenarios().len(), 1);
    let runs = workspace.history();
    assert_eq!(runs.len(), 1);
    let run = &runs[0];
    assert_eq!(run.id, run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert!(!run.output_text.is_empty());
    assert!(run.duration_ms >= 850);
    assert_eq!(workspace.active_run().unwrap().id, run_id);
    assert_eq!(workspace.status_message().unwrap(), "Run completed.");

    // The draft now carries the minted scenario id for upsert re-runs.
    assert_eq!(
        workspace.draft().scenario_id.as_deref(),
        Some(workspace.scenarios()[0].id.as_str())
    );
}

#[tokio::test]
async fn test_resubmission_upserts_scenario_in_place() {
    let (workspace, _, clock) = open_simulated();

    workspace.submit().await.unwrap();
    let first = workspace.scenarios()[0].clone();

    clock.as_fake().unwrap().advance_ms(60_000);
    let mut draft = workspace.draft();
    draft.goal = "A sharper goal.".to_string();
    workspace.set_draft(draft);
    workspace.submit().await.unwrap();

    let scenarios = workspace.scenarios();
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0].id, first.id);
    assert_eq!(scenarios[0].goal, "A sharper goal.");
    assert_eq!(scenarios[0].created_at, first.created_at);
    assert!(scenarios[0].updated_at > first.updated_at);
    assert_eq!(workspace.history().len(), 2);
}

#[tokio::test]
async fn test_submit_cleans_and_dedupes_constraint_tags() {
    let (workspace, _, _) = open_simulated();
    let mut draft = workspace.draft();
    draft.constraints = vec![
        "Small diff".to_string(),
        "Small diff".to_string(),
        "  Small   diff ".to_string(),
        "   ".to_string(),
        "Preserve tests".to_string(),
    ];
    workspace.set_draft(draft);

    let Submission::Started { run_id } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };

    let expected = vec!["Small diff".to_string(), "Preserve tests".to_string()];
    assert_eq!(workspace.scenarios()[0].constraints, expected);
    assert_eq!(
        workspace.run(&run_id).unwrap().scenario_snapshot.constraints,
        expected
    );
    // The live draft is cleaned too, so a re-submission stays unique.
    assert_eq!(workspace.draft().constraints, expected);
}

#[tokio::test]
async fn test_new_scenarios_prepend() {
    let (workspace, _, _) = open_simulated();
    workspace.submit().await.unwrap();

    let mut draft = workspace.draft();
    draft.scenario_id = None;
    draft.scenario_name = "Second Scenario".to_string();
    workspace.set_draft(draft);
    workspace.submit().await.unwrap();

    let scenarios = workspace.scenarios();
    assert_eq!(scenarios.len(), 2);
    assert_eq!(scenarios[0].name, "Second Scenario");
}

#[tokio::test]
async fn test_snapshot_survives_scenario_edits() {
    let (workspace, _, _) = open_simulated();
    workspace.submit().await.unwrap();
    let original_name = workspace.history()[0].scenario_snapshot.name.clone();

    let mut draft = workspace.draft();
    draft.scenario_name = "Renamed Scenario".to_string();
    workspace.set_draft(draft);
    workspace.submit().await.unwrap();

    let runs = workspace.history();
    // The older run's snapshot still shows the name it ran with.
    assert_eq!(runs[1].scenario_snapshot.name, original_name);
    assert_eq!(runs[0].scenario_snapshot.name, "Renamed Scenario");
}

#[tokio::test]
async fn test_backend_failure_marks_run_failed() {
    let (workspace, _, _) = open_empty(Arc::new(FailingBackend));

    let Submission::Started { run_id } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };

    let run = workspace.run(&run_id).unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.output_text, FAILED_OUTPUT_TEXT);
    assert_eq!(run.duration_ms, 0);
    assert_eq!(workspace.status_message().unwrap(), "Run failed.");
    // Scenario upsert already happened; failure does not roll it back.
    assert_eq!(workspace.scenarios().len(), 1);
}

#[tokio::test]
async fn test_failure_clears_single_flight() {
    let (workspace, _, _) = open_empty(Arc::new(FailingBackend));
    workspace.submit().await.unwrap();
    // A failed run must not wedge the controller.
    let second = workspace.submit().await.unwrap();
    assert!(matches!(second, Submission::Started { .. }));
    assert_eq!(workspace.history().len(), 2);
}

#[tokio::test]
async fn test_submission_while_in_flight_is_a_noop() {
    let release = Arc::new(Notify::new());
    let backend = Arc::new(BlockingBackend {
        release: Arc::clone(&release),
    });
    let (workspace, _, _) = open_empty(backend);
    let workspace = Arc::new(workspace);

    let first = tokio::spawn({
        let workspace = Arc::clone(&workspace);
        async move { workspace.submit().await }
    });
    wait_for_running(&workspace).await;

    // Second submission is rejected without touching any state.
    let busy = workspace.submit().await.unwrap();
    assert_eq!(busy, Submission::Busy);
    assert_eq!(workspace.history().len(), 1);
    assert_eq!(workspace.scenarios().len(), 1);

    release.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert!(matches!(outcome, Submission::Started { .. }));

    let run = &workspace.history()[0];
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.output_text, "late output");
    assert_eq!(run.duration_ms, 5);
}

#[tokio::test]
async fn test_other_operations_stay_available_in_flight() {
    let release = Arc::new(Notify::new());
    let backend = Arc::new(BlockingBackend {
        release: Arc::clone(&release),
    });
    let (workspace, _, _) = open_empty(backend);
    let workspace = Arc::new(workspace);

    let pending = tokio::spawn({
        let workspace = Arc::clone(&workspace);
        async move { workspace.submit().await }
    });
    wait_for_running(&workspace).await;

    // Draft edits for the next submission do not disturb the in-flight run.
    let mut draft = workspace.draft();
    draft.goal = "Edited while running.".to_string();
    workspace.set_draft(draft);
    assert_eq!(workspace.history().len(), 1);
    workspace.set_notes("annotated while running");

    release.notify_one();
    pending.await.unwrap().unwrap();

    let run = &workspace.history()[0];
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.notes, "annotated while running");
    // The in-flight snapshot, not the edited draft, produced the scenario.
    assert_ne!(workspace.scenarios()[0].goal, "Edited while running.");
}

#[tokio::test]
async fn test_status_notice_expires() {
    let (workspace, _, clock) = open_simulated();
    workspace.submit().await.unwrap();
    assert!(workspace.status_message().is_some());
    clock.as_fake().unwrap().advance_ms(STATUS_NOTICE_MS + 1);
    assert!(workspace.status_message().is_none());
}

#[tokio::test]
async fn test_toggle_best_on_active_run() {
    let (workspace, _, _) = open_simulated();
    let Submission::Started { run_id } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };

    workspace.toggle_best();
    assert!(workspace.run(&run_id).unwrap().is_best);
    workspace.toggle_best();
    assert!(!workspace.run(&run_id).unwrap().is_best);
}

#[tokio::test]
async fn test_set_notes_touches_only_active_run() {
    let (workspace, _, _) = open_simulated();
    let Submission::Started { run_id: first } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };
    let Submission::Started { run_id: second } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };

    workspace.set_notes("second is active");
    assert_eq!(workspace.run(&second).unwrap().notes, "second is active");
    assert_eq!(workspace.run(&first).unwrap().notes, "");
}

#[tokio::test]
async fn test_delete_active_run_falls_back_to_newest() {
    let (workspace, _, clock) = open_simulated();
    let Submission::Started { run_id: first } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };
    clock.as_fake().unwrap().advance_ms(1000);
    let Submission::Started { run_id: second } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };

    assert!(workspace.delete_run(&second));
    assert_eq!(workspace.history().len(), 1);
    assert_eq!(workspace.active_run().unwrap().id, first);

    assert!(workspace.delete_run(&first));
    assert!(workspace.history().is_empty());
    assert!(workspace.active_run().is_none());
}

#[tokio::test]
async fn test_delete_inactive_run_keeps_selection() {
    let (workspace, _, clock) = open_simulated();
    let Submission::Started { run_id: first } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };
    clock.as_fake().unwrap().advance_ms(1000);
    let Submission::Started { run_id: second } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };

    assert!(workspace.delete_run(&first));
    assert_eq!(workspace.active_run().unwrap().id, second);
    assert!(!workspace.delete_run("no-such-run"));
}

#[tokio::test]
async fn test_duplicate_run_replaces_draft() {
    let (workspace, _, _) = open_simulated();
    let Submission::Started { run_id } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };
    let original = workspace.run(&run_id).unwrap();

    assert!(workspace.duplicate_run(&run_id));
    let draft = workspace.draft();
    assert_eq!(
        draft.scenario_name,
        format!("{} Copy", original.scenario_snapshot.name)
    );
    assert_eq!(draft.scenario_id, None);
    assert_eq!(
        workspace.status_message().unwrap(),
        "Run duplicated into builder."
    );
    assert!(!workspace.duplicate_run("no-such-run"));
}

#[tokio::test]
async fn test_apply_template_resets_draft() {
    let (workspace, _, _) = open_simulated();
    assert!(workspace.apply_template("refactor"));
    assert_eq!(workspace.draft().scenario_name, "Refactor Legacy Service");
    assert!(!workspace.apply_template("no-such-template"));
}

#[tokio::test]
async fn test_mutations_persist_across_reopen() {
    let (workspace, store, clock) = open_simulated();
    let Submission::Started { run_id } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };
    workspace.toggle_best();

    let reopened =
        Workspace::open(Arc::new(store), simulated(&clock), clock.clone()).unwrap();
    assert_eq!(reopened.history().len(), 1);
    assert_eq!(reopened.scenarios().len(), 1);
    let run = reopened.run(&run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.is_best);
}

#[tokio::test]
async fn test_export_run_requires_completion() {
    let (workspace, _, _) = open_empty(Arc::new(FailingBackend));
    let Submission::Started { run_id } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };
    // Failed runs are not exportable.
    assert!(workspace.export_run(&run_id).is_none());
    assert!(workspace.export_run("no-such-run").is_none());
}

#[tokio::test]
async fn test_export_run_yields_name_and_verbatim_output() {
    let (workspace, _, _) = open_simulated();
    let Submission::Started { run_id } = workspace.submit().await.unwrap() else {
        panic!("expected a started run");
    };
    let run = workspace.run(&run_id).unwrap();
    let (file_name, content) = workspace.export_run(&run_id).unwrap();
    assert!(file_name.starts_with("stabilize-checkout-bug-"));
    assert!(file_name.ends_with(".ts"));
    assert_eq!(content, run.output_text);
}

#[tokio::test]
async fn test_theme_round_trip_and_toggle() {
    let (workspace, _, _) = open_simulated();
    assert_eq!(workspace.theme().unwrap(), ThemeMode::Light);
    assert_eq!(workspace.toggle_theme().unwrap(), ThemeMode::Dark);
    assert_eq!(workspace.theme().unwrap(), ThemeMode::Dark);
    workspace.set_theme(ThemeMode::Light).unwrap();
    assert_eq!(workspace.theme().unwrap(), ThemeMode::Light);
}

#[tokio::test]
async fn test_filtered_history_through_workspace() {
    let (workspace, _, clock) = open_simulated();
    workspace.submit().await.unwrap();

    clock.as_fake().unwrap().advance_ms(1000);
    workspace.apply_template("refactor");
    workspace.submit().await.unwrap();

    let filter = HistoryFilter {
        format: Some(crate::model::OutputFormat::Markdown),
        ..Default::default()
    };
    let matched = workspace.filtered_history(&filter);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].scenario_snapshot.name, "Refactor Legacy Service");

    let tags = workspace.all_tags();
    assert!(tags.contains(&"Small diff".to_string()));
    assert!(tags.contains(&"Type-safe".to_string()));
}
