// SPDX-License-Identifier: MIT

//! Codexlab binary entry point.

use std::io::Write;
use std::sync::Arc;

use clap::Parser;

use codexlab::backend::SimulatedBackend;
use codexlab::cli::{Cli, Command, HistoryArgs, RunArgs};
use codexlab::diff::line_diff;
use codexlab::filter::HistoryFilter;
use codexlab::model::{Run, RunSettings};
use codexlab::output::{
    print_error, write_diff, write_history, write_run, write_templates,
};
use codexlab::template::templates;
use codexlab::time::ClockHandle;
use codexlab::workspace::{Submission, SubmitError, Workspace};
use codexlab_store::FileStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let store = Arc::new(FileStore::open(&cli.store)?);
    let clock = ClockHandle::system();
    let backend = Arc::new(SimulatedBackend::new(clock.clone()));
    let workspace = Workspace::open(store, backend, clock)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Templates => write_templates(&mut out, templates())?,
        Command::Run(args) => run_command(&workspace, args, &mut out).await?,
        Command::History(args) => history_command(&workspace, args, &mut out)?,
        Command::Show { run_id } => {
            let run = resolve_run(&workspace, &run_id)?;
            write_run(&mut out, &run)?;
        }
        Command::Compare { left, right } => {
            let left = resolve_run(&workspace, &left)?;
            let right = resolve_run(&workspace, &right)?;
            let diff = line_diff(&left.output_text, &right.output_text);
            write_diff(&mut out, &left, &right, &diff)?;
        }
        Command::Best { run_id } => {
            let run = resolve_run(&workspace, &run_id)?;
            workspace.view_run(&run.id);
            workspace.toggle_best();
            let marked = workspace.run(&run.id).map(|r| r.is_best).unwrap_or(false);
            writeln!(out, "{} best: {}", run.id, if marked { "yes" } else { "no" })?;
        }
        Command::Notes { run_id, notes } => {
            let run = resolve_run(&workspace, &run_id)?;
            workspace.view_run(&run.id);
            workspace.set_notes(&notes);
            writeln!(out, "Notes updated.")?;
        }
        Command::Delete { run_id } => {
            let run = resolve_run(&workspace, &run_id)?;
            workspace.delete_run(&run.id);
            writeln!(out, "Deleted {}.", run.id)?;
        }
        Command::Export { run_id, dir } => {
            let run = resolve_run(&workspace, &run_id)?;
            let Some((file_name, content)) = workspace.export_run(&run.id) else {
                print_error("only completed runs can be exported");
                std::process::exit(1);
            };
            let path = dir.join(file_name);
            std::fs::write(&path, content)?;
            writeln!(out, "Wrote {}", path.display())?;
        }
        Command::Tags => {
            for tag in workspace.all_tags() {
                writeln!(out, "{tag}")?;
            }
        }
        Command::Theme { mode } => {
            let theme = match mode {
                Some(mode) => {
                    workspace.set_theme(mode)?;
                    mode
                }
                None => workspace.theme()?,
            };
            writeln!(out, "{}", theme.label())?;
        }
    }

    Ok(())
}

async fn run_command<W: Write>(
    workspace: &Workspace,
    args: RunArgs,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    // Start the draft from a duplicated run, a named template, or the
    // default, then layer flag overrides on top.
    if let Some(prefix) = &args.from_run {
        let run = resolve_run(workspace, prefix)?;
        workspace.duplicate_run(&run.id);
    } else if let Some(template_id) = &args.template {
        if !workspace.apply_template(template_id) {
            print_error(format!("unknown template '{template_id}'"));
            std::process::exit(1);
        }
    }

    let mut draft = workspace.draft();
    if let Some(id) = args.scenario {
        draft.scenario_id = Some(id);
    }
    if let Some(name) = args.name {
        draft.scenario_name = name;
    }
    if let Some(goal) = args.goal {
        draft.goal = goal;
    }
    if !args.constraints.is_empty() {
        draft.constraints = args.constraints;
    }
    if let Some(format) = args.format {
        draft.output_format = format;
    }
    if let Some(prompt) = args.prompt {
        draft.prompt_text = prompt;
    } else if let Some(path) = args.prompt_file {
        draft.prompt_text = std::fs::read_to_string(path)?;
    }
    if args.temperature.is_some() || args.max_tokens.is_some() {
        draft.settings = RunSettings::new(
            args.temperature.unwrap_or(draft.settings.temperature),
            args.max_tokens.unwrap_or(draft.settings.max_tokens),
        );
    }
    workspace.set_draft(draft);

    match workspace.submit().await {
        Ok(Submission::Started { run_id }) => {
            if let Some(run) = workspace.run(&run_id) {
                write_run(out, &run)?;
            }
            if let Some(message) = workspace.status_message() {
                writeln!(out, "{message}")?;
            }
            Ok(())
        }
        Ok(Submission::Busy) => {
            print_error("another run is already in flight");
            std::process::exit(1);
        }
        Err(SubmitError::Validation(message)) => {
            print_error(message);
            std::process::exit(1);
        }
    }
}

fn history_command<W: Write>(
    workspace: &Workspace,
    args: HistoryArgs,
    out: &mut W,
) -> std::io::Result<()> {
    let filter = HistoryFilter {
        format: args.format,
        tag: args.tag,
        search: args.search.unwrap_or_default(),
    };
    write_history(out, &workspace.filtered_history(&filter))
}

/// Resolve a run id or unique prefix against the history.
fn resolve_run(workspace: &Workspace, prefix: &str) -> Result<Run, Box<dyn std::error::Error>> {
    let runs = workspace.history();
    let mut matches = runs.iter().filter(|run| run.id.starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(run), None) => Ok(run.clone()),
        (Some(_), Some(_)) => Err(format!("run id '{prefix}' is ambiguous").into()),
        (None, _) => Err(format!("no run matches '{prefix}'").into()),
    }
}
