// SPDX-License-Identifier: MIT

//! CLI argument parsing.

use crate::model::{OutputFormat, ThemeMode};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Local-first workspace for drafting prompts and comparing scenario runs.
#[derive(Parser, Debug)]
#[command(name = "codexlab", version, about = "Prompt scenario workspace")]
pub struct Cli {
    /// Directory holding the workspace store
    #[arg(long, env = "CODEXLAB_STORE", default_value = ".codexlab", global = true)]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the prompt template library
    Templates,

    /// Submit a draft and wait for the result
    Run(RunArgs),

    /// List run history, optionally filtered
    History(HistoryArgs),

    /// Show one run in full
    Show {
        /// Run id (or unique prefix)
        run_id: String,
    },

    /// Compare two completed runs line by line
    Compare {
        /// Left run id
        left: String,
        /// Right run id
        right: String,
    },

    /// Toggle the best marker on a run
    Best {
        run_id: String,
    },

    /// Replace the notes on a run
    Notes {
        run_id: String,
        notes: String,
    },

    /// Delete a run permanently
    Delete {
        run_id: String,
    },

    /// Write a completed run's output to a file
    Export {
        run_id: String,
        /// Directory to write into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// List the tag vocabulary across all runs
    Tags,

    /// Show the theme preference, or set it
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
}

/// Draft construction for `run`: start from a template or a duplicated
/// run, then override individual fields.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Template id to start the draft from (defaults to the first)
    #[arg(long, conflicts_with = "from_run")]
    pub template: Option<String>,

    /// Duplicate an existing run into the draft
    #[arg(long = "from-run")]
    pub from_run: Option<String>,

    /// Re-run against an existing scenario id (upsert instead of create)
    #[arg(long)]
    pub scenario: Option<String>,

    /// Scenario name
    #[arg(long)]
    pub name: Option<String>,

    /// Scenario goal
    #[arg(long)]
    pub goal: Option<String>,

    /// Constraint tag (repeatable, replaces the draft's tags)
    #[arg(long = "constraint")]
    pub constraints: Vec<String>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Prompt text
    #[arg(long, conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Read the prompt text from a file
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Sampling temperature in [0, 1]
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Token budget (minimum 64)
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only runs with this output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Only runs whose snapshot carries this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Case-insensitive substring of scenario name or prompt
    #[arg(long)]
    pub search: Option<String>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
