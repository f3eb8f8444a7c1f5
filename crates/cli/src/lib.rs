// SPDX-License-Identifier: MIT

//! Codexlab: a local-first workspace for drafting structured prompts,
//! executing them as scenario runs against a pluggable backend, keeping
//! a searchable run history, and comparing outputs line by line.
//!
//! The engine lives in [`workspace::Workspace`]; everything else is a
//! leaf it composes: the entity model, the draft constructors, the
//! positional diff, the history filter, the versioned persistence
//! layer, and the execution backend boundary.

pub mod backend;
pub mod cli;
pub mod diff;
pub mod draft;
pub mod export;
pub mod filter;
pub mod model;
pub mod output;
pub mod persistence;
pub mod seed;
pub mod template;
pub mod time;
pub mod workspace;
