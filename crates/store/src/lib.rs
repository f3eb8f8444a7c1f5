// SPDX-License-Identifier: MIT

//! Durable key-value storage for codexlab.
//!
//! This crate defines the minimal store interface the workspace persists
//! through, plus an in-memory implementation for tests and a file-backed
//! implementation for the CLI. Backing stores are swappable without
//! touching the entity model or the run lifecycle.

mod file;
mod kv;
mod memory;

pub use file::FileStore;
pub use kv::{KvStore, StoreError};
pub use memory::MemoryStore;
