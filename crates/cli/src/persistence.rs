// SPDX-License-Identifier: MIT

//! Versioned load/save of the scenario and run collections.
//!
//! The whole aggregate lives under a single key and is rewritten in full
//! on every mutation. A missing or malformed blob is silently healed by
//! reseeding; corruption is never surfaced as a user-visible error.

use crate::model::{Run, Scenario, ThemeMode};
use crate::seed::seed_data;
use crate::time::Clock;
use codexlab_store::{KvStore, StoreError};
use serde::{Deserialize, Serialize};

/// Key holding the `{version, scenarios, runs}` aggregate.
pub const STORE_KEY: &str = "codexlab:store:v1";

/// Key holding the theme preference.
pub const THEME_KEY: &str = "codexlab:theme";

/// Schema version written with the aggregate.
pub const STORE_VERSION: u32 = 1;

/// The persisted aggregate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredState {
    pub version: u32,
    pub scenarios: Vec<Scenario>,
    pub runs: Vec<Run>,
}

/// Result of a load, noting whether the seed recovery path ran.
#[derive(Clone, Debug)]
pub struct LoadedStore {
    pub scenarios: Vec<Scenario>,
    pub runs: Vec<Run>,
    /// True when the blob was absent or unreadable and seed data was
    /// written in its place.
    pub recovered: bool,
}

/// Load the aggregate, reseeding on absence or corruption.
///
/// Any shape problem (unparsable JSON, wrong `version`) falls through to
/// the same recovery: generate seed data, persist it, return it.
pub fn load_or_seed(store: &dyn KvStore, clock: &dyn Clock) -> Result<LoadedStore, StoreError> {
    if let Some(raw) = store.get(STORE_KEY)? {
        if let Ok(state) = serde_json::from_str::<StoredState>(&raw) {
            if state.version == STORE_VERSION {
                return Ok(LoadedStore {
                    scenarios: state.scenarios,
                    runs: state.runs,
                    recovered: false,
                });
            }
        }
    }

    let (scenarios, runs) = seed_data(clock);
    save(store, &scenarios, &runs)?;
    Ok(LoadedStore {
        scenarios,
        runs,
        recovered: true,
    })
}

/// Rewrite the full aggregate.
pub fn save(store: &dyn KvStore, scenarios: &[Scenario], runs: &[Run]) -> Result<(), StoreError> {
    let state = StoredState {
        version: STORE_VERSION,
        scenarios: scenarios.to_vec(),
        runs: runs.to_vec(),
    };
    match serde_json::to_string(&state) {
        Ok(json) => store.set(STORE_KEY, &json),
        // Entities always serialize; nothing useful to do if they do not.
        Err(_) => Ok(()),
    }
}

/// Read the theme preference, defaulting to light when unset or
/// unrecognized.
pub fn load_theme(store: &dyn KvStore) -> Result<ThemeMode, StoreError> {
    let theme = match store.get(THEME_KEY)?.as_deref() {
        Some("dark") => ThemeMode::Dark,
        Some("light") => ThemeMode::Light,
        _ => ThemeMode::default(),
    };
    Ok(theme)
}

/// Persist the theme preference.
pub fn save_theme(store: &dyn KvStore, theme: ThemeMode) -> Result<(), StoreError> {
    store.set(THEME_KEY, theme.label())
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
