//! Stash Configuration Model
//!
//! Process-wide UI state persisted under the `config` store key, plus the
//! explicit initialization state machine derived from it.

use serde::{Deserialize, Serialize};

/// Persisted configuration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashConfig {
    /// Currently selected prompt id, if any
    #[serde(default)]
    pub selected: Option<String>,
    /// Whether the initialization protocol has completed
    #[serde(default)]
    pub is_initialized: bool,
    /// Whether the built-in seed set should be loaded into an empty library
    #[serde(default = "default_true")]
    pub should_load_defaults: bool,
    /// Whether this is the first run of the application
    #[serde(default = "default_true")]
    pub first_run: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StashConfig {
    fn default() -> Self {
        Self {
            selected: None,
            is_initialized: false,
            should_load_defaults: true,
            first_run: true,
        }
    }
}

/// State of the initialization protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// Not yet initialized; defaults loading is disabled
    Uninitialized,
    /// Not yet initialized; seed defaults if the library is empty
    DefaultsPending,
    /// Initialization completed; no further automatic transitions
    Ready,
}

/// What the initialization transition actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Seeded the built-in defaults into an empty library
    Seeded,
    /// Marked ready without touching data
    MarkedReady,
    /// Already ready; nothing happened
    NoChange,
}

impl StashConfig {
    /// Derive the current initialization state.
    pub fn init_state(&self) -> InitState {
        if self.is_initialized {
            InitState::Ready
        } else if self.should_load_defaults {
            InitState::DefaultsPending
        } else {
            InitState::Uninitialized
        }
    }

    /// Mark initialization complete with defaults loading disabled.
    /// Also used by the bulk reset/restore operations.
    pub fn mark_ready(&mut self) {
        self.is_initialized = true;
        self.should_load_defaults = false;
        self.first_run = false;
    }
}
