//! Prompt Stash
//!
//! A local prompt library with drafts, filtering, tag facets, and an
//! assistant chat that streams from an LLM and runs prompt-engineering
//! tools server-side.

pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::{InitOutcome, InitState, NewPrompt, PromptPatch, PromptRecord, StashConfig};
pub use services::{filter_prompts, ChatService, ComposerService, PromptFilters, PromptLibrary};
pub use state::AppState;
pub use storage::{SecretStore, StashStore};
pub use utils::{AppError, AppResult};
