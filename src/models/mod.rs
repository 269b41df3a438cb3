//! Data Models
//!
//! Serializable data structures shared across the application.

pub mod chat;
pub mod config;
pub mod prompt;

pub use chat::TranscriptEntry;
pub use config::{InitOutcome, InitState, StashConfig};
pub use prompt::{
    derive_input_variables, extract_variables, InputVariable, NewPrompt, PromptExample,
    PromptPatch, PromptRecord, ValidationError,
};
