//! Prompt Stash LLM
//!
//! Generation-service boundary for the prompt workbench. Provides the
//! `LlmProvider` trait, the OpenAI implementation, the SSE streaming
//! adapter, and the HTTP client factory.

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod streaming_adapters;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAiProvider;
pub use provider::{missing_api_key_error, parse_http_error, LlmProvider};
pub use types::*;

// Re-export streaming adapters
pub use streaming_adapters::OpenAiAdapter;
