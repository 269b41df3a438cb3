//! Streaming Adapters
//!
//! Provider-specific SSE adapters converting raw stream lines into
//! `UnifiedStreamEvent`s.

pub mod openai;

pub use openai::OpenAiAdapter;
