//! Application Services
//!
//! The library façade, filtering and tag aggregation, the chat and
//! composer services, and the built-in seed set.

pub mod chat;
pub mod composer;
pub mod defaults;
pub mod filter;
pub mod library;
pub mod tags;

pub use chat::ChatService;
pub use composer::{ComposedPrompt, ComposerService, Technique};
pub use filter::{filter_prompts, DateRange, PromptFilters};
pub use library::PromptLibrary;
pub use tags::{collect_tag_facets, TagFacet, TagFacets};
