//! Storage Layer
//!
//! File-backed persistence: the key-addressed JSON store with change
//! subscriptions, and the encrypted credential store.

pub mod secrets;
pub mod store;

pub use secrets::SecretStore;
pub use store::{
    StashStore, StoreSubscription, KEY_CONFIG, KEY_DRAFTS, KEY_PROMPTS, KEY_TRANSCRIPT,
};
