//! Integration tests
//!
//! End-to-end coverage of the library behavior over a real temporary
//! store, the filter/facet pipeline, the persisted store, and the chat
//! tool loop.

mod chat_tools_test;
mod filter_test;
mod library_test;
mod store_test;
