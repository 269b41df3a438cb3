//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients shared by
//! provider implementations.

use std::time::Duration;

/// Build a `reqwest::Client` for provider requests.
///
/// Streaming responses can stay open for minutes, so only the connect
/// phase gets a timeout.
pub fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .build()
        .expect("failed to build reqwest client")
}
