//! Prompt Filtering
//!
//! Pure filtering and ordering over an in-memory prompt slice. All criteria
//! are ANDed together; within the use-case criterion, any matching tag
//! suffices. Results are ordered most recently touched first.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::prompt::PromptRecord;

/// Inclusive creation-date range, RFC 3339 bounds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Filter criteria for the prompt library
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptFilters {
    /// Use-case tags; a prompt matches when any of its tags matches any
    /// of these, case-insensitively
    #[serde(default)]
    pub use_cases: Vec<String>,
    /// Restrict to bookmarked prompts
    #[serde(default)]
    pub bookmarked: bool,
    /// Case-insensitive substring match against title and description
    #[serde(default)]
    pub search: Option<String>,
    /// Inclusive range on `created_at`
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

/// Apply `filters` to `prompts`, returning matches ordered by recency
/// (`updated_at` when set, otherwise `created_at`, descending).
pub fn filter_prompts(prompts: &[PromptRecord], filters: &PromptFilters) -> Vec<PromptRecord> {
    let mut matched: Vec<PromptRecord> = prompts
        .iter()
        .filter(|p| matches(p, filters))
        .cloned()
        .collect();
    matched.sort_by(|a, b| recency_key(b).cmp(&recency_key(a)));
    matched
}

fn matches(prompt: &PromptRecord, filters: &PromptFilters) -> bool {
    if !filters.use_cases.is_empty() {
        let tags: Vec<String> = prompt.tags.iter().map(|t| t.to_lowercase()).collect();
        let hit = filters
            .use_cases
            .iter()
            .any(|uc| tags.contains(&uc.to_lowercase()));
        if !hit {
            return false;
        }
    }

    if filters.bookmarked && !prompt.bookmarked {
        return false;
    }

    if let Some(search) = filters.search.as_deref() {
        let needle = search.trim().to_lowercase();
        if !needle.is_empty() {
            let in_title = prompt.title.to_lowercase().contains(&needle);
            let in_description = prompt
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
    }

    // The range only applies when both bounds are present; a partial
    // range filters nothing.
    if let Some(range) = &filters.date_range {
        let start = range.start.as_deref().and_then(parse_millis);
        let end = range.end.as_deref().and_then(parse_millis);
        if let (Some(start), Some(end)) = (start, end) {
            let Some(created) = parse_millis(&prompt.created_at) else {
                return false;
            };
            if created < start || created > end {
                return false;
            }
        }
    }

    true
}

fn recency_key(prompt: &PromptRecord) -> i64 {
    parse_millis(prompt.touched_at()).unwrap_or(0)
}

fn parse_millis(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|d| d.timestamp_millis())
}
