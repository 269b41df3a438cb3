//! Tag Facets
//!
//! Aggregates the tags present in the library into the two filter facets
//! the UI renders: template types and use cases. Counting and grouping are
//! case-insensitive; the lowercased tag is the facet id and a display label
//! is derived from it.

use serde::{Deserialize, Serialize};

use crate::models::prompt::PromptRecord;

/// One facet entry with its usage count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFacet {
    /// Lowercased tag, the stable facet id
    pub id: String,
    /// Human-readable label derived from the id
    pub label: String,
    /// Number of prompts carrying this tag
    pub count: usize,
}

/// The two tag facets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFacets {
    /// Tags naming a template type
    pub types: Vec<TagFacet>,
    /// Everything else
    pub use_cases: Vec<TagFacet>,
}

/// Collect tag facets across all prompts.
///
/// A tag whose lowercased form contains `prompttemplate` lands in the type
/// facet; every other tag is a use case. Entries are ordered by id.
pub fn collect_tag_facets(prompts: &[PromptRecord]) -> TagFacets {
    let mut types: Vec<TagFacet> = vec![];
    let mut use_cases: Vec<TagFacet> = vec![];

    for prompt in prompts {
        for tag in &prompt.tags {
            let id = tag.to_lowercase();
            let bucket = if id.contains("prompttemplate") {
                &mut types
            } else {
                &mut use_cases
            };
            match bucket.iter_mut().find(|f| f.id == id) {
                Some(facet) => facet.count += 1,
                None => bucket.push(TagFacet {
                    label: facet_label(&id),
                    id,
                    count: 1,
                }),
            }
        }
    }

    types.sort_by(|a, b| a.id.cmp(&b.id));
    use_cases.sort_by(|a, b| a.id.cmp(&b.id));
    TagFacets { types, use_cases }
}

/// Derive a display label: split on `-`, capitalize each word, join with
/// spaces ("sentiment-analysis" → "Sentiment Analysis").
fn facet_label(id: &str) -> String {
    id.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
