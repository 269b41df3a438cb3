//! Filtering and tag-facet tests over a seeded library.

use prompt_stash::models::{NewPrompt, PromptPatch};
use prompt_stash::services::library::PromptLibrary;
use prompt_stash::services::{collect_tag_facets, filter_prompts, DateRange, PromptFilters};
use prompt_stash::storage::store::StashStore;

fn seeded_library() -> (tempfile::TempDir, PromptLibrary) {
    let dir = tempfile::tempdir().unwrap();
    let store = StashStore::new(dir.path().to_path_buf()).unwrap();
    let mut lib = PromptLibrary::new(store);
    lib.initialize();
    (dir, lib)
}

#[test]
fn test_identity_filter_returns_all_sorted_by_recency() {
    let (_dir, mut lib) = seeded_library();
    let total = lib.prompts().len();

    // Touch one prompt so it floats to the top.
    let target = lib.prompts()[total - 1].id.clone();
    lib.edit_prompt(
        &target,
        &PromptPatch {
            description: Some("freshly edited".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let result = filter_prompts(lib.prompts(), &PromptFilters::default());
    assert_eq!(result.len(), total);
    assert_eq!(result[0].id, target);
}

#[test]
fn test_bookmarked_filter_is_a_subset() {
    let (_dir, mut lib) = seeded_library();
    let first = lib.prompts()[0].id.clone();
    let second = lib.prompts()[1].id.clone();
    lib.toggle_bookmark(&first).unwrap();
    lib.toggle_bookmark(&second).unwrap();

    let all = filter_prompts(lib.prompts(), &PromptFilters::default());
    let bookmarked = filter_prompts(
        lib.prompts(),
        &PromptFilters {
            bookmarked: true,
            ..Default::default()
        },
    );

    assert_eq!(bookmarked.len(), 2);
    assert!(bookmarked.iter().all(|p| p.bookmarked));
    assert!(bookmarked.len() <= all.len());
    for prompt in &bookmarked {
        assert!(all.iter().any(|p| p.id == prompt.id));
    }
}

#[test]
fn test_sentiment_search_finds_the_seed() {
    let (_dir, lib) = seeded_library();
    let result = filter_prompts(
        lib.prompts(),
        &PromptFilters {
            search: Some("sentiment".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].title, "Sentiment Analysis");
}

#[test]
fn test_use_case_filter_over_seeds() {
    let (_dir, lib) = seeded_library();
    let result = filter_prompts(
        lib.prompts(),
        &PromptFilters {
            use_cases: vec!["classification".to_string()],
            ..Default::default()
        },
    );
    assert!(!result.is_empty());
    assert!(result.iter().all(|p| p
        .tags
        .iter()
        .any(|t| t.eq_ignore_ascii_case("classification"))));
}

#[test]
fn test_date_range_excludes_out_of_range_records() {
    let (_dir, mut lib) = seeded_library();
    lib.create_prompt(NewPrompt {
        title: "Recent".to_string(),
        ..Default::default()
    })
    .unwrap();

    // All seeds share one creation instant; a range in the distant past
    // matches nothing.
    let result = filter_prompts(
        lib.prompts(),
        &PromptFilters {
            date_range: Some(DateRange {
                start: Some("2000-01-01T00:00:00Z".to_string()),
                end: Some("2000-12-31T23:59:59Z".to_string()),
            }),
            ..Default::default()
        },
    );
    assert!(result.is_empty());
}

#[test]
fn test_tag_facets_split_types_from_use_cases() {
    let (_dir, lib) = seeded_library();
    let facets = collect_tag_facets(lib.prompts());

    assert!(facets
        .types
        .iter()
        .any(|f| f.id == "prompttemplate"));
    assert!(facets.types.iter().all(|f| f.id.contains("prompttemplate")));
    assert!(facets
        .use_cases
        .iter()
        .any(|f| f.id == "sentiment-analysis" && f.label == "Sentiment Analysis"));
    assert!(facets
        .use_cases
        .iter()
        .all(|f| !f.id.contains("prompttemplate")));

    // Counts sum to the total number of tag occurrences.
    let occurrences: usize = lib.prompts().iter().map(|p| p.tags.len()).sum();
    let counted: usize = facets
        .types
        .iter()
        .chain(facets.use_cases.iter())
        .map(|f| f.count)
        .sum();
    assert_eq!(counted, occurrences);
}
