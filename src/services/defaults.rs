//! Built-in Seed Prompts
//!
//! The starter library loaded into an empty stash when defaults loading is
//! enabled, and the replacement set installed by a restore. Ids are stable
//! so repeated seeding is deterministic.

use std::collections::BTreeMap;

use crate::models::prompt::{derive_input_variables, PromptExample, PromptRecord};

/// Tag marking a prompt as a plain template in the type facet
const TYPE_TAG: &str = "PromptTemplate";

struct Seed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    template: &'static str,
    tags: &'static [&'static str],
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "default-sentiment-analysis",
        title: "Sentiment Analysis",
        description: "Classify the sentiment of a piece of text as positive, negative, or neutral.",
        template: "Classify the sentiment of the following text as positive, negative, or neutral.\n\nText: {text}\n\nSentiment:",
        tags: &[TYPE_TAG, "sentiment-analysis", "classification"],
    },
    Seed {
        id: "default-text-summarization",
        title: "Text Summarization",
        description: "Condense a longer passage into a short summary that keeps the key points.",
        template: "Summarize the following text in at most three sentences, preserving the key points.\n\nText: {text}\n\nSummary:",
        tags: &[TYPE_TAG, "summarization", "writing"],
    },
    Seed {
        id: "default-language-translation",
        title: "Language Translation",
        description: "Translate text into a target language while keeping tone and meaning.",
        template: "Translate the following text into {language}. Preserve the original tone and meaning.\n\nText: {text}\n\nTranslation:",
        tags: &[TYPE_TAG, "translation"],
    },
    Seed {
        id: "default-code-review",
        title: "Code Review",
        description: "Review a code snippet for bugs, readability, and potential improvements.",
        template: "Review the following code. Point out bugs, readability issues, and concrete improvements.\n\n```\n{code}\n```\n\nReview:",
        tags: &[TYPE_TAG, "code-review", "programming"],
    },
    Seed {
        id: "default-email-drafting",
        title: "Email Drafting",
        description: "Draft a professional email to a recipient about a given topic.",
        template: "Write a professional email to {recipient} about {topic}. Keep it concise and polite.\n\nEmail:",
        tags: &[TYPE_TAG, "writing", "email"],
    },
    Seed {
        id: "default-question-answering",
        title: "Question Answering",
        description: "Answer a question using only the supplied context.",
        template: "Answer the question using only the context below. If the answer is not in the context, say so.\n\nContext: {context}\n\nQuestion: {question}\n\nAnswer:",
        tags: &[TYPE_TAG, "question-answering"],
    },
    Seed {
        id: "default-entity-extraction",
        title: "Entity Extraction",
        description: "Extract named entities (people, places, organizations) from text.",
        template: "Extract all named entities from the following text. List each entity with its type (person, place, organization).\n\nText: {text}\n\nEntities:",
        tags: &[TYPE_TAG, "extraction", "classification"],
    },
    Seed {
        id: "default-brainstorming",
        title: "Brainstorming Ideas",
        description: "Generate a list of creative ideas around a topic.",
        template: "Brainstorm ten distinct, creative ideas about {topic}. Number each idea and keep it to one sentence.\n\nIdeas:",
        tags: &[TYPE_TAG, "brainstorming", "creative"],
    },
];

/// Build the seed set with the given creation timestamp.
pub fn default_prompts(created_at: &str) -> Vec<PromptRecord> {
    SEEDS
        .iter()
        .map(|seed| {
            let mut record = PromptRecord {
                id: seed.id.to_string(),
                title: seed.title.to_string(),
                description: Some(seed.description.to_string()),
                template: Some(seed.template.to_string()),
                input_variables: derive_input_variables(seed.template),
                tags: seed.tags.iter().map(|t| t.to_string()).collect(),
                examples: vec![],
                bookmarked: false,
                locked: false,
                created_at: created_at.to_string(),
                updated_at: None,
            };
            if seed.id == "default-sentiment-analysis" {
                record.examples = sentiment_examples();
            }
            record
        })
        .collect()
}

fn sentiment_examples() -> Vec<PromptExample> {
    vec![
        PromptExample {
            input: BTreeMap::from([(
                "text".to_string(),
                "I absolutely loved this product, it exceeded my expectations!".to_string(),
            )]),
            output: "positive".to_string(),
        },
        PromptExample {
            input: BTreeMap::from([(
                "text".to_string(),
                "The package arrived on Tuesday.".to_string(),
            )]),
            output: "neutral".to_string(),
        },
    ]
}
