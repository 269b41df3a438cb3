//! Prompt Record Models
//!
//! Data structures for the prompt library: the stored record, its variable
//! descriptors and usage examples, the create/patch request shapes, and the
//! schema validator every write passes through.

use std::collections::BTreeMap;

use chrono::DateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A declared template variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputVariable {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Value type hint (e.g., "string")
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Optional validation pattern for values of this variable
    #[serde(default)]
    pub variable_validation: Option<String>,
}

/// A usage example for a prompt template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptExample {
    /// Variable name → example value
    pub input: BTreeMap<String, String>,
    pub output: String,
}

/// A prompt record in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Template text with zero or more `{variableName}` placeholders
    #[serde(default)]
    pub template: Option<String>,
    /// Declared variables; the render path recomputes these from `template`
    /// rather than trusting the stored list
    #[serde(default)]
    pub input_variables: Vec<InputVariable>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<PromptExample>,
    #[serde(default)]
    pub bookmarked: bool,
    /// Locked prompts reject deletion and template edits
    #[serde(default)]
    pub locked: bool,
    /// RFC 3339 creation timestamp, immutable
    pub created_at: String,
    /// RFC 3339 timestamp of the last edit
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Request to create a new prompt record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPrompt {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<PromptExample>,
    #[serde(default)]
    pub bookmarked: bool,
    #[serde(default)]
    pub locked: bool,
}

/// Partial update to an existing prompt record.
///
/// `None` fields are left unchanged; the merged result is re-validated
/// before it replaces the stored record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub template: Option<String>,
    pub tags: Option<Vec<String>>,
    pub examples: Option<Vec<PromptExample>>,
    pub bookmarked: Option<bool>,
    pub locked: Option<bool>,
}

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Structured validation failure for a prompt record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            field: field.to_string(),
            message: message.into(),
        });
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|i| format!("{}: {}", i.field, i.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

impl PromptRecord {
    /// Build a record from a create request with an assigned id and timestamp.
    pub fn from_new(new: NewPrompt, id: String, created_at: String) -> Self {
        let input_variables = new
            .template
            .as_deref()
            .map(|t| derive_input_variables(t))
            .unwrap_or_default();
        Self {
            id,
            title: new.title,
            description: new.description,
            template: new.template,
            input_variables,
            tags: new.tags,
            examples: new.examples,
            bookmarked: new.bookmarked,
            locked: new.locked,
            created_at,
            updated_at: None,
        }
    }

    /// Merge a partial update into a copy of this record.
    ///
    /// Does not touch `id`, `created_at`, or `updated_at`; the façade stamps
    /// `updated_at` after the merged result passes validation.
    pub fn with_patch(&self, patch: &PromptPatch) -> Self {
        let mut merged = self.clone();
        if let Some(title) = &patch.title {
            merged.title = title.clone();
        }
        if let Some(description) = &patch.description {
            merged.description = Some(description.clone());
        }
        if let Some(template) = &patch.template {
            merged.template = Some(template.clone());
            merged.input_variables = derive_input_variables(template);
        }
        if let Some(tags) = &patch.tags {
            merged.tags = tags.clone();
        }
        if let Some(examples) = &patch.examples {
            merged.examples = examples.clone();
        }
        if let Some(bookmarked) = patch.bookmarked {
            merged.bookmarked = bookmarked;
        }
        if let Some(locked) = patch.locked {
            merged.locked = locked;
        }
        merged
    }

    /// Validate this record's shape.
    ///
    /// Pure; returns a structured error listing every failing field rather
    /// than stopping at the first one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError { issues: vec![] };

        if self.id.trim().is_empty() {
            err.push("id", "must be a non-empty string");
        }
        if self.title.trim().is_empty() {
            err.push("title", "must be a non-empty string");
        }
        if DateTime::parse_from_rfc3339(&self.created_at).is_err() {
            err.push("created_at", "must be an RFC 3339 timestamp");
        }
        if let Some(updated) = &self.updated_at {
            if DateTime::parse_from_rfc3339(updated).is_err() {
                err.push("updated_at", "must be an RFC 3339 timestamp");
            }
        }
        for (idx, var) in self.input_variables.iter().enumerate() {
            if var.name.trim().is_empty() {
                err.push(
                    &format!("input_variables[{}].name", idx),
                    "must be a non-empty string",
                );
            }
        }

        if err.issues.is_empty() {
            Ok(())
        } else {
            Err(err)
        }
    }

    /// The timestamp used for recency ordering: `updated_at` when set,
    /// otherwise `created_at`.
    pub fn touched_at(&self) -> &str {
        self.updated_at.as_deref().unwrap_or(&self.created_at)
    }
}

/// Extract `{variable}` names from template text, in order of first
/// appearance, without duplicates.
pub fn extract_variables(template: &str) -> Vec<String> {
    let re = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    let mut seen = std::collections::HashSet::new();
    re.captures_iter(template)
        .map(|c| c[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Derive variable descriptors from template text.
pub fn derive_input_variables(template: &str) -> Vec<InputVariable> {
    extract_variables(template)
        .into_iter()
        .map(|name| InputVariable {
            name,
            description: None,
            kind: Some("string".to_string()),
            required: true,
            variable_validation: None,
        })
        .collect()
}
