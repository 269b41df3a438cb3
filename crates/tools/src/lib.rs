//! Prompt Stash Tools
//!
//! The three built-in chat tools exposed to the assistant:
//! - `grade_prompt` - evaluate a prompt and propose an improved rewrite
//! - `show_good_prompt_examples` - surface curated example prompts
//! - `convert_to_few_shot_prompt` - restructure a prompt into few-shot form
//!
//! Each tool implements the `UnifiedTool` traits from the core crate and
//! returns a JSON card payload that the chat surface renders inline.

use std::sync::Arc;

use prompt_stash_core::error::{CoreError, CoreResult};
use prompt_stash_core::tool_trait::UnifiedToolRegistry;
use prompt_stash_llm::LlmProvider;

pub mod few_shot;
pub mod good_examples;
pub mod grade_prompt;

pub use few_shot::ConvertToFewShotTool;
pub use good_examples::ShowGoodExamplesTool;
pub use grade_prompt::GradePromptTool;

/// Register the three built-in tools on a registry.
pub fn register_builtin_tools(registry: &mut UnifiedToolRegistry, provider: Arc<dyn LlmProvider>) {
    registry.register(Arc::new(GradePromptTool::new(provider.clone())));
    registry.register(Arc::new(ShowGoodExamplesTool::new()));
    registry.register(Arc::new(ConvertToFewShotTool::new(provider)));
}

/// Derive a JSON schema for a structured-output type, stripped of the
/// `$schema` marker that strict-mode endpoints reject.
pub(crate) fn output_schema<T: schemars::JsonSchema>() -> CoreResult<serde_json::Value> {
    let schema = schemars::schema_for!(T);
    let mut value = serde_json::to_value(schema)
        .map_err(|e| CoreError::internal(format!("Failed to serialize schema: {}", e)))?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
    }
    Ok(value)
}
