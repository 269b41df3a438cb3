//! Unified Tool Trait
//!
//! Defines the core-layer tool abstraction with split definition/execution traits:
//!
//! - `ToolDefinitionTrait` - Identity, schema, metadata
//! - `ToolExecutable` - Execution capability
//! - `UnifiedTool` - Combined trait (auto-implemented via blanket impl)
//! - `UnifiedToolRegistry` - O(1) lookup registry with ordered iteration
//!
//! The split design enables schema-only consumers (the provider request
//! builder needs definitions, not executors) and clean test doubles with
//! independent definition/execution mocking.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ToolContext;
use crate::error::{CoreError, CoreResult};

/// Tool definition metadata trait.
///
/// Provides identity and schema information about a tool without
/// requiring execution capability. Separating definition from execution
/// allows the registry to enumerate tools without instantiating executors.
pub trait ToolDefinitionTrait: Send + Sync {
    /// Unique name of this tool (e.g., "grade_prompt").
    fn name(&self) -> &str;

    /// Human-readable description of what this tool does.
    fn description(&self) -> &str;

    /// JSON schema describing input parameters.
    ///
    /// Should conform to JSON Schema draft-07. Example:
    /// ```json
    /// {
    ///   "type": "object",
    ///   "properties": {
    ///     "prompt": { "type": "string", "description": "The prompt to convert" }
    ///   },
    ///   "required": ["prompt"]
    /// }
    /// ```
    fn parameters_schema(&self) -> Value;
}

/// Tool execution trait.
///
/// Provides the execution capability for a tool. Separated from
/// `ToolDefinitionTrait` so that definition-only consumers don't need to
/// depend on execution infrastructure.
#[async_trait]
pub trait ToolExecutable: Send + Sync {
    /// Execute the tool with the given context and arguments.
    ///
    /// # Arguments
    /// - `ctx` - The tool execution context (session info, selected template)
    /// - `args` - JSON arguments matching the tool's `parameters_schema()`
    ///
    /// # Returns
    /// - `Ok(Value)` - The tool's output as a JSON value (card payload)
    /// - `Err(CoreError)` - If the tool execution failed
    async fn execute(&self, ctx: &ToolContext, args: Value) -> CoreResult<Value>;
}

/// Combined trait for tools that provide both definition and execution.
pub trait UnifiedTool: ToolDefinitionTrait + ToolExecutable {}

// Blanket implementation: anything that implements both traits is a UnifiedTool
impl<T: ToolDefinitionTrait + ToolExecutable> UnifiedTool for T {}

/// Registry for `UnifiedTool` implementations.
///
/// Provides O(1) lookup by name, ordered iteration, and dynamic
/// registration/unregistration.
pub struct UnifiedToolRegistry {
    tools: HashMap<String, Arc<dyn UnifiedTool>>,
    /// Insertion order for deterministic iteration.
    order: Vec<String>,
}

impl UnifiedToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn UnifiedTool>) {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Unregister a tool by name. Returns the removed tool, or None.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn UnifiedTool>> {
        self.order.retain(|n| n != name);
        self.tools.remove(name)
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn UnifiedTool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all tool names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool definitions as JSON values in registration order.
    ///
    /// Suitable for sending to LLM providers.
    pub fn definitions(&self) -> Vec<Value> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema(),
                })
            })
            .collect()
    }

    /// Execute a tool by name.
    ///
    /// Returns `Err(CoreError::NotFound)` if the tool is not registered.
    pub async fn execute(&self, name: &str, ctx: &ToolContext, args: Value) -> CoreResult<Value> {
        match self.tools.get(name) {
            Some(tool) => tool.execute(ctx, args).await,
            None => Err(CoreError::not_found(format!("Tool not found: {}", name))),
        }
    }
}

impl Default for UnifiedToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
