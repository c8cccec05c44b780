use async_trait::async_trait;

use crate::errors::AgentResult;
use crate::models::content::Content;
use crate::models::response::Context;
use crate::models::tool::{Tool, ToolCall};

/// A named bundle of tools the agent can dispatch to.
///
/// Toolkits are registered on the agent explicitly; the agent prefixes tool
/// names with the toolkit name so the model can address them unambiguously.
/// The per-invocation [`Context`] is handed to every call and is not part of
/// the conversation history.
#[async_trait]
pub trait Toolkit: Send + Sync {
    /// Get the name of the toolkit
    fn name(&self) -> &str;

    /// Get the toolkit description
    fn description(&self) -> &str;

    /// Get usage instructions shown to the model in the system prompt
    fn instructions(&self) -> &str;

    /// Get available tools
    fn tools(&self) -> &[Tool];

    /// Call a tool with the given parameters and invocation context
    async fn call(&self, tool_call: ToolCall, context: &Context) -> AgentResult<Vec<Content>>;
}
