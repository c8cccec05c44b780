use anyhow::Result;
use futures::stream::BoxStream;
use indoc::indoc;

use crate::checkpoint::Checkpointer;
use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::message::Message;
use crate::models::response::{Context, ResponseFormat};
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::Provider;
use crate::toolkit::Toolkit;

/// Name of the synthetic tool the model calls to deliver its structured
/// final answer. Reserved: toolkit tools are always prefixed, so this name
/// cannot collide.
pub const FINAL_RESPONSE_TOOL: &str = "final_response";

const PERSONA: &str = indoc! {"
    You are an expert weather forecaster, who speaks in puns.

    When you have gathered everything you need, you must finish the turn by
    calling the final_response tool with your pun-filled reply, and with a
    weather_conditions summary whenever you obtained weather data.
"};

/// Events produced while the agent works through one conversational turn
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyEvent {
    /// An intermediate message: assistant tool requests or tool responses
    Message(Message),
    /// The structured final answer ending the turn
    Response(ResponseFormat),
}

/// Agent integrates a chat model with the toolkits it can pilot, a
/// structured response contract, and thread-scoped conversation memory.
pub struct Agent {
    toolkits: Vec<Box<dyn Toolkit>>,
    provider: Box<dyn Provider + Send + Sync>,
    checkpointer: Box<dyn Checkpointer>,
}

impl Agent {
    /// Create a new Agent with the specified provider and checkpointer
    pub fn new(
        provider: Box<dyn Provider + Send + Sync>,
        checkpointer: Box<dyn Checkpointer>,
    ) -> Self {
        Self {
            toolkits: Vec::new(),
            provider,
            checkpointer,
        }
    }

    /// Add a toolkit to the agent
    pub fn add_toolkit(&mut self, toolkit: Box<dyn Toolkit>) {
        self.toolkits.push(toolkit);
    }

    /// Get all tools from all toolkits with proper toolkit prefixing,
    /// plus the structured-response tool
    fn get_prefixed_tools(&self) -> Vec<Tool> {
        let mut tools = Vec::new();
        for toolkit in &self.toolkits {
            for tool in toolkit.tools() {
                tools.push(Tool::new(
                    format!("{}__{}", toolkit.name(), tool.name),
                    &tool.description,
                    tool.input_schema.clone(),
                ));
            }
        }
        tools.push(Tool::new(
            FINAL_RESPONSE_TOOL,
            "Deliver the final structured answer for this turn",
            ResponseFormat::schema(),
        ));
        tools
    }

    /// Find the appropriate toolkit for a tool call based on the prefixed name
    fn get_toolkit_for_tool(&self, prefixed_name: &str) -> Option<&dyn Toolkit> {
        let parts: Vec<&str> = prefixed_name.split("__").collect();
        if parts.len() != 2 {
            return None;
        }
        let toolkit_name = parts[0];
        self.toolkits
            .iter()
            .find(|toolkit| toolkit.name() == toolkit_name)
            .map(|v| &**v)
    }

    /// Dispatch a single tool call to the appropriate toolkit
    async fn dispatch_tool_call(
        &self,
        tool_call: AgentResult<ToolCall>,
        context: &Context,
    ) -> AgentResult<Vec<Content>> {
        let call = tool_call?;
        let toolkit = self
            .get_toolkit_for_tool(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        let tool_name = call
            .name
            .split("__")
            .nth(1)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;
        let toolkit_tool_call = ToolCall::new(tool_name, call.arguments);

        tracing::debug!(toolkit = toolkit.name(), tool = tool_name, "dispatching tool call");
        toolkit.call(toolkit_tool_call, context).await
    }

    /// Assemble the system prompt from the persona and toolkit instructions
    fn get_system_prompt(&self) -> String {
        let mut sections = vec![PERSONA.to_string()];
        for toolkit in &self.toolkits {
            let tool_lines: Vec<String> = toolkit
                .tools()
                .iter()
                .map(|tool| {
                    format!(
                        "- {}__{}: {}",
                        toolkit.name(),
                        tool.name,
                        tool.description
                    )
                })
                .collect();
            sections.push(format!(
                "## {}\n{}\n\n{}\nTools:\n{}",
                toolkit.name(),
                toolkit.description(),
                toolkit.instructions(),
                tool_lines.join("\n")
            ));
        }
        sections.join("\n")
    }

    /// Parse a final_response tool call into the structured response
    fn parse_final_response(call: &ToolCall) -> AgentResult<ResponseFormat> {
        serde_json::from_value(call.arguments.clone())
            .map_err(|e| AgentError::InvalidParameters(e.to_string()))
    }

    /// Run one conversational turn on the given thread.
    ///
    /// The returned stream yields every intermediate message (assistant tool
    /// requests, tool responses) and ends with exactly one
    /// [`ReplyEvent::Response`]. Tool dispatch is sequential; the thread
    /// history is checkpointed once the turn completes.
    pub async fn reply(
        &self,
        thread_id: &str,
        message: Message,
        context: &Context,
    ) -> Result<BoxStream<'_, Result<ReplyEvent>>> {
        let mut messages = self.checkpointer.load(thread_id)?;
        messages.push(message);

        let tools = self.get_prefixed_tools();
        let system_prompt = self.get_system_prompt();
        let thread_id = thread_id.to_string();
        let context = context.clone();

        Ok(Box::pin(async_stream::try_stream! {
            loop {
                // Get completion from provider
                let (response, _usage) = self.provider.complete(
                    &system_prompt,
                    &messages,
                    &tools,
                ).await?;

                messages.push(response.clone());
                yield ReplyEvent::Message(response.clone());

                let tool_requests = response.tool_requests();

                if tool_requests.is_empty() {
                    // A plain text reply ends the turn; coerce it into the
                    // structured shape so callers see one contract
                    let format = ResponseFormat {
                        punny_response: response.text(),
                        weather_conditions: None,
                    };
                    self.checkpointer.save(&thread_id, &messages)?;
                    yield ReplyEvent::Response(format);
                    break;
                }

                // The structured-response call ends the turn
                let final_request = tool_requests.iter().find(|request| {
                    matches!(&request.tool_call, Ok(call) if call.name == FINAL_RESPONSE_TOOL)
                });
                if let Some(request) = final_request {
                    let call = request.tool_call.clone()?;
                    let format = Self::parse_final_response(&call)?;
                    let final_id = request.id.clone();

                    // Every tool call id in the message must receive a tool
                    // response, or the next turn's payload is malformed
                    let mut ack = Message::user();
                    for pending in &tool_requests {
                        let note = if pending.id == final_id {
                            "delivered"
                        } else {
                            "skipped: the turn ended with the final response"
                        };
                        ack = ack.with_tool_response(
                            pending.id.clone(),
                            Ok(vec![Content::text(note)]),
                        );
                    }
                    messages.push(ack);
                    self.checkpointer.save(&thread_id, &messages)?;
                    yield ReplyEvent::Response(format);
                    break;
                }

                // Dispatch each tool call in order, collecting the responses
                // into a single user message keyed by the original ids
                let mut message_tool_response = Message::user();
                for request in &tool_requests {
                    let output = self
                        .dispatch_tool_call(request.tool_call.clone(), &context)
                        .await;
                    if let Err(ref error) = output {
                        tracing::warn!(%error, id = %request.id, "tool call failed");
                    }
                    message_tool_response = message_tool_response
                        .with_tool_response(request.id.clone(), output);
                }

                messages.push(message_tool_response.clone());
                yield ReplyEvent::Message(message_tool_response);
            }
        }))
    }
}
