//! Conversational assistant answering aviation questions with the tracking tools
//!
//! The [`Agent`] keeps a tool-calling loop against a [`ChatModel`]: every tool
//! call the model requests is decoded, executed through a [`ToolExecutor`]
//! and fed back until the model answers in plain text.

pub mod mistral;
pub mod tools;

pub use mistral::{ChatMessage, ChatModel, MistralClient, ToolCall};
pub use tools::{BackendToolExecutor, ToolDefinition, ToolExecutor, ToolInvocation, tool_definitions};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::{AdsbError, Result};

fn system_prompt() -> String {
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        "You are an aviation assistant with access to live ADS-B flight tracking tools.\n\
         The current UTC time is {now}. Use it to turn relative times such as \
         \"last 24 hours\" into ISO 8601 timestamps.\n\
         Use the tools to look up aircraft around a location, details of a single aircraft, \
         flight history, airport traffic and route distances. Coordinates are decimal degrees, \
         search radii are nautical miles and altitudes are feet.\n\
         When a tool reports an error, explain it plainly instead of guessing data. \
         Keep answers short and include the numbers the tools returned."
    )
}

fn unexpected_reply(reply: &ChatMessage) -> AdsbError {
    let role = match reply {
        ChatMessage::System { .. } => "system",
        ChatMessage::User { .. } => "user",
        ChatMessage::Assistant { .. } => "assistant",
        ChatMessage::Tool { .. } => "tool",
    };
    warn!(role, "Model replied with a non-assistant message");
    AdsbError::agent(format!("Model replied with a '{role}' message instead of an assistant message"))
}

pub struct Agent<M, E> {
    model: M,
    executor: E,
    tools: Vec<ToolDefinition>,
    max_tool_rounds: u32,
}

impl<M: ChatModel, E: ToolExecutor> Agent<M, E> {
    pub fn new(model: M, executor: E, max_tool_rounds: u32) -> Self {
        Self {
            model,
            executor,
            tools: tool_definitions(),
            max_tool_rounds,
        }
    }

    /// Answer one user message, running as many tool rounds as allowed
    #[instrument(skip_all)]
    pub async fn chat(&self, user_message: &str) -> Result<String> {
        let mut messages = vec![ChatMessage::system(system_prompt()), ChatMessage::user(user_message)];

        for round in 0..self.max_tool_rounds {
            let reply = self.model.complete(&messages, Some(self.tools.as_slice())).await?;
            let (content, tool_calls) = match reply {
                ChatMessage::Assistant { content, tool_calls } => (content, tool_calls),
                other => return Err(unexpected_reply(&other)),
            };

            if tool_calls.is_empty() {
                return Ok(content.unwrap_or_default());
            }

            info!(round, calls = tool_calls.len(), "Model requested tools");
            messages.push(ChatMessage::Assistant {
                content,
                tool_calls: tool_calls.clone(),
            });
            for call in &tool_calls {
                let result = self.run_tool(call).await;
                messages.push(ChatMessage::Tool {
                    name: call.function.name.clone(),
                    content: result.to_string(),
                    tool_call_id: call.id.clone(),
                });
            }
        }

        info!(max_tool_rounds = self.max_tool_rounds, "Tool round limit reached, asking for a final answer");
        match self.model.complete(&messages, None).await? {
            ChatMessage::Assistant { content, .. } => Ok(content.unwrap_or_default()),
            other => Err(unexpected_reply(&other)),
        }
    }

    async fn run_tool(&self, call: &ToolCall) -> serde_json::Value {
        match ToolInvocation::parse(&call.function.name, &call.function.arguments) {
            Ok(invocation) => {
                debug!(?invocation, "Executing tool");
                self.executor.execute(&invocation).await
            }
            Err(e) => {
                warn!(tool = %call.function.name, error = %e, "Rejected tool call");
                tools::failure_result(&e)
            }
        }
    }
}
