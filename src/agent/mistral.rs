//! Chat-completions client for the Mistral API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use super::tools::ToolDefinition;
use crate::config::AgentConfig;
use crate::{AdsbError, Result};

/// One message of a chat conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        name: String,
        content: String,
        tool_call_id: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }
}

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments object
    #[serde(deserialize_with = "string_or_json")]
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<ToolCall>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ToolCall>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Arguments normally arrive as a string, occasionally as a raw object
fn string_or_json<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

/// A language model able to answer a conversation, optionally with tool calls
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the assistant message that continues `messages`
    async fn complete(&self, messages: &[ChatMessage], tools: Option<&[ToolDefinition]>) -> Result<ChatMessage>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

pub struct MistralClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl MistralClient {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AdsbError::config("Missing agent API key (set ADSB_AGENT__API_KEY)"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("adsb-tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdsbError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for MistralClient {
    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage], tools: Option<&[ToolDefinition]>) -> Result<ChatMessage> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            tools,
            tool_choice: tools.map(|_| "auto"),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdsbError::agent(format!("Chat completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED => AdsbError::config("The language model API rejected the API key"),
                _ => AdsbError::agent(format!("Chat completion failed with {status}: {body}")),
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AdsbError::agent(format!("Failed to parse chat completion: {e}")))?;

        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| AdsbError::agent("Chat completion returned no choices"))?;

        debug!(?message, "Model replied");
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tool_call_reply() {
        let body = r#"{
            "id": "cmpl-1",
            "choices": [{
                "index": 0,
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [{
                        "id": "call_1",
                        "function": {
                            "name": "calculate_route_distance",
                            "arguments": "{\"origin\": \"37.7749,-122.4194\", \"destination\": \"40.7128,-74.0060\"}"
                        }
                    }]
                }
            }]
        }"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        let ChatMessage::Assistant { tool_calls, .. } = &response.choices[0].message else {
            panic!("expected assistant message");
        };
        assert_eq!(tool_calls[0].kind, "function");
        assert_eq!(tool_calls[0].function.name, "calculate_route_distance");
    }

    #[test]
    fn test_decode_object_arguments_and_null_tool_calls() {
        let call: ToolCall = serde_json::from_str(
            r#"{"id": "c", "type": "function", "function": {"name": "x", "arguments": {"a": 1}}}"#,
        )
        .unwrap();
        assert_eq!(call.function.arguments, r#"{"a":1}"#);

        let message: ChatMessage =
            serde_json::from_str(r#"{"role": "assistant", "content": "hi", "tool_calls": null}"#).unwrap();
        assert_eq!(message, ChatMessage::assistant("hi"));
    }

    #[test]
    fn test_encode_messages() {
        let tool = ChatMessage::Tool {
            name: "get_airport_info".to_string(),
            content: "{}".to_string(),
            tool_call_id: "call_1".to_string(),
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");

        let json = serde_json::to_value(ChatMessage::assistant("done")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn test_request_omits_tool_choice_without_tools() {
        let messages = [ChatMessage::user("hello")];
        let request = CompletionRequest {
            model: "mistral-large-latest",
            messages: &messages,
            tools: None,
            tool_choice: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("tool_choice").is_none());
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = AgentConfig::default();
        assert!(MistralClient::new(&config).is_err());

        let config = AgentConfig {
            api_key: Some("test-key".to_string()),
            ..AgentConfig::default()
        };
        let client = MistralClient::new(&config).unwrap();
        assert_eq!(client.model(), "mistral-large-latest");
    }
}
