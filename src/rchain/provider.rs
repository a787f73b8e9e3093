use std::future::Future;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::rchain::ai::AIMessage;
use crate::rchain::tools::{ToolCall, ToolDefinition};

/// Role of one chat-completions message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One message of a chat-completions conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl ChatMessage {
    fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(MessageRole::User, content)
    }

    /// Echoes an assistant reply back into the conversation, tool calls included.
    pub fn assistant_from_ai(message: &AIMessage) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: (!message.content.is_empty()).then(|| message.content.clone()),
            tool_call_id: None,
            tool_calls: message.tool_calls.clone(),
        }
    }

    /// Result of one tool invocation, answering the call with `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: Vec::new(),
        }
    }
}

/// How the model may use the offered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    Auto,
    Required,
}

impl ToolChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Required => "required",
        }
    }
}

/// Structured-output constraint on the final assistant message.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFormat {
    pub name: String,
    pub schema: Value,
}

impl ResponseFormat {
    pub fn json_schema(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Provider-agnostic request for one completion.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<ToolChoice>,
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>, choice: ToolChoice) -> Self {
        self.tools = tools;
        self.tool_choice = Some(choice);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Returns true when a tool with `name` is offered in this request.
    pub fn offers_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.function.name == name)
    }
}

/// Sampling and transport options for the reasoning service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AskOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            temperature: None,
            max_tokens: None,
            timeout_secs: None,
            retries: 0,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("reasoning service request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("reasoning service API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("reasoning service response did not contain a message")]
    EmptyResponse,
}

/// External reasoning collaborator: one chat completion per call.
pub trait ChatModel {
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<AIMessage, ProviderError>> + Send;
}

impl<M: ChatModel> ChatModel for &M {
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<AIMessage, ProviderError>> + Send {
        (**self).complete(request)
    }
}
