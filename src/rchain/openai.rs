use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::rchain::ai::AIMessage;
use crate::rchain::chat_runtime::{RetryPolicy, post_json_with_retry};
use crate::rchain::provider::{
    AskOptions, ChatMessage, ChatModel, ChatRequest, ProviderError, Usage,
};
use crate::rchain::tools::ToolCall;

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    url: String,
    api_key: String,
    model: String,
    options: AskOptions,
    client: reqwest::Client,
}

impl OpenAiChat {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        options: AskOptions,
    ) -> Self {
        Self {
            url: completions_url(base_url),
            api_key: api_key.into(),
            model: model.into(),
            options,
            client: reqwest::Client::new(),
        }
    }

    fn payload<'a>(&'a self, request: &'a ChatRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
            tools: (!request.tools.is_empty())
                .then(|| request.tools.iter().map(|tool| tool.to_json()).collect()),
            tool_choice: request
                .tool_choice
                .filter(|_| !request.tools.is_empty())
                .map(|choice| choice.as_str()),
            response_format: request.response_format.as_ref().map(|format| {
                json!({
                    "type": "json_schema",
                    "json_schema": {
                        "name": format.name,
                        "schema": format.schema,
                        "strict": true,
                    }
                })
            }),
        }
    }
}

impl ChatModel for OpenAiChat {
    async fn complete(&self, request: &ChatRequest) -> Result<AIMessage, ProviderError> {
        let payload = self.payload(request);
        let response = post_json_with_retry(
            &self.client,
            &self.url,
            &self.api_key,
            &payload,
            RetryPolicy::from_options(&self.options),
        )
        .await?;

        let body: ChatCompletionResponse = response.json().await?;
        let message = into_ai_message(body)?;
        debug!(
            model = %self.model,
            tool_calls = message.tool_calls.len(),
            total_tokens = message.usage.and_then(|usage| usage.total_tokens),
            "chat completion received"
        );
        Ok(message)
    }
}

fn completions_url(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{base}/chat/completions")
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallPayload>,
}

#[derive(Debug, Deserialize)]
struct ToolCallPayload {
    #[serde(default)]
    id: String,
    function: FunctionPayload,
}

#[derive(Debug, Deserialize)]
struct FunctionPayload {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

fn into_ai_message(body: ChatCompletionResponse) -> Result<AIMessage, ProviderError> {
    let message = body
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or(ProviderError::EmptyResponse)?;

    let tool_calls: Vec<ToolCall> = message
        .tool_calls
        .into_iter()
        .filter(|call| !call.function.name.is_empty())
        .map(|call| ToolCall::from_wire(call.id, call.function.name, &call.function.arguments))
        .collect();
    let content = message.content.unwrap_or_default();
    if content.is_empty() && tool_calls.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    Ok(AIMessage {
        content,
        tool_calls,
        usage: body.usage.map(|usage| Usage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }),
    })
}
