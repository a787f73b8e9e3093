#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use newssense::rchain::ai::AIMessage;
use newssense::rchain::provider::{ChatModel, ChatRequest, MessageRole, ProviderError};
use newssense::rchain::tools::ToolCall;
use serde_json::Value;

/// How the fake reasoning service treats one query.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Handoff tool to call; `None` answers the controller in text.
    pub handoff: Option<&'static str>,
    pub unrouted_text: String,
    pub tool_args: Value,
    /// Replaces the final JSON derived from the tool output.
    pub final_content: Option<String>,
    /// Answer the specialist without calling its tool.
    pub skip_tool: bool,
    /// Keep calling the tool forever.
    pub loop_tool: bool,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl Script {
    pub fn routed(handoff: &'static str, tool_args: Value) -> Self {
        Self {
            handoff: Some(handoff),
            tool_args,
            ..Self::default()
        }
    }

    pub fn unrouted(text: &str) -> Self {
        Self {
            unrouted_text: text.to_string(),
            ..Self::default()
        }
    }
}

/// Deterministic stand-in for the external reasoning service.
///
/// It hands off by script, calls whatever data tool is offered, and turns the
/// tool output into the final structured answer.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    scripts: HashMap<String, Script>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, query: &str, script: Script) -> Self {
        self.scripts.insert(query.to_string(), script);
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    fn respond(&self, request: &ChatRequest) -> Result<AIMessage, ProviderError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        let query = request
            .messages
            .iter()
            .find(|message| message.role == MessageRole::User)
            .and_then(|message| message.content.clone())
            .unwrap_or_default();
        let script = self.scripts.get(&query).cloned().unwrap_or_default();
        if script.fail {
            return Err(ProviderError::EmptyResponse);
        }

        let is_controller = request
            .tools
            .iter()
            .any(|tool| tool.name().starts_with("transfer_to_"));
        if is_controller {
            return Ok(match script.handoff {
                Some(handoff) => AIMessage::with_tool_calls(vec![ToolCall {
                    id: "handoff_1".to_string(),
                    name: handoff.to_string(),
                    args: Value::Object(Default::default()),
                }]),
                None => AIMessage::text(script.unrouted_text),
            });
        }

        let last_tool_output = request
            .messages
            .iter()
            .rev()
            .find(|message| message.role == MessageRole::Tool)
            .and_then(|message| message.content.clone());

        let wants_tool = script.loop_tool || (!script.skip_tool && last_tool_output.is_none());
        if wants_tool {
            let tool_name = request
                .tools
                .first()
                .map(|tool| tool.name().to_string())
                .unwrap_or_else(|| "get_trending_news".to_string());
            return Ok(AIMessage::with_tool_calls(vec![ToolCall {
                id: format!("call_{}", request.messages.len()),
                name: tool_name,
                args: script.tool_args.clone(),
            }]));
        }

        if let Some(content) = script.final_content {
            return Ok(AIMessage::text(content));
        }
        let output = last_tool_output.unwrap_or_else(|| "{}".to_string());
        Ok(AIMessage::text(finalize(request, &output)))
    }
}

/// Shapes raw tool output into the schema named by the response format.
fn finalize(request: &ChatRequest, output: &str) -> String {
    let format = request
        .response_format
        .as_ref()
        .map(|format| format.name.as_str())
        .unwrap_or_default();
    if format != "TrendingTopic" {
        return output.to_string();
    }

    let records: Vec<Value> = serde_json::from_str(output).unwrap_or_default();
    let mut top = records
        .into_iter()
        .max_by_key(|record| record["frequency"].as_u64().unwrap_or(0))
        .unwrap_or(Value::Null);
    if let Value::Object(map) = &mut top {
        let summary = format!("{} leads today's coverage.", map["topic"].as_str().unwrap_or(""));
        map.insert("summary".to_string(), Value::String(summary));
    }
    top.to_string()
}

impl ChatModel for ScriptedModel {
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<AIMessage, ProviderError>> + Send {
        let query = request
            .messages
            .iter()
            .find(|message| message.role == MessageRole::User)
            .and_then(|message| message.content.clone())
            .unwrap_or_default();
        let delay = self.scripts.get(&query).and_then(|script| script.delay);
        let result = self.respond(request);
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        }
    }
}
