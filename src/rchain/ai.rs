use crate::rchain::provider::Usage;
use crate::rchain::tools::ToolCall;

/// Assistant message returned by chat models.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AIMessage {
    /// Natural language content; empty when the model only called tools.
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<Usage>,
}

impl AIMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
