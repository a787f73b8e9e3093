use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::news::data::{fact_check_claim, summarize_news, trending_news};
use crate::news::models::{NewsResult, UserContext, ValidationError, output_schema};
use crate::news::{Intent, NewsError};
use crate::rchain::provider::{ChatMessage, ChatModel, ChatRequest, ResponseFormat, ToolChoice};
use crate::rchain::tools::{ToolCall, ToolDefinition, ToolFunction, ToolParam, ToolParamType};

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 4;

const TRENDING_INSTRUCTIONS: &str = "\
You are a NEWS TRENDING SPECIALIST. Your responsibility is to:
- Retrieve current trending news topics and headlines with the get_trending_news tool.
- Only answer queries about top stories, popular headlines, breaking news or trending topics.
- Pick the most frequent topic returned by the tool and keep its topic, headlines and frequency unchanged.
- Write a one or two sentence summary of that topic.
- Never answer verification or summarization requests.
- Reply with a single JSON object with the fields topic, headlines, frequency and summary.";

const FACT_CHECK_INSTRUCTIONS: &str = "\
You are a NEWS FACT CHECKER. Your responsibility is to:
- Use the fact_check_claim tool to assess claims or rumors about current events, news and public figures.
- Only respond to direct requests for verification ('Did', 'Is it true', 'Verify', 'Fact check').
- Never answer general news or summarization requests.
- Pass the tool the bare claim as a statement, without lead-ins like 'Is it true' or 'Did'.
- Always cite the sources the tool returned; do not invent new ones.
- Reply with a single JSON object with the fields claim, verdict, sources and summary.";

const SUMMARIZER_INSTRUCTIONS: &str = "\
You are a NEWS SUMMARIZER. Your responsibility is to:
- Use the summarize_news tool to condense pasted news text or broad topics into 3 to 5 bullet points and a brief summary.
- Only answer summarization requests (explicitly asking to 'summarize' or pasting a chunk of news text).
- Do not respond to fact-check or trending requests.
- Reply with a single JSON object with the fields topic, bullet_points and full_summary.";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TrendingArgs {
    topic: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FactCheckArgs {
    claim: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SummarizeArgs {
    article_text: String,
    topic: Option<String>,
}

/// A role bound to one intent, one data tool and one output schema.
#[derive(Debug, Clone)]
pub struct Specialist {
    pub intent: Intent,
    pub name: &'static str,
    /// Shown to the controller when it picks a specialist.
    pub handoff_description: &'static str,
    pub instructions: &'static str,
    pub tool: ToolDefinition,
    pub schema: Value,
}

impl Specialist {
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::Trending => Self::trending(),
            Intent::FactCheck => Self::fact_checker(),
            Intent::Summarize => Self::summarizer(),
        }
    }

    pub fn trending() -> Self {
        let tool = ToolFunction::new(
            "get_trending_news",
            "Look up trending news topics, optionally filtered by topic or category.",
        )
        .with_param(ToolParam::optional(
            "topic",
            ToolParamType::String,
            "Case-insensitive fragment of a topic name.",
        ))
        .with_param(ToolParam::optional(
            "category",
            ToolParamType::String,
            "Exact category key such as 'tech' or 'finance'.",
        ));

        Self {
            intent: Intent::Trending,
            name: "Trending News Agent",
            handoff_description: "Find and summarize trending news topics by category.",
            instructions: TRENDING_INSTRUCTIONS,
            tool: ToolDefinition::from_function(tool),
            schema: output_schema(Intent::Trending),
        }
    }

    pub fn fact_checker() -> Self {
        let tool = ToolFunction::new(
            "fact_check_claim",
            "Check a claim against known fact-check records.",
        )
        .with_param(ToolParam::required(
            "claim",
            ToolParamType::String,
            "The claim to verify.",
        ));

        Self {
            intent: Intent::FactCheck,
            name: "Fact Checker Agent",
            handoff_description: "Verify the accuracy of claims using facts and citations.",
            instructions: FACT_CHECK_INSTRUCTIONS,
            tool: ToolDefinition::from_function(tool),
            schema: output_schema(Intent::FactCheck),
        }
    }

    pub fn summarizer() -> Self {
        let tool = ToolFunction::new(
            "summarize_news",
            "Summarize article text into bullet points and a short summary.",
        )
        .with_param(ToolParam::required(
            "article_text",
            ToolParamType::String,
            "The article text or topic to summarize.",
        ))
        .with_param(ToolParam::optional(
            "topic",
            ToolParamType::String,
            "Topic label for the summary.",
        ));

        Self {
            intent: Intent::Summarize,
            name: "News Summarizer Agent",
            handoff_description: "Summarize articles or topics into simple points.",
            instructions: SUMMARIZER_INSTRUCTIONS,
            tool: ToolDefinition::from_function(tool),
            schema: output_schema(Intent::Summarize),
        }
    }

    /// Name of the tool the controller calls to hand a query to this specialist.
    pub fn handoff_tool_name(&self) -> String {
        let slug = self
            .name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_");
        format!("transfer_to_{slug}")
    }

    pub fn handoff_tool(&self) -> ToolDefinition {
        ToolDefinition::from_function(ToolFunction::new(
            self.handoff_tool_name(),
            format!("Handoff to the {}. {}", self.name, self.handoff_description),
        ))
    }

    fn response_format(&self) -> ResponseFormat {
        let name = match self.intent {
            Intent::Trending => "TrendingTopic",
            Intent::FactCheck => "ClaimVerdict",
            Intent::Summarize => "ArticleSummary",
        };
        ResponseFormat::json_schema(name, self.schema.clone())
    }

    /// Runs the query to a structured result.
    ///
    /// The first round forces a tool call so the answer is always backed by
    /// this specialist's data source. Tool results are fed back until the model
    /// answers in text, which must then match the output schema.
    pub async fn run<M: ChatModel>(
        &self,
        model: &M,
        query: &str,
        context: &UserContext,
        max_tool_rounds: usize,
    ) -> Result<NewsResult, NewsError> {
        let mut messages = vec![
            ChatMessage::system(self.instructions),
            ChatMessage::user(query),
        ];
        let mut consulted = false;

        for round in 0..=max_tool_rounds {
            let choice = if consulted {
                ToolChoice::Auto
            } else {
                ToolChoice::Required
            };
            let tools = if round < max_tool_rounds {
                vec![self.tool.clone()]
            } else {
                Vec::new()
            };
            let request = ChatRequest::new(messages.clone())
                .with_tools(tools, choice)
                .with_response_format(self.response_format());

            let reply = model.complete(&request).await?;
            if !reply.has_tool_calls() {
                if !consulted {
                    return Err(self.invalid(ValidationError::DataSourceSkipped));
                }
                let result = NewsResult::parse(self.intent, &reply.content)
                    .map_err(|source| self.invalid(source))?;
                info!(
                    specialist = self.name,
                    user_id = %context.user_id,
                    rounds = round,
                    "specialist produced a result"
                );
                return Ok(result);
            }

            messages.push(ChatMessage::assistant_from_ai(&reply));
            for call in &reply.tool_calls {
                let output = match self.call_tool(call) {
                    Ok(output) => {
                        consulted = true;
                        output
                    }
                    Err(message) => {
                        warn!(specialist = self.name, tool = %call.name, %message, "tool call rejected");
                        format!("error: {message}")
                    }
                };
                messages.push(ChatMessage::tool_result(&call.id, output));
            }
        }

        Err(NewsError::ToolRoundsExceeded {
            specialist: self.name.to_string(),
            rounds: max_tool_rounds,
        })
    }

    /// Executes one tool call against the bound data source.
    ///
    /// Errors are returned as text for the model rather than failing the turn.
    pub fn call_tool(&self, call: &ToolCall) -> Result<String, String> {
        if call.name != self.tool.name() {
            return Err(format!(
                "unknown tool '{}'; only '{}' is available",
                call.name,
                self.tool.name()
            ));
        }

        let bad_args = |err: serde_json::Error| format!("invalid arguments for {}: {err}", call.name);
        let output = match self.intent {
            Intent::Trending => {
                let args: TrendingArgs = call.parse_args().map_err(bad_args)?;
                serde_json::to_string(&trending_news(args.topic.as_deref(), args.category.as_deref()))
            }
            Intent::FactCheck => {
                let args: FactCheckArgs = call.parse_args().map_err(bad_args)?;
                serde_json::to_string(&fact_check_claim(&args.claim))
            }
            Intent::Summarize => {
                let args: SummarizeArgs = call.parse_args().map_err(bad_args)?;
                serde_json::to_string(&summarize_news(&args.article_text, args.topic.as_deref()))
            }
        }
        .map_err(|err| format!("failed to encode {} output: {err}", call.name))?;

        debug!(specialist = self.name, tool = %call.name, bytes = output.len(), "tool call served");
        Ok(output)
    }

    fn invalid(&self, source: ValidationError) -> NewsError {
        warn!(specialist = self.name, error = %source, "specialist output rejected");
        NewsError::Validation {
            specialist: self.name.to_string(),
            source,
        }
    }
}
