use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::news::guardrail::{GuardrailTrip, InputGuardrail};
use crate::news::models::{NewsResult, UserContext};
use crate::news::specialist::{DEFAULT_MAX_TOOL_ROUNDS, Specialist};
use crate::news::{Intent, NewsError};
use crate::rchain::provider::{ChatMessage, ChatModel, ChatRequest, ToolChoice};

const CONTROLLER_INSTRUCTIONS: &str = "\
You are NewsSense: route each user query to exactly one specialist by calling its transfer tool.
Classify:
 - Trends: the user asks what's trending, for top stories or popular headlines.
 - Verify: the user states a claim to check ('Did ... happen?', 'Is it true ...', 'Verify ...').
 - Summarize: the user pastes article text or asks to 'summarize ...'.
Call exactly one transfer tool. Do not answer the query yourself.";

/// Controller decision for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Routed(Intent),
    /// The service answered without handing off; carries its text.
    Unrouted(String),
}

/// Terminal state of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Returned(NewsResult),
    GuardrailTripped(GuardrailTrip),
    Unrouted(String),
}

/// Classifies queries and delegates them to the matching specialist.
pub struct Controller<M> {
    model: M,
    specialists: Vec<Specialist>,
    guardrails: Vec<Box<dyn InputGuardrail>>,
    max_tool_rounds: usize,
    turn_timeout: Option<Duration>,
}

impl<M: ChatModel> Controller<M> {
    /// A controller over the three standard specialists, without guardrails.
    pub fn new(model: M) -> Self {
        Self {
            model,
            specialists: Intent::ALL.into_iter().map(Specialist::for_intent).collect(),
            guardrails: Vec::new(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            turn_timeout: None,
        }
    }

    pub fn with_guardrail(mut self, guardrail: impl InputGuardrail + 'static) -> Self {
        self.guardrails.push(Box::new(guardrail));
        self
    }

    /// Caps the tool rounds per specialist. At least one round always runs,
    /// since a specialist must consult its data source before answering.
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds.max(1);
        self
    }

    pub fn with_turn_timeout(mut self, turn_timeout: Option<Duration>) -> Self {
        self.turn_timeout = turn_timeout;
        self
    }

    pub fn specialist(&self, intent: Intent) -> Option<&Specialist> {
        self.specialists.iter().find(|specialist| specialist.intent == intent)
    }

    /// Runs the input guardrails in registration order; the first trip wins.
    pub fn check_guardrails(&self, query: &str, context: &UserContext) -> Option<GuardrailTrip> {
        self.guardrails
            .iter()
            .find_map(|guardrail| guardrail.check(query, context))
    }

    /// Asks the reasoning service which specialist should take `query`.
    ///
    /// When several handoffs are requested the first one wins.
    pub async fn classify(&self, query: &str) -> Result<Classification, NewsError> {
        let handoffs = self
            .specialists
            .iter()
            .map(Specialist::handoff_tool)
            .collect();
        let request = ChatRequest::new(vec![
            ChatMessage::system(CONTROLLER_INSTRUCTIONS),
            ChatMessage::user(query),
        ])
        .with_tools(handoffs, ToolChoice::Auto);

        let reply = self.model.complete(&request).await?;
        let routed = reply.tool_calls.iter().find_map(|call| {
            self.specialists
                .iter()
                .find(|specialist| specialist.handoff_tool_name() == call.name)
                .map(|specialist| specialist.intent)
        });

        match routed {
            Some(intent) => {
                if reply.tool_calls.len() > 1 {
                    debug!(calls = reply.tool_calls.len(), %intent, "several handoffs requested; using the first");
                }
                Ok(Classification::Routed(intent))
            }
            None => {
                warn!(
                    tool_calls = reply.tool_calls.len(),
                    "reasoning service did not hand off the query"
                );
                Ok(Classification::Unrouted(reply.content))
            }
        }
    }

    /// Handles one query end to end and returns the specialist's result unchanged.
    pub async fn handle(
        &self,
        query: &str,
        context: &UserContext,
    ) -> Result<TurnOutcome, NewsError> {
        if let Some(trip) = self.check_guardrails(query, context) {
            info!(guardrail = trip.guardrail, reason = %trip.reason, "guardrail tripped");
            return Ok(TurnOutcome::GuardrailTripped(trip));
        }

        let dispatch = self.dispatch(query, context);
        match self.turn_timeout {
            Some(limit) => timeout(limit, dispatch)
                .await
                .map_err(|_| NewsError::Timeout(limit))?,
            None => dispatch.await,
        }
    }

    async fn dispatch(&self, query: &str, context: &UserContext) -> Result<TurnOutcome, NewsError> {
        let intent = match self.classify(query).await? {
            Classification::Routed(intent) => intent,
            Classification::Unrouted(text) => return Ok(TurnOutcome::Unrouted(text)),
        };

        let Some(specialist) = self.specialist(intent) else {
            return Ok(TurnOutcome::Unrouted(format!("No specialist handles {intent} queries.")));
        };
        info!(%intent, specialist = specialist.name, user_id = %context.user_id, "query dispatched");

        specialist
            .run(&self.model, query, context, self.max_tool_rounds)
            .await
            .map(TurnOutcome::Returned)
    }
}
