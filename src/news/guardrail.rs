use tracing::warn;

use crate::news::models::UserContext;

pub const DEFAULT_MAX_QUERY_CHARS: usize = 4_000;

/// Why a turn was stopped before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailTrip {
    pub guardrail: &'static str,
    pub reason: String,
}

/// Pre-dispatch check on the raw query.
pub trait InputGuardrail: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Some` stops the turn; no specialist runs.
    fn check(&self, query: &str, context: &UserContext) -> Option<GuardrailTrip>;
}

/// Rejects oversized queries and queries containing blocked terms.
#[derive(Debug, Clone)]
pub struct QueryGuardrail {
    max_chars: usize,
    blocked_terms: Vec<String>,
}

impl Default for QueryGuardrail {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUERY_CHARS)
    }
}

impl QueryGuardrail {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            blocked_terms: Vec::new(),
        }
    }

    pub fn with_blocked_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blocked_terms = terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        self
    }

    fn trip(&self, reason: String) -> Option<GuardrailTrip> {
        Some(GuardrailTrip {
            guardrail: self.name(),
            reason,
        })
    }
}

impl InputGuardrail for QueryGuardrail {
    fn name(&self) -> &'static str {
        "query"
    }

    fn check(&self, query: &str, context: &UserContext) -> Option<GuardrailTrip> {
        let chars = query.chars().count();
        if chars > self.max_chars {
            warn!(user_id = %context.user_id, chars, max = self.max_chars, "query too long");
            return self.trip(format!(
                "query is {chars} characters long; the limit is {}",
                self.max_chars
            ));
        }

        let lowered = query.to_lowercase();
        if let Some(term) = self.blocked_terms.iter().find(|term| lowered.contains(term.as_str())) {
            warn!(user_id = %context.user_id, term = %term, "blocked term in query");
            return self.trip(format!("query mentions blocked term '{term}'"));
        }

        None
    }
}
