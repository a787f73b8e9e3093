//! News routing: intents, specialists, the controller and console rendering.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::rchain::provider::ProviderError;

pub mod controller;
pub mod data;
pub mod guardrail;
pub mod models;
pub mod render;
pub mod specialist;

pub use controller::{Classification, Controller, TurnOutcome};
pub use guardrail::{GuardrailTrip, InputGuardrail, QueryGuardrail};
pub use models::{ArticleSummary, ClaimVerdict, NewsResult, TrendingTopic, UserContext};
pub use specialist::Specialist;

/// Classification target of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Trending,
    FactCheck,
    Summarize,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::Trending, Intent::FactCheck, Intent::Summarize];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::FactCheck => "fact-check",
            Self::Summarize => "summarize",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum NewsError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("{specialist} returned invalid output: {source}")]
    Validation {
        specialist: String,
        #[source]
        source: models::ValidationError,
    },
    #[error("{specialist} did not finish within {rounds} tool rounds")]
    ToolRoundsExceeded { specialist: String, rounds: usize },
    #[error("turn timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}
