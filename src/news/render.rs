use std::fmt::Write;

use owo_colors::OwoColorize;

use crate::news::controller::TurnOutcome;
use crate::news::guardrail::GuardrailTrip;
use crate::news::models::{ArticleSummary, ClaimVerdict, NewsResult, TrendingTopic};

pub const GUARDRAIL_BANNER: &str = "⚠️ GUARDRAIL TRIGGERED ⚠️";

/// Console output format for turn results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

impl OutputMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Renders labelled console text; `color` only styles the header lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    pub mode: OutputMode,
    pub color: bool,
}

impl Renderer {
    pub fn new(mode: OutputMode, color: bool) -> Self {
        Self { mode, color }
    }

    pub fn outcome(&self, outcome: &TurnOutcome) -> String {
        match outcome {
            TurnOutcome::Returned(result) => self.result(result),
            TurnOutcome::GuardrailTripped(trip) => self.guardrail(trip),
            TurnOutcome::Unrouted(text) => format!("{}\n", text.trim_end()),
        }
    }

    pub fn result(&self, result: &NewsResult) -> String {
        if self.mode == OutputMode::Json {
            return match serde_json::to_string_pretty(result) {
                Ok(json) => format!("{json}\n"),
                Err(err) => format!("error: could not encode result: {err}\n"),
            };
        }
        match result {
            NewsResult::Trending(topic) => self.trending(topic),
            NewsResult::FactCheck(verdict) => self.claim(verdict),
            NewsResult::Summary(summary) => self.summary(summary),
        }
    }

    pub fn guardrail(&self, trip: &GuardrailTrip) -> String {
        format!("\n{}\n{}\n", self.header(GUARDRAIL_BANNER), trip.reason)
    }

    fn header(&self, text: &str) -> String {
        if self.color {
            text.bold().cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn trending(&self, topic: &TrendingTopic) -> String {
        let mut out = String::new();
        let header = format!("🌏 TRENDING TOPIC: {}", topic.topic.to_uppercase());
        let _ = writeln!(out, "{}", self.header(&header));
        for (index, headline) in topic.headlines.iter().enumerate() {
            let _ = writeln!(out, "{}. {headline}", index + 1);
        }
        let _ = writeln!(out, "Frequency: {}", topic.frequency);
        let _ = writeln!(out, "Summary: {}", topic.summary);
        out
    }

    fn claim(&self, verdict: &ClaimVerdict) -> String {
        let mut out = String::new();
        let header = format!("❓ CLAIM: {}", verdict.claim);
        let _ = writeln!(out, "{}", self.header(&header));
        let _ = writeln!(out, "Verdict: {}", verdict.verdict);
        let _ = writeln!(out, "Sources:");
        for source in &verdict.sources {
            let _ = writeln!(out, "- {source}");
        }
        let _ = writeln!(out, "Summary: {}", verdict.summary);
        out
    }

    fn summary(&self, summary: &ArticleSummary) -> String {
        let mut out = String::new();
        let header = format!("✍️ SUMMARY FOR TOPIC: {}", summary.topic);
        let _ = writeln!(out, "{}", self.header(&header));
        for bullet in &summary.bullet_points {
            let _ = writeln!(out, "- {bullet}");
        }
        let _ = writeln!(out, "Summary: {}", summary.full_summary);
        out
    }
}
