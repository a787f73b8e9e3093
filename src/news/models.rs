use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::news::Intent;

/// Who is asking. Built once per session and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub preferred_categories: Vec<String>,
    pub last_query_time: DateTime<Local>,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            preferred_categories: Vec::new(),
            last_query_time: Local::now(),
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrendingTopic {
    pub topic: String,
    pub headlines: Vec<String>,
    pub frequency: u32,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimVerdict {
    pub claim: String,
    pub verdict: String,
    pub sources: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArticleSummary {
    pub topic: String,
    pub bullet_points: Vec<String>,
    pub full_summary: String,
}

pub const MIN_BULLETS: usize = 3;
pub const MAX_BULLETS: usize = 5;

/// Structured answer of exactly one specialist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NewsResult {
    Trending(TrendingTopic),
    FactCheck(ClaimVerdict),
    Summary(ArticleSummary),
}

impl NewsResult {
    pub fn intent(&self) -> Intent {
        match self {
            Self::Trending(_) => Intent::Trending,
            Self::FactCheck(_) => Intent::FactCheck,
            Self::Summary(_) => Intent::Summarize,
        }
    }

    /// Parses a specialist's final message against the schema of `intent`.
    ///
    /// The payload may be wrapped in a Markdown code fence. Unknown fields,
    /// wrong types and failed field checks are all rejected.
    pub fn parse(intent: Intent, raw: &str) -> Result<Self, ValidationError> {
        let payload = strip_code_fence(raw);
        let result = match intent {
            Intent::Trending => Self::Trending(decode::<TrendingTopic>(payload)?),
            Intent::FactCheck => Self::FactCheck(decode::<ClaimVerdict>(payload)?),
            Intent::Summarize => Self::Summary(decode::<ArticleSummary>(payload)?),
        };
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Trending(topic) => {
                require_text("topic", &topic.topic)?;
                if topic.headlines.is_empty() {
                    return Err(ValidationError::field("headlines", "at least one headline is required"));
                }
                require_entries("headlines", &topic.headlines)?;
                require_text("summary", &topic.summary)
            }
            Self::FactCheck(verdict) => {
                require_text("claim", &verdict.claim)?;
                require_text("verdict", &verdict.verdict)?;
                require_entries("sources", &verdict.sources)?;
                require_text("summary", &verdict.summary)
            }
            Self::Summary(summary) => {
                require_text("topic", &summary.topic)?;
                let count = summary.bullet_points.len();
                if !(MIN_BULLETS..=MAX_BULLETS).contains(&count) {
                    return Err(ValidationError::field(
                        "bullet_points",
                        format!("expected {MIN_BULLETS} to {MAX_BULLETS} bullets, got {count}"),
                    ));
                }
                require_entries("bullet_points", &summary.bullet_points)?;
                require_text("full_summary", &summary.full_summary)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("output is not valid JSON for the expected schema: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("field `{field}` is invalid: {reason}")]
    Field { field: &'static str, reason: String },
    #[error("specialist answered without consulting its data source")]
    DataSourceSkipped,
}

impl ValidationError {
    fn field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Field {
            field,
            reason: reason.into(),
        }
    }
}

fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, ValidationError> {
    Ok(serde_json::from_str(payload)?)
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::field(field, "must not be empty"));
    }
    Ok(())
}

fn require_entries(field: &'static str, values: &[String]) -> Result<(), ValidationError> {
    match values.iter().position(|value| value.trim().is_empty()) {
        Some(index) => Err(ValidationError::field(field, format!("entry {index} is empty"))),
        None => Ok(()),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn string_array() -> Value {
    json!({"type": "array", "items": {"type": "string"}})
}

/// Strict JSON schema of the structured output for `intent`.
///
/// Cardinality and range rules are left to [`NewsResult::validate`]; strict
/// structured-output endpoints reject most numeric and array keywords.
pub fn output_schema(intent: Intent) -> Value {
    let (properties, required) = match intent {
        Intent::Trending => (
            json!({
                "topic": {"type": "string"},
                "headlines": string_array(),
                "frequency": {"type": "integer"},
                "summary": {"type": "string"},
            }),
            json!(["topic", "headlines", "frequency", "summary"]),
        ),
        Intent::FactCheck => (
            json!({
                "claim": {"type": "string"},
                "verdict": {"type": "string"},
                "sources": string_array(),
                "summary": {"type": "string"},
            }),
            json!(["claim", "verdict", "sources", "summary"]),
        ),
        Intent::Summarize => (
            json!({
                "topic": {"type": "string"},
                "bullet_points": string_array(),
                "full_summary": {"type": "string"},
            }),
            json!(["topic", "bullet_points", "full_summary"]),
        ),
    };

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_context_defaults() {
        let before = Local::now();
        let context = UserContext::new("user456");
        assert!(context.preferred_categories.is_empty());
        assert!(context.last_query_time >= before);

        let context = context.with_categories(["tech", "finance"]);
        assert_eq!(context.preferred_categories, vec!["tech", "finance"]);
    }

    #[test]
    fn parses_fenced_trending_output() {
        let raw = "```json\n{\"topic\":\"AI\",\"headlines\":[\"a\"],\"frequency\":3,\"summary\":\"s\"}\n```";
        let result = NewsResult::parse(Intent::Trending, raw).expect("output should parse");
        assert_eq!(result.intent(), Intent::Trending);
    }

    #[test]
    fn rejects_unknown_fields() {
        let raw = r#"{"claim":"c","verdict":"True","sources":[],"summary":"s","confidence":0.9}"#;
        let err = NewsResult::parse(Intent::FactCheck, raw).expect_err("extra field rejected");
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn rejects_negative_frequency() {
        let raw = r#"{"topic":"AI","headlines":["a"],"frequency":-1,"summary":"s"}"#;
        assert!(NewsResult::parse(Intent::Trending, raw).is_err());
    }

    #[test]
    fn rejects_wrong_schema_for_intent() {
        let raw = r#"{"topic":"AI","headlines":["a"],"frequency":1,"summary":"s"}"#;
        assert!(NewsResult::parse(Intent::Summarize, raw).is_err());
    }

    #[test]
    fn refusal_text_is_malformed() {
        let err = NewsResult::parse(Intent::Trending, "I only handle trending news.")
            .expect_err("prose is not a result");
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn bullet_cardinality_is_enforced() {
        let mut summary = ArticleSummary {
            topic: "General News".to_string(),
            bullet_points: vec!["a".to_string(), "b".to_string()],
            full_summary: "a b".to_string(),
        };
        let err = NewsResult::Summary(summary.clone()).validate().expect_err("two bullets");
        assert!(matches!(err, ValidationError::Field { field: "bullet_points", .. }));

        summary.bullet_points = (0..6).map(|i| format!("bullet {i}")).collect();
        assert!(NewsResult::Summary(summary.clone()).validate().is_err());

        summary.bullet_points.truncate(5);
        assert!(NewsResult::Summary(summary).validate().is_ok());
    }

    #[test]
    fn blank_fields_are_rejected() {
        let verdict = ClaimVerdict {
            claim: "c".to_string(),
            verdict: "  ".to_string(),
            sources: Vec::new(),
            summary: "s".to_string(),
        };
        let err = NewsResult::FactCheck(verdict).validate().expect_err("blank verdict");
        assert!(matches!(err, ValidationError::Field { field: "verdict", .. }));

        let topic = TrendingTopic {
            topic: "AI".to_string(),
            headlines: Vec::new(),
            frequency: 1,
            summary: "s".to_string(),
        };
        assert!(NewsResult::Trending(topic).validate().is_err());
    }

    #[test]
    fn schemas_are_strict() {
        for intent in Intent::ALL {
            let schema = output_schema(intent);
            assert_eq!(schema["additionalProperties"], json!(false));
            let required = schema["required"].as_array().expect("required list");
            let properties = schema["properties"].as_object().expect("properties map");
            assert_eq!(required.len(), properties.len());
        }
    }

    #[test]
    fn results_serialize_with_kind_tag() {
        let result = NewsResult::FactCheck(ClaimVerdict {
            claim: "c".to_string(),
            verdict: "Unverified".to_string(),
            sources: Vec::new(),
            summary: "s".to_string(),
        });
        let value = serde_json::to_value(&result).expect("result serializes");
        assert_eq!(value["kind"], json!("fact_check"));
        assert_eq!(value["verdict"], json!("Unverified"));
    }
}
