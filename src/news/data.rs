//! Canned data sources standing in for real news backends.
//!
//! Every function here is pure: the tables are rebuilt per call and nothing is
//! cached, so identical arguments always produce identical records.

use serde::{Deserialize, Serialize};

use crate::news::models::{ArticleSummary, ClaimVerdict};

pub const TRENDING_LIMIT: usize = 3;
pub const DEFAULT_SUMMARY_TOPIC: &str = "General News";
pub const UNVERIFIED_VERDICT: &str = "Unverified";
pub const UNVERIFIED_SUMMARY: &str = "No sufficient evidence to verify this claim at this time.";

/// One row of the trending table; the specialist adds its own summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingRecord {
    pub topic: String,
    pub headlines: Vec<String>,
    pub frequency: u32,
}

fn record(topic: &str, headlines: &[&str], frequency: u32) -> TrendingRecord {
    TrendingRecord {
        topic: topic.to_string(),
        headlines: headlines.iter().map(|h| h.to_string()).collect(),
        frequency,
    }
}

fn trending_table() -> Vec<(&'static str, Vec<TrendingRecord>)> {
    vec![
        (
            "tech",
            vec![
                record(
                    "AI advancements",
                    &[
                        "OpenAI releases GPT-5",
                        "Apple unveils new AI chip",
                        "Microsoft invests in robotics startup",
                    ],
                    12,
                ),
                record(
                    "Quantum Computing breakthrough",
                    &[
                        "IBM achieves stable qubits at room temperature",
                        "Google announces quantum network tests",
                    ],
                    5,
                ),
            ],
        ),
        (
            "finance",
            vec![
                record(
                    "Stock Market Rally",
                    &["Nasdaq hits all-time high", "Analysts predict continued growth"],
                    9,
                ),
                record(
                    "Interest Rate Cuts",
                    &[
                        "Fed signals possible rate cuts",
                        "European banks lower rates to boost growth",
                    ],
                    6,
                ),
            ],
        ),
    ]
}

/// Looks up trending topics.
///
/// An exact category key wins over a case-insensitive topic substring; with
/// neither filter the whole table is returned. At most [`TRENDING_LIMIT`]
/// records come back.
pub fn trending_news(topic: Option<&str>, category: Option<&str>) -> Vec<TrendingRecord> {
    let table = trending_table();
    let topic = topic.map(str::trim).filter(|topic| !topic.is_empty());

    let by_category = table
        .iter()
        .find(|(key, _)| Some(*key) == category)
        .map(|(_, records)| records.clone());

    let relevant = match (by_category, topic) {
        (Some(records), _) => records,
        (None, Some(topic)) => {
            let needle = topic.to_lowercase();
            table
                .into_iter()
                .flat_map(|(_, records)| records)
                .filter(|record| record.topic.to_lowercase().contains(&needle))
                .collect()
        }
        (None, None) => table.into_iter().flat_map(|(_, records)| records).collect(),
    };

    relevant.into_iter().take(TRENDING_LIMIT).collect()
}

struct KnownClaim {
    key: &'static str,
    verdict: &'static str,
    sources: [&'static str; 2],
    summary: &'static str,
}

const KNOWN_CLAIMS: [KnownClaim; 2] = [
    KnownClaim {
        key: "Apple acquire OpenAI",
        verdict: "False",
        sources: [
            "TechCrunch, 2025-08-01: No public acquisition",
            "Reuters, 2025-07-30: Apple and OpenAI in partnership talks",
        ],
        summary: "There is no verified report of Apple acquiring OpenAI; sources suggest only collaborations.",
    },
    KnownClaim {
        key: "SpaceX launches Mars colony",
        verdict: "Unsubstantiated",
        sources: [
            "NASA Blog, 2025-07-20: SpaceX plans Mars mission for 2026",
            "CNN, 2025-08-02: No reports of actual Mars colony established",
        ],
        summary: "No credible news confirms a Mars colony launch by SpaceX; plans are underway, but not realized.",
    },
];

/// Checks a claim against the known-claims table.
///
/// Matching is a case-insensitive substring test of each table key against
/// the claim. Unknown claims get an "Unverified" verdict with no sources.
pub fn fact_check_claim(claim: &str) -> ClaimVerdict {
    let haystack = claim.to_lowercase();
    match KNOWN_CLAIMS
        .iter()
        .find(|known| haystack.contains(&known.key.to_lowercase()))
    {
        Some(known) => ClaimVerdict {
            claim: claim.to_string(),
            verdict: known.verdict.to_string(),
            sources: known.sources.iter().map(|s| s.to_string()).collect(),
            summary: known.summary.to_string(),
        },
        None => ClaimVerdict {
            claim: claim.to_string(),
            verdict: UNVERIFIED_VERDICT.to_string(),
            sources: Vec::new(),
            summary: UNVERIFIED_SUMMARY.to_string(),
        },
    }
}

const GENERIC_BULLETS: [&str; 5] = [
    "Key events outlined and context provided.",
    "Expert opinions and implications discussed.",
    "Outcome and next steps suggested.",
    "Stakeholders and affected parties identified.",
    "Possible future developments mentioned.",
];

/// Produces the stub summary. The article text is accepted but not read.
pub fn summarize_news(_article_text: &str, topic: Option<&str>) -> ArticleSummary {
    let topic = topic
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .unwrap_or(DEFAULT_SUMMARY_TOPIC);
    ArticleSummary {
        topic: topic.to_string(),
        bullet_points: GENERIC_BULLETS.iter().map(|b| b.to_string()).collect(),
        full_summary: GENERIC_BULLETS.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::models::{MAX_BULLETS, MIN_BULLETS, NewsResult};

    fn trending_categories() -> Vec<&'static str> {
        trending_table().into_iter().map(|(category, _)| category).collect()
    }

    #[test]
    fn every_category_is_capped_and_consistent() {
        let table = trending_table();
        for category in trending_categories() {
            let records = trending_news(None, Some(category));
            assert!(records.len() <= TRENDING_LIMIT);
            let (_, expected) = table
                .iter()
                .find(|(key, _)| *key == category)
                .expect("category is in table");
            for record in &records {
                assert!(expected.contains(record), "{record:?} not in {category}");
            }
        }
    }

    #[test]
    fn tech_category_leads_with_ai() {
        let records = trending_news(None, Some("tech"));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].topic, "AI advancements");
        assert_eq!(records[0].frequency, 12);
        assert_eq!(records[0].headlines.len(), 3);
    }

    #[test]
    fn category_match_wins_over_topic() {
        let records = trending_news(Some("rate"), Some("tech"));
        assert!(records.iter().all(|record| record.topic != "Interest Rate Cuts"));
    }

    #[test]
    fn category_match_is_exact() {
        let records = trending_news(Some("stock"), Some("Tech"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].topic, "Stock Market Rally");
    }

    #[test]
    fn topic_match_ignores_case() {
        let records = trending_news(Some("QUANTUM"), None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].topic, "Quantum Computing breakthrough");
    }

    #[test]
    fn no_filter_returns_truncated_table() {
        let records = trending_news(None, None);
        assert_eq!(records.len(), TRENDING_LIMIT);
        assert_eq!(records[2].topic, "Stock Market Rally");
        assert_eq!(trending_news(Some("  "), Some("sports")), records);
    }

    #[test]
    fn unmatched_topic_returns_nothing() {
        assert!(trending_news(Some("cricket"), None).is_empty());
    }

    #[test]
    fn known_claims_return_table_entries() {
        let verdict = fact_check_claim("Did apple ACQUIRE openai last week?");
        assert_eq!(
            verdict,
            ClaimVerdict {
                claim: "Did apple ACQUIRE openai last week?".to_string(),
                verdict: "False".to_string(),
                sources: vec![
                    "TechCrunch, 2025-08-01: No public acquisition".to_string(),
                    "Reuters, 2025-07-30: Apple and OpenAI in partnership talks".to_string(),
                ],
                summary: "There is no verified report of Apple acquiring OpenAI; sources suggest only collaborations."
                    .to_string(),
            }
        );

        let verdict = fact_check_claim("Is it true that SpaceX launches Mars colony?");
        assert_eq!(verdict.verdict, "Unsubstantiated");
        assert_eq!(
            verdict.sources,
            vec![
                "NASA Blog, 2025-07-20: SpaceX plans Mars mission for 2026",
                "CNN, 2025-08-02: No reports of actual Mars colony established",
            ]
        );
        assert_eq!(
            verdict.summary,
            "No credible news confirms a Mars colony launch by SpaceX; plans are underway, but not realized."
        );
    }

    #[test]
    fn unknown_claims_are_unverified() {
        for claim in ["The moon is made of cheese", "", "Apple acquired OpenAI"] {
            let verdict = fact_check_claim(claim);
            assert_eq!(verdict.verdict, UNVERIFIED_VERDICT);
            assert!(verdict.sources.is_empty());
            assert_eq!(verdict.summary, UNVERIFIED_SUMMARY);
        }
    }

    #[test]
    fn summary_is_content_independent() {
        let long = "long article ".repeat(500);
        for text in ["", "short", long.as_str()] {
            let summary = summarize_news(text, None);
            assert!((MIN_BULLETS..=MAX_BULLETS).contains(&summary.bullet_points.len()));
            assert!(!summary.full_summary.is_empty());
            assert_eq!(summary.topic, DEFAULT_SUMMARY_TOPIC);
            assert!(NewsResult::Summary(summary).validate().is_ok());
        }
        assert_eq!(summarize_news("x", Some("Markets")).topic, "Markets");
    }

    #[test]
    fn full_summary_joins_bullets() {
        let summary = summarize_news("anything", None);
        assert_eq!(summary.full_summary, summary.bullet_points.join(" "));
    }

    #[test]
    fn providers_are_idempotent() {
        assert_eq!(trending_news(Some("ai"), None), trending_news(Some("ai"), None));
        assert_eq!(fact_check_claim("x"), fact_check_claim("x"));
        assert_eq!(summarize_news("a", None), summarize_news("a", None));
    }
}
