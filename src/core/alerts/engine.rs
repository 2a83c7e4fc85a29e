// Alert rule engine - evaluates tenders against alert configurations.
//
// Pure and synchronous: no I/O, no shared state. The only mutation in this
// module is `record_match`, which returns an updated copy rather than writing
// in place so concurrent batch passes cannot race on the stats counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::gates::{matching_keywords, passes_gate, Gate};
use super::model::AlertConfiguration;
use crate::core::model::Tender;

/// Verdict for one (configuration, tender) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub matched: bool,
    /// Every keyword term that contributed to a true verdict, in
    /// configuration order. Empty when not matched.
    pub matched_keywords: Vec<String>,
}

impl MatchResult {
    fn no_match() -> Self {
        Self::default()
    }
}

/// Result of replaying a configuration against a tender corpus ("Test Alert").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusTestResult {
    pub matching_tenders: Vec<Tender>,
    pub match_count: usize,
    pub total_tested: usize,
}

/// Evaluate one tender against one configuration at the current time.
///
/// Callers must filter out inactive configurations before invoking; the
/// engine assumes `config.is_active` and a configuration that passed
/// validation.
pub fn evaluate(config: &AlertConfiguration, tender: &Tender) -> MatchResult {
    evaluate_at(config, tender, Utc::now())
}

/// Evaluate with an explicit `now`, for deterministic batch passes and tests.
///
/// Ordered short-circuit AND over the gates, then the keyword OR.
pub fn evaluate_at(
    config: &AlertConfiguration,
    tender: &Tender,
    now: DateTime<Utc>,
) -> MatchResult {
    for gate in Gate::all() {
        if !passes_gate(*gate, config, tender, now) {
            return MatchResult::no_match();
        }
    }

    let matched_keywords = matching_keywords(&config.keywords, tender);
    if matched_keywords.is_empty() {
        return MatchResult::no_match();
    }

    MatchResult {
        matched: true,
        matched_keywords,
    }
}

/// Replay a configuration against up to `limit` tenders.
///
/// The caller supplies the ordering (most recent first in the portal).
/// Read-only: never touches `stats`, bounded by `limit` so the interactive
/// test action cannot run unbounded.
pub fn test_against_corpus(
    config: &AlertConfiguration,
    tenders: &[Tender],
    limit: usize,
) -> CorpusTestResult {
    test_against_corpus_at(config, tenders, limit, Utc::now())
}

pub fn test_against_corpus_at(
    config: &AlertConfiguration,
    tenders: &[Tender],
    limit: usize,
    now: DateTime<Utc>,
) -> CorpusTestResult {
    let tested = &tenders[..tenders.len().min(limit)];
    let matching_tenders: Vec<Tender> = tested
        .iter()
        .filter(|tender| evaluate_at(config, tender, now).matched)
        .cloned()
        .collect();

    CorpusTestResult {
        match_count: matching_tenders.len(),
        total_tested: tested.len(),
        matching_tenders,
    }
}

/// Record a confirmed match-and-notify event against the configuration stats.
///
/// Returns an updated copy; persisting it is the store's job. Delivery
/// deduplication per (configuration, tender) lives in the dispatcher.
pub fn record_match(
    config: &AlertConfiguration,
    tender: &Tender,
    email_sent: bool,
) -> AlertConfiguration {
    record_match_at(config, tender, email_sent, Utc::now())
}

pub fn record_match_at(
    config: &AlertConfiguration,
    tender: &Tender,
    email_sent: bool,
    now: DateTime<Utc>,
) -> AlertConfiguration {
    let mut updated = config.clone();
    updated.stats.total_matches += 1;
    if email_sent {
        updated.stats.emails_sent += 1;
    }
    updated.stats.last_matched_tender = Some(tender.id.clone());
    updated.stats.last_matched_at = Some(now);
    updated
}
