// Gate evaluation logic for the matching pipeline.
//
// Each gate inspects one facet of a tender against the configuration and
// passes or rejects it. Gates run in a fixed order and short-circuit; the
// keyword OR runs last and is the only gate that produces match detail.
//
// A tender missing a field required by an active gate rejects; it never
// errors.

use chrono::{DateTime, Utc};

use super::model::{AlertConfiguration, Keyword, MatchType};
use crate::core::model::Tender;

/// One filter stage of the matching pipeline, in evaluation order.
/// The keyword OR is handled separately by `matching_keywords`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Status,
    Priority,
    Category,
    OrganizationType,
    Location,
    ValueRange,
    ClosingWindow,
    ExcludeKeywords,
}

impl Gate {
    /// All gates in pipeline order.
    pub fn all() -> &'static [Gate] {
        &[
            Self::Status,
            Self::Priority,
            Self::Category,
            Self::OrganizationType,
            Self::Location,
            Self::ValueRange,
            Self::ClosingWindow,
            Self::ExcludeKeywords,
        ]
    }
}

/// Evaluate a single gate. Returns true when the tender passes.
pub fn passes_gate(
    gate: Gate,
    config: &AlertConfiguration,
    tender: &Tender,
    now: DateTime<Utc>,
) -> bool {
    match gate {
        Gate::Status => passes_status(config, tender),
        Gate::Priority => passes_priority(config, tender),
        Gate::Category => passes_category(config, tender),
        Gate::OrganizationType => passes_organization_type(config, tender),
        Gate::Location => passes_location(config, tender),
        Gate::ValueRange => passes_value_range(config, tender),
        Gate::ClosingWindow => passes_closing_window(config, tender, now),
        Gate::ExcludeKeywords => passes_exclude_keywords(config, tender),
    }
}

/// Empty filter means any status; otherwise the tender status must be listed.
fn passes_status(config: &AlertConfiguration, tender: &Tender) -> bool {
    let statuses = &config.advanced_filters.included_statuses;
    statuses.is_empty() || statuses.contains(&tender.status)
}

fn passes_priority(config: &AlertConfiguration, tender: &Tender) -> bool {
    let priorities = &config.advanced_filters.included_priorities;
    priorities.is_empty() || priorities.contains(&tender.priority)
}

/// Case-insensitive exact match against any configured category.
fn passes_category(config: &AlertConfiguration, tender: &Tender) -> bool {
    config.categories.is_empty()
        || config
            .categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&tender.category))
}

fn passes_organization_type(config: &AlertConfiguration, tender: &Tender) -> bool {
    config.organization_types.is_empty()
        || config
            .organization_types
            .contains(&tender.organization.org_type)
}

/// Populated dimensions are OR-combined: matching any one of them passes.
/// A tender without a city cannot satisfy the city dimension.
fn passes_location(config: &AlertConfiguration, tender: &Tender) -> bool {
    let filter = &config.locations;
    if filter.is_empty() {
        return true;
    }

    let province_hit = !filter.provinces.is_empty()
        && filter
            .provinces
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&tender.location.province));
    let district_hit = !filter.districts.is_empty()
        && filter
            .districts
            .iter()
            .any(|d| d.eq_ignore_ascii_case(&tender.location.district));
    let city_hit = !filter.cities.is_empty()
        && tender
            .location
            .city
            .as_ref()
            .is_some_and(|city| filter.cities.iter().any(|c| c.eq_ignore_ascii_case(city)));

    province_hit || district_hit || city_hit
}

/// Inclusive bounds. A tender without an estimated amount rejects as soon as
/// either bound is configured. Currency is descriptive only.
fn passes_value_range(config: &AlertConfiguration, tender: &Tender) -> bool {
    let Some(range) = &config.estimated_value else {
        return true;
    };
    if !range.is_bounded() {
        return true;
    }
    let Some(amount) = tender.estimated_amount() else {
        return false;
    };
    if range.min.is_some_and(|min| amount < min) {
        return false;
    }
    if range.max.is_some_and(|max| amount > max) {
        return false;
    }
    true
}

/// Complete days until closing must lie within the configured window.
fn passes_closing_window(config: &AlertConfiguration, tender: &Tender, now: DateTime<Utc>) -> bool {
    let filters = &config.advanced_filters;
    if filters.min_days_until_closing.is_none() && filters.max_days_until_closing.is_none() {
        return true;
    }
    let days = tender.days_until_closing(now);
    if filters
        .min_days_until_closing
        .is_some_and(|min| days < i64::from(min))
    {
        return false;
    }
    if filters
        .max_days_until_closing
        .is_some_and(|max| days > i64::from(max))
    {
        return false;
    }
    true
}

/// Any exclude term appearing as a case-insensitive substring of title or
/// description rejects immediately. Blank terms are ignored.
fn passes_exclude_keywords(config: &AlertConfiguration, tender: &Tender) -> bool {
    let title = tender.title.to_lowercase();
    let description = tender.description.to_lowercase();

    !config
        .advanced_filters
        .exclude_keywords
        .iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .any(|term| title.contains(&term) || description.contains(&term))
}

/// Keyword OR: every keyword whose term matches title or description under its
/// match type, in configuration order. The tender matches if this is
/// non-empty.
pub fn matching_keywords(keywords: &[Keyword], tender: &Tender) -> Vec<String> {
    let title = tender.title.to_lowercase();
    let description = tender.description.to_lowercase();

    keywords
        .iter()
        .filter(|kw| {
            let term = kw.term.to_lowercase();
            term_matches(kw.match_type, &term, &title) || term_matches(kw.match_type, &term, &description)
        })
        .map(|kw| kw.term.clone())
        .collect()
}

fn term_matches(match_type: MatchType, term: &str, text: &str) -> bool {
    match match_type {
        MatchType::Exact => text == term,
        MatchType::Contains => text.contains(term),
        MatchType::StartsWith => text.starts_with(term),
        MatchType::EndsWith => text.ends_with(term),
    }
}
