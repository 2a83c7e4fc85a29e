// Alert configuration types and validation.
//
// NOTE: TypeScript mirror types live in the portal frontend (AlertForm schema).
// Keep both in sync when modifying data structures.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::ValidationError;
use crate::core::model::{OrganizationType, TenderId, TenderPriority, TenderStatus};

lazy_static! {
    // Same patterns the portal form validates with.
    static ref SUMMARY_TIME_RE: Regex =
        Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// How a keyword term is compared against tender title/description.
///
/// Closed enum so gate dispatch is exhaustively checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Contains,
    StartsWith,
    EndsWith,
}

/// One keyword entry; entries are OR-combined during matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub term: String,
    pub match_type: MatchType,
}

impl Keyword {
    pub fn new(term: impl Into<String>, match_type: MatchType) -> Self {
        Self {
            term: term.into(),
            match_type,
        }
    }
}

/// Location filter; empty dimensions mean "any". Populated dimensions are
/// OR-combined: a tender passes if it matches any one of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationFilter {
    #[serde(default)]
    pub provinces: Vec<String>,
    #[serde(default)]
    pub districts: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
}

impl LocationFilter {
    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty() && self.districts.is_empty() && self.cities.is_empty()
    }
}

/// Currency label for the configured value range. Descriptive only; no
/// conversion is performed against tender amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    LKR,
    USD,
    EUR,
}

/// Inclusive estimated-value bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: Currency,
}

impl ValueRange {
    pub fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailFrequency {
    #[default]
    Immediate,
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSettings {
    pub enabled: bool,
    #[serde(default)]
    pub frequency: EmailFrequency,
    /// Overrides the account email when non-empty.
    #[serde(default)]
    pub custom_email: String,
    /// "HH:MM", 24-hour clock. Used by daily and weekly digests.
    #[serde(default = "default_summary_time")]
    pub daily_summary_time: String,
}

fn default_summary_time() -> String {
    "09:00".to_string()
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: EmailFrequency::Immediate,
            custom_email: String::new(),
            daily_summary_time: default_summary_time(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedFilters {
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_days_until_closing: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days_until_closing: Option<u32>,
    #[serde(default)]
    pub included_statuses: Vec<TenderStatus>,
    #[serde(default)]
    pub included_priorities: Vec<TenderPriority>,
}

/// Match/delivery counters, mutated only by `record_match` and the dispatch
/// process, never directly by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertStats {
    pub total_matches: u64,
    pub emails_sent: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_matched_tender: Option<TenderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_matched_at: Option<DateTime<Utc>>,
}

/// A named, user-owned rule set evaluated against incoming tenders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfiguration {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inactive configurations are never evaluated (caller contract; see
    /// `AlertStore::active_configs`). Toggled only by explicit user action.
    pub is_active: bool,
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub locations: LocationFilter,
    #[serde(default)]
    pub organization_types: Vec<OrganizationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<ValueRange>,
    #[serde(default)]
    pub email_settings: EmailSettings,
    #[serde(default)]
    pub advanced_filters: AdvancedFilters,
    #[serde(default)]
    pub stats: AlertStats,
}

impl AlertConfiguration {
    /// New configuration with the given name and keywords, active at creation,
    /// everything else wide open. The id is assigned by the store.
    pub fn new(name: impl Into<String>, keywords: Vec<Keyword>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: None,
            is_active: true,
            keywords,
            categories: Vec::new(),
            locations: LocationFilter::default(),
            organization_types: Vec::new(),
            estimated_value: None,
            email_settings: EmailSettings::default(),
            advanced_filters: AdvancedFilters::default(),
            stats: AlertStats::default(),
        }
    }

    /// Check every invariant the portal form enforces.
    ///
    /// Runs at creation and update time; the engine assumes it only ever sees
    /// configurations that passed this.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.name.chars().count() > 100 {
            return Err(ValidationError::NameTooLong);
        }
        if let Some(description) = &self.description {
            if description.chars().count() > 500 {
                return Err(ValidationError::DescriptionTooLong);
            }
        }

        if self.keywords.is_empty() {
            return Err(ValidationError::NoKeywords);
        }
        if self.keywords.len() > 20 {
            return Err(ValidationError::TooManyKeywords);
        }
        for keyword in &self.keywords {
            if keyword.term.trim().is_empty() {
                return Err(ValidationError::EmptyKeywordTerm);
            }
            if keyword.term.chars().count() > 50 {
                return Err(ValidationError::KeywordTooLong(keyword.term.clone()));
            }
        }

        if self.categories.len() > 10 {
            return Err(ValidationError::TooManyCategories);
        }

        if let Some(range) = &self.estimated_value {
            if range.min.is_some_and(|v| v < 0.0) || range.max.is_some_and(|v| v < 0.0) {
                return Err(ValidationError::NegativeValueBound);
            }
            if let (Some(min), Some(max)) = (range.min, range.max) {
                if min > max {
                    return Err(ValidationError::ValueRangeInverted);
                }
            }
        }

        let filters = &self.advanced_filters;
        if filters.exclude_keywords.len() > 10 {
            return Err(ValidationError::TooManyExcludeKeywords);
        }
        for term in &filters.exclude_keywords {
            if term.chars().count() > 50 {
                return Err(ValidationError::ExcludeKeywordTooLong(term.clone()));
            }
        }
        for days in [filters.min_days_until_closing, filters.max_days_until_closing]
            .into_iter()
            .flatten()
        {
            if days > 365 {
                return Err(ValidationError::DaysOutOfRange);
            }
        }
        if let (Some(min), Some(max)) =
            (filters.min_days_until_closing, filters.max_days_until_closing)
        {
            if min > max {
                return Err(ValidationError::DaysRangeInverted);
            }
        }

        let email = &self.email_settings;
        if !email.custom_email.is_empty() && !EMAIL_RE.is_match(&email.custom_email) {
            return Err(ValidationError::InvalidEmail(email.custom_email.clone()));
        }
        if !SUMMARY_TIME_RE.is_match(&email.daily_summary_time) {
            return Err(ValidationError::InvalidSummaryTime(
                email.daily_summary_time.clone(),
            ));
        }

        Ok(())
    }
}
