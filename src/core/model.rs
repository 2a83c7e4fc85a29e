// Tender record types as served by the portal API.
//
// The alert engine only ever reads these; nothing in this crate mutates a
// tender. Wire shape is camelCase JSON to match the portal backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TenderId = String;

/// Lifecycle status of a tender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenderStatus {
    Draft,
    Published,
    Closed,
    Awarded,
    Cancelled,
}

/// Priority assigned by the publishing organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenderPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Kind of organization publishing the tender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganizationType {
    #[serde(rename = "government")]
    Government,
    #[serde(rename = "private")]
    Private,
    #[serde(rename = "semi-government")]
    SemiGovernment,
    #[serde(rename = "ngo")]
    Ngo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    #[serde(rename = "type")]
    pub org_type: OrganizationType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderLocation {
    pub province: String,
    pub district: String,
    /// Not every tender lists a city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderDates {
    pub published: DateTime<Utc>,
    pub closing: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatedValue {
    pub amount: f64,
    /// Descriptive only; the matcher performs no currency conversion.
    pub currency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<EstimatedValue>,
}

/// A procurement opportunity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: TenderId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub organization: Organization,
    pub location: TenderLocation,
    pub dates: TenderDates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financials: Option<Financials>,
    pub status: TenderStatus,
    pub priority: TenderPriority,
}

impl Tender {
    /// Estimated value amount, when the tender carries one.
    pub fn estimated_amount(&self) -> Option<f64> {
        self.financials
            .as_ref()
            .and_then(|f| f.estimated_value.as_ref())
            .map(|v| v.amount)
    }

    /// Complete 24-hour periods between `now` and the closing date.
    ///
    /// Negative once the closing date has passed. Floor semantics: a tender
    /// closing in 2 days 23 hours has 2 days until closing, one closing in
    /// exactly 72 hours has 3.
    pub fn days_until_closing(&self, now: DateTime<Utc>) -> i64 {
        let secs = (self.dates.closing - now).num_seconds();
        secs.div_euclid(86_400)
    }
}
