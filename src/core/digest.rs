// Notification dispatch - batches confirmed matches into outbound emails.
//
// Pure scheduling and bookkeeping; actually delivering mail belongs to the
// surrounding service. Immediate-frequency matches produce one email each at
// enqueue time; daily and weekly matches buffer per configuration until the
// digest falls due. Times are UTC; account-local timezones are resolved by
// the web layer before configurations reach this crate.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};

use super::alerts::model::{AlertConfiguration, EmailFrequency};
use super::model::{Tender, TenderId};

/// One email ready for the mail sender.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub config_id: String,
    pub config_name: String,
    pub recipient: String,
    pub frequency: EmailFrequency,
    pub entries: Vec<DigestEntry>,
    pub scheduled_for: DateTime<Utc>,
}

impl OutboundEmail {
    /// Subject line for the email template.
    pub fn subject(&self) -> String {
        match self.frequency {
            EmailFrequency::Immediate => {
                format!("New tender matches your alert \"{}\"", self.config_name)
            }
            EmailFrequency::Daily | EmailFrequency::Weekly => format!(
                "{} tender(s) match your alert \"{}\"",
                self.entries.len(),
                self.config_name
            ),
        }
    }
}

/// One matched tender inside a digest.
#[derive(Debug, Clone)]
pub struct DigestEntry {
    pub tender_id: TenderId,
    pub title: String,
}

struct PendingDigest {
    due_at: DateTime<Utc>,
    recipient: String,
    frequency: EmailFrequency,
    config_name: String,
    entries: Vec<DigestEntry>,
}

/// Batches matches per configuration and tracks what has already been sent,
/// so a (configuration, tender) pair is emailed at most once.
pub struct MatchDispatcher {
    /// Account email used when a configuration has no custom address
    fallback_email: String,
    /// Open digests by configuration id
    pending: HashMap<String, PendingDigest>,
    /// (configuration id, tender id) pairs already queued or sent
    delivered: HashSet<(String, TenderId)>,
}

impl MatchDispatcher {
    pub fn new(fallback_email: impl Into<String>) -> Self {
        Self {
            fallback_email: fallback_email.into(),
            pending: HashMap::new(),
            delivered: HashSet::new(),
        }
    }

    /// Queue a confirmed match for notification.
    ///
    /// Returns the email right away for immediate frequency, buffers it for
    /// daily/weekly, and returns None when email is disabled or the pair was
    /// already handled.
    pub fn enqueue(
        &mut self,
        config: &AlertConfiguration,
        tender: &Tender,
        now: DateTime<Utc>,
    ) -> Option<OutboundEmail> {
        if !config.email_settings.enabled {
            return None;
        }

        let key = (config.id.clone(), tender.id.clone());
        if self.delivered.contains(&key) {
            return None;
        }
        self.delivered.insert(key);

        let entry = DigestEntry {
            tender_id: tender.id.clone(),
            title: tender.title.clone(),
        };

        match config.email_settings.frequency {
            EmailFrequency::Immediate => Some(OutboundEmail {
                config_id: config.id.clone(),
                config_name: config.name.clone(),
                recipient: self.recipient_for(config),
                frequency: EmailFrequency::Immediate,
                entries: vec![entry],
                scheduled_for: now,
            }),
            frequency @ (EmailFrequency::Daily | EmailFrequency::Weekly) => {
                let recipient = self.recipient_for(config);
                let digest = self
                    .pending
                    .entry(config.id.clone())
                    .or_insert_with(|| PendingDigest {
                        due_at: next_digest_time(config, now),
                        recipient,
                        frequency,
                        config_name: config.name.clone(),
                        entries: Vec::new(),
                    });
                digest.entries.push(entry);
                None
            }
        }
    }

    /// Drain every digest whose scheduled time has passed.
    pub fn flush_due(&mut self, now: DateTime<Utc>) -> Vec<OutboundEmail> {
        let due_ids: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, digest)| digest.due_at <= now)
            .map(|(id, _)| id.clone())
            .collect();

        let mut emails = Vec::new();
        for id in due_ids {
            if let Some(digest) = self.pending.remove(&id) {
                emails.push(OutboundEmail {
                    config_id: id,
                    config_name: digest.config_name,
                    recipient: digest.recipient,
                    frequency: digest.frequency,
                    entries: digest.entries,
                    scheduled_for: digest.due_at,
                });
            }
        }
        emails.sort_by_key(|e| e.scheduled_for);
        emails
    }

    /// Number of digests still waiting for their summary time.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn recipient_for(&self, config: &AlertConfiguration) -> String {
        if config.email_settings.custom_email.is_empty() {
            self.fallback_email.clone()
        } else {
            config.email_settings.custom_email.clone()
        }
    }
}

/// When the next digest for this configuration goes out.
///
/// Daily: the next occurrence of the configured summary time. Weekly: the
/// next Monday at that time. Immediate never schedules.
fn next_digest_time(config: &AlertConfiguration, now: DateTime<Utc>) -> DateTime<Utc> {
    let time = summary_time(config);
    let mut due = next_occurrence(now, time);
    if config.email_settings.frequency == EmailFrequency::Weekly {
        while due.weekday() != Weekday::Mon {
            due += Duration::days(1);
        }
    }
    due
}

fn summary_time(config: &AlertConfiguration) -> NaiveTime {
    // Validated at construction time; fall back to the form default anyway.
    NaiveTime::parse_from_str(&config.email_settings.daily_summary_time, "%H:%M")
        .unwrap_or_else(|_| NaiveTime::from_hms_opt(9, 0, 0).unwrap())
}

fn next_occurrence(now: DateTime<Utc>, time: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(time).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alerts::model::{Keyword, MatchType};
    use crate::core::model::{
        Organization, OrganizationType, TenderDates, TenderLocation, TenderPriority, TenderStatus,
    };
    use chrono::TimeZone;

    fn make_tender(id: &str, title: &str) -> Tender {
        let now = Utc::now();
        Tender {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            category: "Construction".to_string(),
            organization: Organization {
                name: "RDA".to_string(),
                org_type: OrganizationType::Government,
            },
            location: TenderLocation {
                province: "Western".to_string(),
                district: "Colombo".to_string(),
                city: None,
            },
            dates: TenderDates {
                published: now,
                closing: now + Duration::days(14),
            },
            financials: None,
            status: TenderStatus::Published,
            priority: TenderPriority::Medium,
        }
    }

    fn make_config(id: &str, frequency: EmailFrequency) -> AlertConfiguration {
        let mut config = AlertConfiguration::new(
            "Road works",
            vec![Keyword::new("road", MatchType::Contains)],
        );
        config.id = id.to_string();
        config.email_settings.frequency = frequency;
        config
    }

    // Wednesday 2025-06-04 08:00 UTC
    fn wednesday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 4, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_immediate_sends_per_match() {
        let mut dispatcher = MatchDispatcher::new("user@example.com");
        let config = make_config("a", EmailFrequency::Immediate);
        let now = wednesday_morning();

        let email = dispatcher.enqueue(&config, &make_tender("t1", "Road works"), now);
        let email = email.expect("immediate match should email at once");
        assert_eq!(email.recipient, "user@example.com");
        assert_eq!(email.entries.len(), 1);
        assert_eq!(dispatcher.pending_count(), 0);
    }

    #[test]
    fn test_custom_email_overrides_fallback() {
        let mut dispatcher = MatchDispatcher::new("user@example.com");
        let mut config = make_config("a", EmailFrequency::Immediate);
        config.email_settings.custom_email = "alerts@example.com".to_string();

        let email = dispatcher
            .enqueue(&config, &make_tender("t1", "Road works"), wednesday_morning())
            .unwrap();
        assert_eq!(email.recipient, "alerts@example.com");
    }

    #[test]
    fn test_disabled_email_suppresses_everything() {
        let mut dispatcher = MatchDispatcher::new("user@example.com");
        let mut config = make_config("a", EmailFrequency::Immediate);
        config.email_settings.enabled = false;

        let email = dispatcher.enqueue(&config, &make_tender("t1", "Road works"), wednesday_morning());
        assert!(email.is_none());
        assert!(dispatcher.flush_due(wednesday_morning() + Duration::days(30)).is_empty());
    }

    #[test]
    fn test_daily_digest_batches_until_summary_time() {
        let mut dispatcher = MatchDispatcher::new("user@example.com");
        let mut config = make_config("a", EmailFrequency::Daily);
        config.email_settings.daily_summary_time = "09:00".to_string();
        let now = wednesday_morning(); // 08:00

        assert!(dispatcher.enqueue(&config, &make_tender("t1", "Road works"), now).is_none());
        assert!(dispatcher.enqueue(&config, &make_tender("t2", "More road works"), now).is_none());
        assert_eq!(dispatcher.pending_count(), 1);

        // Not due yet at 08:30
        assert!(dispatcher.flush_due(now + Duration::minutes(30)).is_empty());

        // Due at 09:00
        let emails = dispatcher.flush_due(now + Duration::hours(1));
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].entries.len(), 2);
        assert_eq!(emails[0].frequency, EmailFrequency::Daily);
        assert_eq!(dispatcher.pending_count(), 0);
    }

    #[test]
    fn test_daily_digest_rolls_past_summary_time_to_tomorrow() {
        let mut dispatcher = MatchDispatcher::new("user@example.com");
        let mut config = make_config("a", EmailFrequency::Daily);
        config.email_settings.daily_summary_time = "07:00".to_string();
        let now = wednesday_morning(); // 08:00, summary time already past

        dispatcher.enqueue(&config, &make_tender("t1", "Road works"), now);

        // Later today: nothing
        assert!(dispatcher.flush_due(now + Duration::hours(10)).is_empty());
        // Tomorrow 07:00: due
        let emails = dispatcher.flush_due(now + Duration::hours(23));
        assert_eq!(emails.len(), 1);
    }

    #[test]
    fn test_weekly_digest_due_next_monday() {
        let mut dispatcher = MatchDispatcher::new("user@example.com");
        let mut config = make_config("a", EmailFrequency::Weekly);
        config.email_settings.daily_summary_time = "09:00".to_string();
        let now = wednesday_morning();

        dispatcher.enqueue(&config, &make_tender("t1", "Road works"), now);

        // Sunday: not yet
        assert!(dispatcher.flush_due(now + Duration::days(4)).is_empty());
        // Monday 2025-06-09 09:00
        let monday = Utc.with_ymd_and_hms(2025, 6, 9, 9, 0, 0).unwrap();
        let emails = dispatcher.flush_due(monday);
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].scheduled_for, monday);
    }

    #[test]
    fn test_pair_emailed_at_most_once() {
        let mut dispatcher = MatchDispatcher::new("user@example.com");
        let config = make_config("a", EmailFrequency::Immediate);
        let tender = make_tender("t1", "Road works");
        let now = wednesday_morning();

        assert!(dispatcher.enqueue(&config, &tender, now).is_some());
        assert!(dispatcher.enqueue(&config, &tender, now).is_none());

        // A different tender for the same config still goes out
        assert!(dispatcher
            .enqueue(&config, &make_tender("t2", "Other road works"), now)
            .is_some());
    }

    #[test]
    fn test_digest_subject_counts_entries() {
        let mut dispatcher = MatchDispatcher::new("user@example.com");
        let config = make_config("a", EmailFrequency::Daily);
        let now = wednesday_morning();

        dispatcher.enqueue(&config, &make_tender("t1", "Road works"), now);
        dispatcher.enqueue(&config, &make_tender("t2", "More road works"), now);

        let emails = dispatcher.flush_due(now + Duration::days(1));
        assert_eq!(emails.len(), 1);
        assert!(emails[0].subject().contains("2 tender(s)"));
    }
}
