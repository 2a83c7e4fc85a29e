//! Persistent storage for alert configurations.
//!
//! Stores each configuration as a JSON document in the data directory, with a
//! write-through in-memory cache. Operations mirror the portal's alert
//! service: create, list, get, update, delete, toggle, plus the stats
//! summary backing the dashboard.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::alerts::engine;
use super::alerts::model::AlertConfiguration;
use super::error::{AlertError, Result};
use super::model::{Tender, TenderId};

/// Aggregate numbers for the alert stats dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertStatsSummary {
    pub total_alerts: usize,
    pub active_alerts: usize,
    pub total_matches: u64,
    pub emails_sent: u64,
    /// Most recently matched configurations, newest first, capped at 10.
    pub recent_matches: Vec<RecentMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentMatch {
    pub alert_id: String,
    pub alert_name: String,
    pub last_matched_tender: TenderId,
    pub last_matched_at: DateTime<Utc>,
    pub total_matches: u64,
}

/// Manages alert configuration documents for one account.
pub struct AlertStore {
    /// Directory holding one `alert_<id>.json` per configuration
    data_dir: PathBuf,
    /// Cached configurations by id
    cache: HashMap<String, AlertConfiguration>,
}

impl AlertStore {
    /// Create a store over `data_dir` and load any existing documents.
    ///
    /// Unreadable documents are skipped with a warning rather than taking the
    /// whole store down.
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        let mut store = Self {
            data_dir,
            cache: HashMap::new(),
        };
        store.load_all()?;
        Ok(store)
    }

    fn alert_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("alert_{id}.json"))
    }

    fn load_all(&mut self) -> Result<()> {
        if !self.data_dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let filename = entry.file_name();
            let filename = filename.to_string_lossy();

            if filename.starts_with("alert_") && filename.ends_with(".json") {
                match read_config(&entry.path()) {
                    Ok(config) => {
                        self.cache.insert(config.id.clone(), config);
                    }
                    Err(e) => {
                        log::warn!("Skipping unreadable alert document {filename}: {e}");
                    }
                }
            }
        }
        Ok(())
    }

    fn save(&self, config: &AlertConfiguration) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(self.alert_path(&config.id), content)?;
        Ok(())
    }

    /// Validate and persist a new configuration, assigning its id.
    /// New configurations start active with zeroed stats.
    pub fn create(&mut self, mut config: AlertConfiguration) -> Result<AlertConfiguration> {
        config.validate()?;
        config.id = Uuid::new_v4().to_string();
        config.is_active = true;
        config.stats = Default::default();

        self.save(&config)?;
        self.cache.insert(config.id.clone(), config.clone());
        Ok(config)
    }

    /// All configurations, unordered.
    pub fn list(&self) -> Vec<&AlertConfiguration> {
        self.cache.values().collect()
    }

    /// Only active configurations. This is the filter the batch scheduler
    /// must apply before calling the engine; inactive configurations are
    /// never evaluated.
    pub fn active_configs(&self) -> Vec<&AlertConfiguration> {
        self.cache.values().filter(|c| c.is_active).collect()
    }

    pub fn get(&self, id: &str) -> Result<&AlertConfiguration> {
        self.cache
            .get(id)
            .ok_or_else(|| AlertError::NotFound(id.to_string()))
    }

    /// Re-validate and persist an edited configuration.
    ///
    /// Stats and active state are carried over from the stored document; the
    /// user edits rules, not counters.
    pub fn update(&mut self, mut config: AlertConfiguration) -> Result<AlertConfiguration> {
        config.validate()?;
        let existing = self
            .cache
            .get(&config.id)
            .ok_or_else(|| AlertError::NotFound(config.id.clone()))?;
        config.stats = existing.stats.clone();
        config.is_active = existing.is_active;

        self.save(&config)?;
        self.cache.insert(config.id.clone(), config.clone());
        Ok(config)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        if self.cache.remove(id).is_none() {
            return Err(AlertError::NotFound(id.to_string()));
        }
        let path = self.alert_path(id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Flip the active state. The only way a configuration changes state;
    /// there is no automatic deactivation.
    pub fn toggle(&mut self, id: &str) -> Result<AlertConfiguration> {
        let config = self
            .cache
            .get_mut(id)
            .ok_or_else(|| AlertError::NotFound(id.to_string()))?;
        config.is_active = !config.is_active;
        let updated = config.clone();
        self.save(&updated)?;
        Ok(updated)
    }

    /// Apply `engine::record_match` and persist the result in one step, so a
    /// crash between increment and write cannot lose more than one event.
    pub fn record_match(
        &mut self,
        id: &str,
        tender: &Tender,
        email_sent: bool,
    ) -> Result<AlertConfiguration> {
        let config = self.get(id)?;
        let updated = engine::record_match(config, tender, email_sent);
        self.save(&updated)?;
        self.cache.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    /// Aggregate stats across all configurations for the dashboard view.
    pub fn stats_summary(&self) -> AlertStatsSummary {
        let mut recent: Vec<RecentMatch> = self
            .cache
            .values()
            .filter_map(|config| {
                let tender = config.stats.last_matched_tender.clone()?;
                let at = config.stats.last_matched_at?;
                Some(RecentMatch {
                    alert_id: config.id.clone(),
                    alert_name: config.name.clone(),
                    last_matched_tender: tender,
                    last_matched_at: at,
                    total_matches: config.stats.total_matches,
                })
            })
            .collect();
        recent.sort_by(|a, b| b.last_matched_at.cmp(&a.last_matched_at));
        recent.truncate(10);

        AlertStatsSummary {
            total_alerts: self.cache.len(),
            active_alerts: self.cache.values().filter(|c| c.is_active).count(),
            total_matches: self.cache.values().map(|c| c.stats.total_matches).sum(),
            emails_sent: self.cache.values().map(|c| c.stats.emails_sent).sum(),
            recent_matches: recent,
        }
    }
}

fn read_config(path: &Path) -> Result<AlertConfiguration> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
