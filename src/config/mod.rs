use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    core::utils::{ensure_dir, PathResolver},
    domain::SubscriptionType,
    errors::StoreError,
};

const TMP_SUFFIX: &str = "tmp";

/// What happens to a member's payments and check-ins when the member is deleted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Keep history records; they become orphans.
    #[default]
    Retain,
    /// Delete the member's payments and check-ins too.
    Cascade,
    /// Refuse to delete a member that still has history.
    Restrict,
}

/// Default fee charged per subscription period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionFees {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

impl SubscriptionFees {
    pub fn for_type(&self, kind: SubscriptionType) -> f64 {
        match kind {
            SubscriptionType::Daily => self.daily,
            SubscriptionType::Weekly => self.weekly,
            SubscriptionType::Monthly => self.monthly,
        }
    }
}

impl Default for SubscriptionFees {
    fn default() -> Self {
        Self {
            daily: 10.0,
            weekly: 25.0,
            monthly: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GymConfig {
    pub gym_name: String,
    pub currency: String,
    #[serde(default)]
    pub default_fees: SubscriptionFees,
    /// Active members ending within this many days are flagged for renewal.
    #[serde(default = "GymConfig::default_renewal_alert_days")]
    pub renewal_alert_days: u32,
    #[serde(default = "GymConfig::default_history_limit")]
    pub check_in_history_limit: usize,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

impl GymConfig {
    fn default_renewal_alert_days() -> u32 {
        7
    }

    fn default_history_limit() -> usize {
        5
    }
}

impl Default for GymConfig {
    fn default() -> Self {
        Self {
            gym_name: "FitFlow Gym".into(),
            currency: "USD".into(),
            default_fees: SubscriptionFees::default(),
            renewal_alert_days: Self::default_renewal_alert_days(),
            check_in_history_limit: Self::default_history_limit(),
            delete_policy: DeletePolicy::default(),
        }
    }
}

/// Loads and saves [`GymConfig`] as JSON under the application data directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, StoreError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, StoreError> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    pub fn load(&self) -> Result<GymConfig, StoreError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            debug!(path = %self.path.display(), "config file missing, using defaults");
            Ok(GymConfig::default())
        }
    }

    pub fn save(&self, config: &GymConfig) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, GymConfig::default());
        assert_eq!(config.default_fees.for_type(SubscriptionType::Weekly), 25.0);
    }

    #[test]
    fn save_then_load_returns_same_config() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = GymConfig {
            gym_name: "Iron Temple".into(),
            renewal_alert_days: 3,
            delete_policy: DeletePolicy::Cascade,
            ..GymConfig::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(manager.path().ends_with("config/config.json"));
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(
            manager.path(),
            r#"{ "gym_name": "Small Gym", "currency": "EUR" }"#,
        )
        .unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.gym_name, "Small Gym");
        assert_eq!(config.renewal_alert_days, 7);
        assert_eq!(config.delete_policy, DeletePolicy::Retain);
    }
}
