//! User settings for capex-ledger
//!
//! Manages preferences for breakdown generation, the HTTP server, sessions,
//! inactive-user cleanup and role-based access control.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::models::AccessPolicy;
use crate::reports::MonthEnumeration;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address the REST server binds to
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Login session lifetimes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Session lifetime for non-admin users, in minutes
    pub user_ttl_minutes: i64,
    /// Session lifetime for admins, in minutes
    pub admin_ttl_minutes: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            user_ttl_minutes: 60,
            admin_ttl_minutes: 24 * 60,
        }
    }
}

/// Thresholds for the inactive-user cleanup job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InactivityThresholds {
    /// Months without activity before an account is deactivated
    pub deactivate_after_months: u32,
    /// Months without activity before an account is archived
    pub archive_after_months: u32,
}

impl Default for InactivityThresholds {
    fn default() -> Self {
        Self {
            deactivate_after_months: 6,
            archive_after_months: 12,
        }
    }
}

/// Which user types may perform each class of operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessControl {
    #[serde(default = "default_write_policy")]
    pub projects: AccessPolicy,
    #[serde(default = "default_write_policy")]
    pub capex: AccessPolicy,
    #[serde(default = "default_write_policy")]
    pub suppliers: AccessPolicy,
    /// Managing other users' accounts
    #[serde(default = "default_admin_policy")]
    pub users: AccessPolicy,
    /// Reading the activity log
    #[serde(default = "default_read_policy")]
    pub audit: AccessPolicy,
}

fn default_write_policy() -> AccessPolicy {
    AccessPolicy::AdminUser
}

fn default_admin_policy() -> AccessPolicy {
    AccessPolicy::OnlyAdmin
}

fn default_read_policy() -> AccessPolicy {
    AccessPolicy::AllTypes
}

impl Default for AccessControl {
    fn default() -> Self {
        Self {
            projects: default_write_policy(),
            capex: default_write_policy(),
            suppliers: default_write_policy(),
            users: default_admin_policy(),
            audit: default_read_policy(),
        }
    }
}

/// User settings for capex-ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// How breakdown rows are enumerated for a project's date range
    #[serde(default)]
    pub month_enumeration: MonthEnumeration,

    /// Page size used when a request doesn't specify one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Maximum number of hits returned by text search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub sessions: SessionSettings,

    #[serde(default)]
    pub inactivity: InactivityThresholds,

    #[serde(default)]
    pub access_control: AccessControl,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_search_limit() -> usize {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            month_enumeration: MonthEnumeration::default(),
            default_page_size: default_page_size(),
            search_limit: default_search_limit(),
            server: ServerSettings::default(),
            sessions: SessionSettings::default(),
            inactivity: InactivityThresholds::default(),
            access_control: AccessControl::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.month_enumeration, MonthEnumeration::StartYear);
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.search_limit, 20);
        assert_eq!(settings.server.bind_address, "127.0.0.1:5000");
        assert_eq!(settings.sessions.user_ttl_minutes, 60);
        assert_eq!(settings.inactivity.deactivate_after_months, 6);
        assert_eq!(settings.access_control.users, AccessPolicy::OnlyAdmin);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.month_enumeration = MonthEnumeration::FullRange;
        settings.currency_symbol = "€".to_string();
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.month_enumeration, MonthEnumeration::FullRange);
        assert_eq!(loaded.currency_symbol, "€");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), r#"{"search_limit": 5}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.search_limit, 5);
        assert_eq!(loaded.default_page_size, 10);
        assert_eq!(loaded.access_control.projects, AccessPolicy::AdminUser);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), "not json").unwrap();

        let result = Settings::load_or_create(&paths);
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }
}
