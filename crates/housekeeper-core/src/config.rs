use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::content::Selection;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Housekeeping tasks, run in file order
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            scheduler: SchedulerConfig::default(),
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Content database to maintain (defaults to <data_dir>/housekeeper.db)
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_path: None,
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between housekeeping passes (0 = disabled)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

/// What to do with the articles a task selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    Archive,
    Unpublish,
    SetAccess,
}

/// One housekeeping task from the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Name used in log lines
    #[serde(default = "default_task_name")]
    pub name: String,
    pub action: ActionKind,
    #[serde(flatten)]
    pub selection: Selection,
    /// Preview only; no writes are issued
    #[serde(default = "default_true")]
    pub dry_run: bool,
    /// Destination category (move only)
    #[serde(default)]
    pub target_category: i64,
    /// New access level (set_access only)
    #[serde(default)]
    pub target_access: i64,
}

fn default_task_name() -> String {
    "housekeeping".to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("housekeeper")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_interval() -> u64 {
    3600 // 1 hour
}

fn default_true() -> bool {
    true
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/housekeeper/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("housekeeper")
            .join("config.toml")
    }

    /// Get the content database path
    pub fn database_path(&self) -> PathBuf {
        match &self.general.database_path {
            Some(path) => expand_tilde(path),
            None => self.data_dir().join("housekeeper.db"),
        }
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ArticleState, DateField, StateFilter};

    #[test]
    fn empty_config_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.scheduler.interval_secs, 3600);
        assert_eq!(config.general.log_level, "info");
        assert!(config.general.database_path.is_none());
        assert!(config.tasks.is_empty());
    }

    #[test]
    fn parses_task_entries() {
        let config: AppConfig = toml::from_str(
            r#"
            [[task]]
            name = "archive old news"
            action = "archive"
            source_category = 12
            include_subcategories = true
            age_days = 90
            date_field = "modified"
            state_filter = "*"
            dry_run = false

            [[task]]
            action = "move"
            target_category = 40
            "#,
        )
        .unwrap();

        assert_eq!(config.tasks.len(), 2);

        let first = &config.tasks[0];
        assert_eq!(first.name, "archive old news");
        assert_eq!(first.action, ActionKind::Archive);
        assert_eq!(first.selection.source_category, 12);
        assert!(first.selection.include_subcategories);
        assert_eq!(first.selection.age_days, 90);
        assert_eq!(first.selection.date_field, DateField::Modified);
        assert_eq!(first.selection.state_filter, StateFilter::Any);
        assert!(!first.dry_run);

        let second = &config.tasks[1];
        assert_eq!(second.name, "housekeeping");
        assert_eq!(second.action, ActionKind::Move);
        assert_eq!(second.target_category, 40);
        assert_eq!(second.selection.age_days, 30);
        assert_eq!(
            second.selection.state_filter,
            StateFilter::State(ArticleState::Published)
        );
        assert!(second.dry_run);
    }

    #[test]
    fn state_filter_accepts_a_bare_code() {
        let config: AppConfig = toml::from_str(
            r#"
            [[task]]
            action = "unpublish"
            state_filter = 2
            "#,
        )
        .unwrap();

        assert_eq!(
            config.tasks[0].selection.state_filter,
            StateFilter::State(ArticleState::Archived)
        );
    }
}
