use std::env;
use std::path::PathBuf;

use crate::shared::errors::{AppError, AppResult};

/// Runtime configuration, resolved from the environment once at startup.
///
/// `dotenvy` is loaded by the binary before this is read, so a local `.env`
/// file works the same way it did for the original import scripts.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub backup_dir: PathBuf,
    pub completion: Option<CompletionConfig>,
}

/// Settings for the external text-completion service used by enrichment.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            database_url: Self::resolve_database_url()?,
            backup_dir: env::var("BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("backups")),
            completion: CompletionConfig::from_env(),
        })
    }

    /// Prefer a full DATABASE_URL; otherwise compose one from the discrete
    /// DB_* variables the legacy scripts used, with the same defaults.
    fn resolve_database_url() -> AppResult<String> {
        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.starts_with("mysql://") {
                return Err(AppError::ConfigurationError(
                    "Invalid DATABASE_URL format. Must start with mysql://".to_string(),
                ));
            }
            return Ok(url);
        }

        let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let user = env::var("DB_USER").unwrap_or_else(|_| "root".to_string());
        let password = env::var("DB_PASSWORD").unwrap_or_default();
        let database = env::var("DB_NAME").unwrap_or_else(|_| "nob".to_string());

        let credentials = if password.is_empty() {
            user
        } else {
            format!("{}:{}", user, password)
        };

        Ok(format!("mysql://{}@{}/{}", credentials, host, database))
    }
}

impl CompletionConfig {
    /// Returns None when the service is not configured; enrichment commands
    /// report that to the operator instead of failing at startup.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("COMPLETION_API_KEY").ok()?;
        Some(Self {
            api_url: env::var("COMPLETION_API_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".to_string()),
            api_key,
            model: env::var("COMPLETION_MODEL")
                .unwrap_or_else(|_| "claude-3-5-sonnet-20241022".to_string()),
            max_tokens: env::var("COMPLETION_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1500),
        })
    }
}
