use crate::domain::value_objects::ConflictPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub interval_secs: u64,
    pub remote_timeout_ms: u64,
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}

impl SyncConfig {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
                connection_timeout: 30,
            },
            sync: SyncConfig {
                auto_sync: true,
                interval_secs: 300, // 5 minutes
                remote_timeout_ms: 15_000,
                conflict_policy: ConflictPolicy::default(),
            },
        }
    }
}

fn default_database_url() -> String {
    let base = dirs::data_local_dir()
        .map(|dir| dir.join("bizsync"))
        .unwrap_or_else(|| PathBuf::from("./data"));
    format!("sqlite:{}?mode=rwc", base.join("bizsync.db").display())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("BIZSYNC_DATABASE_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.database.url = trimmed.to_string();
            }
        }
        if let Ok(v) = std::env::var("BIZSYNC_DB_MAX_CONNECTIONS")
            && let Some(value) = parse_u32(&v)
        {
            cfg.database.max_connections = value.max(1);
        }
        if let Ok(v) = std::env::var("BIZSYNC_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("BIZSYNC_SYNC_INTERVAL_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.sync.interval_secs = value.max(1);
        }
        if let Ok(v) = std::env::var("BIZSYNC_REMOTE_TIMEOUT_MS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.sync.remote_timeout_ms = value;
        }
        if let Ok(v) = std::env::var("BIZSYNC_CONFLICT_POLICY") {
            match v.parse::<ConflictPolicy>() {
                Ok(policy) => cfg.sync.conflict_policy = policy,
                Err(err) => tracing::warn!(error = %err, "ignoring BIZSYNC_CONFLICT_POLICY"),
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.sync.remote_timeout_ms == 0 {
            return Err("Sync remote_timeout_ms must be greater than 0".to_string());
        }
        if self.sync.auto_sync && self.sync.interval_secs == 0 {
            return Err("Sync interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
