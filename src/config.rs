//! Store configuration.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use std::time::Duration;

/// What deleting an incident does to the communications that reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Refuse the delete while any communication references the incident.
    #[default]
    Restrict,
    /// Delete the referencing communications in the same commit.
    Cascade,
    /// Delete the incident only; its communications keep a dangling `incident_id`.
    Orphan,
}

impl DeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletePolicy::Restrict => "restrict",
            DeletePolicy::Cascade => "cascade",
            DeletePolicy::Orphan => "orphan",
        }
    }
}

impl Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restrict" => Ok(DeletePolicy::Restrict),
            "cascade" => Ok(DeletePolicy::Cascade),
            "orphan" => Ok(DeletePolicy::Orphan),
            other => Err(format!(
                "unknown delete policy '{}', expected restrict, cascade or orphan",
                other
            )),
        }
    }
}

/// Database used when none is configured, next to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://emergency_management.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database, e.g. `sqlite://records.db` or `sqlite::memory:`. Created if missing.
    pub database_url: String,
    /// Capacity of the store actor's request channel.
    pub channel_capacity: usize,
    /// Upper bound on concurrently open sessions.
    pub max_sessions: usize,
    pub acquire_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub incident_delete: DeletePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            channel_capacity: 32,
            max_sessions: 16,
            acquire_timeout_ms: 5_000,
            request_timeout_ms: 5_000,
            incident_delete: DeletePolicy::Restrict,
        }
    }
}

impl StoreConfig {
    /// Default settings over a private in-memory database that disappears on shutdown.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.incident_delete = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_policy_parses_case_insensitively() {
        assert_eq!("Cascade".parse::<DeletePolicy>(), Ok(DeletePolicy::Cascade));
        assert_eq!(" orphan ".parse::<DeletePolicy>(), Ok(DeletePolicy::Orphan));
        assert!("soft".parse::<DeletePolicy>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.incident_delete, DeletePolicy::Restrict);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(StoreConfig::in_memory().database_url, "sqlite::memory:");
        assert_eq!(
            config.with_delete_policy(DeletePolicy::Orphan).incident_delete,
            DeletePolicy::Orphan
        );
    }
}
