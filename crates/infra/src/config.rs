//! Environment-driven configuration.
//!
//! | variable               | values                 | default          |
//! |------------------------|------------------------|------------------|
//! | `RIHLA_DEFAULT_ACCESS` | `deny` \| `allow`      | `deny`           |
//! | `RIHLA_DATA_MODE`      | `production` \| `test` | `production`     |
//! | `RIHLA_ADMIN_EMAILS`   | comma-separated emails | none             |
//!
//! Absent variables fall back to the default with a warning. Present but
//! unparseable values are an error: the process must not start with a
//! policy it did not ask for.

use thiserror::Error;
use tracing::warn;

use rihla_auth::DefaultPolicy;
use rihla_core::DataMode;

pub const DEFAULT_ACCESS_VAR: &str = "RIHLA_DEFAULT_ACCESS";
pub const DATA_MODE_VAR: &str = "RIHLA_DATA_MODE";
pub const ADMIN_EMAILS_VAR: &str = "RIHLA_ADMIN_EMAILS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}' (expected {expected})")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub default_policy: DefaultPolicy,
    pub data_mode: DataMode,
    pub admin_emails: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_policy: DefaultPolicy::DenyByDefault,
            data_mode: DataMode::Production,
            admin_emails: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; tests pass a closure over a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_policy = match lookup(DEFAULT_ACCESS_VAR) {
            None => {
                warn!("{DEFAULT_ACCESS_VAR} not set; unmapped sections are denied");
                defaults.default_policy
            }
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "deny" => DefaultPolicy::DenyByDefault,
                "allow" => DefaultPolicy::AllowByDefault,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: DEFAULT_ACCESS_VAR,
                        value: raw,
                        expected: "deny|allow",
                    });
                }
            },
        };

        let data_mode = match lookup(DATA_MODE_VAR) {
            None => {
                warn!("{DATA_MODE_VAR} not set; using production data");
                defaults.data_mode
            }
            Some(raw) => raw.parse::<DataMode>().map_err(|_| ConfigError::Invalid {
                var: DATA_MODE_VAR,
                value: raw.clone(),
                expected: "production|test",
            })?,
        };

        let admin_emails = lookup(ADMIN_EMAILS_VAR)
            .map(|raw| {
                raw.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if default_policy == DefaultPolicy::AllowByDefault {
            warn!("unmapped sections are ALLOWED; do not use this policy in production");
        }

        Ok(Self {
            default_policy,
            data_mode,
            admin_emails,
        })
    }
}
