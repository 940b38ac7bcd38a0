//! Process-wide configuration
//!
//! Policy is read once at process start and passed explicitly to every
//! component — no ambient environment lookups happen inside classification
//! or quarantine logic. The struct is immutable after construction and
//! shared via `Arc`.

use crate::error::{Result, WardenError};
use crate::types::RenameMode;
use std::collections::HashSet;

/// Environment variable naming the storage account (required)
pub const ENV_STORAGE_ACCOUNT: &str = "STORAGE_ACCOUNT";
/// Environment variable flagging a hierarchical-namespace account
pub const ENV_IS_HNS: &str = "IS_HNS";
/// Environment variable selecting the classification mode
pub const ENV_RENAME_MODE: &str = "RENAME_MODE";
/// Environment variable holding the comma-separated extension blocklist
pub const ENV_BLOCKLIST: &str = "BLOCKLIST";
/// Environment variable overriding the quarantine suffix
pub const ENV_QUARANTINE_SUFFIX: &str = "QUARANTINE_SUFFIX";

/// Extensions quarantined by default in blocklist mode
pub const DEFAULT_BLOCKLIST: &str = ".exe,.com,.bat,.cmd,.scr,.msi,.msp,.ps1,.ps2,.vbs,.vbe,.js,.jse,.wsf,.wsh,.hta,.jar,.dll,.reg,.cpl,.lnk";

/// Suffix appended to quarantined object paths unless overridden
pub const DEFAULT_QUARANTINE_SUFFIX: &str = ".sus";

/// Immutable policy for one process
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage account identifier (e.g., `userscratchspace54`)
    pub account: String,

    /// Whether the account has a hierarchical namespace (POSIX ACLs,
    /// atomic rename)
    pub hierarchical: bool,

    /// Active classification mode
    pub mode: RenameMode,

    /// Lowercase leading-dot extensions quarantined in blocklist mode
    pub blocklist: HashSet<String>,

    /// Lowercase leading-dot suffix marking quarantined objects
    pub quarantine_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: String::new(),
            hierarchical: true,
            mode: RenameMode::Blocklist,
            blocklist: parse_blocklist(DEFAULT_BLOCKLIST),
            quarantine_suffix: DEFAULT_QUARANTINE_SUFFIX.to_string(),
        }
    }
}

impl Config {
    /// Create a configuration for the given account with default policy
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            ..Self::default()
        }
    }

    /// Read configuration from the process environment
    ///
    /// `STORAGE_ACCOUNT` is required; everything else falls back to the
    /// defaults above. Fails with a `Config` error when the account is
    /// missing or a value is malformed — no event can be safely processed
    /// without valid configuration.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    fn from_env_with(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let account = get(ENV_STORAGE_ACCOUNT)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                WardenError::Config(format!("{} is required", ENV_STORAGE_ACCOUNT))
            })?;

        let hierarchical = get(ENV_IS_HNS)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let mode = match get(ENV_RENAME_MODE) {
            Some(v) => v.parse::<RenameMode>()?,
            None => RenameMode::default(),
        };

        let blocklist = get(ENV_BLOCKLIST)
            .map(|v| parse_blocklist(&v))
            .unwrap_or_else(|| parse_blocklist(DEFAULT_BLOCKLIST));

        let quarantine_suffix = match get(ENV_QUARANTINE_SUFFIX) {
            Some(v) => normalize_suffix(&v)?,
            None => DEFAULT_QUARANTINE_SUFFIX.to_string(),
        };

        Ok(Self {
            account,
            hierarchical,
            mode,
            blocklist,
            quarantine_suffix,
        })
    }

    /// Replace the classification mode
    pub fn with_mode(mut self, mode: RenameMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the hierarchical-namespace flag
    pub fn with_hierarchical(mut self, hierarchical: bool) -> Self {
        self.hierarchical = hierarchical;
        self
    }

    /// Replace the blocklist from a comma-separated extension spec
    pub fn with_blocklist(mut self, spec: &str) -> Self {
        self.blocklist = parse_blocklist(spec);
        self
    }

    /// Replace the quarantine suffix (normalized to leading-dot lowercase)
    pub fn with_quarantine_suffix(mut self, suffix: &str) -> Result<Self> {
        self.quarantine_suffix = normalize_suffix(suffix)?;
        Ok(self)
    }
}

/// Split a comma-separated extension spec into the normalized blocklist
///
/// Entries are trimmed and lowercased; a missing leading dot is added;
/// empty entries are dropped.
fn parse_blocklist(spec: &str) -> HashSet<String> {
    spec.split(',')
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .map(|e| {
            if e.starts_with('.') {
                e
            } else {
                format!(".{}", e)
            }
        })
        .collect()
}

/// Normalize a quarantine suffix to lowercase leading-dot form
///
/// An empty suffix is rejected: it would guard every name against
/// classification and quarantine nothing.
fn normalize_suffix(suffix: &str) -> Result<String> {
    let trimmed = suffix.trim().to_ascii_lowercase();
    if trimmed.is_empty() || trimmed == "." {
        return Err(WardenError::Config(
            "Quarantine suffix must be non-empty".to_string(),
        ));
    }
    if trimmed.starts_with('.') {
        Ok(trimmed)
    } else {
        Ok(format!(".{}", trimmed))
    }
}
