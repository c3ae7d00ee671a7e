//! Console Configuration
//!
//! Stored as YAML in `~/.config/worker-console/config.yaml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Command-line flags (`--node`, `--log-file`)
//! 2. Environment (`WORKER_CONSOLE_NODE`)
//! 3. Config file
//! 4. Defaults

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{ConsoleError, Result};
use crate::node::ControllerTimings;

pub const DEFAULT_NODE: &str = "localhost:15030";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Management node endpoint
    #[serde(default = "default_node")]
    pub node: String,

    /// Log destination; nothing is logged when unset
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Account address -> keystore directory
    #[serde(default)]
    pub accounts: BTreeMap<Address, PathBuf>,

    #[serde(default)]
    pub timings: Timings,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Timings {
    pub connect_timeout_ms: u64,
    pub refresh_retry_ms: u64,
    pub uptime_interval_secs: u64,
    pub progress_tick_ms: u64,
    pub router_capacity: usize,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 3000,
            refresh_retry_ms: 1000,
            uptime_interval_secs: 60,
            progress_tick_ms: 100,
            router_capacity: crate::router::DEFAULT_CAPACITY,
        }
    }
}

impl Timings {
    pub fn controller(&self) -> ControllerTimings {
        ControllerTimings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            refresh_retry: Duration::from_millis(self.refresh_retry_ms),
            uptime_interval: Duration::from_secs(self.uptime_interval_secs),
        }
    }

    pub fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms)
    }
}

fn default_node() -> String {
    DEFAULT_NODE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node: default_node(),
            log_file: None,
            accounts: BTreeMap::new(),
            timings: Timings::default(),
        }
    }
}

impl Config {
    /// `~/.config/worker-console/` on Linux, the platform equivalent elsewhere
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("worker-console")
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load from `path`, or the default location.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => expand_home(p),
            None => Self::default_path(),
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        for path in config.accounts.values_mut() {
            *path = expand_home(path);
        }
        config.log_file = config.log_file.map(|p| expand_home(&p));
        Ok(config)
    }

    /// Environment overrides, applied after the file
    pub fn with_env(mut self) -> Self {
        if let Ok(node) = std::env::var("WORKER_CONSOLE_NODE") {
            if !node.is_empty() {
                self.node = node;
            }
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.node.trim().is_empty() {
            return Err(ConsoleError::Config("`node` must not be empty".to_string()));
        }
        if self.timings.router_capacity == 0 {
            return Err(ConsoleError::Config(
                "`timings.router_capacity` must be at least 1".to_string(),
            ));
        }
        if self.timings.progress_tick_ms == 0 {
            return Err(ConsoleError::Config(
                "`timings.progress_tick_ms` must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn keystore_for(&self, account: &Address) -> Result<&Path> {
        self.accounts
            .get(account)
            .map(PathBuf::as_path)
            .ok_or_else(|| ConsoleError::UnknownAccount {
                account: account.to_hex(),
            })
    }
}

/// Expand a leading `~` against the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Directories starting with `text`, each with a trailing `/`.
/// Used as the completion source for keystore path fields.
pub fn directory_completions(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let expanded = if text == "~" || text.starts_with("~/") {
        let home = expand_home(Path::new("~"));
        format!("{}{}", home.display(), &text[1..])
    } else {
        text.to_string()
    };

    let pattern = format!("{}*", glob::Pattern::escape(&expanded));
    let Ok(paths) = glob::glob(&pattern) else {
        return Vec::new();
    };

    paths
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_dir())
        .map(|p| format!("{}/", p.display()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const A: &str = "0x8125721c2413d99a33e351e1f6bb4e56b6b633fd";

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.yaml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.node, DEFAULT_NODE);
        assert_eq!(config.timings.connect_timeout_ms, 3000);
    }

    #[test]
    fn test_parse_accounts_and_timings() {
        let yaml = format!(
            r#"
node: "10.0.0.2:15030"
accounts:
  "{A}": "/var/keys"
timings:
  refresh_retry_ms: 250
"#
        );
        let config = Config::from_yaml(&yaml).unwrap();
        let account: Address = A.parse().unwrap();

        assert_eq!(config.node, "10.0.0.2:15030");
        assert_eq!(config.keystore_for(&account).unwrap(), Path::new("/var/keys"));
        assert_eq!(config.timings.refresh_retry_ms, 250);
        assert_eq!(config.timings.uptime_interval_secs, 60, "other timings keep defaults");
        assert_eq!(
            config.timings.controller().refresh_retry,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_bad_address_is_rejected() {
        let yaml = "accounts:\n  \"0x1234\": \"/keys\"\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let yaml = "timings:\n  router_capacity: 0\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConsoleError::Config(_)));
    }

    #[test]
    fn test_unknown_account() {
        let account: Address = A.parse().unwrap();
        let err = Config::default().keystore_for(&account).unwrap_err();
        assert!(matches!(err, ConsoleError::UnknownAccount { .. }));
    }

    #[test]
    fn test_expand_home() {
        let plain = Path::new("/etc/keys");
        assert_eq!(expand_home(plain), plain);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/keys")), home.join("keys"));
        }
    }

    #[test]
    fn test_directory_completions_only_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("keys-main")).unwrap();
        fs::create_dir(dir.path().join("keys-old")).unwrap();
        fs::write(dir.path().join("keys.txt"), "").unwrap();

        let prefix = format!("{}/keys", dir.path().display());
        let mut found = directory_completions(&prefix);
        found.sort();

        assert_eq!(
            found,
            vec![
                format!("{}/keys-main/", dir.path().display()),
                format!("{}/keys-old/", dir.path().display()),
            ]
        );
        assert!(directory_completions("").is_empty());
    }
}
