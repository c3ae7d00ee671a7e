//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("invalid address '{value}' (expected 0x + 40 hex digits)")]
    InvalidAddress { value: String },

    // ─────────────────────────────────────────────────────────────
    // Keystore
    // ─────────────────────────────────────────────────────────────

    #[error("keystore '{path}': {reason}")]
    Keystore { path: String, reason: String },

    #[error("no keystore path configured for account {account}")]
    UnknownAccount { account: String },

    #[error("wrong passphrase for account {account}")]
    WrongPassphrase { account: String },

    // ─────────────────────────────────────────────────────────────
    // Node
    // ─────────────────────────────────────────────────────────────

    #[error("connection to {endpoint} timed out after {timeout_ms}ms")]
    ConnectTimeout { endpoint: String, timeout_ms: u64 },

    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("{operation} failed: {reason}")]
    Node { operation: String, reason: String },
}

impl ConsoleError {
    /// Shorthand for a failed node call
    pub fn node(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Node {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

impl FixSuggestion for ConsoleError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ConsoleError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            ConsoleError::Io(_) => Some("Check file path and permissions"),
            ConsoleError::Config(_) => Some("Check the config file against the documented schema"),
            ConsoleError::InvalidAddress { .. } => {
                Some("Addresses are 20 bytes written as 0x followed by 40 hex digits")
            }
            ConsoleError::Keystore { .. } => {
                Some("Point the path at a directory containing keystore files")
            }
            ConsoleError::UnknownAccount { .. } => {
                Some("Add the account and its keystore directory under `accounts:` in the config")
            }
            ConsoleError::WrongPassphrase { .. } => None,
            ConsoleError::ConnectTimeout { .. } | ConsoleError::Connect { .. } => {
                Some("Check that the node is running and the endpoint is reachable")
            }
            ConsoleError::Node { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = ConsoleError::ConnectTimeout {
            endpoint: "localhost:15030".to_string(),
            timeout_ms: 3000,
        };
        assert_eq!(
            err.to_string(),
            "connection to localhost:15030 timed out after 3000ms"
        );
        assert!(err.fix_suggestion().is_some());
    }

    #[test]
    fn test_node_helper() {
        let err = ConsoleError::node("balance", "unavailable");
        assert_eq!(err.to_string(), "balance failed: unavailable");
    }
}
