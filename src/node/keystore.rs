//! Directory keystore
//!
//! Reads a directory of JSON key files (one account per file, the `address`
//! field holding the hex address). Key decryption belongs to the connector:
//! unlocking hands it the key file together with the passphrase.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{Credentials, Keystore};
use crate::address::Address;
use crate::config::expand_home;
use crate::error::{ConsoleError, Result};

#[derive(Debug, Deserialize)]
struct KeyFileHeader {
    address: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DirKeystore;

impl DirKeystore {
    pub fn new() -> Self {
        Self
    }

    /// `(address, file)` for every readable key file, sorted by file name
    async fn scan(&self, path: &Path) -> Result<Vec<(Address, PathBuf)>> {
        let dir = expand_home(path);
        let keystore_err = |reason: String| ConsoleError::Keystore {
            path: dir.display().to_string(),
            reason,
        };

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| keystore_err(e.to_string()))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| keystore_err(e.to_string()))?
        {
            let file = entry.path();
            if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            files.push(file);
        }
        files.sort();

        let mut keys = Vec::with_capacity(files.len());
        for file in files {
            match read_address(&file).await {
                Some(address) => keys.push((address, file)),
                None => debug!(file = %file.display(), "skipping non-key file"),
            }
        }
        Ok(keys)
    }
}

async fn read_address(file: &Path) -> Option<Address> {
    let raw = tokio::fs::read(file).await.ok()?;
    let header: KeyFileHeader = serde_json::from_slice(&raw).ok()?;
    header.address.parse().ok()
}

#[async_trait]
impl Keystore for DirKeystore {
    async fn accounts(&self, path: &Path) -> Result<Vec<Address>> {
        Ok(self.scan(path).await?.into_iter().map(|(a, _)| a).collect())
    }

    async fn unlock(&self, path: &Path, account: Address, passphrase: &str) -> Result<Credentials> {
        let (_, file) = self
            .scan(path)
            .await?
            .into_iter()
            .find(|(a, _)| *a == account)
            .ok_or_else(|| ConsoleError::Keystore {
                path: path.display().to_string(),
                reason: format!("no key for {account}"),
            })?;

        if passphrase.is_empty() {
            return Err(ConsoleError::WrongPassphrase {
                account: account.to_hex(),
            });
        }

        let mut secret = tokio::fs::read(&file).await?;
        secret.push(b'\n');
        secret.extend_from_slice(passphrase.as_bytes());
        Ok(Credentials::new(account, secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const A: &str = "8125721c2413d99a33e351e1f6bb4e56b6b633fd";
    const B: &str = "0f0e0d0c0b0a09080706050403020100ffeeddcc";

    fn keystore_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("UTC--2018--b"),
            format!(r#"{{"address":"{B}","crypto":{{}},"version":3}}"#),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("UTC--2018--a"),
            format!(r#"{{"address":"{A}","crypto":{{}},"version":3}}"#),
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a key").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_lists_accounts_in_file_order() {
        let dir = keystore_dir();
        let accounts = DirKeystore::new().accounts(dir.path()).await.unwrap();

        let expected: Vec<Address> = vec![A.parse().unwrap(), B.parse().unwrap()];
        assert_eq!(accounts, expected);
    }

    #[tokio::test]
    async fn test_missing_directory_is_keystore_error() {
        let err = DirKeystore::new()
            .accounts(Path::new("/definitely/not/here"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Keystore { .. }));
    }

    #[tokio::test]
    async fn test_unlock_known_account() {
        let dir = keystore_dir();
        let account: Address = A.parse().unwrap();
        let creds = DirKeystore::new()
            .unlock(dir.path(), account, "secret")
            .await
            .unwrap();

        assert_eq!(creds.address, account);
        assert!(creds.secret().ends_with(b"secret"));
    }

    #[tokio::test]
    async fn test_unlock_rejects_unknown_or_empty() {
        let dir = keystore_dir();
        let keystore = DirKeystore::new();

        let unknown = Address::from([9u8; 20]);
        assert!(keystore.unlock(dir.path(), unknown, "x").await.is_err());

        let known: Address = A.parse().unwrap();
        let err = keystore.unlock(dir.path(), known, "").await.unwrap_err();
        assert!(matches!(err, ConsoleError::WrongPassphrase { .. }));
    }
}
