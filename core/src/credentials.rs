//! Secret storage for the bearer token.
//!
//! # Design
//! [`CredentialStore`] is the three-operation contract the auth service
//! depends on: save, load and delete one secret string by key. "Not found"
//! is a successful empty result everywhere.
//!
//! - [`InMemoryCredentialStore`] lives for the process and is the default.
//! - [`FileCredentialStore`] persists secrets in a JSON file namespaced by a
//!   service identifier, e.g. `<dir>/com.example.app.json`. Writes replace
//!   the file atomically and, on Unix, restrict it to the owner.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::CredentialStoreError;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn save(&self, key: &str, secret: &str) -> Result<(), CredentialStoreError>;

    async fn load(&self, key: &str) -> Result<Option<String>, CredentialStoreError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CredentialStoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn save(&self, key: &str, secret: &str) -> Result<(), CredentialStoreError> {
        self.secrets
            .write()
            .await
            .insert(key.to_string(), secret.to_string());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.secrets.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), CredentialStoreError> {
        self.secrets.write().await.remove(key);
        Ok(())
    }
}

type SecretFile = HashMap<String, String>;

/// File-backed persistent store.
///
/// All secrets of one service share a single file. Read-modify-write cycles
/// are serialized by an async mutex, so one instance is safe to share between
/// tasks. Separate instances pointing at the same file are not coordinated.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Store secrets for `service` under `dir`.
    pub fn new(dir: impl AsRef<Path>, service: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{service}.json")),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<SecretFile, CredentialStoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SecretFile::new()),
            Err(source) => {
                return Err(CredentialStoreError::Backend {
                    operation: "read",
                    source,
                })
            }
        };
        serde_json::from_slice(&raw).map_err(|e| CredentialStoreError::Decoding(e.to_string()))
    }

    async fn write_all(&self, secrets: &SecretFile) -> Result<(), CredentialStoreError> {
        let encoded =
            serde_json::to_vec(secrets).map_err(|e| CredentialStoreError::Encoding(e.to_string()))?;
        let backend = |source| CredentialStoreError::Backend {
            operation: "write",
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(backend)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &encoded).await.map_err(backend)?;
        restrict_to_owner(&tmp).await.map_err(backend)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(backend)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn save(&self, key: &str, secret: &str) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let mut secrets = self.read_all().await?;
        secrets.insert(key.to_string(), secret.to_string());
        self.write_all(&secrets).await
    }

    async fn load(&self, key: &str) -> Result<Option<String>, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn delete(&self, key: &str) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let mut secrets = self.read_all().await?;
        if secrets.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&secrets).await
    }
}

#[cfg(unix)]
async fn restrict_to_owner(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_to_owner(_path: &Path) -> io::Result<()> {
    Ok(())
}
