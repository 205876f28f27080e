use crate::engine::Storage;
use crate::error::{StorageError, StorageErrorExt};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName(pub String);

impl TryFrom<String> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&str> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        let name = value.to_lowercase();

        if name.is_empty() {
            return Err(StorageError::PathTraversalAttempt {
                message: "EMPTY".into(),
                context: Some("Namespace cannot be empty".into()),
            });
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StorageError::PathTraversalAttempt {
                message: name.into(),
                context: Some("Namespace contains illegal characters".into()),
            });
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for NamespaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lightweight, per-project view of the artifact store.
///
/// `NamespacedStorage` scopes every path to its namespace directory and
/// applies sharding automatically. This is how feature slices keep one
/// project's artifacts apart from another's.
///
/// # Characteristics
/// - **Automatic Sharding**: artifact keys are sharded within the namespace
///   directory, while any subdirectories you provide are preserved.
/// - **Inherited Config**: compression and security settings come from the
///   parent [`Storage`] instance.
/// - **Zero Copy**: cloning only bumps a reference count on the core engine.
#[derive(Debug, Clone)]
pub struct NamespacedStorage {
    storage: Storage,
    namespace: Arc<Cow<'static, str>>,
}

impl NamespacedStorage {
    pub(crate) fn new(storage: Storage, namespace: impl Into<Cow<'static, str>>) -> Self {
        Self { storage, namespace: Arc::new(namespace.into()) }
    }

    /// The lowercased namespace this view is scoped to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.namespace
    }

    /// Resolves a relative path to a physical path on the disk.
    ///
    /// The same sandbox validation as [`Storage::resolve`] applies, with the
    /// namespace and sharding prepended.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path tries to escape the sandbox.
    /// Returns [`StorageError::Io`] if the path or its parent cannot be verified on the filesystem.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        self.storage.resolve_internal(Some(&self.namespace), path)
    }

    /// Reads the entire contents of a file into a byte vector.
    ///
    /// If transparent compression is enabled for this storage instance, the
    /// data is decompressed before being returned.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the path does not exist.
    /// Returns [`StorageError::Decompress`] if the data is corrupted or compression is misconfigured.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.storage.read_internal(Some(&self.namespace), path).await
    }

    /// Writes data to a file atomically.
    ///
    /// Same semantics as [`Storage::write`]: unique temp file, `fsync`, then
    /// rename. Shard directories are created automatically, and LZ4
    /// compression is applied when configured.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path escapes the sandbox.
    /// Returns [`StorageError::Io`] if disk space is full or hardware failure occurs.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.storage.write_internal(Some(&self.namespace), path, data).await
    }

    /// Deletes a file from the namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the file does not exist, or
    /// [`StorageError::Io`] if permissions prevent the deletion.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.storage.delete_internal(Some(&self.namespace), path).await
    }

    /// Checks if a file exists within the namespace.
    ///
    /// # Errors
    ///
    /// Returns `Ok(false)` if the file is not found. Returns an `Err` only if
    /// path resolution fails (e.g. due to a security violation).
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        let resolved = self.storage.resolve_internal(Some(&self.namespace), path)?;
        Ok(resolved.exists())
    }

    /// Retrieves filesystem metadata for a file within the namespace.
    ///
    /// With transparent compression enabled, `len()` reports the compressed
    /// size on disk, not the original payload size.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the target does not exist or a
    /// hardware/permission error occurs.
    pub async fn metadata(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<std::fs::Metadata, StorageError> {
        let resolved = self.storage.resolve_internal(Some(&self.namespace), path)?;
        fs::metadata(&resolved)
            .await
            .context(format!("Failed to get metadata: {}", resolved.display()))
    }
}
