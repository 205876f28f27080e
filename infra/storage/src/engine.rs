//! Core engine providing sandboxed, atomic, and compressed file I/O.
//!
//! This module contains the primary [`Storage`] handle, the entry point for
//! all artifact operations. It owns the physical filesystem root, enforces
//! the sandbox via path resolution, and backs both direct and namespaced
//! access.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::namespace::{NamespaceName, NamespacedStorage};
use crate::security;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Marker embedded in temporary file names, both when writing and when
/// sweeping orphans during initialization.
pub(crate) const TMP_MARKER: &str = ".vhubtmp.";

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    #[must_use]
    fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }

    fn decompress(self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Lz4 => {
                lz4_flex::decompress_size_prepended(data).context("Lz4 decompression failed")
            },
        }
    }
}

/// The internal shared state of a [`Storage`] instance.
#[derive(Debug)]
pub struct StorageInner {
    /// The canonicalized physical path on the disk where all data is stored.
    pub(crate) root: PathBuf,
    /// Whether transparent LZ4 compression is globally enabled for this instance.
    pub(crate) compression: Compression,
    /// A unique counter used to generate temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// A thread-safe handle to the artifact store.
///
/// `Storage` provides a sandboxed filesystem environment where all paths are
/// validated to prevent traversal attacks. It supports:
/// - **Atomic Writes**: temp file plus rename, so targets never end up half
///   written.
/// - **Namespacing**: one directory tree per project.
/// - **Transparent Compression**: optional LZ4 block compression.
/// - **Self-Healing**: stale temp files are swept on initialization.
///
/// The handle is internally reference-counted and can be cheaply cloned
/// across threads or tasks.
///
/// # Example
///
/// ```rust
/// use vhub_storage::{Storage, Compression, StorageError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     # let root = tmp.path().join("data");
///     let storage = Storage::builder()
///         .root(&root)
///         .create(true)
///         .compression(Compression::Lz4)
///         .connect()
///         .await?;
///
///     storage.write("global.meta", b"root_data").await?;
///     let data = storage.read("global.meta").await?;
///
///     let project = storage.namespace("abcdwxyz")?;
///     project.write("f00dcafe.bin", b"artifact bytes").await?;
///
///     // Sharding in action: <root>/abcdwxyz/f0/0d/f00dcafe.bin
///     let path = project.resolve("f00dcafe.bin").unwrap();
///     println!("Physical path: {}", path.display());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The artifact store is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// Returns a namespaced view of the store.
    ///
    /// Namespacing partitions artifacts by owner (one namespace per project)
    /// while sharing the same configuration and security sandbox.
    ///
    /// # Constraints
    /// - Names must be **alphanumeric** (a-z, 0-9) or use **underscores** (`_`).
    /// - Names are automatically converted to **lowercase**.
    /// - Empty names are prohibited.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] if the name is empty or
    /// contains illegal characters.
    pub fn namespace<N>(&self, name: N) -> Result<NamespacedStorage, StorageError>
    where
        N: TryInto<NamespaceName, Error = StorageError>,
    {
        let ns = name.try_into()?;
        Ok(NamespacedStorage::new(self.clone(), ns.0))
    }

    /// Removes a namespace and every artifact stored under it.
    ///
    /// The removal is idempotent: a namespace that does not exist on disk is
    /// treated as already removed.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] if the name is invalid,
    /// or [`StorageError::Io`] if the directory tree cannot be deleted.
    pub async fn remove_namespace<N>(&self, name: N) -> Result<(), StorageError>
    where
        N: TryInto<NamespaceName, Error = StorageError>,
    {
        let ns = name.try_into()?;
        let resolved = security::resolve_path(&self.root, ns.as_ref())?;

        match fs::remove_dir_all(&resolved).await {
            Ok(()) => {
                debug!(namespace = %ns, "Namespace removed");
                Ok(())
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to remove namespace: {ns}").into()),
            }),
        }
    }

    /// Resolves a relative path to a physical path within the storage root.
    ///
    /// Security validation applied to every lookup:
    /// 1. The provided path must be relative (absolute paths are rejected).
    /// 2. The path is canonicalized.
    /// 3. The resulting physical path must still be inside the root.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path tries to escape the sandbox.
    /// Returns [`StorageError::Io`] if the path or its parent cannot be verified on the filesystem.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.root, path)
    }

    /// Internal resolve that adds the namespace and sharding.
    pub(crate) fn resolve_internal(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, StorageError> {
        security::resolve_sharding(&self.root, namespace, path)
    }

    /// Reads the entire contents of a file into a byte vector.
    ///
    /// If transparent compression is enabled for this instance, the data is
    /// decompressed before being returned.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the path does not exist.
    /// Returns [`StorageError::Decompress`] if the data is corrupted or compression is misconfigured.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.read_internal(None, path).await
    }

    pub(crate) async fn read_internal(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve_internal(namespace, path)?;

        let data = match fs::read(&resolved).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                });
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", resolved.display()).into()),
                });
            },
        };

        self.inner.compression.decompress(&data)
    }

    /// Writes data to a file atomically.
    ///
    /// The "atomic swap" pattern keeps targets intact:
    /// 1. Data is written to a unique temporary file (`<name>.vhubtmp.<id>`).
    /// 2. The file is synced to hardware (`fsync`).
    /// 3. The temporary file is renamed over the final destination.
    /// 4. Parent directories and shard directories are created automatically.
    ///
    /// On platforms that do not support atomic replace for existing targets,
    /// the implementation falls back to remove-then-rename.
    ///
    /// If transparent compression is enabled, the data is compressed with LZ4
    /// before hitting the disk.
    ///
    /// # Reliability
    ///
    /// The target file is never left partially written, even if the system
    /// crashes mid-write; at worst an orphaned temp file remains, which the
    /// next initialization sweeps away.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path escapes the sandbox.
    /// Returns [`StorageError::Io`] if disk space is full or hardware failure occurs.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.write_internal(None, path, data).await
    }

    pub(crate) async fn write_internal(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let resolved = self.resolve_internal(namespace, path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create shards for {}", resolved.display()))?;
        }

        let temp = unique_tmp_path(&resolved, &self.tmp_counter);

        let final_data = self.inner.compression.compress(data);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(&final_data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &resolved).await {
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                fs::remove_file(&resolved)
                    .await
                    .context(format!("Failed to replace existing file: {}", resolved.display()))?;
                fs::rename(&temp, &resolved).await.context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    resolved.display()
                ))?;
            } else {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), resolved.display())
                            .into(),
                    ),
                });
            }
        }

        if let Some(parent) = resolved.parent() {
            Self::sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), "File saved atomically");
        Ok(())
    }

    /// Deletes a file from the sandbox.
    ///
    /// The path is resolved (including sharding) and the physical file is
    /// removed from the disk.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the file does not exist, or
    /// [`StorageError::Io`] if permissions prevent the deletion.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.delete_internal(None, path).await
    }

    pub(crate) async fn delete_internal(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<(), StorageError> {
        let resolved = self.resolve_internal(namespace, path)?;
        match fs::remove_file(&resolved).await {
            Ok(()) => {},
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                });
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to delete: {}", resolved.display()).into()),
                });
            },
        }
        debug!(path = %resolved.display(), "File deleted");
        Ok(())
    }

    /// Checks if a file exists within the sandbox.
    ///
    /// # Errors
    ///
    /// Returns `Ok(false)` if the file is not found. Returns an `Err` only if
    /// path resolution fails (e.g. due to a security violation).
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        let resolved = self.resolve_internal(None, path)?;
        Ok(resolved.exists())
    }

    /// Retrieves filesystem metadata for a file within the sandbox.
    ///
    /// # Important: Compression Awareness
    ///
    /// If transparent compression is enabled, `len()` reports the
    /// **compressed size** on disk, not the original payload size.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the target does not exist.
    /// Returns [`StorageError::Io`] if a hardware or permission error occurs.
    pub async fn metadata(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<std::fs::Metadata, StorageError> {
        let resolved = self.resolve_internal(None, path)?;
        match fs::metadata(&resolved).await {
            Ok(meta) => Ok(meta),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                })
            },
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to get metadata: {}", resolved.display()).into()),
            }),
        }
    }

    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    tracing::warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
    let tmp_name = format!("{file_name}{TMP_MARKER}{counter}");
    target.with_file_name(tmp_name)
}
