//! A sandboxed artifact store over the local filesystem.
//!
//! Version payloads never touch the filesystem directly; everything goes
//! through this crate, which enforces a sandbox root and shields callers from
//! the usual I/O pitfalls. All examples use temporary directories to avoid
//! writing to the real filesystem.
//!
//! # Core Features
//!
//! - **Sandbox Security**: strict path traversal protection backed by physical
//!   path canonicalization.
//! - **Atomic Writes**: an "atomic swap" pattern (unique temp write + `fsync` +
//!   `rename`) keeps targets intact across crashes.
//! - **Transparent Compression**: optional LZ4 block compression, invisible to
//!   the consumer.
//! - **Namespacing & Sharding**: one namespace per project, with automatic
//!   directory sharding so large projects stay fast to list.
//! - **Self-Healing**: orphaned temporary files from earlier crashes are
//!   removed during initialization.
//!
//! # Architectural Overview
//!
//! 1. [`Storage`]: the primary thread-safe handle and entry point.
//! 2. [`NamespacedStorage`]: a per-project view of the store.
//! 3. [`StorageBuilder`]: a type-safe fluent builder for configuration.
//!
//! # Examples
//!
//! ```rust
//! use vhub_storage::{Storage, Compression, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let storage = Storage::builder()
//!         .root(&root)
//!         .create(true)
//!         .compression(Compression::Lz4)
//!         .connect()
//!         .await?;
//!
//!     // Write data atomically
//!     storage.write("manifest.bin", b"payload").await?;
//!
//!     // Read data (automatically decompressed)
//!     let data = storage.read("manifest.bin").await?;
//!     assert_eq!(data, b"payload");
//!
//!     Ok(())
//! }
//! ```
//!
//! ```rust
//! # use vhub_storage::{Storage, StorageError};
//! # async fn run(storage: Storage) -> Result<(), StorageError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! # let root = tmp.path().join("data");
//! # let storage = Storage::builder().root(&root).connect().await?;
//! let project = storage.namespace("abcdwxyz")?;
//!
//! // Artifacts land in a sharded path: <root>/abcdwxyz/9f/3a/9f3a...bin
//! project.write("9f3adeadbeef.bin", b"content").await?;
//!
//! if project.exists("9f3adeadbeef.bin")? {
//!     let meta = project.metadata("9f3adeadbeef.bin").await?;
//!     println!("Size on disk: {} bytes", meta.len());
//! }
//!
//! // Removing the project wipes every artifact it owns.
//! storage.remove_namespace("abcdwxyz").await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod namespace;
mod security;

pub use builder::StorageBuilder;
pub use engine::{Compression, Storage};
pub use error::{StorageError, StorageErrorExt};
pub use namespace::NamespacedStorage;
