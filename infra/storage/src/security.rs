use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Collapse `.` / `..` lexically while ensuring the path never climbs above
/// the sandbox root.
///
/// `..` is allowed as long as it stays below the empty relative base.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for c in path.components() {
        match c {
            Component::CurDir => {},
            Component::Normal(seg) => out.push(seg),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(StorageError::PathTraversalAttempt {
                        message: path.display().to_string().into(),
                        context: Some("Path attempted to escape sandbox via '..'".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::PathTraversalAttempt {
                    message: path.display().to_string().into(),
                    context: Some("Absolute paths are not allowed in sandbox".into()),
                });
            },
        }
    }

    Ok(out)
}

/// Safely joins a path to the root and ensures it doesn't escape the sandbox.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();

    if path.is_absolute() {
        return Err(StorageError::PathTraversalAttempt {
            message: format!("Absolute paths are not allowed in sandbox {}", path.display()).into(),
            context: None,
        });
    }

    let safe_rel = normalize_relative(path)?;
    let joined = root.join(safe_rel);

    match joined.canonicalize() {
        Ok(canonical) => validate_canonical(root, canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => validate_path(root, &joined),
        Err(e) => Err(StorageError::Io { source: e, context: None }),
    }
}

/// Resolves a path with namespace and sharding applied.
///
/// Subdirectories are preserved; sharding splits the first four characters of
/// the final filename into two directory levels. Artifact keys are content
/// hashes, so this spreads files evenly.
pub(crate) fn resolve_sharding(
    root: &Path,
    ns: Option<&str>,
    path: impl AsRef<Path>,
) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let filename =
        path.file_name().and_then(|s| s.to_str()).ok_or_else(|| StorageError::FileNotFound {
            message: path.display().to_string().into(),
            context: Some("Target must be a file".into()),
        })?;

    let mut shard = PathBuf::new();
    if let Some(n) = ns {
        shard.push(n);
    }
    if let Some(p) = parent {
        shard.push(p);
    }

    let chars: Vec<char> = filename.chars().collect();
    if chars.len() >= 4 {
        let shard1: String = chars[0..2].iter().collect();
        let shard2: String = chars[2..4].iter().collect();
        shard.push(shard1);
        shard.push(shard2);
    }
    shard.push(filename);

    resolve_path(root, shard)
}

fn validate_canonical(root: &Path, canonical: PathBuf) -> Result<PathBuf, StorageError> {
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        Err(StorageError::PathTraversalAttempt {
            message: canonical.display().to_string().into(),
            context: Some("Path attempted to escape sandbox via .. sequences".into()),
        })
    }
}

/// Validates a path that doesn't exist yet by finding and verifying its first
/// existing ancestor.
///
/// Walks up the directory tree from the target until a parent exists on disk,
/// then verifies that parent is inside the sandbox. Deeply nested targets can
/// be validated without creating intermediate directories first.
///
/// # Security
/// - Canonicalizing the first existing ancestor defeats symlink redirection.
/// - The entire path chain must originate from within the sandbox.
/// - Escapes via relative segments (e.g. `../../`) are detected.
fn validate_path(root: &Path, joined: &Path) -> Result<PathBuf, StorageError> {
    if !joined.starts_with(root) {
        return Err(StorageError::PathTraversalAttempt {
            message: joined.display().to_string().into(),
            context: Some("Path is outside sandbox boundaries".into()),
        });
    }

    let mut current = Some(joined);

    while let Some(path) = current {
        if path == root {
            return Ok(joined.to_path_buf());
        }

        if path.exists() {
            return match path.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined.to_path_buf()),
                Ok(canonical) => Err(StorageError::PathTraversalAttempt {
                    message: canonical.display().to_string().into(),
                    context: Some("Existing parent directory is a symlink outside sandbox".into()),
                }),
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }

        current = path.parent();
    }

    Err(StorageError::PathTraversalAttempt {
        message: joined.display().to_string().into(),
        context: Some("No valid parent directory found within sandbox".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_inner_segments() {
        let out = normalize_relative(Path::new("a/./b/../c")).unwrap();
        assert_eq!(out, PathBuf::from("a/c"));
    }

    #[test]
    fn normalize_rejects_escape_above_base() {
        let err = normalize_relative(Path::new("a/../../b")).unwrap_err();
        assert!(matches!(err, StorageError::PathTraversalAttempt { .. }));
    }

    #[test]
    fn sharding_splits_long_filenames() {
        let tmp = std::env::temp_dir();
        let resolved = resolve_sharding(&tmp, Some("proj"), "cafebabe.bin").unwrap();
        let text = resolved.to_string_lossy().replace('\\', "/");
        assert!(text.ends_with("proj/ca/fe/cafebabe.bin"), "got {text}");
    }

    #[test]
    fn short_filenames_are_not_sharded() {
        let tmp = std::env::temp_dir();
        let resolved = resolve_sharding(&tmp, None, "a.b").unwrap();
        assert!(resolved.to_string_lossy().ends_with("a.b"));
    }
}
