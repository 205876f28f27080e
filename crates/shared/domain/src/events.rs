//! In-process domain events exchanged between slices over the event bus.

/// Emitted after a project and its database records are gone.
///
/// Listeners handle the out-of-band cleanup, e.g. purging the project's
/// artifact namespace from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDeleted {
    pub project_id: String,
}
