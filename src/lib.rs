//! Close GitHub issues and pull requests, optionally leaving a closing comment first.

pub mod close;
pub mod comment;
pub mod config;
pub mod github;
pub mod graphql;
pub mod item;
pub mod mock_github;
pub mod repo;
pub mod resolve;
pub mod selector;

// Re-export the workflow's main types at crate root for convenience
pub use close::{CLOSE_FIELDS, CloseError, CloseOutcome, CloseRequest, close_item};
pub use item::{ItemField, ItemId, ItemKind, ItemState, TrackedItem};
pub use repo::RepositoryContext;
pub use selector::Selector;
