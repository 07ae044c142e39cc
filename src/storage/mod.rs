//! storage layer for gitwiki
//!
//! this module wraps a git working tree as a versioned file store. The wiki
//! layer above uses this API and never runs git itself.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     GitRepository                           │
//! │       (show / add / commit / log / grep / unstage)          │
//! └─────────────────────────────────────────────────────────────┘
//!                  │                             │
//!                  ▼                             ▼
//!           ┌─────────────┐               ┌─────────────┐
//!           │   command   │               │    path     │
//!           │ (git runner)│               │(title↔file) │
//!           └─────────────┘               └─────────────┘
//!  ```
//!
//! # Usage
//!
//! ```ignore
//! use gitwiki::storage::{Author, GitRepository, GitSignature, RevisionSpec};
//!
//! let repo = GitRepository::open_or_init("./data", &GitSignature::wiki())?;
//!
//! std::fs::write(repo.path().join("Home.md"), "# Welcome")?;
//! repo.add("Home.md")?;
//! repo.commit("Create Home", &Author::new("Ada", "ada@example.com"))?;
//!
//! let body = repo.show("Home.md", &RevisionSpec::Current)?;
//! ```

mod command;
mod error;
mod path;
mod repository;
mod types;

// Re-export public API
pub use command::{CommandOutput, GitCommand};
pub use error::{StorageError, StorageResult};
pub use path::{to_path, to_title, DocumentTitle, InvalidTitleError};
pub use repository::{GitRepository, LOG_FORMAT};
pub use types::{Author, Document, GitSignature, Revision, RevisionSpec, SearchResult};
