//! ContentStore - document-level operations over the git working tree.
//!
//! The store is constructed once at startup and shared by handle. It handles:
//! - Mapping titles to files
//! - Loading documents at any revision
//! - Serializing saves (write, stage, commit) behind a single writer lock
//! - History and full-text search, parsed into typed records
//!
//! Reads never take the writer lock. A read racing a save may see the state
//! before or after that save's commit.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::config::{ConfigError, StoreConfig};
use crate::parse::{GrepParser, LogParser};
use crate::storage::{
    Author, Document, DocumentTitle, GitRepository, Revision, RevisionSpec, SearchResult,
    StorageError,
};

/// Result type for store operations.
pub type WikiResult<T> = Result<T, WikiError>;

/// Store errors.
#[derive(Debug, Error)]
pub enum WikiError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl WikiError {
    /// the document (or the requested revision of it) does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, WikiError::Storage(e) if e.is_not_found())
    }
}

/// What a successful save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// a new revision was created
    Committed { revision: String },
    /// the body matched the latest revision, nothing was committed
    Unchanged,
}

/// The git-backed document store.
///
/// Thread-safe: can be shared across threads via Clone (uses Arc internally).
#[derive(Clone)]
pub struct ContentStore {
    inner: Arc<ContentStoreInner>,
}

struct ContentStoreInner {
    repo: GitRepository,
    extension: String,
    grep: GrepParser,
    /// Held for the whole write/add/commit sequence of a save.
    write_lock: Mutex<()>,
}

impl ContentStore {
    /// Open (or create) the store described by `config`.
    pub fn open(config: StoreConfig) -> WikiResult<Self> {
        config.validate()?;

        let repo = if config.create_if_missing {
            GitRepository::open_or_init(&config.path, &config.signature)?
        } else {
            GitRepository::open(&config.path, &config.signature)?
        };
        let repo = if config.git_program.as_os_str() == "git" {
            repo
        } else {
            repo.with_program(&config.git_program)
        };

        Ok(Self {
            inner: Arc::new(ContentStoreInner {
                repo,
                grep: GrepParser::new(&config.extension),
                extension: config.extension,
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Get the working tree path.
    pub fn path(&self) -> &Path {
        self.inner.repo.path()
    }

    /// Get the document file extension.
    pub fn extension(&self) -> &str {
        &self.inner.extension
    }

    /// Get a reference to the underlying repository.
    pub fn repo(&self) -> &GitRepository {
        &self.inner.repo
    }

    /// Relative path of the file backing `title`.
    pub fn path_for(&self, title: &str) -> WikiResult<String> {
        let title = DocumentTitle::new(title).map_err(StorageError::from)?;
        Ok(title.to_path(&self.inner.extension))
    }

    /// Load a document as of `revision`.
    #[instrument(skip(self), level = "debug")]
    pub fn load(&self, title: &str, revision: &RevisionSpec) -> WikiResult<Document> {
        let path = self.path_for(title)?;
        let bytes = self.inner.repo.show(&path, revision)?;
        let body = String::from_utf8(bytes).map_err(|source| StorageError::InvalidUtf8 {
            path: path.clone(),
            source,
        })?;

        Ok(Document {
            title: title.to_string(),
            revision: revision.to_string(),
            body,
        })
    }

    /// Write `body` to the document and commit it.
    ///
    /// An empty message becomes `Update {path}`. If the body is identical to
    /// the committed one the save succeeds with [`SaveOutcome::Unchanged`].
    /// On failure after staging, the staged change is discarded and the
    /// original error returned.
    #[instrument(skip(self, body), level = "debug")]
    pub fn save(
        &self,
        title: &str,
        body: &str,
        message: &str,
        author: &Author,
    ) -> WikiResult<SaveOutcome> {
        let title = DocumentTitle::new(title).map_err(StorageError::from)?;
        let path = title.to_path(&self.inner.extension);
        let message = if message.trim().is_empty() {
            format!("Update {}", path)
        } else {
            message.to_string()
        };

        let _guard = self.inner.write_lock.lock();

        let file = self.path().join(title.to_path_buf(&self.inner.extension));
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::from)?;
        }
        std::fs::write(&file, body).map_err(StorageError::from)?;

        let committed = self
            .inner
            .repo
            .add(&path)
            .and_then(|_| self.inner.repo.commit(&message, author));

        match committed {
            Ok(()) => {
                let revision = self.inner.repo.head()?.unwrap_or_default();
                info!(%title, %revision, "saved document");
                Ok(SaveOutcome::Committed { revision })
            }
            Err(StorageError::NothingToCommit) => {
                info!(%title, "document unchanged");
                Ok(SaveOutcome::Unchanged)
            }
            Err(e) => {
                if let Err(cleanup) = self.inner.repo.unstage(&path) {
                    warn!(%title, error = %cleanup, "failed to discard staged change");
                }
                Err(e.into())
            }
        }
    }

    /// Revisions of a document, most recent first.
    #[instrument(skip(self), level = "debug")]
    pub fn history(&self, title: &str) -> WikiResult<Vec<Revision>> {
        let path = self.path_for(title)?;
        let raw = self.inner.repo.log(&path)?;
        let report = LogParser::parse(&String::from_utf8_lossy(&raw));
        if !report.is_lossless() {
            warn!(title, skipped = report.skipped, "dropped unparseable history lines");
        }

        Ok(report
            .into_records()
            .into_iter()
            .map(|mut revision| {
                revision.title = title.to_string();
                revision
            })
            .collect())
    }

    /// Full-text search over current content, case-insensitive.
    ///
    /// Search is best-effort: any failure is logged and yields no results.
    #[instrument(skip(self), level = "debug")]
    pub fn search(&self, keyword: &str) -> Vec<SearchResult> {
        if keyword.is_empty() {
            return Vec::new();
        }

        let raw = match self.inner.repo.grep(keyword) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(keyword, error = %e, "search failed");
                return Vec::new();
            }
        };

        let report = self.inner.grep.parse(&String::from_utf8_lossy(&raw));
        if !report.is_lossless() {
            warn!(keyword, skipped = report.skipped, "dropped unparseable search lines");
        }
        report.into_records()
    }
}
