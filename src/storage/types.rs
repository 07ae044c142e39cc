//! core value types shared by the storage layer and its callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who a revision is attributed to.
///
/// The empty author (both fields empty) means "use git's configured
/// identity" rather than an explicit one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    /// create a new author
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// the author that defers to git's default identity
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty()
    }

    /// Parse the `Name <email>` form git uses for `--author`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (name, rest) = value.split_once('<')?;
        let email = rest.strip_suffix('>')?;
        if email.contains('<') || email.contains('>') {
            return None;
        }
        Some(Self::new(name.trim(), email.trim()))
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// git signature used as the repository's default identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSignature {
    pub name: String,
    pub email: String,
}

impl GitSignature {
    /// create a new signature
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// default signature for wiki commits without an explicit author
    pub fn wiki() -> Self {
        Self::new("Wiki", "wiki@localhost")
    }
}

impl Default for GitSignature {
    fn default() -> Self {
        Self::wiki()
    }
}

/// Which revision of a document to read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RevisionSpec {
    /// the most recent commit (`HEAD`)
    #[default]
    Current,
    /// a commit id (short or full)
    Object(String),
}

impl RevisionSpec {
    /// Treat an empty string as "current", anything else as an object id.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "HEAD" {
            RevisionSpec::Current
        } else {
            RevisionSpec::Object(value.to_string())
        }
    }

    /// the revision argument passed to git
    pub fn as_git_rev(&self) -> &str {
        match self {
            RevisionSpec::Current => "HEAD",
            RevisionSpec::Object(id) => id,
        }
    }
}

impl From<Option<&str>> for RevisionSpec {
    fn from(value: Option<&str>) -> Self {
        value.map(RevisionSpec::parse).unwrap_or_default()
    }
}

impl fmt::Display for RevisionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_git_rev())
    }
}

/// One entry of a document's history, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revision {
    /// abbreviated commit id
    pub object_id: String,
    pub author: Author,
    /// relative time as reported by git, e.g. "3 days ago"
    pub timestamp: String,
    pub description: String,
    /// filled in by the store, not the log parser
    pub title: String,
}

/// A single matching line from a full-text search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub content: String,
}

/// The raw content of a document at some revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub title: String,
    pub revision: String,
    pub body: String,
}
