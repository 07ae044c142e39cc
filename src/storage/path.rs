//! Mapping between document titles and files in the working tree.
//!
//! A title like `guides/setup` lives at `guides/setup.md` (for the `md`
//! extension). Every `/` in a title is a directory separator relative to the
//! root of the working tree.

use std::fmt;
use std::path::PathBuf;

/// A validated document title.
///
/// Titles are restricted so the mapped path always stays inside the working
/// tree:
/// - not empty
/// - no leading `/`, no empty, `.` or `..` segments
/// - no backslashes or NUL bytes
/// - no segment can be `.git`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentTitle(String);

impl DocumentTitle {
    /// create a new DocumentTitle, validating the input
    pub fn new(title: impl Into<String>) -> Result<Self, InvalidTitleError> {
        let title = title.into();
        Self::validate(&title)?;
        Ok(Self(title))
    }

    fn validate(title: &str) -> Result<(), InvalidTitleError> {
        if title.is_empty() {
            return Err(InvalidTitleError::Empty);
        }

        for (i, c) in title.chars().enumerate() {
            if c == '\\' || c == '\0' {
                return Err(InvalidTitleError::InvalidCharacter { char: c, position: i });
            }
        }

        for segment in title.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(InvalidTitleError::InvalidSegment(title.to_string()));
            }
            if segment.eq_ignore_ascii_case(".git") {
                return Err(InvalidTitleError::Reserved(segment.to_string()));
            }
        }

        Ok(())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// the relative path of this document inside the working tree
    pub fn to_path(&self, extension: &str) -> String {
        to_path(&self.0, extension)
    }

    /// the relative path as a PathBuf, for filesystem operations
    pub fn to_path_buf(&self, extension: &str) -> PathBuf {
        self.to_path(extension).split('/').collect()
    }
}

impl fmt::Display for DocumentTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DocumentTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Join a title and extension into a working tree path (`/`-separated).
pub fn to_path(title: &str, extension: &str) -> String {
    format!("{}.{}", title, extension)
}

/// Recover a title from a working tree path.
///
/// Returns `None` unless the path ends with exactly `.{extension}` and
/// something precedes it.
pub fn to_title(path: &str, extension: &str) -> Option<String> {
    let title = path.strip_suffix(extension)?.strip_suffix('.')?;
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// error type for titles that cannot be mapped to a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidTitleError {
    Empty,
    InvalidCharacter { char: char, position: usize },
    InvalidSegment(String),
    Reserved(String),
}

impl fmt::Display for InvalidTitleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "title cannot be empty"),
            Self::InvalidCharacter { char, position } => {
                write!(f, "invalid character {:?} at position {}", char, position)
            }
            Self::InvalidSegment(title) => write!(f, "invalid path segment in '{}'", title),
            Self::Reserved(name) => write!(f, "'{}' is a reserved name", name),
        }
    }
}

impl std::error::Error for InvalidTitleError {}
