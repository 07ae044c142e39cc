//! Parsing `git grep` output into search results.

use tracing::debug;

use super::ParseReport;
use crate::storage::{to_title, SearchResult};

/// Parser for `git grep -z` output, keeping only document files.
///
/// Each line is the file path, a NUL byte, then the matching line. Titles may
/// contain `:` so the NUL is the only reliable end of the path.
#[derive(Debug, Clone)]
pub struct GrepParser {
    extension: String,
}

impl GrepParser {
    /// create a parser for documents stored with `extension`
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Parse grep text into results, in the order git printed them.
    pub fn parse(&self, text: &str) -> ParseReport<SearchResult> {
        let mut report = ParseReport::new();

        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match self.parse_line(line) {
                Some(result) => report.records.push(result),
                None => {
                    debug!(line, "skipping unrecognized grep line");
                    report.skipped += 1;
                }
            }
        }

        report
    }

    /// Parse a single `path.ext\0content` line.
    pub fn parse_line(&self, line: &str) -> Option<SearchResult> {
        let (path, content) = line.split_once('\0')?;
        let title = to_title(path, &self.extension)?;

        Some(SearchResult {
            title,
            content: content.to_string(),
        })
    }
}
