//! Parsers for the line-oriented text git prints.
//!
//! Both parsers are best-effort: a line that does not have the expected shape
//! is skipped, and the number of skipped lines is reported alongside the
//! records so callers can log it.

mod grep;
mod log;

pub use grep::GrepParser;
pub use log::LogParser;

/// Records extracted from tool output, plus how many lines were unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport<T> {
    pub records: Vec<T>,
    /// non-empty lines that did not match the expected shape
    pub skipped: usize,
}

impl<T> ParseReport<T> {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
        }
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    pub fn is_lossless(&self) -> bool {
        self.skipped == 0
    }
}

impl<T> Default for ParseReport<T> {
    fn default() -> Self {
        Self::new()
    }
}
