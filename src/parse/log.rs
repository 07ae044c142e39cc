//! Parsing `git log` output into revisions.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::ParseReport;
use crate::storage::{Author, Revision};

/// `<short id> <author name> <<email>> <relative time> <subject>`
///
/// Relative times look like "3 days ago" or "2 years, 1 month ago". Commits
/// dated ahead of the local clock show "in the future".
static LOG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<id>[0-9a-f]{4,40}) (?P<name>.*?) <(?P<email>[^<>]*)> (?P<when>\d+ \w+(?:, \d+ \w+)? ago|in the future)(?: (?P<desc>.*))?$",
    )
    .expect("log line pattern is valid")
});

/// Parser for history lines produced with the store's log format.
pub struct LogParser;

impl LogParser {
    /// Parse log text into revisions, preserving line order.
    ///
    /// `title` is left empty; the store fills it in.
    pub fn parse(text: &str) -> ParseReport<Revision> {
        let mut report = ParseReport::new();

        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match Self::parse_line(line) {
                Some(revision) => report.records.push(revision),
                None => {
                    debug!(line, "skipping unrecognized log line");
                    report.skipped += 1;
                }
            }
        }

        report
    }

    /// Parse a single log line.
    pub fn parse_line(line: &str) -> Option<Revision> {
        let caps = LOG_LINE.captures(line)?;
        Some(Revision {
            object_id: caps["id"].to_string(),
            author: Author::new(&caps["name"], &caps["email"]),
            timestamp: caps["when"].to_string(),
            description: caps.name("desc").map_or("", |m| m.as_str()).to_string(),
            title: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let rev = LogParser::parse_line("1a2b3c4 Ada Lovelace <ada@example.com> 3 days ago Fix typo in intro").unwrap();
        assert_eq!(rev.object_id, "1a2b3c4");
        assert_eq!(rev.author, Author::new("Ada Lovelace", "ada@example.com"));
        assert_eq!(rev.timestamp, "3 days ago");
        assert_eq!(rev.description, "Fix typo in intro");
        assert!(rev.title.is_empty());
    }

    #[test]
    fn test_parse_compound_relative_time() {
        let rev = LogParser::parse_line("abcdef0 Bob <bob@x.org> 2 years, 3 months ago Initial import").unwrap();
        assert_eq!(rev.timestamp, "2 years, 3 months ago");
        assert_eq!(rev.description, "Initial import");
    }

    #[test]
    fn test_parse_future_date() {
        let rev = LogParser::parse_line("abcdef0 Bob <bob@x.org> in the future Clock skew").unwrap();
        assert_eq!(rev.timestamp, "in the future");
        assert_eq!(rev.description, "Clock skew");

        let report = LogParser::parse("abcdef0 Bob <bob@x.org> in the future\n1a2b3c4 Bob <bob@x.org> 1 day ago Older");
        assert_eq!(report.records.len(), 2);
        assert!(report.is_lossless());
    }

    #[test]
    fn test_parse_empty_subject() {
        let rev = LogParser::parse_line("abcdef0 Bob <bob@x.org> 1 second ago").unwrap();
        assert_eq!(rev.description, "");
        let rev = LogParser::parse_line("abcdef0 Bob <bob@x.org> 1 second ago ").unwrap();
        assert_eq!(rev.description, "");
    }

    #[test]
    fn test_description_with_brackets() {
        let rev =
            LogParser::parse_line("abcdef0 Bob <bob@x.org> 5 minutes ago Credit Eve <eve@x.org> 1 day ago").unwrap();
        assert_eq!(rev.author.email, "bob@x.org");
        assert_eq!(rev.timestamp, "5 minutes ago");
        assert_eq!(rev.description, "Credit Eve <eve@x.org> 1 day ago");
    }

    #[test]
    fn test_parse_preserves_order_and_counts_skips() {
        let text = "\
9f8e7d6 Carol <carol@x.org> 1 hour ago Third
not a log line

5a4b3c2 Carol <carol@x.org> 2 hours ago Second
1a2b3c4 Dave <dave@x.org> 3 hours ago First";

        let report = LogParser::parse(text);
        let descriptions: Vec<_> = report.records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, ["Third", "Second", "First"]);
        assert_eq!(report.skipped, 1);
        assert!(!report.is_lossless());
    }

    #[test]
    fn test_parse_empty_input() {
        let report = LogParser::parse("");
        assert!(report.records.is_empty());
        assert!(report.is_lossless());
    }

    #[test]
    fn test_malformed_lines_dropped() {
        for line in [
            "1a2b3c4 Ada <ada@example.com> yesterday Fix",
            "zzzzzzz Ada <ada@example.com> 3 days ago Fix",
            "1a2b3c4 Ada ada@example.com 3 days ago Fix",
        ] {
            assert_eq!(LogParser::parse_line(line), None, "{line}");
        }
    }
}
