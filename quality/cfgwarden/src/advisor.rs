//! Curated diagnostics for raw parser failures
//!
//! Maps a raw parser error (plus nearby content) to a knowledge-base record
//! with a plain-language explanation, a suggested fix and a before/after
//! example. Matching is pattern-based, not exact-string: entries are scanned
//! in registration order and the first whose predicate holds wins. No match
//! is a normal outcome.

use crate::finding::DiagnosticRecord;
use regex::Regex;
use schema_detector::Format;

/// Lines of content on each side of the error line fed to content predicates
const CONTENT_WINDOW: usize = 2;

/// One knowledge-base entry
struct KnownIssue {
    format: Format,
    /// Lowercase substrings; any one must occur in the raw error message
    message_patterns: Vec<&'static str>,
    /// Optional predicate over the content window around the error line
    content_pattern: Option<Regex>,
    record: DiagnosticRecord,
}

impl KnownIssue {
    fn matches(&self, raw_error: &str, window: &str, format: Format) -> bool {
        if self.format != format {
            return false;
        }

        let lowered = raw_error.to_lowercase();
        if !self.message_patterns.iter().any(|p| lowered.contains(p)) {
            return false;
        }

        match &self.content_pattern {
            Some(re) => re.is_match(window),
            None => true,
        }
    }
}

/// Pattern-matched advisor over a curated knowledge base
pub struct ErrorAdvisor {
    issues: Vec<KnownIssue>,
}

impl ErrorAdvisor {
    /// Advisor pre-loaded with the curated knowledge base
    pub fn new() -> Self {
        Self {
            issues: knowledge_base(),
        }
    }

    /// Match a raw parser failure against the knowledge base
    ///
    /// `line` is the (possibly relocated) error line used to cut the content
    /// window; 0 means unknown and yields an empty window.
    pub fn match_error(
        &self,
        content: &str,
        raw_error: &str,
        format: Format,
        line: usize,
    ) -> Option<DiagnosticRecord> {
        let window = content_window(content, line);

        self.issues
            .iter()
            .find(|issue| issue.matches(raw_error, &window, format))
            .map(|issue| issue.record.clone())
    }

    /// Number of registered knowledge-base entries
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Default for ErrorAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

fn content_window(content: &str, line: usize) -> String {
    if line == 0 {
        return String::new();
    }
    let lines: Vec<&str> = content.lines().collect();
    let start = line.saturating_sub(CONTENT_WINDOW + 1);
    let end = (line + CONTENT_WINDOW).min(lines.len());
    if start >= end {
        return String::new();
    }
    lines[start..end].join("\n")
}

/// The curated knowledge base, in matching priority order
fn knowledge_base() -> Vec<KnownIssue> {
    vec![
        // --- JSON ---
        KnownIssue {
            format: Format::Json,
            message_patterns: vec!["trailing comma"],
            content_pattern: None,
            record: DiagnosticRecord::new(
                "Trailing comma",
                "A comma sits directly before a closing `}` or `]`. JSON does not allow a comma after the last entry.",
                "Delete the comma after the last entry.",
            )
            .with_example(r#"{"version": 131,}"#, r#"{"version": 131}"#)
            .with_fix_id("json-trailing-comma"),
        },
        KnownIssue {
            format: Format::Json,
            message_patterns: vec!["expected `,`", "expected \",\""],
            content_pattern: None,
            record: DiagnosticRecord::new(
                "Missing comma",
                "Two entries follow each other without a separating comma, or a closing bracket is missing where the parser expected one.",
                "Add a comma between the entries, or close the open object/array.",
            )
            .with_example(
                "{\"nominal\": 10\n \"min\": 5}",
                "{\"nominal\": 10,\n \"min\": 5}",
            ),
        },
        KnownIssue {
            format: Format::Json,
            message_patterns: vec!["key must be a string"],
            content_pattern: None,
            record: DiagnosticRecord::new(
                "Unquoted key",
                "Object keys must be double-quoted strings. Bare or single-quoted keys are not valid JSON.",
                "Wrap the key in double quotes.",
            )
            .with_example(r#"{version: 131}"#, r#"{"version": 131}"#),
        },
        KnownIssue {
            format: Format::Json,
            message_patterns: vec!["expected value"],
            content_pattern: Some(Regex::new("[\u{201c}\u{201d}\u{2018}\u{2019}]").unwrap()),
            record: DiagnosticRecord::new(
                "Curly quotes",
                "The content contains typographic (curly) quotes, usually pasted from a word processor. JSON only accepts straight double quotes.",
                "Replace curly quotes with straight ones.",
            )
            .with_example("{\u{201c}version\u{201d}: 131}", r#"{"version": 131}"#)
            .with_fix_id("json-smart-quotes"),
        },
        KnownIssue {
            format: Format::Json,
            message_patterns: vec!["expected value"],
            content_pattern: Some(Regex::new(r"(^|\s)//").unwrap()),
            record: DiagnosticRecord::new(
                "Comment in JSON",
                "JSON has no comment syntax; `//` starts an invalid token.",
                "Remove the comment line.",
            )
            .with_example(
                "{\n  // spawn settings\n  \"nominal\": 10\n}",
                "{\n  \"nominal\": 10\n}",
            ),
        },
        KnownIssue {
            format: Format::Json,
            message_patterns: vec!["expected value"],
            content_pattern: Some(Regex::new(r"'[^']*'").unwrap()),
            record: DiagnosticRecord::new(
                "Single-quoted string",
                "Strings must use double quotes; single quotes are not valid JSON.",
                "Replace the single quotes with double quotes.",
            )
            .with_example(r#"{"Type": 'Static'}"#, r#"{"Type": "Static"}"#),
        },
        KnownIssue {
            format: Format::Json,
            message_patterns: vec!["eof while parsing a string"],
            content_pattern: None,
            record: DiagnosticRecord::new(
                "Unterminated string",
                "A string is opened with a double quote but never closed before the file ends.",
                "Add the missing closing quote.",
            )
            .with_example(r#"{"AreaName": "Rify}"#, r#"{"AreaName": "Rify"}"#),
        },
        KnownIssue {
            format: Format::Json,
            message_patterns: vec![
                "eof while parsing an object",
                "eof while parsing a list",
                "eof while parsing a value",
            ],
            content_pattern: None,
            record: DiagnosticRecord::new(
                "Missing closing bracket",
                "An object or array is opened but the file ends before it is closed.",
                "Add the missing `}` or `]`.",
            )
            .with_example(r#"{"Areas": ["#, r#"{"Areas": []}"#),
        },
        // --- XML ---
        KnownIssue {
            format: Format::Xml,
            message_patterns: vec!["unclosed element"],
            content_pattern: None,
            record: DiagnosticRecord::new(
                "Unclosed element",
                "An element is opened but never closed. The parser only notices at the end of the enclosing element or file, so the reported position is usually far below the mistake.",
                "Close the element, or make it self-closing with `/>`.",
            )
            .with_example(
                "<types>\n  <type name=\"Ammo\">\n</types>",
                "<types>\n  <type name=\"Ammo\"/>\n</types>",
            ),
        },
        KnownIssue {
            format: Format::Xml,
            message_patterns: vec!["expecting </", "expected `</", "mismatch"],
            content_pattern: None,
            record: DiagnosticRecord::new(
                "Mismatched closing tag",
                "A closing tag does not match the element that is currently open. Tags must close in the reverse order they were opened.",
                "Close the inner element before the outer one.",
            )
            .with_example(
                "<type><nominal>10</type></nominal>",
                "<type><nominal>10</nominal></type>",
            ),
        },
        KnownIssue {
            format: Format::Xml,
            message_patterns: vec!["invalid entity reference"],
            content_pattern: None,
            record: DiagnosticRecord::new(
                "Unescaped ampersand",
                "A bare `&` starts an entity reference in XML. Literal ampersands must be written as `&amp;`.",
                "Replace `&` with `&amp;`.",
            )
            .with_example(
                "<usage name=\"Town & Village\"/>",
                "<usage name=\"Town &amp; Village\"/>",
            )
            .with_fix_id("xml-unescaped-ampersand"),
        },
        KnownIssue {
            format: Format::Xml,
            message_patterns: vec!["malformed attribute"],
            content_pattern: None,
            record: DiagnosticRecord::new(
                "Malformed attribute",
                "An attribute value is missing its quotes, or the quotes are unbalanced.",
                "Wrap the attribute value in double quotes.",
            )
            .with_example(r#"<type name=Ammo>"#, r#"<type name="Ammo">"#),
        },
        KnownIssue {
            format: Format::Xml,
            message_patterns: vec!["multiple root elements"],
            content_pattern: None,
            record: DiagnosticRecord::new(
                "Multiple root elements",
                "An XML document must have exactly one root element; a second top-level element follows the first.",
                "Wrap the elements in a single root, or remove the extra one.",
            )
            .with_example(
                "<types/>\n<types/>",
                "<types>\n  ...\n</types>",
            ),
        },
    ]
}
