//! Recovers the true offending line behind a misleading parser position
//!
//! Structural parsers often report the line where a closing construct was
//! expected rather than the line where the mistake was introduced (an
//! unclosed tag is typically reported at end-of-file). The locator scans
//! backward from the reported line with schema-agnostic heuristics and
//! reports the nearest earlier line whose local structure is inconsistent.

use schema_detector::Format;

/// A relocated error position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedLine {
    /// Best-guess line of the actual mistake (1-based)
    pub line: usize,
    /// Heuristic that justified the relocation; `None` when unchanged
    pub rationale: Option<String>,
}

impl LocatedLine {
    fn unchanged(line: usize) -> Self {
        Self {
            line,
            rationale: None,
        }
    }
}

/// Backward-scanning error line locator
#[derive(Debug, Clone, Default)]
pub struct ErrorLocator;

impl ErrorLocator {
    pub fn new() -> Self {
        Self
    }

    /// Find the nearest line at or before `reported_line` whose local
    /// structure is inconsistent; the reported line itself never counts.
    pub fn locate(&self, content: &str, format: Format, reported_line: usize) -> LocatedLine {
        let lines: Vec<&str> = content.lines().collect();
        if reported_line == 0 || lines.is_empty() {
            return LocatedLine::unchanged(reported_line);
        }
        let reported = reported_line.min(lines.len());

        // Nearest-first: per-line checks on strictly earlier lines
        for n in (1..reported).rev() {
            let line = lines[n - 1];

            if has_unterminated_quote(line) {
                return LocatedLine {
                    line: n,
                    rationale: Some(format!(
                        "line {} has an unterminated quote (quote-balance scan)",
                        n
                    )),
                };
            }

            if format == Format::Xml && has_unbalanced_angle_brackets(line) {
                return LocatedLine {
                    line: n,
                    rationale: Some(format!(
                        "line {} has unbalanced angle brackets (bracket-balance scan)",
                        n
                    )),
                };
            }
        }

        // Whole-prefix check: the innermost tag still open before the
        // reported line is the usual culprit for end-of-file reports
        if format == Format::Xml {
            if let Some((tag, n)) = last_unclosed_tag(&lines[..reported]) {
                if n < reported {
                    return LocatedLine {
                        line: n,
                        rationale: Some(format!(
                            "element `<{}>` opened at line {} is never closed (unbalanced-tag scan)",
                            tag, n
                        )),
                    };
                }
            }
        }

        LocatedLine::unchanged(reported_line)
    }
}

/// Count of unescaped double quotes is odd
fn has_unterminated_quote(line: &str) -> bool {
    let mut count = 0usize;
    let mut escaped = false;
    for c in line.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => {
                count += 1;
                escaped = false;
            }
            _ => escaped = false,
        }
    }
    count % 2 == 1
}

/// `<` and `>` counts disagree on a single line
fn has_unbalanced_angle_brackets(line: &str) -> bool {
    let open = line.chars().filter(|&c| c == '<').count();
    let close = line.chars().filter(|&c| c == '>').count();
    open != close
}

/// Innermost element left open across the given lines, with its line number
fn last_unclosed_tag(lines: &[&str]) -> Option<(String, usize)> {
    let mut stack: Vec<(String, usize)> = Vec::new();
    // An element is also unclosed when an enclosing close tag pops past it
    let mut skipped: Option<(String, usize)> = None;

    for (idx, line) in lines.iter().enumerate() {
        let mut rest = *line;
        while let Some(pos) = rest.find('<') {
            rest = &rest[pos + 1..];

            // Skip declarations and comments
            if rest.starts_with('?') || rest.starts_with('!') {
                continue;
            }

            if let Some(name_rest) = rest.strip_prefix('/') {
                let name = tag_name(name_rest);
                if let Some(at) = stack.iter().rposition(|(open, _)| *open == name) {
                    if at + 1 < stack.len() {
                        skipped = stack.last().cloned();
                    }
                    stack.truncate(at);
                }
                continue;
            }

            let name = tag_name(rest);
            if name.is_empty() {
                continue;
            }

            // Self-closing tags never enter the stack
            let end = rest.find('>').unwrap_or(rest.len());
            if rest[..end].trim_end().ends_with('/') {
                continue;
            }

            stack.push((name, idx + 1));
        }
    }

    match (stack.pop(), skipped) {
        (Some(open), Some(skip)) => Some(if open.1 >= skip.1 { open } else { skip }),
        (open, skip) => open.or(skip),
    }
}

fn tag_name(s: &str) -> String {
    s.chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == '.')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_when_consistent() {
        let content = "<types>\n  <type name=\"Ammo\"/>\n</types>";
        let located = ErrorLocator::new().locate(content, Format::Xml, 3);
        assert_eq!(located.line, 3);
        assert!(located.rationale.is_none());
    }

    #[test]
    fn test_unclosed_tag_relocated_from_eof() {
        let content = "<types>\n  <type name=\"Ammo\">\n    <nominal>10</nominal>\n</types>";
        let located = ErrorLocator::new().locate(content, Format::Xml, 4);
        assert_eq!(located.line, 2);
        assert!(located.rationale.unwrap().contains("type"));
    }

    #[test]
    fn test_unterminated_quote_detected() {
        let content = "<types>\n  <type name=\"Ammo>\n    <nominal>10</nominal>\n  </type>\n</types>";
        let located = ErrorLocator::new().locate(content, Format::Xml, 5);
        assert_eq!(located.line, 2);
        assert!(located.rationale.unwrap().contains("quote"));
    }

    #[test]
    fn test_json_unterminated_quote() {
        let content = "{\n  \"version: 131,\n  \"data\": {}\n}";
        let located = ErrorLocator::new().locate(content, Format::Json, 3);
        assert_eq!(located.line, 2);
    }

    #[test]
    fn test_escaped_quotes_ignored() {
        assert!(!has_unterminated_quote(r#"  "path": "C:\\x\"y\"","#));
        assert!(has_unterminated_quote(r#"  "path": "broken,"#));
    }

    #[test]
    fn test_reported_line_zero_passes_through() {
        let located = ErrorLocator::new().locate("{}", Format::Json, 0);
        assert_eq!(located.line, 0);
        assert!(located.rationale.is_none());
    }

    #[test]
    fn test_self_closing_tags_do_not_stack() {
        let content = "<types>\n  <type name=\"A\"/>\n  <type name=\"B\"/>\n</types>\n<oops>";
        assert_eq!(last_unclosed_tag(&content.lines().collect::<Vec<_>>()),
                   Some(("oops".to_string(), 5)));
    }

    #[test]
    fn test_nearest_inconsistency_wins() {
        // Two broken lines; the scan reports the one closest to the failure
        let content = "<a name=\"x>\n<b name=\"y>\n<c/>\n</root>";
        let located = ErrorLocator::new().locate(content, Format::Xml, 4);
        assert_eq!(located.line, 2);
    }
}
