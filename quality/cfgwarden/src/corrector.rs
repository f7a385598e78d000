//! Mechanical auto-fixes for known syntax error patterns
//!
//! Only diagnostics whose `fix_id` names a catalogue entry are eligible.
//! Fixes are applied in catalogue declaration order so output is
//! reproducible, and each fix is idempotent: re-applying to already
//! corrected content reports no changes. A fix whose precondition does not
//! hold is skipped and not recorded.
//!
//! A corrected document is only guaranteed to be syntactically repaired for
//! the matched pattern, not semantically correct.

use crate::finding::DiagnosticRecord;
use schema_detector::Format;
use serde::{Deserialize, Serialize};

/// Result of an auto-correction attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    /// Whether any fix changed the content
    pub has_changes: bool,
    /// Content after all applicable fixes
    pub corrected_content: String,
    /// Descriptions of fixes actually applied, in application order
    pub applied_fixes: Vec<String>,
}

/// One entry in the fix catalogue
struct MechanicalFix {
    id: &'static str,
    format: Format,
    description: &'static str,
    /// Returns the rewritten content, or `None` when nothing matched
    apply: fn(&str) -> Option<String>,
}

/// Applies safe mechanical fixes from a fixed catalogue
pub struct AutoCorrector {
    catalogue: Vec<MechanicalFix>,
}

impl AutoCorrector {
    pub fn new() -> Self {
        Self {
            catalogue: vec![
                MechanicalFix {
                    id: "json-trailing-comma",
                    format: Format::Json,
                    description: "removed trailing comma",
                    apply: fix_trailing_commas,
                },
                MechanicalFix {
                    id: "json-smart-quotes",
                    format: Format::Json,
                    description: "replaced curly quotes with straight quotes",
                    apply: fix_smart_quotes,
                },
                MechanicalFix {
                    id: "xml-unescaped-ampersand",
                    format: Format::Xml,
                    description: "escaped bare ampersand",
                    apply: fix_bare_ampersands,
                },
            ],
        }
    }

    /// Whether a matched diagnostic has a mechanical fix in the catalogue
    pub fn can_auto_correct(&self, diagnostic: &DiagnosticRecord) -> bool {
        diagnostic
            .fix_id
            .as_deref()
            .map(|id| self.catalogue.iter().any(|f| f.id == id))
            .unwrap_or(false)
    }

    /// Run every applicable catalogue fix over the content, in order
    pub fn apply(&self, content: &str, format: Format) -> CorrectionOutcome {
        let mut current = content.to_string();
        let mut applied = Vec::new();

        for fix in self.catalogue.iter().filter(|f| f.format == format) {
            if let Some(rewritten) = (fix.apply)(&current) {
                if rewritten != current {
                    current = rewritten;
                    applied.push(fix.description.to_string());
                }
            }
        }

        CorrectionOutcome {
            has_changes: !applied.is_empty(),
            corrected_content: current,
            applied_fixes: applied,
        }
    }
}

impl Default for AutoCorrector {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove commas that directly precede `}` or `]`, outside of strings
fn fix_trailing_commas(content: &str) -> Option<String> {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut changed = false;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if in_string {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => {
                    in_string = false;
                    escaped = false;
                }
                _ => escaped = false,
            }
            out.push(c);
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                // Look ahead past whitespace for a closing bracket
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                    changed = true;
                    // drop the comma, keep the whitespace
                } else {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
        i += 1;
    }

    changed.then_some(out)
}

/// Replace typographic quotes with their straight equivalents
fn fix_smart_quotes(content: &str) -> Option<String> {
    if !content.chars().any(|c| matches!(c, '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}')) {
        return None;
    }
    Some(
        content
            .chars()
            .map(|c| match c {
                '\u{201c}' | '\u{201d}' => '"',
                '\u{2018}' | '\u{2019}' => '\'',
                other => other,
            })
            .collect(),
    )
}

/// Escape `&` characters that do not start a valid entity reference
fn fix_bare_ampersands(content: &str) -> Option<String> {
    let mut out = String::with_capacity(content.len());
    let mut changed = false;
    let mut rest = content;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if starts_with_entity(tail) {
            out.push('&');
            rest = tail;
        } else {
            out.push_str("&amp;");
            changed = true;
            rest = tail;
        }
    }
    out.push_str(rest);

    changed.then_some(out)
}

/// Check for `name;`, `#digits;` or `#xhex;` at the start of the slice
fn starts_with_entity(s: &str) -> bool {
    let semi = match s.find(';') {
        Some(p) if p > 0 && p <= 10 => p,
        _ => return false,
    };
    let body = &s[..semi];

    if let Some(digits) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(digits) = body.strip_prefix('#') {
        return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    }
    body.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_trailing_comma_removed() {
        let corrector = AutoCorrector::new();
        let outcome = corrector.apply("{\"version\": 131,}", Format::Json);

        assert!(outcome.has_changes);
        assert_eq!(outcome.corrected_content, "{\"version\": 131}");
        assert_eq!(outcome.applied_fixes, vec!["removed trailing comma"]);
    }

    #[test]
    fn test_trailing_comma_across_lines() {
        let corrector = AutoCorrector::new();
        let outcome = corrector.apply("{\n  \"a\": [1, 2,\n  ],\n}", Format::Json);
        assert_eq!(outcome.corrected_content, "{\n  \"a\": [1, 2\n  ]\n}");
    }

    #[test]
    fn test_comma_inside_string_untouched() {
        let corrector = AutoCorrector::new();
        let content = r#"{"note": "a,}"}"#;
        let outcome = corrector.apply(content, Format::Json);
        assert!(!outcome.has_changes);
        assert_eq!(outcome.corrected_content, content);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let corrector = AutoCorrector::new();
        let first = corrector.apply("{\"version\": 131,}", Format::Json);
        let second = corrector.apply(&first.corrected_content, Format::Json);

        assert!(!second.has_changes);
        assert_eq!(second.corrected_content, first.corrected_content);
        assert!(second.applied_fixes.is_empty());
    }

    #[test]
    fn test_smart_quotes_replaced() {
        let corrector = AutoCorrector::new();
        let outcome = corrector.apply("{\u{201c}version\u{201d}: 131}", Format::Json);
        assert_eq!(outcome.corrected_content, "{\"version\": 131}");
        assert_eq!(
            outcome.applied_fixes,
            vec!["replaced curly quotes with straight quotes"]
        );
    }

    #[test]
    fn test_bare_ampersand_escaped() {
        let corrector = AutoCorrector::new();
        let outcome = corrector.apply("<usage name=\"Town & Village\"/>", Format::Xml);
        assert_eq!(
            outcome.corrected_content,
            "<usage name=\"Town &amp; Village\"/>"
        );
    }

    #[test]
    fn test_existing_entities_untouched() {
        let corrector = AutoCorrector::new();
        let content = "<a v=\"x &amp; y &#38; z &#x26; w &lt;\"/>";
        let outcome = corrector.apply(content, Format::Xml);
        assert!(!outcome.has_changes);
        assert_eq!(outcome.corrected_content, content);
    }

    #[test]
    fn test_fixes_apply_in_catalogue_order() {
        let corrector = AutoCorrector::new();
        let outcome = corrector.apply("{\u{201c}a\u{201d}: 1,}", Format::Json);
        assert_eq!(
            outcome.applied_fixes,
            vec![
                "removed trailing comma",
                "replaced curly quotes with straight quotes"
            ]
        );
        assert_eq!(outcome.corrected_content, "{\"a\": 1}");
    }

    #[test]
    fn test_format_filters_catalogue() {
        let corrector = AutoCorrector::new();
        // XML fix must not run on JSON content and vice versa
        let outcome = corrector.apply("{\"a\": \"x & y\"}", Format::Json);
        assert!(!outcome.has_changes);
    }

    #[test]
    fn test_can_auto_correct() {
        let corrector = AutoCorrector::new();

        let fixable = DiagnosticRecord::new("t", "e", "s").with_fix_id("json-trailing-comma");
        assert!(corrector.can_auto_correct(&fixable));

        let unknown = DiagnosticRecord::new("t", "e", "s").with_fix_id("no-such-fix");
        assert!(!corrector.can_auto_correct(&unknown));

        let unfixable = DiagnosticRecord::new("t", "e", "s");
        assert!(!corrector.can_auto_correct(&unfixable));
    }

    #[test]
    fn test_entity_detection() {
        assert!(starts_with_entity("amp; rest"));
        assert!(starts_with_entity("#38;"));
        assert!(starts_with_entity("#x26;"));
        assert!(!starts_with_entity(" amp;"));
        assert!(!starts_with_entity("nosemicolon"));
        assert!(!starts_with_entity("#xZZ;"));
        assert!(!starts_with_entity(""));
    }
}
