//! Finding types for validation results

use serde::{Deserialize, Serialize};

/// Severity level for findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning - potential issue
    #[default]
    Warning,
    /// Error - definite problem
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(()),
        }
    }
}

/// Which stage of the pipeline produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCategory {
    /// Detection confidence below the fatal threshold
    DetectionAmbiguous,
    /// Detection confidence between the fatal and confident thresholds
    DetectionUncertain,
    /// The parser rejected the content
    Syntax,
    /// Required document shape is missing or malformed
    Structure,
    /// A cross-field semantic constraint is violated
    BusinessRule,
    /// A schema was recognized but no checker is registered for it
    SchemaUnavailable,
    /// Uncategorized
    #[default]
    General,
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingCategory::DetectionAmbiguous => write!(f, "detection-ambiguous"),
            FindingCategory::DetectionUncertain => write!(f, "detection-uncertain"),
            FindingCategory::Syntax => write!(f, "syntax"),
            FindingCategory::Structure => write!(f, "structure"),
            FindingCategory::BusinessRule => write!(f, "business-rule"),
            FindingCategory::SchemaUnavailable => write!(f, "schema-unavailable"),
            FindingCategory::General => write!(f, "general"),
        }
    }
}

/// Curated knowledge-base entry attached to a raw parser failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// Short problem title (e.g., "Trailing comma")
    pub title: String,
    /// Plain-language explanation of what went wrong
    pub explanation: String,
    /// Suggested fix in prose
    pub solution: String,
    /// Minimal example of the broken construct
    pub example_before: String,
    /// The same example, repaired
    pub example_after: String,
    /// Identifier of a mechanical fix in the corrector catalogue, if one exists
    #[serde(default)]
    pub fix_id: Option<String>,
}

impl DiagnosticRecord {
    pub fn new(title: &str, explanation: &str, solution: &str) -> Self {
        Self {
            title: title.to_string(),
            explanation: explanation.to_string(),
            solution: solution.to_string(),
            example_before: String::new(),
            example_after: String::new(),
            fix_id: None,
        }
    }

    pub fn with_example(mut self, before: &str, after: &str) -> Self {
        self.example_before = before.to_string();
        self.example_after = after.to_string();
        self
    }

    pub fn with_fix_id(mut self, fix_id: &str) -> Self {
        self.fix_id = Some(fix_id.to_string());
        self
    }
}

/// One reported issue
///
/// Findings are value objects: built once via the constructors below and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Pipeline stage that produced the finding
    pub category: FindingCategory,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Line number (1-based), if known
    pub line: Option<usize>,
    /// Column number (1-based), if known
    pub column: Option<usize>,
    /// Dotted path into the document (e.g., "min", "Areas[0].Data.Pos")
    pub field: Option<String>,
    /// Suggested remediation in prose
    pub suggestion: Option<String>,
    /// Surrounding content for display (usually the offending source line)
    pub context: Option<String>,
    /// Matched knowledge-base record, if any
    pub diagnostic: Option<DiagnosticRecord>,
}

impl Finding {
    /// Create a new finding
    pub fn new(category: FindingCategory, severity: Severity, message: &str) -> Self {
        Self {
            category,
            severity,
            message: message.to_string(),
            line: None,
            column: None,
            field: None,
            suggestion: None,
            context: None,
            diagnostic: None,
        }
    }

    /// Shorthand for an error finding
    pub fn error(category: FindingCategory, message: &str) -> Self {
        Self::new(category, Severity::Error, message)
    }

    /// Shorthand for a warning finding
    pub fn warning(category: FindingCategory, message: &str) -> Self {
        Self::new(category, Severity::Warning, message)
    }

    /// Shorthand for an info finding
    pub fn info(category: FindingCategory, message: &str) -> Self {
        Self::new(category, Severity::Info, message)
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    pub fn with_diagnostic(mut self, diagnostic: DiagnosticRecord) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("hint".parse::<Severity>(), Ok(Severity::Info));
        assert!("bogus".parse::<Severity>().is_err());
    }

    #[test]
    fn test_finding_builder() {
        let finding = Finding::error(FindingCategory::BusinessRule, "min exceeds nominal")
            .with_line(4)
            .with_field("min")
            .with_suggestion("lower min or raise nominal")
            .with_context("<min>20</min>");

        assert!(finding.is_error());
        assert_eq!(finding.line, Some(4));
        assert_eq!(finding.field.as_deref(), Some("min"));
        assert_eq!(finding.category, FindingCategory::BusinessRule);
    }

    #[test]
    fn test_finding_with_diagnostic() {
        let record = DiagnosticRecord::new("Trailing comma", "a comma precedes the closing brace", "remove it")
            .with_example("{\"a\": 1,}", "{\"a\": 1}")
            .with_fix_id("json-trailing-comma");

        let finding = Finding::error(FindingCategory::Syntax, "parse error")
            .with_diagnostic(record.clone());

        assert_eq!(finding.diagnostic, Some(record));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(format!("{}", FindingCategory::Syntax), "syntax");
        assert_eq!(format!("{}", FindingCategory::BusinessRule), "business-rule");
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
    }
}
