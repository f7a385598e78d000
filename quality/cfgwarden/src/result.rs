//! Aggregate result of one validation call

use crate::finding::{DiagnosticRecord, Finding, Severity};
use schema_detector::Classification;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of validating one document
///
/// Constructed empty (and valid) at the start of a `validate` call, mutated
/// only within that call, then returned as an immutable snapshot. The
/// invariant `valid == errors.is_empty()` is maintained by [`push`].
///
/// [`push`]: ValidationResult::push
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the document passed validation
    pub valid: bool,

    /// How the document was classified
    pub classification: Classification,

    /// Error findings, in discovery order
    pub errors: Vec<Finding>,

    /// Warning findings, in discovery order
    pub warnings: Vec<Finding>,

    /// Informational findings, in discovery order
    pub info: Vec<Finding>,

    /// Pretty-printed content (best-effort, cosmetic only)
    pub formatted_content: Option<String>,

    /// Content after mechanical auto-fixes, when any applied
    pub corrected_content: Option<String>,

    /// Descriptions of fixes actually applied, in application order
    pub applied_fixes: Vec<String>,

    /// Knowledge-base record matched against a syntax failure
    pub matched_diagnostic: Option<DiagnosticRecord>,

    /// Run details (resolved validator, skipped phases, ...)
    pub metadata: HashMap<String, String>,
}

impl ValidationResult {
    /// Create an empty result for a classified document
    pub fn new(classification: Classification) -> Self {
        Self {
            valid: true,
            classification,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
            formatted_content: None,
            corrected_content: None,
            applied_fixes: Vec::new(),
            matched_diagnostic: None,
            metadata: HashMap::new(),
        }
    }

    /// Record a finding, partitioned by severity
    pub fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => {
                self.valid = false;
                self.errors.push(finding);
            }
            Severity::Warning => self.warnings.push(finding),
            Severity::Info => self.info.push(finding),
        }
    }

    /// Record a batch of findings
    pub fn extend(&mut self, findings: Vec<Finding>) {
        for finding in findings {
            self.push(finding);
        }
    }

    /// Check if there are any error findings
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any warning findings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Total number of findings across all severities
    pub fn finding_count(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }

    /// All findings, errors first, then warnings, then info
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    /// Get exit code (0 = valid, 1 = warnings, 2 = errors)
    pub fn exit_code(&self) -> i32 {
        if !self.errors.is_empty() {
            2
        } else if !self.warnings.is_empty() {
            1
        } else {
            0
        }
    }

    /// One human-readable line describing the outcome
    pub fn summary(&self) -> String {
        let subject = self
            .classification
            .schema
            .as_deref()
            .unwrap_or_else(|| self.classification.format.display_name());

        if !self.valid {
            format!("{} error(s) in {}", self.errors.len(), subject)
        } else if !self.warnings.is_empty() {
            format!("valid, {} warning(s)", self.warnings.len())
        } else {
            "valid".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::FindingCategory;
    use schema_detector::classify;

    fn result_for(content: &str) -> ValidationResult {
        ValidationResult::new(classify(content, None))
    }

    #[test]
    fn test_new_result_is_valid() {
        let result = result_for("<types></types>");
        assert!(result.valid);
        assert_eq!(result.finding_count(), 0);
        assert_eq!(result.exit_code(), 0);
    }

    #[test]
    fn test_push_error_invalidates() {
        let mut result = result_for("<types></types>");
        result.push(Finding::error(FindingCategory::BusinessRule, "bad"));

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.exit_code(), 2);
    }

    #[test]
    fn test_push_warning_keeps_valid() {
        let mut result = result_for("<types></types>");
        result.push(Finding::warning(FindingCategory::DetectionUncertain, "hm"));

        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn test_valid_tracks_errors_only() {
        let mut result = result_for("<types></types>");
        result.push(Finding::warning(FindingCategory::General, "w"));
        result.push(Finding::info(FindingCategory::General, "i"));
        assert_eq!(result.valid, result.errors.is_empty());

        result.push(Finding::error(FindingCategory::General, "e"));
        assert_eq!(result.valid, result.errors.is_empty());
    }

    #[test]
    fn test_summary_error_line() {
        let mut result = result_for("<types></types>");
        result.push(Finding::error(FindingCategory::BusinessRule, "bad"));
        assert_eq!(result.summary(), "1 error(s) in types");
    }

    #[test]
    fn test_summary_valid_with_warnings() {
        let mut result = result_for("<types></types>");
        result.push(Finding::warning(FindingCategory::General, "w"));
        assert_eq!(result.summary(), "valid, 1 warning(s)");
    }

    #[test]
    fn test_summary_clean() {
        assert_eq!(result_for("<types></types>").summary(), "valid");
    }

    #[test]
    fn test_findings_iteration_order() {
        let mut result = result_for("<types></types>");
        result.push(Finding::info(FindingCategory::General, "i"));
        result.push(Finding::error(FindingCategory::General, "e"));
        result.push(Finding::warning(FindingCategory::General, "w"));

        let severities: Vec<_> = result.findings().map(|f| f.severity).collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Warning, Severity::Info]);
    }

    #[test]
    fn test_serializes_to_plain_map() {
        let result = result_for("<types></types>");
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.is_object());
        assert_eq!(value["valid"], serde_json::json!(true));
        assert_eq!(value["classification"]["format"], serde_json::json!("xml"));
    }
}
