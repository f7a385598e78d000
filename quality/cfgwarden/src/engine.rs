//! Core validation engine
//!
//! Orchestrates one validation call as a fixed sequence of phases:
//! classify, syntax check, (on failure: locate + advise + auto-correct),
//! cosmetic formatting, then schema checker dispatch. The engine always
//! returns a [`ValidationResult`]; malformed input is reported through
//! findings, never through an `Err`.
//!
//! The engine holds no cross-call state except the checker resolution
//! cache, which is safe to share across concurrent calls. Cache writes are
//! idempotent, so a race that resolves the same schema twice is benign.

use crate::advisor::ErrorAdvisor;
use crate::config::EngineConfig;
use crate::corrector::AutoCorrector;
use crate::finding::{Finding, FindingCategory};
use crate::format::Formatter;
use crate::locator::ErrorLocator;
use crate::result::ValidationResult;
use crate::validator::{self, SchemaValidator, ValidationContext};
use quick_xml::events::Event;
use quick_xml::Reader;
use schema_detector::{Format, SchemaRegistry};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A raw parser failure, before enrichment
#[derive(Debug, Clone)]
struct SyntaxIssue {
    message: String,
    line: usize,
    column: usize,
}

type CheckerCache = RwLock<HashMap<(Format, String), Option<Arc<dyn SchemaValidator>>>>;

/// The validation engine
///
/// Re-entrant across calls; a single call runs strictly sequentially.
pub struct ValidationEngine {
    config: EngineConfig,
    registry: SchemaRegistry,
    locator: ErrorLocator,
    /// Pedagogy support; absence is an explicit configuration
    advisor: Option<ErrorAdvisor>,
    corrector: Option<AutoCorrector>,
    formatter: Formatter,
    /// Resolution cache; a `None` value caches "unavailable"
    checkers: CheckerCache,
}

impl ValidationEngine {
    /// Create an engine with the built-in registry and full enrichment
    pub fn new(config: EngineConfig) -> Self {
        let formatter = Formatter::new(config.indent);
        Self {
            config,
            registry: SchemaRegistry::builtin(),
            locator: ErrorLocator::new(),
            advisor: Some(ErrorAdvisor::new()),
            corrector: Some(AutoCorrector::new()),
            formatter,
            checkers: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the schema registry
    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Inject a custom locator
    pub fn with_locator(mut self, locator: ErrorLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Inject a custom advisor
    pub fn with_advisor(mut self, advisor: ErrorAdvisor) -> Self {
        self.advisor = Some(advisor);
        self
    }

    /// Inject a custom corrector
    pub fn with_corrector(mut self, corrector: AutoCorrector) -> Self {
        self.corrector = Some(corrector);
        self
    }

    /// Disable diagnostic enrichment and auto-correction entirely
    pub fn without_enrichment(mut self) -> Self {
        self.advisor = None;
        self.corrector = None;
        self
    }

    /// Validate raw content
    pub fn validate(&self, content: &str) -> ValidationResult {
        self.validate_named(content, None)
    }

    /// Validate raw content with a filename hint for the classifier
    pub fn validate_named(&self, content: &str, filename: Option<&str>) -> ValidationResult {
        let classification = self.registry.classify(content, filename);
        log::debug!(
            "classified as {}/{} at {:.2}",
            classification.format,
            classification.schema.as_deref().unwrap_or("-"),
            classification.confidence
        );

        let format = classification.format;
        let confidence = classification.confidence;
        let schema = classification.schema.clone();
        let mut result = ValidationResult::new(classification);

        // Nothing parsed: report the parser failure itself
        if format == Format::Unknown {
            let (probed_format, issue) = probe_syntax(content);
            self.record_syntax_error(&mut result, content, probed_format, issue);
            return result;
        }

        if confidence < self.config.ambiguous_threshold {
            result.push(
                Finding::error(
                    FindingCategory::DetectionAmbiguous,
                    &format!(
                        "detection confidence {:.2} is below the usable threshold {:.2}",
                        confidence, self.config.ambiguous_threshold
                    ),
                )
                .with_suggestion("check that the file is a supported config format"),
            );
            return result;
        }

        if confidence < self.config.confident_threshold {
            result.push(Finding::warning(
                FindingCategory::DetectionUncertain,
                &format!(
                    "uncertain detection (confidence {:.2}); findings may not apply",
                    confidence
                ),
            ));
        }

        // Syntax phase
        let syntax = match format {
            Format::Xml => check_xml_syntax(content),
            Format::Json => check_json_syntax(content),
            Format::Unknown => unreachable!("handled above"),
        };
        if let Err(issue) = syntax {
            self.record_syntax_error(&mut result, content, format, issue);
            return result;
        }

        // Cosmetic formatting; failures are swallowed and never affect validity
        if self.config.pretty_print {
            result.formatted_content = self.formatter.format(content, format).ok();
        }

        // Structure and business phases need a recognized schema
        let Some(schema) = schema else {
            result
                .metadata
                .insert("schema".to_string(), "unrecognized".to_string());
            return result;
        };

        match self.resolve_checker(format, &schema) {
            Some(checker) => {
                let ctx = ValidationContext {
                    target_version: self.config.target_version.clone(),
                };
                result.extend(checker.validate_syntax(content, &ctx));
                result.extend(checker.validate_structure(content, &ctx));
                result.extend(checker.validate_business_rules(content, &ctx));
                result
                    .metadata
                    .insert("checker".to_string(), schema.clone());
            }
            None => {
                result
                    .metadata
                    .insert("checker".to_string(), "unavailable".to_string());
                result.push(Finding::info(
                    FindingCategory::SchemaUnavailable,
                    &format!("no checker registered for schema '{}'", schema),
                ));
            }
        }

        result
    }

    /// Resolve a checker through the cache; failures are cached too
    fn resolve_checker(&self, format: Format, schema: &str) -> Option<Arc<dyn SchemaValidator>> {
        let key = (format, schema.to_string());

        if let Some(cached) = self.checkers.read().unwrap().get(&key) {
            return cached.clone();
        }

        let resolved = validator::resolve(format, schema);
        self.checkers
            .write()
            .unwrap()
            .insert(key, resolved.clone());
        resolved
    }

    /// Record one enriched syntax error and mark the run failed
    fn record_syntax_error(
        &self,
        result: &mut ValidationResult,
        content: &str,
        format: Format,
        issue: SyntaxIssue,
    ) {
        let located = self.locator.locate(content, format, issue.line);

        let mut finding = Finding::error(
            FindingCategory::Syntax,
            &format!("{} syntax error: {}", format.display_name(), issue.message),
        );
        if located.line > 0 {
            finding = finding.with_line(located.line);
        }
        if located.line == issue.line && issue.column > 0 {
            finding = finding.with_column(issue.column);
        }
        if let Some(rationale) = &located.rationale {
            result
                .metadata
                .insert("relocated_from".to_string(), issue.line.to_string());
            result
                .metadata
                .insert("relocation_rationale".to_string(), rationale.clone());
        }
        if let Some(snippet) = context_snippet(content, located.line, self.config.context_lines) {
            finding = finding.with_context(&snippet);
        }

        if let Some(advisor) = &self.advisor {
            if let Some(record) = advisor.match_error(content, &issue.message, format, located.line)
            {
                finding = finding.with_suggestion(&record.solution);

                if let Some(corrector) = &self.corrector {
                    if corrector.can_auto_correct(&record) {
                        let outcome = corrector.apply(content, format);
                        if outcome.has_changes {
                            result.corrected_content = Some(outcome.corrected_content);
                            result.applied_fixes = outcome.applied_fixes;
                        }
                    }
                }

                result.matched_diagnostic = Some(record.clone());
                finding = finding.with_diagnostic(record);
            }
        }

        result.push(finding);
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Lines around a location, for display
fn context_snippet(content: &str, line: usize, context_lines: usize) -> Option<String> {
    if line == 0 {
        return None;
    }
    let lines: Vec<&str> = content.lines().collect();
    if line > lines.len() {
        return None;
    }
    let start = line.saturating_sub(context_lines + 1);
    let end = (line + context_lines).min(lines.len());
    Some(lines[start..end].join("\n"))
}

/// Event-level XML well-formedness check
fn check_xml_syntax(content: &str) -> Result<(), SyntaxIssue> {
    let mut reader = Reader::from_str(content);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = true;

    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let at = |pos: u64| -> (usize, usize) {
        let pos = pos as usize;
        let line = line_starts.partition_point(|&start| start <= pos);
        let col = pos - line_starts.get(line.saturating_sub(1)).unwrap_or(&0) + 1;
        (line, col)
    };
    let last_line = content.lines().count().max(1);

    let mut stack: Vec<(String, usize)> = Vec::new();
    let mut root_closed = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let (line, column) = at(reader.buffer_position());
                if stack.is_empty() && root_closed {
                    return Err(SyntaxIssue {
                        message: format!(
                            "multiple root elements (second root `<{}>`)",
                            String::from_utf8_lossy(e.name().as_ref())
                        ),
                        line,
                        column,
                    });
                }
                for attr in e.attributes() {
                    if let Err(err) = attr {
                        return Err(SyntaxIssue {
                            message: format!("malformed attribute: {}", err),
                            line,
                            column,
                        });
                    }
                }
                stack.push((String::from_utf8_lossy(e.name().as_ref()).into_owned(), line));
            }
            Ok(Event::Empty(e)) => {
                let (line, column) = at(reader.buffer_position());
                if stack.is_empty() && root_closed {
                    return Err(SyntaxIssue {
                        message: format!(
                            "multiple root elements (second root `<{}>`)",
                            String::from_utf8_lossy(e.name().as_ref())
                        ),
                        line,
                        column,
                    });
                }
                for attr in e.attributes() {
                    if let Err(err) = attr {
                        return Err(SyntaxIssue {
                            message: format!("malformed attribute: {}", err),
                            line,
                            column,
                        });
                    }
                }
                if stack.is_empty() {
                    root_closed = true;
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
                if stack.is_empty() {
                    root_closed = true;
                }
            }
            Ok(Event::Text(e)) => {
                if let Err(err) = e.unescape() {
                    let (line, column) = at(reader.buffer_position());
                    return Err(SyntaxIssue {
                        message: format!("invalid entity reference: {}", err),
                        line,
                        column,
                    });
                }
            }
            Ok(Event::Eof) => {
                if let Some((tag, _)) = stack.pop() {
                    // The mistake is higher up; the locator walks back to it
                    return Err(SyntaxIssue {
                        message: format!("unclosed element `<{}>`", tag),
                        line: last_line,
                        column: 1,
                    });
                }
                if !root_closed {
                    return Err(SyntaxIssue {
                        message: "document has no root element".to_string(),
                        line: 1,
                        column: 1,
                    });
                }
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => {
                let (line, column) = at(reader.buffer_position());
                return Err(SyntaxIssue {
                    message: e.to_string(),
                    line,
                    column,
                });
            }
        }
    }
}

/// JSON well-formedness check
fn check_json_syntax(content: &str) -> Result<(), SyntaxIssue> {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(_) => Ok(()),
        Err(e) => Err(SyntaxIssue {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        }),
    }
}

/// Best parser error for content neither parser accepts
fn probe_syntax(content: &str) -> (Format, SyntaxIssue) {
    let checks: [(Format, fn(&str) -> Result<(), SyntaxIssue>); 2] =
        if content.trim_start().starts_with('<') {
            [
                (Format::Xml, check_xml_syntax),
                (Format::Json, check_json_syntax),
            ]
        } else {
            [
                (Format::Json, check_json_syntax),
                (Format::Xml, check_xml_syntax),
            ]
        };

    for (format, check) in checks {
        if let Err(issue) = check(content) {
            return (format, issue);
        }
    }

    (
        Format::Unknown,
        SyntaxIssue {
            message: "content could not be classified as XML or JSON".to_string(),
            line: 0,
            column: 0,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ValidationEngine {
        ValidationEngine::default()
    }

    #[test]
    fn test_empty_types_document_is_valid_with_zero_findings() {
        // <types> with no children classifies at 0.9 and validates clean
        let result = engine().validate("<types></types>");

        assert_eq!(result.classification.format, Format::Xml);
        assert_eq!(result.classification.schema.as_deref(), Some("types"));
        assert_eq!(result.classification.confidence, 0.9);
        assert!(result.valid);
        assert_eq!(result.finding_count(), 0);
    }

    #[test]
    fn test_min_above_nominal_is_one_error_on_min() {
        let content = "<types><type name=\"Ammo\"><nominal>10</nominal><min>20</min><lifetime>3600</lifetime><restock>1800</restock></type></types>";
        let result = engine().validate(content);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field.as_deref(), Some("min"));
        assert_eq!(result.errors[0].category, FindingCategory::BusinessRule);
    }

    #[test]
    fn test_trailing_comma_enrichment_and_autofix() {
        let result = engine().validate_named("{\"version\": 131,}", Some("cfggameplay.json"));

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].category, FindingCategory::Syntax);
        assert_eq!(result.errors[0].line, Some(1));

        let diagnostic = result.matched_diagnostic.as_ref().expect("diagnostic");
        assert_eq!(diagnostic.title, "Trailing comma");

        assert_eq!(result.corrected_content.as_deref(), Some("{\"version\": 131}"));
        assert_eq!(result.applied_fixes, vec!["removed trailing comma"]);

        // syntax failure short-circuits: no structure/business findings
        assert_eq!(result.warnings.len() + result.info.len(), 0);
    }

    #[test]
    fn test_unparseable_content_is_single_syntax_error() {
        let result = engine().validate("not xml, not json");

        assert_eq!(result.classification.confidence, 0.0);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].category, FindingCategory::Syntax);
        assert_eq!(result.warnings.len(), 0);
        assert_eq!(result.info.len(), 0);
    }

    #[test]
    fn test_ambiguous_detection_terminates() {
        // a bare JSON array parses but classifies at 0.3
        let result = engine().validate("[1, 2, 3]");

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].category, FindingCategory::DetectionAmbiguous);
    }

    #[test]
    fn test_uncertain_detection_warns_but_continues() {
        // unrecognized but well-formed XML classifies at 0.5
        let result = engine().validate("<unknownroot><a/></unknownroot>");

        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(
            result.warnings[0].category,
            FindingCategory::DetectionUncertain
        );
        assert_eq!(result.metadata.get("schema").map(String::as_str), Some("unrecognized"));
    }

    #[test]
    fn test_unclosed_tag_relocated_to_opening_line() {
        let content = "<types>\n  <type name=\"Ammo\">\n    <nominal>10</nominal>\n";
        let result = engine().validate(content);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        let finding = &result.errors[0];
        assert!(finding.message.contains("unclosed element"));
        // reported at EOF, relocated to the opening line
        assert_eq!(finding.line, Some(2));
        assert!(result.metadata.contains_key("relocation_rationale"));

        let diagnostic = result.matched_diagnostic.as_ref().expect("diagnostic");
        assert_eq!(diagnostic.title, "Unclosed element");
    }

    #[test]
    fn test_formatted_content_on_success() {
        let result = engine().validate("{\"Areas\": []}");
        let formatted = result.formatted_content.expect("formatted");
        assert!(formatted.contains("\"Areas\""));
        assert!(formatted.contains('\n'));
    }

    #[test]
    fn test_formatting_failure_never_invalidates() {
        // formatting disabled still yields a valid result
        let config = EngineConfig {
            pretty_print: false,
            ..EngineConfig::default()
        };
        let result = ValidationEngine::new(config).validate("<types></types>");
        assert!(result.valid);
        assert!(result.formatted_content.is_none());
    }

    #[test]
    fn test_schema_without_checker_is_informational() {
        let mut registry = SchemaRegistry::builtin();
        registry.register(
            schema_detector::Signature::xml("messages", "messages").with_child("message"),
        );
        let engine = ValidationEngine::default().with_registry(registry);

        let result = engine.validate("<messages><message deadline=\"5\"/></messages>");

        assert!(result.valid);
        assert_eq!(result.info.len(), 1);
        assert_eq!(result.info[0].category, FindingCategory::SchemaUnavailable);
        assert_eq!(result.metadata.get("checker").map(String::as_str), Some("unavailable"));
    }

    #[test]
    fn test_checker_resolution_is_cached() {
        let engine = engine();
        engine.validate("<types></types>");
        engine.validate("<types></types>");

        let cache = engine.checkers.read().unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache
            .get(&(Format::Xml, "types".to_string()))
            .map(|v| v.is_some())
            .unwrap_or(false));
    }

    #[test]
    fn test_unavailable_checker_is_cached_too() {
        let mut registry = SchemaRegistry::builtin();
        registry.register(schema_detector::Signature::xml("messages", "messages"));
        let engine = ValidationEngine::default().with_registry(registry);

        engine.validate("<messages/>");

        let cache = engine.checkers.read().unwrap();
        assert!(matches!(
            cache.get(&(Format::Xml, "messages".to_string())),
            Some(None)
        ));
    }

    #[test]
    fn test_without_enrichment_still_reports_syntax_error() {
        let result = ValidationEngine::default()
            .without_enrichment()
            .validate("{\"version\": 131,}");

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.matched_diagnostic.is_none());
        assert!(result.corrected_content.is_none());
    }

    #[test]
    fn test_corrected_content_revalidates_clean() {
        // auto-fix output must pass the syntax phase it failed
        let engine = engine();
        let broken = engine.validate("{\"version\": 131,}");
        let corrected = broken.corrected_content.expect("corrected");

        let fixed = engine.validate_named(&corrected, Some("cfggameplay.json"));
        assert!(fixed.errors.iter().all(|f| f.category != FindingCategory::Syntax));
    }

    #[test]
    fn test_summary_lines() {
        let engine = engine();
        assert_eq!(engine.validate("<types></types>").summary(), "valid");

        let content = "<types><type name=\"Ammo\"><nominal>1</nominal><min>9</min></type></types>";
        assert_eq!(engine.validate(content).summary(), "1 error(s) in types");
    }

    #[test]
    fn test_mismatched_tags_reported() {
        let result = engine().validate("<types><type></types></type>");
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].category, FindingCategory::Syntax);
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ValidationEngine>();
    }
}
