//! Output formatters for validation results

use crate::finding::{Finding, Severity};
use crate::result::ValidationResult;
use colored::*;

/// Output formatter trait
pub trait OutputFormatter: Send + Sync {
    /// Format the entire validation result
    fn format(&self, result: &ValidationResult, source: &str) -> String;
}

/// Human-readable text output formatter
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show finding context snippets
    pub show_context: bool,

    /// Show suggestions and diagnostics
    pub show_help: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_context: true,
            show_help: true,
        }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn severity_str(&self, severity: Severity) -> ColoredString {
        let s = format!("{}", severity);
        if !self.colored {
            return s.normal();
        }
        match severity {
            Severity::Error => s.red().bold(),
            Severity::Warning => s.yellow().bold(),
            Severity::Info => s.blue(),
        }
    }

    fn format_finding(&self, source: &str, finding: &Finding) -> String {
        let mut output = String::new();

        let location = match (finding.line, finding.column) {
            (Some(line), Some(column)) => format!("{}:{}:{}: ", source, line, column),
            (Some(line), None) => format!("{}:{}: ", source, line),
            _ => format!("{}: ", source),
        };

        output.push_str(&format!(
            "{}{}: {}",
            location,
            self.severity_str(finding.severity),
            finding.message
        ));

        if let Some(field) = &finding.field {
            output.push_str(&format!(" [{}]", field));
        }
        output.push('\n');

        if self.show_context {
            if let Some(context) = &finding.context {
                for line in context.lines() {
                    output.push_str(&format!("    | {}\n", line));
                }
            }
        }

        if self.show_help {
            if let Some(suggestion) = &finding.suggestion {
                let label = if self.colored {
                    "help".cyan().to_string()
                } else {
                    "help".to_string()
                };
                output.push_str(&format!("    {}: {}\n", label, suggestion));
            }

            if let Some(diagnostic) = &finding.diagnostic {
                output.push_str(&format!("    = {}: {}\n", diagnostic.title, diagnostic.explanation));
                if !diagnostic.example_before.is_empty() {
                    output.push_str(&format!(
                        "      before: {}\n      after:  {}\n",
                        diagnostic.example_before.replace('\n', " "),
                        diagnostic.example_after.replace('\n', " ")
                    ));
                }
            }
        }

        output
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &ValidationResult, source: &str) -> String {
        let mut output = String::new();

        for finding in result.findings() {
            output.push_str(&self.format_finding(source, finding));
        }

        if !result.applied_fixes.is_empty() {
            output.push_str(&format!(
                "    auto-fix available: {}\n",
                result.applied_fixes.join(", ")
            ));
        }

        let summary = result.summary();
        let summary = if !self.colored {
            summary.normal()
        } else if result.valid {
            summary.green()
        } else {
            summary.red()
        };
        output.push_str(&format!("{}: {}\n", source, summary));

        output
    }
}

/// JSON output formatter (full result serialization)
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty-print the JSON output
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &ValidationResult, source: &str) -> String {
        let mut value = match serde_json::to_value(result) {
            Ok(v) => v,
            Err(e) => return format!("{{\"error\": \"{}\"}}", e),
        };
        if let Some(map) = value.as_object_mut() {
            map.insert("source".to_string(), serde_json::Value::from(source));
            map.insert(
                "summary".to_string(),
                serde_json::Value::from(result.summary()),
            );
        }

        let serialized = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        serialized.unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ValidationEngine;

    #[test]
    fn test_text_formatter_clean_file() {
        let result = ValidationEngine::default().validate("<types></types>");
        let text = TextFormatter::new().without_color().format(&result, "types.xml");
        assert_eq!(text, "types.xml: valid\n");
    }

    #[test]
    fn test_text_formatter_error_line() {
        let content = "<types><type name=\"Ammo\"><nominal>1</nominal><min>5</min></type></types>";
        let result = ValidationEngine::default().validate(content);
        let text = TextFormatter::new().without_color().format(&result, "types.xml");

        assert!(text.contains("error: min (5) exceeds nominal (1)"));
        assert!(text.contains("[min]"));
        assert!(text.ends_with("types.xml: 1 error(s) in types\n"));
    }

    #[test]
    fn test_json_formatter_roundtrip() {
        let result = ValidationEngine::default().validate("{\"version\": 131,}");
        let json = JsonFormatter::new().format(&result, "cfggameplay.json");

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["valid"], serde_json::json!(false));
        assert_eq!(value["source"], serde_json::json!("cfggameplay.json"));
        assert!(value["errors"].as_array().unwrap().len() == 1);
    }
}
