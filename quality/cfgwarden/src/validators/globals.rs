//! Checker for engine variables (globals.xml)

use super::{elements, line_of, parse_f64, parse_i64, xml_encoding_findings};
use crate::finding::{Finding, FindingCategory};
use crate::validator::{SchemaValidator, ValidationContext};
use schema_detector::Format;

/// Variables the engine actually reads
const KNOWN_VARIABLES: &[&str] = &[
    "AnimalMaxCount",
    "CleanupAvoidance",
    "CleanupLifetimeDeadAnimal",
    "CleanupLifetimeDeadInfected",
    "CleanupLifetimeDeadPlayer",
    "CleanupLifetimeDefault",
    "CleanupLifetimeLimit",
    "CleanupLifetimeRuined",
    "FlagRefreshFrequency",
    "FlagRefreshMaxDuration",
    "IdleModeCountdown",
    "IdleModeStartup",
    "InitialSpawn",
    "LootProxyPlacement",
    "RestartSpawn",
    "SpawnInitial",
    "TimeHopping",
    "TimeLogin",
    "TimeLogout",
    "TimePenalty",
    "WorldWetTempUpdate",
    "ZombieMaxCount",
    "ZoneSpawnDist",
];

/// `type` attribute values: 0 = integer, 1 = float
const TYPE_INT: &str = "0";
const TYPE_FLOAT: &str = "1";

pub struct GlobalsValidator;

impl SchemaValidator for GlobalsValidator {
    fn schema(&self) -> &str {
        "globals"
    }

    fn format(&self) -> Format {
        Format::Xml
    }

    fn validate_syntax(&self, content: &str, _ctx: &ValidationContext) -> Vec<Finding> {
        xml_encoding_findings(content)
    }

    fn validate_structure(&self, content: &str, _ctx: &ValidationContext) -> Vec<Finding> {
        let doc = match roxmltree::Document::parse(content) {
            Ok(d) => d,
            Err(_) => return Vec::new(),
        };
        let root = doc.root_element();
        if root.tag_name().name() != "variables" {
            return Vec::new();
        }

        let mut findings = Vec::new();

        for var in elements(root) {
            if var.tag_name().name() != "var" {
                findings.push(
                    Finding::warning(
                        FindingCategory::Structure,
                        &format!(
                            "unexpected element <{}> under <variables>",
                            var.tag_name().name()
                        ),
                    )
                    .with_line(line_of(&doc, var)),
                );
                continue;
            }

            for attr in ["name", "type", "value"] {
                if var.attribute(attr).is_none() {
                    findings.push(
                        Finding::error(
                            FindingCategory::Structure,
                            &format!(
                                "<var{}> is missing the {} attribute",
                                var.attribute("name")
                                    .map(|n| format!(" name=\"{}\"", n))
                                    .unwrap_or_default(),
                                attr
                            ),
                        )
                        .with_line(line_of(&doc, var))
                        .with_field(attr),
                    );
                }
            }
        }

        findings
    }

    fn validate_business_rules(&self, content: &str, _ctx: &ValidationContext) -> Vec<Finding> {
        let doc = match roxmltree::Document::parse(content) {
            Ok(d) => d,
            Err(_) => return Vec::new(),
        };
        let root = doc.root_element();
        if root.tag_name().name() != "variables" {
            return Vec::new();
        }

        let mut findings = Vec::new();

        for var in elements(root).filter(|e| e.tag_name().name() == "var") {
            let name = match var.attribute("name") {
                Some(n) => n,
                None => continue,
            };
            let line = line_of(&doc, var);

            if !KNOWN_VARIABLES.contains(&name) {
                findings.push(
                    Finding::info(
                        FindingCategory::BusinessRule,
                        &format!("variable '{}' is not read by the engine", name),
                    )
                    .with_line(line)
                    .with_field("name"),
                );
            }

            let (var_type, value) = match (var.attribute("type"), var.attribute("value")) {
                (Some(t), Some(v)) => (t, v),
                _ => continue,
            };

            match var_type {
                TYPE_INT => {
                    if parse_i64(value).is_none() {
                        findings.push(
                            Finding::error(
                                FindingCategory::BusinessRule,
                                &format!(
                                    "variable '{}' is typed integer but its value is '{}'",
                                    name, value
                                ),
                            )
                            .with_line(line)
                            .with_field("value"),
                        );
                    }
                }
                TYPE_FLOAT => {
                    if parse_f64(value).is_none() {
                        findings.push(
                            Finding::error(
                                FindingCategory::BusinessRule,
                                &format!(
                                    "variable '{}' is typed float but its value is '{}'",
                                    name, value
                                ),
                            )
                            .with_line(line)
                            .with_field("value"),
                        );
                    }
                }
                other => {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!(
                                "variable '{}' has unknown type '{}' (expected 0 or 1)",
                                name, other
                            ),
                        )
                        .with_line(line)
                        .with_field("type"),
                    );
                }
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(content: &str) -> Vec<Finding> {
        GlobalsValidator.validate_all(content, &ValidationContext::new())
    }

    #[test]
    fn test_clean_variables() {
        let content = "<variables>\
            <var name=\"TimeLogin\" type=\"0\" value=\"15\"/>\
            <var name=\"CleanupAvoidance\" type=\"1\" value=\"100.5\"/>\
            </variables>";
        assert!(run(content).is_empty());
    }

    #[test]
    fn test_missing_attributes() {
        let findings = run("<variables><var name=\"TimeLogin\"/></variables>");
        let missing: Vec<_> = findings
            .iter()
            .filter(|f| f.is_error())
            .filter_map(|f| f.field.as_deref())
            .collect();
        assert_eq!(missing, vec!["type", "value"]);
    }

    #[test]
    fn test_integer_coercion() {
        let findings =
            run("<variables><var name=\"TimeLogin\" type=\"0\" value=\"soon\"/></variables>");
        assert!(findings.iter().any(|f| f.is_error() && f.field.as_deref() == Some("value")));
    }

    #[test]
    fn test_unknown_type_tag() {
        let findings =
            run("<variables><var name=\"TimeLogin\" type=\"7\" value=\"1\"/></variables>");
        assert!(findings.iter().any(|f| f.is_error() && f.field.as_deref() == Some("type")));
    }

    #[test]
    fn test_unknown_variable_is_informational() {
        let findings =
            run("<variables><var name=\"MadeUpVar\" type=\"0\" value=\"1\"/></variables>");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, crate::finding::Severity::Info);
    }

    #[test]
    fn test_degrades_on_foreign_root() {
        assert!(run("<globals><var/></globals>").is_empty());
    }
}
