//! Checker for dynamic event definitions (events.xml)

use super::{child_text, elements, line_of, parse_i64, xml_encoding_findings};
use crate::finding::{Finding, FindingCategory};
use crate::validator::{SchemaValidator, ValidationContext};
use schema_detector::Format;

const NUMERIC_CHILDREN: &[&str] = &[
    "nominal",
    "min",
    "max",
    "lifetime",
    "restock",
    "saferadius",
    "distanceradius",
    "cleanupradius",
];

const KNOWN_CHILDREN: &[&str] = &[
    "nominal",
    "min",
    "max",
    "lifetime",
    "restock",
    "saferadius",
    "distanceradius",
    "cleanupradius",
    "secondary",
    "flags",
    "position",
    "limit",
    "active",
    "children",
];

/// Event names start with a prefix naming the spawner that owns them
const NAME_PREFIXES: &[&str] = &[
    "Ambient",
    "Animal",
    "Infected",
    "Item",
    "Loot",
    "Static",
    "Trajectory",
    "Vehicle",
];

pub struct EventsValidator;

impl SchemaValidator for EventsValidator {
    fn schema(&self) -> &str {
        "events"
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
        if root.tag_name().name() != "events" {
            return Vec::new();
        }

        let mut findings = Vec::new();

        for event in elements(root) {
            if event.tag_name().name() != "event" {
                findings.push(
                    Finding::warning(
                        FindingCategory::Structure,
                        &format!(
                            "unexpected element <{}> under <events>",
                            event.tag_name().name()
                        ),
                    )
                    .with_line(line_of(&doc, event)),
                );
                continue;
            }

            let name = event.attribute("name");
            if name.is_none() {
                findings.push(
                    Finding::error(FindingCategory::Structure, "<event> is missing the name attribute")
                        .with_line(line_of(&doc, event))
                        .with_field("name"),
                );
            }
            let label = name.unwrap_or("(unnamed)");

            for child in elements(event) {
                let tag = child.tag_name().name();
                if !KNOWN_CHILDREN.contains(&tag) {
                    findings.push(
                        Finding::warning(
                            FindingCategory::Structure,
                            &format!("unknown element <{}> in event '{}'", tag, label),
                        )
                        .with_line(line_of(&doc, child))
                        .with_field(tag),
                    );
                } else if NUMERIC_CHILDREN.contains(&tag) {
                    let text = child.text().unwrap_or("").trim();
                    if parse_i64(text).is_none() {
                        findings.push(
                            Finding::error(
                                FindingCategory::Structure,
                                &format!(
                                    "<{}> of event '{}' is not a whole number: '{}'",
                                    tag, label, text
                                ),
                            )
                            .with_line(line_of(&doc, child))
                            .with_field(tag),
                        );
                    }
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
        if root.tag_name().name() != "events" {
            return Vec::new();
        }

        let mut findings = Vec::new();

        for event in elements(root).filter(|e| e.tag_name().name() == "event") {
            let label = event.attribute("name").unwrap_or("(unnamed)");
            let num = |field: &str| child_text(event, field).and_then(parse_i64);
            let line = |field: &str| {
                super::child_element(event, field)
                    .map(|n| line_of(&doc, n))
                    .unwrap_or_else(|| line_of(&doc, event))
            };

            if let Some(name) = event.attribute("name") {
                if !NAME_PREFIXES.iter().any(|p| name.starts_with(p)) {
                    findings.push(
                        Finding::warning(
                            FindingCategory::BusinessRule,
                            &format!(
                                "event name '{}' does not start with a known spawner prefix",
                                name
                            ),
                        )
                        .with_line(line_of(&doc, event))
                        .with_field("name")
                        .with_suggestion("prefix the name with Animal/Infected/Item/Loot/Static/Vehicle"),
                    );
                }
            }

            if let (Some(nominal), Some(min)) = (num("nominal"), num("min")) {
                if min > nominal {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!(
                                "min ({}) exceeds nominal ({}) for event '{}'",
                                min, nominal, label
                            ),
                        )
                        .with_line(line("min"))
                        .with_field("min"),
                    );
                }
            }

            if let (Some(nominal), Some(max)) = (num("nominal"), num("max")) {
                if max != 0 && nominal > max {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!(
                                "nominal ({}) exceeds max ({}) for event '{}'",
                                nominal, max, label
                            ),
                        )
                        .with_line(line("nominal"))
                        .with_field("nominal"),
                    );
                }
            }

            for field in ["saferadius", "distanceradius", "cleanupradius"] {
                if let Some(value) = num(field) {
                    // -1 disables a radius
                    if value < -1 {
                        findings.push(
                            Finding::error(
                                FindingCategory::BusinessRule,
                                &format!("{} must be -1 or non-negative for event '{}'", field, label),
                            )
                            .with_line(line(field))
                            .with_field(field),
                        );
                    }
                }
            }

            if let Some(active) = child_text(event, "active") {
                if !matches!(active, "0" | "1") {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!("active must be 0 or 1 for event '{}', got '{}'", label, active),
                        )
                        .with_line(line("active"))
                        .with_field("active"),
                    );
                }
            }
        }

        findings
    }
}
