//! Checker for item type definitions (types.xml)

use super::{child_text, elements, line_of, parse_i64, xml_encoding_findings};
use crate::finding::{Finding, FindingCategory};
use crate::validator::{SchemaValidator, ValidationContext};
use schema_detector::Format;

/// Children of `<type>` holding integer counts or seconds
const NUMERIC_CHILDREN: &[&str] = &[
    "nominal", "lifetime", "restock", "min", "quantmin", "quantmax", "cost",
];

/// All recognized children of `<type>`
const KNOWN_CHILDREN: &[&str] = &[
    "nominal", "lifetime", "restock", "min", "quantmin", "quantmax", "cost", "flags", "category",
    "usage", "value", "tag",
];

/// Recognized loot category names
const KNOWN_CATEGORIES: &[&str] = &[
    "weapons",
    "explosives",
    "clothes",
    "containers",
    "tools",
    "food",
    "accessories",
    "books",
    "vehiclesparts",
];

pub struct TypesValidator;

impl SchemaValidator for TypesValidator {
    fn schema(&self) -> &str {
        "types"
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
        if root.tag_name().name() != "types" {
            return Vec::new();
        }

        let mut findings = Vec::new();

        // An empty <types/> is structurally legal
        for entry in elements(root) {
            let tag = entry.tag_name().name();
            if tag != "type" {
                findings.push(
                    Finding::warning(
                        FindingCategory::Structure,
                        &format!("unexpected element <{}> under <types>", tag),
                    )
                    .with_line(line_of(&doc, entry)),
                );
                continue;
            }

            let name = entry.attribute("name");
            if name.is_none() {
                findings.push(
                    Finding::error(FindingCategory::Structure, "<type> is missing the name attribute")
                        .with_line(line_of(&doc, entry))
                        .with_field("name")
                        .with_suggestion("add name=\"<classname>\""),
                );
            }
            let label = name.unwrap_or("(unnamed)");

            for child in elements(entry) {
                let child_tag = child.tag_name().name();
                if !KNOWN_CHILDREN.contains(&child_tag) {
                    findings.push(
                        Finding::warning(
                            FindingCategory::Structure,
                            &format!("unknown element <{}> in type '{}'", child_tag, label),
                        )
                        .with_line(line_of(&doc, child))
                        .with_field(child_tag),
                    );
                    continue;
                }

                if NUMERIC_CHILDREN.contains(&child_tag) {
                    let text = child.text().unwrap_or("").trim();
                    if parse_i64(text).is_none() {
                        findings.push(
                            Finding::error(
                                FindingCategory::Structure,
                                &format!(
                                    "<{}> of type '{}' is not a whole number: '{}'",
                                    child_tag, label, text
                                ),
                            )
                            .with_line(line_of(&doc, child))
                            .with_field(child_tag),
                        );
                    }
                }

                // usage/value/category/tag entries carry their payload in a
                // name attribute
                if matches!(child_tag, "usage" | "value" | "category" | "tag")
                    && child.attribute("name").is_none()
                {
                    findings.push(
                        Finding::error(
                            FindingCategory::Structure,
                            &format!("<{}> in type '{}' is missing the name attribute", child_tag, label),
                        )
                        .with_line(line_of(&doc, child))
                        .with_field(child_tag),
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
        if root.tag_name().name() != "types" {
            return Vec::new();
        }

        let mut findings = Vec::new();

        for entry in elements(root).filter(|e| e.tag_name().name() == "type") {
            let label = entry.attribute("name").unwrap_or("(unnamed)");
            let num = |field: &str| child_text(entry, field).and_then(parse_i64);
            let line = |field: &str| {
                super::child_element(entry, field)
                    .map(|n| line_of(&doc, n))
                    .unwrap_or_else(|| line_of(&doc, entry))
            };

            let nominal = num("nominal");
            let min = num("min");

            if let (Some(nominal), Some(min)) = (nominal, min) {
                if min > nominal {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!(
                                "min ({}) exceeds nominal ({}) for type '{}'",
                                min, nominal, label
                            ),
                        )
                        .with_line(line("min"))
                        .with_field("min")
                        .with_suggestion("lower min or raise nominal; the spawner needs min <= nominal"),
                    );
                }
            }

            for field in ["nominal", "min"] {
                if let Some(value) = num(field) {
                    if value < 0 {
                        findings.push(
                            Finding::error(
                                FindingCategory::BusinessRule,
                                &format!("{} must not be negative for type '{}'", field, label),
                            )
                            .with_line(line(field))
                            .with_field(field),
                        );
                    }
                }
            }

            if let Some(lifetime) = num("lifetime") {
                if lifetime <= 0 {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!("lifetime must be positive for type '{}'", label),
                        )
                        .with_line(line("lifetime"))
                        .with_field("lifetime"),
                    );
                }
            }

            if let Some(restock) = num("restock") {
                if restock < 0 {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!("restock must not be negative for type '{}'", label),
                        )
                        .with_line(line("restock"))
                        .with_field("restock"),
                    );
                }
            }

            // quantmin/quantmax use -1 as a paired "not quantized" sentinel
            match (num("quantmin"), num("quantmax")) {
                (Some(qmin), Some(qmax)) => {
                    if (qmin == -1) != (qmax == -1) {
                        findings.push(
                            Finding::warning(
                                FindingCategory::BusinessRule,
                                &format!(
                                    "quantmin and quantmax must both be -1 or both be set for type '{}'",
                                    label
                                ),
                            )
                            .with_line(line("quantmin"))
                            .with_field("quantmin"),
                        );
                    } else if qmin != -1 && qmin > qmax {
                        findings.push(
                            Finding::error(
                                FindingCategory::BusinessRule,
                                &format!(
                                    "quantmin ({}) exceeds quantmax ({}) for type '{}'",
                                    qmin, qmax, label
                                ),
                            )
                            .with_line(line("quantmin"))
                            .with_field("quantmin"),
                        );
                    }
                }
                (Some(_), None) | (None, Some(_)) => {
                    findings.push(
                        Finding::warning(
                            FindingCategory::BusinessRule,
                            &format!("type '{}' sets only one of quantmin/quantmax", label),
                        )
                        .with_line(line("quantmin"))
                        .with_field("quantmin"),
                    );
                }
                (None, None) => {}
            }

            for category in elements(entry).filter(|e| e.tag_name().name() == "category") {
                if let Some(name) = category.attribute("name") {
                    if !KNOWN_CATEGORIES.contains(&name) {
                        findings.push(
                            Finding::warning(
                                FindingCategory::BusinessRule,
                                &format!("unknown category '{}' for type '{}'", name, label),
                            )
                            .with_line(line_of(&doc, category))
                            .with_field("category"),
                        );
                    }
                }
            }
        }

        findings
    }
}
