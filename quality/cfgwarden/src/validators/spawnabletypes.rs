//! Checker for spawn loadout definitions (cfgspawnabletypes.xml)

use super::{elements, line_of, parse_f64, xml_encoding_findings};
use crate::finding::{Finding, FindingCategory};
use crate::validator::{SchemaValidator, ValidationContext};
use schema_detector::Format;

const KNOWN_CHILDREN: &[&str] = &["attachments", "cargo", "hoarder", "damage", "tag"];

pub struct SpawnableTypesValidator;

impl SchemaValidator for SpawnableTypesValidator {
    fn schema(&self) -> &str {
        "spawnabletypes"
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
        if root.tag_name().name() != "spawnabletypes" {
            return Vec::new();
        }

        let mut findings = Vec::new();

        for entry in elements(root) {
            if entry.tag_name().name() != "type" {
                findings.push(
                    Finding::warning(
                        FindingCategory::Structure,
                        &format!(
                            "unexpected element <{}> under <spawnabletypes>",
                            entry.tag_name().name()
                        ),
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
                        .with_field("name"),
                );
            }
            let label = name.unwrap_or("(unnamed)");

            for slot in elements(entry) {
                let tag = slot.tag_name().name();
                if !KNOWN_CHILDREN.contains(&tag) {
                    findings.push(
                        Finding::warning(
                            FindingCategory::Structure,
                            &format!("unknown element <{}> in type '{}'", tag, label),
                        )
                        .with_line(line_of(&doc, slot))
                        .with_field(tag),
                    );
                    continue;
                }

                // loadout slots list their candidates as <item name=...>
                if matches!(tag, "attachments" | "cargo") {
                    for item in elements(slot) {
                        if item.tag_name().name() == "item" && item.attribute("name").is_none() {
                            findings.push(
                                Finding::error(
                                    FindingCategory::Structure,
                                    &format!(
                                        "<item> in <{}> of type '{}' is missing the name attribute",
                                        tag, label
                                    ),
                                )
                                .with_line(line_of(&doc, item))
                                .with_field("name"),
                            );
                        }
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
        if root.tag_name().name() != "spawnabletypes" {
            return Vec::new();
        }

        let mut findings = Vec::new();

        // every chance attribute anywhere in the tree is a probability
        for node in root.descendants().filter(|n| n.is_element()) {
            if let Some(chance) = node.attribute("chance") {
                match parse_f64(chance) {
                    Some(value) if (0.0..=1.0).contains(&value) => {}
                    _ => {
                        findings.push(
                            Finding::error(
                                FindingCategory::BusinessRule,
                                &format!(
                                    "chance '{}' on <{}> is not a probability between 0 and 1",
                                    chance,
                                    node.tag_name().name()
                                ),
                            )
                            .with_line(line_of(&doc, node))
                            .with_field("chance"),
                        );
                    }
                }
            }
        }

        // <damage min max> describes a fraction band
        for damage in root
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "damage")
        {
            let min = damage.attribute("min").and_then(parse_f64);
            let max = damage.attribute("max").and_then(parse_f64);

            for (attr, value) in [("min", min), ("max", max)] {
                if damage.attribute(attr).is_some() && value.is_none() {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!("damage {} is not a number", attr),
                        )
                        .with_line(line_of(&doc, damage))
                        .with_field(attr),
                    );
                }
            }

            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!("damage min ({}) exceeds max ({})", min, max),
                        )
                        .with_line(line_of(&doc, damage))
                        .with_field("min"),
                    );
                }
            }
        }

        findings
    }
}
