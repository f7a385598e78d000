//! Checker for effect area definitions (cfgeffectarea.json)

use super::json_bom_findings;
use crate::finding::{Finding, FindingCategory};
use crate::validator::{SchemaValidator, ValidationContext};
use schema_detector::Format;
use serde_json::Value;

const KNOWN_AREA_TYPES: &[&str] = &[
    "ContaminatedArea_Static",
    "ContaminatedArea_Dynamic",
    "HotSpringArea",
    "VolcanicArea",
];

/// World positions are [x, y, z]
const POS_LEN: usize = 3;
/// Safe positions are 2D: [x, z]
const SAFE_POS_LEN: usize = 2;

pub struct EffectAreaValidator;

impl SchemaValidator for EffectAreaValidator {
    fn schema(&self) -> &str {
        "cfgeffectarea"
    }

    fn format(&self) -> Format {
        Format::Json
    }

    fn validate_syntax(&self, content: &str, _ctx: &ValidationContext) -> Vec<Finding> {
        json_bom_findings(content)
    }

    fn validate_structure(&self, content: &str, _ctx: &ValidationContext) -> Vec<Finding> {
        let root = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(o)) => o,
            _ => return Vec::new(),
        };

        let mut findings = Vec::new();

        let areas = match root.get("Areas") {
            Some(Value::Array(areas)) => areas,
            Some(other) => {
                findings.push(
                    Finding::error(
                        FindingCategory::Structure,
                        &format!("'Areas' must be an array, got {}", json_kind(other)),
                    )
                    .with_field("Areas"),
                );
                return findings;
            }
            None => return findings,
        };

        for (i, area) in areas.iter().enumerate() {
            let path = format!("Areas[{}]", i);
            let area = match area.as_object() {
                Some(o) => o,
                None => {
                    findings.push(
                        Finding::error(
                            FindingCategory::Structure,
                            &format!("{} must be an object", path),
                        )
                        .with_field(&path),
                    );
                    continue;
                }
            };

            for (key, want_string) in [("AreaName", true), ("Type", true), ("Data", false)] {
                match area.get(key) {
                    None => findings.push(
                        Finding::error(
                            FindingCategory::Structure,
                            &format!("{} is missing required key '{}'", path, key),
                        )
                        .with_field(&format!("{}.{}", path, key)),
                    ),
                    Some(v) if want_string && !v.is_string() => findings.push(
                        Finding::error(
                            FindingCategory::Structure,
                            &format!("{}.{} must be a string", path, key),
                        )
                        .with_field(&format!("{}.{}", path, key)),
                    ),
                    Some(v) if !want_string && !v.is_object() => findings.push(
                        Finding::error(
                            FindingCategory::Structure,
                            &format!("{}.{} must be an object", path, key),
                        )
                        .with_field(&format!("{}.{}", path, key)),
                    ),
                    Some(_) => {}
                }
            }
        }

        if let Some(safe) = root.get("SafePositions") {
            if !safe.is_array() {
                findings.push(
                    Finding::error(FindingCategory::Structure, "'SafePositions' must be an array")
                        .with_field("SafePositions"),
                );
            }
        }

        findings
    }

    fn validate_business_rules(&self, content: &str, _ctx: &ValidationContext) -> Vec<Finding> {
        let root = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(o)) => o,
            _ => return Vec::new(),
        };

        let mut findings = Vec::new();

        if let Some(areas) = root.get("Areas").and_then(Value::as_array) {
            for (i, area) in areas.iter().enumerate() {
                let path = format!("Areas[{}]", i);
                let area = match area.as_object() {
                    Some(o) => o,
                    None => continue,
                };
                let label = area
                    .get("AreaName")
                    .and_then(Value::as_str)
                    .unwrap_or("(unnamed)");

                if let Some(area_type) = area.get("Type").and_then(Value::as_str) {
                    if !KNOWN_AREA_TYPES.contains(&area_type) {
                        findings.push(
                            Finding::warning(
                                FindingCategory::BusinessRule,
                                &format!("area '{}' has unknown type '{}'", label, area_type),
                            )
                            .with_field(&format!("{}.Type", path)),
                        );
                    }
                }

                let data = match area.get("Data").and_then(Value::as_object) {
                    Some(d) => d,
                    None => continue,
                };

                if let Some(pos) = data.get("Pos") {
                    if !is_numeric_array(pos, POS_LEN) {
                        findings.push(
                            Finding::error(
                                FindingCategory::BusinessRule,
                                &format!(
                                    "{}.Data.Pos must be an array of exactly {} numbers",
                                    path, POS_LEN
                                ),
                            )
                            .with_field(&format!("{}.Data.Pos", path))
                            .with_suggestion("use [x, y, z] world coordinates"),
                        );
                    }
                }

                if let Some(radius) = data.get("Radius") {
                    match radius.as_f64() {
                        Some(r) if r > 0.0 => {}
                        _ => findings.push(
                            Finding::error(
                                FindingCategory::BusinessRule,
                                &format!("area '{}' must have a positive Radius", label),
                            )
                            .with_field(&format!("{}.Data.Radius", path)),
                        ),
                    }
                }
            }
        }

        if let Some(positions) = root.get("SafePositions").and_then(Value::as_array) {
            for (j, pos) in positions.iter().enumerate() {
                if !is_numeric_array(pos, SAFE_POS_LEN) {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!(
                                "SafePositions[{}] must be an array of exactly {} numbers",
                                j, SAFE_POS_LEN
                            ),
                        )
                        .with_field(&format!("SafePositions[{}]", j)),
                    );
                }
            }
        }

        findings
    }
}

fn is_numeric_array(value: &Value, len: usize) -> bool {
    value
        .as_array()
        .map(|a| a.len() == len && a.iter().all(Value::is_number))
        .unwrap_or(false)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(content: &str) -> Vec<Finding> {
        EffectAreaValidator.validate_all(content, &ValidationContext::new())
    }

    #[test]
    fn test_clean_area() {
        let content = r#"{
            "Areas": [{
                "AreaName": "Rify",
                "Type": "ContaminatedArea_Static",
                "Data": {"Pos": [9940.0, 0.0, 13460.0], "Radius": 150}
            }],
            "SafePositions": [[420, 9370], [440, 9400]]
        }"#;
        assert!(run(content).is_empty());
    }

    #[test]
    fn test_areas_must_be_array() {
        let findings = run(r#"{"Areas": {}}"#);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_error());
        assert!(findings[0].message.contains("got an object"));
    }

    #[test]
    fn test_missing_required_keys() {
        let findings = run(r#"{"Areas": [{"AreaName": "Rify"}]}"#);
        let fields: Vec<_> = findings.iter().filter_map(|f| f.field.as_deref()).collect();
        assert!(fields.contains(&"Areas[0].Type"));
        assert!(fields.contains(&"Areas[0].Data"));
    }

    #[test]
    fn test_pos_arity_enforced() {
        let content = r#"{"Areas": [{"AreaName": "R", "Type": "ContaminatedArea_Static", "Data": {"Pos": [1, 2]}}]}"#;
        let findings = run(content);
        assert!(findings
            .iter()
            .any(|f| f.is_error() && f.field.as_deref() == Some("Areas[0].Data.Pos")));
    }

    #[test]
    fn test_pos_rejects_non_numbers() {
        let content = r#"{"Areas": [{"AreaName": "R", "Type": "ContaminatedArea_Static", "Data": {"Pos": [1, "2", 3]}}]}"#;
        assert!(run(content).iter().any(|f| f.is_error()));
    }

    #[test]
    fn test_unknown_area_type_warns() {
        let content = r#"{"Areas": [{"AreaName": "R", "Type": "LavaArea", "Data": {}}]}"#;
        let findings = run(content);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_warning());
    }

    #[test]
    fn test_radius_must_be_positive() {
        let content = r#"{"Areas": [{"AreaName": "R", "Type": "HotSpringArea", "Data": {"Radius": 0}}]}"#;
        assert!(run(content).iter().any(|f| f.is_error()));
    }

    #[test]
    fn test_safe_positions_are_pairs() {
        let content = r#"{"Areas": [], "SafePositions": [[1, 2, 3]]}"#;
        let findings = run(content);
        assert!(findings
            .iter()
            .any(|f| f.is_error() && f.field.as_deref() == Some("SafePositions[0]")));
    }

    #[test]
    fn test_degrades_on_garbage() {
        assert!(run("][").is_empty());
    }
}
