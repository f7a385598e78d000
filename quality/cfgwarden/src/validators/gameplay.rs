//! Checker for gameplay tuning (cfggameplay.json)

use super::json_bom_findings;
use crate::finding::{Finding, FindingCategory};
use crate::validator::{SchemaValidator, ValidationContext};
use schema_detector::Format;
use serde_json::Value;

/// Format version written by the current game release
pub const DEFAULT_FORMAT_VERSION: i64 = 131;

/// Format versions by game release; the file version bumps when the layout
/// changes between releases
const VERSION_BY_RELEASE: &[(&str, i64)] = &[("1.24", 129), ("1.25", 130), ("1.26", 131)];

const KNOWN_SECTIONS: &[&str] = &[
    "version",
    "GeneralData",
    "PlayerData",
    "WorldsData",
    "BaseBuildingData",
    "UIData",
    "MapData",
];

/// GeneralData entries that must be booleans
const GENERAL_FLAGS: &[&str] = &[
    "disableBaseDamage",
    "disableContainerDamage",
    "disableRespawnDialog",
];

pub struct GameplayValidator;

impl GameplayValidator {
    fn expected_version(ctx: &ValidationContext) -> i64 {
        ctx.target_version
            .as_deref()
            .and_then(|release| {
                VERSION_BY_RELEASE
                    .iter()
                    .find(|(r, _)| *r == release)
                    .map(|(_, v)| *v)
            })
            .unwrap_or(DEFAULT_FORMAT_VERSION)
    }
}

impl SchemaValidator for GameplayValidator {
    fn schema(&self) -> &str {
        "cfggameplay"
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

        for key in root.keys() {
            if !KNOWN_SECTIONS.contains(&key.as_str()) {
                findings.push(
                    Finding::warning(
                        FindingCategory::Structure,
                        &format!("unknown top-level section '{}'", key),
                    )
                    .with_field(key),
                );
            }
        }

        match root.get("version") {
            None => findings.push(
                Finding::error(FindingCategory::Structure, "missing required key 'version'")
                    .with_field("version")
                    .with_suggestion("add \"version\": <format version number>"),
            ),
            Some(v) if !v.is_i64() && !v.is_u64() => findings.push(
                Finding::error(
                    FindingCategory::Structure,
                    &format!("'version' must be a whole number, got {}", v),
                )
                .with_field("version"),
            ),
            Some(_) => {}
        }

        for section in ["GeneralData", "PlayerData", "WorldsData"] {
            if let Some(value) = root.get(section) {
                if !value.is_object() {
                    findings.push(
                        Finding::error(
                            FindingCategory::Structure,
                            &format!("'{}' must be an object", section),
                        )
                        .with_field(section),
                    );
                }
            }
        }

        findings
    }

    fn validate_business_rules(&self, content: &str, ctx: &ValidationContext) -> Vec<Finding> {
        let root = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(o)) => o,
            _ => return Vec::new(),
        };

        let mut findings = Vec::new();

        let expected = Self::expected_version(ctx);
        if let Some(version) = root.get("version").and_then(Value::as_i64) {
            if version != expected {
                let target = ctx
                    .target_version
                    .as_deref()
                    .map(|r| format!(" for release {}", r))
                    .unwrap_or_default();
                findings.push(
                    Finding::error(
                        FindingCategory::BusinessRule,
                        &format!(
                            "format version {} does not match the expected {}{}",
                            version, expected, target
                        ),
                    )
                    .with_field("version")
                    .with_suggestion(&format!("set \"version\": {}", expected)),
                );
            }
        }

        if let Some(general) = root.get("GeneralData").and_then(Value::as_object) {
            for flag in GENERAL_FLAGS {
                if let Some(value) = general.get(*flag) {
                    if !value.is_boolean() {
                        findings.push(
                            Finding::error(
                                FindingCategory::BusinessRule,
                                &format!("GeneralData.{} must be true or false, got {}", flag, value),
                            )
                            .with_field(&format!("GeneralData.{}", flag)),
                        );
                    }
                }
            }
        }

        if let Some(player) = root.get("PlayerData").and_then(Value::as_object) {
            if let Some(value) = player.get("disablePersonalLight") {
                if !value.is_boolean() {
                    findings.push(
                        Finding::error(
                            FindingCategory::BusinessRule,
                            &format!("PlayerData.disablePersonalLight must be true or false, got {}", value),
                        )
                        .with_field("PlayerData.disablePersonalLight"),
                    );
                }
            }
        }

        findings
    }
}
