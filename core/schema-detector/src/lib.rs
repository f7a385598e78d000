//! Content-based format and schema detection for economy config files
//!
//! Classifies raw file content into (format, schema, confidence) using
//! structural signatures rather than filenames:
//! - XML: root tag, expected immediate children, required child attributes
//! - JSON: designated root keys and their required sub-fields
//! - Optional filename hint as a small confidence bonus
//!
//! # Example
//!
//! ```
//! use schema_detector::{classify, Format};
//!
//! let result = classify("<types><type name=\"Ammo_9x19\"/></types>", None);
//! assert_eq!(result.format, Format::Xml);
//! assert_eq!(result.schema.as_deref(), Some("types"));
//! assert_eq!(result.confidence, 1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Confidence when root tag/key, expected child and required attribute all match
pub const CONFIDENCE_EXACT: f64 = 1.0;
/// Confidence when root and expected child match but the required attribute is absent
pub const CONFIDENCE_SHAPE: f64 = 0.95;
/// Confidence when only the root tag matches
pub const CONFIDENCE_ROOT: f64 = 0.9;
/// Confidence when a JSON root key's value carries some (not all) required sub-fields
pub const CONFIDENCE_PARTIAL_FIELDS: f64 = 0.85;
/// Confidence when only a JSON root key is present
pub const CONFIDENCE_ROOT_KEY: f64 = 0.8;
/// Confidence for parseable content matching no registered signature
pub const CONFIDENCE_UNRECOGNIZED: f64 = 0.5;
/// Confidence for parseable JSON that is not an object
pub const CONFIDENCE_NOT_OBJECT: f64 = 0.3;
/// Confidence for content that fails to parse
pub const CONFIDENCE_UNPARSEABLE: f64 = 0.0;
/// Bonus added when the supplied filename contains the schema name
pub const FILENAME_BONUS: f64 = 0.05;

/// Top-level syntax family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Xml,
    Json,
    /// Content that neither parser accepts
    #[default]
    Unknown,
}

impl Format {
    /// Get the format name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Unknown => "unknown",
        }
    }

    /// Get display name for the format
    pub fn display_name(&self) -> &'static str {
        match self {
            Format::Xml => "XML",
            Format::Json => "JSON",
            Format::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural fingerprint used to recognize one schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    /// Schema identifier (e.g., "types", "cfggameplay")
    pub schema: String,
    /// Format this signature applies to
    pub format: Format,
    /// Human-readable description of the schema
    #[serde(default)]
    pub description: String,
    /// Expected XML root tag
    #[serde(default)]
    pub root_tag: Option<String>,
    /// Expected immediate-child tag under the root
    #[serde(default)]
    pub child_tag: Option<String>,
    /// Required attribute on the expected child
    #[serde(default)]
    pub child_attribute: Option<String>,
    /// Designated JSON root keys (any one suffices)
    #[serde(default)]
    pub root_keys: Vec<String>,
    /// Required sub-fields of a matched root key's value
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl Signature {
    /// Create an XML signature keyed by root tag
    pub fn xml(schema: impl Into<String>, root_tag: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            format: Format::Xml,
            description: String::new(),
            root_tag: Some(root_tag.into()),
            child_tag: None,
            child_attribute: None,
            root_keys: Vec::new(),
            required_fields: Vec::new(),
        }
    }

    /// Create a JSON signature keyed by root keys
    pub fn json(schema: impl Into<String>, root_keys: &[&str]) -> Self {
        Self {
            schema: schema.into(),
            format: Format::Json,
            description: String::new(),
            root_tag: None,
            child_tag: None,
            child_attribute: None,
            root_keys: root_keys.iter().map(|s| s.to_string()).collect(),
            required_fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_child(mut self, tag: impl Into<String>) -> Self {
        self.child_tag = Some(tag.into());
        self
    }

    pub fn with_child_attribute(mut self, attr: impl Into<String>) -> Self {
        self.child_attribute = Some(attr.into());
        self
    }

    pub fn with_required_fields(mut self, fields: &[&str]) -> Self {
        self.required_fields = fields.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Classification result with confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    /// Detected format
    pub format: Format,
    /// Detected schema identifier, if any
    pub schema: Option<String>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Human-readable description of what was detected
    pub description: String,
    /// Detection details (matched tiers, filename bonus, root tag)
    pub metadata: HashMap<String, String>,
}

impl Classification {
    fn new(format: Format, confidence: f64, description: &str) -> Self {
        Self {
            format,
            schema: None,
            confidence,
            description: description.to_string(),
            metadata: HashMap::new(),
        }
    }

    fn unparseable() -> Self {
        Self::new(
            Format::Unknown,
            CONFIDENCE_UNPARSEABLE,
            "content does not parse as XML or JSON",
        )
    }

    /// Whether the detection is confident enough to skip a warning
    pub fn is_confident(&self) -> bool {
        self.confidence > CONFIDENCE_ROOT_KEY
    }
}

/// Static catalogue of known formats and schemas
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    signatures: Vec<Signature>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            signatures: Vec::new(),
        }
    }

    /// Registry pre-populated with the built-in schema family
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register(
            Signature::xml("types", "types")
                .with_child("type")
                .with_child_attribute("name")
                .with_description("item type definitions (types.xml)"),
        );
        registry.register(
            Signature::xml("events", "events")
                .with_child("event")
                .with_child_attribute("name")
                .with_description("dynamic event definitions (events.xml)"),
        );
        registry.register(
            Signature::xml("spawnabletypes", "spawnabletypes")
                .with_child("type")
                .with_child_attribute("name")
                .with_description("spawn loadout definitions (cfgspawnabletypes.xml)"),
        );
        registry.register(
            Signature::xml("globals", "variables")
                .with_child("var")
                .with_child_attribute("name")
                .with_description("engine variables (globals.xml)"),
        );
        registry.register(
            Signature::json("cfggameplay", &["version", "GeneralData", "PlayerData"])
                .with_required_fields(&["disableBaseDamage", "disableContainerDamage"])
                .with_description("gameplay tuning (cfggameplay.json)"),
        );
        registry.register(
            Signature::json("cfgeffectarea", &["Areas"])
                .with_required_fields(&["AreaName", "Type", "Data"])
                .with_description("effect area definitions (cfgeffectarea.json)"),
        );

        registry
    }

    /// Register an additional signature
    pub fn register(&mut self, signature: Signature) {
        self.signatures.push(signature);
    }

    /// All registered signatures, in registration order
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Look up a signature by schema identifier
    pub fn get(&self, schema: &str) -> Option<&Signature> {
        self.signatures.iter().find(|s| s.schema == schema)
    }

    /// Classify raw content, with an optional filename hint
    ///
    /// XML classification is attempted first, then JSON. Whichever exceeds
    /// the confident threshold wins; otherwise the higher-confidence of the
    /// two is returned, ties broken in favor of XML.
    pub fn classify(&self, content: &str, filename: Option<&str>) -> Classification {
        let xml = self.classify_xml(content, filename);
        if xml.confidence > CONFIDENCE_ROOT_KEY {
            return xml;
        }

        let json = self.classify_json(content, filename);
        if json.confidence > CONFIDENCE_ROOT_KEY {
            return json;
        }

        if json.confidence > xml.confidence {
            json
        } else {
            xml
        }
    }

    /// Classify content as XML against registered signatures
    pub fn classify_xml(&self, content: &str, filename: Option<&str>) -> Classification {
        let doc = match roxmltree::Document::parse(content) {
            Ok(d) => d,
            Err(e) => {
                log::debug!("XML classification failed to parse: {}", e);
                return Classification::unparseable();
            }
        };

        let root = doc.root_element();
        let root_tag = root.tag_name().name().to_string();

        for sig in self.signatures.iter().filter(|s| s.format == Format::Xml) {
            if sig.root_tag.as_deref() != Some(root_tag.as_str()) {
                continue;
            }

            let mut confidence = CONFIDENCE_ROOT;
            let mut result = Classification::new(Format::Xml, confidence, &sig.description);
            result.schema = Some(sig.schema.clone());
            result.metadata.insert("root".into(), root_tag.clone());

            if let Some(child_tag) = &sig.child_tag {
                let children: Vec<_> = root
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == child_tag.as_str())
                    .collect();

                if !children.is_empty() {
                    confidence = CONFIDENCE_SHAPE;
                    result.metadata.insert("child".into(), child_tag.clone());

                    if let Some(attr) = &sig.child_attribute {
                        if children.iter().any(|c| c.has_attribute(attr.as_str())) {
                            confidence = CONFIDENCE_EXACT;
                            result.metadata.insert("child_attribute".into(), attr.clone());
                        }
                    }
                }
            }

            result.confidence = apply_filename_bonus(
                confidence,
                &sig.schema,
                filename,
                &mut result.metadata,
            );
            return result;
        }

        // Well-formed XML with no matching signature still gets generic
        // syntax feedback downstream
        let mut result = Classification::new(
            Format::Xml,
            CONFIDENCE_UNRECOGNIZED,
            "well-formed XML, unrecognized schema",
        );
        result.metadata.insert("root".into(), root_tag);
        result
    }

    /// Classify content as JSON against registered signatures
    pub fn classify_json(&self, content: &str, filename: Option<&str>) -> Classification {
        let value: serde_json::Value = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("JSON classification failed to parse: {}", e);
                return Classification::unparseable();
            }
        };

        let object = match value.as_object() {
            Some(o) => o,
            None => {
                return Classification::new(
                    Format::Json,
                    CONFIDENCE_NOT_OBJECT,
                    "valid JSON, but not an object",
                )
            }
        };

        let mut best: Option<Classification> = None;

        for sig in self.signatures.iter().filter(|s| s.format == Format::Json) {
            // best tier over all designated root keys present in the document
            let matched = sig
                .root_keys
                .iter()
                .filter(|k| object.contains_key(*k))
                .map(|k| (k, json_field_confidence(&object[k], &sig.required_fields)))
                .max_by(|a, b| a.1.total_cmp(&b.1));
            let (matched_key, confidence) = match matched {
                Some(m) => m,
                None => continue,
            };

            let mut result = Classification::new(Format::Json, confidence, &sig.description);
            result.schema = Some(sig.schema.clone());
            result.metadata.insert("root_key".into(), matched_key.clone());
            result.confidence = apply_filename_bonus(
                confidence,
                &sig.schema,
                filename,
                &mut result.metadata,
            );

            // Earlier registrations win ties (registry iteration order)
            if best
                .as_ref()
                .map(|b| result.confidence > b.confidence)
                .unwrap_or(true)
            {
                best = Some(result);
            }
        }

        best.unwrap_or_else(|| {
            Classification::new(
                Format::Json,
                CONFIDENCE_UNRECOGNIZED,
                "valid JSON object, unrecognized schema",
            )
        })
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Classify content against the built-in registry
pub fn classify(content: &str, filename: Option<&str>) -> Classification {
    SchemaRegistry::builtin().classify(content, filename)
}

/// Confidence tier for a matched JSON root key based on required sub-fields
fn json_field_confidence(value: &serde_json::Value, required_fields: &[String]) -> f64 {
    let target = match value {
        serde_json::Value::Object(o) => Some(o),
        serde_json::Value::Array(a) => a.first().and_then(|v| v.as_object()),
        _ => None,
    };

    let target = match target {
        Some(t) if !required_fields.is_empty() => t,
        _ => return CONFIDENCE_ROOT_KEY,
    };

    let present = required_fields
        .iter()
        .filter(|f| target.contains_key(*f))
        .count();

    if present == required_fields.len() {
        CONFIDENCE_EXACT
    } else if present > 0 {
        CONFIDENCE_PARTIAL_FIELDS
    } else {
        CONFIDENCE_ROOT_KEY
    }
}

/// Add the filename bonus when the filename carries the schema's short name
fn apply_filename_bonus(
    confidence: f64,
    schema: &str,
    filename: Option<&str>,
    metadata: &mut HashMap<String, String>,
) -> f64 {
    if let Some(name) = filename {
        if name.to_lowercase().contains(&schema.to_lowercase()) {
            metadata.insert("filename_bonus".into(), "true".into());
            return (confidence + FILENAME_BONUS).min(1.0);
        }
    }
    confidence
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_signature_match_is_exact() {
        let result = classify("<types><type name=\"Ammo_9x19\"/></types>", None);
        assert_eq!(result.format, Format::Xml);
        assert_eq!(result.schema.as_deref(), Some("types"));
        assert_eq!(result.confidence, CONFIDENCE_EXACT);
    }

    #[test]
    fn test_root_only_match() {
        let result = classify("<types></types>", None);
        assert_eq!(result.format, Format::Xml);
        assert_eq!(result.schema.as_deref(), Some("types"));
        assert_eq!(result.confidence, CONFIDENCE_ROOT);
    }

    #[test]
    fn test_child_without_attribute() {
        let result = classify("<types><type/></types>", None);
        assert_eq!(result.schema.as_deref(), Some("types"));
        assert_eq!(result.confidence, CONFIDENCE_SHAPE);
    }

    #[test]
    fn test_unparseable_content() {
        let result = classify("not xml, not json", None);
        assert_eq!(result.format, Format::Unknown);
        assert_eq!(result.confidence, CONFIDENCE_UNPARSEABLE);
    }

    #[test]
    fn test_unrecognized_xml_root() {
        let result = classify("<unknownroot><a/></unknownroot>", None);
        assert_eq!(result.format, Format::Xml);
        assert_eq!(result.schema, None);
        assert_eq!(result.confidence, CONFIDENCE_UNRECOGNIZED);
    }

    #[test]
    fn test_empty_json_object_unrecognized() {
        // "valid but unrecognized" must be distinguishable from garbage
        let result = classify("{}", None);
        assert_eq!(result.format, Format::Json);
        assert_eq!(result.schema, None);
        assert_eq!(result.confidence, CONFIDENCE_UNRECOGNIZED);
    }

    #[test]
    fn test_json_not_object() {
        let result = classify("[1, 2, 3]", None);
        assert_eq!(result.format, Format::Json);
        assert_eq!(result.confidence, CONFIDENCE_NOT_OBJECT);
    }

    #[test]
    fn test_json_root_key_alone() {
        let result = classify("{\"Areas\": 7}", None);
        assert_eq!(result.schema.as_deref(), Some("cfgeffectarea"));
        assert_eq!(result.confidence, CONFIDENCE_ROOT_KEY);
    }

    #[test]
    fn test_json_all_fields_in_first_element() {
        let content = r#"{"Areas": [{"AreaName": "Rify", "Type": "ContaminatedArea_Static", "Data": {}}]}"#;
        let result = classify(content, None);
        assert_eq!(result.schema.as_deref(), Some("cfgeffectarea"));
        assert_eq!(result.confidence, CONFIDENCE_EXACT);
    }

    #[test]
    fn test_json_partial_fields() {
        let content = r#"{"Areas": [{"AreaName": "Rify"}]}"#;
        let result = classify(content, None);
        assert_eq!(result.confidence, CONFIDENCE_PARTIAL_FIELDS);
    }

    #[test]
    fn test_json_empty_array_is_root_key_only() {
        let result = classify("{\"Areas\": []}", None);
        assert_eq!(result.schema.as_deref(), Some("cfgeffectarea"));
        assert_eq!(result.confidence, CONFIDENCE_ROOT_KEY);
    }

    #[test]
    fn test_filename_bonus_applied() {
        let without = classify("<types></types>", None);
        let with = classify("<types></types>", Some("db/types.xml"));
        assert_eq!(without.confidence, CONFIDENCE_ROOT);
        assert_eq!(with.confidence, CONFIDENCE_ROOT + FILENAME_BONUS);
        assert_eq!(with.metadata.get("filename_bonus").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_filename_bonus_capped() {
        let result = classify(
            "<types><type name=\"Ammo_9x19\"/></types>",
            Some("types.xml"),
        );
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_gameplay_full_signature() {
        // the numeric "version" key alone is only a root-key match, but a
        // GeneralData section with the required fields is a full match
        let content = r#"{"version": 131, "GeneralData": {"disableBaseDamage": false, "disableContainerDamage": false}}"#;
        let result = classify(content, None);
        assert_eq!(result.schema.as_deref(), Some("cfggameplay"));
        assert_eq!(result.confidence, CONFIDENCE_EXACT);
        assert_eq!(result.metadata.get("root_key").map(String::as_str), Some("GeneralData"));
    }

    #[test]
    fn test_gameplay_version_root_key() {
        let result = classify("{\"version\": 131}", Some("cfggameplay.json"));
        assert_eq!(result.schema.as_deref(), Some("cfggameplay"));
        // root key alone plus filename bonus
        assert_eq!(result.confidence, CONFIDENCE_ROOT_KEY + FILENAME_BONUS);
    }

    #[test]
    fn test_globals_signature() {
        let content = "<variables><var name=\"TimeLogin\" type=\"0\" value=\"15\"/></variables>";
        let result = classify(content, None);
        assert_eq!(result.schema.as_deref(), Some("globals"));
        assert_eq!(result.confidence, CONFIDENCE_EXACT);
    }

    #[test]
    fn test_custom_signature_registration() {
        let mut registry = SchemaRegistry::builtin();
        registry.register(
            Signature::xml("messages", "messages")
                .with_child("message")
                .with_description("server broadcast messages"),
        );

        let result = registry.classify("<messages><message/></messages>", None);
        assert_eq!(result.schema.as_deref(), Some("messages"));
        assert_eq!(result.confidence, CONFIDENCE_SHAPE);
    }

    #[test]
    fn test_xml_wins_over_low_confidence_json() {
        // Parses as XML with a recognized root: XML answer wins outright
        let result = classify("<events></events>", None);
        assert_eq!(result.format, Format::Xml);
        assert_eq!(result.schema.as_deref(), Some("events"));
    }

    #[test]
    fn test_format_as_str() {
        assert_eq!(Format::Xml.as_str(), "xml");
        assert_eq!(Format::Json.as_str(), "json");
        assert_eq!(Format::Unknown.as_str(), "unknown");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = SchemaRegistry::builtin();
        assert!(registry.get("types").is_some());
        assert!(registry.get("nope").is_none());
        assert_eq!(registry.get("globals").unwrap().root_tag.as_deref(), Some("variables"));
    }
}
