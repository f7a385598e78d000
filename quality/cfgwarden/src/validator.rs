//! The schema checker contract and the checker registry
//!
//! Each recognized schema gets one checker implementing the three fixed
//! phases. Checkers are pure: no shared mutable state, no I/O, and they
//! degrade to returning no findings on input they cannot parse (the engine
//! owns syntax-level reporting).

use crate::finding::Finding;
use schema_detector::Format;
use std::sync::Arc;

/// Per-call context handed to every checker phase
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Target schema version; selects version-dependent numeric thresholds
    pub target_version: Option<String>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_version(mut self, version: &str) -> Self {
        self.target_version = Some(version.to_string());
        self
    }
}

/// One schema checker
///
/// The engine invokes the three phases in declaration order and
/// concatenates their findings.
pub trait SchemaValidator: Send + Sync {
    /// Schema identifier this checker validates
    fn schema(&self) -> &str;

    /// Format this checker expects
    fn format(&self) -> Format;

    /// Schema-level syntax niceties (the engine has already parsed)
    fn validate_syntax(&self, content: &str, ctx: &ValidationContext) -> Vec<Finding>;

    /// Root/child shape, required elements and attributes, type coercion
    fn validate_structure(&self, content: &str, ctx: &ValidationContext) -> Vec<Finding>;

    /// Cross-field semantic invariants
    fn validate_business_rules(&self, content: &str, ctx: &ValidationContext) -> Vec<Finding>;

    /// All three phases, in order
    fn validate_all(&self, content: &str, ctx: &ValidationContext) -> Vec<Finding> {
        let mut findings = self.validate_syntax(content, ctx);
        findings.extend(self.validate_structure(content, ctx));
        findings.extend(self.validate_business_rules(content, ctx));
        findings
    }
}

/// Resolve the checker for a recognized schema
///
/// This is the explicit registry map populated at process start; an
/// unregistered schema resolves to `None`, which the engine reports as
/// informational, never as an error.
pub fn resolve(format: Format, schema: &str) -> Option<Arc<dyn SchemaValidator>> {
    use crate::validators::*;

    match (format, schema) {
        (Format::Xml, "types") => Some(Arc::new(TypesValidator)),
        (Format::Xml, "events") => Some(Arc::new(EventsValidator)),
        (Format::Xml, "spawnabletypes") => Some(Arc::new(SpawnableTypesValidator)),
        (Format::Xml, "globals") => Some(Arc::new(GlobalsValidator)),
        (Format::Json, "cfggameplay") => Some(Arc::new(GameplayValidator)),
        (Format::Json, "cfgeffectarea") => Some(Arc::new(EffectAreaValidator)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schemas_resolve() {
        for (format, schema) in [
            (Format::Xml, "types"),
            (Format::Xml, "events"),
            (Format::Xml, "spawnabletypes"),
            (Format::Xml, "globals"),
            (Format::Json, "cfggameplay"),
            (Format::Json, "cfgeffectarea"),
        ] {
            let validator = resolve(format, schema).expect("builtin schema must resolve");
            assert_eq!(validator.schema(), schema);
            assert_eq!(validator.format(), format);
        }
    }

    #[test]
    fn test_unknown_schema_is_none() {
        assert!(resolve(Format::Xml, "nope").is_none());
        // format/schema pairs are exact: cfggameplay is JSON only
        assert!(resolve(Format::Xml, "cfggameplay").is_none());
    }

    #[test]
    fn test_checkers_degrade_on_garbage() {
        let ctx = ValidationContext::new();
        for (format, schema) in [(Format::Xml, "types"), (Format::Json, "cfggameplay")] {
            let validator = resolve(format, schema).unwrap();
            assert!(validator.validate_all("complete garbage {[<", &ctx).is_empty());
        }
    }
}
