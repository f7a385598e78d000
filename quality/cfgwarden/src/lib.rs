//! cfgwarden - schema-aware validator for game-server economy config files
//!
//! Validates XML and JSON config files (types, events, spawnable types,
//! globals, gameplay tuning, effect areas) without being told which is
//! which: a confidence-scored classifier identifies format and schema from
//! content alone, then a three-phase pipeline checks syntax, structural
//! shape and business rules.
//!
//! # Architecture
//!
//! ```text
//! caller -> ValidationEngine -> classify -> syntax check -> format -> checker
//!                                |               |
//!                                |               +-- on failure: ErrorLocator
//!                                |                   + ErrorAdvisor + AutoCorrector
//!                                +-- schema-detector (signatures)
//! ```
//!
//! # Example
//!
//! ```
//! use cfgwarden::{EngineConfig, ValidationEngine};
//!
//! let engine = ValidationEngine::new(EngineConfig::default());
//! let result = engine.validate("<types><type name=\"Ammo_9x19\"/></types>");
//! assert!(result.valid);
//! assert_eq!(result.classification.schema.as_deref(), Some("types"));
//! ```

pub mod advisor;
pub mod config;
pub mod corrector;
pub mod engine;
pub mod finding;
pub mod format;
pub mod locator;
pub mod output;
pub mod result;
pub mod validator;
pub mod validators;

// Re-export main types
pub use advisor::ErrorAdvisor;
pub use config::{ConfigError, EngineConfig};
pub use corrector::{AutoCorrector, CorrectionOutcome};
pub use engine::ValidationEngine;
pub use finding::{DiagnosticRecord, Finding, FindingCategory, Severity};
pub use format::{FormatError, Formatter};
pub use locator::{ErrorLocator, LocatedLine};
pub use output::{JsonFormatter, OutputFormatter, TextFormatter};
pub use result::ValidationResult;
pub use validator::{SchemaValidator, ValidationContext};

// Re-export the detection layer
pub use schema_detector::{Classification, Format, SchemaRegistry, Signature};
