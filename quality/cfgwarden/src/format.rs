//! Best-effort pretty printing of validated content
//!
//! Formatting is cosmetic: the engine swallows formatter failures and they
//! never affect validity.

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use schema_detector::Format;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("no formatter for format: {0}")]
    Unsupported(Format),
}

/// Re-indenting formatter for XML and JSON
#[derive(Debug, Clone)]
pub struct Formatter {
    indent: usize,
}

impl Formatter {
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    /// Format content according to its detected format
    pub fn format(&self, content: &str, format: Format) -> Result<String, FormatError> {
        match format {
            Format::Xml => self.format_xml(content),
            Format::Json => self.format_json(content),
            Format::Unknown => Err(FormatError::Unsupported(format)),
        }
    }

    fn format_xml(&self, content: &str) -> Result<String, FormatError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', self.indent);

        loop {
            match reader.read_event()? {
                Event::Eof => break,
                event => writer.write_event(event)?,
            }
        }

        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn format_json(&self, content: &str) -> Result<String, FormatError> {
        let value: serde_json::Value = serde_json::from_str(content)?;

        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;

        Ok(String::from_utf8(buf)?)
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_INDENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_xml_reindent() {
        let formatter = Formatter::new(4);
        let out = formatter
            .format("<types><type name=\"Ammo\"/></types>", Format::Xml)
            .unwrap();
        assert_eq!(out, "<types>\n    <type name=\"Ammo\"/>\n</types>");
    }

    #[test]
    fn test_json_reindent() {
        let formatter = Formatter::new(2);
        let out = formatter.format("{\"version\":131}", Format::Json).unwrap();
        assert_eq!(out, "{\n  \"version\": 131\n}");
    }

    #[test]
    fn test_malformed_input_errors() {
        let formatter = Formatter::default();
        assert!(formatter.format("{oops", Format::Json).is_err());
        assert!(formatter.format("x", Format::Unknown).is_err());
    }
}
