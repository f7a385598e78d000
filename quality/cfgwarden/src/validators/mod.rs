//! Built-in schema checkers
//!
//! One module per recognized schema. Checkers share the small XML/JSON
//! helpers below; each is a pure function set with no shared mutable state.

mod effectarea;
mod events;
mod gameplay;
mod globals;
mod spawnabletypes;
mod types;

pub use effectarea::EffectAreaValidator;
pub use events::EventsValidator;
pub use gameplay::GameplayValidator;
pub use globals::GlobalsValidator;
pub use spawnabletypes::SpawnableTypesValidator;
pub use types::TypesValidator;

use crate::finding::{Finding, FindingCategory};

/// Line number (1-based) of a node's start position
pub(crate) fn line_of(doc: &roxmltree::Document, node: roxmltree::Node) -> usize {
    doc.text_pos_at(node.range().start).row as usize
}

/// Text of the first child element with the given tag
pub(crate) fn child_text<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
        .and_then(|c| c.text())
        .map(str::trim)
}

/// First child element with the given tag
pub(crate) fn child_element<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// Element children of a node
pub(crate) fn elements<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children().filter(|c| c.is_element())
}

pub(crate) fn parse_i64(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

pub(crate) fn parse_f64(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

/// Shared syntax-phase check for XML schemas: the game loads config files as
/// UTF-8, so a declaration naming another encoding is suspicious
pub(crate) fn xml_encoding_findings(content: &str) -> Vec<Finding> {
    let head = content.trim_start();
    if !head.starts_with("<?xml") {
        return Vec::new();
    }
    let decl = match head.find("?>") {
        Some(end) => &head[..end],
        None => return Vec::new(),
    };
    let encoding = decl
        .split("encoding=")
        .nth(1)
        .and_then(|rest| {
            let quote = rest.chars().next()?;
            rest[1..].split(quote).next()
        })
        .unwrap_or("UTF-8");

    if encoding.eq_ignore_ascii_case("utf-8") {
        return Vec::new();
    }
    vec![Finding::warning(
        FindingCategory::Syntax,
        &format!("XML declaration names encoding '{}'", encoding),
    )
    .with_line(1)
    .with_suggestion("save the file as UTF-8 and declare encoding=\"UTF-8\"")]
}

/// Shared syntax-phase check for JSON schemas
pub(crate) fn json_bom_findings(content: &str) -> Vec<Finding> {
    if content.starts_with('\u{feff}') {
        vec![Finding::warning(
            FindingCategory::Syntax,
            "document starts with a byte order mark",
        )
        .with_line(1)
        .with_suggestion("save the file as UTF-8 without BOM")]
    } else {
        Vec::new()
    }
}
