//! Core generator trait for emitting dialect source text
//!
//! Generators are the inverse of parsers: whatever a generator emits, the
//! matching parser reads back into an equivalent set of elements and
//! connections.

use super::diagram::{ConnectionMap, DiagramMetadata, ElementMap};
use super::parser::QUOTE_ENTITY;
use super::types::DiagramType;

/// Core trait for dialect generators
///
/// # Example
/// ```
/// use diagrammer::core::{DiagramMetadata, Element, ElementMap, ConnectionMap, Generator};
/// use diagrammer::plugins::flowchart::FlowchartGenerator;
///
/// let mut elements = ElementMap::new();
/// elements.insert("A".into(), Element::node("A", "Start").with_property("shape", "rounded"));
///
/// let code = FlowchartGenerator::new().generate(&elements, &ConnectionMap::new(), &DiagramMetadata::default());
/// assert!(code.contains("A(Start)"));
/// ```
pub trait Generator: Send + Sync {
    /// Emit canonical source text for the given model
    fn generate(
        &self,
        elements: &ElementMap,
        connections: &ConnectionMap,
        metadata: &DiagramMetadata,
    ) -> String;

    /// Get the name of this generator
    fn name(&self) -> &'static str;

    /// The dialect this generator emits
    fn diagram_type(&self) -> DiagramType;
}

/// Line accumulator shared by the generators
#[derive(Debug, Default)]
pub struct CodeWriter {
    lines: Vec<String>,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Push `line` prefixed with `pad`
    pub fn indented(&mut self, pad: &str, line: impl AsRef<str>) {
        self.lines.push(format!("{}{}", pad, line.as_ref()));
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Header plus optional title comment, common to every dialect
pub fn write_preamble(
    writer: &mut CodeWriter,
    header: &str,
    metadata: &DiagramMetadata,
    config: &super::config::GeneratorConfig,
) {
    writer.line(header);
    if config.emit_title {
        if let Some(title) = metadata.title.as_deref().filter(|t| !t.trim().is_empty()) {
            writer.indented(&config.pad(1), format!("%% title: {}", single_line(title).trim()));
        }
    }
}

/// Collapse line breaks into spaces; every emitted statement is one line
pub fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Text safe to place between double quotes, decoded by
/// [`quoted_string`](super::chumsky_utils::quoted_string)
pub fn encode_quotes(text: &str) -> String {
    single_line(text).replace('"', QUOTE_ENTITY)
}
