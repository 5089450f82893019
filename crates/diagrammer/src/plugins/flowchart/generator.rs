//! Flowchart source generator
//!
//! Emits nodes (nested under their subgraphs), then connections, then
//! `style` lines. Labels are quoted whenever the unquoted form would not
//! parse back to the same text.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, span, Level};

use super::shapes::{arrow_for, NodeShape};
use crate::core::{
    encode_quotes, single_line, write_preamble, CodeWriter, ConnectionMap, DiagramMetadata, DiagramType, Element,
    ElementMap, ElementType, Generator, GeneratorConfig,
};

/// Characters that force a label into quotes
const QUOTE_TRIGGERS: &[char] = &['[', ']', '(', ')', '{', '}', '|', '"', ';', '/', '\\', '<', '>'];

/// Flowchart generator
pub struct FlowchartGenerator {
    config: GeneratorConfig,
}

enum Frame<'a> {
    Open(&'a Element, usize),
    Close(usize),
}

impl FlowchartGenerator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn node_line(element: &Element) -> String {
        let shape = element
            .shape()
            .and_then(NodeShape::from_key)
            .unwrap_or_default();
        let (open, close) = shape.delimiters();
        format!("{}{}{}{}", element.id, open, quote_label(&element.label), close)
    }

    fn children<'a>(elements: &'a ElementMap, container: &Element) -> Vec<&'a Element> {
        match container.properties.get("children") {
            Some(Value::Array(ids)) => ids
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|id| elements.get(id))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Emit the element tree depth first without recursion
    fn write_elements(&self, writer: &mut CodeWriter, elements: &ElementMap) {
        let nested: HashSet<&str> = elements
            .values()
            .filter(|e| e.element_type == ElementType::Container)
            .flat_map(|container| Self::children(elements, container))
            .map(|child| child.id.as_str())
            .collect();

        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<Frame<'_>> = elements
            .values()
            .filter(|e| !nested.contains(e.id.as_str()))
            .rev()
            .map(|e| Frame::Open(e, 1))
            .collect();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Close(depth) => writer.indented(&self.config.pad(depth), "end"),
                Frame::Open(element, depth) => {
                    if !visited.insert(element.id.as_str()) {
                        continue;
                    }
                    let pad = self.config.pad(depth);
                    if element.element_type == ElementType::Container {
                        writer.indented(
                            &pad,
                            format!("subgraph {} [{}]", element.id, quote_label(&element.label)),
                        );
                        stack.push(Frame::Close(depth));
                        for child in Self::children(elements, element).into_iter().rev() {
                            stack.push(Frame::Open(child, depth + 1));
                        }
                    } else {
                        writer.indented(&pad, Self::node_line(element));
                    }
                }
            }
        }
    }
}

impl Default for FlowchartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for FlowchartGenerator {
    fn generate(
        &self,
        elements: &ElementMap,
        connections: &ConnectionMap,
        metadata: &DiagramMetadata,
    ) -> String {
        let generate_span = span!(
            Level::INFO,
            "generate_flowchart",
            element_count = elements.len(),
            connection_count = connections.len()
        );
        let _enter = generate_span.enter();

        let direction = metadata.direction.unwrap_or(self.config.default_direction);
        let mut writer = CodeWriter::new();
        write_preamble(
            &mut writer,
            &format!("flowchart {}", direction),
            metadata,
            &self.config,
        );

        self.write_elements(&mut writer, elements);

        let pad = self.config.pad(1);
        for connection in connections.values() {
            let arrow = arrow_for(&connection.connection_type);
            let line = if connection.has_label() {
                format!(
                    "{} {}|{}| {}",
                    connection.source_id,
                    arrow,
                    quote_label(&connection.label),
                    connection.target_id
                )
            } else {
                format!("{} {} {}", connection.source_id, arrow, connection.target_id)
            };
            writer.indented(&pad, line);
        }

        for element in elements.values().filter(|e| !e.style.is_empty()) {
            let declarations: Vec<String> = element
                .style
                .iter()
                .map(|(key, value)| match value {
                    Value::String(s) => format!("{}:{}", key, s),
                    other => format!("{}:{}", key, other),
                })
                .collect();
            writer.indented(&pad, format!("style {} {}", element.id, declarations.join(",")));
        }

        debug!("Generated flowchart source");
        writer.finish()
    }

    fn name(&self) -> &'static str {
        "flowchart"
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Flowchart
    }
}

fn needs_quotes(label: &str) -> bool {
    label.is_empty() || label.trim() != label || label.contains(QUOTE_TRIGGERS)
}

/// Node, subgraph and edge labels share one quoting rule
fn quote_label(label: &str) -> String {
    let label = single_line(label);
    if needs_quotes(&label) {
        format!("\"{}\"", encode_quotes(&label))
    } else {
        label
    }
}
