//! Sequence diagram generator

use serde_json::Value;
use tracing::{debug, span, Level};

use super::parser::message_arrow_for;
use crate::core::{
    single_line, write_preamble, CodeWriter, Connection, ConnectionMap, DiagramMetadata, DiagramType,
    Element, ElementMap, ElementType, Generator, GeneratorConfig,
};

/// Sequence diagram generator
pub struct SequenceGenerator {
    config: GeneratorConfig,
}

/// A message or note, placed by its `order` property
enum Step<'a> {
    Message(&'a Connection),
    Note(&'a Element),
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn declaration(element: &Element) -> String {
        let keyword = match element.property_str("participant_type") {
            Some("actor") => "actor",
            _ => "participant",
        };
        if element.label.is_empty() || element.label == element.id {
            format!("{} {}", keyword, element.id)
        } else {
            format!("{} {} as {}", keyword, element.id, single_line(&element.label))
        }
    }

    fn message(connection: &Connection) -> String {
        let arrow = message_arrow_for(&connection.connection_type);
        if connection.has_label() {
            format!(
                "{}{}{}: {}",
                connection.source_id,
                arrow,
                connection.target_id,
                single_line(&connection.label)
            )
        } else {
            format!("{}{}{}", connection.source_id, arrow, connection.target_id)
        }
    }

    fn note(element: &Element) -> Option<String> {
        let participants: Vec<&str> = match element.properties.get("participants") {
            Some(Value::Array(ids)) => ids.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        if participants.is_empty() {
            return None;
        }
        let placement = match element.property_str("placement") {
            Some(p @ ("left of" | "right of")) => p,
            _ => "over",
        };
        Some(format!(
            "Note {} {}: {}",
            placement,
            participants.join(","),
            single_line(&element.label)
        ))
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for SequenceGenerator {
    fn generate(
        &self,
        elements: &ElementMap,
        connections: &ConnectionMap,
        metadata: &DiagramMetadata,
    ) -> String {
        let generate_span = span!(
            Level::INFO,
            "generate_sequence",
            element_count = elements.len(),
            connection_count = connections.len()
        );
        let _enter = generate_span.enter();

        let mut writer = CodeWriter::new();
        write_preamble(&mut writer, "sequenceDiagram", metadata, &self.config);
        let pad = self.config.pad(1);

        for element in elements
            .values()
            .filter(|e| e.element_type != ElementType::Annotation)
        {
            writer.indented(&pad, Self::declaration(element));
        }

        let mut steps: Vec<(u64, Step<'_>)> = connections
            .values()
            .map(|c| (order_of(&c.properties), Step::Message(c)))
            .chain(
                elements
                    .values()
                    .filter(|e| e.element_type == ElementType::Annotation)
                    .map(|e| (order_of(&e.properties), Step::Note(e))),
            )
            .collect();
        steps.sort_by_key(|(order, _)| *order);

        for (_, step) in steps {
            match step {
                Step::Message(connection) => writer.indented(&pad, Self::message(connection)),
                Step::Note(element) => {
                    if let Some(line) = Self::note(element) {
                        writer.indented(&pad, line);
                    }
                }
            }
        }

        debug!("Generated sequence diagram source");
        writer.finish()
    }

    fn name(&self) -> &'static str {
        "sequence"
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Sequence
    }
}

/// Steps without an order sort after ordered ones, keeping insertion order
fn order_of(properties: &crate::core::PropertyMap) -> u64 {
    properties
        .get("order")
        .and_then(Value::as_u64)
        .unwrap_or(u64::MAX)
}
