//! Class diagram generator

use serde_json::Value;
use tracing::{debug, span, Level};

use super::parser::relation_arrow_for;
use crate::core::{
    encode_quotes, single_line, write_preamble, CodeWriter, Connection, ConnectionMap, DiagramMetadata, DiagramType,
    Element, ElementMap, Generator, GeneratorConfig,
};

/// Class diagram generator
pub struct ClassGenerator {
    config: GeneratorConfig,
}

impl ClassGenerator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn members<'a>(element: &'a Element, key: &str) -> Vec<&'a str> {
        match element.properties.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    fn write_class(&self, writer: &mut CodeWriter, element: &Element) {
        let pad = self.config.pad(1);
        let inner = self.config.pad(2);

        let mut header = format!("class {}", element.id);
        if !element.label.is_empty() && element.label != element.id {
            header.push_str(&format!("[\"{}\"]", encode_quotes(&element.label)));
        }

        let annotation = element.property_str("annotation").filter(|a| !a.is_empty());
        let attributes = Self::members(element, "attributes");
        let methods = Self::members(element, "methods");

        if annotation.is_none() && attributes.is_empty() && methods.is_empty() {
            writer.indented(&pad, header);
            return;
        }

        writer.indented(&pad, format!("{} {{", header));
        if let Some(annotation) = annotation {
            writer.indented(&inner, format!("<<{}>>", single_line(annotation)));
        }
        for member in attributes.into_iter().chain(methods) {
            writer.indented(&inner, single_line(member));
        }
        writer.indented(&pad, "}");
    }

    fn relation(connection: &Connection) -> String {
        let mut line = connection.source_id.clone();
        if let Some(cardinality) = connection.property_str("source_cardinality") {
            line.push_str(&format!(" \"{}\"", encode_quotes(cardinality)));
        }
        line.push(' ');
        line.push_str(relation_arrow_for(&connection.connection_type));
        if let Some(cardinality) = connection.property_str("target_cardinality") {
            line.push_str(&format!(" \"{}\"", encode_quotes(cardinality)));
        }
        line.push(' ');
        line.push_str(&connection.target_id);
        if connection.has_label() {
            line.push_str(&format!(": {}", single_line(&connection.label)));
        }
        line
    }
}

impl Default for ClassGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for ClassGenerator {
    fn generate(
        &self,
        elements: &ElementMap,
        connections: &ConnectionMap,
        metadata: &DiagramMetadata,
    ) -> String {
        let generate_span = span!(
            Level::INFO,
            "generate_class",
            element_count = elements.len(),
            connection_count = connections.len()
        );
        let _enter = generate_span.enter();

        let mut writer = CodeWriter::new();
        write_preamble(&mut writer, "classDiagram", metadata, &self.config);

        for element in elements.values() {
            self.write_class(&mut writer, element);
        }

        let pad = self.config.pad(1);
        for connection in connections.values() {
            writer.indented(&pad, Self::relation(connection));
        }

        debug!("Generated class diagram source");
        writer.finish()
    }

    fn name(&self) -> &'static str {
        "class"
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Class
    }
}
