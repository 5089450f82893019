//! Entity-relationship generator

use serde_json::Value;
use tracing::{debug, span, Level};

use super::parser::{left_marker_for, line_for, right_marker_for};
use crate::core::{
    encode_quotes, write_preamble, CodeWriter, ConnectionMap, DiagramMetadata, DiagramType, Element,
    ElementMap, Generator, GeneratorConfig,
};

/// Entity-relationship generator
pub struct ErGenerator {
    config: GeneratorConfig,
}

impl ErGenerator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn attribute_line(attribute: &Value) -> Option<String> {
        let data_type = attribute.get("type")?.as_str()?;
        let name = attribute.get("name")?.as_str()?;
        let mut line = format!("{} {}", data_type, name);

        let keys: Vec<&str> = attribute
            .get("keys")
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if !keys.is_empty() {
            line.push(' ');
            line.push_str(&keys.join(", "));
        }
        if let Some(comment) = attribute.get("comment").and_then(Value::as_str) {
            line.push_str(&format!(" \"{}\"", encode_quotes(comment)));
        }
        Some(line)
    }

    fn write_entity(&self, writer: &mut CodeWriter, element: &Element) {
        let pad = self.config.pad(1);
        let attributes: Vec<String> = element
            .properties
            .get("attributes")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Self::attribute_line).collect())
            .unwrap_or_default();

        if attributes.is_empty() {
            writer.indented(&pad, &element.id);
            return;
        }

        let inner = self.config.pad(2);
        writer.indented(&pad, format!("{} {{", element.id));
        for attribute in attributes {
            writer.indented(&inner, attribute);
        }
        writer.indented(&pad, "}");
    }
}

impl Default for ErGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for ErGenerator {
    fn generate(
        &self,
        elements: &ElementMap,
        connections: &ConnectionMap,
        metadata: &DiagramMetadata,
    ) -> String {
        let generate_span = span!(
            Level::INFO,
            "generate_er",
            element_count = elements.len(),
            connection_count = connections.len()
        );
        let _enter = generate_span.enter();

        let mut writer = CodeWriter::new();
        write_preamble(&mut writer, "erDiagram", metadata, &self.config);

        for element in elements.values() {
            self.write_entity(&mut writer, element);
        }

        let pad = self.config.pad(1);
        for connection in connections.values() {
            let left = connection
                .property_str("left_cardinality")
                .map_or("||", left_marker_for);
            let right = connection
                .property_str("right_cardinality")
                .map_or("||", right_marker_for);
            writer.indented(
                &pad,
                format!(
                    "{} {}{}{} {} : {}",
                    connection.source_id,
                    left,
                    line_for(&connection.connection_type),
                    right,
                    connection.target_id,
                    quote_label(&connection.label)
                ),
            );
        }

        debug!("Generated ER diagram source");
        writer.finish()
    }

    fn name(&self) -> &'static str {
        "er"
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Er
    }
}

fn quote_label(label: &str) -> String {
    let bare = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if bare {
        label.to_string()
    } else {
        format!("\"{}\"", encode_quotes(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Parser;
    use crate::plugins::er::ErParser;

    #[test]
    fn test_generate_entities_and_relationships() {
        let output = ErParser::new().parse(&[
            "CUSTOMER {",
            "string name PK \"full name\"",
            "}",
            "CUSTOMER ||--o{ ORDER : places",
            "ORDER }|..|{ LINE-ITEM : \"contains many\"",
        ]);
        let code = ErGenerator::new().generate(&output.elements, &output.connections, &DiagramMetadata::default());
        assert_eq!(
            code,
            "erDiagram\n    CUSTOMER {\n        string name PK \"full name\"\n    }\n    ORDER\n    LINE-ITEM\n    CUSTOMER ||--o{ ORDER : places\n    ORDER }|..|{ LINE-ITEM : \"contains many\""
        );
    }

    #[test]
    fn test_output_parses_back() {
        let first = ErParser::new().parse(&[
            "A {",
            "int id PK, FK",
            "}",
            "A |o--|| B : has",
            "B }o..o| C : \"\"",
        ]);
        let code = ErGenerator::new().generate(&first.elements, &first.connections, &DiagramMetadata::default());
        let lines: Vec<&str> = code.lines().skip(1).collect();
        let second = ErParser::new().parse(&lines);

        assert_eq!(second.elements.len(), first.elements.len());
        assert_eq!(
            second.elements["A"].properties["attributes"],
            first.elements["A"].properties["attributes"]
        );
        for (id, connection) in &first.connections {
            let other = &second.connections[id];
            assert_eq!(other.connection_type, connection.connection_type);
            assert_eq!(other.label, connection.label);
            assert_eq!(other.properties, connection.properties);
        }
    }

    #[test]
    fn test_quote_label() {
        assert_eq!(quote_label("places"), "places");
        assert_eq!(quote_label("is part of"), "\"is part of\"");
        assert_eq!(quote_label(""), "\"\"");
        assert_eq!(quote_label("say \"hi\"\nnow"), "\"say #quot;hi#quot; now\"");
    }

    #[test]
    fn test_quotes_survive() {
        let mut first = ErParser::new().parse(&["A {", "int id PK \"the id\"", "}", "A ||--o{ B : has"]);
        first.connections["conn_1"].label = "say \"hi\"".to_string();
        first.elements["A"].properties["attributes"][0]["comment"] = serde_json::json!("a \"key\"");

        let code = ErGenerator::new().generate(&first.elements, &first.connections, &DiagramMetadata::default());
        let lines: Vec<&str> = code.lines().skip(1).collect();
        let second = ErParser::new().parse(&lines);
        assert_eq!(second.connections["conn_1"].label, "say \"hi\"");
        assert_eq!(second.elements["A"].properties["attributes"][0]["comment"], "a \"key\"");
    }
}
