//! State diagram generator
//!
//! Declarations (including composite blocks) come first, transitions after.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, span, Level};

use super::parser::{PSEUDO_STATES, TERMINAL_STATE};
use crate::core::{
    encode_quotes, single_line, write_preamble, CodeWriter, ConnectionMap, DiagramMetadata, DiagramType, Element,
    ElementMap, ElementType, Generator, GeneratorConfig,
};

/// State diagram generator
pub struct StateGenerator {
    config: GeneratorConfig,
}

enum Frame<'a> {
    Open(&'a Element, usize),
    Close(usize),
}

impl StateGenerator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn declaration(element: &Element) -> String {
        let mut line = if element.label.is_empty() || element.label == element.id {
            format!("state {}", element.id)
        } else {
            format!("state \"{}\" as {}", encode_quotes(&element.label), element.id)
        };
        if let Some(pseudo) = element
            .property_str("pseudo")
            .filter(|p| PSEUDO_STATES.contains(p))
        {
            line.push_str(&format!(" <<{}>>", pseudo));
        }
        line
    }

    fn children<'a>(elements: &'a ElementMap, composite: &Element) -> Vec<&'a Element> {
        match composite.properties.get("children") {
            Some(Value::Array(ids)) => ids
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|id| elements.get(id))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn write_states(&self, writer: &mut CodeWriter, elements: &ElementMap) {
        let nested: HashSet<&str> = elements
            .values()
            .filter(|e| e.element_type == ElementType::Container)
            .flat_map(|composite| Self::children(elements, composite))
            .map(|child| child.id.as_str())
            .collect();

        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<Frame<'_>> = elements
            .values()
            .filter(|e| e.id != TERMINAL_STATE && !nested.contains(e.id.as_str()))
            .rev()
            .map(|e| Frame::Open(e, 1))
            .collect();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Close(depth) => writer.indented(&self.config.pad(depth), "}"),
                Frame::Open(element, depth) => {
                    if element.id == TERMINAL_STATE || !visited.insert(element.id.as_str()) {
                        continue;
                    }
                    let pad = self.config.pad(depth);
                    if element.element_type == ElementType::Container {
                        writer.indented(&pad, format!("{} {{", Self::declaration(element)));
                        stack.push(Frame::Close(depth));
                        for child in Self::children(elements, element).into_iter().rev() {
                            stack.push(Frame::Open(child, depth + 1));
                        }
                    } else {
                        writer.indented(&pad, Self::declaration(element));
                    }
                }
            }
        }
    }
}

impl Default for StateGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for StateGenerator {
    fn generate(
        &self,
        elements: &ElementMap,
        connections: &ConnectionMap,
        metadata: &DiagramMetadata,
    ) -> String {
        let generate_span = span!(
            Level::INFO,
            "generate_state",
            element_count = elements.len(),
            connection_count = connections.len()
        );
        let _enter = generate_span.enter();

        let mut writer = CodeWriter::new();
        write_preamble(&mut writer, "stateDiagram-v2", metadata, &self.config);
        self.write_states(&mut writer, elements);

        let pad = self.config.pad(1);
        for connection in connections.values() {
            let line = if connection.has_label() {
                format!(
                    "{} --> {} : {}",
                    connection.source_id,
                    connection.target_id,
                    single_line(&connection.label)
                )
            } else {
                format!("{} --> {}", connection.source_id, connection.target_id)
            };
            writer.indented(&pad, line);
        }

        debug!("Generated state diagram source");
        writer.finish()
    }

    fn name(&self) -> &'static str {
        "state"
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::State
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Parser;
    use crate::plugins::state::StateParser;

    fn round(lines: &[&str]) -> String {
        let output = StateParser::new().parse(lines);
        StateGenerator::new().generate(&output.elements, &output.connections, &DiagramMetadata::default())
    }

    #[test]
    fn test_simple_machine() {
        let code = round(&["[*] --> Idle", "Idle --> Running : start", "Running --> [*]"]);
        assert_eq!(
            code,
            "stateDiagram-v2\n    state Idle\n    state Running\n    [*] --> Idle\n    Idle --> Running : start\n    Running --> [*]"
        );
    }

    #[test]
    fn test_quotes_and_newlines_survive() {
        let mut output = StateParser::new().parse(&["Idle --> Busy : go"]);
        output.elements["Busy"].label = "say \"hi\"\nnow".to_string();
        output.connections["conn_1"].label = "go\nfast".to_string();

        let code = StateGenerator::new().generate(&output.elements, &output.connections, &DiagramMetadata::default());
        assert!(code.contains("state \"say #quot;hi#quot; now\" as Busy"), "{}", code);

        let lines: Vec<&str> = code.lines().skip(1).collect();
        let reparsed = StateParser::new().parse(&lines);
        assert_eq!(reparsed.elements["Busy"].label, "say \"hi\" now");
        assert_eq!(reparsed.connections["conn_1"].label, "go fast");
        assert_eq!(reparsed.connections.len(), 1);
    }

    #[test]
    fn test_labels_and_pseudo_states() {
        let code = round(&["state \"Waiting for input\" as Waiting", "state check <<choice>>"]);
        assert!(code.contains("state \"Waiting for input\" as Waiting"));
        assert!(code.contains("state check <<choice>>"));
    }

    #[test]
    fn test_composite_block() {
        let code = round(&["state Active {", "Working --> Paused", "}"]);
        assert_eq!(
            code,
            "stateDiagram-v2\n    state Active {\n        state Working\n        state Paused\n    }\n    Working --> Paused"
        );
    }

    #[test]
    fn test_output_parses_back() {
        let source = [
            "[*] --> Idle",
            "state Active {",
            "Idle --> Working : go",
            "}",
            "state \"Shutting down\" as Halt",
            "Working --> Halt",
        ];
        let first = StateParser::new().parse(&source);
        let code = StateGenerator::new().generate(&first.elements, &first.connections, &DiagramMetadata::default());
        let lines: Vec<&str> = code.lines().skip(1).collect();
        let second = StateParser::new().parse(&lines);

        assert_eq!(second.elements.len(), first.elements.len());
        for (id, element) in &first.elements {
            let other = &second.elements[id];
            assert_eq!(other.label, element.label, "{}", id);
            assert_eq!(other.element_type, element.element_type, "{}", id);
            assert_eq!(other.properties.get("children"), element.properties.get("children"));
        }
        assert_eq!(second.connections.len(), first.connections.len());
    }
}
