//! Core parser trait for dialect source text
//!
//! A parser receives the statement lines of one diagram (the type declaration,
//! blank lines and `%%` comments already removed) and produces elements and
//! connections. Parsing never fails: lines that match no rule are skipped.

use serde_json::Value;

use super::diagram::{ConnectionMap, ElementMap};
use super::element::{Connection, Element};
use super::types::DiagramType;

/// Stand-in for `"` inside quoted labels
pub const QUOTE_ENTITY: &str = "#quot;";

/// Decode the entities written by [`encode_quotes`](super::generator::encode_quotes)
pub fn decode_entities(text: &str) -> String {
    text.replace(QUOTE_ENTITY, "\"")
}

/// Elements and connections produced by a parser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    pub elements: ElementMap,
    pub connections: ConnectionMap,
}

impl ParseOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Insert `element` unless its id is taken; returns true when inserted
    pub fn insert_element(&mut self, element: Element) -> bool {
        if self.elements.contains_key(&element.id) {
            return false;
        }
        self.elements.insert(element.id.clone(), element);
        true
    }

    /// Return the element with `id`, creating it with `make` when missing
    pub fn ensure_element(&mut self, id: &str, make: impl FnOnce(usize) -> Element) -> &mut Element {
        let index = self.elements.len();
        self.elements
            .entry(id.to_string())
            .or_insert_with(|| make(index))
    }

    /// Append a connection under the next free `conn_N` id and return that id
    pub fn push_connection(
        &mut self,
        source_id: &str,
        target_id: &str,
        connection_type: &str,
        label: Option<String>,
    ) -> &mut Connection {
        let id = next_connection_id(&self.connections);
        let connection = Connection::new(id.clone(), source_id, target_id, connection_type)
            .with_label(label.unwrap_or_default());
        self.connections.entry(id).or_insert(connection)
    }

    /// Append `value` to the list stored under `key` on element `id`
    pub fn append_to_list(&mut self, id: &str, key: &str, value: Value) {
        if let Some(element) = self.elements.get_mut(id) {
            append_property(&mut element.properties, key, value);
        }
    }
}

/// Append `value` to the array property `key`, creating it when absent
pub fn append_property(properties: &mut super::types::PropertyMap, key: &str, value: Value) {
    match properties.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        _ => {
            properties.insert(key.to_string(), Value::Array(vec![value]));
        }
    }
}

/// First `conn_N` id not present in `connections`
pub fn next_connection_id(connections: &ConnectionMap) -> String {
    let mut n = connections.len() + 1;
    loop {
        let id = format!("conn_{}", n);
        if !connections.contains_key(&id) {
            return id;
        }
        n += 1;
    }
}

/// Core trait for dialect parsers
///
/// # Example
/// ```
/// use diagrammer::core::Parser;
/// use diagrammer::plugins::flowchart::FlowchartParser;
///
/// let parser = FlowchartParser::new();
/// let output = parser.parse(&["A[Start] --> B[End]"]);
/// assert_eq!(output.elements.len(), 2);
/// assert_eq!(output.connections.len(), 1);
/// ```
pub trait Parser: Send + Sync {
    /// Parse statement lines into elements and connections
    fn parse(&self, lines: &[&str]) -> ParseOutput;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// The dialect this parser handles
    fn diagram_type(&self) -> DiagramType;
}
