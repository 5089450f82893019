//! Elements and connections of the diagram model
//!
//! Both types are plain values. `to_value`/`from_value` convert to and from the
//! JSON exchange format and are exact inverses of each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::Result;
use super::types::{ElementType, Position, PropertyMap, Size};

/// Property key holding a flowchart shape or generic node shape
pub const SHAPE_KEY: &str = "shape";
/// Property key holding the dialect-specific element kind (`participant`, `class`, ...)
pub const TYPE_KEY: &str = "type";

/// A node, container or annotation in a diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub element_type: ElementType,
    pub label: String,
    pub position: Position,
    pub size: Size,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub style: PropertyMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Element {
    /// Create a new element at the origin with default size
    pub fn new(
        id: impl Into<String>,
        element_type: ElementType,
        label: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            element_type,
            label: label.into(),
            position: Position::default(),
            size: Size::default(),
            properties: PropertyMap::new(),
            style: PropertyMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new node element
    pub fn node(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, ElementType::Node, label)
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    /// String-valued property lookup
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// The `shape` property, if set
    pub fn shape(&self) -> Option<&str> {
        self.property_str(SHAPE_KEY)
    }

    /// The dialect-specific `type` property, if set
    pub fn kind(&self) -> Option<&str> {
        self.property_str(TYPE_KEY)
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Convert to the JSON exchange format
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild from the JSON exchange format
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// A directed relationship between two elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub label: String,
    /// Key into the dialect's arrow table (`default`, `sync`, `inheritance`, ...)
    pub connection_type: String,
    #[serde(default)]
    pub style: PropertyMap,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub control_points: Vec<Position>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        connection_type: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            label: String::new(),
            connection_type: connection_type.into(),
            style: PropertyMap::new(),
            properties: PropertyMap::new(),
            control_points: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_control_points(mut self, points: Vec<Position>) -> Self {
        self.control_points = points;
        self
    }

    /// True when either endpoint is `element_id`
    pub fn touches(&self, element_id: &str) -> bool {
        self.source_id == element_id || self.target_id == element_id
    }

    pub fn has_label(&self) -> bool {
        !self.label.trim().is_empty()
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Convert to the JSON exchange format
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild from the JSON exchange format
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_builders() {
        let element = Element::node("A", "Start")
            .with_position(10.0, 20.0)
            .with_size(80.0, 40.0)
            .with_property("shape", "diamond")
            .with_style("fill", "#f9f");

        assert_eq!(element.id, "A");
        assert_eq!(element.element_type, ElementType::Node);
        assert_eq!(element.shape(), Some("diamond"));
        assert_eq!(element.position, Position::new(10.0, 20.0));
        assert_eq!(element.style.get("fill"), Some(&json!("#f9f")));
        assert_eq!(element.created_at, element.updated_at);
    }

    #[test]
    fn test_element_round_trip() {
        let element = Element::new("group", ElementType::Container, "Group")
            .with_property("children", json!(["A", "B"]))
            .with_property("depth", 2);

        let value = element.to_value().unwrap();
        assert_eq!(value["element_type"], json!("container"));
        assert_eq!(value["position"], json!({"x": 0.0, "y": 0.0}));
        assert!(value["created_at"].is_string());

        let restored = Element::from_value(value).unwrap();
        assert_eq!(restored, element);
    }

    #[test]
    fn test_connection_round_trip() {
        let connection = Connection::new("c1", "A", "B", "dotted")
            .with_label("maybe")
            .with_control_points(vec![Position::new(1.5, 2.5)]);

        let value = connection.to_value().unwrap();
        assert_eq!(value["source_id"], json!("A"));
        assert_eq!(value["control_points"], json!([{"x": 1.5, "y": 2.5}]));

        let restored = Connection::from_value(value).unwrap();
        assert_eq!(restored, connection);
    }

    #[test]
    fn test_from_value_missing_field() {
        let result = Element::from_value(json!({"id": "A"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_connection_touches() {
        let connection = Connection::new("c1", "A", "B", "default");
        assert!(connection.touches("A"));
        assert!(connection.touches("B"));
        assert!(!connection.touches("C"));
        assert!(!connection.has_label());
    }
}
