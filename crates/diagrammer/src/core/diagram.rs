//! The diagram aggregate
//!
//! A [`Diagram`] owns its elements and connections in insertion-ordered maps
//! keyed by id. Connections refer to elements by id only.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::element::{Connection, Element};
use super::error::Result;
use super::types::{DiagramType, Direction};

pub type ElementMap = IndexMap<String, Element>;
pub type ConnectionMap = IndexMap<String, Connection>;

/// Descriptive and derived data about a diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Flowchart direction; other dialects leave it unset
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub element_count: usize,
    #[serde(default)]
    pub connection_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for DiagramMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            title: None,
            description: None,
            direction: None,
            element_count: 0,
            connection_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

impl DiagramMetadata {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// A complete diagram: dialect, elements, connections and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub diagram_type: DiagramType,
    #[serde(default)]
    pub elements: ElementMap,
    #[serde(default)]
    pub connections: ConnectionMap,
    #[serde(default)]
    pub metadata: DiagramMetadata,
}

impl Diagram {
    pub fn new(diagram_type: DiagramType) -> Self {
        Self {
            diagram_type,
            elements: ElementMap::new(),
            connections: ConnectionMap::new(),
            metadata: DiagramMetadata::default(),
        }
    }

    /// Build a diagram from parser output, filling the derived metadata
    pub fn from_parts(
        diagram_type: DiagramType,
        elements: ElementMap,
        connections: ConnectionMap,
        metadata: DiagramMetadata,
    ) -> Self {
        let mut diagram = Self {
            diagram_type,
            elements,
            connections,
            metadata,
        };
        diagram.refresh_counts();
        diagram
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn get_element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_connection(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Connections where `element_id` is the source or the target
    pub fn connections_for<'a>(
        &'a self,
        element_id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections
            .values()
            .filter(move |connection| connection.touches(element_id))
    }

    /// Connection ids whose endpoints do not resolve to an element
    pub fn dangling_connections(&self) -> Vec<&str> {
        self.connections
            .values()
            .filter(|c| {
                !self.elements.contains_key(&c.source_id)
                    || !self.elements.contains_key(&c.target_id)
            })
            .map(|c| c.id.as_str())
            .collect()
    }

    /// Recompute counts without touching `updated_at`
    pub fn refresh_counts(&mut self) {
        self.metadata.element_count = self.elements.len();
        self.metadata.connection_count = self.connections.len();
    }

    /// Recompute counts and stamp `updated_at`
    pub fn mark_updated(&mut self) {
        self.refresh_counts();
        self.metadata.updated_at = Utc::now();
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.connections.clear();
        self.mark_updated();
    }

    /// Convert to the JSON exchange format
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild from the JSON exchange format
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new(DiagramType::default())
    }
}
