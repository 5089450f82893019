//! Builder façade over one diagram
//!
//! [`DiagramBuilder`] owns a [`Diagram`] exclusively and is the single writer
//! for it. Every mutation is applied in full, metadata counts and
//! `updated_at` are refreshed, and only then are the observers for that
//! event kind called, in registration order.
//!
//! An observer returning an error does not undo the mutation and does not
//! stop the observers registered after it; the error is logged with
//! `tracing::warn!`.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, span, warn, Level};

use crate::core::{
    next_connection_id, Connection, Diagram, DiagramError, DiagramType, Element, ElementType,
    GeneratorConfig, Position, PropertyMap, Result, Size, ValidatorConfig,
};
use crate::plugins::Orchestrator;
use crate::validator::{DiagramValidator, ValidationResult};

/// Kinds of change observers can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ElementAdded,
    ElementUpdated,
    ElementRemoved,
    ConnectionAdded,
    ConnectionUpdated,
    ConnectionRemoved,
}

/// A change that has already been applied to the diagram
#[derive(Debug, Clone, Copy)]
pub enum DiagramEvent<'a> {
    ElementAdded(&'a Element),
    ElementUpdated(&'a Element),
    ElementRemoved(&'a Element),
    ConnectionAdded(&'a Connection),
    ConnectionUpdated(&'a Connection),
    ConnectionRemoved(&'a Connection),
}

impl DiagramEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            DiagramEvent::ElementAdded(_) => EventKind::ElementAdded,
            DiagramEvent::ElementUpdated(_) => EventKind::ElementUpdated,
            DiagramEvent::ElementRemoved(_) => EventKind::ElementRemoved,
            DiagramEvent::ConnectionAdded(_) => EventKind::ConnectionAdded,
            DiagramEvent::ConnectionUpdated(_) => EventKind::ConnectionUpdated,
            DiagramEvent::ConnectionRemoved(_) => EventKind::ConnectionRemoved,
        }
    }

    /// Id of the element or connection the event is about
    pub fn subject_id(&self) -> &str {
        match self {
            DiagramEvent::ElementAdded(e)
            | DiagramEvent::ElementUpdated(e)
            | DiagramEvent::ElementRemoved(e) => &e.id,
            DiagramEvent::ConnectionAdded(c)
            | DiagramEvent::ConnectionUpdated(c)
            | DiagramEvent::ConnectionRemoved(c) => &c.id,
        }
    }
}

/// Observer callback
pub type Callback = Box<dyn FnMut(&DiagramEvent<'_>) -> anyhow::Result<()> + Send>;

#[derive(Default)]
struct Observers {
    callbacks: HashMap<EventKind, Vec<Callback>>,
}

impl Observers {
    fn register(&mut self, kind: EventKind, callback: Callback) {
        self.callbacks.entry(kind).or_default().push(callback);
    }

    fn count(&self, kind: EventKind) -> usize {
        self.callbacks.get(&kind).map_or(0, Vec::len)
    }

    fn notify(&mut self, event: &DiagramEvent<'_>) {
        let Some(callbacks) = self.callbacks.get_mut(&event.kind()) else {
            return;
        };
        for (index, callback) in callbacks.iter_mut().enumerate() {
            if let Err(error) = callback(event) {
                warn!(
                    event = ?event.kind(),
                    subject = event.subject_id(),
                    callback = index,
                    error = %error,
                    "Observer callback failed"
                );
            }
        }
    }
}

/// Partial update for an element; the id cannot change
///
/// `properties` and `style` are merged key by key, and a `null` value removes
/// the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub label: Option<String>,
    pub element_type: Option<ElementType>,
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub properties: Option<PropertyMap>,
    pub style: Option<PropertyMap>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn element_type(mut self, element_type: ElementType) -> Self {
        self.element_type = Some(element_type);
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .get_or_insert_with(PropertyMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn style(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.style
            .get_or_insert_with(PropertyMap::new)
            .insert(key.into(), value.into());
        self
    }

    fn apply(self, element: &mut Element) {
        if let Some(label) = self.label {
            element.label = label;
        }
        if let Some(element_type) = self.element_type {
            element.element_type = element_type;
        }
        if let Some(position) = self.position {
            element.position = position;
        }
        if let Some(size) = self.size {
            element.size = size;
        }
        if let Some(properties) = self.properties {
            merge(&mut element.properties, properties);
        }
        if let Some(style) = self.style {
            merge(&mut element.style, style);
        }
        element.touch();
    }
}

/// Partial update for a connection; the id cannot change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionPatch {
    pub source_id: Option<String>,
    pub target_id: Option<String>,
    pub label: Option<String>,
    pub connection_type: Option<String>,
    pub properties: Option<PropertyMap>,
    pub style: Option<PropertyMap>,
    pub control_points: Option<Vec<Position>>,
}

impl ConnectionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn connection_type(mut self, connection_type: impl Into<String>) -> Self {
        self.connection_type = Some(connection_type.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .get_or_insert_with(PropertyMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn control_points(mut self, points: Vec<Position>) -> Self {
        self.control_points = Some(points);
        self
    }

    fn apply(self, connection: &mut Connection) {
        if let Some(source_id) = self.source_id {
            connection.source_id = source_id;
        }
        if let Some(target_id) = self.target_id {
            connection.target_id = target_id;
        }
        if let Some(label) = self.label {
            connection.label = label;
        }
        if let Some(connection_type) = self.connection_type {
            connection.connection_type = connection_type;
        }
        if let Some(properties) = self.properties {
            merge(&mut connection.properties, properties);
        }
        if let Some(style) = self.style {
            merge(&mut connection.style, style);
        }
        if let Some(points) = self.control_points {
            connection.control_points = points;
        }
        connection.touch();
    }
}

fn merge(target: &mut PropertyMap, changes: PropertyMap) {
    for (key, value) in changes {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

/// Owner of one diagram with CRUD, cascade and change notification
pub struct DiagramBuilder {
    diagram: Diagram,
    observers: Observers,
    orchestrator: Orchestrator,
    validator: DiagramValidator,
}

impl DiagramBuilder {
    pub fn new(diagram_type: DiagramType) -> Self {
        Self::from_diagram(Diagram::new(diagram_type))
    }

    /// Take ownership of an existing diagram
    ///
    /// Connections whose endpoints are missing are dropped; use
    /// [`DiagramBuilder::from_value`] to reject such input instead.
    pub fn from_diagram(mut diagram: Diagram) -> Self {
        let dangling: Vec<String> = diagram
            .dangling_connections()
            .into_iter()
            .map(str::to_string)
            .collect();
        for id in &dangling {
            warn!(connection_id = %id, "Dropping connection with a missing endpoint");
            diagram.connections.shift_remove(id);
        }
        diagram.refresh_counts();
        Self {
            diagram,
            observers: Observers::default(),
            orchestrator: Orchestrator::with_all_plugins(),
            validator: DiagramValidator::new(),
        }
    }

    pub fn with_generator_config(mut self, config: GeneratorConfig) -> Self {
        self.orchestrator = Orchestrator::with_generator_config(config);
        self
    }

    pub fn with_validator_config(mut self, config: ValidatorConfig) -> Self {
        self.validator = DiagramValidator::with_config(config);
        self
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn diagram_type(&self) -> DiagramType {
        self.diagram.diagram_type
    }

    pub fn into_diagram(self) -> Diagram {
        self.diagram
    }

    /// Register `callback` for events of `kind`
    pub fn on<F>(&mut self, kind: EventKind, callback: F)
    where
        F: FnMut(&DiagramEvent<'_>) -> anyhow::Result<()> + Send + 'static,
    {
        self.observers.register(kind, Box::new(callback));
    }

    /// Register one callback for several event kinds
    pub fn subscribe<F>(&mut self, kinds: &[EventKind], callback: F)
    where
        F: FnMut(&DiagramEvent<'_>) -> anyhow::Result<()> + Clone + Send + 'static,
    {
        for kind in kinds {
            self.observers.register(*kind, Box::new(callback.clone()));
        }
    }

    pub fn observer_count(&self, kind: EventKind) -> usize {
        self.observers.count(kind)
    }

    // Elements

    /// Add `element`; rejected when its id is already taken
    pub fn add_element(&mut self, element: Element) -> bool {
        if self.diagram.elements.contains_key(&element.id) {
            warn!(element_id = %element.id, "Rejected duplicate element id");
            return false;
        }

        let id = element.id.clone();
        self.diagram.elements.insert(id.clone(), element);
        self.diagram.mark_updated();
        debug!(element_id = %id, "Element added");

        if let Some(element) = self.diagram.elements.get(&id) {
            self.observers.notify(&DiagramEvent::ElementAdded(element));
        }
        true
    }

    /// Apply `patch` to element `id`; false when there is no such element
    pub fn update_element(&mut self, id: &str, patch: ElementPatch) -> bool {
        let Some(element) = self.diagram.elements.get_mut(id) else {
            warn!(element_id = id, "Update for unknown element");
            return false;
        };
        patch.apply(element);
        self.diagram.mark_updated();
        debug!(element_id = id, "Element updated");

        if let Some(element) = self.diagram.elements.get(id) {
            self.observers.notify(&DiagramEvent::ElementUpdated(element));
        }
        true
    }

    /// Remove element `id` and every connection that touches it
    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        let removed = self.diagram.elements.shift_remove(id)?;

        let touching: Vec<String> = self
            .diagram
            .connections_for(id)
            .map(|c| c.id.clone())
            .collect();
        let cascaded: Vec<Connection> = touching
            .iter()
            .filter_map(|connection_id| self.diagram.connections.shift_remove(connection_id))
            .collect();
        self.diagram.mark_updated();
        debug!(
            element_id = id,
            cascaded = cascaded.len(),
            "Element removed"
        );

        for connection in &cascaded {
            self.observers
                .notify(&DiagramEvent::ConnectionRemoved(connection));
        }
        self.observers.notify(&DiagramEvent::ElementRemoved(&removed));
        Some(removed)
    }

    pub fn get_element(&self, id: &str) -> Option<&Element> {
        self.diagram.get_element(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.diagram.elements.values()
    }

    // Connections

    fn endpoints_exist(&self, source_id: &str, target_id: &str) -> bool {
        self.diagram.elements.contains_key(source_id)
            && self.diagram.elements.contains_key(target_id)
    }

    /// Add `connection`; rejected for a taken id or a missing endpoint
    pub fn add_connection(&mut self, connection: Connection) -> bool {
        if self.diagram.connections.contains_key(&connection.id) {
            warn!(connection_id = %connection.id, "Rejected duplicate connection id");
            return false;
        }
        if !self.endpoints_exist(&connection.source_id, &connection.target_id) {
            warn!(
                connection_id = %connection.id,
                source = %connection.source_id,
                target = %connection.target_id,
                "Rejected connection to a missing element"
            );
            return false;
        }

        let id = connection.id.clone();
        self.diagram.connections.insert(id.clone(), connection);
        self.diagram.mark_updated();
        debug!(connection_id = %id, "Connection added");

        if let Some(connection) = self.diagram.connections.get(&id) {
            self.observers
                .notify(&DiagramEvent::ConnectionAdded(connection));
        }
        true
    }

    /// Connect two existing elements under a fresh `conn_N` id
    pub fn connect(
        &mut self,
        source_id: &str,
        target_id: &str,
        connection_type: &str,
        label: Option<&str>,
    ) -> Option<String> {
        let id = next_connection_id(&self.diagram.connections);
        let connection = Connection::new(id.clone(), source_id, target_id, connection_type)
            .with_label(label.unwrap_or_default());
        self.add_connection(connection).then_some(id)
    }

    /// Apply `patch` to connection `id`; false when the connection is missing
    /// or the patched endpoints do not exist
    pub fn update_connection(&mut self, id: &str, patch: ConnectionPatch) -> bool {
        let Some(current) = self.diagram.connections.get(id) else {
            warn!(connection_id = id, "Update for unknown connection");
            return false;
        };
        let source = patch.source_id.as_deref().unwrap_or(&current.source_id);
        let target = patch.target_id.as_deref().unwrap_or(&current.target_id);
        if !self.endpoints_exist(source, target) {
            warn!(connection_id = id, "Rejected update to a missing element");
            return false;
        }

        if let Some(connection) = self.diagram.connections.get_mut(id) {
            patch.apply(connection);
        }
        self.diagram.mark_updated();
        debug!(connection_id = id, "Connection updated");

        if let Some(connection) = self.diagram.connections.get(id) {
            self.observers
                .notify(&DiagramEvent::ConnectionUpdated(connection));
        }
        true
    }

    pub fn remove_connection(&mut self, id: &str) -> Option<Connection> {
        let removed = self.diagram.connections.shift_remove(id)?;
        self.diagram.mark_updated();
        debug!(connection_id = id, "Connection removed");

        self.observers
            .notify(&DiagramEvent::ConnectionRemoved(&removed));
        Some(removed)
    }

    pub fn get_connection(&self, id: &str) -> Option<&Connection> {
        self.diagram.get_connection(id)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.diagram.connections.values()
    }

    /// Connections where `element_id` is the source or the target
    pub fn connections_for<'a>(&'a self, element_id: &'a str) -> Vec<&'a Connection> {
        self.diagram.connections_for(element_id).collect()
    }

    /// Drop every element and connection without notifying observers
    pub fn clear(&mut self) {
        self.diagram.clear();
        info!("Diagram cleared");
    }

    // Source text

    /// Replace the diagram with the one parsed from `text`
    ///
    /// Observers are not notified per element; on error the current diagram
    /// is left untouched.
    pub fn load_from_code(&mut self, text: &str) -> Result<()> {
        let load_span = span!(Level::INFO, "load_from_code", input_len = text.len());
        let _enter = load_span.enter();

        let mut diagram = self.orchestrator.parse(text)?;
        diagram.metadata.created_at = self.diagram.metadata.created_at;
        diagram.metadata.description = self.diagram.metadata.description.take();
        diagram.mark_updated();
        self.diagram = diagram;

        info!(
            diagram_type = %self.diagram.diagram_type,
            element_count = self.diagram.element_count(),
            connection_count = self.diagram.connection_count(),
            "Loaded diagram from source"
        );
        Ok(())
    }

    /// Canonical source text for the current diagram
    pub fn generate_code(&self) -> Result<String> {
        self.orchestrator.generate(&self.diagram)
    }

    /// Validate the canonical source text of the current diagram
    pub fn validate(&self) -> Result<ValidationResult> {
        Ok(self.validator.validate(&self.generate_code()?))
    }

    /// Validate arbitrary source text with this builder's validator settings
    pub fn validate_code(&self, text: &str) -> ValidationResult {
        self.validator.validate(text)
    }

    // Serialization

    pub fn to_value(&self) -> Result<Value> {
        self.diagram.to_value()
    }

    /// Build a builder around a diagram in the JSON exchange format
    ///
    /// Fails when any connection references an element that does not exist.
    pub fn from_value(value: Value) -> Result<Self> {
        let diagram = Diagram::from_value(value)?;
        let dangling = diagram.dangling_connections();
        if !dangling.is_empty() {
            return Err(DiagramError::dangling_connections(&dangling));
        }
        Ok(Self::from_diagram(diagram))
    }
}

impl Default for DiagramBuilder {
    fn default() -> Self {
        Self::new(DiagramType::default())
    }
}
