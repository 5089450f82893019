//! Diagrammer - Parse, edit and regenerate Mermaid-style diagram source
//!
//! Five dialects are understood: flowchart, sequence, class, state and
//! entity-relationship. Source text is parsed into a typed [`Diagram`], which
//! can be edited and turned back into canonical source text.
//!
//! # Quick Start
//!
//! ```rust
//! use diagrammer::{generate, parse, DiagramType};
//!
//! let diagram = parse("graph LR; A[Start] --> B{Done?}").unwrap();
//! assert_eq!(diagram.diagram_type, DiagramType::Flowchart);
//! assert_eq!(diagram.element_count(), 2);
//!
//! let code = generate(&diagram).unwrap();
//! assert!(code.starts_with("flowchart LR"));
//! ```
//!
//! # Editing
//!
//! ```rust
//! use diagrammer::prelude::*;
//!
//! let mut builder = DiagramBuilder::new(DiagramType::Flowchart);
//! builder.add_element(Element::node("A", "Start"));
//! builder.add_element(Element::node("B", "End"));
//! builder.connect("A", "B", "default", Some("go"));
//!
//! let code = builder.generate_code().unwrap();
//! assert!(code.contains("A -->|go| B"));
//! assert!(builder.validate().unwrap().is_valid);
//! ```

pub mod builder;
pub mod core;
pub mod plugins;
pub mod validator;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::{
        ConnectionPatch, DiagramBuilder, DiagramEvent, ElementPatch, EventKind,
    };
    pub use crate::core::{
        Connection, Detector, Diagram, DiagramError, DiagramMetadata, DiagramType, Direction,
        Element, ElementType, Generator, GeneratorConfig, Parser, Position, Size,
        ValidatorConfig,
    };
    pub use crate::plugins::Orchestrator;
    pub use crate::validator::{DiagramValidator, ValidationResult};
}

/// Parse diagram source text of any supported dialect
///
/// # Example
/// ```rust
/// use diagrammer::parse;
///
/// let diagram = parse("sequenceDiagram\n    Alice->>Bob: Hi").unwrap();
/// assert_eq!(diagram.connection_count(), 1);
/// ```
pub fn parse(input: &str) -> Result<Diagram> {
    plugins::Orchestrator::with_all_plugins().parse(input)
}

/// Generate canonical source text for `diagram`
pub fn generate(diagram: &Diagram) -> Result<String> {
    plugins::Orchestrator::with_all_plugins().generate(diagram)
}

/// Validate diagram source text with the default settings
///
/// # Example
/// ```rust
/// let result = diagrammer::validate("flowchart TD\n    A[Start --> B");
/// assert!(!result.is_valid);
/// ```
pub fn validate(input: &str) -> validator::ValidationResult {
    validator::DiagramValidator::new().validate(input)
}
