//! Core error types for diagram processing
//!
//! Malformed diagram text is never an error: parsers skip what they do not
//! understand and the validator reports diagnostics as data. The variants here
//! cover the dispatcher and serialization boundaries.

use thiserror::Error;

/// Core error types for diagram processing
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Unknown diagram type: {diagram_type}")]
    UnknownDiagramType { diagram_type: String },

    #[error("Empty diagram code")]
    EmptyInput,

    #[error("No generator registered for {diagram_type} diagrams")]
    MissingGenerator { diagram_type: String },

    #[error("Connections reference missing elements: {}", .connection_ids.join(", "))]
    DanglingConnections { connection_ids: Vec<String> },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create an unknown diagram type error from the offending header
    pub fn unknown_type(header: impl Into<String>) -> Self {
        Self::UnknownDiagramType {
            diagram_type: header.into(),
        }
    }

    /// Create a dangling connections error from the offending ids
    pub fn dangling_connections<S: AsRef<str>>(connection_ids: &[S]) -> Self {
        Self::DanglingConnections {
            connection_ids: connection_ids.iter().map(|id| id.as_ref().to_string()).collect(),
        }
    }

    /// Create a missing generator error
    pub fn missing_generator(diagram_type: impl ToString) -> Self {
        Self::MissingGenerator {
            diagram_type: diagram_type.to_string(),
        }
    }
}

/// Result alias used across the library
pub type Result<T, E = DiagramError> = std::result::Result<T, E>;
