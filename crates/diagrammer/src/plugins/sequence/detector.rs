//! Sequence diagram detector implementation

use crate::core::{DiagramType, Detector};

/// Sequence diagram detector implementation
pub struct SequenceDetector;

impl SequenceDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SequenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for SequenceDetector {
    fn keywords(&self) -> &'static [&'static str] {
        &["sequenceDiagram"]
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Sequence
    }
}
