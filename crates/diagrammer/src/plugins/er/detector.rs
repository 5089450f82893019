//! Entity-relationship detector implementation

use crate::core::{DiagramType, Detector};

/// Entity-relationship detector implementation
pub struct ErDetector;

impl ErDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ErDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ErDetector {
    fn keywords(&self) -> &'static [&'static str] {
        &["erDiagram"]
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Er
    }
}
