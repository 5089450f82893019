//! Class diagram detector implementation

use crate::core::{DiagramType, Detector};

/// Class diagram detector implementation
pub struct ClassDetector;

impl ClassDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClassDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ClassDetector {
    fn keywords(&self) -> &'static [&'static str] {
        &["classDiagram", "classDiagram-v2"]
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Class
    }
}
