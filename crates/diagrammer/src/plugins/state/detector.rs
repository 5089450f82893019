//! State diagram detector implementation

use crate::core::{DiagramType, Detector};

/// State diagram detector implementation
pub struct StateDetector;

impl StateDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StateDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StateDetector {
    fn keywords(&self) -> &'static [&'static str] {
        &["stateDiagram", "stateDiagram-v2"]
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::State
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        let detector = StateDetector::new();
        assert!(detector.detect("stateDiagram"));
        assert!(detector.detect("stateDiagram-v2"));
        assert!(!detector.detect("stateDiagram-v3"));
    }
}
