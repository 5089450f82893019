//! Flowchart detector implementation
//!
//! Recognises `flowchart` and the legacy `graph` header.

use tracing::trace;

use crate::core::{DiagramType, Detector};

/// Flowchart detector implementation
pub struct FlowchartDetector;

impl FlowchartDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FlowchartDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for FlowchartDetector {
    fn keywords(&self) -> &'static [&'static str] {
        &["flowchart", "graph"]
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Flowchart
    }

    fn detect(&self, header: &str) -> bool {
        let matched = crate::core::header_keyword(header).is_some_and(|word| {
            self.keywords()
                .iter()
                .any(|keyword| word.eq_ignore_ascii_case(keyword))
        });
        trace!(header, matched, "FlowchartDetector::detect called");
        matched
    }
}
