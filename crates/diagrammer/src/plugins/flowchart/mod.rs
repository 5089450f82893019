//! Flowchart diagram plugin
//!
//! ```text
//! flowchart LR
//!     A[Start] --> B{Valid?}
//!     B -->|yes| C((Done))
//!     subgraph retry [Retry loop]
//!         B -.-> D[/Fix/]
//!     end
//!     style C fill:#9f9
//! ```
//!
//! Nodes become [`Node`](crate::core::ElementType::Node) elements with a
//! `shape` property, subgraphs become containers listing their `children`.

mod detector;
mod generator;
mod parser;
mod shapes;

pub use detector::*;
pub use generator::*;
pub use parser::*;
pub use shapes::*;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::core::{Detector, Generator, Parser};

    #[test]
    fn test_full_pipeline() {
        let detector = FlowchartDetector::new();
        assert!(detector.detect("graph TD"));

        let parser = FlowchartParser::new();
        let output = parser.parse(&[
            "A[Start] --> B{Decision}",
            "B -->|Yes| C[Process 1]",
            "B -->|No| D[Process 2]",
            "C --> E[End]",
            "D --> E",
        ]);
        assert_eq!(output.elements.len(), 5);
        assert_eq!(output.connections.len(), 5);
        assert_eq!(output.elements["B"].shape(), Some("diamond"));

        let code = FlowchartGenerator::new().generate(
            &output.elements,
            &output.connections,
            &Default::default(),
        );
        assert!(code.starts_with("flowchart TD"));
        assert!(code.contains("B -->|Yes| C"));
    }

    #[test]
    fn test_self_loop() {
        let output = FlowchartParser::new().parse(&["A[Process] --> A"]);
        assert_eq!(output.elements.len(), 1);
        assert_eq!(output.connections.len(), 1);
    }
}
