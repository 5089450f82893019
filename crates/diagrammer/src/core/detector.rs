//! Core detector trait for dialect identification
//!
//! Detectors look only at the type declaration line. The dispatcher asks each
//! registered detector in turn and hands the body to the first match.

use super::types::DiagramType;

/// Core trait for dialect detectors
///
/// # Example
/// ```
/// use diagrammer::core::Detector;
/// use diagrammer::plugins::flowchart::FlowchartDetector;
///
/// let detector = FlowchartDetector::new();
/// assert!(detector.detect("flowchart LR"));
/// assert!(!detector.detect("sequenceDiagram"));
/// ```
pub trait Detector: Send + Sync {
    /// Header keywords recognised by this detector, matched case-insensitively
    fn keywords(&self) -> &'static [&'static str];

    /// The dialect this detector identifies
    fn diagram_type(&self) -> DiagramType;

    /// Check whether `header` declares this dialect
    fn detect(&self, header: &str) -> bool {
        header_keyword(header).is_some_and(|word| {
            self.keywords()
                .iter()
                .any(|keyword| word.eq_ignore_ascii_case(keyword))
        })
    }
}

/// First whitespace/semicolon delimited token of a header line
pub fn header_keyword(header: &str) -> Option<&str> {
    header
        .trim()
        .split(|c: char| c.is_whitespace() || c == ';')
        .find(|token| !token.is_empty())
}
