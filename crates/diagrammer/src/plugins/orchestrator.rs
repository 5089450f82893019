//! Plugin orchestrator for coordinating parse and generate dispatch
//!
//! The orchestrator owns one detector, parser and generator per dialect:
//! Detector → Parser → Diagram → Generator

use std::collections::HashMap;

use tracing::{debug, info, span, trace, warn, Level};

use crate::core::{
    header_keyword, Detector, Diagram, DiagramError, DiagramMetadata, DiagramType, Direction,
    Generator, GeneratorConfig, Parser, Result,
};
use crate::plugins::{class, er, flowchart, sequence, state};

/// Comment prefix that carries the diagram title
const TITLE_COMMENT: &str = "title:";

/// Source text split into its declaration line and statement lines
#[derive(Debug, Clone, PartialEq)]
pub struct SourceParts<'a> {
    /// Declaration line, without any `;`-joined statements
    pub header: &'a str,
    /// Statement lines: trimmed, with blank lines and `%%` comments removed
    pub body: Vec<&'a str>,
    /// Text of the first `%% title: ...` comment
    pub title: Option<String>,
}

impl<'a> SourceParts<'a> {
    /// Split `text`; returns `None` when there is no declaration line
    pub fn split(text: &'a str) -> Option<Self> {
        let mut header = None;
        let mut body = Vec::new();
        let mut title = None;

        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix("%%") {
                if title.is_none() {
                    title = comment
                        .trim()
                        .strip_prefix(TITLE_COMMENT)
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty());
                }
                continue;
            }
            if header.is_none() {
                match line.split_once(';') {
                    Some((declaration, rest)) => {
                        header = Some(declaration.trim());
                        let rest = rest.trim();
                        if !rest.is_empty() {
                            body.push(rest);
                        }
                    }
                    None => header = Some(line),
                }
                continue;
            }
            body.push(line);
        }

        Some(Self {
            header: header?,
            body,
            title,
        })
    }

    /// Direction token following the flowchart keyword, if any
    pub fn direction(&self) -> Option<Direction> {
        self.header
            .split_whitespace()
            .nth(1)
            .and_then(|token| token.parse().ok())
    }
}

/// Plugin orchestrator that coordinates dialect dispatch
///
/// Detectors are consulted in registration order; parsers and generators are
/// keyed by the dialect they handle.
pub struct Orchestrator {
    detectors: Vec<Box<dyn Detector>>,
    parsers: HashMap<DiagramType, Box<dyn Parser>>,
    generators: HashMap<DiagramType, Box<dyn Generator>>,
}

impl Orchestrator {
    /// Create a new empty orchestrator
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            parsers: HashMap::new(),
            generators: HashMap::new(),
        }
    }

    /// Create an orchestrator with every built-in dialect registered
    pub fn with_all_plugins() -> Self {
        Self::with_generator_config(GeneratorConfig::default())
    }

    /// Every built-in dialect, generators sharing `config`
    pub fn with_generator_config(config: GeneratorConfig) -> Self {
        let mut orchestrator = Self::new();

        orchestrator.register_detector(Box::new(flowchart::FlowchartDetector::new()));
        orchestrator.register_detector(Box::new(sequence::SequenceDetector::new()));
        orchestrator.register_detector(Box::new(class::ClassDetector::new()));
        orchestrator.register_detector(Box::new(state::StateDetector::new()));
        orchestrator.register_detector(Box::new(er::ErDetector::new()));

        orchestrator.register_parser(Box::new(flowchart::FlowchartParser::new()));
        orchestrator.register_parser(Box::new(sequence::SequenceParser::new()));
        orchestrator.register_parser(Box::new(class::ClassParser::new()));
        orchestrator.register_parser(Box::new(state::StateParser::new()));
        orchestrator.register_parser(Box::new(er::ErParser::new()));

        orchestrator.register_generator(Box::new(flowchart::FlowchartGenerator::with_config(
            config.clone(),
        )));
        orchestrator.register_generator(Box::new(sequence::SequenceGenerator::with_config(
            config.clone(),
        )));
        orchestrator.register_generator(Box::new(class::ClassGenerator::with_config(
            config.clone(),
        )));
        orchestrator.register_generator(Box::new(state::StateGenerator::with_config(
            config.clone(),
        )));
        orchestrator.register_generator(Box::new(er::ErGenerator::with_config(config)));

        orchestrator
    }

    /// Register a detector plugin; earlier registrations win on overlap
    pub fn register_detector(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    /// Register a parser, replacing any parser for the same dialect
    pub fn register_parser(&mut self, parser: Box<dyn Parser>) {
        self.parsers.insert(parser.diagram_type(), parser);
    }

    /// Register a generator, replacing any generator for the same dialect
    pub fn register_generator(&mut self, generator: Box<dyn Generator>) {
        self.generators.insert(generator.diagram_type(), generator);
    }

    /// Get registered detector dialects in consultation order
    pub fn get_detectors(&self) -> Vec<DiagramType> {
        self.detectors.iter().map(|d| d.diagram_type()).collect()
    }

    /// Dialects that can be both detected and parsed
    pub fn supported_types(&self) -> Vec<DiagramType> {
        DiagramType::ALL
            .into_iter()
            .filter(|t| self.parsers.contains_key(t) && self.detectors.iter().any(|d| d.diagram_type() == *t))
            .collect()
    }

    pub fn has_generator(&self, diagram_type: DiagramType) -> bool {
        self.generators.contains_key(&diagram_type)
    }

    fn detect_header(&self, header: &str) -> Result<DiagramType> {
        for detector in &self.detectors {
            trace!(dialect = %detector.diagram_type(), "Checking detector");
            if detector.detect(header) {
                let diagram_type = detector.diagram_type();
                info!(diagram_type = %diagram_type, "Detected diagram type");
                return Ok(diagram_type);
            }
        }

        warn!(header, "No suitable detector found for input");
        Err(DiagramError::unknown_type(
            header_keyword(header).unwrap_or(header),
        ))
    }

    /// Detect the dialect from the first non-blank, non-comment line
    pub fn detect_diagram_type(&self, text: &str) -> Result<DiagramType> {
        let detect_span = span!(Level::INFO, "detect_diagram_type", input_len = text.len());
        let _enter = detect_span.enter();

        let parts = SourceParts::split(text).ok_or(DiagramError::EmptyInput)?;
        self.detect_header(parts.header)
    }

    /// Parse source text into a diagram
    pub fn parse(&self, text: &str) -> Result<Diagram> {
        let parse_span = span!(Level::INFO, "parse_diagram", input_len = text.len());
        let _enter = parse_span.enter();

        let parts = SourceParts::split(text).ok_or(DiagramError::EmptyInput)?;
        let diagram_type = self.detect_header(parts.header)?;
        let parser = self
            .parsers
            .get(&diagram_type)
            .ok_or_else(|| DiagramError::unknown_type(diagram_type.to_string()))?;

        let output = parser.parse(&parts.body);

        let metadata = DiagramMetadata {
            title: parts.title.clone(),
            direction: parts.direction().filter(|_| diagram_type == DiagramType::Flowchart),
            ..DiagramMetadata::default()
        };

        let diagram = Diagram::from_parts(diagram_type, output.elements, output.connections, metadata);
        debug!(
            diagram_type = %diagram_type,
            element_count = diagram.element_count(),
            connection_count = diagram.connection_count(),
            "Parsing completed"
        );
        Ok(diagram)
    }

    /// Generate canonical source text for `diagram`
    pub fn generate(&self, diagram: &Diagram) -> Result<String> {
        let generate_span = span!(
            Level::INFO,
            "generate_diagram",
            diagram_type = %diagram.diagram_type
        );
        let _enter = generate_span.enter();

        let generator = self.generators.get(&diagram.diagram_type).ok_or_else(|| {
            warn!(diagram_type = %diagram.diagram_type, "No generator registered");
            DiagramError::missing_generator(diagram.diagram_type)
        })?;

        let code = generator.generate(&diagram.elements, &diagram.connections, &diagram.metadata);
        debug!(output_len = code.len(), "Generation completed");
        Ok(code)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orchestrator_creation() {
        let orchestrator = Orchestrator::new();
        assert!(orchestrator.get_detectors().is_empty());
        assert!(orchestrator.supported_types().is_empty());
    }

    #[test]
    fn test_with_all_plugins() {
        let orchestrator = Orchestrator::with_all_plugins();
        assert_eq!(orchestrator.supported_types(), DiagramType::ALL.to_vec());
        assert!(DiagramType::ALL.iter().all(|t| orchestrator.has_generator(*t)));
    }

    #[test]
    fn test_split_source() {
        let parts = SourceParts::split("\n%% title: Orders\n\ngraph LR; A-->B\n  %% note\n  B-->C\n\n")
            .unwrap();
        assert_eq!(parts.header, "graph LR");
        assert_eq!(parts.body, vec!["A-->B", "B-->C"]);
        assert_eq!(parts.title.as_deref(), Some("Orders"));
        assert_eq!(parts.direction(), Some(Direction::LeftRight));
    }

    #[test]
    fn test_split_source_without_header() {
        assert!(SourceParts::split("  \n%% only a comment\n").is_none());
    }

    #[test]
    fn test_detect_diagram_type() {
        let orchestrator = Orchestrator::with_all_plugins();
        let cases = [
            ("flowchart TD", DiagramType::Flowchart),
            ("graph;A-->B", DiagramType::Flowchart),
            ("sequenceDiagram", DiagramType::Sequence),
            ("classDiagram", DiagramType::Class),
            ("stateDiagram-v2", DiagramType::State),
            ("erDiagram", DiagramType::Er),
        ];
        for (input, expected) in cases {
            assert_eq!(orchestrator.detect_diagram_type(input).unwrap(), expected, "{}", input);
        }
    }

    #[test]
    fn test_detect_errors() {
        let orchestrator = Orchestrator::with_all_plugins();
        assert!(matches!(
            orchestrator.detect_diagram_type("   "),
            Err(DiagramError::EmptyInput)
        ));
        match orchestrator.detect_diagram_type("pie title Pets") {
            Err(DiagramError::UnknownDiagramType { diagram_type }) => assert_eq!(diagram_type, "pie"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_flowchart() {
        let orchestrator = Orchestrator::with_all_plugins();
        let diagram = orchestrator
            .parse("flowchart LR\n    A[Start] --> B[End]")
            .unwrap();
        assert_eq!(diagram.diagram_type, DiagramType::Flowchart);
        assert_eq!(diagram.metadata.direction, Some(Direction::LeftRight));
        assert_eq!(diagram.metadata.element_count, 2);
        assert_eq!(diagram.metadata.connection_count, 1);
    }

    #[test]
    fn test_parse_header_without_direction() {
        let diagram = Orchestrator::with_all_plugins().parse("graph\nA-->B").unwrap();
        assert_eq!(diagram.metadata.direction, None);
        let code = Orchestrator::with_all_plugins().generate(&diagram).unwrap();
        assert!(code.starts_with("flowchart TD"));
    }

    #[test]
    fn test_parse_semicolon_header() {
        let diagram = Orchestrator::with_all_plugins().parse("graph TD; A-->B;").unwrap();
        assert_eq!(diagram.element_count(), 2);
        assert_eq!(diagram.connection_count(), 1);
    }

    #[test]
    fn test_title_round_trip() {
        let orchestrator = Orchestrator::with_all_plugins();
        let diagram = orchestrator
            .parse("classDiagram\n%% title: Zoo\nAnimal <|-- Dog")
            .unwrap();
        assert_eq!(diagram.metadata.title.as_deref(), Some("Zoo"));
        let code = orchestrator.generate(&diagram).unwrap();
        assert!(code.contains("%% title: Zoo"));
    }

    #[test]
    fn test_generate_missing_generator() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.register_detector(Box::new(flowchart::FlowchartDetector::new()));
        let result = orchestrator.generate(&Diagram::new(DiagramType::Sequence));
        assert!(matches!(result, Err(DiagramError::MissingGenerator { .. })));
    }

    #[test]
    fn test_parse_invalid_syntax_is_lenient() {
        let diagram = Orchestrator::with_all_plugins()
            .parse("flowchart TD\ninvalid syntax that is not mermaid")
            .unwrap();
        assert_eq!(diagram.element_count(), 0);
    }
}
