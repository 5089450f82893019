//! Error handling tests
//!
//! Dispatcher and serialization failures surface as `DiagramError`; domain
//! problems in diagram text never do.

use diagrammer::plugins::Orchestrator;
use diagrammer::{parse, Connection, Diagram, DiagramError, DiagramType, Element};

#[test]
fn test_unknown_type_names_the_keyword() {
    let err = parse("gantt\n    title Plan").unwrap_err();
    assert!(matches!(&err, DiagramError::UnknownDiagramType { diagram_type } if diagram_type == "gantt"));
    assert_eq!(err.to_string(), "Unknown diagram type: gantt");
}

#[test]
fn test_empty_input_message() {
    let err = parse("").unwrap_err();
    assert_eq!(err.to_string(), "Empty diagram code");
}

#[test]
fn test_missing_generator() {
    let orchestrator = Orchestrator::new();
    let err = orchestrator.generate(&Diagram::new(DiagramType::Er)).unwrap_err();
    assert_eq!(err.to_string(), "No generator registered for er diagrams");
}

#[test]
fn test_parse_without_parser() {
    let orchestrator = Orchestrator::new();
    assert!(matches!(
        orchestrator.parse("flowchart TD\n    A --> B"),
        Err(DiagramError::UnknownDiagramType { .. })
    ));
}

#[test]
fn test_serialization_errors_convert() {
    let err = Diagram::from_json_str("{\"diagram_type\": \"venn\"}").unwrap_err();
    assert!(matches!(err, DiagramError::Serialization { .. }));
    assert!(err.to_string().starts_with("Serialization error:"));

    assert!(Element::from_value(serde_json::json!({"id": "A"})).is_err());
    assert!(Connection::from_value(serde_json::json!([1, 2, 3])).is_err());
}

#[test]
fn test_io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "diagram.mmd");
    let err: DiagramError = io.into();
    assert!(matches!(err, DiagramError::IoError { .. }));
    assert_eq!(err.to_string(), "IO error: diagram.mmd");
}

#[test]
fn test_errors_work_with_anyhow() {
    fn load(text: &str) -> anyhow::Result<usize> {
        Ok(parse(text)?.element_count())
    }
    assert_eq!(load("graph TD; A-->B").unwrap(), 2);
    assert!(load("mindmap").is_err());
}

#[test]
fn test_malformed_text_is_not_an_error() {
    let diagram = parse("classDiagram\n    ??? \n    class {\n    <<>>").unwrap();
    assert_eq!(diagram.diagram_type, DiagramType::Class);
}
