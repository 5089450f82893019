//! Integration tests for the public API

use diagrammer::prelude::*;
use diagrammer::{generate, parse, validate, SHAPE_KEY, TYPE_KEY};

#[test]
fn test_parse_flowchart_chain() {
    let diagram = parse("graph TD; A-->B-->C-->D").unwrap();
    assert_eq!(diagram.element_count(), 4);
    assert_eq!(diagram.connection_count(), 3);
    assert_eq!(diagram.metadata.direction, Some(Direction::TopDown));
}

#[test]
fn test_parse_flowchart_shapes() {
    let diagram = parse("flowchart LR\n    A[Start] --> B{Ok?}\n    B -->|yes| C((Done))").unwrap();
    assert_eq!(diagram.get_element("A").unwrap().shape(), Some("rectangle"));
    assert_eq!(diagram.get_element("B").unwrap().shape(), Some("diamond"));
    assert_eq!(diagram.get_element("C").unwrap().shape(), Some("circle"));
    assert_eq!(diagram.get_element("C").unwrap().label, "Done");

    let labeled: Vec<_> = diagram
        .connections
        .values()
        .filter(|c| c.has_label())
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(labeled, vec!["yes"]);
}

#[test]
fn test_parse_sequence() {
    let diagram = parse("sequenceDiagram\n    participant A as Alice\n    A->>B: Hello\n    B-->>A: Hi").unwrap();
    assert_eq!(diagram.diagram_type, DiagramType::Sequence);
    assert_eq!(diagram.get_element("A").unwrap().label, "Alice");
    assert_eq!(diagram.get_element("B").unwrap().kind(), Some("participant"));

    let types: Vec<_> = diagram
        .connections
        .values()
        .map(|c| c.connection_type.as_str())
        .collect();
    assert_eq!(types, vec!["sync", "async"]);
}

#[test]
fn test_parse_class_relationships() {
    let diagram = parse("classDiagram\n    A --|> B\n    C ..|> D\n    E --> F").unwrap();
    let kinds: Vec<_> = diagram
        .connections
        .values()
        .map(|c| c.connection_type.as_str())
        .collect();
    assert_eq!(kinds, vec!["inheritance", "realization", "association"]);
    assert_eq!(diagram.get_element("A").unwrap().property_str(TYPE_KEY), Some("class"));
}

#[test]
fn test_parse_state_terminal() {
    let diagram = parse("stateDiagram-v2\n    [*] --> Idle\n    Idle --> [*]").unwrap();
    let terminal = diagram.get_element("[*]").unwrap();
    assert_eq!(terminal.label, "");
    assert_eq!(terminal.property_str(SHAPE_KEY), Some("circle"));
    assert_eq!(diagram.connection_count(), 2);
}

#[test]
fn test_parse_er_entities() {
    let diagram = parse("erDiagram\n    CUSTOMER ||--o{ ORDER : places\n    ORDER {\n        int id PK\n    }").unwrap();
    assert_eq!(diagram.diagram_type, DiagramType::Er);
    assert_eq!(diagram.element_count(), 2);

    let relationship = diagram.connections.values().next().unwrap();
    assert_eq!(relationship.label, "places");
    assert_eq!(relationship.connection_type, "identifying");
    assert_eq!(relationship.property_str("left_cardinality"), Some("exactly_one"));
    assert_eq!(relationship.property_str("right_cardinality"), Some("zero_or_more"));
}

#[test]
fn test_generate_every_dialect() {
    let cases = [
        ("flowchart TD\n    A --> B", "flowchart TD"),
        ("sequenceDiagram\n    A->>B: hi", "sequenceDiagram"),
        ("classDiagram\n    A --|> B", "classDiagram"),
        ("stateDiagram\n    A --> B", "stateDiagram-v2"),
        ("erDiagram\n    A ||--|| B : is", "erDiagram"),
    ];
    for (input, header) in cases {
        let code = generate(&parse(input).unwrap()).unwrap();
        assert!(code.starts_with(header), "{}", code);
        assert!(validate(&code).is_valid, "{}", code);
    }
}

#[test]
fn test_generated_title_comment() {
    let mut diagram = parse("flowchart LR\n    A --> B").unwrap();
    diagram.metadata.title = Some("Pipeline".to_string());
    let code = generate(&diagram).unwrap();
    assert!(code.starts_with("flowchart LR\n    %% title: Pipeline"));
    assert_eq!(parse(&code).unwrap().metadata.title.as_deref(), Some("Pipeline"));
}

#[test]
fn test_title_can_be_suppressed() {
    let mut diagram = parse("flowchart LR\n    A --> B").unwrap();
    diagram.metadata.title = Some("Pipeline".to_string());
    let orchestrator =
        Orchestrator::with_generator_config(GeneratorConfig::new().with_emit_title(false));
    let code = orchestrator.generate(&diagram).unwrap();
    assert!(!code.contains("%%"));
}

#[test]
fn test_default_direction_from_config() {
    let diagram = parse("graph\n    A --> B").unwrap();
    let orchestrator = Orchestrator::with_generator_config(
        GeneratorConfig::new().with_default_direction(Direction::LeftRight),
    );
    assert!(orchestrator.generate(&diagram).unwrap().starts_with("flowchart LR"));
}

#[test]
fn test_json_exchange_format() {
    let diagram = parse("flowchart TD\n    A[Start] --> B[End]").unwrap();
    let value = diagram.to_value().unwrap();

    assert_eq!(value["diagram_type"], "flowchart");
    assert_eq!(value["elements"]["A"]["element_type"], "node");
    assert_eq!(value["elements"]["A"]["position"]["x"], 0.0);
    assert_eq!(value["connections"]["conn_1"]["source_id"], "A");
    assert!(value["elements"]["A"]["created_at"].is_string());
    assert_eq!(value["metadata"]["element_count"], 2);

    let restored = Diagram::from_value(value).unwrap();
    assert_eq!(restored, diagram);
}

#[test]
fn test_json_string_round_trip() {
    let diagram = parse("classDiagram\n    class Animal {\n        +String name\n    }\n    Animal <|-- Dog").unwrap();
    let json = diagram.to_json_string().unwrap();
    assert_eq!(Diagram::from_json_str(&json).unwrap(), diagram);
}

#[test]
fn test_prelude_builder() {
    let mut builder = DiagramBuilder::new(DiagramType::Class);
    builder.add_element(
        Element::node("Animal", "Animal")
            .with_property(TYPE_KEY, "class")
            .with_property("attributes", serde_json::json!(["+String name"]))
            .with_property("methods", serde_json::json!([])),
    );
    builder.add_element(Element::node("Dog", "Dog"));
    builder.connect("Dog", "Animal", "inheritance", None);

    let code = builder.generate_code().unwrap();
    assert!(code.contains("class Animal {"));
    assert!(code.contains("Dog --|> Animal"));
}

#[test]
fn test_supported_types() {
    let orchestrator = Orchestrator::with_all_plugins();
    let names: Vec<String> = orchestrator
        .supported_types()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(names, vec!["flowchart", "sequence", "class", "state", "er"]);
}
