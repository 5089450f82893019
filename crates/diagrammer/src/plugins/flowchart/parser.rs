//! Flowchart parser using chumsky
//!
//! Each statement line is parsed into a [`Statement`] by an ordered set of
//! alternatives; statements that match nothing are skipped.

use chumsky::prelude::*;
use serde_json::{json, Value};
use tracing::{debug, span, trace, Level};

use super::shapes::{connection_type_for, NodeShape};
use crate::core::chumsky_utils::{
    identifier, inline_whitespace, quoted_string, rest_of_line, whitespace_required,
};
use crate::core::{
    DiagramType, Direction, Element, ElementType, ParseOutput,
    Parser as CoreParser, SHAPE_KEY, TYPE_KEY,
};

/// Characters that end an unquoted label
const LABEL_EXCLUDED: &str = "[](){}|\"\n\r\t";
/// Slanted shapes additionally stop at slashes
const SLANTED_LABEL_EXCLUDED: &str = "[](){}|\"/\\\n\r\t";

/// Vertical distance between auto-placed nodes
const ROW_SPACING: f64 = 100.0;

/// Node reference: id with optional shape/label and `:::class` suffix
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRef {
    pub id: String,
    pub shape: Option<(String, NodeShape)>,
    pub class: Option<String>,
}

/// One hop of an edge chain
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub connection_type: &'static str,
    pub label: Option<String>,
    pub target: NodeRef,
}

/// A parsed flowchart statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `A --> B -->|label| C`
    Chain { head: NodeRef, links: Vec<Link> },
    /// `A[label]` or a bare `A`
    Node(NodeRef),
    /// `subgraph id [title]`
    SubgraphStart { id: String, label: String },
    /// `end`
    SubgraphEnd,
    /// `style A,B fill:#f9f,stroke:#333`
    Style {
        ids: Vec<String>,
        declarations: Vec<(String, String)>,
    },
    /// `direction LR` inside a subgraph
    Direction(Direction),
}

/// Flowchart parser
pub struct FlowchartParser;

impl FlowchartParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single statement
    pub fn parse_statement(&self, input: &str) -> anyhow::Result<Statement> {
        Self::statement_parser()
            .parse(input.trim())
            .into_result()
            .map_err(|errors| anyhow::anyhow!("Parse errors: {:?}", errors))
    }

    fn statement_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        choice((
            Self::subgraph_parser(),
            just("end").then(end()).to(Statement::SubgraphEnd),
            Self::style_parser(),
            Self::direction_parser(),
            Self::chain_parser(),
            Self::node_ref().then_ignore(end()).map(Statement::Node),
        ))
    }

    fn subgraph_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        just("subgraph")
            .ignore_then(whitespace_required().ignore_then(rest_of_line()).or_not())
            .then_ignore(end())
            .map(|rest| {
                let (id, label) = subgraph_header(rest.as_deref().unwrap_or("").trim());
                Statement::SubgraphStart { id, label }
            })
    }

    fn style_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        just("style")
            .ignore_then(whitespace_required())
            .ignore_then(
                identifier()
                    .separated_by(just(','))
                    .at_least(1)
                    .collect::<Vec<_>>(),
            )
            .then_ignore(whitespace_required())
            .then(rest_of_line())
            .then_ignore(end())
            .map(|(ids, declarations)| Statement::Style {
                ids,
                declarations: parse_style_declarations(&declarations),
            })
    }

    fn direction_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        just("direction")
            .ignore_then(whitespace_required())
            .ignore_then(choice((
                just("TD"),
                just("TB"),
                just("LR"),
                just("RL"),
                just("BT"),
            )))
            .then_ignore(end())
            .map(|token: &str| Statement::Direction(token.parse().unwrap_or_default()))
    }

    fn chain_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        let link = inline_whitespace()
            .ignore_then(Self::arrow())
            .then_ignore(inline_whitespace())
            .then(Self::edge_label().then_ignore(inline_whitespace()).or_not())
            .then(Self::node_ref())
            .map(|((connection_type, label), target)| Link {
                connection_type,
                label: label.filter(|l| !l.is_empty()),
                target,
            });

        Self::node_ref()
            .then(link.repeated().at_least(1).collect::<Vec<_>>())
            .then_ignore(end())
            .map(|(head, links)| Statement::Chain { head, links })
    }

    /// Arrow tokens, longest first so `-.->` never reads as `-.-`
    fn arrow<'src>() -> impl Parser<'src, &'src str, &'static str> + Clone {
        choice((
            just("-.->"),
            just("-.-"),
            just("==>"),
            just("==="),
            just("-->"),
            just("---"),
            just("--o"),
            just("--x"),
            just("~~~"),
        ))
        .map(connection_type_for)
    }

    /// `|label|` between an arrow and its target
    fn edge_label<'src>() -> impl Parser<'src, &'src str, String> + Clone {
        just('|')
            .ignore_then(
                quoted_string().or(none_of("|").repeated().at_least(1).collect::<String>()),
            )
            .then_ignore(just('|'))
            .map(|s| s.trim().to_string())
    }

    fn node_ref<'src>() -> impl Parser<'src, &'src str, NodeRef> + Clone {
        identifier()
            .then(Self::shape_suffix().or_not())
            .then(just(":::").ignore_then(identifier()).or_not())
            .map(|((id, shape), class)| NodeRef { id, shape, class })
    }

    fn shape_suffix<'src>() -> impl Parser<'src, &'src str, (String, NodeShape)> + Clone {
        choice((
            shaped(NodeShape::Circle),
            shaped(NodeShape::Stadium),
            shaped(NodeShape::Hexagon),
            shaped(NodeShape::Subroutine),
            shaped(NodeShape::Cylinder),
            shaped(NodeShape::Parallelogram),
            shaped(NodeShape::Trapezoid),
            shaped(NodeShape::ParallelogramAlt),
            shaped(NodeShape::TrapezoidAlt),
            shaped(NodeShape::Rectangle),
            shaped(NodeShape::Rounded),
            shaped(NodeShape::Diamond),
            shaped(NodeShape::Asymmetric),
        ))
    }

    /// Create or update the node named by `node`, registering it with the
    /// innermost open subgraph when it is new
    fn declare(output: &mut ParseOutput, groups: &[String], node: &NodeRef) {
        let created = !output.contains(&node.id);
        let element = output.ensure_element(&node.id, |index| new_node(&node.id, index));

        if let Some((label, shape)) = &node.shape {
            element.label = label.clone();
            element
                .properties
                .insert(SHAPE_KEY.to_string(), Value::from(shape.key()));
        }
        if let Some(class) = &node.class {
            element
                .properties
                .insert("class".to_string(), Value::from(class.as_str()));
        }

        if created {
            if let Some(parent) = groups.last() {
                output.append_to_list(parent, "children", Value::from(node.id.as_str()));
            }
        }
    }

    fn apply(output: &mut ParseOutput, groups: &mut Vec<String>, statement: Statement) {
        match statement {
            Statement::Node(node) => Self::declare(output, groups, &node),
            Statement::Chain { head, links } => {
                Self::declare(output, groups, &head);
                let mut previous = head.id;
                for link in links {
                    Self::declare(output, groups, &link.target);
                    output.push_connection(
                        &previous,
                        &link.target.id,
                        link.connection_type,
                        link.label,
                    );
                    previous = link.target.id;
                }
            }
            Statement::SubgraphStart { id, label } => {
                let id = if id.is_empty() {
                    format!("subgraph_{}", output.elements.len() + 1)
                } else {
                    id
                };
                let created = output.insert_element(
                    Element::new(id.clone(), ElementType::Container, label)
                        .with_property(TYPE_KEY, "subgraph")
                        .with_property("children", json!([])),
                );
                if created {
                    if let Some(parent) = groups.last() {
                        output.append_to_list(parent, "children", Value::from(id.as_str()));
                    }
                }
                groups.push(id);
            }
            Statement::SubgraphEnd => {
                groups.pop();
            }
            Statement::Style { ids, declarations } => {
                for id in ids {
                    if let Some(element) = output.element_mut(&id) {
                        for (key, value) in &declarations {
                            element.style.insert(key.clone(), Value::from(value.as_str()));
                        }
                    }
                }
            }
            Statement::Direction(_) => {}
        }
    }
}

impl Default for FlowchartParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreParser for FlowchartParser {
    fn parse(&self, lines: &[&str]) -> ParseOutput {
        let parse_span = span!(Level::INFO, "parse_flowchart", line_count = lines.len());
        let _enter = parse_span.enter();

        let mut output = ParseOutput::new();
        let mut groups: Vec<String> = Vec::new();

        for line in lines {
            for statement_text in split_statements(line) {
                match self.parse_statement(statement_text) {
                    Ok(statement) => Self::apply(&mut output, &mut groups, statement),
                    Err(_) => trace!(statement = statement_text, "Skipping unrecognised statement"),
                }
            }
        }

        debug!(
            element_count = output.elements.len(),
            connection_count = output.connections.len(),
            "Parsed flowchart"
        );
        output
    }

    fn name(&self) -> &'static str {
        "flowchart"
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Flowchart
    }
}

/// Parser for one bracketed shape
fn shaped<'src>(shape: NodeShape) -> impl Parser<'src, &'src str, (String, NodeShape)> + Clone {
    let (open, close) = shape.delimiters();
    let excluded = if shape.is_slanted() {
        SLANTED_LABEL_EXCLUDED
    } else {
        LABEL_EXCLUDED
    };

    just(open)
        .ignore_then(node_label(excluded))
        .then_ignore(just(close))
        .map(move |label| (label, shape))
}

/// Quoted label, or unquoted text up to one of `excluded`
fn node_label<'src>(excluded: &'static str) -> impl Parser<'src, &'src str, String> + Clone {
    quoted_string().or(none_of(excluded)
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map(|s| s.trim().to_string()))
}

fn new_node(id: &str, index: usize) -> Element {
    Element::node(id, id)
        .with_property(SHAPE_KEY, NodeShape::Rectangle.key())
        .with_position(0.0, ROW_SPACING * index as f64)
}

/// Resolve `id [title]`, `id`, or free text after `subgraph`
fn subgraph_header(text: &str) -> (String, String) {
    if text.is_empty() {
        return (String::new(), String::new());
    }

    let titled = identifier()
        .then_ignore(inline_whitespace())
        .then_ignore(just('['))
        .then(node_label(LABEL_EXCLUDED))
        .then_ignore(just(']'))
        .then_ignore(end());
    if let Ok((id, label)) = titled.parse(text).into_result() {
        return (id, label);
    }

    if let Ok(id) = identifier().then_ignore(end()).parse(text).into_result() {
        return (id.clone(), id);
    }

    let title = text.trim_matches('"').to_string();
    let id = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    (id, title)
}

/// `fill:#f9f,stroke:#333` into key/value pairs
fn parse_style_declarations(text: &str) -> Vec<(String, String)> {
    text.split(',')
        .filter_map(|declaration| {
            let (key, value) = declaration.split_once(':')?;
            let key = key.trim();
            let value = value.trim();
            (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Split a line on `;` separators that sit outside double quotes
fn split_statements(line: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (index, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                statements.push(&line[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    statements.push(&line[start..]);

    statements
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
