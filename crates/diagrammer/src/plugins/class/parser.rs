//! Class diagram parser using chumsky
//!
//! Class bodies may span several lines, so the parser keeps track of the
//! class whose `{` is still open and routes lines to it until the `}`.

use chumsky::prelude::*;
use serde_json::{json, Value};
use tracing::{debug, span, trace, Level};

use crate::core::chumsky_utils::{
    colon_label, identifier, inline_whitespace, quoted_string, rest_of_line, whitespace_required,
};
use crate::core::{
    DiagramType, Element, ParseOutput, Parser as CoreParser, SHAPE_KEY, TYPE_KEY,
};

/// Classes per row in the auto layout
const GRID_COLUMNS: usize = 4;
const COLUMN_SPACING: f64 = 200.0;
const ROW_SPACING: f64 = 150.0;

/// Relationship tokens written left to right, longest first
pub const RELATIONS: [(&str, &str); 8] = [
    ("--|>", "inheritance"),
    ("..|>", "realization"),
    ("--*", "composition"),
    ("--o", "aggregation"),
    ("..>", "dependency"),
    ("-->", "association"),
    ("--", "link"),
    ("..", "dashed_link"),
];

/// Relationship tokens written right to left; endpoints are swapped
pub const REVERSED_RELATIONS: [(&str, &str); 6] = [
    ("<|--", "inheritance"),
    ("<|..", "realization"),
    ("*--", "composition"),
    ("o--", "aggregation"),
    ("<..", "dependency"),
    ("<--", "association"),
];

/// Arrow emitted for unknown relationship kinds
pub const DEFAULT_RELATION_ARROW: &str = "-->";

pub fn relation_arrow_for(kind: &str) -> &'static str {
    RELATIONS
        .iter()
        .find(|(_, k)| *k == kind)
        .map(|(token, _)| *token)
        .unwrap_or(DEFAULT_RELATION_ARROW)
}

fn relation_kind(token: &str) -> (&'static str, bool) {
    if let Some((_, kind)) = REVERSED_RELATIONS.iter().find(|(t, _)| *t == token) {
        return (kind, true);
    }
    let kind = RELATIONS
        .iter()
        .find(|(t, _)| *t == token)
        .map_or("association", |(_, kind)| *kind);
    (kind, false)
}

/// Where a class member line ends up
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Attribute(String),
    Method(String),
    Annotation(String),
}

impl Member {
    pub fn classify(text: &str) -> Option<Member> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(inner) = text.strip_prefix("<<").and_then(|t| t.strip_suffix(">>")) {
            return Some(Member::Annotation(inner.trim().to_string()));
        }
        if text.contains('(') {
            Some(Member::Method(text.to_string()))
        } else {
            Some(Member::Attribute(text.to_string()))
        }
    }
}

/// A parsed class diagram statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `class Name`, `class Name["Label"]`, optionally opening `{`
    Class {
        name: String,
        label: Option<String>,
        body: Option<String>,
    },
    /// `<<interface>> Name`
    Annotation { name: String, annotation: String },
    /// `Name : +member`
    Member { name: String, member: String },
    /// `A "1" --|> "*" B : label`
    Relation {
        source: String,
        target: String,
        kind: &'static str,
        source_cardinality: Option<String>,
        target_cardinality: Option<String>,
        label: Option<String>,
    },
}

/// Class diagram parser
pub struct ClassParser;

impl ClassParser {
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
            Self::class_parser(),
            Self::annotation_parser(),
            Self::relation_parser(),
            Self::member_parser(),
        ))
    }

    fn class_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        let label = just('[')
            .ignore_then(quoted_string())
            .then_ignore(just(']'));
        let body = inline_whitespace()
            .ignore_then(just('{'))
            .ignore_then(rest_of_line());

        just("class")
            .ignore_then(whitespace_required())
            .ignore_then(identifier())
            .then(label.or_not())
            .then(body.or_not())
            .then_ignore(inline_whitespace())
            .then_ignore(end())
            .map(|((name, label), body)| Statement::Class { name, label, body })
    }

    fn annotation_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        just("<<")
            .ignore_then(none_of(">").repeated().at_least(1).collect::<String>())
            .then_ignore(just(">>"))
            .then_ignore(inline_whitespace())
            .then(identifier())
            .then_ignore(end())
            .map(|(annotation, name)| Statement::Annotation {
                name,
                annotation: annotation.trim().to_string(),
            })
    }

    fn member_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        identifier()
            .then_ignore(inline_whitespace())
            .then_ignore(just(':'))
            .then(rest_of_line())
            .then_ignore(end())
            .map(|(name, member)| Statement::Member {
                name,
                member: member.trim().to_string(),
            })
    }

    fn relation_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        let token = choice((
            just("<|--"),
            just("<|.."),
            just("<.."),
            just("<--"),
            just("*--"),
            just("o--"),
            just("--|>"),
            just("..|>"),
            just("--*"),
            just("--o"),
            just("..>"),
            just("-->"),
            just("--"),
            just(".."),
        ));
        let cardinality = quoted_string().then_ignore(inline_whitespace()).or_not();

        identifier()
            .then_ignore(inline_whitespace())
            .then(cardinality.clone())
            .then(token)
            .then_ignore(inline_whitespace())
            .then(cardinality)
            .then(identifier())
            .then(colon_label())
            .then_ignore(end())
            .map(|(((((left, left_card), token), right_card), right), label)| {
                let (kind, reversed) = relation_kind(token);
                if reversed {
                    Statement::Relation {
                        source: right,
                        target: left,
                        kind,
                        source_cardinality: right_card,
                        target_cardinality: left_card,
                        label,
                    }
                } else {
                    Statement::Relation {
                        source: left,
                        target: right,
                        kind,
                        source_cardinality: left_card,
                        target_cardinality: right_card,
                        label,
                    }
                }
            })
    }

    fn ensure_class<'a>(output: &'a mut ParseOutput, name: &str) -> &'a mut Element {
        output.ensure_element(name, |index| new_class(name, index))
    }

    fn add_member(output: &mut ParseOutput, name: &str, text: &str) {
        let Some(member) = Member::classify(text) else {
            return;
        };
        let element = Self::ensure_class(output, name);
        match member {
            Member::Attribute(text) => push_member(element, "attributes", text),
            Member::Method(text) => push_member(element, "methods", text),
            Member::Annotation(text) => {
                element
                    .properties
                    .insert("annotation".to_string(), Value::from(text));
            }
        }
    }

    /// Apply one statement; returns the class whose body is left open
    fn apply(output: &mut ParseOutput, statement: Statement) -> Option<String> {
        match statement {
            Statement::Class { name, label, body } => {
                let element = Self::ensure_class(output, &name);
                if let Some(label) = label {
                    element.label = label;
                }
                let body = body?;
                match body.split_once('}') {
                    Some((inline, _)) => {
                        for member in inline.split(';') {
                            Self::add_member(output, &name, member);
                        }
                        None
                    }
                    None => {
                        Self::add_member(output, &name, &body);
                        Some(name)
                    }
                }
            }
            Statement::Annotation { name, annotation } => {
                Self::ensure_class(output, &name)
                    .properties
                    .insert("annotation".to_string(), Value::from(annotation));
                None
            }
            Statement::Member { name, member } => {
                Self::add_member(output, &name, &member);
                None
            }
            Statement::Relation {
                source,
                target,
                kind,
                source_cardinality,
                target_cardinality,
                label,
            } => {
                Self::ensure_class(output, &source);
                Self::ensure_class(output, &target);
                let connection = output.push_connection(&source, &target, kind, label);
                if let Some(cardinality) = source_cardinality {
                    connection
                        .properties
                        .insert("source_cardinality".to_string(), Value::from(cardinality));
                }
                if let Some(cardinality) = target_cardinality {
                    connection
                        .properties
                        .insert("target_cardinality".to_string(), Value::from(cardinality));
                }
                None
            }
        }
    }
}

impl Default for ClassParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreParser for ClassParser {
    fn parse(&self, lines: &[&str]) -> ParseOutput {
        let parse_span = span!(Level::INFO, "parse_class", line_count = lines.len());
        let _enter = parse_span.enter();

        let mut output = ParseOutput::new();
        let mut open_class: Option<String> = None;

        for line in lines {
            let line = line.trim();
            if let Some(name) = open_class.take() {
                match line.split_once('}') {
                    Some((last, _)) => Self::add_member(&mut output, &name, last),
                    None => {
                        Self::add_member(&mut output, &name, line);
                        open_class = Some(name);
                    }
                }
                continue;
            }

            match self.parse_statement(line) {
                Ok(statement) => open_class = Self::apply(&mut output, statement),
                Err(_) => trace!(line, "Skipping unrecognised statement"),
            }
        }

        debug!(
            element_count = output.elements.len(),
            connection_count = output.connections.len(),
            "Parsed class diagram"
        );
        output
    }

    fn name(&self) -> &'static str {
        "class"
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Class
    }
}

fn new_class(name: &str, index: usize) -> Element {
    Element::node(name, name)
        .with_property(TYPE_KEY, "class")
        .with_property(SHAPE_KEY, "rectangle")
        .with_property("attributes", json!([]))
        .with_property("methods", json!([]))
        .with_position(
            COLUMN_SPACING * (index % GRID_COLUMNS) as f64,
            ROW_SPACING * (index / GRID_COLUMNS) as f64,
        )
}

fn push_member(element: &mut Element, key: &str, text: String) {
    crate::core::append_property(&mut element.properties, key, Value::from(text));
}
