//! Entity-relationship parser using chumsky
//!
//! Entity blocks span lines; attribute lines are routed to the entity whose
//! `{` is still open.

use chumsky::prelude::*;
use serde_json::{json, Map, Value};
use tracing::{debug, span, trace, Level};

use crate::core::chumsky_utils::{inline_whitespace, quoted_string, rest_of_line, whitespace_required};
use crate::core::{DiagramType, Element, ParseOutput, Parser as CoreParser, SHAPE_KEY, TYPE_KEY};

const GRID_COLUMNS: usize = 3;
const COLUMN_SPACING: f64 = 250.0;
const ROW_SPACING: f64 = 200.0;

/// Cardinality markers written on the left of the line
pub const LEFT_CARDINALITIES: [(&str, &str); 4] = [
    ("|o", "zero_or_one"),
    ("||", "exactly_one"),
    ("}o", "zero_or_more"),
    ("}|", "one_or_more"),
];

/// Cardinality markers written on the right of the line
pub const RIGHT_CARDINALITIES: [(&str, &str); 4] = [
    ("o|", "zero_or_one"),
    ("||", "exactly_one"),
    ("o{", "zero_or_more"),
    ("|{", "one_or_more"),
];

/// Line tokens and their connection types
pub const RELATIONSHIP_LINES: [(&str, &str); 2] = [("--", "identifying"), ("..", "non_identifying")];

pub const DEFAULT_CARDINALITY: &str = "exactly_one";

fn lookup(table: &[(&'static str, &'static str)], token: &str, fallback: &'static str) -> &'static str {
    table
        .iter()
        .find(|(t, _)| *t == token)
        .map_or(fallback, |(_, kind)| *kind)
}

fn reverse_lookup(table: &[(&'static str, &'static str)], kind: &str, fallback: &'static str) -> &'static str {
    table
        .iter()
        .find(|(_, k)| *k == kind)
        .map_or(fallback, |(token, _)| *token)
}

pub fn left_marker_for(cardinality: &str) -> &'static str {
    reverse_lookup(&LEFT_CARDINALITIES, cardinality, "||")
}

pub fn right_marker_for(cardinality: &str) -> &'static str {
    reverse_lookup(&RIGHT_CARDINALITIES, cardinality, "||")
}

pub fn line_for(connection_type: &str) -> &'static str {
    reverse_lookup(&RELATIONSHIP_LINES, connection_type, "--")
}

/// One attribute line inside an entity block
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub data_type: String,
    pub name: String,
    pub keys: Vec<String>,
    pub comment: Option<String>,
}

impl Attribute {
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::from(self.data_type.as_str()));
        map.insert("name".to_string(), Value::from(self.name.as_str()));
        map.insert("keys".to_string(), json!(self.keys));
        if let Some(comment) = &self.comment {
            map.insert("comment".to_string(), Value::from(comment.as_str()));
        }
        Value::Object(map)
    }
}

/// A parsed ER statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `CUSTOMER {`, `CUSTOMER { string name }` or a bare `CUSTOMER`
    Entity {
        name: String,
        attributes: Vec<Attribute>,
        opens_block: bool,
    },
    /// `CUSTOMER ||--o{ ORDER : places`
    Relationship {
        left: String,
        right: String,
        left_cardinality: &'static str,
        right_cardinality: &'static str,
        connection_type: &'static str,
        label: String,
    },
}

/// Entity-relationship parser
pub struct ErParser;

impl ErParser {
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

    /// Parse one attribute line
    pub fn parse_attribute(&self, input: &str) -> anyhow::Result<Attribute> {
        Self::attribute()
            .then_ignore(inline_whitespace())
            .then_ignore(end())
            .parse(input.trim())
            .into_result()
            .map_err(|errors| anyhow::anyhow!("Parse errors: {:?}", errors))
    }

    /// Parse whitespace-separated attributes, as found inside `{ ... }`
    pub fn parse_attributes(&self, input: &str) -> anyhow::Result<Vec<Attribute>> {
        Self::attribute_list(input)
    }

    fn attribute_list(input: &str) -> anyhow::Result<Vec<Attribute>> {
        Self::attribute()
            .separated_by(whitespace_required())
            .collect::<Vec<_>>()
            .then_ignore(end())
            .parse(input.trim())
            .into_result()
            .map_err(|errors| anyhow::anyhow!("Parse errors: {:?}", errors))
    }

    fn entity_name<'src>() -> impl Parser<'src, &'src str, String> + Clone {
        any()
            .filter(|c: &char| c.is_alphanumeric() || *c == '_' || *c == '-')
            .repeated()
            .at_least(1)
            .collect::<String>()
    }

    fn statement_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        choice((Self::relationship_parser(), Self::entity_parser()))
    }

    fn entity_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        let block = inline_whitespace()
            .ignore_then(just('{'))
            .ignore_then(rest_of_line());

        Self::entity_name()
            .then(block.or_not())
            .then_ignore(end())
            .map(|(name, block)| {
                let Some(rest) = block else {
                    return Statement::Entity {
                        name,
                        attributes: Vec::new(),
                        opens_block: false,
                    };
                };
                let (inner, opens_block) = match rest.split_once('}') {
                    Some((inner, _)) => (inner.to_string(), false),
                    None => (rest, true),
                };
                let attributes = Self::attribute_list(&inner).unwrap_or_else(|_| {
                    trace!(entity = %name, text = %inner, "Skipping unrecognised attributes");
                    Vec::new()
                });
                Statement::Entity {
                    name,
                    attributes,
                    opens_block,
                }
            })
    }

    fn relationship_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        let left = choice((just("|o"), just("||"), just("}o"), just("}|")))
            .map(|token| lookup(&LEFT_CARDINALITIES, token, DEFAULT_CARDINALITY));
        let right = choice((just("o|"), just("||"), just("o{"), just("|{")))
            .map(|token| lookup(&RIGHT_CARDINALITIES, token, DEFAULT_CARDINALITY));
        let line = just("--")
            .or(just(".."))
            .map(|token| lookup(&RELATIONSHIP_LINES, token, "identifying"));
        let label = inline_whitespace()
            .ignore_then(just(':'))
            .ignore_then(inline_whitespace())
            .ignore_then(
                quoted_string().or(rest_of_line().map(|s| s.trim().to_string())),
            )
            .then_ignore(inline_whitespace());

        Self::entity_name()
            .then_ignore(inline_whitespace())
            .then(left)
            .then(line)
            .then(right)
            .then_ignore(inline_whitespace())
            .then(Self::entity_name())
            .then(label.or_not())
            .then_ignore(end())
            .map(
                |(((((left, left_cardinality), connection_type), right_cardinality), right), label)| {
                    Statement::Relationship {
                        left,
                        right,
                        left_cardinality,
                        right_cardinality,
                        connection_type,
                        label: label.unwrap_or_default(),
                    }
                },
            )
    }

    fn attribute<'src>() -> impl Parser<'src, &'src str, Attribute> + Clone {
        let word = none_of(" \t\"").repeated().at_least(1).collect::<String>();
        let key = choice((just("PK"), just("FK"), just("UK"))).map(str::to_string);
        let keys = key
            .separated_by(just(',').padded_by(inline_whitespace()))
            .at_least(1)
            .collect::<Vec<_>>();

        word.clone()
            .then_ignore(whitespace_required())
            .then(word)
            .then(whitespace_required().ignore_then(keys).or_not())
            .then(whitespace_required().ignore_then(quoted_string()).or_not())
            .map(|(((data_type, name), keys), comment)| Attribute {
                data_type,
                name,
                keys: keys.unwrap_or_default(),
                comment,
            })
    }

    fn ensure_entity<'a>(output: &'a mut ParseOutput, name: &str) -> &'a mut Element {
        output.ensure_element(name, |index| new_entity(name, index))
    }

    fn add_attributes(&self, output: &mut ParseOutput, entity: &str, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        match self.parse_attributes(line) {
            Ok(attributes) => {
                for attribute in attributes {
                    output.append_to_list(entity, "attributes", attribute.to_value());
                }
            }
            Err(_) => trace!(entity, line, "Skipping unrecognised attribute"),
        }
    }
}

impl Default for ErParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreParser for ErParser {
    fn parse(&self, lines: &[&str]) -> ParseOutput {
        let parse_span = span!(Level::INFO, "parse_er", line_count = lines.len());
        let _enter = parse_span.enter();

        let mut output = ParseOutput::new();
        let mut open_entity: Option<String> = None;

        for line in lines {
            let line = line.trim();
            if let Some(entity) = open_entity.take() {
                match line.split_once('}') {
                    Some((last, _)) => self.add_attributes(&mut output, &entity, last),
                    None => {
                        self.add_attributes(&mut output, &entity, line);
                        open_entity = Some(entity);
                    }
                }
                continue;
            }

            match self.parse_statement(line) {
                Ok(Statement::Entity {
                    name,
                    attributes,
                    opens_block,
                }) => {
                    Self::ensure_entity(&mut output, &name);
                    for attribute in attributes {
                        output.append_to_list(&name, "attributes", attribute.to_value());
                    }
                    if opens_block {
                        open_entity = Some(name);
                    }
                }
                Ok(Statement::Relationship {
                    left,
                    right,
                    left_cardinality,
                    right_cardinality,
                    connection_type,
                    label,
                }) => {
                    Self::ensure_entity(&mut output, &left);
                    Self::ensure_entity(&mut output, &right);
                    let connection =
                        output.push_connection(&left, &right, connection_type, Some(label));
                    connection
                        .properties
                        .insert("left_cardinality".to_string(), Value::from(left_cardinality));
                    connection
                        .properties
                        .insert("right_cardinality".to_string(), Value::from(right_cardinality));
                }
                Err(_) => trace!(line, "Skipping unrecognised statement"),
            }
        }

        debug!(
            element_count = output.elements.len(),
            connection_count = output.connections.len(),
            "Parsed ER diagram"
        );
        output
    }

    fn name(&self) -> &'static str {
        "er"
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Er
    }
}

fn new_entity(name: &str, index: usize) -> Element {
    Element::node(name, name)
        .with_property(TYPE_KEY, "entity")
        .with_property(SHAPE_KEY, "rectangle")
        .with_property("attributes", json!([]))
        .with_position(
            COLUMN_SPACING * (index % GRID_COLUMNS) as f64,
            ROW_SPACING * (index / GRID_COLUMNS) as f64,
        )
}
