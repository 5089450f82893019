//! State diagram parser using chumsky

use chumsky::prelude::*;
use serde_json::{json, Value};
use tracing::{debug, span, trace, Level};

use crate::core::chumsky_utils::{
    colon_label, identifier, inline_whitespace, quoted_string, rest_of_line, whitespace_required,
};
use crate::core::{
    DiagramType, Element, ElementType, ParseOutput, Parser as CoreParser, SHAPE_KEY, TYPE_KEY,
};

/// Start/end pseudo-state
pub const TERMINAL_STATE: &str = "[*]";

/// Connection type of every transition
pub const TRANSITION: &str = "transition";

const ROW_SPACING: f64 = 100.0;

/// `<<choice>>`, `<<fork>>` and `<<join>>`
pub const PSEUDO_STATES: [&str; 3] = ["choice", "fork", "join"];

/// A parsed state diagram statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `state Id`, `state "Label" as Id`, `state Id <<choice>>`, `state Id {`
    Declare {
        id: String,
        label: Option<String>,
        pseudo: Option<&'static str>,
        opens_block: bool,
    },
    /// `}` closing a composite state
    Close,
    /// `A --> B : label`
    Transition {
        source: String,
        target: String,
        label: Option<String>,
    },
    /// `Id : description`
    Describe { id: String, description: String },
}

/// State diagram parser
pub struct StateParser;

impl StateParser {
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
            Self::declare_parser(),
            just('}').then(end()).to(Statement::Close),
            Self::transition_parser(),
            Self::describe_parser(),
        ))
    }

    fn state_ref<'src>() -> impl Parser<'src, &'src str, String> + Clone {
        just(TERMINAL_STATE)
            .to(TERMINAL_STATE.to_string())
            .or(identifier())
    }

    fn declare_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        let aliased = quoted_string()
            .then_ignore(whitespace_required())
            .then_ignore(just("as"))
            .then_ignore(whitespace_required())
            .then(identifier())
            .map(|(label, id)| (id, Some(label)));
        let plain = identifier().map(|id| (id, None));
        let pseudo = whitespace_required()
            .ignore_then(just("<<"))
            .ignore_then(choice((
                just("choice").to("choice"),
                just("fork").to("fork"),
                just("join").to("join"),
            )))
            .then_ignore(just(">>"));
        let block = inline_whitespace().ignore_then(just('{'));

        just("state")
            .ignore_then(whitespace_required())
            .ignore_then(aliased.or(plain))
            .then(pseudo.or_not())
            .then(block.or_not())
            .then_ignore(end())
            .map(|(((id, label), pseudo), block)| Statement::Declare {
                id,
                label,
                pseudo,
                opens_block: block.is_some(),
            })
    }

    fn transition_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        Self::state_ref()
            .then_ignore(inline_whitespace())
            .then_ignore(just("-->"))
            .then_ignore(inline_whitespace())
            .then(Self::state_ref())
            .then(colon_label())
            .then_ignore(end())
            .map(|((source, target), label)| Statement::Transition {
                source,
                target,
                label,
            })
    }

    fn describe_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        identifier()
            .then_ignore(inline_whitespace())
            .then_ignore(just(':'))
            .then(rest_of_line())
            .then_ignore(end())
            .map(|(id, description)| Statement::Describe {
                id,
                description: description.trim().to_string(),
            })
    }

    /// Create the state if needed and register new ones with the open composite
    fn ensure_state<'a>(
        output: &'a mut ParseOutput,
        groups: &[String],
        id: &str,
    ) -> &'a mut Element {
        if !output.contains(id) && id != TERMINAL_STATE {
            if let Some(parent) = groups.last() {
                output.append_to_list(parent, "children", Value::from(id));
            }
        }
        output.ensure_element(id, |index| new_state(id, index))
    }

    fn apply(output: &mut ParseOutput, groups: &mut Vec<String>, statement: Statement) {
        match statement {
            Statement::Declare {
                id,
                label,
                pseudo,
                opens_block,
            } => {
                let element = Self::ensure_state(output, groups, &id);
                if let Some(label) = label {
                    element.label = label;
                }
                if let Some(pseudo) = pseudo {
                    element
                        .properties
                        .insert("pseudo".to_string(), Value::from(pseudo));
                    if pseudo == "choice" {
                        element
                            .properties
                            .insert(SHAPE_KEY.to_string(), Value::from("diamond"));
                    }
                }
                if opens_block {
                    element.element_type = ElementType::Container;
                    if !element.properties.contains_key("children") {
                        element
                            .properties
                            .insert("children".to_string(), json!([]));
                    }
                    groups.push(id);
                }
            }
            Statement::Close => {
                groups.pop();
            }
            Statement::Transition {
                source,
                target,
                label,
            } => {
                Self::ensure_state(output, groups, &source);
                Self::ensure_state(output, groups, &target);
                output.push_connection(&source, &target, TRANSITION, label);
            }
            Statement::Describe { id, description } => {
                let element = Self::ensure_state(output, groups, &id);
                if !description.is_empty() {
                    element.label = description;
                }
            }
        }
    }
}

impl Default for StateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreParser for StateParser {
    fn parse(&self, lines: &[&str]) -> ParseOutput {
        let parse_span = span!(Level::INFO, "parse_state", line_count = lines.len());
        let _enter = parse_span.enter();

        let mut output = ParseOutput::new();
        let mut groups: Vec<String> = Vec::new();

        for line in lines {
            match self.parse_statement(line) {
                Ok(statement) => Self::apply(&mut output, &mut groups, statement),
                Err(_) => trace!(line, "Skipping unrecognised statement"),
            }
        }

        debug!(
            element_count = output.elements.len(),
            connection_count = output.connections.len(),
            "Parsed state diagram"
        );
        output
    }

    fn name(&self) -> &'static str {
        "state"
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::State
    }
}

fn new_state(id: &str, index: usize) -> Element {
    let y = ROW_SPACING * index as f64;
    if id == TERMINAL_STATE {
        return Element::node(id, "")
            .with_property(TYPE_KEY, "state")
            .with_property(SHAPE_KEY, "circle")
            .with_position(0.0, y);
    }
    Element::node(id, id)
        .with_property(TYPE_KEY, "state")
        .with_property(SHAPE_KEY, "rectangle")
        .with_position(0.0, y)
}
