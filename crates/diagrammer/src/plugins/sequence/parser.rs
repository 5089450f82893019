//! Sequence diagram parser using chumsky

use chumsky::prelude::*;
use serde_json::{json, Value};
use tracing::{debug, span, trace, Level};

use crate::core::chumsky_utils::{
    colon_label, identifier, inline_whitespace, rest_of_line, whitespace_required,
};
use crate::core::{
    DiagramType, Element, ElementType, ParseOutput, Parser as CoreParser, TYPE_KEY,
};

/// Horizontal distance between participants
const COLUMN_SPACING: f64 = 200.0;
/// Vertical distance between notes
const NOTE_SPACING: f64 = 50.0;

/// Message arrows and their connection types, longest token first
pub const MESSAGE_ARROWS: [(&str, &str); 6] = [
    ("-->>", "async"),
    ("->>", "sync"),
    ("--x", "dotted_cross"),
    ("-->", "dotted"),
    ("-x", "cross"),
    ("->", "solid"),
];

/// Arrow emitted for unknown message types
pub const DEFAULT_MESSAGE_ARROW: &str = "->>";

pub fn message_type_for(arrow: &str) -> &'static str {
    MESSAGE_ARROWS
        .iter()
        .find(|(token, _)| *token == arrow)
        .map(|(_, kind)| *kind)
        .unwrap_or("sync")
}

pub fn message_arrow_for(message_type: &str) -> &'static str {
    MESSAGE_ARROWS
        .iter()
        .find(|(_, kind)| *kind == message_type)
        .map(|(token, _)| *token)
        .unwrap_or(DEFAULT_MESSAGE_ARROW)
}

/// A parsed sequence statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `participant A as Alice` / `actor B`
    Participant {
        id: String,
        label: Option<String>,
        participant_type: &'static str,
    },
    /// `A->>B: hello`
    Message {
        source: String,
        target: String,
        message_type: &'static str,
        label: Option<String>,
    },
    /// `Note over A,B: text`
    Note {
        placement: &'static str,
        participants: Vec<String>,
        text: String,
    },
}

/// Sequence diagram parser
pub struct SequenceParser;

impl SequenceParser {
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
            Self::participant_parser(),
            Self::note_parser(),
            Self::message_parser(),
        ))
    }

    fn participant_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        let kind = just("participant")
            .to("participant")
            .or(just("actor").to("actor"));
        let alias = whitespace_required()
            .ignore_then(just("as"))
            .ignore_then(whitespace_required())
            .ignore_then(rest_of_line())
            .map(|label| label.trim().to_string());

        kind.then_ignore(whitespace_required())
            .then(identifier())
            .then(alias.or_not())
            .then_ignore(inline_whitespace())
            .then_ignore(end())
            .map(|((participant_type, id), label)| Statement::Participant {
                id,
                label: label.filter(|l| !l.is_empty()),
                participant_type,
            })
    }

    fn note_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        let placement = choice((
            just("left of").to("left of"),
            just("right of").to("right of"),
            just("over").to("over"),
        ));
        let participants = identifier()
            .separated_by(just(',').padded_by(inline_whitespace()))
            .at_least(1)
            .collect::<Vec<_>>();

        just("Note")
            .or(just("note"))
            .ignore_then(whitespace_required())
            .ignore_then(placement)
            .then_ignore(whitespace_required())
            .then(participants)
            .then_ignore(inline_whitespace())
            .then_ignore(just(':'))
            .then(rest_of_line())
            .then_ignore(end())
            .map(|((placement, participants), text)| Statement::Note {
                placement,
                participants,
                text: text.trim().to_string(),
            })
    }

    fn message_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        let arrow = choice((
            just("-->>"),
            just("->>"),
            just("--x"),
            just("-->"),
            just("-x"),
            just("->"),
        ))
        .map(message_type_for);

        identifier()
            .then_ignore(inline_whitespace())
            .then(arrow)
            .then_ignore(inline_whitespace())
            .then(identifier())
            .then(colon_label())
            .then_ignore(end())
            .map(|(((source, message_type), target), label)| Statement::Message {
                source,
                target,
                message_type,
                label,
            })
    }

    fn participant_count(output: &ParseOutput) -> usize {
        output
            .elements
            .values()
            .filter(|e| e.kind() == Some("participant"))
            .count()
    }

    fn ensure_participant<'a>(output: &'a mut ParseOutput, id: &str) -> &'a mut Element {
        let column = Self::participant_count(output);
        output.ensure_element(id, |_| new_participant(id, column))
    }

    fn apply(output: &mut ParseOutput, order: &mut u64, statement: Statement) {
        match statement {
            Statement::Participant {
                id,
                label,
                participant_type,
            } => {
                let element = Self::ensure_participant(output, &id);
                if let Some(label) = label {
                    element.label = label;
                }
                element.properties.insert(
                    "participant_type".to_string(),
                    Value::from(participant_type),
                );
            }
            Statement::Message {
                source,
                target,
                message_type,
                label,
            } => {
                Self::ensure_participant(output, &source);
                Self::ensure_participant(output, &target);
                *order += 1;
                let connection = output.push_connection(&source, &target, message_type, label);
                connection
                    .properties
                    .insert("order".to_string(), Value::from(*order));
            }
            Statement::Note {
                placement,
                participants,
                text,
            } => {
                for id in &participants {
                    Self::ensure_participant(output, id);
                }
                *order += 1;
                let notes = output
                    .elements
                    .values()
                    .filter(|e| e.element_type == ElementType::Annotation)
                    .count();
                let x = participants
                    .first()
                    .and_then(|id| output.elements.get(id))
                    .map_or(0.0, |e| e.position.x);
                let note = Element::new(
                    format!("note_{}", notes + 1),
                    ElementType::Annotation,
                    text,
                )
                .with_property(TYPE_KEY, "note")
                .with_property("placement", placement)
                .with_property("participants", json!(participants))
                .with_property("order", *order)
                .with_position(x, NOTE_SPACING * *order as f64);
                output.insert_element(note);
            }
        }
    }
}

impl Default for SequenceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreParser for SequenceParser {
    fn parse(&self, lines: &[&str]) -> ParseOutput {
        let parse_span = span!(Level::INFO, "parse_sequence", line_count = lines.len());
        let _enter = parse_span.enter();

        let mut output = ParseOutput::new();
        let mut order = 0u64;

        for line in lines {
            match self.parse_statement(line) {
                Ok(statement) => Self::apply(&mut output, &mut order, statement),
                Err(_) => trace!(line, "Skipping unrecognised statement"),
            }
        }

        debug!(
            element_count = output.elements.len(),
            connection_count = output.connections.len(),
            "Parsed sequence diagram"
        );
        output
    }

    fn name(&self) -> &'static str {
        "sequence"
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Sequence
    }
}

fn new_participant(id: &str, column: usize) -> Element {
    Element::node(id, id)
        .with_property(TYPE_KEY, "participant")
        .with_property("participant_type", "participant")
        .with_position(COLUMN_SPACING * column as f64, 0.0)
}
