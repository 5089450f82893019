//! Shared chumsky combinators for the line-oriented dialect parsers
//!
//! Parsers receive one statement line at a time, so none of these consume
//! newlines.

use chumsky::prelude::*;

use super::parser::decode_entities;

/// Optional inline whitespace (spaces and tabs)
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t").repeated().ignored()
}

/// At least one inline whitespace character
pub fn whitespace_required<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t").repeated().at_least(1).ignored()
}

/// Identifier made of alphanumerics and underscores; may start with a digit
pub fn identifier<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .collect::<String>()
}

/// Double-quoted string; `#quot;` decodes to `"`
pub fn quoted_string<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    just('"')
        .ignore_then(none_of('"').repeated().collect::<String>())
        .then_ignore(just('"'))
        .map(|s| decode_entities(&s))
}

/// Optional `: label` tail, trimmed; empty labels become `None`
pub fn colon_label<'src>() -> impl Parser<'src, &'src str, Option<String>> + Clone {
    inline_whitespace()
        .ignore_then(just(':'))
        .ignore_then(any().repeated().collect::<String>())
        .map(|s| s.trim().to_string())
        .or_not()
        .map(|label| label.filter(|s| !s.is_empty()))
}

/// Everything up to the end of the line
pub fn rest_of_line<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    any().repeated().collect::<String>()
}
