//! Structural validation of diagram source text
//!
//! The validator works on raw text only, so it can report on input that no
//! parser would accept. It detects the diagram type from the declaration
//! line, scans bracket balance line by line, and adds best-practice warnings.
//! Findings accumulate; nothing short-circuits after the type check.
//!
//! Each call starts from an empty accumulator, so repeated calls on the same
//! validator with the same text always agree.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, span, trace, Level};

use crate::core::ValidatorConfig;

pub const EMPTY_DIAGRAM: &str = "Empty diagram code";
pub const UNKNOWN_DIAGRAM_TYPE: &str = "Unknown or invalid diagram type";

/// Declaration keywords in match order, with the type name each reports
const TYPE_KEYWORDS: [(&str, &str); 12] = [
    ("flowchart", "flowchart"),
    ("graph", "flowchart"),
    ("sequenceDiagram", "sequenceDiagram"),
    ("classDiagram", "classDiagram"),
    ("stateDiagram", "stateDiagram"),
    ("erDiagram", "erDiagram"),
    ("journey", "journey"),
    ("gantt", "gantt"),
    ("pie", "pie"),
    ("gitgraph", "gitgraph"),
    ("mindmap", "mindmap"),
    ("timeline", "timeline"),
];

/// Connection tokens counted for the unlabeled-connection warning
const CONNECTION_TOKENS: [&str; 12] = [
    "-->", "---", "-.-", "==>", "===", "~~~", "->>", "->", "--|>", "..|>", "..>", "--",
];

/// Outcome of validating one source text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// 1-based line number to the errors found on that line
    pub line_errors: BTreeMap<usize, Vec<String>>,
    /// Type name reported by the declaration line, when recognised
    pub diagram_type: Option<String>,
}

impl ValidationResult {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Classes of error that fix suggestions are keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FindingKind {
    EmptyDiagram,
    UnknownType,
    UnmatchedBracket { found: char },
    UnclosedBracket { expected: char },
}

#[derive(Debug, Clone)]
struct Finding {
    kind: FindingKind,
    line: Option<usize>,
    message: String,
}

/// Per-call accumulator
#[derive(Debug, Default)]
struct Scan {
    findings: Vec<Finding>,
    warnings: Vec<String>,
    diagram_type: Option<&'static str>,
}

impl Scan {
    fn error(&mut self, kind: FindingKind, line: Option<usize>, message: String) {
        self.findings.push(Finding {
            kind,
            line,
            message,
        });
    }

    fn into_result(self) -> ValidationResult {
        let mut line_errors: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for finding in &self.findings {
            if let Some(line) = finding.line {
                line_errors
                    .entry(line)
                    .or_default()
                    .push(finding.message.clone());
            }
        }

        ValidationResult {
            is_valid: self.findings.is_empty(),
            errors: self.findings.into_iter().map(|f| f.message).collect(),
            warnings: self.warnings,
            line_errors,
            diagram_type: self.diagram_type.map(str::to_string),
        }
    }
}

/// Structural validator for diagram source text
#[derive(Debug, Clone, Default)]
pub struct DiagramValidator {
    config: ValidatorConfig,
}

impl DiagramValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate `text`, accumulating every finding
    pub fn validate(&self, text: &str) -> ValidationResult {
        let validate_span = span!(Level::INFO, "validate", input_len = text.len());
        let _enter = validate_span.enter();

        let result = self.scan(text).into_result();
        debug!(
            is_valid = result.is_valid,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Validation completed"
        );
        result
    }

    /// Remediation hints for the errors `validate` would report
    pub fn suggest_fixes(&self, text: &str) -> Vec<String> {
        let mut suggestions: Vec<String> = Vec::new();
        for finding in self.scan(text).findings {
            let suggestion = match finding.kind {
                FindingKind::EmptyDiagram => {
                    "Start with a diagram type declaration such as `flowchart TD`".to_string()
                }
                FindingKind::UnknownType => format!(
                    "Begin the first line with a supported diagram type: {}",
                    supported_keywords().join(", ")
                ),
                FindingKind::UnmatchedBracket { found } => format!(
                    "Remove the stray '{}' or add its opening bracket{}",
                    found,
                    at_line(finding.line)
                ),
                FindingKind::UnclosedBracket { expected } => format!(
                    "Add the missing '{}' for the bracket opened{}",
                    expected,
                    at_line(finding.line)
                ),
            };
            if !suggestions.contains(&suggestion) {
                suggestions.push(suggestion);
            }
        }
        suggestions
    }

    fn scan(&self, text: &str) -> Scan {
        let mut scan = Scan::default();

        if text.trim().is_empty() {
            scan.error(FindingKind::EmptyDiagram, None, EMPTY_DIAGRAM.to_string());
            return scan;
        }

        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with("%%"))
            .collect();

        let Some(&(header_line, header)) = lines.first() else {
            scan.error(FindingKind::EmptyDiagram, None, EMPTY_DIAGRAM.to_string());
            return scan;
        };

        scan.diagram_type = detect_diagram_type(header);
        if scan.diagram_type.is_none() {
            scan.error(
                FindingKind::UnknownType,
                Some(header_line),
                UNKNOWN_DIAGRAM_TYPE.to_string(),
            );
        }

        check_brackets(&mut scan, &lines);
        self.check_practices(&mut scan, header, &lines[1..]);
        scan
    }

    fn check_practices(&self, scan: &mut Scan, header: &str, body: &[(usize, &str)]) {
        let is_flowchart = scan.diagram_type == Some("flowchart");
        let header_body = header.split_once(';').map(|(_, rest)| rest.trim());
        let has_body = !body.is_empty() || header_body.is_some_and(|rest| !rest.is_empty());

        if self.config.warn_missing_direction && is_flowchart {
            let declaration = header.split(';').next().unwrap_or(header);
            if declaration.split_whitespace().nth(1).is_none() {
                scan.warnings.push(
                    "Flowchart has no direction (TD, LR, RL, BT); TD is assumed".to_string(),
                );
            }
        }

        if self.config.warn_empty_body && scan.diagram_type.is_some() && !has_body {
            scan.warnings
                .push("Diagram declares a type but has no content".to_string());
        }

        let unlabeled = body
            .iter()
            .filter(|(_, line)| CONNECTION_TOKENS.iter().any(|token| line.contains(token)))
            .filter(|(_, line)| !line.contains('|') && !line.contains(':'))
            .count();
        if unlabeled > self.config.max_unlabeled_connections {
            scan.warnings.push(format!(
                "{} connections have no label; consider labeling them",
                unlabeled
            ));
        }
    }
}

/// Walk every line with one bracket stack, skipping quoted text and
/// flowchart edge labels
fn check_brackets(scan: &mut Scan, lines: &[(usize, &str)]) {
    let dialect = scan.diagram_type;
    let is_flowchart = dialect == Some("flowchart");
    let mut stack: Vec<(char, usize)> = Vec::new();

    for &(number, line) in lines {
        let line = scannable_part(dialect, line);
        let depth_at_start = stack.len();
        let mut in_quotes = false;
        let mut in_edge_label = false;
        let mut previous: Option<char> = None;

        for c in line.chars() {
            match c {
                '"' => in_quotes = !in_quotes,
                _ if in_quotes => {}
                '|' if is_flowchart && stack.len() == depth_at_start => {
                    in_edge_label = !in_edge_label
                }
                _ if in_edge_label => {}
                '[' => stack.push((']', number)),
                '(' => stack.push((')', number)),
                '{' => stack.push(('}', number)),
                '>' if is_flowchart
                    && stack.len() == depth_at_start
                    && previous.is_some_and(|p| p.is_alphanumeric() || p == '_') =>
                {
                    stack.push((']', number))
                }
                ']' | ')' | '}' => match stack.last() {
                    Some(&(expected, _)) if expected == c => {
                        stack.pop();
                    }
                    _ => {
                        trace!(line = number, found = %c, "Unmatched bracket");
                        scan.error(
                            FindingKind::UnmatchedBracket { found: c },
                            Some(number),
                            format!("Unmatched closing bracket '{}' at line {}", c, number),
                        );
                    }
                },
                _ => {}
            }
            previous = Some(c);
        }
    }

    for (expected, number) in stack {
        scan.error(
            FindingKind::UnclosedBracket { expected },
            Some(number),
            format!("Unclosed bracket opened at line {}, expected '{}'", number, expected),
        );
    }
}

/// The part of a line whose brackets are structural
fn scannable_part<'a>(dialect: Option<&str>, line: &'a str) -> &'a str {
    match dialect {
        // Cardinality markers such as `||--o{` are not brackets
        Some("erDiagram") if line.contains("--") || line.contains("..") => {
            line.split_once(':').map_or("", |(_, label)| label)
        }
        Some("sequenceDiagram") | Some("stateDiagram") => {
            line.split_once(':').map_or(line, |(statement, _)| statement)
        }
        _ => line,
    }
}

fn at_line(line: Option<usize>) -> String {
    line.map(|n| format!(" at line {}", n)).unwrap_or_default()
}

/// Header keywords accepted by [`detect_diagram_type`]
pub fn supported_keywords() -> Vec<&'static str> {
    TYPE_KEYWORDS.iter().map(|(keyword, _)| *keyword).collect()
}

/// Type name for the first non-empty, non-comment line of `text`
///
/// Matching is a case-insensitive prefix test against a fixed ordered table.
pub fn detect_diagram_type(text: &str) -> Option<&'static str> {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("%%"))?
        .to_lowercase();

    TYPE_KEYWORDS
        .iter()
        .find(|(keyword, _)| first.starts_with(&keyword.to_lowercase()))
        .map(|(_, name)| *name)
}

/// Whether `id` is a plain identifier: `^[A-Za-z_][A-Za-z0-9_]*$`
pub fn validate_node_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(text: &str) -> ValidationResult {
        DiagramValidator::new().validate(text)
    }

    #[test]
    fn test_empty_input() {
        for text in ["", "   \n\t\n"] {
            let result = validate(text);
            assert!(!result.is_valid);
            assert_eq!(result.errors, vec![EMPTY_DIAGRAM.to_string()]);
            assert!(result.warnings.is_empty());
        }
    }

    #[test]
    fn test_valid_flowchart() {
        let result = validate("flowchart TD\n    A[Start] --> B[Process]");
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(result.diagram_type.as_deref(), Some("flowchart"));
        assert!(result.line_errors.is_empty());
    }

    #[test]
    fn test_unclosed_bracket() {
        let result = validate("flowchart TD\n A[Start --> B[Process]");
        assert!(!result.is_valid);
        assert_eq!(result.line_errors.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_unmatched_closer() {
        let result = validate("flowchart TD\n A[Start) --> B");
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("Unmatched closing bracket ')' at line 2"));
    }

    #[test]
    fn test_unknown_type_keeps_scanning() {
        let result = validate("nonsense\nA[broken");
        assert!(!result.is_valid);
        assert_eq!(result.errors[0], UNKNOWN_DIAGRAM_TYPE);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.line_errors[&1], vec![UNKNOWN_DIAGRAM_TYPE.to_string()]);
    }

    #[test]
    fn test_detect_diagram_type() {
        assert_eq!(detect_diagram_type("flowchart TD"), Some("flowchart"));
        assert_eq!(detect_diagram_type("graph LR"), Some("flowchart"));
        assert_eq!(detect_diagram_type("sequenceDiagram"), Some("sequenceDiagram"));
        assert_eq!(detect_diagram_type("stateDiagram-v2"), Some("stateDiagram"));
        assert_eq!(detect_diagram_type("GANTT"), Some("gantt"));
        assert_eq!(detect_diagram_type("\n\n  pie title Pets"), Some("pie"));
        assert_eq!(detect_diagram_type("nonsense"), None);
    }

    #[test]
    fn test_validate_node_id() {
        assert!(validate_node_id("A1"));
        assert!(validate_node_id("_private"));
        assert!(!validate_node_id("1A"));
        assert!(!validate_node_id("a-b"));
        assert!(!validate_node_id(""));
    }

    #[test]
    fn test_quoted_brackets_ignored() {
        assert!(validate("flowchart TD\n A[\"Load (cached\"] --> B").is_valid);
    }

    #[test]
    fn test_asymmetric_node() {
        assert!(validate("flowchart LR\n A>Flag] --> B").is_valid);
        assert!(validate("flowchart LR\n A --> B").is_valid);
        assert!(validate("flowchart LR\n A[x>y] --> B").is_valid);
    }

    #[test]
    fn test_edge_label_text_is_free() {
        assert!(validate("flowchart TD\n A -->|x>2| B").is_valid);
        assert!(validate("flowchart TD\n A -->|open (| B[ok]").is_valid);
        assert!(!validate("flowchart TD\n A -->|go| B[oops").is_valid);
        assert!(validate("flowchart TD\n A[a|b] --> B").is_valid);
    }

    #[test]
    fn test_er_cardinality_not_brackets() {
        let text = "erDiagram\n CUSTOMER ||--o{ ORDER : places\n ORDER {\n string id PK\n }";
        assert!(validate(text).is_valid);
    }

    #[test]
    fn test_sequence_message_text_is_free() {
        assert!(validate("sequenceDiagram\n A->>B: smile :)").is_valid);
    }

    #[test]
    fn test_missing_direction_warning() {
        let result = validate("graph\n A --> B");
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);

        let quiet = DiagramValidator::with_config(
            ValidatorConfig::default().with_missing_direction_warning(false),
        )
        .validate("graph\n A --> B");
        assert!(quiet.warnings.is_empty());
    }

    #[test]
    fn test_empty_body_warning() {
        let result = validate("classDiagram");
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec!["Diagram declares a type but has no content"]);
    }

    #[test]
    fn test_unlabeled_connection_warning() {
        let validator = DiagramValidator::with_config(
            ValidatorConfig::default().with_max_unlabeled_connections(1),
        );
        let result = validator.validate("flowchart TD\n A --> B\n B --> C\n C -->|ok| D");
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.starts_with("2 connections")));
    }

    #[test]
    fn test_repeated_calls_agree() {
        let validator = DiagramValidator::new();
        let text = "flowchart TD\n A[Start --> B{x)";
        assert_eq!(validator.validate(text), validator.validate(text));
        assert_eq!(validator.validate(""), validator.validate(""));
    }

    #[test]
    fn test_suggest_fixes() {
        let validator = DiagramValidator::new();
        assert_eq!(validator.suggest_fixes("").len(), 1);
        assert!(validator.suggest_fixes("nonsense")[0].contains("flowchart"));
        let fixes = validator.suggest_fixes("flowchart TD\n A[Start --> B");
        assert_eq!(fixes, vec!["Add the missing ']' for the bracket opened at line 2"]);
        assert!(validator.suggest_fixes("flowchart TD\n A --> B").is_empty());
    }
}
