//! Terminal rendering of validation reports
//!
//! Applies ANSI escape codes with crossterm when color is enabled.

use crossterm::style::{Color, Stylize};
use diagrammer::validator::ValidationResult;

fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("{}", text.with(color))
    } else {
        text.to_string()
    }
}

/// Format a validation report for the terminal
///
/// - Verdict line: Green when valid, Red otherwise
/// - Errors: Red
/// - Warnings: Yellow
/// - Suggestions: Cyan
pub fn render_report(result: &ValidationResult, suggestions: &[String], color: bool) -> String {
    let mut lines = Vec::new();

    let kind = result.diagram_type.as_deref().unwrap_or("unknown");
    if result.is_valid {
        lines.push(paint(&format!("✓ Valid {} diagram", kind), Color::Green, color));
    } else {
        lines.push(paint(
            &format!("✗ Invalid {} diagram ({} error(s))", kind, result.error_count()),
            Color::Red,
            color,
        ));
    }

    for error in &result.errors {
        lines.push(format!("  {} {}", paint("error:", Color::Red, color), error));
    }
    for warning in &result.warnings {
        lines.push(format!("  {} {}", paint("warning:", Color::Yellow, color), warning));
    }

    if !suggestions.is_empty() {
        lines.push(String::new());
        lines.push("Suggestions:".to_string());
        for suggestion in suggestions {
            lines.push(format!("  {} {}", paint("-", Color::Cyan, color), suggestion));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagrammer::validator::DiagramValidator;

    #[test]
    fn test_plain_report() {
        let result = DiagramValidator::new().validate("flowchart TD\n    A --> B");
        let report = render_report(&result, &[], false);
        assert_eq!(report, "✓ Valid flowchart diagram");
    }

    #[test]
    fn test_report_lists_errors_and_suggestions() {
        let result = DiagramValidator::new().validate("flowchart TD\n    A[Start --> B");
        let suggestions = vec!["Close the bracket".to_string()];
        let report = render_report(&result, &suggestions, false);
        assert!(report.starts_with("✗ Invalid flowchart diagram"));
        assert!(report.contains("error: Unclosed bracket"));
        assert!(report.contains("  - Close the bracket"));
        assert!(!report.contains("\x1b["));
    }

    #[test]
    fn test_colored_report() {
        let result = DiagramValidator::new().validate("");
        let report = render_report(&result, &[], true);
        assert!(report.contains("\x1b["));
        assert!(report.contains("Empty diagram code"));
    }
}
