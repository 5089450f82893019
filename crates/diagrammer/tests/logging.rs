//! Tests for logging functionality
//!
//! A global subscriber can only be installed once per process, so most calls
//! here only check that initialization never panics.

use diagrammer::core::logging::{init_default_logging, init_logging, LogFormat};
use std::str::FromStr;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("Pretty").unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
    assert!(LogFormat::from_str("xml").is_err());
}

#[test]
fn test_init_logging_with_levels() {
    let _ = init_logging(Some("trace"), Some("compact"));
    let _ = init_logging(Some("debug"), Some("pretty"));
    let _ = init_logging(Some("off"), Some("json"));
    let _ = init_logging(Some("info,diagrammer::validator=trace"), None);
}

#[test]
fn test_init_default_logging() {
    let _ = init_default_logging();
}

#[test]
fn test_invalid_format_is_rejected() {
    assert!(init_logging(Some("info"), Some("yaml")).is_err());
}

#[test]
fn test_second_init_fails_gracefully() {
    let _ = init_logging(Some("warn"), Some("compact"));
    assert!(init_logging(Some("warn"), Some("compact")).is_err());
}

#[test]
fn test_processing_with_logging_enabled() {
    let _ = init_logging(Some("trace"), Some("compact"));
    let diagram = diagrammer::parse("flowchart TD\n    A --> B\n    ???").unwrap();
    assert_eq!(diagram.element_count(), 2);
    assert!(diagrammer::validate("flowchart TD\n    A --> B").is_valid);
}
