//! Configuration for generators and the validator

use serde::{Deserialize, Serialize};

use super::types::Direction;

/// Settings shared by every generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Spaces per indentation level
    pub indent: usize,
    /// Direction used when a flowchart has none in its metadata
    pub default_direction: Direction,
    /// Emit a `%% title: ...` comment when the diagram has a title
    pub emit_title: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            indent: 4,
            default_direction: Direction::TopDown,
            emit_title: true,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    pub fn with_emit_title(mut self, emit_title: bool) -> Self {
        self.emit_title = emit_title;
        self
    }

    /// Indentation string for the given nesting depth (depth 1 is the body)
    pub fn pad(&self, depth: usize) -> String {
        " ".repeat(self.indent * depth)
    }
}

/// Thresholds for the validator's best-practice warnings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Warn when a flowchart header has no direction
    pub warn_missing_direction: bool,
    /// Warn when more than this many connections carry no label
    pub max_unlabeled_connections: usize,
    /// Warn when nothing follows the type declaration
    pub warn_empty_body: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            warn_missing_direction: true,
            max_unlabeled_connections: 10,
            warn_empty_body: true,
        }
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing_direction_warning(mut self, enabled: bool) -> Self {
        self.warn_missing_direction = enabled;
        self
    }

    pub fn with_max_unlabeled_connections(mut self, max: usize) -> Self {
        self.max_unlabeled_connections = max;
        self
    }

    pub fn with_empty_body_warning(mut self, enabled: bool) -> Self {
        self.warn_empty_body = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.indent, 4);
        assert_eq!(config.default_direction, Direction::TopDown);
        assert!(config.emit_title);
        assert_eq!(config.pad(2), "        ");
    }

    #[test]
    fn test_generator_builders() {
        let config = GeneratorConfig::new()
            .with_indent(2)
            .with_default_direction(Direction::LeftRight)
            .with_emit_title(false);
        assert_eq!(config.pad(1), "  ");
        assert_eq!(config.default_direction, Direction::LeftRight);
        assert!(!config.emit_title);
    }

    #[test]
    fn test_validator_partial_json() {
        let config: ValidatorConfig =
            serde_json::from_str(r#"{"max_unlabeled_connections": 3}"#).unwrap();
        assert_eq!(config.max_unlabeled_connections, 3);
        assert!(config.warn_missing_direction);
    }
}
