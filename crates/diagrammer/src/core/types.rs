//! Core type definitions for the diagram model
//!
//! Enums and small value types shared by every dialect: element kinds,
//! diagram types, flow direction and geometry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Open-ended key/value container used for `properties` and `style`
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;

/// Kind of element stored in a diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// A node, participant, class, state or entity
    #[default]
    Node,
    /// An element that stands in for an edge
    Edge,
    /// A grouping construct such as a subgraph
    Container,
    /// A note or other free-floating annotation
    Annotation,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Node => write!(f, "node"),
            ElementType::Edge => write!(f, "edge"),
            ElementType::Container => write!(f, "container"),
            ElementType::Annotation => write!(f, "annotation"),
        }
    }
}

/// Supported diagram dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum DiagramType {
    /// `flowchart` / `graph`
    #[default]
    Flowchart,
    /// `sequenceDiagram`
    Sequence,
    /// `classDiagram`
    Class,
    /// `stateDiagram` / `stateDiagram-v2`
    State,
    /// `erDiagram`
    Er,
}

impl DiagramType {
    /// Every dialect in declaration order
    pub const ALL: [DiagramType; 5] = [
        DiagramType::Flowchart,
        DiagramType::Sequence,
        DiagramType::Class,
        DiagramType::State,
        DiagramType::Er,
    ];

    /// Canonical header keyword emitted by generators
    pub fn keyword(&self) -> &'static str {
        match self {
            DiagramType::Flowchart => "flowchart",
            DiagramType::Sequence => "sequenceDiagram",
            DiagramType::Class => "classDiagram",
            DiagramType::State => "stateDiagram-v2",
            DiagramType::Er => "erDiagram",
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramType::Flowchart => write!(f, "flowchart"),
            DiagramType::Sequence => write!(f, "sequence"),
            DiagramType::Class => write!(f, "class"),
            DiagramType::State => write!(f, "state"),
            DiagramType::Er => write!(f, "er"),
        }
    }
}

impl FromStr for DiagramType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flowchart" | "graph" => Ok(DiagramType::Flowchart),
            "sequence" | "sequencediagram" => Ok(DiagramType::Sequence),
            "class" | "classdiagram" => Ok(DiagramType::Class),
            "state" | "statediagram" | "statediagram-v2" => Ok(DiagramType::State),
            "er" | "erdiagram" => Ok(DiagramType::Er),
            _ => Err(format!("Unknown diagram type: {}", s)),
        }
    }
}

/// Flow direction for flowchart headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Top to bottom (TD or TB)
    #[default]
    #[serde(rename = "TD", alias = "TB")]
    TopDown,
    /// Left to right (LR)
    #[serde(rename = "LR")]
    LeftRight,
    /// Right to left (RL)
    #[serde(rename = "RL")]
    RightLeft,
    /// Bottom to top (BT)
    #[serde(rename = "BT")]
    BottomUp,
}

impl FromStr for Direction {
    type Err = String;

    /// Parse direction from mermaid syntax (TD, TB, LR, RL, BT)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TD" | "TB" => Ok(Direction::TopDown),
            "LR" => Ok(Direction::LeftRight),
            "RL" => Ok(Direction::RightLeft),
            "BT" => Ok(Direction::BottomUp),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TopDown => write!(f, "TD"),
            Direction::LeftRight => write!(f, "LR"),
            Direction::RightLeft => write!(f, "RL"),
            Direction::BottomUp => write!(f, "BT"),
        }
    }
}

/// Position of an element or control point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("TD".parse(), Ok(Direction::TopDown));
        assert_eq!("tb".parse(), Ok(Direction::TopDown));
        assert_eq!("LR".parse(), Ok(Direction::LeftRight));
        assert_eq!("RL".parse(), Ok(Direction::RightLeft));
        assert_eq!("BT".parse(), Ok(Direction::BottomUp));
        assert!("invalid".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::TopDown.to_string(), "TD");
        assert_eq!(Direction::LeftRight.to_string(), "LR");
        assert_eq!(Direction::RightLeft.to_string(), "RL");
        assert_eq!(Direction::BottomUp.to_string(), "BT");
    }

    #[test]
    fn test_direction_serde_accepts_tb() {
        let dir: Direction = serde_json::from_str("\"TB\"").unwrap();
        assert_eq!(dir, Direction::TopDown);
        assert_eq!(serde_json::to_string(&dir).unwrap(), "\"TD\"");
    }

    #[test]
    fn test_element_type_serde() {
        assert_eq!(
            serde_json::to_string(&ElementType::Container).unwrap(),
            "\"container\""
        );
        let parsed: ElementType = serde_json::from_str("\"annotation\"").unwrap();
        assert_eq!(parsed, ElementType::Annotation);
    }

    #[test]
    fn test_diagram_type_from_str() {
        assert_eq!("graph".parse(), Ok(DiagramType::Flowchart));
        assert_eq!("sequenceDiagram".parse(), Ok(DiagramType::Sequence));
        assert_eq!("stateDiagram-v2".parse(), Ok(DiagramType::State));
        assert_eq!("ER".parse(), Ok(DiagramType::Er));
        assert!("gantt".parse::<DiagramType>().is_err());
    }

    #[test]
    fn test_diagram_type_keywords() {
        assert_eq!(DiagramType::Flowchart.keyword(), "flowchart");
        assert_eq!(DiagramType::Class.keyword(), "classDiagram");
        assert_eq!(DiagramType::ALL.len(), 5);
    }

    #[test]
    fn test_size_default() {
        let size = Size::default();
        assert_eq!(size.width, 120.0);
        assert_eq!(size.height, 60.0);
    }
}
