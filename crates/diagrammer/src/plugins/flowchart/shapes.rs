//! Flowchart lookup tables: node shapes and arrow tokens
//!
//! Both tables are constant data shared by the parser and the generator, so
//! every shape or arrow the generator emits is one the parser reads back.

use std::fmt;

/// Node shapes and their bracket pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum NodeShape {
    /// `A[label]`
    #[default]
    Rectangle,
    /// `A(label)`
    Rounded,
    /// `A((label))`
    Circle,
    /// `A{label}`
    Diamond,
    /// `A{{label}}`
    Hexagon,
    /// `A([label])`
    Stadium,
    /// `A[[label]]`
    Subroutine,
    /// `A[(label)]`
    Cylinder,
    /// `A>label]`
    Asymmetric,
    /// `A[/label/]`
    Parallelogram,
    /// `A[\label\]`
    ParallelogramAlt,
    /// `A[/label\]`
    Trapezoid,
    /// `A[\label/]`
    TrapezoidAlt,
}

impl NodeShape {
    /// Every shape, ordered so that longer opening brackets come first
    pub const ALL: [NodeShape; 13] = [
        NodeShape::Circle,
        NodeShape::Stadium,
        NodeShape::Hexagon,
        NodeShape::Subroutine,
        NodeShape::Cylinder,
        NodeShape::Parallelogram,
        NodeShape::Trapezoid,
        NodeShape::ParallelogramAlt,
        NodeShape::TrapezoidAlt,
        NodeShape::Rectangle,
        NodeShape::Rounded,
        NodeShape::Diamond,
        NodeShape::Asymmetric,
    ];

    /// Key stored in the element's `shape` property
    pub fn key(&self) -> &'static str {
        match self {
            NodeShape::Rectangle => "rectangle",
            NodeShape::Rounded => "rounded",
            NodeShape::Circle => "circle",
            NodeShape::Diamond => "diamond",
            NodeShape::Hexagon => "hexagon",
            NodeShape::Stadium => "stadium",
            NodeShape::Subroutine => "subroutine",
            NodeShape::Cylinder => "cylinder",
            NodeShape::Asymmetric => "asymmetric",
            NodeShape::Parallelogram => "parallelogram",
            NodeShape::ParallelogramAlt => "parallelogram_alt",
            NodeShape::Trapezoid => "trapezoid",
            NodeShape::TrapezoidAlt => "trapezoid_alt",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|shape| shape.key() == key)
    }

    /// Opening and closing delimiters around the label
    pub fn delimiters(&self) -> (&'static str, &'static str) {
        match self {
            NodeShape::Rectangle => ("[", "]"),
            NodeShape::Rounded => ("(", ")"),
            NodeShape::Circle => ("((", "))"),
            NodeShape::Diamond => ("{", "}"),
            NodeShape::Hexagon => ("{{", "}}"),
            NodeShape::Stadium => ("([", "])"),
            NodeShape::Subroutine => ("[[", "]]"),
            NodeShape::Cylinder => ("[(", ")]"),
            NodeShape::Asymmetric => (">", "]"),
            NodeShape::Parallelogram => ("[/", "/]"),
            NodeShape::ParallelogramAlt => ("[\\", "\\]"),
            NodeShape::Trapezoid => ("[/", "\\]"),
            NodeShape::TrapezoidAlt => ("[\\", "/]"),
        }
    }

    /// Slanted shapes cannot carry unquoted slashes in their labels
    pub fn is_slanted(&self) -> bool {
        matches!(
            self,
            NodeShape::Parallelogram
                | NodeShape::ParallelogramAlt
                | NodeShape::Trapezoid
                | NodeShape::TrapezoidAlt
        )
    }
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Arrow tokens and the connection types they map to, longest token first
pub const ARROWS: [(&str, &str); 9] = [
    ("-.->", "dotted_arrow"),
    ("-.-", "dotted"),
    ("==>", "thick"),
    ("===", "thick_line"),
    ("-->", "default"),
    ("---", "line"),
    ("--o", "circle"),
    ("--x", "cross"),
    ("~~~", "invisible"),
];

/// Connection type used when an arrow token is not in the table
pub const DEFAULT_CONNECTION_TYPE: &str = "default";
/// Arrow emitted for connection types not in the table
pub const DEFAULT_ARROW: &str = "-->";

/// Map an arrow token to its connection type
pub fn connection_type_for(arrow: &str) -> &'static str {
    ARROWS
        .iter()
        .find(|(token, _)| *token == arrow)
        .map(|(_, kind)| *kind)
        .unwrap_or(DEFAULT_CONNECTION_TYPE)
}

/// Map a connection type back to its arrow token
pub fn arrow_for(connection_type: &str) -> &'static str {
    ARROWS
        .iter()
        .find(|(_, kind)| *kind == connection_type)
        .map(|(token, _)| *token)
        .unwrap_or(DEFAULT_ARROW)
}
