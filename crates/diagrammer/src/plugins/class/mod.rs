//! Class diagram plugin
//!
//! ```text
//! classDiagram
//!     class Animal {
//!         <<abstract>>
//!         +String name
//!         +speak() void
//!     }
//!     Animal <|-- Dog
//!     Dog "1" --> "*" Bone : chews
//! ```
//!
//! Relationship tokens are matched longest first, so `--|>` is always
//! inheritance and never an association followed by stray characters.

mod detector;
mod generator;
mod parser;

pub use detector::*;
pub use generator::*;
pub use parser::*;
