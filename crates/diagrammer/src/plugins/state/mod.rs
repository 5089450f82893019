//! State diagram plugin
//!
//! ```text
//! stateDiagram-v2
//!     [*] --> Idle
//!     state "Waiting for input" as Waiting
//!     state check <<choice>>
//!     Idle --> Waiting : start
//!     Waiting --> [*]
//! ```
//!
//! `[*]` is a single circle-shaped element with an empty label; composite
//! `state Name { ... }` blocks become containers.

mod detector;
mod generator;
mod parser;

pub use detector::*;
pub use generator::*;
pub use parser::*;
