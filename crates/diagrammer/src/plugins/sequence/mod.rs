//! Sequence diagram plugin
//!
//! ```text
//! sequenceDiagram
//!     participant A as Alice
//!     actor B as Bob
//!     A->>B: Hello
//!     Note over A,B: handshake
//!     B-->>A: Hi
//! ```
//!
//! Participants are nodes with `type: "participant"`, messages are
//! connections typed `sync`, `async`, `solid` or `dotted`, and notes are
//! annotations.

mod detector;
mod generator;
mod parser;

pub use detector::*;
pub use generator::*;
pub use parser::*;
