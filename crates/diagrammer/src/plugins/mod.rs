//! Plugin implementations for the supported dialects
//!
//! Each dialect directory provides a detector, a parser and a generator
//! implementing the core traits. The [`Orchestrator`] wires them together.

pub mod class;
pub mod er;
pub mod flowchart;
pub mod orchestrator;
pub mod sequence;
pub mod state;

pub use class::{ClassDetector, ClassGenerator, ClassParser};
pub use er::{ErDetector, ErGenerator, ErParser};
pub use flowchart::{FlowchartDetector, FlowchartGenerator, FlowchartParser, NodeShape};
pub use orchestrator::*;
pub use sequence::{SequenceDetector, SequenceGenerator, SequenceParser};
pub use state::{StateDetector, StateGenerator, StateParser};
