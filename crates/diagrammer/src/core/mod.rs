//! Core abstractions for diagram processing
//!
//! The shared model (elements, connections, the diagram aggregate) and the
//! traits every dialect plugin implements.

pub mod chumsky_utils;
mod config;
mod detector;
mod diagram;
mod element;
mod error;
mod generator;
pub mod logging;
mod parser;
mod types;

pub use config::*;
pub use detector::*;
pub use diagram::*;
pub use element::*;
pub use error::*;
pub use generator::*;
pub use logging::*;
pub use parser::*;
pub use types::*;
