//! Entity-relationship diagram plugin
//!
//! ```text
//! erDiagram
//!     CUSTOMER {
//!         string name PK "full name"
//!         string email UK
//!     }
//!     CUSTOMER ||--o{ ORDER : places
//!     ORDER }|..|{ LINE-ITEM : "contains many"
//! ```
//!
//! Relationships carry `left_cardinality`/`right_cardinality` properties and
//! are typed `identifying` (`--`) or `non_identifying` (`..`).

mod detector;
mod generator;
mod parser;

pub use detector::*;
pub use generator::*;
pub use parser::*;
