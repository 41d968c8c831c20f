//! Step identifiers and definitions.
//!
//! - [`uri`] parses `scheme://namespace/version/name` identifiers
//! - [`step`] holds a parsed step together with its dependencies

pub mod step;
pub mod uri;

pub use step::Step;
pub use uri::{StepKind, StepUri};
