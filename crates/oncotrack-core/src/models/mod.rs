//! Domain models for the case tracking engine.

mod case;
mod lists;

pub use case::*;
pub use lists::*;
