//! Type names built into the language.

pub mod types;

pub use types::{BuiltinType, ScalarKind, Shape};
