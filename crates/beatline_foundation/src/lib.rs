//! Core value, type, and error definitions for Beatline.
//!
//! This crate provides:
//! - [`Value`] - The closed value domain scripts operate on
//! - [`Type`] - Type descriptors used in diagnostics
//! - [`Error`] - Rich error types with execution context
//! - Persistent collections ([`SharedList`], [`SharedMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod collections;
mod error;
mod types;
mod value;

pub use collections::{SharedList, SharedMap};
pub use error::{Error, ErrorContext, ErrorKind, SemanticLimit};
pub use types::Type;
pub use value::{Opaque, Value};

/// Result type alias using Beatline's Error.
pub type Result<T> = std::result::Result<T, Error>;
