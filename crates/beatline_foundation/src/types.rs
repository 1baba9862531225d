//! Type descriptors used in runtime diagnostics.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type descriptor for a [`Value`](crate::Value).
///
/// Scripts are dynamically typed; these descriptors exist so that extern
/// functions can report what they expected when handed the wrong operand.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// The nil type (only value: nil).
    Nil,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// Either numeric type.
    Number,
    /// String type.
    String,
    /// List of values.
    List,
    /// Map from values to values.
    Map,
    /// Host-owned reference.
    Opaque,
    /// Any type (accepts any value).
    Any,
}

impl Type {
    /// Returns true if this type is `Any`.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Checks if a value type is accepted by this type.
    ///
    /// `Number` accepts both numeric types and `Float` accepts `Int`
    /// (numeric promotion); everything else must match exactly.
    #[must_use]
    pub const fn accepts(&self, value_type: &Type) -> bool {
        matches!(
            (self, value_type),
            (Self::Any, _)
                | (Self::Nil, Self::Nil)
                | (Self::Bool, Self::Bool)
                | (Self::Int | Self::Float | Self::Number, Self::Int)
                | (Self::Float | Self::Number, Self::Float)
                | (Self::String, Self::String)
                | (Self::List, Self::List)
                | (Self::Map, Self::Map)
                | (Self::Opaque, Self::Opaque)
        )
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Number => "number",
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
            Self::Opaque => "opaque",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
