//! The terminal result of a single message dispatch: a success `Value` or a
//! failure string. Named `Outcome` in this crate to avoid shadowing
//! `std::result::Result`, which every fallible function signature still uses.

use std::fmt;

use crate::value::Value;

/// Either a success `Value` or an error message. Immutable once constructed.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Value(Value),
    Error(String),
}

impl Outcome {
    pub fn from_value(value: impl Into<Value>) -> Self {
        Outcome::Value(value.into())
    }

    pub fn from_error(message: impl Into<String>) -> Self {
        Outcome::Error(message.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    pub fn is_err(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Error(e) => Some(e),
            Outcome::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }
}

impl From<Value> for Outcome {
    fn from(v: Value) -> Self {
        Outcome::Value(v)
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Value(Value::Null)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => write!(f, "{:?}", v),
            Outcome::Error(e) => write!(f, "Error({})", e),
        }
    }
}
