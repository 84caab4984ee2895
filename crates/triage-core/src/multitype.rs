//! Values that may be authored either as a YAML boolean or a string

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A flag that accepts `true`, `"true"`, `"1"`, `"False"`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoolOrString {
    Bool(bool),
    String(String),
}

impl BoolOrString {
    /// Interpret the value as a boolean
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            BoolOrString::Bool(b) => Ok(*b),
            BoolOrString::String(s) => match s.trim() {
                "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
                "0" | "f" | "F" | "false" | "FALSE" | "False" | "" => Ok(false),
                other => Err(CoreError::InvalidBool {
                    value: other.to_string(),
                }),
            },
        }
    }

    /// Interpret the value as a boolean, treating unparseable strings as false
    pub fn bool_or_default_false(&self) -> bool {
        self.as_bool().unwrap_or(false)
    }
}

impl From<bool> for BoolOrString {
    fn from(value: bool) -> Self {
        BoolOrString::Bool(value)
    }
}

/// Evaluate an optional exclude flag
pub fn is_excluded(exclude: Option<&BoolOrString>) -> Result<bool> {
    match exclude {
        Some(flag) => flag.as_bool(),
        None => Ok(false),
    }
}
