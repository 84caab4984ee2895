//! Outcome condition grammar
//!
//! A condition is exactly three whitespace separated tokens:
//!
//! ```text
//! <field> <operator> <value>
//! ```
//!
//! `field` names a fact, `value` is an integer and `operator` is one of
//! `=` `==` `===` `!=` `!==` `<` `<=` `>` `>=`. The empty condition always
//! matches.

use std::fmt;
use std::num::ParseIntError;

use miette::Diagnostic;
use phf::phf_map;
use thiserror::Error;

use crate::facts::FactTable;
use crate::suggestions::{suggest_field, suggest_operator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

static OPERATORS: phf::Map<&'static str, Operator> = phf_map! {
    "=" => Operator::Equal,
    "==" => Operator::Equal,
    "===" => Operator::Equal,
    "!=" => Operator::NotEqual,
    "!==" => Operator::NotEqual,
    "<" => Operator::Less,
    "<=" => Operator::LessOrEqual,
    ">" => Operator::Greater,
    ">=" => Operator::GreaterOrEqual,
};

/// Operator spellings, in documentation order
const OPERATOR_SPELLINGS: [&str; 9] = ["=", "==", "===", "!=", "!==", "<", "<=", ">", ">="];

impl Operator {
    pub fn parse(token: &str) -> Option<Self> {
        OPERATORS.get(token).copied()
    }

    pub fn compare(self, actual: i64, expected: i64) -> bool {
        match self {
            Operator::Equal => actual == expected,
            Operator::NotEqual => actual != expected,
            Operator::Less => actual < expected,
            Operator::LessOrEqual => actual <= expected,
            Operator::Greater => actual > expected,
            Operator::GreaterOrEqual => actual >= expected,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum ConditionError {
    #[error("unable to parse conditional: {condition}")]
    #[diagnostic(
        code(triage::condition::parse),
        help("conditions have the form `<field> <operator> <value>`, e.g. `unsigned > 0`")
    )]
    Parse { condition: String },

    #[error("unknown field in conditional: {field}")]
    #[diagnostic(code(triage::condition::unknown_field))]
    UnknownField {
        field: String,
        #[help]
        suggestion: Option<String>,
    },

    #[error("unable to parse expected value: {value}")]
    #[diagnostic(code(triage::condition::invalid_value), help("the value must be an integer"))]
    InvalidValue {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("unknown operator in conditional: {operator}")]
    #[diagnostic(code(triage::condition::unknown_operator))]
    UnknownOperator {
        operator: String,
        #[help]
        suggestion: Option<String>,
    },
}

/// Evaluate `condition` against `facts`.
///
/// Checks happen in a fixed order: token count, field, value, operator.
/// Every failure is an error, never a non-match.
pub fn evaluate(condition: &str, facts: &FactTable) -> Result<bool, ConditionError> {
    if condition.is_empty() {
        return Ok(true);
    }

    let tokens: Vec<&str> = condition.split_whitespace().collect();
    let [field, operator, value] = tokens[..] else {
        return Err(ConditionError::Parse {
            condition: condition.to_string(),
        });
    };

    let actual = facts.get(field).ok_or_else(|| {
        let known: Vec<&str> = facts.names().collect();
        ConditionError::UnknownField {
            field: field.to_string(),
            suggestion: Some(suggest_field(field, &known)),
        }
    })?;

    let expected: i64 = value.parse().map_err(|source| ConditionError::InvalidValue {
        value: value.to_string(),
        source,
    })?;

    let operator = Operator::parse(operator).ok_or_else(|| ConditionError::UnknownOperator {
        operator: operator.to_string(),
        suggestion: Some(suggest_operator(operator, &OPERATOR_SPELLINGS)),
    })?;

    Ok(operator.compare(actual, expected))
}
