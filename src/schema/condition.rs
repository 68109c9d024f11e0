//! Typed visibility/applicability conditions
//!
//! A condition compares one field of the current input state against a
//! literal. Conditions are authored as values; the textual form
//! `field == literal` is only accepted when reading configuration.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::field::Value;
use super::input::InputState;
use crate::error::SchemaError;

/// Tolerance for numeric equality in conditions
const NUMBER_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
}

/// What a condition yields when its field is absent from the input state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Treat the condition as satisfied (the dependent field stays visible)
    #[default]
    Permissive,
    /// Treat the condition as not satisfied (the dependent field is hidden)
    Restrictive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub literal: Value,
}

impl Condition {
    pub fn eq(field: &str, literal: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op: Operator::Eq,
            literal: literal.into(),
        }
    }

    pub fn ne(field: &str, literal: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op: Operator::Ne,
            literal: literal.into(),
        }
    }

    /// Evaluate against the current inputs
    pub fn evaluate(&self, state: &InputState, policy: MissingFieldPolicy) -> bool {
        let Some(current) = state.get(&self.field) else {
            return policy == MissingFieldPolicy::Permissive;
        };

        let equal = values_equal(current, &self.literal);
        match self.op {
            Operator::Eq => equal,
            Operator::Ne => !equal,
        }
    }
}

/// Values of different types never compare equal
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => (x - y).abs() < NUMBER_EPSILON,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Text(x), Value::Text(y)) => x == y,
        _ => false,
    }
}

impl FromStr for Condition {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, op, literal) = if let Some((l, r)) = s.split_once("!=") {
            (l, Operator::Ne, r)
        } else if let Some((l, r)) = s.split_once("==") {
            (l, Operator::Eq, r)
        } else {
            return Err(SchemaError::InvalidCondition(s.to_string()));
        };

        let field = field.trim();
        let literal = literal.trim();
        if field.is_empty() || literal.is_empty() {
            return Err(SchemaError::InvalidCondition(s.to_string()));
        }

        // Quoted literals are always text, so `'true'` stays a string
        let quoted = ['\'', '"'].into_iter().find_map(|q| {
            literal
                .strip_prefix(q)
                .and_then(|rest| rest.strip_suffix(q))
                .filter(|_| literal.len() >= 2)
        });

        Ok(Self {
            field: field.to_string(),
            op,
            literal: match quoted {
                Some(text) => Value::Text(text.to_string()),
                None => Value::parse_loose(literal),
            },
        })
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self.op {
            Operator::Eq => "==",
            Operator::Ne => "!=",
        };
        match &self.literal {
            Value::Text(text) => write!(f, "{} {} '{}'", self.field, op, text),
            other => write!(f, "{} {} {}", self.field, op, other),
        }
    }
}
