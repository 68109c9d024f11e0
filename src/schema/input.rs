//! Current input values of one calculator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::field::Value;

/// Mapping from field id to its current value.
///
/// States built through [`CalculatorSchema`](super::CalculatorSchema) always
/// satisfy their fields' types and bounds. A deserialized state may not, and
/// is normalized against the schema before any evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputState {
    values: BTreeMap<String, Value>,
}

impl InputState {
    pub(crate) fn insert(&mut self, id: &str, value: Value) {
        self.values.insert(id.to_string(), value);
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    /// Numeric value of a field, 0.0 when absent or not numeric
    pub fn number(&self, id: &str) -> f64 {
        self.get(id).and_then(Value::as_number).unwrap_or(0.0)
    }

    /// Boolean value of a field, false when absent or not boolean
    pub fn flag(&self, id: &str) -> bool {
        self.get(id).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Text value of a field, empty when absent or not text
    pub fn text(&self, id: &str) -> &str {
        self.get(id).and_then(Value::as_text).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
