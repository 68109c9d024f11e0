//! Field declarations and value coercion

use serde::{Deserialize, Serialize};

use super::condition::Condition;

/// A single input value as stored in an [`InputState`](super::InputState)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a raw command-line or form string without any schema knowledge.
    /// `true`/`false` become booleans, anything numeric becomes a number.
    pub fn parse_loose(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => trimmed
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::Text(trimmed.to_string())),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One entry of a select field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Declared type of a field, with its bounds or choices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Number {
        min: f64,
        max: f64,
        step: Option<f64>,
    },
    Boolean,
    Select {
        options: Vec<SelectOption>,
    },
}

/// Declarative description of one calculator input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub unit: Option<String>,
    pub default: Value,
    pub visible_if: Option<Condition>,
}

impl FieldSpec {
    /// Numeric field bounded to `[0, +inf)` until narrowed with [`min`](Self::min)/[`max`](Self::max)
    pub fn number(id: &str, label: &str, default: f64) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: FieldKind::Number {
                min: 0.0,
                max: f64::INFINITY,
                step: None,
            },
            unit: None,
            default: Value::Number(default),
            visible_if: None,
        }
    }

    pub fn boolean(id: &str, label: &str, default: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: FieldKind::Boolean,
            unit: None,
            default: Value::Bool(default),
            visible_if: None,
        }
    }

    pub fn select(id: &str, label: &str, options: &[(&str, &str)], default: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: FieldKind::Select {
                options: options
                    .iter()
                    .map(|(value, label)| SelectOption {
                        value: value.to_string(),
                        label: label.to_string(),
                    })
                    .collect(),
            },
            unit: None,
            default: Value::Text(default.to_string()),
            visible_if: None,
        }
    }

    pub fn min(mut self, value: f64) -> Self {
        if let FieldKind::Number { min, .. } = &mut self.kind {
            *min = value;
        }
        self
    }

    pub fn max(mut self, value: f64) -> Self {
        if let FieldKind::Number { max, .. } = &mut self.kind {
            *max = value;
        }
        self
    }

    pub fn step(mut self, value: f64) -> Self {
        if let FieldKind::Number { step, .. } = &mut self.kind {
            *step = Some(value);
        }
        self
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn visible_if(mut self, condition: Condition) -> Self {
        self.visible_if = Some(condition);
        self
    }

    /// Coerce an incoming value to this field's type and bounds.
    ///
    /// Values that cannot be interpreted keep `current`, so the state never
    /// holds anything the field does not accept.
    pub fn coerce(&self, incoming: &Value, current: &Value) -> Value {
        match &self.kind {
            FieldKind::Number { min, max, .. } => {
                let parsed = match incoming {
                    Value::Number(n) => Some(*n),
                    Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                    Value::Text(s) => s.trim().parse::<f64>().ok(),
                };
                match parsed.filter(|n| n.is_finite()) {
                    Some(n) => Value::Number(clamp(n, *min, *max)),
                    None => current.clone(),
                }
            }
            FieldKind::Boolean => match incoming {
                Value::Bool(b) => Value::Bool(*b),
                Value::Number(n) => Value::Bool(*n != 0.0),
                Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" | "on" => Value::Bool(true),
                    "false" | "0" | "no" | "off" | "" => Value::Bool(false),
                    _ => current.clone(),
                },
            },
            FieldKind::Select { options } => {
                let wanted = match incoming {
                    Value::Text(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                if options.iter().any(|o| o.value == wanted) {
                    Value::Text(wanted)
                } else {
                    current.clone()
                }
            }
        }
    }

    /// A value this field always accepts, used when an authored default is invalid
    pub(crate) fn fallback(&self) -> Value {
        match &self.kind {
            FieldKind::Number { min, max, .. } => Value::Number(clamp(0.0, *min, *max)),
            FieldKind::Boolean => Value::Bool(false),
            FieldKind::Select { options } => Value::Text(
                options.first().map(|o| o.value.clone()).unwrap_or_default(),
            ),
        }
    }
}

/// Clamp without panicking on inverted bounds (the lower bound wins)
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount() -> FieldSpec {
        FieldSpec::number("amount", "Amount", 100.0).max(1000.0)
    }

    #[test]
    fn test_number_clamped_to_bounds() {
        let f = amount();
        let current = Value::Number(100.0);

        assert_eq!(f.coerce(&Value::Number(-5.0), &current), Value::Number(0.0));
        assert_eq!(f.coerce(&Value::Number(5000.0), &current), Value::Number(1000.0));
        assert_eq!(f.coerce(&Value::Number(250.0), &current), Value::Number(250.0));
    }

    #[test]
    fn test_number_from_text_and_garbage() {
        let f = amount();
        let current = Value::Number(100.0);

        assert_eq!(f.coerce(&"42.5".into(), &current), Value::Number(42.5));
        assert_eq!(f.coerce(&"abc".into(), &current), current);
        assert_eq!(f.coerce(&Value::Number(f64::NAN), &current), current);
        assert_eq!(f.coerce(&Value::Number(f64::INFINITY), &current), current);
    }

    #[test]
    fn test_boolean_coercion() {
        let f = FieldSpec::boolean("flag", "Flag", false);
        let current = Value::Bool(false);

        assert_eq!(f.coerce(&"yes".into(), &current), Value::Bool(true));
        assert_eq!(f.coerce(&Value::Number(0.0), &current), Value::Bool(false));
        assert_eq!(f.coerce(&"maybe".into(), &current), current);
    }

    #[test]
    fn test_select_rejects_unknown_option() {
        let f = FieldSpec::select("origin", "Origin", &[("eu", "EU"), ("non_eu", "Non-EU")], "eu");
        let current = Value::Text("eu".to_string());

        assert_eq!(f.coerce(&"non_eu".into(), &current), Value::Text("non_eu".to_string()));
        assert_eq!(f.coerce(&"mars".into(), &current), current);
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(Value::parse_loose("true"), Value::Bool(true));
        assert_eq!(Value::parse_loose(" 3.5 "), Value::Number(3.5));
        assert_eq!(Value::parse_loose("eu"), Value::Text("eu".to_string()));
    }
}
