//! Output records produced by formula evaluation

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One computed value, or a sentinel standing in for a number that does not exist
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOutput", into = "RawOutput")]
pub enum OutputValue {
    Number(f64),
    /// The quantity is never reached (e.g. payback when savings are not positive)
    Never,
    /// The quantity has no meaning for the current inputs
    NotApplicable,
}

impl OutputValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            OutputValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, OutputValue::Never)
    }
}

impl From<f64> for OutputValue {
    fn from(n: f64) -> Self {
        OutputValue::Number(n)
    }
}

/// Wire form: numbers stay numbers, `Never` is the string "never", `NotApplicable` is null
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawOutput {
    Number(f64),
    Marker(Option<String>),
}

impl From<OutputValue> for RawOutput {
    fn from(value: OutputValue) -> Self {
        match value {
            OutputValue::Number(n) => RawOutput::Number(n),
            OutputValue::Never => RawOutput::Marker(Some("never".to_string())),
            OutputValue::NotApplicable => RawOutput::Marker(None),
        }
    }
}

impl TryFrom<RawOutput> for OutputValue {
    type Error = String;

    fn try_from(raw: RawOutput) -> Result<Self, Self::Error> {
        match raw {
            RawOutput::Number(n) => Ok(OutputValue::Number(n)),
            RawOutput::Marker(None) => Ok(OutputValue::NotApplicable),
            RawOutput::Marker(Some(s)) if s == "never" => Ok(OutputValue::Never),
            RawOutput::Marker(Some(s)) => Err(format!("unknown output marker `{}`", s)),
        }
    }
}

/// Insertion-ordered mapping from output id to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputRecord {
    entries: Vec<(String, OutputValue)>,
}

impl OutputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite, keeping the position of an existing id
    pub fn insert(&mut self, id: &str, value: OutputValue) {
        match self.entries.iter_mut().find(|(k, _)| k == id) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((id.to_string(), value)),
        }
    }

    pub fn get(&self, id: &str) -> Option<OutputValue> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| *v)
    }

    /// Numeric value of an output, 0.0 for sentinels and missing ids
    pub fn number(&self, id: &str) -> f64 {
        self.get(id).and_then(|v| v.as_number()).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, OutputValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for OutputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OutputRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = OutputRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of output ids to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut record = OutputRecord::new();
                while let Some((k, v)) = access.next_entry::<String, OutputValue>()? {
                    record.insert(&k, v);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_overwrites() {
        let mut r = OutputRecord::new();
        r.insert("b", 1.0.into());
        r.insert("a", 2.0.into());
        r.insert("b", OutputValue::Never);

        let ids: Vec<_> = r.iter().map(|(k, _)| k).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(r.get("b"), Some(OutputValue::Never));
        assert_eq!(r.number("b"), 0.0);
    }

    #[test]
    fn test_json_form() {
        let mut r = OutputRecord::new();
        r.insert("payback", OutputValue::Never);
        r.insert("total", 12.5.into());
        r.insert("ratio", OutputValue::NotApplicable);

        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"payback":"never","total":12.5,"ratio":null}"#);

        let back: OutputRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
