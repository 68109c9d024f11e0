//! Named values carried from one projection period to the next

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Insertion-ordered numeric snapshot of a projection at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodValues {
    entries: Vec<(String, f64)>,
}

impl PeriodValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: f64) {
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| *v)
    }

    /// Value of `name`, 0.0 when it is not tracked
    pub fn value(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// First tracked value that is non-finite or whose magnitude exceeds `limit`
    pub fn overflowing(&self, limit: f64) -> Option<(&str, f64)> {
        self.iter().find(|(_, v)| !v.is_finite() || v.abs() > limit)
    }
}

impl Serialize for PeriodValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Per-period amount growing geometrically from `base` in period 1
pub fn growing(base: f64, rate: f64, period: u32) -> f64 {
    if period <= 1 {
        base
    } else {
        base * (1.0 + rate).powi(period as i32 - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_set_and_get() {
        let mut v = PeriodValues::new().with("balance", 10.0).with("spend", 2.0);
        v.set("balance", 12.0);

        assert_eq!(v.get("balance"), Some(12.0));
        assert_eq!(v.value("missing"), 0.0);
        assert_eq!(v.names().collect::<Vec<_>>(), vec!["balance", "spend"]);
    }

    #[test]
    fn test_overflowing() {
        let v = PeriodValues::new().with("a", 1.0).with("b", f64::INFINITY);
        assert_eq!(v.overflowing(1e15).map(|(k, _)| k), Some("b"));
        assert!(PeriodValues::new().with("a", 1.0).overflowing(1e15).is_none());
    }

    #[test]
    fn test_growing() {
        assert_eq!(growing(100.0, 0.1, 1), 100.0);
        assert_relative_eq!(growing(100.0, 0.1, 3), 121.0, epsilon = 1e-9);
        assert_relative_eq!(growing(100.0, -0.5, 2), 50.0);
    }
}
