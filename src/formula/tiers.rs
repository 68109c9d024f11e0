//! Tier (bracket) tables for progressive taxes, depreciation coefficients and
//! emission tranches
//!
//! A table is an ascending list of upper thresholds. Lookup scans in order and
//! picks the first tier whose threshold is `>=` the input, so a value sitting
//! exactly on a threshold belongs to that tier. A tier without a threshold
//! catches everything above the last bounded tier and must come last.

use serde::{Deserialize, Serialize};

use crate::error::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Inclusive upper bound; `None` for the catch-all tier
    pub threshold: Option<f64>,
    pub rate: f64,
}

/// Validated tier list; deserializing goes through [`TierTable::new`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TryFrom<Vec<Tier>> for TierTable {
    type Error = TableError;

    fn try_from(tiers: Vec<Tier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<TierTable> for Vec<Tier> {
    fn from(table: TierTable) -> Self {
        table.tiers
    }
}

impl TierTable {
    /// Validate and build a table from tiers in their declared order
    pub fn new(tiers: Vec<Tier>) -> Result<Self, TableError> {
        let mut previous: Option<f64> = None;
        for (idx, tier) in tiers.iter().enumerate() {
            if !tier.rate.is_finite() {
                return Err(TableError::InvalidRate(tier.rate));
            }
            match tier.threshold {
                None if idx + 1 != tiers.len() => return Err(TableError::CatchAllNotLast),
                None => {}
                Some(t) if !t.is_finite() => return Err(TableError::InvalidThreshold(t)),
                Some(t) => {
                    if let Some(p) = previous {
                        if !(t > p) {
                            return Err(TableError::Unsorted { previous: p, next: t });
                        }
                    }
                    previous = Some(t);
                }
            }
        }
        Ok(Self { tiers })
    }

    /// Build from authored `(threshold, rate)` pairs plus an optional catch-all rate.
    /// Pairs are sorted by threshold and non-finite entries dropped.
    pub fn bounded(pairs: &[(f64, f64)], catch_all: Option<f64>) -> Self {
        let mut tiers: Vec<Tier> = pairs
            .iter()
            .filter(|(t, r)| t.is_finite() && r.is_finite())
            .map(|&(t, r)| Tier {
                threshold: Some(t),
                rate: r,
            })
            .collect();
        tiers.sort_by(|a, b| a.threshold.partial_cmp(&b.threshold).unwrap_or(std::cmp::Ordering::Equal));
        tiers.dedup_by(|a, b| a.threshold == b.threshold);
        if let Some(rate) = catch_all.filter(|r| r.is_finite()) {
            tiers.push(Tier {
                threshold: None,
                rate,
            });
        }
        Self { tiers }
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Index of the tier `value` falls into
    pub fn index_of(&self, value: f64) -> Option<usize> {
        self.tiers
            .iter()
            .position(|tier| tier.threshold.map_or(true, |t| value <= t))
    }

    pub fn select(&self, value: f64) -> Option<&Tier> {
        self.index_of(value).map(|i| &self.tiers[i])
    }

    /// Rate of the tier `value` falls into, if any tier covers it
    pub fn rate(&self, value: f64) -> Option<f64> {
        self.select(value).map(|t| t.rate)
    }

    /// Marginal bracket sum: each tier's rate applies only to the slice of
    /// `value` between the previous threshold and its own.
    ///
    /// Income above the last bounded threshold is untaxed when the table has
    /// no catch-all tier.
    pub fn progressive(&self, value: f64) -> f64 {
        let mut lower = 0.0_f64;
        let mut total = 0.0;

        for tier in &self.tiers {
            if value <= lower {
                break;
            }
            let upper = tier.threshold.unwrap_or(f64::INFINITY);
            let slice = value.min(upper) - lower;
            if slice > 0.0 {
                total += slice * tier.rate;
            }
            lower = upper;
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn co2() -> TierTable {
        TierTable::bounded(&[(120.0, 0.0), (140.0, 0.0475), (200.0, 0.0975)], Some(0.1475))
    }

    #[test]
    fn test_select_ascending_scan() {
        let t = co2();

        assert_eq!(t.rate(0.0), Some(0.0));
        assert_eq!(t.rate(130.0), Some(0.0475));
        assert_eq!(t.rate(150.0), Some(0.0975));
        assert_eq!(t.rate(500.0), Some(0.1475));
    }

    #[test]
    fn test_boundary_belongs_to_lower_tier() {
        let t = co2();

        assert_eq!(t.rate(120.0), Some(0.0));
        assert_eq!(t.rate(120.0001), Some(0.0475));
        assert_eq!(t.rate(200.0), Some(0.0975));
    }

    #[test]
    fn test_no_catch_all_leaves_gap() {
        let t = TierTable::bounded(&[(10.0, 1.0)], None);
        assert_eq!(t.rate(11.0), None);
        assert_eq!(TierTable::default().rate(1.0), None);
    }

    #[test]
    fn test_selection_is_monotonic() {
        let t = co2();
        let mut last_rate = f64::MIN;
        let mut last_index = 0;
        let mut x = 0.0;
        while x < 300.0 {
            let idx = t.index_of(x).unwrap();
            let rate = t.rate(x).unwrap();
            assert!(idx >= last_index);
            assert!(rate >= last_rate);
            last_index = idx;
            last_rate = rate;
            x += 0.25;
        }
    }

    #[test]
    fn test_progressive() {
        let t = TierTable::bounded(&[(10_000.0, 0.10), (40_000.0, 0.20)], Some(0.40));

        assert_eq!(t.progressive(0.0), 0.0);
        assert_relative_eq!(t.progressive(5_000.0), 500.0);
        assert_relative_eq!(t.progressive(10_000.0), 1_000.0);
        assert_relative_eq!(t.progressive(50_000.0), 1_000.0 + 6_000.0 + 4_000.0);
    }

    #[test]
    fn test_new_validates() {
        let unsorted = vec![
            Tier { threshold: Some(5.0), rate: 0.1 },
            Tier { threshold: Some(3.0), rate: 0.2 },
        ];
        assert!(matches!(TierTable::new(unsorted), Err(TableError::Unsorted { .. })));

        let catch_all_first = vec![
            Tier { threshold: None, rate: 0.1 },
            Tier { threshold: Some(3.0), rate: 0.2 },
        ];
        assert!(matches!(TierTable::new(catch_all_first), Err(TableError::CatchAllNotLast)));

        let ok = vec![
            Tier { threshold: Some(3.0), rate: 0.1 },
            Tier { threshold: None, rate: 0.2 },
        ];
        assert_eq!(TierTable::new(ok).unwrap().rate(10.0), Some(0.2));

        let nan_threshold = vec![Tier { threshold: Some(f64::NAN), rate: 0.1 }];
        assert!(matches!(TierTable::new(nan_threshold), Err(TableError::InvalidThreshold(_))));
    }

    #[test]
    fn test_deserialize_validates() {
        let table: TierTable = serde_json::from_str(r#"[{"threshold": 3.0, "rate": 0.1}, {"threshold": null, "rate": 0.2}]"#).unwrap();
        assert_eq!(table.rate(10.0), Some(0.2));
        assert_eq!(serde_json::to_string(&table).unwrap(), r#"[{"threshold":3.0,"rate":0.1},{"threshold":null,"rate":0.2}]"#);

        let unsorted = r#"[{"threshold": 5.0, "rate": 0.1}, {"threshold": 3.0, "rate": 0.2}]"#;
        assert!(serde_json::from_str::<TierTable>(unsorted).is_err());

        let catch_all_first = r#"[{"threshold": null, "rate": 0.1}, {"threshold": 3.0, "rate": 0.2}]"#;
        assert!(serde_json::from_str::<TierTable>(catch_all_first).is_err());
    }
}
