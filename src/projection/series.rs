//! Projection output structures

use serde::Serialize;
use std::io::Write;

use super::state::PeriodValues;

/// A single row of projection output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionPeriod {
    /// 1-indexed period number
    pub period: u32,
    pub values: PeriodValues,
}

impl ProjectionPeriod {
    pub fn new(period: u32, values: PeriodValues) -> Self {
        Self { period, values }
    }

    pub fn value(&self, name: &str) -> f64 {
        self.values.value(name)
    }
}

/// Where the iteration stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectionStatus {
    /// Still iterating. Only the engine's in-progress series carries it;
    /// every series handed out by a run has one of the terminal states
    Accumulating,
    /// The stop predicate held after this period
    Reached { period: u32 },
    /// The period cap was hit before the predicate held
    Exhausted,
    /// A tracked value left the representable range; that period was dropped
    Overflow { period: u32 },
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionSeries {
    pub periods: Vec<ProjectionPeriod>,
    pub status: ProjectionStatus,
}

impl ProjectionSeries {
    pub(crate) fn new() -> Self {
        Self {
            periods: Vec::new(),
            status: ProjectionStatus::Accumulating,
        }
    }

    /// Add a period row
    pub fn add_row(&mut self, row: ProjectionPeriod) {
        self.periods.push(row);
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn last(&self) -> Option<&ProjectionPeriod> {
        self.periods.last()
    }

    /// Period at which the stop predicate held, if it did
    pub fn reached_period(&self) -> Option<u32> {
        match self.status {
            ProjectionStatus::Reached { period } => Some(period),
            _ => None,
        }
    }

    pub fn column(&self, name: &str) -> Vec<f64> {
        self.periods.iter().map(|p| p.value(name)).collect()
    }

    pub fn first_period_where<P>(&self, predicate: P) -> Option<u32>
    where
        P: Fn(&ProjectionPeriod) -> bool,
    {
        self.periods.iter().find(|p| predicate(p)).map(|p| p.period)
    }

    /// Get summary statistics
    pub fn summary(&self) -> SeriesSummary {
        SeriesSummary {
            total_periods: self.periods.len() as u32,
            status: self.status,
            final_values: self.last().map(|p| p.values.clone()).unwrap_or_default(),
        }
    }

    /// Write the series as CSV, one row per period, columns in tracking order
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut out = csv::Writer::from_writer(writer);

        let names: Vec<String> = self
            .periods
            .first()
            .map(|p| p.values.names().map(str::to_string).collect())
            .unwrap_or_default();

        let mut header = vec!["period".to_string()];
        header.extend(names.iter().cloned());
        out.write_record(&header)?;

        for row in &self.periods {
            let mut record = vec![row.period.to_string()];
            record.extend(names.iter().map(|n| format!("{:.2}", row.value(n))));
            out.write_record(&record)?;
        }

        out.flush()?;
        Ok(())
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub total_periods: u32,
    pub status: ProjectionStatus,
    pub final_values: PeriodValues,
}
