//! Scenario runner for batch evaluations and parameter sweeps
//!
//! Holds one catalog, then evaluates many input states against it in
//! parallel. Results always come back in input order.

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;

use crate::calculators::{Calculation, Catalog};
use crate::error::FincalcError;
use crate::formula::OutputValue;
use crate::schema::{InputState, Value};

/// Upper bound on the points a single sweep may produce
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// One point of a sweep: the value written and what came out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    /// Field value after clamping
    pub input: f64,
    pub calculation: Calculation,
}

impl SweepPoint {
    pub fn output(&self, id: &str) -> Option<OutputValue> {
        self.calculation.outputs.get(id)
    }
}

/// Evenly spaced values from `from` to `to` inclusive
///
/// A non-positive or non-finite step yields `from` alone.
pub fn sweep_values(from: f64, to: f64, step: f64) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0) || to <= from {
        return vec![from];
    }
    let count = (((to - from) / step) + 1e-9).floor() as usize + 1;
    (0..count.min(MAX_SWEEP_POINTS))
        .map(|i| from + step * i as f64)
        .collect()
}

pub struct ScenarioRunner {
    catalog: Catalog,
}

impl ScenarioRunner {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Evaluate many input states for one calculator
    pub fn run_batch(&self, calculator: &str, inputs: &[InputState]) -> Result<Vec<Calculation>, FincalcError> {
        let calc = self.catalog.get(calculator)?;
        let engine = self.catalog.engine();
        let start = Instant::now();

        let results: Vec<Calculation> = inputs
            .par_iter()
            .map(|state| calc.calculate_with(engine, state))
            .collect();

        debug!("{}: {} evaluations in {:?}", calculator, results.len(), start.elapsed());
        Ok(results)
    }

    /// Vary one numeric field over `values`, everything else held at `base`
    ///
    /// Each value goes through the schema like any user write, so out of
    /// range values are clamped and the clamped value is reported.
    pub fn sweep(
        &self,
        calculator: &str,
        base: &InputState,
        field: &str,
        values: &[f64],
    ) -> Result<Vec<SweepPoint>, FincalcError> {
        let calc = self.catalog.get(calculator)?;
        let schema = calc.schema();

        let mut states = Vec::with_capacity(values.len());
        let mut written = Vec::with_capacity(values.len());
        for &value in values {
            let mut state = base.clone();
            let stored = schema.set(&mut state, field, value)?;
            written.push(stored.as_number().unwrap_or(value));
            states.push(state);
        }

        info!("sweeping {}.{} over {} values", calculator, field, states.len());
        let calculations = self.run_batch(calculator, &states)?;

        Ok(written
            .into_iter()
            .zip(calculations)
            .map(|(input, calculation)| SweepPoint { input, calculation })
            .collect())
    }

    /// Apply `(id, value)` overrides on top of a calculator's defaults
    pub fn inputs_with(&self, calculator: &str, overrides: &[(String, Value)]) -> Result<InputState, FincalcError> {
        let calc = self.catalog.get(calculator)?;
        let mut state = calc.defaults();
        for (id, value) in overrides {
            calc.schema().set(&mut state, id, value.clone())?;
        }
        Ok(state)
    }
}
