//! Built-in calculators and the catalog that serves them
//!
//! Every calculator is data for the shared engine: a schema, ordered formula
//! steps and, for multi-period calculators, a projection model.

mod car_import;
mod fire;
mod income_tax;
mod loan;
mod solar_payback;

pub use car_import::CarImportCalculator;
pub use fire::FireCalculator;
pub use income_tax::IncomeTaxCalculator;
pub use loan::LoanCalculator;
pub use solar_payback::SolarPaybackCalculator;

use log::debug;
use serde::Serialize;

use crate::error::{FincalcError, SchemaError};
use crate::formula::{evaluate, merge_outputs, FormulaStep, OutputRecord, OutputValue};
use crate::projection::{ProjectionEngine, ProjectionSeries};
use crate::schema::{CalculatorSchema, InputState, MissingFieldPolicy};
use crate::tables::LoadedTables;

/// Inputs, outputs and the optional series of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    pub calculator: String,
    pub inputs: InputState,
    pub outputs: OutputRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<ProjectionSeries>,
}

/// A projection together with the outputs derived from it
pub struct ProjectionOutcome {
    pub series: Option<ProjectionSeries>,
    pub outputs: Vec<(&'static str, OutputValue)>,
}

pub trait Calculator: Send + Sync {
    fn id(&self) -> &'static str;

    fn title(&self) -> &'static str;

    fn schema(&self) -> &CalculatorSchema;

    fn steps(&self) -> &[FormulaStep];

    /// Multi-period part of the calculation, run after the formula steps
    fn project(
        &self,
        _engine: &ProjectionEngine,
        _inputs: &InputState,
        _outputs: &OutputRecord,
    ) -> Option<ProjectionOutcome> {
        None
    }

    fn defaults(&self) -> InputState {
        self.schema().defaults()
    }

    /// Evaluate `inputs` after normalizing them against the schema, so states
    /// built outside the schema are clamped like any other write
    fn calculate_with(&self, engine: &ProjectionEngine, inputs: &InputState) -> Calculation {
        let inputs = self.schema().normalize(inputs);
        let mut outputs = evaluate(self.steps(), &inputs);
        let series = match self.project(engine, &inputs, &outputs) {
            Some(outcome) => {
                merge_outputs(&mut outputs, self.id(), outcome.outputs);
                outcome.series
            }
            None => None,
        };
        debug!("{}: {} outputs", self.id(), outputs.len());

        Calculation {
            calculator: self.id().to_string(),
            inputs,
            outputs,
            series,
        }
    }

    fn calculate(&self, inputs: &InputState) -> Calculation {
        self.calculate_with(&ProjectionEngine::default(), inputs)
    }
}

/// What calculators need at construction time
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions<'a> {
    pub tables: &'a LoadedTables,
    pub missing_field_policy: MissingFieldPolicy,
}

/// Registry of calculators by id
pub struct Catalog {
    calculators: Vec<Box<dyn Calculator>>,
    engine: ProjectionEngine,
}

impl Catalog {
    /// Catalog using built-in tables only
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::new(&BuildOptions {
            tables: &LoadedTables::default(),
            missing_field_policy: MissingFieldPolicy::default(),
        })
    }

    pub fn new(options: &BuildOptions<'_>) -> Result<Self, SchemaError> {
        let calculators: Vec<Box<dyn Calculator>> = vec![
            Box::new(CarImportCalculator::new(options)?),
            Box::new(FireCalculator::new(options)?),
            Box::new(SolarPaybackCalculator::new(options)?),
            Box::new(LoanCalculator::new(options)?),
            Box::new(IncomeTaxCalculator::new(options)?),
        ];
        Ok(Self {
            calculators,
            engine: ProjectionEngine::default(),
        })
    }

    pub fn with_engine(mut self, engine: ProjectionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    pub fn get(&self, id: &str) -> Result<&dyn Calculator, FincalcError> {
        self.calculators
            .iter()
            .find(|c| c.id() == id)
            .map(|c| c.as_ref())
            .ok_or_else(|| FincalcError::UnknownCalculator(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Calculator> {
        self.calculators.iter().map(|c| c.as_ref())
    }

    pub fn calculate(&self, id: &str, inputs: &InputState) -> Result<Calculation, FincalcError> {
        Ok(self.get(id)?.calculate_with(&self.engine, inputs))
    }
}
