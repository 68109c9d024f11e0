//! fincalc - declarative financial calculator engine
//!
//! This library provides:
//! - Field schemas with clamped, coerced input state and visibility conditions
//! - Ordered formula steps with division guards, tier tables and modifier chains
//! - A capped period-by-period projection engine
//! - Built-in calculators (car import, FIRE, solar payback, loan, income tax)
//! - Parallel batch evaluation and parameter sweeps

pub mod calculators;
pub mod config;
pub mod error;
pub mod format;
pub mod formula;
pub mod history;
pub mod projection;
pub mod scenario;
pub mod schema;
pub mod tables;

// Re-export commonly used types
pub use calculators::{BuildOptions, Calculation, Calculator, Catalog};
pub use config::EngineConfig;
pub use error::FincalcError;
pub use formula::{OutputRecord, OutputValue};
pub use projection::{ProjectionEngine, ProjectionSeries, ProjectionStatus};
pub use scenario::ScenarioRunner;
pub use schema::{CalculatorSchema, Condition, FieldSpec, InputState, Value};
