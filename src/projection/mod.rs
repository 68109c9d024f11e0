//! Projection iterator for multi-period calculators

mod engine;
mod series;
mod state;

pub use engine::{
    project, PeriodModel, ProjectionConfig, ProjectionEngine, DEFAULT_OVERFLOW_LIMIT,
    DEFAULT_PERIOD_CAP,
};
pub use series::{ProjectionPeriod, ProjectionSeries, ProjectionStatus, SeriesSummary};
pub use state::{growing, PeriodValues};
