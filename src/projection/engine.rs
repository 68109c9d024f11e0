//! Core projection engine for period-by-period compounding

use log::{debug, warn};

use super::series::{ProjectionPeriod, ProjectionSeries, ProjectionStatus};
use super::state::PeriodValues;

/// Absolute ceiling on projected periods, whatever a model asks for
pub const DEFAULT_PERIOD_CAP: u32 = 1200;

/// Magnitude past which a tracked value is treated as overflow
pub const DEFAULT_OVERFLOW_LIMIT: f64 = 1e15;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Hard cap applied on top of each model's own period limit
    pub period_cap: u32,

    /// Values beyond this magnitude stop the projection
    pub overflow_limit: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            period_cap: DEFAULT_PERIOD_CAP,
            overflow_limit: DEFAULT_OVERFLOW_LIMIT,
        }
    }
}

/// One calculator's compounding rules
pub trait PeriodModel {
    /// Values before the first period (period 0, not recorded)
    fn initial(&self) -> PeriodValues;

    /// Values at the end of `period` given the previous period's values
    fn advance(&self, period: u32, prior: &PeriodValues) -> PeriodValues;

    /// Whether the target has been reached after this period
    fn is_complete(&self, row: &ProjectionPeriod) -> bool;

    /// The model's own period limit
    fn max_periods(&self) -> u32;
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run a model until it completes, exhausts its periods or overflows
    pub fn run(&self, model: &dyn PeriodModel) -> ProjectionSeries {
        let max_periods = model.max_periods().min(self.config.period_cap);
        let mut series = ProjectionSeries::new();
        let mut values = model.initial();

        for period in 1..=max_periods {
            let next = model.advance(period, &values);

            if let Some((name, value)) = next.overflowing(self.config.overflow_limit) {
                warn!("projection overflow at period {}: {} = {}", period, name, value);
                series.status = ProjectionStatus::Overflow { period };
                return series;
            }

            let row = ProjectionPeriod::new(period, next.clone());
            let complete = model.is_complete(&row);
            series.add_row(row);
            values = next;

            if complete {
                debug!("projection reached target at period {}", period);
                series.status = ProjectionStatus::Reached { period };
                return series;
            }
        }

        debug!("projection exhausted after {} periods", max_periods);
        series.status = ProjectionStatus::Exhausted;
        series
    }
}

/// Closure-backed model for one-off projections
struct FnModel<S, P> {
    initial: PeriodValues,
    step: S,
    stop: P,
    max_periods: u32,
}

impl<S, P> PeriodModel for FnModel<S, P>
where
    S: Fn(u32, &PeriodValues) -> PeriodValues,
    P: Fn(&ProjectionPeriod) -> bool,
{
    fn initial(&self) -> PeriodValues {
        self.initial.clone()
    }

    fn advance(&self, period: u32, prior: &PeriodValues) -> PeriodValues {
        (self.step)(period, prior)
    }

    fn is_complete(&self, row: &ProjectionPeriod) -> bool {
        (self.stop)(row)
    }

    fn max_periods(&self) -> u32 {
        self.max_periods
    }
}

/// Project from `initial` with `step` until `stop` holds or `max_periods` pass
pub fn project<S, P>(initial: PeriodValues, step: S, stop: P, max_periods: u32) -> ProjectionSeries
where
    S: Fn(u32, &PeriodValues) -> PeriodValues,
    P: Fn(&ProjectionPeriod) -> bool,
{
    let model = FnModel {
        initial,
        step,
        stop,
        max_periods,
    };
    ProjectionEngine::default().run(&model)
}
