//! Solar installation payback

use super::{BuildOptions, Calculator, ProjectionOutcome};
use crate::error::SchemaError;
use crate::formula::{guards, FormulaStep, OutputRecord, OutputValue};
use crate::projection::{growing, PeriodModel, PeriodValues, ProjectionEngine, ProjectionPeriod};
use crate::schema::{CalculatorSchema, FieldSpec, InputState};

/// Longest payback horizon projected, in years
pub const MAX_YEARS: u32 = 40;

pub struct SolarPaybackCalculator {
    schema: CalculatorSchema,
    steps: Vec<FormulaStep>,
}

impl SolarPaybackCalculator {
    pub fn new(options: &BuildOptions<'_>) -> Result<Self, SchemaError> {
        let schema = CalculatorSchema::new(vec![
            FieldSpec::number("system_cost", "System cost", 6_000.0).step(100.0).unit("€"),
            FieldSpec::number("subsidy", "Subsidy", 0.0).max(100.0).unit("%"),
            FieldSpec::number("annual_saving", "First-year energy saving", 900.0).step(10.0).unit("€"),
            FieldSpec::number("price_growth", "Energy price growth", 3.0).min(-10.0).max(20.0).step(0.1).unit("%"),
            FieldSpec::number("maintenance", "Yearly maintenance", 50.0).unit("€"),
            FieldSpec::number("horizon_years", "Evaluation horizon", 25.0)
                .min(1.0)
                .max(MAX_YEARS as f64)
                .step(1.0)
                .unit("years"),
        ])?
        .with_missing_field_policy(options.missing_field_policy);

        Ok(Self {
            schema,
            steps: steps(),
        })
    }
}

fn steps() -> Vec<FormulaStep> {
    vec![
        FormulaStep::single("net_cost", |ctx| ctx.number("system_cost") * (1.0 - ctx.percent("subsidy"))),
        FormulaStep::single("net_annual_saving", |ctx| {
            ctx.number("annual_saving") - ctx.number("maintenance")
        }),
        FormulaStep::single("simple_payback_years", |ctx| {
            guards::payback(ctx.output("net_cost"), ctx.output("net_annual_saving"))
        }),
        FormulaStep::single("horizon_net_benefit", |ctx| {
            let years = ctx.number("horizon_years").round() as u32;
            let growth = ctx.percent("price_growth");
            let savings: f64 = (1..=years)
                .map(|year| growing(ctx.number("annual_saving"), growth, year) - ctx.number("maintenance"))
                .sum();
            savings - ctx.output("net_cost")
        }),
    ]
}

/// Cumulative savings growing with energy prices, net of maintenance
struct SavingsModel {
    first_year_saving: f64,
    price_growth: f64,
    maintenance: f64,
    net_cost: f64,
}

impl PeriodModel for SavingsModel {
    fn initial(&self) -> PeriodValues {
        PeriodValues::new()
            .with("saving", 0.0)
            .with("cumulative", 0.0)
            .with("net_position", -self.net_cost)
    }

    fn advance(&self, period: u32, prior: &PeriodValues) -> PeriodValues {
        let saving = growing(self.first_year_saving, self.price_growth, period) - self.maintenance;
        let cumulative = prior.value("cumulative") + saving;
        PeriodValues::new()
            .with("saving", saving)
            .with("cumulative", cumulative)
            .with("net_position", cumulative - self.net_cost)
    }

    fn is_complete(&self, row: &ProjectionPeriod) -> bool {
        row.value("net_position") >= 0.0
    }

    fn max_periods(&self) -> u32 {
        MAX_YEARS
    }
}

impl Calculator for SolarPaybackCalculator {
    fn id(&self) -> &'static str {
        "solar-payback"
    }

    fn title(&self) -> &'static str {
        "Solar panel payback"
    }

    fn schema(&self) -> &CalculatorSchema {
        &self.schema
    }

    fn steps(&self) -> &[FormulaStep] {
        &self.steps
    }

    fn project(
        &self,
        engine: &ProjectionEngine,
        inputs: &InputState,
        outputs: &OutputRecord,
    ) -> Option<ProjectionOutcome> {
        let net_cost = outputs.number("net_cost");
        let model = SavingsModel {
            first_year_saving: inputs.number("annual_saving"),
            price_growth: inputs.number("price_growth") / 100.0,
            maintenance: inputs.number("maintenance"),
            net_cost,
        };
        let series = engine.run(&model);

        // The projected year follows the simple payback's sentinels so a
        // non-positive first-year saving never reports a finite payback
        let payback_year = match outputs.get("simple_payback_years") {
            Some(OutputValue::Number(_)) if net_cost <= 0.0 => OutputValue::Number(0.0),
            Some(OutputValue::Number(_)) => series
                .reached_period()
                .map_or(OutputValue::Never, |p| OutputValue::Number(p as f64)),
            Some(other) => other,
            None => OutputValue::NotApplicable,
        };

        Some(ProjectionOutcome {
            series: Some(series),
            outputs: vec![("payback_year", payback_year)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::LoadedTables;
    use approx::assert_relative_eq;

    fn calculator() -> SolarPaybackCalculator {
        SolarPaybackCalculator::new(&BuildOptions {
            tables: &LoadedTables::default(),
            missing_field_policy: Default::default(),
        })
        .unwrap()
    }

    fn run(overrides: &[(&str, f64)]) -> OutputRecord {
        let calc = calculator();
        let mut inputs = calc.defaults();
        for (id, value) in overrides {
            calc.schema().set(&mut inputs, id, *value).unwrap();
        }
        calc.calculate(&inputs).outputs
    }

    #[test]
    fn test_default_payback() {
        let out = run(&[]);

        assert_relative_eq!(out.number("net_cost"), 6_000.0);
        assert_relative_eq!(out.number("net_annual_saving"), 850.0);
        assert_relative_eq!(out.number("simple_payback_years"), 6_000.0 / 850.0);
        // Savings grow 3% a year so the projected payback comes no later than the simple one
        let year = out.number("payback_year");
        assert!(year >= 6.0 && year <= 8.0, "payback year {}", year);
    }

    #[test]
    fn test_no_saving_never_pays_back() {
        for saving in [0.0, 50.0] {
            let out = run(&[("annual_saving", saving)]);
            assert_eq!(out.get("simple_payback_years"), Some(OutputValue::Never));
            assert_eq!(out.get("payback_year"), Some(OutputValue::Never));
        }
    }

    #[test]
    fn test_fully_subsidized_is_immediate() {
        let out = run(&[("subsidy", 100.0), ("annual_saving", 0.0)]);

        assert_eq!(out.get("simple_payback_years"), Some(OutputValue::Number(0.0)));
        assert_eq!(out.get("payback_year"), Some(OutputValue::Number(0.0)));
    }

    #[test]
    fn test_horizon_net_benefit_flat_prices() {
        let out = run(&[("price_growth", 0.0), ("horizon_years", 10.0)]);
        assert_relative_eq!(out.number("horizon_net_benefit"), 10.0 * 850.0 - 6_000.0, epsilon = 1e-9);
    }
}
