//! Financial independence (FIRE) calculator
//!
//! Target nest egg from spending and safe withdrawal rate, annual
//! contribution from income and savings rate, then a year-by-year projection
//! at the real return until the target is reached.

use super::{BuildOptions, Calculator, ProjectionOutcome};
use crate::error::SchemaError;
use crate::formula::{guards, FormulaStep, OutputRecord, OutputValue};
use crate::projection::{growing, PeriodModel, PeriodValues, ProjectionEngine, ProjectionPeriod};
use crate::schema::{CalculatorSchema, FieldSpec, InputState};

/// Longest horizon projected, in years
pub const MAX_YEARS: u32 = 100;

pub struct FireCalculator {
    schema: CalculatorSchema,
    steps: Vec<FormulaStep>,
}

impl FireCalculator {
    pub fn new(options: &BuildOptions<'_>) -> Result<Self, SchemaError> {
        let schema = CalculatorSchema::new(vec![
            FieldSpec::number("current_age", "Current age", 35.0).min(16.0).max(100.0).step(1.0).unit("years"),
            FieldSpec::number("annual_spend", "Annual spending", 36_000.0).step(500.0).unit("€"),
            FieldSpec::number("swr", "Safe withdrawal rate", 4.0).min(0.5).max(10.0).step(0.1).unit("%"),
            FieldSpec::number("nest_egg", "Current investments", 100_000.0).step(1_000.0).unit("€"),
            FieldSpec::number("annual_income", "Annual net income", 60_000.0).step(500.0).unit("€"),
            FieldSpec::number("savings_rate", "Savings rate", 40.0).max(100.0).unit("%"),
            FieldSpec::number("real_return", "Real return", 5.0).min(-20.0).max(30.0).step(0.1).unit("%"),
            FieldSpec::number("contribution_growth", "Yearly contribution growth", 0.0)
                .min(-20.0)
                .max(20.0)
                .unit("%"),
            FieldSpec::number("coast_age", "Coast target age", 65.0).min(16.0).max(100.0).step(1.0).unit("years"),
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
        FormulaStep::single("target_nest_egg", |ctx| guards::ratio(ctx.number("annual_spend"), ctx.percent("swr"))),
        FormulaStep::single("annual_contribution", |ctx| {
            ctx.number("annual_income") * ctx.percent("savings_rate")
        }),
        FormulaStep::new("coast", |ctx| {
            let years = (ctx.number("coast_age") - ctx.number("current_age")).max(0.0);
            let growth = (1.0 + ctx.percent("real_return")).powf(years);
            let coast_number = guards::safe_div(ctx.output("target_nest_egg"), growth);
            vec![
                ("coast_fi_number", coast_number.into()),
                ("coast_gap", guards::non_negative(coast_number - ctx.number("nest_egg")).into()),
                (
                    "progress_pct",
                    match guards::ratio(ctx.number("nest_egg"), ctx.output("target_nest_egg")) {
                        OutputValue::Number(r) => OutputValue::Number(r * 100.0),
                        other => other,
                    },
                ),
            ]
        }),
    ]
}

/// Balance compounding at the real return plus a growing yearly contribution
struct FireModel {
    nest_egg: f64,
    contribution: f64,
    contribution_growth: f64,
    real_return: f64,
    target: f64,
    current_age: f64,
}

impl PeriodModel for FireModel {
    fn initial(&self) -> PeriodValues {
        PeriodValues::new()
            .with("age", self.current_age)
            .with("contribution", 0.0)
            .with("growth", 0.0)
            .with("balance", self.nest_egg)
    }

    fn advance(&self, period: u32, prior: &PeriodValues) -> PeriodValues {
        let opening = prior.value("balance");
        let growth = opening * self.real_return;
        let contribution = growing(self.contribution, self.contribution_growth, period);
        PeriodValues::new()
            .with("age", self.current_age + period as f64)
            .with("contribution", contribution)
            .with("growth", growth)
            .with("balance", opening + growth + contribution)
    }

    fn is_complete(&self, row: &ProjectionPeriod) -> bool {
        row.value("balance") >= self.target
    }

    fn max_periods(&self) -> u32 {
        MAX_YEARS
    }
}

impl Calculator for FireCalculator {
    fn id(&self) -> &'static str {
        "fire"
    }

    fn title(&self) -> &'static str {
        "Financial independence"
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
        let Some(target) = outputs.get("target_nest_egg").and_then(|v| v.as_number()) else {
            return Some(ProjectionOutcome {
                series: None,
                outputs: vec![
                    ("years_to_fi", OutputValue::NotApplicable),
                    ("retirement_age", OutputValue::NotApplicable),
                ],
            });
        };
        let current_age = inputs.number("current_age");

        if inputs.number("nest_egg") >= target {
            return Some(ProjectionOutcome {
                series: None,
                outputs: vec![
                    ("years_to_fi", OutputValue::Number(0.0)),
                    ("retirement_age", OutputValue::Number(current_age)),
                ],
            });
        }

        let model = FireModel {
            nest_egg: inputs.number("nest_egg"),
            contribution: outputs.number("annual_contribution"),
            contribution_growth: inputs.number("contribution_growth") / 100.0,
            real_return: inputs.number("real_return") / 100.0,
            target,
            current_age,
        };
        let series = engine.run(&model);

        let (years, age) = match series.reached_period() {
            Some(years) => (
                OutputValue::Number(years as f64),
                OutputValue::Number(current_age + years as f64),
            ),
            None => (OutputValue::Never, OutputValue::Never),
        };

        Some(ProjectionOutcome {
            series: Some(series),
            outputs: vec![("years_to_fi", years), ("retirement_age", age)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionStatus;
    use crate::tables::LoadedTables;
    use approx::assert_relative_eq;

    fn calculator() -> FireCalculator {
        FireCalculator::new(&BuildOptions {
            tables: &LoadedTables::default(),
            missing_field_policy: Default::default(),
        })
        .unwrap()
    }

    #[test]
    fn test_worked_example() {
        let calc = calculator();
        let result = calc.calculate(&calc.defaults());
        let out = &result.outputs;

        assert_relative_eq!(out.number("target_nest_egg"), 900_000.0, epsilon = 1e-6);
        assert_relative_eq!(out.number("annual_contribution"), 24_000.0, epsilon = 1e-6);
        assert_eq!(out.get("years_to_fi"), Some(OutputValue::Number(18.0)));
        assert_eq!(out.get("retirement_age"), Some(OutputValue::Number(53.0)));

        let series = result.series.unwrap();
        assert_eq!(series.len(), 18);
        assert!(series.periods[16].value("balance") < 900_000.0);
        assert!(series.periods[17].value("balance") >= 900_000.0);
    }

    #[test]
    fn test_unreachable_target_is_never() {
        let calc = calculator();
        let mut inputs = calc.defaults();
        calc.schema().set(&mut inputs, "savings_rate", 0.0).unwrap();
        calc.schema().set(&mut inputs, "real_return", -2.0).unwrap();

        let result = calc.calculate(&inputs);
        assert_eq!(result.outputs.get("years_to_fi"), Some(OutputValue::Never));
        assert_eq!(result.outputs.get("retirement_age"), Some(OutputValue::Never));

        let series = result.series.unwrap();
        assert_eq!(series.status, ProjectionStatus::Exhausted);
        assert_eq!(series.len(), MAX_YEARS as usize);
    }

    #[test]
    fn test_already_independent() {
        let calc = calculator();
        let mut inputs = calc.defaults();
        calc.schema().set(&mut inputs, "nest_egg", 1_000_000.0).unwrap();

        let out = calc.calculate(&inputs).outputs;
        assert_eq!(out.get("years_to_fi"), Some(OutputValue::Number(0.0)));
        assert_eq!(out.get("retirement_age"), Some(OutputValue::Number(35.0)));
        assert_eq!(out.number("coast_gap"), 0.0);
    }

    #[test]
    fn test_coast_number() {
        let calc = calculator();
        let out = calc.calculate(&calc.defaults()).outputs;

        // 30 years at 5% real
        let expected = 900_000.0 / 1.05_f64.powi(30);
        assert_relative_eq!(out.number("coast_fi_number"), expected, epsilon = 1e-6);
        assert_relative_eq!(out.number("coast_gap"), expected - 100_000.0, epsilon = 1e-6);
        assert_relative_eq!(out.number("progress_pct"), 100_000.0 / 900_000.0 * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_growing_contributions_reach_sooner() {
        let calc = calculator();
        let mut inputs = calc.defaults();
        calc.schema().set(&mut inputs, "contribution_growth", 5.0).unwrap();

        let years = calc.calculate(&inputs).outputs.number("years_to_fi");
        assert!(years < 18.0);
    }
}
