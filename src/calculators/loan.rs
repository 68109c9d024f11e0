//! Fixed-rate loan amortization with optional extra monthly payments

use super::{BuildOptions, Calculator, ProjectionOutcome};
use crate::error::SchemaError;
use crate::formula::{guards, FormulaStep, OutputRecord, OutputValue};
use crate::projection::{PeriodModel, PeriodValues, ProjectionEngine, ProjectionPeriod};
use crate::schema::{CalculatorSchema, FieldSpec, InputState};

/// Longest amortization schedule projected, in months
pub const MAX_MONTHS: u32 = 600;

/// Remaining balance treated as paid off
const PAID_OFF: f64 = 0.005;

pub struct LoanCalculator {
    schema: CalculatorSchema,
    steps: Vec<FormulaStep>,
}

impl LoanCalculator {
    pub fn new(options: &BuildOptions<'_>) -> Result<Self, SchemaError> {
        let schema = CalculatorSchema::new(vec![
            FieldSpec::number("principal", "Loan amount", 200_000.0).step(1_000.0).unit("€"),
            FieldSpec::number("annual_rate", "Annual interest rate", 3.0).max(30.0).step(0.05).unit("%"),
            FieldSpec::number("years", "Term", 25.0).min(1.0).max(40.0).step(1.0).unit("years"),
            FieldSpec::number("extra_payment", "Extra monthly payment", 0.0).step(50.0).unit("€"),
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
        FormulaStep::new("terms", |ctx| {
            vec![
                ("monthly_rate", (ctx.number("annual_rate") / 12.0).into()),
                ("periods", (ctx.number("years").round() * 12.0).into()),
            ]
        }),
        FormulaStep::single("monthly_payment", |ctx| {
            guards::annuity_payment(
                ctx.number("principal"),
                ctx.output("monthly_rate") / 100.0,
                ctx.output("periods") as u32,
            )
        }),
        FormulaStep::new("scheduled", |ctx| {
            let total = ctx.output("monthly_payment") * ctx.output("periods");
            vec![
                ("scheduled_total", total.into()),
                ("scheduled_interest", guards::non_negative(total - ctx.number("principal")).into()),
            ]
        }),
    ]
}

/// Month-by-month balance under the scheduled payment plus any extra
struct AmortizationModel {
    principal: f64,
    monthly_rate: f64,
    payment: f64,
    max_months: u32,
}

impl PeriodModel for AmortizationModel {
    fn initial(&self) -> PeriodValues {
        PeriodValues::new()
            .with("payment", 0.0)
            .with("interest", 0.0)
            .with("principal_paid", 0.0)
            .with("balance", self.principal)
    }

    fn advance(&self, _period: u32, prior: &PeriodValues) -> PeriodValues {
        let opening = prior.value("balance");
        let interest = opening * self.monthly_rate;
        // Final payment only clears what is left
        let payment = self.payment.min(opening + interest);
        let principal_paid = payment - interest;
        PeriodValues::new()
            .with("payment", payment)
            .with("interest", interest)
            .with("principal_paid", principal_paid)
            .with("balance", opening - principal_paid)
    }

    fn is_complete(&self, row: &ProjectionPeriod) -> bool {
        row.value("balance") <= PAID_OFF
    }

    fn max_periods(&self) -> u32 {
        self.max_months
    }
}

impl Calculator for LoanCalculator {
    fn id(&self) -> &'static str {
        "loan"
    }

    fn title(&self) -> &'static str {
        "Loan amortization"
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
        let principal = inputs.number("principal");
        if principal <= 0.0 {
            return Some(ProjectionOutcome {
                series: None,
                outputs: vec![
                    ("payoff_months", OutputValue::Number(0.0)),
                    ("total_interest", OutputValue::Number(0.0)),
                    ("interest_saved", OutputValue::Number(0.0)),
                    ("months_saved", OutputValue::Number(0.0)),
                ],
            });
        }

        let scheduled_months = outputs.number("periods");
        let model = AmortizationModel {
            principal,
            monthly_rate: outputs.number("monthly_rate") / 100.0,
            payment: outputs.number("monthly_payment") + inputs.number("extra_payment"),
            max_months: MAX_MONTHS,
        };
        let series = engine.run(&model);
        let total_interest: f64 = series.column("interest").iter().sum();

        let payoff_outputs = match series.reached_period() {
            Some(months) => vec![
                ("payoff_months", OutputValue::Number(months as f64)),
                ("total_interest", OutputValue::Number(total_interest)),
                (
                    "interest_saved",
                    guards::non_negative(outputs.number("scheduled_interest") - total_interest).into(),
                ),
                ("months_saved", guards::non_negative(scheduled_months - months as f64).into()),
            ],
            None => vec![
                ("payoff_months", OutputValue::Never),
                ("total_interest", OutputValue::Never),
                ("interest_saved", OutputValue::NotApplicable),
                ("months_saved", OutputValue::NotApplicable),
            ],
        };

        Some(ProjectionOutcome {
            series: Some(series),
            outputs: payoff_outputs,
        })
    }
}
