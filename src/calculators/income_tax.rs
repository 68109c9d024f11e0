//! Progressive income tax with a new-business reduction and flat surcharge

use super::{BuildOptions, Calculator};
use crate::error::SchemaError;
use crate::formula::{guards, Adjustment, FormulaStep, Modifier, ModifierChain, OutputValue, TierTable};
use crate::schema::{CalculatorSchema, Condition, FieldSpec};

pub const BRACKETS_TABLE: &str = "income_tax_brackets";

/// Marginal rates by upper bound of taxable income
pub fn default_brackets() -> TierTable {
    TierTable::bounded(
        &[
            (12_450.0, 0.19),
            (20_200.0, 0.24),
            (35_200.0, 0.30),
            (60_000.0, 0.37),
            (300_000.0, 0.45),
        ],
        Some(0.47),
    )
}

pub struct IncomeTaxCalculator {
    schema: CalculatorSchema,
    steps: Vec<FormulaStep>,
}

impl IncomeTaxCalculator {
    pub fn new(options: &BuildOptions<'_>) -> Result<Self, SchemaError> {
        let schema = CalculatorSchema::new(vec![
            FieldSpec::number("gross_income", "Gross income", 45_000.0).step(500.0).unit("€"),
            FieldSpec::number("deductible_expenses", "Deductible expenses", 3_000.0).step(100.0).unit("€"),
            FieldSpec::boolean("new_business", "New business", false),
            FieldSpec::number("reduction_pct", "New business reduction", 20.0)
                .max(100.0)
                .unit("%")
                .visible_if(Condition::eq("new_business", true)),
            FieldSpec::number("solidarity_surcharge", "Solidarity surcharge", 0.0).unit("€"),
        ])?
        .with_missing_field_policy(options.missing_field_policy);

        let brackets = options.tables.get_or(BRACKETS_TABLE, default_brackets());

        Ok(Self {
            schema,
            steps: steps(brackets),
        })
    }
}

fn steps(brackets: TierTable) -> Vec<FormulaStep> {
    // The surcharge comes after the reduction so it is never reduced
    let adjustments = ModifierChain::new(vec![
        Modifier::when(
            "reduction",
            "new_business",
            Adjustment::ReducePercentField("reduction_pct".to_string()),
        ),
        Modifier::always(
            "solidarity_surcharge",
            Adjustment::AddField("solidarity_surcharge".to_string()),
        ),
    ]);

    vec![
        FormulaStep::single("taxable_base", |ctx| {
            guards::non_negative(ctx.number("gross_income") - ctx.number("deductible_expenses"))
        }),
        FormulaStep::new("brackets", move |ctx| {
            let base = ctx.output("taxable_base");
            let marginal = if base > 0.0 {
                brackets.rate(base).unwrap_or(0.0) * 100.0
            } else {
                0.0
            };
            vec![
                ("bracket_tax", brackets.progressive(base).into()),
                ("marginal_rate", marginal.into()),
            ]
        }),
        FormulaStep::new("final", move |ctx| {
            let chained = adjustments.apply(ctx.output("bracket_tax"), ctx.inputs);
            let final_tax = chained.value.max(0.0);
            vec![
                ("reduction", (-chained.delta("reduction")).into()),
                ("final_tax", final_tax.into()),
                (
                    "effective_rate",
                    match guards::ratio(final_tax, ctx.number("gross_income")) {
                        OutputValue::Number(r) => OutputValue::Number(r * 100.0),
                        other => other,
                    },
                ),
                ("net_income", (ctx.number("gross_income") - final_tax).into()),
            ]
        }),
    ]
}

impl Calculator for IncomeTaxCalculator {
    fn id(&self) -> &'static str {
        "income-tax"
    }

    fn title(&self) -> &'static str {
        "Income tax"
    }

    fn schema(&self) -> &CalculatorSchema {
        &self.schema
    }

    fn steps(&self) -> &[FormulaStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::OutputRecord;
    use crate::schema::Value;
    use crate::tables::LoadedTables;
    use approx::assert_relative_eq;

    fn calculator() -> IncomeTaxCalculator {
        IncomeTaxCalculator::new(&BuildOptions {
            tables: &LoadedTables::default(),
            missing_field_policy: Default::default(),
        })
        .unwrap()
    }

    fn run(overrides: &[(&str, Value)]) -> OutputRecord {
        let calc = calculator();
        let mut inputs = calc.defaults();
        for (id, value) in overrides {
            calc.schema().set(&mut inputs, id, value.clone()).unwrap();
        }
        calc.calculate(&inputs).outputs
    }

    #[test]
    fn test_bracket_tax() {
        let out = run(&[]);

        assert_relative_eq!(out.number("taxable_base"), 42_000.0);
        // 2365.5 + 1860 + 4500 + 2516
        assert_relative_eq!(out.number("bracket_tax"), 11_241.5, epsilon = 1e-6);
        assert_relative_eq!(out.number("marginal_rate"), 37.0, epsilon = 1e-9);
        assert_relative_eq!(out.number("reduction"), 0.0);
        assert_relative_eq!(out.number("final_tax"), 11_241.5, epsilon = 1e-6);
        assert_relative_eq!(out.number("effective_rate"), 11_241.5 / 45_000.0 * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_surcharge_is_not_reduced() {
        let out = run(&[
            ("new_business", Value::Bool(true)),
            ("solidarity_surcharge", Value::Number(100.0)),
        ]);

        assert_relative_eq!(out.number("reduction"), 2_248.3, epsilon = 1e-6);
        assert_relative_eq!(out.number("final_tax"), 11_241.5 * 0.8 + 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_income() {
        let out = run(&[("gross_income", Value::Number(0.0))]);

        assert_eq!(out.number("taxable_base"), 0.0);
        assert_eq!(out.number("final_tax"), 0.0);
        assert_eq!(out.number("marginal_rate"), 0.0);
        assert_eq!(out.get("effective_rate"), Some(OutputValue::NotApplicable));
    }

    #[test]
    fn test_top_bracket_catch_all() {
        let out = run(&[("gross_income", Value::Number(400_000.0)), ("deductible_expenses", Value::Number(0.0))]);
        assert_relative_eq!(out.number("marginal_rate"), 47.0, epsilon = 1e-9);
    }
}
