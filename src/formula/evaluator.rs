//! Ordered step evaluation

use log::{debug, warn};

use super::output::{OutputRecord, OutputValue};
use super::step::{FormulaStep, StepContext};
use crate::schema::InputState;

/// Run every step in order and collect a fresh output record.
///
/// Total over any input state: a step that yields NaN or an infinity gets
/// its value replaced by [`OutputValue::NotApplicable`].
pub fn evaluate(steps: &[FormulaStep], inputs: &InputState) -> OutputRecord {
    let mut record = OutputRecord::new();

    for step in steps {
        let produced = {
            let ctx = StepContext {
                inputs,
                outputs: &record,
            };
            step.run(&ctx)
        };

        merge_outputs(&mut record, step.id, produced);
    }

    debug!("evaluated {} steps into {} outputs", steps.len(), record.len());
    record
}

/// Insert produced values, replacing non-finite numbers by `NotApplicable`
pub(crate) fn merge_outputs(
    record: &mut OutputRecord,
    source: &str,
    produced: Vec<(&'static str, OutputValue)>,
) {
    for (id, value) in produced {
        record.insert(id, sanitize(source, id, value));
    }
}

fn sanitize(step: &str, id: &str, value: OutputValue) -> OutputValue {
    match value {
        OutputValue::Number(n) if !n.is_finite() => {
            warn!("step `{}` produced non-finite `{}` = {}", step, id, n);
            OutputValue::NotApplicable
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CalculatorSchema, FieldSpec};
    use approx::assert_relative_eq;

    fn setup() -> (CalculatorSchema, Vec<FormulaStep>) {
        let schema = CalculatorSchema::new(vec![
            FieldSpec::number("price", "Price", 200.0),
            FieldSpec::number("vat", "VAT", 21.0).max(100.0),
        ])
        .unwrap();
        let steps = vec![
            FormulaStep::single("vat_amount", |ctx| ctx.number("price") * ctx.percent("vat")),
            FormulaStep::single("total", |ctx| ctx.number("price") + ctx.output("vat_amount")),
            FormulaStep::new("ratios", |ctx| {
                vec![
                    ("per_unit", (ctx.output("total") / ctx.number("price")).into()),
                    ("zero_div", (1.0_f64 / 0.0).into()),
                ]
            }),
        ];
        (schema, steps)
    }

    #[test]
    fn test_steps_see_prior_outputs() {
        let (schema, steps) = setup();
        let record = evaluate(&steps, &schema.defaults());

        assert_relative_eq!(record.number("vat_amount"), 42.0, epsilon = 1e-9);
        assert_relative_eq!(record.number("total"), 242.0, epsilon = 1e-9);
        let ids: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(ids, vec!["vat_amount", "total", "per_unit", "zero_div"]);
    }

    #[test]
    fn test_non_finite_becomes_not_applicable() {
        let (schema, steps) = setup();
        let mut inputs = schema.defaults();
        schema.set(&mut inputs, "price", 0.0).unwrap();

        let record = evaluate(&steps, &inputs);
        assert_eq!(record.get("zero_div"), Some(OutputValue::NotApplicable));
        assert_eq!(record.get("per_unit"), Some(OutputValue::NotApplicable));
    }

    #[test]
    fn test_idempotent() {
        let (schema, steps) = setup();
        let inputs = schema.defaults();

        assert_eq!(evaluate(&steps, &inputs), evaluate(&steps, &inputs));
    }
}
