//! Toggle-gated surcharges and discounts
//!
//! Adjustments are not associative: a flat add-on applied after a percentage
//! reduction is excluded from it, applied before it is not. The chain
//! therefore runs strictly in the order it was declared.

use crate::schema::InputState;

#[derive(Debug, Clone, PartialEq)]
pub enum Adjustment {
    /// Add `pct`% of the running value (negative for a reduction)
    Percent(f64),
    /// Add a fixed amount (negative for a discount)
    Flat(f64),
    /// Add the value of a numeric input
    AddField(String),
    /// Subtract the value of a numeric input
    SubtractField(String),
    /// Reduce the running value by the percent held in a numeric input
    ReducePercentField(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub label: &'static str,
    /// Boolean input that enables this modifier; always on when `None`
    pub gate: Option<String>,
    pub adjustment: Adjustment,
}

impl Modifier {
    pub fn always(label: &'static str, adjustment: Adjustment) -> Self {
        Self {
            label,
            gate: None,
            adjustment,
        }
    }

    pub fn when(label: &'static str, gate: &str, adjustment: Adjustment) -> Self {
        Self {
            label,
            gate: Some(gate.to_string()),
            adjustment,
        }
    }

    fn is_active(&self, inputs: &InputState) -> bool {
        self.gate.as_deref().map_or(true, |g| inputs.flag(g))
    }

    fn delta(&self, running: f64, inputs: &InputState) -> f64 {
        match &self.adjustment {
            Adjustment::Percent(pct) => running * pct / 100.0,
            Adjustment::Flat(amount) => *amount,
            Adjustment::AddField(field) => inputs.number(field),
            Adjustment::SubtractField(field) => -inputs.number(field),
            Adjustment::ReducePercentField(field) => -running * inputs.number(field) / 100.0,
        }
    }
}

/// Outcome of a chain: the final value and each modifier's contribution
#[derive(Debug, Clone, PartialEq)]
pub struct ChainResult {
    pub value: f64,
    pub deltas: Vec<(&'static str, f64)>,
}

impl ChainResult {
    pub fn delta(&self, label: &str) -> f64 {
        self.deltas
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, d)| *d)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierChain {
    modifiers: Vec<Modifier>,
}

impl ModifierChain {
    pub fn new(modifiers: Vec<Modifier>) -> Self {
        Self { modifiers }
    }

    pub fn apply(&self, base: f64, inputs: &InputState) -> ChainResult {
        let mut value = base;
        let mut deltas = Vec::with_capacity(self.modifiers.len());

        for modifier in &self.modifiers {
            let delta = if modifier.is_active(inputs) {
                modifier.delta(value, inputs)
            } else {
                0.0
            };
            value += delta;
            deltas.push((modifier.label, delta));
        }

        ChainResult { value, deltas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CalculatorSchema, FieldSpec};
    use approx::assert_relative_eq;

    fn schema() -> CalculatorSchema {
        CalculatorSchema::new(vec![
            FieldSpec::boolean("reduced", "Reduced", true),
            FieldSpec::number("bonus", "Bonus", 300.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_order_matters() {
        let s = schema();
        let inputs = s.defaults();

        let flat_after = ModifierChain::new(vec![
            Modifier::when("reduction", "reduced", Adjustment::Percent(-35.0)),
            Modifier::always("surcharge", Adjustment::Flat(100.0)),
        ]);
        let flat_before = ModifierChain::new(vec![
            Modifier::always("surcharge", Adjustment::Flat(100.0)),
            Modifier::when("reduction", "reduced", Adjustment::Percent(-35.0)),
        ]);

        assert_relative_eq!(flat_after.apply(1000.0, &inputs).value, 750.0);
        assert_relative_eq!(flat_before.apply(1000.0, &inputs).value, 715.0);
    }

    #[test]
    fn test_gate_off_contributes_nothing() {
        let s = schema();
        let mut inputs = s.defaults();
        s.set(&mut inputs, "reduced", false).unwrap();

        let chain = ModifierChain::new(vec![
            Modifier::when("reduction", "reduced", Adjustment::Percent(-35.0)),
            Modifier::always("bonus", Adjustment::SubtractField("bonus".to_string())),
        ]);
        let result = chain.apply(1000.0, &inputs);

        assert_eq!(result.delta("reduction"), 0.0);
        assert_eq!(result.delta("bonus"), -300.0);
        assert_eq!(result.value, 700.0);
    }
}
