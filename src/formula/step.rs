//! Named computation steps and the view they get of inputs and prior outputs

use std::fmt;
use std::sync::Arc;

use super::output::{OutputRecord, OutputValue};
use crate::schema::InputState;

/// Read-only view handed to each step
pub struct StepContext<'a> {
    pub inputs: &'a InputState,
    pub outputs: &'a OutputRecord,
}

impl<'a> StepContext<'a> {
    pub fn number(&self, id: &str) -> f64 {
        self.inputs.number(id)
    }

    pub fn flag(&self, id: &str) -> bool {
        self.inputs.flag(id)
    }

    pub fn text(&self, id: &str) -> &str {
        self.inputs.text(id)
    }

    /// A percent input (`5` for 5%) as a fraction
    pub fn percent(&self, id: &str) -> f64 {
        self.inputs.number(id) / 100.0
    }

    /// A prior output as a number, 0.0 for sentinels
    pub fn output(&self, id: &str) -> f64 {
        self.outputs.number(id)
    }

    pub fn output_value(&self, id: &str) -> Option<OutputValue> {
        self.outputs.get(id)
    }
}

type ComputeFn = dyn Fn(&StepContext<'_>) -> Vec<(&'static str, OutputValue)> + Send + Sync;

/// One step of a calculator, run in declaration order.
///
/// Ordering is the only dependency mechanism: a step can read outputs of the
/// steps before it and nothing else.
#[derive(Clone)]
pub struct FormulaStep {
    pub id: &'static str,
    compute: Arc<ComputeFn>,
}

impl FormulaStep {
    /// Step producing several named outputs
    pub fn new<F>(id: &'static str, compute: F) -> Self
    where
        F: Fn(&StepContext<'_>) -> Vec<(&'static str, OutputValue)> + Send + Sync + 'static,
    {
        Self {
            id,
            compute: Arc::new(compute),
        }
    }

    /// Step producing a single output named after the step
    pub fn single<F, V>(id: &'static str, compute: F) -> Self
    where
        F: Fn(&StepContext<'_>) -> V + Send + Sync + 'static,
        V: Into<OutputValue>,
    {
        Self::new(id, move |ctx| vec![(id, compute(ctx).into())])
    }

    pub(crate) fn run(&self, ctx: &StepContext<'_>) -> Vec<(&'static str, OutputValue)> {
        (self.compute)(ctx)
    }
}

impl fmt::Debug for FormulaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaStep").field("id", &self.id).finish()
    }
}
