//! Formula evaluation: ordered steps, output records, guards, tier tables and modifiers

mod evaluator;
pub mod guards;
mod modifiers;
mod output;
mod step;
mod tiers;

pub use evaluator::evaluate;
pub(crate) use evaluator::merge_outputs;
pub use modifiers::{Adjustment, ChainResult, Modifier, ModifierChain};
pub use output::{OutputRecord, OutputValue};
pub use step::{FormulaStep, StepContext};
pub use tiers::{Tier, TierTable};
