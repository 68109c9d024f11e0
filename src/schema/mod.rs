//! Calculator input schemas: fields, conditions and the input state they guard

mod condition;
mod field;
mod input;

pub use condition::{Condition, MissingFieldPolicy, Operator};
pub use field::{clamp, FieldKind, FieldSpec, SelectOption, Value};
pub use input::InputState;

use log::debug;
use serde::Serialize;
use std::collections::HashSet;

use crate::error::SchemaError;

/// Immutable set of field declarations for one calculator
#[derive(Debug, Clone, Serialize)]
pub struct CalculatorSchema {
    fields: Vec<FieldSpec>,
    missing_field_policy: MissingFieldPolicy,
}

impl CalculatorSchema {
    /// Build a schema, checking id uniqueness and normalizing defaults
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.id.as_str()) {
                return Err(SchemaError::DuplicateField(field.id.clone()));
            }
            if let FieldKind::Select { options } = &field.kind {
                if options.is_empty() {
                    return Err(SchemaError::EmptySelect {
                        field: field.id.clone(),
                    });
                }
            }
        }
        for field in &fields {
            if let Some(condition) = &field.visible_if {
                if !seen.contains(condition.field.as_str()) {
                    return Err(SchemaError::DanglingCondition {
                        field: field.id.clone(),
                        target: condition.field.clone(),
                    });
                }
            }
        }

        let fields = fields
            .into_iter()
            .map(|mut f| {
                let fallback = f.fallback();
                f.default = f.coerce(&f.default, &fallback);
                f
            })
            .collect();

        Ok(Self {
            fields,
            missing_field_policy: MissingFieldPolicy::default(),
        })
    }

    pub fn with_missing_field_policy(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_field_policy = policy;
        self
    }

    pub fn missing_field_policy(&self) -> MissingFieldPolicy {
        self.missing_field_policy
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Input state holding every field's default
    pub fn defaults(&self) -> InputState {
        let mut state = InputState::default();
        for field in &self.fields {
            state.insert(&field.id, field.default.clone());
        }
        state
    }

    /// Coerce and store one value, returning what was actually stored
    pub fn set(
        &self,
        state: &mut InputState,
        id: &str,
        value: impl Into<Value>,
    ) -> Result<Value, SchemaError> {
        let field = self
            .field(id)
            .ok_or_else(|| SchemaError::UnknownField(id.to_string()))?;
        let incoming = value.into();
        let current = state.get(id).cloned().unwrap_or_else(|| field.default.clone());
        let stored = field.coerce(&incoming, &current);
        if stored != incoming {
            debug!("field `{}`: {} stored as {}", id, incoming, stored);
        }
        state.insert(id, stored.clone());
        Ok(stored)
    }

    /// Rebuild a state so it holds exactly this schema's fields, each coerced.
    ///
    /// Entries that are missing or cannot be coerced take the field default;
    /// ids the schema does not declare are dropped.
    pub fn normalize(&self, state: &InputState) -> InputState {
        let mut normalized = InputState::default();
        for field in &self.fields {
            let stored = match state.get(&field.id) {
                Some(value) => {
                    let coerced = field.coerce(value, &field.default);
                    if &coerced != value {
                        debug!("field `{}`: {} normalized to {}", field.id, value, coerced);
                    }
                    coerced
                }
                None => field.default.clone(),
            };
            normalized.insert(&field.id, stored);
        }
        normalized
    }

    /// Restore every field to its default
    pub fn reset(&self, state: &mut InputState) {
        *state = self.defaults();
    }

    /// Whether a field's `visible_if` condition holds for the current inputs
    pub fn is_visible(&self, field: &FieldSpec, state: &InputState) -> bool {
        field
            .visible_if
            .as_ref()
            .map_or(true, |c| c.evaluate(state, self.missing_field_policy))
    }

    pub fn visible_fields<'a>(&'a self, state: &'a InputState) -> impl Iterator<Item = &'a FieldSpec> {
        self.fields.iter().filter(move |f| self.is_visible(f, state))
    }
}
