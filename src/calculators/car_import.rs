//! Cost of importing a used car: depreciated base, customs tariff, VAT,
//! emissions-based registration tax and fixed fees
//!
//! | Output | Formula |
//! |--------|---------|
//! | depreciation_coefficient | age tier of the depreciation table |
//! | base | valor × coefficient |
//! | tariff | 0 inside the EU, base × tariff% otherwise |
//! | vat | (base + tariff) × VAT% |
//! | registration_tax | base × CO2 tier rate |
//! | total | base + tariff + vat + registration + transport + homologation − scrap bonus |

use log::warn;

use super::{BuildOptions, Calculator};
use crate::error::SchemaError;
use crate::formula::{Adjustment, FormulaStep, Modifier, ModifierChain, TierTable};
use crate::schema::{CalculatorSchema, Condition, FieldSpec};

pub const DEPRECIATION_TABLE: &str = "car_depreciation";
pub const REGISTRATION_TABLE: &str = "car_registration_tax";

/// Residual value coefficient by vehicle age in years
pub fn default_depreciation() -> TierTable {
    TierTable::bounded(
        &[
            (1.0, 1.00),
            (2.0, 0.84),
            (3.0, 0.67),
            (4.0, 0.56),
            (5.0, 0.47),
            (6.0, 0.39),
            (7.0, 0.34),
            (8.0, 0.28),
            (9.0, 0.24),
            (10.0, 0.19),
            (11.0, 0.17),
            (12.0, 0.13),
        ],
        Some(0.10),
    )
}

/// Registration tax rate by CO2 emissions in g/km
pub fn default_registration() -> TierTable {
    TierTable::bounded(&[(120.0, 0.0), (140.0, 0.0475), (200.0, 0.0975)], Some(0.1475))
}

pub struct CarImportCalculator {
    schema: CalculatorSchema,
    steps: Vec<FormulaStep>,
}

impl CarImportCalculator {
    pub fn new(options: &BuildOptions<'_>) -> Result<Self, SchemaError> {
        let schema = CalculatorSchema::new(vec![
            FieldSpec::number("valor", "Vehicle value", 30_000.0).step(100.0).unit("€"),
            FieldSpec::number("age_years", "Vehicle age", 3.0).max(50.0).step(1.0).unit("years"),
            FieldSpec::select("origin", "Origin", &[("eu", "European Union"), ("non_eu", "Outside the EU")], "eu"),
            FieldSpec::number("tariff_rate", "Customs tariff", 10.0)
                .max(100.0)
                .unit("%")
                .visible_if(Condition::eq("origin", "non_eu")),
            FieldSpec::number("vat_rate", "VAT", 21.0).max(100.0).unit("%"),
            FieldSpec::number("co2", "CO2 emissions", 150.0).max(1_000.0).unit("g/km"),
            FieldSpec::number("transport", "Transport", 800.0).unit("€"),
            FieldSpec::number("homologation", "Homologation", 200.0).unit("€"),
            FieldSpec::boolean("scrap_bonus", "Scrap bonus", false),
            FieldSpec::number("scrap_bonus_amount", "Scrap bonus amount", 1_000.0)
                .unit("€")
                .visible_if(Condition::eq("scrap_bonus", true)),
        ])?
        .with_missing_field_policy(options.missing_field_policy);

        let depreciation = options.tables.get_or(DEPRECIATION_TABLE, default_depreciation());
        let registration = options.tables.get_or(REGISTRATION_TABLE, default_registration());

        Ok(Self {
            schema,
            steps: steps(depreciation, registration),
        })
    }
}

fn steps(depreciation: TierTable, registration: TierTable) -> Vec<FormulaStep> {
    let fees = ModifierChain::new(vec![
        Modifier::always("transport", Adjustment::AddField("transport".to_string())),
        Modifier::always("homologation", Adjustment::AddField("homologation".to_string())),
        Modifier::when(
            "scrap_bonus",
            "scrap_bonus",
            Adjustment::SubtractField("scrap_bonus_amount".to_string()),
        ),
    ]);

    vec![
        FormulaStep::new("base", move |ctx| {
            let age = ctx.number("age_years");
            let coefficient = depreciation.rate(age).unwrap_or_else(|| {
                warn!("no depreciation tier for age {}, using full value", age);
                1.0
            });
            vec![
                ("depreciation_coefficient", coefficient.into()),
                ("base", (ctx.number("valor") * coefficient).into()),
            ]
        }),
        FormulaStep::single("tariff", |ctx| {
            if ctx.text("origin") == "eu" {
                0.0
            } else {
                ctx.output("base") * ctx.percent("tariff_rate")
            }
        }),
        FormulaStep::single("vat", |ctx| (ctx.output("base") + ctx.output("tariff")) * ctx.percent("vat_rate")),
        FormulaStep::new("registration", move |ctx| {
            let rate = registration.rate(ctx.number("co2")).unwrap_or(0.0);
            vec![
                ("registration_rate", (rate * 100.0).into()),
                ("registration_tax", (ctx.output("base") * rate).into()),
            ]
        }),
        FormulaStep::new("total", move |ctx| {
            let taxes = ctx.output("tariff") + ctx.output("vat") + ctx.output("registration_tax");
            let chained = fees.apply(ctx.output("base") + taxes, ctx.inputs);
            vec![
                ("taxes", taxes.into()),
                ("scrap_bonus_applied", (-chained.delta("scrap_bonus")).into()),
                ("total", chained.value.max(0.0).into()),
            ]
        }),
    ]
}

impl Calculator for CarImportCalculator {
    fn id(&self) -> &'static str {
        "car-import"
    }

    fn title(&self) -> &'static str {
        "Car import cost"
    }

    fn schema(&self) -> &CalculatorSchema {
        &self.schema
    }

    fn steps(&self) -> &[FormulaStep] {
        &self.steps
    }
}
