//! fincalc CLI
//!
//! Command-line front end for the built-in calculators
//!
//! # Usage
//!
//! ```bash
//! fincalc list
//! fincalc show car-import
//! fincalc run fire --set savings_rate=50 --set real_return=4
//! fincalc run loan --set extra_payment=200 --csv schedule.csv --save
//! fincalc sweep fire --field savings_rate --from 20 --to 70 --step 10 --output years_to_fi
//! RUST_LOG=debug fincalc run solar-payback --json
//! ```

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use fincalc::calculators::BuildOptions;
use fincalc::config::{EngineConfig, DEFAULT_CONFIG_PATH};
use fincalc::format::{self, Style};
use fincalc::history::{History, SavedCalculation};
use fincalc::scenario::{sweep_values, ScenarioRunner};
use fincalc::schema::{FieldKind, Value};
use fincalc::tables::LoadedTables;
use fincalc::{Calculation, Calculator, Catalog, ProjectionEngine};
use log::info;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fincalc")]
#[command(version)]
#[command(about = "Declarative financial calculators")]
struct Args {
    /// Engine configuration file (JSON); defaults apply when absent
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available calculators
    List,

    /// Show a calculator's fields
    Show { calculator: String },

    /// Evaluate a calculator
    Run {
        calculator: String,

        /// Field assignment, repeatable
        #[arg(short, long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
        sets: Vec<(String, Value)>,

        /// Print the full calculation as JSON
        #[arg(long)]
        json: bool,

        /// Write the projection series to a CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// Append the calculation to the history file
        #[arg(long)]
        save: bool,
    },

    /// Evaluate a calculator over a range of values for one field
    Sweep {
        calculator: String,

        #[arg(long)]
        field: String,

        #[arg(long)]
        from: f64,

        #[arg(long)]
        to: f64,

        #[arg(long, default_value_t = 1.0)]
        step: f64,

        /// Output to report; the calculator's last output when omitted
        #[arg(long)]
        output: Option<String>,

        #[arg(short, long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
        sets: Vec<(String, Value)>,
    },

    /// List saved calculations
    History {
        /// Remove every saved calculation
        #[arg(long)]
        clear: bool,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got `{}`", raw))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing field id in `{}`", raw));
    }
    Ok((id.to_string(), Value::parse_loose(value)))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = EngineConfig::from_path(&args.config)?;

    let tables = LoadedTables::load_from(&config.data_dir)
        .with_context(|| format!("loading tier tables from {}", config.data_dir.display()))?;
    info!("loaded {} tier tables", tables.len());

    let catalog = Catalog::new(&BuildOptions {
        tables: &tables,
        missing_field_policy: config.missing_field_policy,
    })?
    .with_engine(ProjectionEngine::new(config.projection()));

    match args.command {
        Command::List => {
            for calc in catalog.iter() {
                println!("{:<16} {}", calc.id(), calc.title());
            }
        }
        Command::Show { calculator } => show(catalog.get(&calculator)?),
        Command::Run {
            calculator,
            sets,
            json,
            csv,
            save,
        } => {
            let runner = ScenarioRunner::new(catalog);
            let inputs = runner.inputs_with(&calculator, &sets)?;
            let calculation = runner.catalog().calculate(&calculator, &inputs)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&calculation)?);
            } else {
                print_calculation(runner.catalog().get(&calculator)?, &calculation);
            }

            if let Some(path) = csv {
                let Some(series) = &calculation.series else {
                    bail!("{} has no projection series", calculator);
                };
                let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
                series.write_csv(file)?;
                println!("Series written to {}", path.display());
            }

            if save {
                let mut history = History::open(&config.history_path, config.history_limit)?;
                history.push(SavedCalculation::from_calculation(&calculation, Utc::now()));
                history.save()?;
            }
        }
        Command::Sweep {
            calculator,
            field,
            from,
            to,
            step,
            output,
            sets,
        } => {
            let runner = ScenarioRunner::new(catalog);
            let base = runner.inputs_with(&calculator, &sets)?;
            let points = runner.sweep(&calculator, &base, &field, &sweep_values(from, to, step))?;

            let Some(output) = output.or_else(|| {
                points
                    .first()
                    .and_then(|p| p.calculation.outputs.iter().last().map(|(id, _)| id.to_string()))
            }) else {
                bail!("nothing to sweep");
            };

            println!("{:>14}  {}", field, output);
            for point in &points {
                let value = point
                    .output(&output)
                    .with_context(|| format!("{} has no output `{}`", calculator, output))?;
                println!("{:>14}  {}", point.input, format::output(value, Style::for_output(&output)));
            }
        }
        Command::History { clear } => {
            let mut history = History::open(&config.history_path, config.history_limit)?;
            if clear {
                history.clear();
                history.save()?;
                println!("History cleared");
            } else if history.list().is_empty() {
                println!("No saved calculations");
            } else {
                for entry in history.list() {
                    let summary: Vec<String> = entry
                        .outputs
                        .iter()
                        .map(|(id, v)| format!("{}={}", id, format::output(v, Style::for_output(id))))
                        .collect();
                    println!(
                        "{}  {:<14} {}",
                        entry.saved_at.format("%Y-%m-%d %H:%M"),
                        entry.calculator,
                        summary.join(", ")
                    );
                }
            }
        }
    }

    Ok(())
}

fn show(calc: &dyn Calculator) {
    println!("{} ({})", calc.title(), calc.id());
    println!("================================\n");

    for field in calc.schema().fields() {
        let kind = match &field.kind {
            FieldKind::Number { min, max, .. } if max.is_finite() => format!("number {}..{}", min, max),
            FieldKind::Number { min, .. } => format!("number >= {}", min),
            FieldKind::Boolean => "boolean".to_string(),
            FieldKind::Select { options } => {
                let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                format!("one of {}", values.join("|"))
            }
        };
        let unit = field.unit.as_deref().unwrap_or("");
        print!("  {:<22} {:<26} default {} {}", field.id, kind, field.default, unit);
        if let Some(condition) = &field.visible_if {
            print!("  [when {}]", condition);
        }
        println!();
    }
}

fn print_calculation(calc: &dyn Calculator, calculation: &Calculation) {
    println!("{}", calc.title());
    println!("================================\n");

    println!("Inputs:");
    for field in calc.schema().visible_fields(&calculation.inputs) {
        if let Some(value) = calculation.inputs.get(&field.id) {
            println!("  {:<26} {} {}", field.label, value, field.unit.as_deref().unwrap_or(""));
        }
    }

    println!("\nResults:");
    for (id, value) in calculation.outputs.iter() {
        println!("  {:<26} {}", id, format::output(value, Style::for_output(id)));
    }

    if let Some(series) = &calculation.series {
        let summary = series.summary();
        println!("\nProjection: {} periods, {:?}", summary.total_periods, summary.status);
        for (name, value) in summary.final_values.iter() {
            println!("  final {:<20} {:.2}", name, value);
        }
    }
}
