//! CSV-based tier table loader
//!
//! Loads tier tables from CSV files in data/tables/. Each file has a
//! `threshold,rate` header; an empty threshold marks the catch-all tier.

use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::TableError;
use crate::formula::{Tier, TierTable};

/// Default path to the tables directory
pub const DEFAULT_TABLES_PATH: &str = "data/tables";

/// Raw CSV row of a tier table
#[derive(Debug, Deserialize)]
struct TierRow {
    threshold: Option<f64>,
    rate: f64,
}

/// Load one tier table from a CSV file
pub fn load_tier_table(path: &Path) -> Result<TierTable, TableError> {
    let file = fs::File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_tier_table_from_reader(file, path)
}

/// Load a tier table from any reader; `origin` only labels errors
pub fn load_tier_table_from_reader<R: Read>(reader: R, origin: &Path) -> Result<TierTable, TableError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut tiers = Vec::new();

    for result in csv_reader.deserialize() {
        let row: TierRow = result.map_err(|source| TableError::Csv {
            path: origin.to_path_buf(),
            source,
        })?;
        tiers.push(Tier {
            threshold: row.threshold,
            rate: row.rate,
        });
    }

    TierTable::new(tiers)
}

/// All tier tables found in a directory, keyed by file stem
#[derive(Debug, Clone, Default)]
pub struct LoadedTables {
    tables: HashMap<String, TierTable>,
}

impl LoadedTables {
    /// Load all tables from the default path
    pub fn load_default() -> Result<Self, TableError> {
        Self::load_from(Path::new(DEFAULT_TABLES_PATH))
    }

    /// Load every `*.csv` in `dir`. A missing directory yields no tables.
    pub fn load_from(dir: &Path) -> Result<Self, TableError> {
        let mut tables = HashMap::new();
        if !dir.is_dir() {
            debug!("no tables directory at {}", dir.display());
            return Ok(Self { tables });
        }

        let entries = fs::read_dir(dir).map_err(|source| TableError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|source| TableError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let table = load_tier_table(&path)?;
            debug!("loaded table `{}` with {} tiers", name, table.tiers().len());
            tables.insert(name, table);
        }

        Ok(Self { tables })
    }

    pub fn insert(&mut self, name: &str, table: TierTable) {
        self.tables.insert(name.to_string(), table);
    }

    pub fn get(&self, name: &str) -> Option<&TierTable> {
        self.tables.get(name)
    }

    /// Table `name` if loaded, otherwise the built-in `fallback`
    pub fn get_or(&self, name: &str, fallback: TierTable) -> TierTable {
        self.tables.get(name).cloned().unwrap_or(fallback)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
